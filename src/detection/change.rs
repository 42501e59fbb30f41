use rayon::prelude::*;
use tracing::debug;

use crate::config::ChangeConfig;
use crate::detection::preprocessing::HsvImage;
use crate::error::{AssessmentError, Result};
use crate::models::{ChangeMask, ClassMap, LandCover, Mask};

/// Result of comparing pre and post classifications
#[derive(Debug, Clone)]
pub struct ChangeDetection {
    /// Vegetation in the pre map
    pub vegetation_before: Mask,
    /// Vegetation that is no longer labeled vegetation in the post map
    pub lost_by_classification: Mask,
    /// Pre vegetation whose color shifted significantly
    pub lost_by_color: Mask,
    /// Union of both cues
    pub change_mask: ChangeMask,
    /// Post map with every changed pixel reassigned to land
    pub refined_post: ClassMap,
}

/// Hue distance on the 180-unit circle
#[inline]
pub fn hue_distance(a: u8, b: u8) -> u8 {
    let d = (a as i16 - b as i16).abs();
    d.min(180 - d).max(0) as u8
}

/// Per-pixel test for a significant HSV shift between two pixels
#[inline]
pub fn is_significant_shift(pre: &[u8], post: &[u8], config: &ChangeConfig) -> bool {
    hue_distance(pre[0], post[0]) > config.hue_threshold
        || pre[1].abs_diff(post[1]) > config.saturation_threshold
        || pre[2].abs_diff(post[2]) > config.value_threshold
}

/// Mask of pixels whose hue, saturation or value moved past the thresholds
pub fn significant_hsv_change(
    pre: &HsvImage,
    post: &HsvImage,
    config: &ChangeConfig,
) -> Result<Mask> {
    AssessmentError::check_dimensions("hsv difference", pre.dimensions(), post.dimensions())?;
    let (width, height) = pre.dimensions();
    let values = pre
        .as_raw()
        .par_chunks_exact(3)
        .zip(post.as_raw().par_chunks_exact(3))
        .map(|(a, b)| is_significant_shift(a, b, config))
        .collect();
    Mask::from_bools(width, height, values)
}

/// Decide which pre-event vegetation pixels were lost.
///
/// A pixel counts as lost when it was vegetation before and is either no
/// longer classified as vegetation, or its color shifted significantly.
pub fn detect_changes(
    pre_classes: &ClassMap,
    post_classes: &ClassMap,
    pre_hsv: &HsvImage,
    post_hsv: &HsvImage,
    config: &ChangeConfig,
) -> Result<ChangeDetection> {
    let dims = pre_classes.dimensions();
    AssessmentError::check_dimensions("post class map", dims, post_classes.dimensions())?;
    AssessmentError::check_dimensions("pre hsv", dims, pre_hsv.dimensions())?;

    let vegetation_before = pre_classes.mask(LandCover::Vegetation);
    let vegetation_after = post_classes.mask(LandCover::Vegetation);

    let lost_by_classification = vegetation_before.and_not(&vegetation_after)?;
    let shifted = significant_hsv_change(pre_hsv, post_hsv, config)?;
    let lost_by_color = vegetation_before.and(&shifted)?;

    let change_mask = lost_by_classification.or(&lost_by_color)?;
    let refined_post = post_classes.relabel_where(&change_mask, LandCover::Land)?;

    debug!(
        "Vegetation before: {}, lost by class: {}, lost by color: {}, changed: {}",
        vegetation_before.count(),
        lost_by_classification.count(),
        lost_by_color.count(),
        change_mask.count()
    );

    Ok(ChangeDetection {
        vegetation_before,
        lost_by_classification,
        lost_by_color,
        change_mask,
        refined_post,
    })
}
