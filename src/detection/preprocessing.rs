use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use palette::{FromColor, Hsv, Srgb};
use rayon::prelude::*;
use tracing::debug;

use crate::config::ResizeFilter;
use crate::error::{AssessmentError, Result};

/// HSV planes in the 8-bit convention: channel 0 is hue in [0, 180),
/// channels 1 and 2 are saturation and value in [0, 255]
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// One input raster in the representations later stages need
#[derive(Debug, Clone)]
pub struct NormalizedRaster {
    pub rgb: RgbImage,
    pub hsv: HsvImage,
}

impl NormalizedRaster {
    pub fn from_rgb(rgb: RgbImage) -> Self {
        let hsv = to_hsv(&rgb);
        Self { rgb, hsv }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgb.dimensions()
    }
}

/// Pre and post rasters aligned to the pre raster's dimensions
#[derive(Debug, Clone)]
pub struct NormalizedPair {
    pub pre: NormalizedRaster,
    pub post: NormalizedRaster,
    /// Whether the post raster had to be resampled
    pub post_resized: bool,
}

/// Reject rasters with no pixel data
pub fn ensure_non_empty(img: &DynamicImage, label: &str) -> Result<()> {
    if img.width() == 0 || img.height() == 0 {
        return Err(AssessmentError::load(format!(
            "{} image has no pixels ({}x{})",
            label,
            img.width(),
            img.height()
        )));
    }
    Ok(())
}

/// Convert to 8-bit RGB and resample `post` to the dimensions of `pre` if they differ
pub fn normalize_pair(
    pre: &DynamicImage,
    post: &DynamicImage,
    filter: ResizeFilter,
) -> Result<NormalizedPair> {
    ensure_non_empty(pre, "pre-event")?;
    ensure_non_empty(post, "post-event")?;

    let (width, height) = (pre.width(), pre.height());
    let post_resized = (post.width(), post.height()) != (width, height);

    let post_rgb = if post_resized {
        debug!(
            "Resampling post image {}x{} -> {}x{}",
            post.width(),
            post.height(),
            width,
            height
        );
        post.resize_exact(width, height, filter.into()).to_rgb8()
    } else {
        post.to_rgb8()
    };

    Ok(NormalizedPair {
        pre: NormalizedRaster::from_rgb(pre.to_rgb8()),
        post: NormalizedRaster::from_rgb(post_rgb),
        post_resized,
    })
}

/// Convert a whole RGB raster to 8-bit HSV
pub fn to_hsv(rgb: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(rgb.width(), rgb.height());
    let out: &mut [u8] = &mut hsv;
    out.par_chunks_exact_mut(3)
        .zip(rgb.as_raw().par_chunks_exact(3))
        .for_each(|(dst, src)| dst.copy_from_slice(&rgb_to_hsv(src[0], src[1], src[2])));
    hsv
}

/// Single-pixel RGB to HSV. Hue is degrees halved and rounded; 180 wraps to 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let srgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let hsv: Hsv = Hsv::from_color(srgb);

    let degrees = hsv.hue.into_positive_degrees();
    let h = ((degrees / 2.0).round() as u32 % 180) as u8;
    let s = (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8;
    let v = (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8;
    [h, s, v]
}
