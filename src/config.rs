//! Tunable thresholds for classification and change detection.
//!
//! Defaults reproduce the reference heuristics. A configuration can be
//! stored as JSON and loaded back for reproducible runs:
//!
//! ```no_run
//! use canopyscan::AssessmentConfig;
//! use std::path::Path;
//!
//! let config = AssessmentConfig::from_json_file(Path::new("thresholds.json"))?;
//! # Ok::<(), canopyscan::AssessmentError>(())
//! ```

use crate::error::{AssessmentError, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration for one assessment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Per-pixel land-cover rules
    pub classifier: ClassifierConfig,

    /// HSV refinement of the vegetation change mask
    pub change: ChangeConfig,

    /// Filter used when the post raster must be resampled to pre dimensions
    #[serde(default)]
    pub resize_filter: ResizeFilter,
}

/// Color-rule thresholds for the land-cover classifier.
///
/// Channel values are 8-bit; intensity is the mean of R, G and B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Water requires intensity strictly below this
    pub water_max_intensity: f32,

    /// Lower bound on the adaptive excess-green threshold
    pub exg_threshold_floor: f32,

    /// Percentile (0-100) of rescaled ExG over green-dominant pixels
    pub exg_percentile: f32,

    /// Threshold used when no pixel is green-dominant
    pub exg_fallback_threshold: f32,

    /// Max |R-G| and |G-B| for a pixel to count as neutral grey
    pub neutral_tolerance: i16,

    /// Inclusive intensity band for roads
    pub road_min_intensity: f32,
    pub road_max_intensity: f32,

    /// Building requires intensity strictly below this
    pub building_max_intensity: f32,

    /// Stricter dark sub-case, folded into the building label
    pub building_dark_intensity: f32,

    /// Red must exceed green and blue by more than this for land
    pub land_red_margin: i16,
}

/// HSV difference thresholds for the change detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeConfig {
    /// Wrapped hue difference (8-bit hue units, 0-90)
    pub hue_threshold: u8,
    pub saturation_threshold: u8,
    pub value_threshold: u8,
}

/// Resampling filter for dimension alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Bilinear,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            water_max_intensity: 180.0,
            exg_threshold_floor: 35.0,
            exg_percentile: 25.0,
            exg_fallback_threshold: 70.0,
            neutral_tolerance: 30,
            road_min_intensity: 80.0,
            road_max_intensity: 220.0,
            building_max_intensity: 100.0,
            building_dark_intensity: 70.0,
            land_red_margin: 15,
        }
    }
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            hue_threshold: 12,
            saturation_threshold: 40,
            value_threshold: 40,
        }
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            change: ChangeConfig::default(),
            resize_filter: ResizeFilter::default(),
        }
    }
}

impl AssessmentConfig {
    /// Reject values that would make the rules meaningless
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if !(0.0..=100.0).contains(&c.exg_percentile) {
            return Err(AssessmentError::Config(format!(
                "exg_percentile must be within 0-100, got {}",
                c.exg_percentile
            )));
        }
        if c.road_min_intensity > c.road_max_intensity {
            return Err(AssessmentError::Config(format!(
                "road intensity band is empty: [{}, {}]",
                c.road_min_intensity, c.road_max_intensity
            )));
        }
        if self.change.hue_threshold > 90 {
            return Err(AssessmentError::Config(format!(
                "hue_threshold {} exceeds the largest wrapped hue difference (90)",
                self.change.hue_threshold
            )));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AssessmentError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssessmentError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AssessmentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AssessmentConfig::default();
        config.change.hue_threshold = 20;
        config.resize_filter = ResizeFilter::Nearest;
        config.to_json_file(&path).unwrap();

        let loaded = AssessmentConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_resize_filter_defaults_when_missing() {
        let json = serde_json::to_value(AssessmentConfig::default()).unwrap();
        let mut object = json.as_object().unwrap().clone();
        object.remove("resize_filter");

        let config: AssessmentConfig = serde_json::from_value(object.into()).unwrap();
        assert_eq!(config.resize_filter, ResizeFilter::Bilinear);
    }

    #[test]
    fn test_invalid_percentile_rejected() {
        let mut config = AssessmentConfig::default();
        config.classifier.exg_percentile = 140.0;
        assert!(matches!(config.validate(), Err(AssessmentError::Config(_))));
    }
}
