//! File-based storage of assessment outputs.
//!
//! The analysis itself never touches the filesystem; this store is the
//! collaborator that names and writes the rendered rasters and the result
//! record for one run.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{AssessmentError, Result};
use crate::models::{Assessment, ClassDistribution};

/// Flat result record persisted next to the rendered rasters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub forest_area_before: f64,
    pub forest_area_after: f64,
    pub damage_percentage: f64,
    /// Paths relative to the store directory
    pub pre_vis_path: PathBuf,
    pub post_vis_path: PathBuf,
    pub change_vis_path: PathBuf,
    pub pre_distribution: ClassDistribution,
    pub post_distribution: ClassDistribution,
}

impl AssessmentRecord {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AssessmentError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Writes assessment artifacts into one directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the three visualizations and the JSON record, returning the record
    pub fn save(&self, assessment: &Assessment) -> Result<AssessmentRecord> {
        let created_at = OffsetDateTime::now_utc();
        let suffix = self.unique_suffix(created_at.unix_timestamp());

        let pre_vis_path = PathBuf::from(format!("pre_vis_{}.png", suffix));
        let post_vis_path = PathBuf::from(format!("post_vis_{}.png", suffix));
        let change_vis_path = PathBuf::from(format!("change_vis_{}.png", suffix));

        self.write_image(&pre_vis_path, &assessment.visualizations.pre)?;
        self.write_image(&post_vis_path, &assessment.visualizations.post)?;
        self.write_image(&change_vis_path, &assessment.visualizations.change)?;

        let metrics = &assessment.metrics;
        let record = AssessmentRecord {
            id: Uuid::new_v4(),
            created_at,
            forest_area_before: metrics.forest_area_before,
            forest_area_after: metrics.forest_area_after,
            damage_percentage: metrics.damage_percentage,
            pre_vis_path,
            post_vis_path,
            change_vis_path,
            pre_distribution: assessment.pre_distribution,
            post_distribution: assessment.post_distribution,
        };

        let record_path = self.root.join(format!("assessment_{}.json", suffix));
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| AssessmentError::Config(e.to_string()))?;
        std::fs::write(&record_path, json)?;

        info!("Saved assessment {} to {}", record.id, self.root.display());
        Ok(record)
    }

    /// Absolute location of a path stored in a record
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    fn write_image(&self, relative: &Path, img: &RgbImage) -> Result<()> {
        let path = self.root.join(relative);
        img.save(&path).map_err(|source| AssessmentError::Encode {
            path: path.display().to_string(),
            source,
        })
    }

    /// `timestamp`, or `timestamp_N` if a run with that timestamp is already stored
    fn unique_suffix(&self, timestamp: i64) -> String {
        let taken = |suffix: &str| {
            ["pre_vis", "post_vis", "change_vis"]
                .iter()
                .any(|prefix| self.root.join(format!("{}_{}.png", prefix, suffix)).exists())
                || self.root.join(format!("assessment_{}.json", suffix)).exists()
        };

        let mut suffix = timestamp.to_string();
        let mut n = 1;
        while taken(&suffix) {
            suffix = format!("{}_{}", timestamp, n);
            n += 1;
        }
        suffix
    }
}
