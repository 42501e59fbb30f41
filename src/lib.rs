//! # canopyscan
//!
//! Forest-canopy loss assessment from a pre-event and a post-event aerial
//! image. Both rasters are classified into six land-cover classes with
//! color rules, pre-event vegetation is compared against the post image
//! (label change plus an HSV color-shift cue), and the loss is reported as
//! percentages together with color-coded renderings.
//!
//! ```rust,no_run
//! use canopyscan::AssessmentPipeline;
//! use std::path::Path;
//!
//! let assessment = AssessmentPipeline::new()
//!     .run_files(Path::new("pre.jpg"), Path::new("post.jpg"))?;
//! println!("damage: {:.2}%", assessment.metrics.damage_percentage);
//! # Ok::<(), canopyscan::AssessmentError>(())
//! ```

pub mod artifacts;
pub mod config;
pub mod detection;
pub mod error;
pub mod loader;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod timing;

pub use artifacts::{ArtifactStore, AssessmentRecord};
pub use config::{AssessmentConfig, ChangeConfig, ClassifierConfig, ResizeFilter};
pub use error::{AssessmentError, Result};
pub use models::{
    Assessment, ChangeMask, ClassDistribution, ClassMap, DamageMetrics, LandCover, Mask,
    Visualizations,
};
pub use pipeline::{AssessmentPipeline, DebugConfig, PipelineContext};
pub use render::ColorPalette;
pub use timing::PipelineTimings;
