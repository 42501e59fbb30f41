mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from canopyscan for tests
pub use canopyscan::{
    ArtifactStore, Assessment, AssessmentConfig, AssessmentError, AssessmentPipeline,
    AssessmentRecord, ClassMap, ColorPalette, LandCover,
};
