//! Error types for canopy assessment runs

use thiserror::Error;

/// Result type alias for canopyscan operations
pub type Result<T> = std::result::Result<T, AssessmentError>;

#[derive(Error, Debug)]
pub enum AssessmentError {
    /// Raster missing, empty, undecodable or of an unsupported type
    #[error("Failed to load image: {message}")]
    Load {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Two per-pixel grids that must line up do not
    #[error("Dimension mismatch in {context}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        context: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssessmentError {
    /// Load error without an underlying cause
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            source: None,
        }
    }

    /// Load error wrapping the decoder or filesystem failure
    pub fn load_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Load {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns an error unless both dimension pairs are equal
    pub fn check_dimensions(
        context: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    ) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::DimensionMismatch {
                context,
                expected,
                actual,
            })
        }
    }

    /// Message suitable for showing to the person who supplied the images
    pub fn user_message(&self) -> String {
        match self {
            AssessmentError::Load { .. } => {
                "Could not read one of the images. Please upload a valid PNG, JPEG or TIFF file."
                    .to_string()
            }
            AssessmentError::Config(_) => {
                "The assessment configuration is invalid.".to_string()
            }
            _ => {
                "Assessment processing failed. Please try again with different images.".to_string()
            }
        }
    }
}
