//! Decoding of input rasters from files or memory

use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::detection::preprocessing::ensure_non_empty;
use crate::error::{AssessmentError, Result};

/// File extensions accepted for input images
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

/// Whether `path` carries one of the accepted extensions (case-insensitive)
pub fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Load and decode an image file
pub fn load_raster(path: &Path) -> Result<DynamicImage> {
    if !has_allowed_extension(path) {
        return Err(AssessmentError::load(format!(
            "{}: unsupported file type (expected one of {})",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let img = ImageReader::open(path)
        .map_err(|e| AssessmentError::load_with(format!("{}: cannot open", path.display()), e))?
        .decode()
        .map_err(|e| AssessmentError::load_with(format!("{}: cannot decode", path.display()), e))?;

    ensure_non_empty(&img, &path.display().to_string())?;
    debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Decode an in-memory image, guessing the format from its contents
pub fn decode_raster(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AssessmentError::load("image buffer is empty"));
    }

    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AssessmentError::load_with("cannot read image buffer", e))?
        .decode()
        .map_err(|e| AssessmentError::load_with("cannot decode image buffer", e))?;

    ensure_non_empty(&img, "buffer")?;
    Ok(img)
}
