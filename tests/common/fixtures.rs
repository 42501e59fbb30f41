use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use tempfile::NamedTempFile;

/// Colors used across the scenario tests
pub const FOREST: [u8; 3] = [0, 200, 0];
pub const BARE_SOIL: [u8; 3] = [150, 90, 40];
pub const LAKE: [u8; 3] = [20, 60, 140];
pub const CONCRETE: [u8; 3] = [150, 150, 150];
pub const ROOF: [u8; 3] = [40, 30, 30];

/// Solid-color raster
pub fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// Raster whose left `split` columns use `left` and the rest `right`
pub fn split_columns(
    width: u32,
    height: u32,
    split: u32,
    left: [u8; 3],
    right: [u8; 3],
) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, _| {
        if x < split { Rgb(left) } else { Rgb(right) }
    }))
}

/// A varied scene: forest, lake, road, roofs and soil in horizontal bands,
/// with some per-pixel jitter so the ExG distribution is not flat
pub fn mixed_scene(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
        let jitter = ((x * 7 + y * 13) % 20) as u8;
        match (y * 5) / height {
            0 => Rgb([10 + jitter, 150 + jitter, 20]),
            1 => Rgb([LAKE[0], LAKE[1], LAKE[2] + jitter]),
            2 => Rgb([CONCRETE[0] + jitter, CONCRETE[1] + jitter, CONCRETE[2] + jitter]),
            3 => Rgb([ROOF[0] + jitter, ROOF[1], ROOF[2]]),
            _ => Rgb([BARE_SOIL[0] + jitter, BARE_SOIL[1], BARE_SOIL[2]]),
        }
    }))
}

/// Writes `img` as a PNG temp file, cleaned up on drop
pub fn write_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
