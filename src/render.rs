//! Color-coded renderings of class maps and change masks

use image::{Luma, Rgb, RgbImage};
use imageproc::map::{map_colors, map_colors2};

use crate::error::{AssessmentError, Result};
use crate::models::{ChangeMask, ClassMap, LandCover, Mask};

/// Fixed label colors of the six-class scheme
pub struct ColorPalette;

impl ColorPalette {
    pub const BUILDING: Rgb<u8> = Rgb([0x3C, 0x10, 0x98]);
    pub const LAND: Rgb<u8> = Rgb([0x84, 0x29, 0xF6]);
    pub const ROAD: Rgb<u8> = Rgb([0x6E, 0xC1, 0xE4]);
    pub const VEGETATION: Rgb<u8> = Rgb([0xFE, 0xDD, 0x3A]);
    pub const WATER: Rgb<u8> = Rgb([0xE2, 0xA9, 0x29]);
    pub const UNLABELED: Rgb<u8> = Rgb([0x9B, 0x9B, 0x9B]);

    pub const fn color(class: LandCover) -> Rgb<u8> {
        match class {
            LandCover::Building => Self::BUILDING,
            LandCover::Land => Self::LAND,
            LandCover::Road => Self::ROAD,
            LandCover::Vegetation => Self::VEGETATION,
            LandCover::Water => Self::WATER,
            LandCover::Unlabeled => Self::UNLABELED,
        }
    }

    /// Hex string like `#3C1098`
    pub fn hex(class: LandCover) -> String {
        let Rgb([r, g, b]) = Self::color(class);
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
pub const WAS_VEGETATION: Rgb<u8> = Rgb([0, 255, 0]);
pub const DAMAGED: Rgb<u8> = Rgb([255, 0, 0]);

/// Paint every pixel with its class color
pub fn render_classes(classes: &ClassMap) -> RgbImage {
    map_colors(classes.as_image(), |Luma([code])| {
        LandCover::from_code(code)
            .map(ColorPalette::color)
            .unwrap_or(ColorPalette::UNLABELED)
    })
}

/// Black background, green where there was vegetation, red where it was lost
pub fn render_change(vegetation_before: &Mask, change: &ChangeMask) -> Result<RgbImage> {
    AssessmentError::check_dimensions(
        "change rendering",
        vegetation_before.dimensions(),
        change.dimensions(),
    )?;
    Ok(map_colors2(
        vegetation_before.as_image(),
        change.as_image(),
        |Luma([was]), Luma([lost])| {
            if lost != 0 {
                DAMAGED
            } else if was != 0 {
                WAS_VEGETATION
            } else {
                BACKGROUND
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_hex() {
        assert_eq!(ColorPalette::hex(LandCover::Building), "#3C1098");
        assert_eq!(ColorPalette::hex(LandCover::Vegetation), "#FEDD3A");
        assert_eq!(ColorPalette::hex(LandCover::Unlabeled), "#9B9B9B");
    }

    #[test]
    fn test_render_classes() {
        let map = ClassMap::from_fn(2, 1, |x, _| {
            if x == 0 { LandCover::Water } else { LandCover::Road }
        });
        let img = render_classes(&map);

        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(*img.get_pixel(0, 0), ColorPalette::WATER);
        assert_eq!(*img.get_pixel(1, 0), ColorPalette::ROAD);
    }

    #[test]
    fn test_damage_overrides_vegetation() {
        let was = Mask::from_fn(3, 1, |x, _| x < 2);
        let lost = Mask::from_fn(3, 1, |x, _| x == 1);
        let img = render_change(&was, &lost).unwrap();

        assert_eq!(*img.get_pixel(0, 0), WAS_VEGETATION);
        assert_eq!(*img.get_pixel(1, 0), DAMAGED);
        assert_eq!(*img.get_pixel(2, 0), BACKGROUND);
    }

    #[test]
    fn test_change_dimension_mismatch() {
        let result = render_change(&Mask::new(2, 2), &Mask::new(2, 3));
        assert!(matches!(result, Err(AssessmentError::DimensionMismatch { .. })));
    }
}
