use image::{GrayImage, Luma, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AssessmentError, Result};

/// Land-cover label; discriminants are the integer codes of the six-class scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LandCover {
    Building = 0,
    Land = 1,
    Road = 2,
    Vegetation = 3,
    Water = 4,
    Unlabeled = 5,
}

impl LandCover {
    pub const ALL: [LandCover; 6] = [
        LandCover::Building,
        LandCover::Land,
        LandCover::Road,
        LandCover::Vegetation,
        LandCover::Water,
        LandCover::Unlabeled,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            LandCover::Building => "building",
            LandCover::Land => "land",
            LandCover::Road => "road",
            LandCover::Vegetation => "vegetation",
            LandCover::Water => "water",
            LandCover::Unlabeled => "unlabeled",
        }
    }
}

/// Per-pixel land-cover labels, stored as an 8-bit image of class codes.
///
/// Every pixel holds exactly one valid code; the constructors are the only
/// way to produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    labels: GrayImage,
}

impl ClassMap {
    /// Map with every pixel set to `class`
    pub fn filled(width: u32, height: u32, class: LandCover) -> Self {
        Self {
            labels: GrayImage::from_pixel(width, height, Luma([class.code()])),
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> LandCover) -> Self {
        Self {
            labels: GrayImage::from_fn(width, height, |x, y| Luma([f(x, y).code()])),
        }
    }

    /// Build from row-major labels; `labels.len()` must be `width * height`
    pub fn from_labels(width: u32, height: u32, labels: Vec<LandCover>) -> Result<Self> {
        let codes: Vec<u8> = labels.into_iter().map(LandCover::code).collect();
        Self::from_codes(width, height, codes)
    }

    pub(crate) fn from_codes(width: u32, height: u32, codes: Vec<u8>) -> Result<Self> {
        let len = codes.len();
        let labels = GrayImage::from_raw(width, height, codes).ok_or(
            AssessmentError::DimensionMismatch {
                context: "class map buffer",
                expected: (width, height),
                actual: (len as u32, 1),
            },
        )?;
        Ok(Self { labels })
    }

    /// Wrap an image already holding valid class codes
    pub(crate) fn from_code_image(labels: GrayImage) -> Self {
        Self { labels }
    }

    pub fn width(&self) -> u32 {
        self.labels.width()
    }

    pub fn height(&self) -> u32 {
        self.labels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.labels.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.labels.as_raw().len()
    }

    pub fn get(&self, x: u32, y: u32) -> LandCover {
        // Constructors only ever store valid codes
        LandCover::from_code(self.labels.get_pixel(x, y)[0]).unwrap_or(LandCover::Unlabeled)
    }

    pub fn set(&mut self, x: u32, y: u32, class: LandCover) {
        self.labels.put_pixel(x, y, Luma([class.code()]));
    }

    /// Labels in row-major order
    pub fn iter(&self) -> impl Iterator<Item = LandCover> + '_ {
        self.labels
            .as_raw()
            .iter()
            .map(|&code| LandCover::from_code(code).unwrap_or(LandCover::Unlabeled))
    }

    pub fn count(&self, class: LandCover) -> usize {
        let code = class.code();
        self.labels.as_raw().par_iter().filter(|&&c| c == code).count()
    }

    /// Boolean mask of pixels labeled `class`
    pub fn mask(&self, class: LandCover) -> Mask {
        let code = class.code();
        let mut image = GrayImage::new(self.width(), self.height());
        let out: &mut [u8] = &mut image;
        out.par_iter_mut()
            .zip(self.labels.as_raw().par_iter())
            .for_each(|(m, &c)| *m = Mask::encode(c == code));
        Mask { image }
    }

    /// Copy of this map with every pixel set in `mask` relabeled as `class`
    pub fn relabel_where(&self, mask: &Mask, class: LandCover) -> Result<ClassMap> {
        AssessmentError::check_dimensions("relabel", self.dimensions(), mask.dimensions())?;
        let code = class.code();
        let codes = self
            .labels
            .as_raw()
            .par_iter()
            .zip(mask.as_image().as_raw().par_iter())
            .map(|(&c, &m)| if m != 0 { code } else { c })
            .collect();
        Self::from_codes(self.width(), self.height(), codes)
    }

    /// Underlying code image (values 0-5)
    pub fn as_image(&self) -> &GrayImage {
        &self.labels
    }
}

/// Boolean per-pixel grid, stored as a binary image (0 = false, 255 = true)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    image: GrayImage,
}

/// Mask of pixels that were vegetation before and are judged damaged now
pub type ChangeMask = Mask;

impl Mask {
    pub const SET: u8 = 255;

    pub(crate) fn encode(value: bool) -> u8 {
        if value { Self::SET } else { 0 }
    }

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        Self {
            image: GrayImage::from_fn(width, height, |x, y| Luma([Self::encode(f(x, y))])),
        }
    }

    /// Any non-zero pixel counts as set
    pub fn from_image(image: GrayImage) -> Self {
        let mut image = image;
        let data: &mut [u8] = &mut image;
        data.par_iter_mut().for_each(|p| *p = Self::encode(*p != 0));
        Self { image }
    }

    pub(crate) fn from_bools(width: u32, height: u32, values: Vec<bool>) -> Result<Self> {
        let len = values.len();
        let data = values.into_iter().map(Self::encode).collect();
        let image = GrayImage::from_raw(width, height, data).ok_or(
            AssessmentError::DimensionMismatch {
                context: "mask buffer",
                expected: (width, height),
                actual: (len as u32, 1),
            },
        )?;
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] != 0
    }

    pub fn count(&self) -> usize {
        self.image.as_raw().par_iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn and(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && b)
    }

    pub fn or(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a || b)
    }

    /// Pixels set here and not set in `other`
    pub fn and_not(&self, other: &Mask) -> Result<Mask> {
        self.combine(other, |a, b| a && !b)
    }

    fn combine(&self, other: &Mask, f: impl Fn(bool, bool) -> bool + Sync) -> Result<Mask> {
        AssessmentError::check_dimensions("mask combine", self.dimensions(), other.dimensions())?;
        let (width, height) = self.dimensions();
        let values = self
            .image
            .as_raw()
            .par_iter()
            .zip(other.image.as_raw().par_iter())
            .map(|(&a, &b)| f(a != 0, b != 0))
            .collect();
        Mask::from_bools(width, height, values)
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Forest cover and loss, each a percentage in [0, 100] rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageMetrics {
    pub forest_area_before: f64,
    pub forest_area_after: f64,
    pub damage_percentage: f64,
}

/// Share of pixels per land-cover class, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub building: f64,
    pub land: f64,
    pub road: f64,
    pub vegetation: f64,
    pub water: f64,
    pub unlabeled: f64,
}

impl ClassDistribution {
    pub fn get(&self, class: LandCover) -> f64 {
        match class {
            LandCover::Building => self.building,
            LandCover::Land => self.land,
            LandCover::Road => self.road,
            LandCover::Vegetation => self.vegetation,
            LandCover::Water => self.water,
            LandCover::Unlabeled => self.unlabeled,
        }
    }

    pub(crate) fn set(&mut self, class: LandCover, value: f64) {
        let slot = match class {
            LandCover::Building => &mut self.building,
            LandCover::Land => &mut self.land,
            LandCover::Road => &mut self.road,
            LandCover::Vegetation => &mut self.vegetation,
            LandCover::Water => &mut self.water,
            LandCover::Unlabeled => &mut self.unlabeled,
        };
        *slot = value;
    }
}

/// Rendered color-coded rasters, all with the pre raster's dimensions
#[derive(Debug, Clone)]
pub struct Visualizations {
    pub pre: RgbImage,
    pub post: RgbImage,
    pub change: RgbImage,
}

/// Everything one assessment run produces, held in memory
#[derive(Debug, Clone)]
pub struct Assessment {
    pub metrics: DamageMetrics,
    pub pre_distribution: ClassDistribution,
    pub post_distribution: ClassDistribution,
    pub pre_classes: ClassMap,
    /// Post map after damaged vegetation was reassigned to land
    pub refined_post_classes: ClassMap,
    pub change_mask: ChangeMask,
    pub visualizations: Visualizations,
}
