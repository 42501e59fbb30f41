//! Rule-based land-cover classification.
//!
//! Each pixel is tested against five color rules (water, vegetation, road,
//! building, land). Several rules may hold for the same pixel; the label is
//! resolved by a fixed override order:
//!
//! 1. land
//! 2. building, unless land
//! 3. road, unless building or land
//! 4. vegetation, unless water or road
//! 5. water, always
//!
//! The vegetation rule uses an excess-green index (`2G - R - B`) rescaled to
//! `0..=255` over the whole image and compared against a per-image threshold
//! derived from the green-dominant pixels.

use image::{GrayImage, RgbImage};
use rayon::prelude::*;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::models::{ClassMap, LandCover};

/// Classifier output plus the intermediates behind the vegetation rule
#[derive(Debug, Clone)]
pub struct Classification {
    pub classes: ClassMap,
    /// Excess-green index rescaled to 0-255
    pub exg: GrayImage,
    /// Threshold the rescaled index had to reach for vegetation
    pub vegetation_threshold: f32,
    pub green_dominant_pixels: usize,
}

/// Classify every pixel of `rgb`
pub fn classify(rgb: &RgbImage, config: &ClassifierConfig) -> ClassMap {
    classify_detailed(rgb, config).classes
}

pub fn classify_detailed(rgb: &RgbImage, config: &ClassifierConfig) -> Classification {
    let (width, height) = rgb.dimensions();
    let pixels = rgb.as_raw();

    let exg = rescaled_excess_green(rgb);
    let (histogram, green_dominant_pixels) = green_dominant_histogram(pixels, exg.as_raw());

    let vegetation_threshold = if green_dominant_pixels == 0 {
        config.exg_fallback_threshold
    } else {
        let pct = histogram_percentile(&histogram, green_dominant_pixels, config.exg_percentile);
        (pct as f32).max(config.exg_threshold_floor)
    };

    debug!(
        "ExG threshold {:.2} from {} green-dominant pixels",
        vegetation_threshold, green_dominant_pixels
    );

    let mut labels = GrayImage::new(width, height);
    let out: &mut [u8] = &mut labels;
    out.par_iter_mut()
        .zip(pixels.par_chunks_exact(3))
        .zip(exg.as_raw().par_iter())
        .for_each(|((code, px), &e)| {
            *code = label_pixel(px[0], px[1], px[2], e, vegetation_threshold, config).code();
        });
    let classes = ClassMap::from_code_image(labels);

    Classification {
        classes,
        exg,
        vegetation_threshold,
        green_dominant_pixels,
    }
}

#[inline]
fn is_green_dominant(r: u8, g: u8, b: u8) -> bool {
    g > r && g > b
}

#[inline]
fn excess_green(r: u8, g: u8, b: u8) -> i32 {
    2 * g as i32 - r as i32 - b as i32
}

/// Min-max rescale of `2G - R - B` to 0-255 (truncating).
///
/// An image whose index is constant has no range to rescale over; every
/// pixel then maps to 255 so a uniformly green image still passes the
/// vegetation threshold.
pub fn rescaled_excess_green(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let pixels = rgb.as_raw();

    let (min, max) = pixels
        .par_chunks_exact(3)
        .map(|px| excess_green(px[0], px[1], px[2]))
        .fold(
            || (i32::MAX, i32::MIN),
            |(lo, hi), e| (lo.min(e), hi.max(e)),
        )
        .reduce(
            || (i32::MAX, i32::MIN),
            |(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)),
        );

    let mut exg = GrayImage::new(width, height);
    let out: &mut [u8] = &mut exg;

    if max <= min {
        out.par_iter_mut().for_each(|v| *v = u8::MAX);
        return exg;
    }

    let range = (max - min) as f32;
    out.par_iter_mut()
        .zip(pixels.par_chunks_exact(3))
        .for_each(|(v, px)| {
            let e = excess_green(px[0], px[1], px[2]);
            *v = ((e - min) as f32 / range * 255.0) as u8;
        });
    exg
}

/// Histogram of rescaled ExG over green-dominant pixels, and their count
fn green_dominant_histogram(pixels: &[u8], exg: &[u8]) -> ([usize; 256], usize) {
    let histogram = pixels
        .par_chunks_exact(3)
        .zip(exg.par_iter())
        .filter(|(px, _)| is_green_dominant(px[0], px[1], px[2]))
        .fold(
            || [0usize; 256],
            |mut hist, (_, &e)| {
                hist[e as usize] += 1;
                hist
            },
        )
        .reduce(
            || [0usize; 256],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                a
            },
        );
    let count = histogram.iter().sum();
    (histogram, count)
}

/// Value of rank `k` (0-based) in the sorted sample the histogram describes
fn order_statistic(histogram: &[usize; 256], k: usize) -> f64 {
    let mut seen = 0;
    for (value, &n) in histogram.iter().enumerate() {
        seen += n;
        if seen > k {
            return value as f64;
        }
    }
    255.0
}

/// Percentile with linear interpolation between closest ranks.
///
/// `count` must equal the sum of the histogram and be non-zero.
pub fn histogram_percentile(histogram: &[usize; 256], count: usize, percentile: f32) -> f64 {
    debug_assert!(count > 0);
    let rank = (percentile.clamp(0.0, 100.0) as f64 / 100.0) * (count - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let lo_value = order_statistic(histogram, lo);
    if hi == lo {
        return lo_value;
    }
    let hi_value = order_statistic(histogram, hi);
    lo_value + (hi_value - lo_value) * (rank - lo as f64)
}

/// Resolve the label of one pixel.
///
/// Mirrors the override order in the module docs: the last rule to fire wins.
pub fn label_pixel(
    r: u8,
    g: u8,
    b: u8,
    exg: u8,
    vegetation_threshold: f32,
    config: &ClassifierConfig,
) -> LandCover {
    let (ri, gi, bi) = (r as i16, g as i16, b as i16);
    let intensity = (r as f32 + g as f32 + b as f32) / 3.0;
    let green_dominant = is_green_dominant(r, g, b);

    let water = bi > ri && bi > gi && intensity < config.water_max_intensity;
    let vegetation = green_dominant && exg as f32 >= vegetation_threshold;

    let tol = config.neutral_tolerance;
    let neutral = (ri - gi).abs() < tol && (gi - bi).abs() < tol;
    let road = neutral
        && intensity >= config.road_min_intensity
        && intensity <= config.road_max_intensity
        && !green_dominant;

    let building = (intensity < config.building_max_intensity
        || intensity < config.building_dark_intensity)
        && !water
        && !green_dominant;

    let margin = config.land_red_margin;
    let land = ri > gi + margin && ri > bi + margin && !neutral && !green_dominant;

    if water {
        LandCover::Water
    } else if vegetation && !road {
        LandCover::Vegetation
    } else if road && !building && !land {
        LandCover::Road
    } else if building && !land {
        LandCover::Building
    } else if land {
        LandCover::Land
    } else {
        LandCover::Unlabeled
    }
}
