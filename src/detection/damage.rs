use rayon::prelude::*;

use crate::error::{AssessmentError, Result};
use crate::models::{ClassDistribution, ClassMap, DamageMetrics, LandCover};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Forest cover before and after, and the share of pre-event vegetation lost.
///
/// `post` is expected to be the refined post map, where damaged vegetation
/// has already been relabeled.
pub fn calculate_damage(pre: &ClassMap, post: &ClassMap) -> Result<DamageMetrics> {
    AssessmentError::check_dimensions("damage calculation", pre.dimensions(), post.dimensions())?;

    let total = pre.pixel_count();
    let vegetation = LandCover::Vegetation.code();

    let (before, after, intact) = pre
        .as_image()
        .as_raw()
        .par_iter()
        .zip(post.as_image().as_raw().par_iter())
        .map(|(&a, &b)| {
            let was = a == vegetation;
            let is = b == vegetation;
            (was as usize, is as usize, (was && is) as usize)
        })
        .reduce(|| (0, 0, 0), |x, y| (x.0 + y.0, x.1 + y.1, x.2 + y.2));

    let lost = before - intact;
    let damage = if before == 0 {
        0.0
    } else {
        (lost as f64 / before as f64 * 100.0).clamp(0.0, 100.0)
    };

    Ok(DamageMetrics {
        forest_area_before: round2(percent(before, total)),
        forest_area_after: round2(percent(after, total)),
        damage_percentage: round2(damage),
    })
}

/// Percentage of pixels carrying each label
pub fn class_distribution(map: &ClassMap) -> ClassDistribution {
    let counts = map
        .as_image()
        .as_raw()
        .par_iter()
        .fold(
            || [0usize; 6],
            |mut counts, &code| {
                if let Some(slot) = counts.get_mut(code as usize) {
                    *slot += 1;
                }
                counts
            },
        )
        .reduce(
            || [0usize; 6],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                a
            },
        );

    let total = map.pixel_count();
    let mut distribution = ClassDistribution::default();
    for class in LandCover::ALL {
        distribution.set(class, round2(percent(counts[class.code() as usize], total)));
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_partial_loss() {
        // 4 of 10 pixels vegetated before, one of them lost
        let pre = ClassMap::from_fn(10, 1, |x, _| {
            if x < 4 { LandCover::Vegetation } else { LandCover::Road }
        });
        let post = ClassMap::from_fn(10, 1, |x, _| {
            if x < 3 { LandCover::Vegetation } else { LandCover::Land }
        });

        let metrics = calculate_damage(&pre, &post).unwrap();
        assert_eq!(metrics.forest_area_before, 40.0);
        assert_eq!(metrics.forest_area_after, 30.0);
        assert_eq!(metrics.damage_percentage, 25.0);
    }

    #[test]
    fn test_new_vegetation_does_not_offset_loss() {
        // Vegetation moves: the lost pixel counts even though cover is unchanged
        let pre = ClassMap::from_fn(2, 1, |x, _| {
            if x == 0 { LandCover::Vegetation } else { LandCover::Land }
        });
        let post = ClassMap::from_fn(2, 1, |x, _| {
            if x == 1 { LandCover::Vegetation } else { LandCover::Land }
        });

        let metrics = calculate_damage(&pre, &post).unwrap();
        assert_eq!(metrics.forest_area_before, metrics.forest_area_after);
        assert_eq!(metrics.damage_percentage, 100.0);
    }

    #[test]
    fn test_no_vegetation_means_no_damage() {
        let map = ClassMap::filled(5, 5, LandCover::Building);
        let metrics = calculate_damage(&map, &map).unwrap();
        assert_eq!(metrics.forest_area_before, 0.0);
        assert_eq!(metrics.damage_percentage, 0.0);
    }

    #[test]
    fn test_distribution_sums_to_hundred() {
        let map = ClassMap::from_fn(3, 1, |x, _| LandCover::ALL[x as usize]);
        let distribution = class_distribution(&map);

        assert_eq!(distribution.building, 33.33);
        assert_eq!(distribution.road, 33.33);
        assert_eq!(distribution.water, 0.0);
        let sum: f64 = LandCover::ALL.iter().map(|&c| distribution.get(c)).sum();
        assert!((sum - 100.0).abs() < 0.05);
    }
}
