mod common;
use common::*;

use canopyscan::detection::{classify, hue_distance, normalize_pair};
use canopyscan::ResizeFilter;
use image::{DynamicImage, ImageBuffer, Rgb};

/// Deterministic pseudo-random scene (xorshift), covering the full color cube
fn noise_scene(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    let pixels: Vec<u8> = (0..width * height * 3).map(|_| (next() >> 24) as u8).collect();
    DynamicImage::ImageRgb8(
        ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, pixels).expect("buffer size"),
    )
}

#[test]
fn test_classification_is_deterministic() {
    let img = noise_scene(64, 48, 7).to_rgb8();
    let config = AssessmentConfig::default();

    let first = classify(&img, &config.classifier);
    let second = classify(&img, &config.classifier);
    assert_eq!(first, second);
}

#[test]
fn test_every_pixel_has_one_label() {
    let img = mixed_scene(40, 40);
    let assessment = AssessmentPipeline::new().run(&img, &noise_scene(40, 40, 3)).unwrap();

    for map in [&assessment.pre_classes, &assessment.refined_post_classes] {
        let total: usize = LandCover::ALL.iter().map(|&c| map.count(c)).sum();
        assert_eq!(total, 1600);
    }
}

#[test]
fn test_mixed_scene_has_expected_classes() {
    let img = mixed_scene(50, 50);
    let assessment = AssessmentPipeline::new().run(&img, &img).unwrap();
    let classes = &assessment.pre_classes;

    // Greenest forest pixel; the weakest quarter falls below the adaptive threshold
    assert_eq!(classes.get(17, 0), LandCover::Vegetation);
    assert_eq!(classes.get(0, 0), LandCover::Unlabeled);
    assert_eq!(classes.get(0, 15), LandCover::Water);
    assert_eq!(classes.get(0, 25), LandCover::Road);
    assert_eq!(classes.get(0, 35), LandCover::Building);
    assert_eq!(classes.get(0, 45), LandCover::Land);
}

#[test]
fn test_damage_within_bounds() {
    for seed in 1..6 {
        let pre = noise_scene(32, 32, seed);
        let post = noise_scene(32, 32, seed * 31);
        let metrics = AssessmentPipeline::new().run(&pre, &post).unwrap().metrics;

        for value in [
            metrics.forest_area_before,
            metrics.forest_area_after,
            metrics.damage_percentage,
        ] {
            assert!((0.0..=100.0).contains(&value), "seed {} gave {}", seed, value);
        }
    }
}

#[test]
fn test_identical_images_show_no_change() {
    for img in [mixed_scene(30, 30), noise_scene(30, 30, 11)] {
        let assessment = AssessmentPipeline::new().run(&img, &img).unwrap();

        assert!(assessment.change_mask.is_empty());
        assert_eq!(assessment.refined_post_classes, assessment.pre_classes);
        assert_eq!(
            assessment.metrics.forest_area_before,
            assessment.metrics.forest_area_after
        );
        assert_eq!(assessment.metrics.damage_percentage, 0.0);
    }
}

#[test]
fn test_hue_wrap_around() {
    assert_eq!(hue_distance(179, 1), 2);
    assert_eq!(hue_distance(0, 179), 1);
}

#[test]
fn test_post_resized_to_pre_dimensions() {
    let pre = mixed_scene(40, 30);
    let post = mixed_scene(80, 50);

    let pair = normalize_pair(&pre, &post, ResizeFilter::Bilinear).unwrap();
    assert!(pair.post_resized);

    let assessment = AssessmentPipeline::new().run(&pre, &post).unwrap();
    assert_eq!(assessment.pre_classes.dimensions(), (40, 30));
    assert_eq!(assessment.refined_post_classes.dimensions(), (40, 30));
    assert_eq!(assessment.change_mask.dimensions(), (40, 30));
    assert_eq!(assessment.visualizations.change.dimensions(), (40, 30));
    assert_eq!(assessment.visualizations.post.dimensions(), (40, 30));
}

#[test]
fn test_nearest_resize_keeps_solid_colors() {
    let pre = solid(10, 10, FOREST);
    let post = solid(3, 7, BARE_SOIL);
    let mut config = AssessmentConfig::default();
    config.resize_filter = ResizeFilter::Nearest;

    let assessment = AssessmentPipeline::new().with_config(config).run(&pre, &post).unwrap();
    assert_eq!(assessment.refined_post_classes.count(LandCover::Land), 100);
}

#[test]
fn test_concurrent_runs_agree() {
    let pipeline = AssessmentPipeline::new();
    let pre = mixed_scene(32, 32);
    let post = noise_scene(32, 32, 5);
    let expected = pipeline.run(&pre, &post).unwrap().metrics;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| pipeline.run(&pre, &post).unwrap().metrics))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
