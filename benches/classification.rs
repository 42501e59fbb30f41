use criterion::{black_box, criterion_group, criterion_main, Criterion};
use canopyscan::detection::{classify, preprocessing};
use canopyscan::{AssessmentPipeline, ClassifierConfig};
use image::{DynamicImage, Rgb, RgbImage};

fn scene(width: u32, height: u32, shift: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 31 + y * 17 + shift) % 256) as u8;
        match (x / 64 + y / 64) % 3 {
            0 => Rgb([v / 4, 120 + v / 3, v / 5]),
            1 => Rgb([140 + v / 4, 90, 40]),
            _ => Rgb([v, v, v]),
        }
    })
}

fn benchmark_stages(c: &mut Criterion) {
    let img = scene(1024, 768, 0);
    let config = ClassifierConfig::default();

    c.bench_function("to_hsv_1024x768", |b| {
        b.iter(|| preprocessing::to_hsv(black_box(&img)))
    });

    c.bench_function("classify_1024x768", |b| {
        b.iter(|| classify(black_box(&img), &config))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let pre = DynamicImage::ImageRgb8(scene(1024, 768, 0));
    let post = DynamicImage::ImageRgb8(scene(1024, 768, 90));
    let pipeline = AssessmentPipeline::new();

    c.bench_function("assess_1024x768", |b| {
        b.iter(|| pipeline.run(black_box(&pre), black_box(&post)))
    });
}

criterion_group!(benches, benchmark_stages, benchmark_pipeline);
criterion_main!(benches);
