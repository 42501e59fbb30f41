use canopyscan::{AssessmentConfig, AssessmentPipeline, LandCover};
use std::env;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <pre_image> <post_image>", args[0]);
        std::process::exit(1);
    }
    canopyscan::logger::init(false);

    let pre = canopyscan::loader::load_raster(Path::new(&args[1]))?;
    let post = canopyscan::loader::load_raster(Path::new(&args[2]))?;
    println!("Loaded {}x{} / {}x{}", pre.width(), pre.height(), post.width(), post.height());

    // Example 1: default thresholds
    println!("\n=== Default Thresholds ===");
    let standard = AssessmentPipeline::new().run(&pre, &post)?;
    print_summary(&standard);

    // Example 2: only strong color shifts count as damage
    println!("\n=== Conservative Change Detection ===");
    let mut conservative = AssessmentConfig::default();
    conservative.change.hue_threshold = 20;
    conservative.change.saturation_threshold = 70;
    conservative.change.value_threshold = 70;
    let result = AssessmentPipeline::new().with_config(conservative).run(&pre, &post)?;
    print_summary(&result);

    // Example 3: stricter vegetation rule (higher ExG floor)
    println!("\n=== Strict Vegetation Rule ===");
    let mut strict = AssessmentConfig::default();
    strict.classifier.exg_threshold_floor = 80.0;
    strict.classifier.exg_percentile = 40.0;
    let result = AssessmentPipeline::new().with_config(strict).run(&pre, &post)?;
    print_summary(&result);

    Ok(())
}

fn print_summary(assessment: &canopyscan::Assessment) {
    let m = &assessment.metrics;
    println!(
        "  forest before {:.2}%, after {:.2}%, damage {:.2}%",
        m.forest_area_before, m.forest_area_after, m.damage_percentage
    );
    for class in LandCover::ALL {
        println!("    {:<11} {:>6.2}%", class.name(), assessment.pre_distribution.get(class));
    }
}
