use canopyscan::AssessmentPipeline;
use std::env;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <pre_image> <post_image>", args[0]);
        std::process::exit(1);
    }
    canopyscan::logger::init(true);

    let debug_dir = PathBuf::from("debug_output");

    // Remove directory if it exists (for testing)
    if debug_dir.exists() {
        std::fs::remove_dir_all(&debug_dir)?;
    }

    let pipeline = AssessmentPipeline::new()
        .with_verbose(true)
        .with_debug(debug_dir.clone())?;

    println!("Running assessment with debug mode...");
    let (assessment, timings) = pipeline.run_with_timings(
        &canopyscan::loader::load_raster(Path::new(&args[1]))?,
        &canopyscan::loader::load_raster(Path::new(&args[2]))?,
    )?;

    println!("\n✓ Assessment completed!");
    println!("  Damage: {:.2}%", assessment.metrics.damage_percentage);
    println!("\nDebug outputs saved to: {}/", debug_dir.display());
    println!("  00_input/     - Pre and post images as loaded");
    println!("  01_normalize/ - Aligned post image, HSV planes");
    println!("  02_classify/  - Rescaled excess-green index");
    println!("  03_change/    - Vegetation, loss cues and final change mask");
    println!("  04_render/    - Class and change visualizations");

    println!("\n{}", timings.summary());
    Ok(())
}
