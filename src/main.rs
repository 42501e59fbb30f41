use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use canopyscan::{logger, ArtifactStore, AssessmentConfig, AssessmentPipeline, LandCover};

#[derive(Parser)]
#[command(name = "canopyscan")]
#[command(about = "Assess forest canopy loss from pre- and post-event aerial images")]
struct Cli {
    /// Image taken before the event
    #[arg(value_name = "PRE_IMAGE")]
    pre_image: PathBuf,

    /// Image taken after the event (resampled to the pre image size if needed)
    #[arg(value_name = "POST_IMAGE")]
    post_image: PathBuf,

    /// Directory receiving the visualizations and the JSON record
    #[arg(short, long, value_name = "DIR", default_value = "assessment_output")]
    out: PathBuf,

    /// JSON file with classifier and change-detection thresholds
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the default configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_default_config: Option<PathBuf>,

    /// Save intermediate rasters to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print per-stage timings
    #[arg(long)]
    timings: bool,
}

fn main() {
    let args = Cli::parse();
    logger::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    if let Some(path) = &args.write_default_config {
        AssessmentConfig::default().to_json_file(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => AssessmentConfig::from_json_file(path)?,
        None => AssessmentConfig::default(),
    };

    let mut pipeline = AssessmentPipeline::new()
        .with_config(config)
        .with_verbose(args.verbose);

    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let pre = canopyscan::loader::load_raster(&args.pre_image)
        .map_err(|e| anyhow::anyhow!("Pre-event image: {}", e))?;
    let post = canopyscan::loader::load_raster(&args.post_image)
        .map_err(|e| anyhow::anyhow!("Post-event image: {}", e))?;

    if args.verbose {
        println!("Pre image:  {}x{}", pre.width(), pre.height());
        println!("Post image: {}x{}\n", post.width(), post.height());
    }

    let (assessment, timings) = pipeline.run_with_timings(&pre, &post)?;

    let store = ArtifactStore::new(&args.out)?;
    let record = store.save(&assessment)?;

    println!("=== Canopy Assessment ===");
    println!("Forest area before: {:>6.2}%", record.forest_area_before);
    println!("Forest area after:  {:>6.2}%", record.forest_area_after);
    println!("Damage:             {:>6.2}%", record.damage_percentage);

    if args.verbose {
        println!("\nLand cover (pre -> refined post):");
        for class in LandCover::ALL {
            println!(
                "  {:<11} {:>6.2}% -> {:>6.2}%",
                class.name(),
                record.pre_distribution.get(class),
                record.post_distribution.get(class)
            );
        }
    }

    println!("\nArtifacts in {}:", store.root().display());
    println!("  {}", record.pre_vis_path.display());
    println!("  {}", record.post_vis_path.display());
    println!("  {}", record.change_vis_path.display());

    if args.timings {
        println!("\n{}", timings.summary());
    }

    Ok(())
}
