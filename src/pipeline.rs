use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::AssessmentConfig;
use crate::detection::{change, classify, damage, preprocessing};
use crate::error::{AssessmentError, Result};
use crate::loader;
use crate::models::{Assessment, Visualizations};
use crate::render;
use crate::timing::PipelineTimings;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Settings shared by every stage of a run
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Runs the full assessment for one pre/post image pair.
///
/// The pipeline holds only configuration, so one instance can serve many
/// runs, including concurrent ones.
#[derive(Clone, Debug, Default)]
pub struct AssessmentPipeline {
    config: AssessmentConfig,
    context: PipelineContext,
}

impl AssessmentPipeline {
    /// Pipeline with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AssessmentConfig) -> Self {
        self.config = config;
        self
    }

    /// Log every stage at info level instead of debug
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(AssessmentError::Config(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Load both files and assess them
    pub fn run_files(&self, pre_path: &Path, post_path: &Path) -> Result<Assessment> {
        let pre = loader::load_raster(pre_path)?;
        let post = loader::load_raster(post_path)?;
        self.run(&pre, &post)
    }

    pub fn run(&self, pre: &DynamicImage, post: &DynamicImage) -> Result<Assessment> {
        self.run_with_timings(pre, post).map(|(assessment, _)| assessment)
    }

    /// Assess a pre/post pair and report how long each stage took
    pub fn run_with_timings(
        &self,
        pre: &DynamicImage,
        post: &DynamicImage,
    ) -> Result<(Assessment, PipelineTimings)> {
        self.config.validate()?;
        let mut timings = PipelineTimings::new();

        self.save_debug("00_input", "pre", || pre.clone())?;
        self.save_debug("00_input", "post", || post.clone())?;

        self.log_stage("Normalizing rasters");
        let pair = timings.measure("normalize", || {
            preprocessing::normalize_pair(pre, post, self.config.resize_filter)
        })?;
        let (width, height) = pair.pre.dimensions();
        self.log_stage(&format!(
            "  {}x{}{}",
            width,
            height,
            if pair.post_resized { ", post resampled" } else { "" }
        ));
        self.save_debug("01_normalize", "post_aligned", || pair.post.rgb.clone().into())?;
        self.save_debug("01_normalize", "pre_hsv", || pair.pre.hsv.clone().into())?;
        self.save_debug("01_normalize", "post_hsv", || pair.post.hsv.clone().into())?;

        self.log_stage("Classifying land cover");
        let (pre_result, post_result) = timings.measure("classify", || {
            rayon::join(
                || classify::classify_detailed(&pair.pre.rgb, &self.config.classifier),
                || classify::classify_detailed(&pair.post.rgb, &self.config.classifier),
            )
        });
        self.log_stage(&format!(
            "  ExG thresholds: pre {:.1}, post {:.1}",
            pre_result.vegetation_threshold, post_result.vegetation_threshold
        ));
        self.save_debug("02_classify", "pre_exg", || pre_result.exg.clone().into())?;
        self.save_debug("02_classify", "post_exg", || post_result.exg.clone().into())?;

        self.log_stage("Detecting vegetation loss");
        let changes = timings.measure("detect_changes", || {
            change::detect_changes(
                &pre_result.classes,
                &post_result.classes,
                &pair.pre.hsv,
                &pair.post.hsv,
                &self.config.change,
            )
        })?;
        for (name, mask) in [
            ("vegetation_before", &changes.vegetation_before),
            ("lost_by_classification", &changes.lost_by_classification),
            ("lost_by_color", &changes.lost_by_color),
            ("change_mask", &changes.change_mask),
        ] {
            self.save_debug("03_change", name, || mask.as_image().clone().into())?;
        }

        let (metrics, pre_distribution, post_distribution) = timings.measure("damage", || {
            damage::calculate_damage(&pre_result.classes, &changes.refined_post).map(|metrics| {
                (
                    metrics,
                    damage::class_distribution(&pre_result.classes),
                    damage::class_distribution(&changes.refined_post),
                )
            })
        })?;
        self.log_stage(&format!(
            "  Forest before {:.2}%, after {:.2}%, damage {:.2}%",
            metrics.forest_area_before, metrics.forest_area_after, metrics.damage_percentage
        ));

        self.log_stage("Rendering visualizations");
        let visualizations = timings.measure("render", || -> Result<Visualizations> {
            Ok(Visualizations {
                pre: render::render_classes(&pre_result.classes),
                post: render::render_classes(&changes.refined_post),
                change: render::render_change(&changes.vegetation_before, &changes.change_mask)?,
            })
        })?;
        self.save_debug("04_render", "pre_vis", || visualizations.pre.clone().into())?;
        self.save_debug("04_render", "post_vis", || visualizations.post.clone().into())?;
        self.save_debug("04_render", "change_vis", || visualizations.change.clone().into())?;

        debug!("Assessment finished in {:?}", timings.total_duration());

        let assessment = Assessment {
            metrics,
            pre_distribution,
            post_distribution,
            pre_classes: pre_result.classes,
            refined_post_classes: changes.refined_post,
            change_mask: changes.change_mask,
            visualizations,
        };
        Ok((assessment, timings))
    }

    fn log_stage(&self, message: &str) {
        if self.context.verbose {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    /// Save an intermediate raster if debug mode is enabled.
    /// `img` is only evaluated when something will be written.
    fn save_debug(
        &self,
        stage_dir: &str,
        name: &str,
        img: impl FnOnce() -> DynamicImage,
    ) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir = debug_config.output_dir.join(stage_dir);
        std::fs::create_dir_all(&step_dir)?;

        let filename = format!("{}.png", name);
        let output_path = step_dir.join(&filename);
        img().save(&output_path).map_err(|source| AssessmentError::Encode {
            path: output_path.display().to_string(),
            source,
        })?;

        if self.context.verbose {
            info!("  Debug: saved {}/{}", stage_dir, filename);
        }
        Ok(())
    }
}
