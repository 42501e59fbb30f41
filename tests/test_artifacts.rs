mod common;
use common::*;

use canopyscan::loader::load_raster;
use std::path::Path;

#[test]
fn test_run_files_and_store() -> anyhow::Result<()> {
    let pre_file = write_png(&solid(12, 9, FOREST));
    let post_file = write_png(&split_columns(12, 9, 6, FOREST, BARE_SOIL));

    let assessment = AssessmentPipeline::new().run_files(pre_file.path(), post_file.path())?;

    let dir = tempfile::TempDir::new()?;
    let store = ArtifactStore::new(dir.path().join("uploads"))?;
    let record = store.save(&assessment)?;

    assert_eq!(record.forest_area_before, assessment.metrics.forest_area_before);
    assert_eq!(record.forest_area_after, assessment.metrics.forest_area_after);
    assert_eq!(record.damage_percentage, assessment.metrics.damage_percentage);
    assert_eq!(record.damage_percentage, 50.0);

    for relative in [&record.pre_vis_path, &record.post_vis_path, &record.change_vis_path] {
        assert!(relative.is_relative());
        let img = load_raster(&store.resolve(relative))?;
        assert_eq!((img.width(), img.height()), (12, 9));
    }
    Ok(())
}

#[test]
fn test_record_json_roundtrip() -> anyhow::Result<()> {
    let img = mixed_scene(20, 20);
    let assessment = AssessmentPipeline::new().run(&img, &img)?;

    let dir = tempfile::TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;
    let record = store.save(&assessment)?;

    let json_path = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .find(|path| path.extension().is_some_and(|ext| ext == "json"))
        .expect("record file written");

    let loaded = AssessmentRecord::from_json_file(&json_path)?;
    assert_eq!(loaded.id, record.id);
    assert_eq!(loaded.pre_vis_path, record.pre_vis_path);
    assert_eq!(loaded.pre_distribution, record.pre_distribution);
    assert_eq!(loaded.damage_percentage, 0.0);
    Ok(())
}

#[test]
fn test_two_runs_do_not_overwrite() -> anyhow::Result<()> {
    let img = solid(4, 4, LAKE);
    let assessment = AssessmentPipeline::new().run(&img, &img)?;

    let dir = tempfile::TempDir::new()?;
    let store = ArtifactStore::new(dir.path())?;
    let first = store.save(&assessment)?;
    let second = store.save(&assessment)?;

    assert_ne!(first.pre_vis_path, second.pre_vis_path);
    assert_ne!(first.id, second.id);
    Ok(())
}

#[test]
fn test_missing_file_is_load_error() {
    let result = AssessmentPipeline::new().run_files(
        Path::new("does_not_exist_pre.png"),
        Path::new("does_not_exist_post.png"),
    );
    assert!(matches!(result, Err(AssessmentError::Load { .. })));
}

#[test]
fn test_unsupported_extension_is_load_error() {
    let file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
    let result = load_raster(file.path());
    assert!(matches!(result, Err(AssessmentError::Load { .. })));
}

#[test]
fn test_corrupt_png_is_load_error() {
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    std::fs::write(file.path(), b"\x89PNG not really").unwrap();

    let result = load_raster(file.path());
    assert!(matches!(result, Err(AssessmentError::Load { .. })));
}
