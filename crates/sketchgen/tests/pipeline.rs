//! Config file to archive, end to end

use sketch_model::{Layer, CJK_SEMIBOLD};
use sketch_validator::{validate_directory, validate_sketch_file};
use sketchgen::{export, generate_document, GeneratorConfig, GeneratorError};
use std::fs;
use store::{load_sketch_file, StoreError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, validate: bool) -> GeneratorConfig {
    let path = dir.path().join("cfg.json");
    let json = serde_json::json!({
        "output_root": dir.path().join("out"),
        "file_stem": "orders",
        "validate": validate,
        "seed": 42,
        "modules": [
            {"type": "header", "title": "我的订单"},
            {"type": "tabs", "items": ["全部", "待付款"]},
            {"type": "list", "items": ["Order 1", "Order 2"]},
            {"type": "hero-banner", "title": "Unsupported"},
            {"type": "tabbar", "items": ["Home", "Me"]}
        ]
    });
    fs::write(&path, serde_json::to_vec_pretty(&json).unwrap()).unwrap();
    GeneratorConfig::load(&path).unwrap()
}

#[tokio::test]
async fn test_config_to_archive() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, true);
    assert_eq!(config.modules.len(), 5);

    let summary = export(&config).await.unwrap();
    assert!(summary.archive_path.starts_with(tmp.path().join("out")));
    assert!(summary.size_bytes > 0);

    assert!(validate_directory(&summary.directory_path).is_valid());
    let report = validate_sketch_file(&summary.archive_path);
    assert!(report.is_valid(), "{:#?}", report.violations);

    let doc = load_sketch_file(&summary.archive_path).unwrap();
    let artboard = doc.pages[0].artboards().next().unwrap();
    assert_eq!(artboard.layers().len(), 6);
    let title = artboard.layers()[1]
        .find(&|layer| matches!(layer, Layer::Text(t) if t.content() == "我的订单"))
        .unwrap();
    let Layer::Text(title) = title else {
        unreachable!()
    };
    assert_eq!(title.base.style.text_style.as_ref().unwrap().font().family, CJK_SEMIBOLD);
}

#[test]
fn test_seed_makes_ids_reproducible() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, true);
    let first = generate_document(&config).unwrap();
    let second = generate_document(&config).unwrap();
    assert_eq!(first.object_ids(), second.object_ids());
}

#[tokio::test]
async fn test_bad_palette_is_an_assembly_error() {
    let tmp = TempDir::new().unwrap();
    let mut config = write_config(&tmp, true);
    config.palette.primary = "blue".to_string();

    assert!(matches!(
        export(&config).await,
        Err(GeneratorError::Assembly(_))
    ));
    assert!(!tmp.path().join("out").exists());
}

#[tokio::test]
async fn test_validation_failure_surfaces() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, true);
    let mut document = generate_document(&config).unwrap();
    document.pages[0].base.id = document.id;

    let result = store::export_document(document, config.export_options()).await;
    assert!(matches!(result, Err(StoreError::ValidationFailed { .. })));
}
