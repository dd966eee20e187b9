//! Export, re-read, and cross-file validation of the written archive

use proptest::prelude::*;
use sketch_model::{Color, Document, NodeFactory, Rect, ShadowSpec, StyleSpec};
use sketch_validator::{validate_directory, validate_sketch_file};
use store::{
    export_document, load_directory, load_sketch_file, write_archive, write_directory,
    ExportOptions,
};
use tempfile::TempDir;

fn document() -> Document {
    let mut f = NodeFactory::seeded(77);
    let mut pages = Vec::new();
    for (page_name, title) in [("Orders", "我的订单"), ("Profile", "Profile")] {
        let mut artboard = f.new_artboard(page_name, 393.0, 852.0, Color::WHITE).unwrap();
        let heading = f
            .new_text(
                title,
                Rect::new(16.0, 60.0, 200.0, 26.0).unwrap(),
                &StyleSpec::new().with_font("SFProText-Semibold", 18.0),
            )
            .unwrap();
        let card = f
            .new_rectangle(
                Rect::new(16.0, 100.0, 361.0, 120.0).unwrap(),
                &StyleSpec::fill(Color::WHITE)
                    .with_corner_radius(12.0)
                    .with_shadow(ShadowSpec::default()),
                "Card",
            )
            .unwrap();
        artboard.push_layer(heading.into());
        artboard.push_layer(card.into());
        pages.push(f.new_page(page_name, vec![artboard.into()]).unwrap());
    }
    f.new_document(pages).unwrap()
}

#[tokio::test]
async fn test_export_then_reload() {
    let tmp = TempDir::new().unwrap();
    let doc = document();
    let options = ExportOptions {
        output_root: tmp.path().to_path_buf(),
        file_stem: "orders".to_string(),
        validate: true,
    };

    let outcome = export_document(doc.clone(), options).await.unwrap();
    assert!(outcome.size_bytes > 0);

    let report = validate_sketch_file(&outcome.archive_path);
    assert!(report.is_valid(), "{:#?}", report.violations);
    assert!(validate_directory(&outcome.directory_path).is_valid());

    assert_eq!(load_sketch_file(&outcome.archive_path).unwrap(), doc);
    assert_eq!(load_directory(&outcome.directory_path).unwrap(), doc);
}

#[tokio::test]
async fn test_repeated_exports_get_distinct_names() {
    let tmp = TempDir::new().unwrap();
    let options = ExportOptions {
        output_root: tmp.path().to_path_buf(),
        ..Default::default()
    };

    let first = export_document(document(), options.clone()).await.unwrap();
    let second = export_document(document(), options).await.unwrap();
    assert_ne!(first.directory_path, second.directory_path);
    assert_ne!(first.archive_path, second.archive_path);
}

fn seeded_document(seed: u64, titles: &[String], offset: u16) -> Document {
    let mut f = NodeFactory::seeded(seed);
    let mut pages = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        let mut artboard = f.new_artboard("Screen", 393.0, 852.0, Color::WHITE).unwrap();
        let text = f
            .new_text(
                title.as_str(),
                Rect::new(16.0, f64::from(offset), 200.0, 24.0).unwrap(),
                &StyleSpec::new().with_font("SFProText-Regular", 15.0),
            )
            .unwrap();
        artboard.push_layer(text.into());
        pages.push(f.new_page(format!("Page {}", i + 1), vec![artboard.into()]).unwrap());
    }
    f.new_document(pages).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_written_documents_load_back_equal(
        seed in any::<u64>(),
        titles in prop::collection::vec("[a-zA-Z0-9订单我的 ]{1,16}", 1..4),
        offset in 0u16..800,
    ) {
        let doc = seeded_document(seed, &titles, offset);
        let tmp = TempDir::new().unwrap();

        let archive = tmp.path().join("design.sketch");
        write_archive(&doc, std::fs::File::create(&archive).unwrap()).unwrap();
        prop_assert_eq!(load_sketch_file(&archive).unwrap(), doc.clone());

        let dir = tmp.path().join("design");
        std::fs::create_dir(&dir).unwrap();
        write_directory(&doc, &dir).unwrap();
        prop_assert_eq!(load_directory(&dir).unwrap(), doc);
    }
}
