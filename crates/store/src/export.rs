//! Export: uncompressed directory, optional validation, then the zip
//!
//! Every export gets its own directory named
//! `<stem>_<YYYYMMDD_HHMMSS_mmm>_<8 hex>` under the output root. The
//! directory is created with `create_dir`, so a name collision is an IO
//! error instead of an overwrite. The archive `<name>.sketch` is written
//! next to it only after validation passes.

use crate::layout::{archive_entries, write_entries, write_zip, ArchiveEntry, ARCHIVE_EXTENSION};
use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use sketch_model::Document;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where and how to export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Parent of every export directory; created if absent
    pub output_root: PathBuf,
    /// Leading part of the unique output name
    pub file_stem: String,
    /// Run the cross-file validator before packaging
    pub validate: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            file_stem: "design".to_string(),
            validate: true,
        }
    }
}

/// Paths and size of a finished export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub archive_path: PathBuf,
    pub directory_path: PathBuf,
    /// Size of the `.sketch` file
    pub size_bytes: u64,
}

/// Keep letters, digits, `-` and `_`; anything else becomes `_`
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        ExportOptions::default().file_stem
    } else {
        cleaned
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS_mmm>_<8 hex>`
pub fn unique_name(stem: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let token = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", sanitize_stem(stem), timestamp, &token[..8])
}

fn package(entries: &[ArchiveEntry], archive_path: &Path) -> Result<u64> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(archive_path)?;
    let mut writer = write_zip(entries, BufWriter::new(file))?;
    writer.flush()?;
    Ok(fs::metadata(archive_path)?.len())
}

/// Export synchronously. On validation failure the directory is left in
/// place for inspection and no archive is written.
pub fn export_document_sync(doc: &Document, options: &ExportOptions) -> Result<ExportOutcome> {
    let entries = archive_entries(doc)?;

    fs::create_dir_all(&options.output_root)?;
    let name = unique_name(&options.file_stem);
    let directory_path = options.output_root.join(&name);
    fs::create_dir(&directory_path)?;
    write_entries(&entries, &directory_path)?;

    if options.validate {
        let report = sketch_validator::validate_directory(&directory_path);
        if !report.is_valid() {
            tracing::warn!(
                "Export {} failed validation with {} violation(s)",
                name,
                report.violations.len()
            );
            for violation in &report.violations {
                tracing::debug!("{}", violation);
            }
            return Err(StoreError::ValidationFailed {
                violations: report.violations,
            });
        }
        tracing::debug!("Export {} validated ({} nodes)", name, report.nodes_visited);
    }

    let archive_path = options
        .output_root
        .join(format!("{name}.{ARCHIVE_EXTENSION}"));
    let size_bytes = package(&entries, &archive_path)?;

    tracing::info!("Exported {} ({} bytes)", archive_path.display(), size_bytes);
    Ok(ExportOutcome {
        archive_path,
        directory_path,
        size_bytes,
    })
}

/// Export on the blocking pool; the only await points are the output root
/// creation and the hand-off itself
pub async fn export_document(doc: Document, options: ExportOptions) -> Result<ExportOutcome> {
    tracing::info!(
        "Exporting {} page(s) to {}",
        doc.pages.len(),
        options.output_root.display()
    );
    tokio::fs::create_dir_all(&options.output_root).await?;
    tokio::task::spawn_blocking(move || export_document_sync(&doc, &options)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_model::{Color, NodeFactory};
    use tempfile::TempDir;

    fn document() -> Document {
        let mut f = NodeFactory::seeded(3);
        let artboard = f.new_artboard("Screen", 393.0, 852.0, Color::WHITE).unwrap();
        let page = f.new_page("Page 1", vec![artboard.into()]).unwrap();
        f.new_document(vec![page]).unwrap()
    }

    fn options(root: &Path) -> ExportOptions {
        ExportOptions {
            output_root: root.join("nested").join("out"),
            file_stem: "orders".to_string(),
            validate: true,
        }
    }

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("orders");
        let parts: Vec<&str> = name.split('_').collect();
        assert_eq!(parts.len(), 5, "{name}");
        assert_eq!(parts[0], "orders");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 3);
        assert_eq!(parts[4].len(), 8);
        assert!(parts[4].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(unique_name("orders"), name);
    }

    #[test]
    fn test_stem_sanitized() {
        assert_eq!(sanitize_stem("my/design v2"), "my_design_v2");
        assert_eq!(sanitize_stem("我的订单"), "我的订单");
        assert_eq!(sanitize_stem("   "), "design");
    }

    #[test]
    fn test_export_sync() {
        let tmp = TempDir::new().unwrap();
        let outcome = export_document_sync(&document(), &options(tmp.path())).unwrap();

        assert!(outcome.directory_path.join("root.json").is_file());
        assert!(outcome.directory_path.join("pages").is_dir());
        assert_eq!(
            outcome.archive_path.extension().and_then(|e| e.to_str()),
            Some("sketch")
        );
        assert_eq!(
            outcome.archive_path.file_stem(),
            outcome.directory_path.file_name()
        );
        assert_eq!(
            outcome.size_bytes,
            fs::metadata(&outcome.archive_path).unwrap().len()
        );
    }

    #[test]
    fn test_invalid_document_writes_no_archive() {
        let tmp = TempDir::new().unwrap();
        let mut doc = document();
        doc.pages[0].base.id = doc.id;

        let options = options(tmp.path());
        match export_document_sync(&doc, &options) {
            Err(StoreError::ValidationFailed { violations }) => assert!(!violations.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        let archives = fs::read_dir(&options.output_root)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|e| e == ARCHIVE_EXTENSION))
            .count();
        assert_eq!(archives, 0);
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let tmp = TempDir::new().unwrap();
        let mut doc = document();
        doc.pages[0].base.id = doc.id;

        let options = ExportOptions {
            validate: false,
            ..options(tmp.path())
        };
        let outcome = export_document_sync(&doc, &options).unwrap();
        assert!(outcome.archive_path.is_file());
    }

    #[tokio::test]
    async fn test_export_async() {
        let tmp = TempDir::new().unwrap();
        let outcome = export_document(document(), options(tmp.path())).await.unwrap();
        assert!(outcome.archive_path.is_file());
        assert!(crate::load_sketch_file(&outcome.archive_path).is_ok());
    }
}
