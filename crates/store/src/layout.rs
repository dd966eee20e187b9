//! Multi-file archive layout
//!
//! ```text
//! root.json          document manifest, pages held by reference
//! meta.json          version tags and the page/artboard index
//! user.json          per-page view state
//! pages/<ID>.json    one embedded page subtree per file
//! ```
//!
//! The same entries are written to a directory and to the zip container so
//! both forms carry identical bytes.

use crate::Result;
use serde::Serialize;
use sketch_model::{Document, META_FILE, PAGES_DIR, ROOT_FILE, USER_FILE};
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Extension of a packaged archive
pub const ARCHIVE_EXTENSION: &str = "sketch";

/// One file of the archive layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive, `/`-separated
    pub path: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    fn json(path: impl Into<String>, value: &impl Serialize) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            bytes: serde_json::to_vec(value)?,
        })
    }
}

/// Serialize a document into its archive entries: the three top-level files
/// followed by one file per page, in page order
pub fn archive_entries(doc: &Document) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::with_capacity(doc.pages.len() + 3);
    entries.push(ArchiveEntry::json(ROOT_FILE, &doc.manifest())?);
    entries.push(ArchiveEntry::json(META_FILE, &doc.meta())?);
    entries.push(ArchiveEntry::json(USER_FILE, &doc.user())?);
    for page in &doc.pages {
        entries.push(ArchiveEntry::json(
            format!("{PAGES_DIR}/{}.json", page.id()),
            page,
        )?);
    }
    Ok(entries)
}

/// Write entries below `dir`, which must already exist
pub fn write_entries(entries: &[ArchiveEntry], dir: &Path) -> Result<()> {
    fs::create_dir_all(dir.join(PAGES_DIR))?;
    for entry in entries {
        let path = entry.path.split('/').fold(dir.to_path_buf(), |path, part| path.join(part));
        fs::write(&path, &entry.bytes)?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), entry.bytes.len());
    }
    Ok(())
}

/// Pack entries into a deflate-compressed zip, returning the writer
pub fn write_zip<W: Write + Seek>(entries: &[ArchiveEntry], writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(6));

    for entry in entries {
        zip.start_file(entry.path.as_str(), options)?;
        zip.write_all(&entry.bytes)?;
    }

    Ok(zip.finish()?)
}

/// Lay a document out as an uncompressed archive directory
pub fn write_directory(doc: &Document, dir: impl AsRef<Path>) -> Result<()> {
    write_entries(&archive_entries(doc)?, dir.as_ref())
}

/// Package a document as a `.sketch` zip into any seekable writer
pub fn write_archive<W: Write + Seek>(doc: &Document, writer: W) -> Result<W> {
    write_zip(&archive_entries(doc)?, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_model::{Color, NodeFactory};
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    fn two_page_document() -> Document {
        let mut f = NodeFactory::seeded(5);
        let first = f.new_artboard("A", 100.0, 100.0, Color::WHITE).unwrap();
        let second = f.new_artboard("B", 100.0, 100.0, Color::WHITE).unwrap();
        let pages = vec![
            f.new_page("One", vec![first.into()]).unwrap(),
            f.new_page("Two", vec![second.into()]).unwrap(),
        ];
        f.new_document(pages).unwrap()
    }

    #[test]
    fn test_entry_order() {
        let doc = two_page_document();
        let paths: Vec<_> = archive_entries(&doc)
            .unwrap()
            .into_iter()
            .map(|entry| entry.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "root.json".to_string(),
                "meta.json".to_string(),
                "user.json".to_string(),
                format!("pages/{}.json", doc.pages[0].id()),
                format!("pages/{}.json", doc.pages[1].id()),
            ]
        );
    }

    #[test]
    fn test_root_references_pages() {
        let doc = two_page_document();
        let entries = archive_entries(&doc).unwrap();
        let root: serde_json::Value = serde_json::from_slice(&entries[0].bytes).unwrap();
        assert_eq!(root["_class"], "document");
        assert_eq!(root["pages"][1]["_ref"], format!("pages/{}", doc.pages[1].id()));
        assert_eq!(root["pages"][1]["_class"], "MSJSONFileReference");
    }

    #[test]
    fn test_directory_matches_entries() {
        let doc = two_page_document();
        let dir = TempDir::new().unwrap();
        write_directory(&doc, dir.path()).unwrap();

        for entry in archive_entries(&doc).unwrap() {
            let on_disk = fs::read(dir.path().join(&entry.path)).unwrap();
            assert_eq!(on_disk, entry.bytes, "{}", entry.path);
        }
    }

    #[test]
    fn test_zip_in_memory() {
        let doc = two_page_document();
        let cursor = write_archive(&doc, Cursor::new(Vec::new())).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 5);

        let mut meta = String::new();
        archive
            .by_name(META_FILE)
            .unwrap()
            .read_to_string(&mut meta)
            .unwrap();
        let meta: serde_json::Value = serde_json::from_str(&meta).unwrap();
        assert_eq!(meta["compatibilityVersion"], 99);
        let index = meta["pagesAndArtboards"].as_object().unwrap();
        assert_eq!(index.len(), 2);
    }
}
