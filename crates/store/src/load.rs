//! Reading archives back into documents

use crate::{Result, StoreError};
use serde::de::DeserializeOwned;
use sketch_model::{Document, DocumentManifest, Page, ROOT_FILE};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

fn parse<T: DeserializeOwned>(path: &str, bytes: Option<Vec<u8>>) -> Result<T> {
    let bytes = bytes.ok_or_else(|| StoreError::MissingEntry(path.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Rebuild a document from `root.json` and the page files it references
fn load_with(mut read: impl FnMut(&str) -> Result<Option<Vec<u8>>>) -> Result<Document> {
    let manifest: DocumentManifest = parse(ROOT_FILE, read(ROOT_FILE)?)?;
    let mut pages: Vec<Page> = Vec::with_capacity(manifest.pages.len());
    for reference in &manifest.pages {
        let path = reference.file_path();
        pages.push(parse(&path, read(&path)?)?);
    }
    Ok(Document::from_parts(manifest, pages))
}

/// Load an uncompressed archive directory
pub fn load_directory(dir: impl AsRef<Path>) -> Result<Document> {
    let dir = dir.as_ref();
    load_with(|path| match fs::read(dir.join(path)) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    })
}

/// Load a zipped `.sketch` file
pub fn load_sketch_file(path: impl AsRef<Path>) -> Result<Document> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    load_with(|name| match archive.by_name(name) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{write_archive, write_directory};
    use sketch_model::{Color, NodeFactory, Rect, StyleSpec};
    use tempfile::TempDir;

    fn document() -> Document {
        let mut f = NodeFactory::seeded(11);
        let mut artboard = f.new_artboard("Home", 393.0, 852.0, Color::WHITE).unwrap();
        let label = f
            .new_text("订单", Rect::new(16.0, 16.0, 80.0, 20.0).unwrap(), &StyleSpec::new())
            .unwrap();
        artboard.push_layer(label.into());
        let page = f.new_page("Page 1", vec![artboard.into()]).unwrap();
        f.new_document(vec![page]).unwrap()
    }

    #[test]
    fn test_directory_round_trip() {
        let doc = document();
        let dir = TempDir::new().unwrap();
        write_directory(&doc, dir.path()).unwrap();
        assert_eq!(load_directory(dir.path()).unwrap(), doc);
    }

    #[test]
    fn test_zip_round_trip() {
        let doc = document();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.sketch");
        write_archive(&doc, File::create(&path).unwrap()).unwrap();
        assert_eq!(load_sketch_file(&path).unwrap(), doc);
    }

    #[test]
    fn test_missing_page_file() {
        let doc = document();
        let dir = TempDir::new().unwrap();
        write_directory(&doc, dir.path()).unwrap();
        let page_file = format!("pages/{}.json", doc.pages[0].id());
        fs::remove_file(dir.path().join(&page_file)).unwrap();

        match load_directory(dir.path()) {
            Err(StoreError::MissingEntry(path)) => assert_eq!(path, page_file),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_directory(dir.path()),
            Err(StoreError::MissingEntry(_))
        ));
    }
}
