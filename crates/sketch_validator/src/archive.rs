//! Cross-file validation of an archive laid out on disk or zipped
//!
//! Each file is parsed on its own; a file that fails to parse is reported
//! and skipped while the rest of the archive is still checked. Object IDs
//! are tracked across every file.

use crate::checker::{join, Checker, Object};
use crate::document::{document, page, PageStorage};
use crate::{ValidationReport, ViolationKind};
use serde_json::Value;
use sketch_model::{COMPATIBILITY_VERSION, META_FILE, PAGES_DIR, ROOT_FILE, USER_FILE};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::{self, Read, Seek};
use std::path::PathBuf;
use zip::result::ZipError;
use zip::ZipArchive;

/// Read access to the files of an archive
pub trait ArchiveSource {
    /// Where the archive lives, for log lines
    fn describe(&self) -> String;

    /// Read a file by its archive path; `Ok(None)` when it does not exist
    fn read_file(&mut self, path: &str) -> io::Result<Option<Vec<u8>>>;

    /// Archive paths of every file under `pages/`, sorted
    fn page_files(&mut self) -> io::Result<Vec<String>>;

    /// Whether the `pages/` directory exists
    fn has_pages_dir(&mut self) -> bool;
}

// =============================================================================
// Sources
// =============================================================================

/// An uncompressed archive directory
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArchiveSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn read_file(&mut self, path: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn page_files(&mut self) -> io::Result<Vec<String>> {
        let dir = self.root.join(PAGES_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(format!("{PAGES_DIR}/{}", entry.file_name().to_string_lossy()));
            }
        }
        files.sort();
        Ok(files)
    }

    fn has_pages_dir(&mut self) -> bool {
        self.root.join(PAGES_DIR).is_dir()
    }
}

/// A zipped `.sketch` archive
pub struct ZipSource<R> {
    archive: ZipArchive<R>,
    label: String,
}

impl<R: Read + Seek> ZipSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> zip::result::ZipResult<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
            label: label.into(),
        })
    }
}

impl<R: Read + Seek> ArchiveSource for ZipSource<R> {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn read_file(&mut self, path: &str) -> io::Result<Option<Vec<u8>>> {
        match self.archive.by_name(path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    fn page_files(&mut self) -> io::Result<Vec<String>> {
        let prefix = format!("{PAGES_DIR}/");
        let mut files: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| name.starts_with(&prefix) && !name.ends_with('/'))
            .map(String::from)
            .collect();
        files.sort();
        Ok(files)
    }

    fn has_pages_dir(&mut self) -> bool {
        let prefix = format!("{PAGES_DIR}/");
        self.archive.file_names().any(|name| name.starts_with(&prefix))
    }
}

// =============================================================================
// Walk
// =============================================================================

enum Loaded {
    Parsed(Value),
    Missing,
    Unreadable,
}

fn load_json(c: &mut Checker, source: &mut dyn ArchiveSource, file: &str) -> Loaded {
    match source.read_file(file) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Loaded::Parsed(value),
            Err(e) => {
                c.file_violation(file, ViolationKind::UnreadableFile, format!("invalid JSON: {e}"));
                Loaded::Unreadable
            }
        },
        Ok(None) => Loaded::Missing,
        Err(e) => {
            c.file_violation(file, ViolationKind::UnreadableFile, e.to_string());
            Loaded::Unreadable
        }
    }
}

/// A top-level file that must exist
fn load_required(c: &mut Checker, source: &mut dyn ArchiveSource, file: &str) -> Option<Value> {
    match load_json(c, source, file) {
        Loaded::Parsed(value) => Some(value),
        Loaded::Missing => {
            c.file_violation(file, ViolationKind::MissingFile, "required file is absent");
            None
        }
        Loaded::Unreadable => None,
    }
}

/// What later checks need to know about a validated page file
#[derive(Debug, Default)]
struct PageSummary {
    name: String,
    artboards: BTreeSet<String>,
}

fn summarize(obj: &Object) -> PageSummary {
    let artboards = obj
        .get("layers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|layer| layer.get("_class").and_then(Value::as_str) == Some("artboard"))
        .filter_map(|layer| layer.get("do_objectID").and_then(Value::as_str))
        .map(String::from)
        .collect();
    PageSummary {
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        artboards,
    }
}

/// Validate one parsed page file; returns its declared ID and summary
fn check_page_file(c: &mut Checker, file: &str, value: &Value) -> Option<(String, PageSummary)> {
    tracing::debug!("Validating {}", file);
    c.set_file(file);
    let obj = c.object(value, "")?;
    if c.expect_class(obj, "", "page") {
        page(c, obj, "");
    }
    let id = obj.get("do_objectID").and_then(Value::as_str)?;
    Some((id.to_string(), summarize(obj)))
}

fn check_meta(c: &mut Checker, obj: &Object, pages: &BTreeMap<String, PageSummary>) {
    if let Some(version) = c.integer_field(obj, "", "compatibilityVersion") {
        if version != i64::from(COMPATIBILITY_VERSION) {
            c.violation(
                "/compatibilityVersion",
                ViolationKind::IncompatibleVersion,
                format!("expected {COMPATIBILITY_VERSION}, found {version}"),
            );
        }
    }
    c.integer_field(obj, "", "version");
    c.string_field(obj, "", "app");
    c.array_field(obj, "", "saveHistory");

    let Some(index) = c.object_field(obj, "", "pagesAndArtboards") else {
        return;
    };
    let index_path = "/pagesAndArtboards";

    for (page_id, entry) in index {
        let entry_path = join(index_path, page_id);
        let Some(summary) = pages.get(page_id) else {
            c.violation(
                &entry_path,
                ViolationKind::IndexMismatch,
                format!("page {page_id} is not in the archive"),
            );
            continue;
        };
        let Some(entry) = c.object(entry, &entry_path) else {
            continue;
        };
        if let Some(name) = c.string_field(entry, &entry_path, "name") {
            if name != summary.name {
                c.violation(
                    &join(&entry_path, "name"),
                    ViolationKind::IndexMismatch,
                    format!("index names page {name:?}, page file says {:?}", summary.name),
                );
            }
        }
        let Some(artboards) = c.object_field(entry, &entry_path, "artboards") else {
            continue;
        };
        for artboard_id in artboards.keys() {
            if !summary.artboards.contains(artboard_id) {
                c.violation(
                    &join(&join(&entry_path, "artboards"), artboard_id),
                    ViolationKind::IndexMismatch,
                    format!("artboard {artboard_id} is not on page {page_id}"),
                );
            }
        }
        for artboard_id in &summary.artboards {
            if !artboards.contains_key(artboard_id) {
                c.violation(
                    &join(&entry_path, "artboards"),
                    ViolationKind::IndexMismatch,
                    format!("artboard {artboard_id} is missing from the index"),
                );
            }
        }
    }

    for page_id in pages.keys() {
        if !index.contains_key(page_id) {
            c.violation(
                index_path,
                ViolationKind::IndexMismatch,
                format!("page {page_id} is missing from the index"),
            );
        }
    }
}

fn check_user(c: &mut Checker, obj: &Object, pages: &BTreeMap<String, PageSummary>) {
    c.object_field(obj, "", "document");
    for page_id in pages.keys() {
        let entry_path = join("", page_id);
        match obj.get(page_id) {
            Some(entry) => {
                if let Some(entry) = c.object(entry, &entry_path) {
                    c.point_field(entry, &entry_path, "scrollOrigin");
                    c.number_field(entry, &entry_path, "zoomValue");
                }
            }
            None => c.violation(
                &entry_path,
                ViolationKind::IndexMismatch,
                format!("no view state for page {page_id}"),
            ),
        }
    }
}

/// Validate an archive through any [`ArchiveSource`]
pub fn validate_archive(source: &mut dyn ArchiveSource) -> ValidationReport {
    tracing::debug!("Validating archive {}", source.describe());
    let mut c = Checker::new();

    let root = load_required(&mut c, source, ROOT_FILE);
    let meta = load_required(&mut c, source, META_FILE);
    let user = load_required(&mut c, source, USER_FILE);
    if !source.has_pages_dir() {
        c.file_violation(PAGES_DIR, ViolationKind::MissingFile, "pages directory is absent");
    }

    let listed = match source.page_files() {
        Ok(files) => files,
        Err(e) => {
            c.file_violation(PAGES_DIR, ViolationKind::UnreadableFile, e.to_string());
            Vec::new()
        }
    };

    let mut pages: BTreeMap<String, PageSummary> = BTreeMap::new();
    let mut referenced: HashSet<String> = HashSet::new();

    if let Some(root) = &root {
        c.set_file(ROOT_FILE);
        let refs = match c.object(root, "") {
            Some(obj) => document(&mut c, obj, "", PageStorage::Referenced),
            None => Vec::new(),
        };

        for page_ref in refs {
            let ref_path = join(&page_ref.pointer, "_ref");
            let file = format!("{}.json", page_ref.target);
            let expected_id = page_ref
                .target
                .strip_prefix(PAGES_DIR)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(String::from);

            let Some(expected_id) = expected_id else {
                c.set_file(ROOT_FILE);
                c.violation(
                    &ref_path,
                    ViolationKind::DanglingReference,
                    format!("{:?} does not point into {PAGES_DIR}/", page_ref.target),
                );
                continue;
            };
            if !referenced.insert(file.clone()) {
                c.set_file(ROOT_FILE);
                c.violation(
                    &ref_path,
                    ViolationKind::IndexMismatch,
                    format!("{file} is referenced more than once"),
                );
                continue;
            }

            match load_json(&mut c, source, &file) {
                Loaded::Parsed(value) => {
                    if let Some((id, summary)) = check_page_file(&mut c, &file, &value) {
                        if id != expected_id {
                            c.violation(
                                "/do_objectID",
                                ViolationKind::IndexMismatch,
                                format!("page ID {id} does not match its reference {expected_id}"),
                            );
                        }
                        pages.insert(expected_id, summary);
                    }
                }
                Loaded::Missing => {
                    c.set_file(ROOT_FILE);
                    c.violation(
                        &ref_path,
                        ViolationKind::DanglingReference,
                        format!("{file} does not exist"),
                    );
                }
                Loaded::Unreadable => {}
            }
        }

        for file in listed.iter().filter(|file| !referenced.contains(*file)) {
            c.file_violation(file, ViolationKind::OrphanFile, "page file is not referenced by root.json");
        }
    } else {
        // No manifest to follow; still check each page file on its own
        for file in &listed {
            if let Loaded::Parsed(value) = load_json(&mut c, source, file) {
                if let Some((id, summary)) = check_page_file(&mut c, file, &value) {
                    pages.insert(id, summary);
                }
            }
        }
    }

    if let Some(meta) = &meta {
        c.set_file(META_FILE);
        if let Some(obj) = c.object(meta, "") {
            check_meta(&mut c, obj, &pages);
        }
    }

    if let Some(user) = &user {
        c.set_file(USER_FILE);
        if let Some(obj) = c.object(user, "") {
            check_user(&mut c, obj, &pages);
        }
    }

    let report = c.finish();
    tracing::debug!(
        "Archive {} checked: {} violations, {} nodes",
        source.describe(),
        report.violations.len(),
        report.nodes_visited
    );
    report
}
