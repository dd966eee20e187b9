//! Rules for pages and the document root

use crate::checker::{join, Checker, Object};
use crate::layer::{base, children, group_layout, ruler_data, Slot};
use crate::ViolationKind;
use serde_json::Value;
use sketch_model::{FILE_REFERENCE_CLASS, PAGE_REF_CLASS};

/// How the document root holds its pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageStorage {
    /// Full page objects (in-memory graph)
    Embedded,
    /// File references (`root.json`)
    Referenced,
}

/// A page reference found in the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageRef {
    /// Pointer of the reference inside the root file
    pub pointer: String,
    /// The `_ref` target, e.g. `pages/<ID>`
    pub target: String,
}

pub(crate) fn page(c: &mut Checker, obj: &Object, path: &str) {
    base(c, obj, path);
    c.bool_field(obj, path, "hasClickThrough");
    c.bool_field(obj, path, "includeInCloudUpload");
    group_layout(c, obj, path);
    c.nested(obj, path, "horizontalRulerData", "rulerData", ruler_data);
    c.nested(obj, path, "verticalRulerData", "rulerData", ruler_data);
    children(c, obj, path, Slot::Page);
}

fn image_collection(c: &mut Checker, obj: &Object, path: &str) {
    c.object_field(obj, path, "images");
}

fn asset_collection(c: &mut Checker, obj: &Object, path: &str) {
    c.object_id(obj, path);
    c.nested(obj, path, "imageCollection", "imageCollection", image_collection);
    for key in [
        "colorAssets",
        "gradientAssets",
        "images",
        "colors",
        "gradients",
        "exportPresets",
    ] {
        c.array_field(obj, path, key);
    }
}

fn object_container(c: &mut Checker, obj: &Object, path: &str) {
    c.object_id(obj, path);
    c.array_field(obj, path, "objects");
}

fn document_state(_: &mut Checker, _: &Object, _: &str) {}

fn page_reference(c: &mut Checker, obj: &Object, path: &str) -> Option<PageRef> {
    if !c.expect_class(obj, path, FILE_REFERENCE_CLASS) {
        return None;
    }
    if let Some(ref_class) = c.string_field(obj, path, "_ref_class") {
        if ref_class != PAGE_REF_CLASS {
            c.violation(
                &join(path, "_ref_class"),
                ViolationKind::UnexpectedClass,
                format!("expected `{PAGE_REF_CLASS}`, found `{ref_class}`"),
            );
        }
    }
    let target = c.string_field(obj, path, "_ref")?;
    Some(PageRef {
        pointer: path.to_string(),
        target: target.to_string(),
    })
}

/// Validate a document root; returns the page references in `Referenced`
/// mode (empty otherwise)
pub(crate) fn document(c: &mut Checker, obj: &Object, path: &str, storage: PageStorage) -> Vec<PageRef> {
    c.object_id(obj, path);
    c.integer_field(obj, path, "version");
    c.nested(obj, path, "assets", "assetCollection", asset_collection);
    c.integer_field(obj, path, "colorSpace");
    c.integer_field(obj, path, "currentPageIndex");
    for key in [
        "foreignLayerStyles",
        "foreignSymbols",
        "foreignTextStyles",
        "foreignSwatches",
        "fontReferences",
    ] {
        c.array_field(obj, path, key);
    }
    c.nested(obj, path, "layerStyles", "sharedStyleContainer", object_container);
    c.nested(obj, path, "layerTextStyles", "sharedTextStyleContainer", object_container);
    c.nested(obj, path, "layerSymbols", "symbolContainer", object_container);
    c.nested(obj, path, "sharedSwatches", "swatchContainer", object_container);
    c.optional_nested(obj, path, "documentState", "documentState", document_state);

    let mut refs = Vec::new();
    let Some(pages) = c.array_field(obj, path, "pages") else {
        return refs;
    };
    let pages_path = join(path, "pages");
    if pages.is_empty() {
        c.violation(&pages_path, ViolationKind::Cardinality, "document has no pages");
    }

    for (i, item) in pages.iter().enumerate() {
        let item_path = join(&pages_path, i);
        let Some(entry) = c.object(item, &item_path) else {
            continue;
        };
        match storage {
            PageStorage::Embedded => {
                if c.expect_class(entry, &item_path, "page") {
                    page(c, entry, &item_path);
                }
            }
            PageStorage::Referenced => refs.extend(page_reference(c, entry, &item_path)),
        }
    }
    refs
}

/// Validate any single node: a document, a page, or a layer
pub(crate) fn node(c: &mut Checker, value: &Value, path: &str) {
    let Some(obj) = c.object(value, path) else {
        return;
    };
    match obj.get("_class").and_then(Value::as_str) {
        Some("document") => {
            document(c, obj, path, PageStorage::Embedded);
        }
        Some("page") => page(c, obj, path),
        _ => crate::layer::layer(c, value, path, Slot::Page),
    }
}
