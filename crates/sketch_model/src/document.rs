//! Document root, shared collections and the by-reference manifest
//!
//! In memory a [`Document`] embeds its pages. On disk the root file holds
//! only [`FileReference`]s to `pages/<ID>.json`; [`Document::manifest`]
//! produces that view and [`Document::from_parts`] reverses it.

use crate::meta::{ArtboardIndexEntry, PageIndexEntry, PageViewState};
use crate::{Meta, ObjectId, Page, UserState, FORMAT_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `_class` of a page file reference
pub const FILE_REFERENCE_CLASS: &str = "MSJSONFileReference";

/// `_ref_class` of a page file reference
pub const PAGE_REF_CLASS: &str = "MSImmutablePage";

/// Directory holding page files inside an archive
pub const PAGES_DIR: &str = "pages";

/// Document manifest file name
pub const ROOT_FILE: &str = "root.json";

/// Archive metadata file name
pub const META_FILE: &str = "meta.json";

/// Per-user view state file name
pub const USER_FILE: &str = "user.json";

// =============================================================================
// Shared Collections
// =============================================================================

/// Image collection inside the asset collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "imageCollection")]
pub struct ImageCollection {
    pub images: BTreeMap<String, Value>,
}

/// Document-level assets; every list is present and empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "assetCollection", rename_all = "camelCase")]
pub struct AssetCollection {
    #[serde(rename = "do_objectID")]
    pub id: ObjectId,
    pub image_collection: ImageCollection,
    pub color_assets: Vec<Value>,
    pub gradient_assets: Vec<Value>,
    pub images: Vec<Value>,
    pub colors: Vec<Value>,
    pub gradients: Vec<Value>,
    pub export_presets: Vec<Value>,
}

impl AssetCollection {
    pub fn empty(id: ObjectId) -> Self {
        Self {
            id,
            image_collection: ImageCollection::default(),
            color_assets: Vec::new(),
            gradient_assets: Vec::new(),
            images: Vec::new(),
            colors: Vec::new(),
            gradients: Vec::new(),
            export_presets: Vec::new(),
        }
    }
}

macro_rules! object_container {
    ($(#[$meta:meta])* $name:ident, $class:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "_class", rename = $class)]
        pub struct $name {
            #[serde(rename = "do_objectID")]
            pub id: ObjectId,
            pub objects: Vec<Value>,
        }

        impl $name {
            pub fn empty(id: ObjectId) -> Self {
                Self { id, objects: Vec::new() }
            }
        }
    };
}

object_container!(
    /// Shared layer styles
    SharedStyleContainer,
    "sharedStyleContainer"
);
object_container!(
    /// Shared text styles
    SharedTextStyleContainer,
    "sharedTextStyleContainer"
);
object_container!(SymbolContainer, "symbolContainer");
object_container!(SwatchContainer, "swatchContainer");

/// Marker block for document state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "documentState")]
pub struct DocumentState {}

/// Everything in the document root besides identity and pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCollections {
    pub assets: AssetCollection,
    pub color_space: u8,
    pub current_page_index: usize,
    pub foreign_layer_styles: Vec<Value>,
    pub foreign_symbols: Vec<Value>,
    pub foreign_text_styles: Vec<Value>,
    pub foreign_swatches: Vec<Value>,
    pub layer_styles: SharedStyleContainer,
    pub layer_text_styles: SharedTextStyleContainer,
    pub layer_symbols: SymbolContainer,
    pub shared_swatches: SwatchContainer,
    pub font_references: Vec<Value>,
    pub document_state: DocumentState,
}

impl SharedCollections {
    /// Object IDs owned by the collections themselves
    pub fn object_ids(&self) -> [ObjectId; 5] {
        [
            self.assets.id,
            self.layer_styles.id,
            self.layer_text_styles.id,
            self.layer_symbols.id,
            self.shared_swatches.id,
        ]
    }
}

// =============================================================================
// File References
// =============================================================================

/// Pointer from the root manifest to a page file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(rename = "_class")]
    pub class: String,
    #[serde(rename = "_ref_class")]
    pub ref_class: String,
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl FileReference {
    /// Reference to `pages/<ID>`
    pub fn page(id: ObjectId) -> Self {
        Self {
            class: FILE_REFERENCE_CLASS.to_string(),
            ref_class: PAGE_REF_CLASS.to_string(),
            reference: format!("{PAGES_DIR}/{id}"),
        }
    }

    /// Page ID named by the reference, if it has the `pages/<ID>` form
    pub fn page_id(&self) -> Option<ObjectId> {
        let id = self.reference.strip_prefix(PAGES_DIR)?.strip_prefix('/')?;
        ObjectId::parse(id)
    }

    /// Archive path of the referenced file
    pub fn file_path(&self) -> String {
        format!("{}.json", self.reference)
    }
}

// =============================================================================
// Document
// =============================================================================

/// Document root with pages embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "document")]
pub struct Document {
    #[serde(rename = "do_objectID")]
    pub id: ObjectId,
    pub version: u32,
    #[serde(flatten)]
    pub shared: SharedCollections,
    pub pages: Vec<Page>,
}

/// Document root as stored in `root.json`: pages held by reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "document")]
pub struct DocumentManifest {
    #[serde(rename = "do_objectID")]
    pub id: ObjectId,
    pub version: u32,
    #[serde(flatten)]
    pub shared: SharedCollections,
    pub pages: Vec<FileReference>,
}

impl Document {
    /// The by-reference view written to `root.json`
    pub fn manifest(&self) -> DocumentManifest {
        DocumentManifest {
            id: self.id,
            version: self.version,
            shared: self.shared.clone(),
            pages: self.pages.iter().map(|page| FileReference::page(page.id())).collect(),
        }
    }

    /// Rebuild a document from its manifest and the loaded page files.
    ///
    /// Pages are ordered as the manifest references them; references with no
    /// matching page are skipped.
    pub fn from_parts(manifest: DocumentManifest, pages: Vec<Page>) -> Self {
        let mut by_id: BTreeMap<ObjectId, Page> =
            pages.into_iter().map(|page| (page.id(), page)).collect();
        let ordered = manifest
            .pages
            .iter()
            .filter_map(|reference| reference.page_id())
            .filter_map(|id| by_id.remove(&id))
            .collect();

        Self {
            id: manifest.id,
            version: manifest.version,
            shared: manifest.shared,
            pages: ordered,
        }
    }

    /// Contents of `meta.json`
    pub fn meta(&self) -> Meta {
        let index = self
            .pages
            .iter()
            .map(|page| {
                let artboards = page
                    .artboards()
                    .map(|artboard| {
                        (
                            artboard.base.id,
                            ArtboardIndexEntry {
                                name: artboard.base.name.clone(),
                            },
                        )
                    })
                    .collect();
                (
                    page.id(),
                    PageIndexEntry {
                        name: page.name().to_string(),
                        artboards,
                    },
                )
            })
            .collect();
        Meta::new(index)
    }

    /// Contents of `user.json`
    pub fn user(&self) -> UserState {
        UserState {
            document: Default::default(),
            pages: self
                .pages
                .iter()
                .map(|page| (page.id(), PageViewState::default()))
                .collect(),
        }
    }

    /// Every object ID in the document, in traversal order (duplicates kept)
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids = vec![self.id];
        ids.extend(self.shared.object_ids());
        for page in &self.pages {
            ids.extend(page.object_ids());
        }
        ids
    }

    pub fn is_current_version(&self) -> bool {
        self.version == FORMAT_VERSION
    }
}
