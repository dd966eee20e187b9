//! Pages - top-level canvases holding artboards and free layers

use crate::{FreeformGroupLayout, Layer, LayerBase, ObjectId, RulerData};
use serde::{Deserialize, Serialize};

/// A page (`_class: page`). Serialized on its own as `pages/<ID>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "page", rename_all = "camelCase")]
pub struct Page {
    #[serde(flatten)]
    pub base: LayerBase,
    pub has_click_through: bool,
    pub group_layout: FreeformGroupLayout,
    pub layers: Vec<Layer>,
    pub horizontal_ruler_data: RulerData,
    pub vertical_ruler_data: RulerData,
    pub include_in_cloud_upload: bool,
}

impl Page {
    pub fn id(&self) -> ObjectId {
        self.base.id
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    /// Artboards directly on this page, in order
    pub fn artboards(&self) -> impl Iterator<Item = &crate::Artboard> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Artboard(artboard) => Some(artboard),
            _ => None,
        })
    }

    /// Object IDs of the page, its style, and every layer beneath it
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids = vec![self.base.id, self.base.style.id];
        for layer in &self.layers {
            layer.collect_ids(&mut ids);
        }
        ids
    }
}
