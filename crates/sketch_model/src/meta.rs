//! Archive metadata (`meta.json`) and per-user view state (`user.json`)

use crate::{ObjectId, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document format version written to the manifest and meta
pub const FORMAT_VERSION: u32 = 136;

/// Oldest format revision able to open the archive
pub const COMPATIBILITY_VERSION: u32 = 99;

pub const APP_ID: &str = "com.bohemiancoding.sketch3";
pub const APP_VERSION: &str = "73";
pub const APP_BUILD: u32 = 118510;
pub const APP_COMMIT: &str = "d1a1dc1fb4a1fa7b4b4d4a2a82cbd28a9b5bb0d6";
pub const APP_VARIANT: &str = "NONAPPSTORE";

// =============================================================================
// meta.json
// =============================================================================

/// Name index entry for one artboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtboardIndexEntry {
    pub name: String,
}

/// Name index entry for one page and its artboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageIndexEntry {
    pub name: String,
    pub artboards: BTreeMap<ObjectId, ArtboardIndexEntry>,
}

/// Application that first created the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInfo {
    pub commit: String,
    pub app_version: String,
    pub build: u32,
    pub app: String,
    pub compatibility_version: u32,
    pub version: u32,
    pub variant: String,
}

impl Default for CreatedInfo {
    fn default() -> Self {
        Self {
            commit: APP_COMMIT.to_string(),
            app_version: APP_VERSION.to_string(),
            build: APP_BUILD,
            app: APP_ID.to_string(),
            compatibility_version: COMPATIBILITY_VERSION,
            version: FORMAT_VERSION,
            variant: APP_VARIANT.to_string(),
        }
    }
}

/// Contents of `meta.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub commit: String,
    pub pages_and_artboards: BTreeMap<ObjectId, PageIndexEntry>,
    pub version: u32,
    pub compatibility_version: u32,
    pub app: String,
    pub autosaved: u8,
    pub variant: String,
    pub created: CreatedInfo,
    pub save_history: Vec<String>,
    pub app_version: String,
    pub build: u32,
}

impl Meta {
    /// Meta with the fixed version tags and the given name index
    pub fn new(pages_and_artboards: BTreeMap<ObjectId, PageIndexEntry>) -> Self {
        Self {
            commit: APP_COMMIT.to_string(),
            pages_and_artboards,
            version: FORMAT_VERSION,
            compatibility_version: COMPATIBILITY_VERSION,
            app: APP_ID.to_string(),
            autosaved: 0,
            variant: APP_VARIANT.to_string(),
            created: CreatedInfo::default(),
            save_history: vec![format!("{APP_VARIANT}.{APP_BUILD}")],
            app_version: APP_VERSION.to_string(),
            build: APP_BUILD,
        }
    }
}

// =============================================================================
// user.json
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentViewState {
    pub page_list_height: f64,
    pub page_list_collapsed: u8,
}

impl Default for DocumentViewState {
    fn default() -> Self {
        Self {
            page_list_height: 110.0,
            page_list_collapsed: 0,
        }
    }
}

/// Scroll and zoom of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewState {
    pub scroll_origin: Point,
    pub zoom_value: f64,
}

impl Default for PageViewState {
    fn default() -> Self {
        Self {
            scroll_origin: Point::ORIGIN,
            zoom_value: 1.0,
        }
    }
}

/// Contents of `user.json`: the document entry plus one entry per page ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub document: DocumentViewState,
    #[serde(flatten)]
    pub pages: BTreeMap<ObjectId, PageViewState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_fixed_tags() {
        let value = serde_json::to_value(Meta::new(BTreeMap::new())).unwrap();
        assert_eq!(value["compatibilityVersion"], 99);
        assert_eq!(value["version"], FORMAT_VERSION);
        assert_eq!(value["app"], APP_ID);
        assert_eq!(value["created"]["build"], APP_BUILD);
        assert_eq!(value["saveHistory"][0], "NONAPPSTORE.118510");
        assert!(value["pagesAndArtboards"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_user_state_shape() {
        let page = ObjectId::from_random_bytes([3; 16]);
        let mut user = UserState::default();
        user.pages.insert(page, PageViewState::default());

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["document"]["pageListHeight"], 110.0);
        assert_eq!(value[page.to_string()]["scrollOrigin"], "{0, 0}");
        assert_eq!(value[page.to_string()]["zoomValue"], 1.0);

        let back: UserState = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }
}
