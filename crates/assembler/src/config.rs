//! Assembly inputs: module descriptions, palette, typography, canvas
//!
//! Every struct fills missing fields from its `Default`, so partial JSON is
//! accepted and unknown fields are ignored.

use crate::{AssemblyError, Result};
use serde::{Deserialize, Serialize};
use sketch_model::{hex_to_color, Color};

// =============================================================================
// Modules
// =============================================================================

/// One declarative UI module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSpec {
    /// Module type, e.g. `header` or `list`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub items: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub buttons: Vec<String>,
}

impl ModuleSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }
}

/// Parse a JSON array of modules
pub fn parse_modules(json: &str) -> Result<Vec<ModuleSpec>> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// Palette
// =============================================================================

/// Hex colors used by the module builders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Artboard background
    pub background: String,
    /// Module section fill
    pub surface: String,
    /// Accent for selected tabs and buttons
    pub primary: String,
    /// Text drawn on `primary`
    pub on_primary: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub divider: String,
    /// Search field fill
    pub input: String,
    /// Fallback module fill
    pub placeholder: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "#F2F2F7".to_string(),
            surface: "#FFFFFF".to_string(),
            primary: "#007AFF".to_string(),
            on_primary: "#FFFFFF".to_string(),
            text_primary: "#1C1C1E".to_string(),
            text_secondary: "#8E8E93".to_string(),
            divider: "#E5E5EA".to_string(),
            input: "#EFEFF4".to_string(),
            placeholder: "#D1D1D6".to_string(),
        }
    }
}

/// Palette with every entry decoded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colors {
    pub background: Color,
    pub surface: Color,
    pub primary: Color,
    pub on_primary: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub divider: Color,
    pub input: Color,
    pub placeholder: Color,
}

impl Palette {
    /// Decode every hex entry, naming the first bad one
    pub fn resolve(&self) -> Result<Colors> {
        let decode = |field: &'static str, value: &str| {
            hex_to_color(value).map_err(|_| AssemblyError::InvalidPalette {
                field,
                value: value.to_string(),
            })
        };
        Ok(Colors {
            background: decode("background", &self.background)?,
            surface: decode("surface", &self.surface)?,
            primary: decode("primary", &self.primary)?,
            on_primary: decode("on_primary", &self.on_primary)?,
            text_primary: decode("text_primary", &self.text_primary)?,
            text_secondary: decode("text_secondary", &self.text_secondary)?,
            divider: decode("divider", &self.divider)?,
            input: decode("input", &self.input)?,
            placeholder: decode("placeholder", &self.placeholder)?,
        })
    }
}

// =============================================================================
// Typography
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub title_family: String,
    pub title_size: f64,
    pub body_family: String,
    pub body_size: f64,
    pub caption_family: String,
    pub caption_size: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title_family: "SFProText-Semibold".to_string(),
            title_size: 18.0,
            body_family: "SFProText-Regular".to_string(),
            body_size: 15.0,
            caption_family: "SFProText-Regular".to_string(),
            caption_size: 12.0,
        }
    }
}

// =============================================================================
// Canvas
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub page_name: String,
    pub artboard_name: String,
    pub width: f64,
    /// Minimum artboard height; the artboard grows to fit the modules
    pub height: f64,
    /// Horizontal inset of module content
    pub padding: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            page_name: "Page 1".to_string(),
            artboard_name: "Screen".to_string(),
            width: 393.0,
            height: 852.0,
            padding: 16.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_json_shape() {
        let modules = parse_modules(
            r#"[
                {"type": "header", "title": "我的订单", "badge": 3},
                {"type": "list", "items": ["A", "B"], "height": 120}
            ]"#,
        )
        .unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].kind, "header");
        assert_eq!(modules[0].title.as_deref(), Some("我的订单"));
        assert!(modules[0].items.is_empty());
        assert_eq!(modules[1].height, Some(120.0));
        assert_eq!(modules[1].items, vec!["A", "B"]);
    }

    #[test]
    fn test_module_list_must_be_array() {
        assert!(matches!(
            parse_modules(r#"{"type": "header"}"#),
            Err(AssemblyError::InvalidModules(_))
        ));
    }

    #[test]
    fn test_palette_defaults_resolve() {
        let colors = Palette::default().resolve().unwrap();
        assert_eq!(colors.surface, Color::WHITE);
        assert!((colors.primary.blue() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_palette_names_bad_field() {
        let palette = Palette {
            divider: "#GGGGGG".to_string(),
            ..Default::default()
        };
        match palette.resolve() {
            Err(AssemblyError::InvalidPalette { field, value }) => {
                assert_eq!(field, "divider");
                assert_eq!(value, "#GGGGGG");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_partial_config() {
        let config: AssemblyConfig = serde_json::from_str(r#"{"width": 375}"#).unwrap();
        assert_eq!(config.width, 375.0);
        assert_eq!(config.height, 852.0);

        let typography: Typography = serde_json::from_str("{}").unwrap();
        assert_eq!(typography.title_size, 18.0);
    }
}
