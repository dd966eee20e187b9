//! Font choice and the CJK substitution policy
//!
//! Text layers carry their font twice: once on the attributed-string span
//! (attribute level) and once in the layer style's text-style block (style
//! level). Some consumers read one, some the other. The attribute level is
//! always the caller's literal request; the style level is derived from it
//! with [`FontChoice::derive_style_font`]. The validator checks nodes against
//! the same rule.

use serde::{Deserialize, Serialize};

/// Default Latin font family
pub const DEFAULT_FONT_FAMILY: &str = "SFProText-Regular";

/// Default font size in points
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Display-size factor applied to the style-level font for CJK content
pub const CJK_SIZE_SCALE: f64 = 1.2;

/// Substitute families, keyed by weight
pub const CJK_REGULAR: &str = "PingFangSC-Regular";
pub const CJK_MEDIUM: &str = "PingFangSC-Medium";
pub const CJK_SEMIBOLD: &str = "PingFangSC-Semibold";
pub const CJK_LIGHT: &str = "PingFangSC-Light";

/// True if the character is a CJK ideograph
pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
    )
}

/// True if the text contains any CJK ideograph
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk_ideograph)
}

/// Map a requested family onto the CJK-capable family of the same weight.
///
/// The weight is read from the PostScript-style suffix (`Family-Weight`).
pub fn cjk_substitute(family: &str) -> &'static str {
    let weight = family
        .rsplit_once('-')
        .map(|(_, weight)| weight.to_ascii_lowercase())
        .unwrap_or_default();

    match weight.as_str() {
        "semibold" | "bold" | "heavy" | "black" => CJK_SEMIBOLD,
        "medium" => CJK_MEDIUM,
        "light" | "thin" | "ultralight" => CJK_LIGHT,
        _ => CJK_REGULAR,
    }
}

/// A font family plus resolved size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontChoice {
    pub family: String,
    pub size: f64,
}

impl FontChoice {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Style-level font for a text layer whose content is `content`.
    ///
    /// CJK content gets the substitute family and `round(size * 1.2)`;
    /// anything else keeps the requested font unchanged.
    pub fn derive_style_font(&self, content: &str) -> FontChoice {
        if contains_cjk(content) {
            FontChoice {
                family: cjk_substitute(&self.family).to_string(),
                size: (self.size * CJK_SIZE_SCALE).round(),
            }
        } else {
            self.clone()
        }
    }
}

impl Default for FontChoice {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_detection() {
        assert!(contains_cjk("我的订单"));
        assert!(contains_cjk("Order 订单"));
        assert!(!contains_cjk("Orders"));
        // Hiragana and Hangul are not ideographs
        assert!(!contains_cjk("ひらがな"));
        assert!(!contains_cjk("한국어"));
    }

    #[test]
    fn test_substitution_by_weight() {
        assert_eq!(cjk_substitute("SFProText-Regular"), CJK_REGULAR);
        assert_eq!(cjk_substitute("SFProText-Semibold"), CJK_SEMIBOLD);
        assert_eq!(cjk_substitute("Helvetica-Bold"), CJK_SEMIBOLD);
        assert_eq!(cjk_substitute("SFProDisplay-Medium"), CJK_MEDIUM);
        assert_eq!(cjk_substitute("Avenir-Light"), CJK_LIGHT);
        assert_eq!(cjk_substitute("Helvetica"), CJK_REGULAR);
    }

    #[test]
    fn test_derive_style_font_scales_cjk() {
        let requested = FontChoice::new("SFProText-Semibold", 18.0);
        let derived = requested.derive_style_font("我的订单");

        assert_eq!(derived.family, CJK_SEMIBOLD);
        assert_eq!(derived.size, 22.0);
    }

    #[test]
    fn test_derive_style_font_keeps_latin() {
        let requested = FontChoice::new("SFProText-Regular", 15.0);
        assert_eq!(requested.derive_style_font("My orders"), requested);
    }
}
