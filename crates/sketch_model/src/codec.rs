//! Value codecs - primitive design values to schema representations
//!
//! The format stores points as `"{x, y}"` strings and glyph bounds as
//! `"{{x, y}, {w, h}}"` strings; colors arrive from callers as hex strings.

use crate::{Color, ModelError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parse a hex color (`#RGB`, `#RRGGBB` or `#RRGGBBAA`, leading `#` optional)
/// into normalized channels.
pub fn hex_to_color(hex: &str) -> Result<Color> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || ModelError::InvalidColor(hex.to_string());

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| -> Result<f64> {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| invalid())
    };

    match digits.len() {
        3 => {
            let expand = |i: usize| -> Result<f64> {
                let nibble = u8::from_str_radix(&digits[i..i + 1], 16).map_err(|_| invalid())?;
                Ok(f64::from(nibble * 17) / 255.0)
            };
            Color::new(expand(0)?, expand(1)?, expand(2)?, 1.0)
        }
        6 => Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0),
        8 => Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?),
        _ => Err(invalid()),
    }
}

/// Format a color back to `#RRGGBB` (or `#RRGGBBAA` when not opaque)
pub fn color_to_hex(color: &Color) -> String {
    let byte = |v: f64| (v * 255.0).round() as u8;
    if color.alpha() >= 1.0 {
        format!(
            "#{:02X}{:02X}{:02X}",
            byte(color.red()),
            byte(color.green()),
            byte(color.blue())
        )
    } else {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(color.red()),
            byte(color.green()),
            byte(color.blue()),
            byte(color.alpha())
        )
    }
}

/// A 2D point serialized in the format's `"{x, y}"` string form
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Point = Point::new(0.0, 0.0);
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}}}", self.x, self.y)
    }
}

/// Parse a `"{x, y}"` point string
pub fn parse_point(s: &str) -> Option<Point> {
    let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;
    let (x, y) = inner.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Format a rectangle as `"{{x, y}, {w, h}}"`
pub fn format_rect_string(x: f64, y: f64, width: f64, height: f64) -> String {
    format!("{{{}, {}}}", Point::new(x, y), Point::new(width, height))
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_point(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid point: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_red() {
        let red = hex_to_color("#FF0000").unwrap();
        assert_eq!(red.red(), 1.0);
        assert_eq!(red.green(), 0.0);
        assert_eq!(red.blue(), 0.0);
        assert_eq!(red.alpha(), 1.0);
    }

    #[test]
    fn test_hex_short_and_alpha_forms() {
        let white = hex_to_color("fff").unwrap();
        assert_eq!(white, Color::WHITE);

        let translucent = hex_to_color("#00000080").unwrap();
        assert!((translucent.alpha() - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(matches!(hex_to_color("#GG0000"), Err(ModelError::InvalidColor(_))));
        assert!(hex_to_color("#12345").is_err());
        assert!(hex_to_color("").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(color_to_hex(&hex_to_color("#1A2B3C").unwrap()), "#1A2B3C");
        assert_eq!(color_to_hex(&hex_to_color("#1A2B3C4D").unwrap()), "#1A2B3C4D");
    }

    #[test]
    fn test_point_strings() {
        assert_eq!(Point::new(0.0, 0.0).to_string(), "{0, 0}");
        assert_eq!(Point::new(0.5, 1.0).to_string(), "{0.5, 1}");
        assert_eq!(parse_point("{0.5, 1}"), Some(Point::new(0.5, 1.0)));
        assert_eq!(parse_point("0.5, 1"), None);
    }

    #[test]
    fn test_rect_string() {
        assert_eq!(format_rect_string(0.0, 0.0, 120.0, 20.0), "{{0, 0}, {120, 20}}");
    }

    proptest! {
        #[test]
        fn prop_hex_channels_in_unit_range(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), a in any::<u8>()) {
            let hex = format!("#{r:02X}{g:02X}{b:02X}{a:02X}");
            let color = hex_to_color(&hex).unwrap();
            for channel in [color.red(), color.green(), color.blue(), color.alpha()] {
                prop_assert!((0.0..=1.0).contains(&channel));
            }
        }
    }
}
