//! Color values with channels normalized to [0, 1]

use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// An RGBA color. Channels are validated on construction and the value is
/// immutable afterwards; nodes copy colors rather than sharing them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "color")]
pub struct Color {
    alpha: f64,
    blue: f64,
    green: f64,
    red: f64,
}

impl Color {
    /// Create a color, rejecting channels outside [0, 1] or non-finite
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Result<Self> {
        for (name, value) in [("red", red), ("green", green), ("blue", blue), ("alpha", alpha)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ModelError::InvalidColor(format!("{name} channel {value}")));
            }
        }
        Ok(Self { alpha, blue, green, red })
    }

    const fn constant(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { alpha, blue, green, red }
    }

    pub const BLACK: Color = Color::constant(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::constant(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::constant(0.0, 0.0, 0.0, 0.0);
    /// Default shadow color (black at 50% alpha)
    pub const SHADOW: Color = Color::constant(0.0, 0.0, 0.0, 0.5);
    /// Default border color used by the format's disabled defaults
    pub const BORDER_GRAY: Color = Color::constant(0.592, 0.592, 0.592, 1.0);

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Same color with a different alpha
    pub fn with_alpha(&self, alpha: f64) -> Result<Self> {
        Self::new(self.red, self.green, self.blue, alpha)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Color::new(1.1, 0.0, 0.0, 1.0).is_err());
        assert!(Color::new(0.0, -0.01, 0.0, 1.0).is_err());
        assert!(Color::new(0.0, 0.0, f64::NAN, 1.0).is_err());
        assert!(Color::new(0.0, 0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_serializes_with_class_tag() {
        let value = serde_json::to_value(Color::WHITE).unwrap();
        assert_eq!(value["_class"], "color");
        assert_eq!(value["red"], 1.0);
        assert_eq!(value["alpha"], 1.0);
    }
}
