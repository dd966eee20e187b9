//! Frame geometry

use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned frame of a layer (`_class: rect`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_class", rename = "rect", rename_all = "camelCase")]
pub struct Rect {
    /// Locked aspect ratio
    pub constrain_proportions: bool,
    pub height: f64,
    pub width: f64,
    pub x: f64,
    pub y: f64,
}

impl Rect {
    /// Create a frame. Fails on a negative size or any non-finite field.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        for (field, value) in [("x", x), ("y", y), ("width", width), ("height", height)] {
            if !value.is_finite() {
                return Err(ModelError::InvalidGeometry { field, value });
            }
        }
        if width < 0.0 {
            return Err(ModelError::InvalidGeometry { field: "width", value: width });
        }
        if height < 0.0 {
            return Err(ModelError::InvalidGeometry { field: "height", value: height });
        }
        Ok(Self {
            constrain_proportions: false,
            height,
            width,
            x,
            y,
        })
    }

    /// Frame at the origin with the given size
    pub fn from_size(width: f64, height: f64) -> Result<Self> {
        Self::new(0.0, 0.0, width, height)
    }

    /// Zero-sized frame at the origin (used by pages)
    pub fn zero() -> Self {
        Self {
            constrain_proportions: true,
            height: 0.0,
            width: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn with_constrained_proportions(mut self, constrain: bool) -> Self {
        self.constrain_proportions = constrain;
        self
    }

    /// Re-check the construction constraints; frames can be built directly
    /// through deserialization.
    pub fn check(&self) -> Result<()> {
        Self::new(self.x, self.y, self.width, self.height).map(|_| ())
    }
}
