//! Draggable element placement preferences.

use serde::{Deserialize, Serialize};

/// Smallest allowed element scale.
pub const MIN_SCALE: f64 = 0.3;
/// Largest allowed element scale.
pub const MAX_SCALE: f64 = 3.0;
/// Zoom increment applied by one zoom in/out action.
pub const SCALE_STEP: f64 = 0.1;
pub const DEFAULT_SCALE: f64 = 1.0;

/// Offset of a draggable element from its centered default position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementPosition {
    pub x: f64,
    pub y: f64,
}

impl ElementPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontally re-centered copy; vertical offset is kept.
    pub fn centered(self) -> Self {
        Self { x: 0.0, y: self.y }
    }
}

/// Clamps `scale` into `[MIN_SCALE, MAX_SCALE]`, mapping non-finite input to the default.
pub fn clamp_scale(scale: f64) -> f64 {
    if !scale.is_finite() {
        return DEFAULT_SCALE;
    }
    // Rounded to one decimal so repeated steps do not accumulate float drift.
    ((scale.clamp(MIN_SCALE, MAX_SCALE)) * 10.0).round() / 10.0
}
