//! Coordinate transform between module space and pixel space.
//!
//! Module space is `[-1, 1]` on both axes, origin at the center, Y up.
//! Pixel space is `[0, width) x [0, height)`, Y down. The module's square is
//! mapped onto the largest centered square of the canvas (letterboxing the
//! longer axis). Every shape's placement and every pointer position goes
//! through these functions; nothing else converts coordinates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Window state: canvas size plus the derived square viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Side of the centered square, `min(width, height)`
    pub side: f64,
    /// Top-left corner of the square in pixels
    pub offset: DVec2,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let side = width.min(height) as f64;
        let offset = DVec2::new(
            (width as f64 - side) / 2.0,
            (height as f64 - side) / 2.0,
        );
        Self {
            width,
            height,
            side,
            offset,
        }
    }

    /// Module point -> pixel point
    #[inline]
    pub fn to_pixels(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            (p.x + 1.0) / 2.0 * self.side + self.offset.x,
            (1.0 - p.y) / 2.0 * self.side + self.offset.y,
        )
    }

    /// Pixel point -> module point. Exact inverse of [`Viewport::to_pixels`].
    ///
    /// A degenerate (zero-sized) viewport maps everything to the origin.
    #[inline]
    pub fn to_normalized(&self, px: DVec2) -> DVec2 {
        if self.side <= 0.0 {
            return DVec2::ZERO;
        }
        DVec2::new(
            (px.x - self.offset.x) / self.side * 2.0 - 1.0,
            1.0 - (px.y - self.offset.y) / self.side * 2.0,
        )
    }

    /// Module magnitude (radius, line width, font size) -> pixels
    #[inline]
    pub fn scale_to_pixels(&self, v: f64) -> f64 {
        v * self.side / 2.0
    }

    /// Pixel magnitude -> module magnitude
    #[inline]
    pub fn scale_to_normalized(&self, v: f64) -> f64 {
        if self.side <= 0.0 {
            return 0.0;
        }
        v * 2.0 / self.side
    }

    /// Pixel motion -> module motion. Magnitudes scale like
    /// [`Viewport::scale_to_normalized`]; Y flips because module space is Y up.
    #[inline]
    pub fn delta_to_normalized(&self, delta: DVec2) -> DVec2 {
        DVec2::new(
            self.scale_to_normalized(delta.x),
            -self.scale_to_normalized(delta.y),
        )
    }

    /// Whether a pixel lies inside the square viewport (not the letterbox bars)
    pub fn contains_pixel(&self, px: DVec2) -> bool {
        px.x >= self.offset.x
            && px.y >= self.offset.y
            && px.x < self.offset.x + self.side
            && px.y < self.offset.y + self.side
    }
}
