//! Display geometry
//!
//! Bounding box over the physical LED positions and the percent-based
//! coordinates patterns are evaluated against.

use crate::topology::Led;

/// Bounding box of all LED positions
///
/// `top` is the largest `y`, `bottom` the smallest.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayExtents {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayExtents {
    /// Measure the bounding box of `leds`
    ///
    /// An empty slice yields all-zero extents.
    pub fn measure(leds: &[Led]) -> Self {
        let Some(first) = leds.first() else {
            return Self::default();
        };

        let mut extents = Self {
            left: first.x,
            right: first.x,
            top: first.y,
            bottom: first.y,
            width: 0.0,
            height: 0.0,
        };

        for led in leds {
            extents.left = extents.left.min(led.x);
            extents.right = extents.right.max(led.x);
            extents.bottom = extents.bottom.min(led.y);
            extents.top = extents.top.max(led.y);
        }

        extents.width = extents.right - extents.left;
        extents.height = extents.top - extents.bottom;
        extents
    }

    /// Horizontal position of `x` in percent of the width
    ///
    /// Zero-width displays map every LED to `0`.
    pub fn percent_x(&self, x: f32) -> f32 {
        if self.width > 0.0 {
            (x - self.left) / self.width * 100.0
        } else {
            0.0
        }
    }

    /// Vertical position of `y` in percent of the height, measured from the top
    ///
    /// Zero-height displays map every LED to `0`.
    pub fn percent_y(&self, y: f32) -> f32 {
        if self.height > 0.0 {
            (self.top - y) / self.height * 100.0
        } else {
            0.0
        }
    }

    /// Fill in the normalized position of every LED
    pub fn normalize(&self, leds: &mut [Led]) {
        for led in leds {
            led.px = self.percent_x(led.x);
            led.py = self.percent_y(led.y);
        }
    }
}
