//! Floating point color accumulator
//!
//! Pattern bands add, subtract or overwrite contributions here; the values
//! stay unclamped until the renderer converts them back to [`Rgb`].

use core::ops::{AddAssign, SubAssign};

use crate::color::Rgb;

/// Unclamped RGB contribution
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorAccumulator {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorAccumulator {
    pub const ZERO: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear blend from `from` to `to` at fraction `t`
    pub fn lerp(from: Rgb, to: Rgb, t: f32) -> Self {
        let channel = |start: u8, end: u8| {
            let start = f32::from(start);
            t * (f32::from(end) - start) + start
        };
        Self {
            r: channel(from.r, to.r),
            g: channel(from.g, to.g),
            b: channel(from.b, to.b),
        }
    }

    /// Clamp every channel to `[0, 255]`, keeping the fractional part
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 255.0),
            g: self.g.clamp(0.0, 255.0),
            b: self.b.clamp(0.0, 255.0),
        }
    }

    /// Multiply every channel by `factor`
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
        }
    }

    /// Clamp and truncate into an 8-bit color
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgb(self) -> Rgb {
        let clamped = self.clamped();
        Rgb {
            r: clamped.r as u8,
            g: clamped.g as u8,
            b: clamped.b as u8,
        }
    }
}

impl From<Rgb> for ColorAccumulator {
    fn from(color: Rgb) -> Self {
        Self {
            r: f32::from(color.r),
            g: f32::from(color.g),
            b: f32::from(color.b),
        }
    }
}

impl AddAssign for ColorAccumulator {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl SubAssign for ColorAccumulator {
    fn sub_assign(&mut self, rhs: Self) {
        self.r -= rhs.r;
        self.g -= rhs.g;
        self.b -= rhs.b;
    }
}
