//! Color band patterns
//!
//! A pattern is an ordered list of bands spanning the display horizontally
//! in percent. Each band blends linearly between two colors and is either
//! added to, subtracted from, or laid over whatever earlier bands produced.
//! The end of the slice terminates the pattern.

pub mod builtin;
pub mod custom;

use libm::floorf;

use crate::color::{ColorAccumulator, Rgb};

/// Compositing and scroll flags of a [`PatternBand`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandFlags(u32);

impl BandFlags {
    /// Add the band's color to the accumulator
    pub const NONE: Self = Self(0);
    /// Replace the accumulator with the band's color
    pub const OVERLAY: Self = Self(0x0000_0001);
    /// Subtract the band's color from the accumulator
    pub const SUBTRACT: Self = Self(0x0000_0002);
    /// Scroll the band to the left
    pub const SCROLL_LEFT: Self = Self(0x0000_0004);
    /// Scroll the band to the right
    pub const SCROLL_RIGHT: Self = Self(0x0000_0008);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

/// One segment of a pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternBand {
    /// Horizontal start in percent
    pub start: f32,
    /// Horizontal end in percent
    pub end: f32,
    /// Color at `start`
    pub from: Rgb,
    /// Color at `end`
    pub to: Rgb,
    pub flags: BandFlags,
}

impl PatternBand {
    pub const fn new(start: f32, end: f32, from: Rgb, to: Rgb, flags: BandFlags) -> Self {
        Self {
            start,
            end,
            from,
            to,
            flags,
        }
    }

    /// A band of a single flat color
    pub const fn solid(start: f32, end: f32, color: Rgb, flags: BandFlags) -> Self {
        Self::new(start, end, color, color, flags)
    }

    /// Scroll displacement applied to this band
    fn shift(&self, scroll: Scroll) -> f32 {
        let left = self.flags.contains(BandFlags::SCROLL_LEFT);
        let right = self.flags.contains(BandFlags::SCROLL_RIGHT);
        let (subtract, add) = if scroll.reversed {
            (left, right)
        } else {
            (right, left)
        };

        if subtract {
            -scroll.offset
        } else if add {
            scroll.offset
        } else {
            0.0
        }
    }

    /// Blend fraction of `px` within the band, `None` outside of it
    fn fraction(&self, px: f32) -> Option<f32> {
        if px < self.start || px > self.end {
            return None;
        }
        let width = self.end - self.start;
        if width > 0.0 {
            Some((px - self.start) / width)
        } else {
            Some(0.0)
        }
    }
}

/// Frame-stable scroll state shared by every band of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scroll {
    /// Displacement in percent, `[0, 100)`
    pub offset: f32,
    /// Swap the left/right meaning of the band flags
    pub reversed: bool,
}

impl Scroll {
    pub const NONE: Self = Self {
        offset: 0.0,
        reversed: false,
    };

    pub const fn new(offset: f32, reversed: bool) -> Self {
        Self { offset, reversed }
    }

    /// Scroll offset for a frame number and animation speed
    ///
    /// The animation loops every `1000 / speed` frames, covering the full
    /// width once per loop. The result is quantized to hundredths of a
    /// percent and always lies in `[0, 100)`. Non-positive or non-finite
    /// speeds freeze the animation.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn offset_for_frame(frame: u32, speed: f32) -> f32 {
        if !speed.is_finite() || speed <= 0.0 {
            return 0.0;
        }
        let period = floorf(1000.0 / speed) as u32;
        if period == 0 {
            return 0.0;
        }

        let position = (frame % period) as f32 / 10.0 * speed;
        let hundredths = (position * 100.0) as u32 % 10_000;
        hundredths as f32 / 100.0
    }
}

/// Wrap a displaced position back onto the display
fn wrap_percent(px: f32) -> f32 {
    if px > 100.0 {
        px - 100.0
    } else if px < 0.0 {
        px + 100.0
    } else {
        px
    }
}

/// Evaluate a pattern at normalized position `px` into `acc`
///
/// Every band is visited; overlapping bands keep modifying the result in
/// order. The accumulator is left unclamped.
pub fn evaluate(bands: &[PatternBand], scroll: Scroll, px: f32, acc: &mut ColorAccumulator) {
    for band in bands {
        let position = wrap_percent(px + band.shift(scroll));

        let Some(t) = band.fraction(position) else {
            continue;
        };

        let color = ColorAccumulator::lerp(band.from, band.to, t);
        if band.flags.contains(BandFlags::OVERLAY) {
            *acc = color;
        } else if band.flags.contains(BandFlags::SUBTRACT) {
            *acc -= color;
        } else {
            *acc += color;
        }
    }
}

/// Evaluate a pattern from a zeroed accumulator
pub fn sample(bands: &[PatternBand], scroll: Scroll, px: f32) -> ColorAccumulator {
    let mut acc = ColorAccumulator::ZERO;
    evaluate(bands, scroll, px, &mut acc);
    acc
}
