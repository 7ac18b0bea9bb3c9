//! Runtime-built patterns from a short host-supplied color list

use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{BandFlags, PatternBand};
use crate::color::Rgb;

/// Maximum number of distinct colors in a custom pattern
pub const MAX_CUSTOM_COLORS: usize = 10;
/// Maximum number of repetitions of the color list
pub const MAX_CUSTOM_REPEAT: usize = 8;
/// Band storage needed for the largest custom pattern
pub const MAX_CUSTOM_BANDS: usize = MAX_CUSTOM_COLORS * MAX_CUSTOM_REPEAT;

/// Reasons a custom pattern request is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomPatternError {
    /// More than [`MAX_CUSTOM_COLORS`] colors
    TooManyColors(usize),
    /// More than [`MAX_CUSTOM_REPEAT`] repetitions
    TooManyRepeats(u8),
}

/// Storage for the single custom pattern the engine may hold
#[derive(Debug, Clone, Default)]
pub struct CustomPattern {
    bands: Option<Vec<PatternBand, MAX_CUSTOM_BANDS>>,
}

impl CustomPattern {
    pub const fn new() -> Self {
        Self { bands: None }
    }

    /// Current bands, `None` when no custom pattern is held
    pub fn bands(&self) -> Option<&[PatternBand]> {
        self.bands.as_deref()
    }

    pub const fn is_set(&self) -> bool {
        self.bands.is_some()
    }

    /// Drop the held pattern
    pub fn clear(&mut self) {
        self.bands = None;
    }

    /// Replace the held pattern with one built from `colors`
    ///
    /// The previous pattern is released before anything else, so a rejected
    /// or unbuildable request leaves no custom pattern behind. An empty color
    /// list or zero repeat count clears the pattern.
    pub fn set(
        &mut self,
        colors: &[Rgb],
        repeat: u8,
        flags: BandFlags,
    ) -> Result<(), CustomPatternError> {
        self.clear();

        if colors.len() > MAX_CUSTOM_COLORS {
            #[cfg(feature = "esp32-log")]
            println!("[CustomPattern.set] rejected {} colors", colors.len());
            return Err(CustomPatternError::TooManyColors(colors.len()));
        }
        if usize::from(repeat) > MAX_CUSTOM_REPEAT {
            #[cfg(feature = "esp32-log")]
            println!("[CustomPattern.set] rejected repeat {}", repeat);
            return Err(CustomPatternError::TooManyRepeats(repeat));
        }

        self.bands = build_bands(colors, repeat, flags);
        Ok(())
    }
}

/// Lay out `colors.len() * repeat` evenly spaced bands across the display
///
/// Band `i` blends from color `i % repeat` to color `(i + 1) % repeat`, both
/// reduced onto the color list, so the last band wraps back to the first
/// color.
#[allow(clippy::cast_precision_loss)]
fn build_bands(
    colors: &[Rgb],
    repeat: u8,
    flags: BandFlags,
) -> Option<Vec<PatternBand, MAX_CUSTOM_BANDS>> {
    let repeat = usize::from(repeat);
    let count = colors.len() * repeat;
    if count == 0 {
        return None;
    }

    let width = 100.0 / count as f32;
    let color_at = |band: usize| colors.get(band % repeat % colors.len()).copied();

    let mut bands = Vec::new();
    for i in 0..count {
        let band = PatternBand::new(
            i as f32 * width,
            (i + 1) as f32 * width,
            color_at(i)?,
            color_at(i + 1)?,
            flags,
        );
        bands.push(band).ok()?;
    }
    Some(bands)
}
