//! Built-in patterns selectable by animation id

#![allow(clippy::unreadable_literal)]

use super::{BandFlags, PatternBand};
use crate::color::{Rgb, rgb_from_u32};

const RED: Rgb = rgb_from_u32(0xFF0000);
const YELLOW: Rgb = rgb_from_u32(0xFFFF00);
const GREEN: Rgb = rgb_from_u32(0x00FF00);
const CYAN: Rgb = rgb_from_u32(0x00FFFF);
const BLUE: Rgb = rgb_from_u32(0x0000FF);
const MAGENTA: Rgb = rgb_from_u32(0xFF00FF);
const WHITE: Rgb = rgb_from_u32(0xFFFFFF);
const TEAL: Rgb = rgb_from_u32(0x1880FF);
const SALMON: Rgb = rgb_from_u32(0xFF1818);

const SIXTH: f32 = 100.0 / 6.0;

/// Hue wheel split into six blended bands
macro_rules! rainbow {
    ($flags:expr) => {
        [
            PatternBand::new(0.0, SIXTH, RED, YELLOW, $flags),
            PatternBand::new(SIXTH, SIXTH * 2.0, YELLOW, GREEN, $flags),
            PatternBand::new(SIXTH * 2.0, SIXTH * 3.0, GREEN, CYAN, $flags),
            PatternBand::new(SIXTH * 3.0, SIXTH * 4.0, CYAN, BLUE, $flags),
            PatternBand::new(SIXTH * 4.0, SIXTH * 5.0, BLUE, MAGENTA, $flags),
            PatternBand::new(SIXTH * 5.0, 100.0, MAGENTA, RED, $flags),
        ]
    };
}

/// Scrolling rainbow
pub const RAINBOW_SCROLL: [PatternBand; 6] = rainbow!(BandFlags::SCROLL_RIGHT);

/// Stationary rainbow
pub const RAINBOW: [PatternBand; 6] = rainbow!(BandFlags::NONE);

/// Teal and salmon halves fading into each other, scrolling
pub const TEAL_SALMON: [PatternBand; 4] = [
    PatternBand::new(0.0, 25.0, TEAL, SALMON, BandFlags::SCROLL_RIGHT),
    PatternBand::new(25.0, 50.0, SALMON, TEAL, BandFlags::SCROLL_RIGHT),
    PatternBand::new(50.0, 75.0, TEAL, SALMON, BandFlags::SCROLL_RIGHT),
    PatternBand::new(75.0, 100.0, SALMON, TEAL, BandFlags::SCROLL_RIGHT),
];

/// Gradient from black to white across the board
pub const GRADIENT: [PatternBand; 1] = [PatternBand::new(
    0.0,
    100.0,
    Rgb { r: 0, g: 0, b: 0 },
    WHITE,
    BandFlags::NONE,
)];

pub const WHITE_SOLID: [PatternBand; 1] = [PatternBand::solid(0.0, 100.0, WHITE, BandFlags::NONE)];
pub const RED_SOLID: [PatternBand; 1] = [PatternBand::solid(0.0, 100.0, RED, BandFlags::NONE)];
pub const GREEN_SOLID: [PatternBand; 1] = [PatternBand::solid(0.0, 100.0, GREEN, BandFlags::NONE)];
pub const BLUE_SOLID: [PatternBand; 1] = [PatternBand::solid(0.0, 100.0, BLUE, BandFlags::NONE)];

/// All channels dark
pub const OFF: [PatternBand; 0] = [];

/// Default pattern table, indexed by animation id
pub static PATTERNS: [&[PatternBand]; 9] = [
    &RAINBOW_SCROLL,
    &TEAL_SALMON,
    &RAINBOW,
    &GRADIENT,
    &WHITE_SOLID,
    &RED_SOLID,
    &GREEN_SOLID,
    &BLUE_SOLID,
    &OFF,
];
