use crate::color::Rgb;

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Invert a color so a lit lock indicator stands out against the pattern
///
/// Each channel flips to the opposite extreme: bright channels (> 127) go
/// dark, dark channels go full.
pub const fn invert_for_indicator(color: Rgb) -> Rgb {
    const fn flip(channel: u8) -> u8 {
        if channel > 127 { 0 } else { 255 }
    }

    Rgb {
        r: flip(color.r),
        g: flip(color.g),
        b: flip(color.b),
    }
}
