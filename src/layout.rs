//! Reference layout: 87-key tenkeyless board with a 32-LED underglow ring
//!
//! 119 LEDs on two driver chips. Keys come first in row order with scan code
//! equal to their index; the underglow runs clockwise from the bottom right
//! corner and carries no scan code.

use crate::renderer::{HostIndicator, IndicatorBinding};
use crate::topology::{LedAddress, LedLayout, NO_SCAN_CODE};

/// Number of LEDs in the reference layout
pub const TKL_LED_COUNT: usize = 119;
/// Number of LEDs under keys
pub const TKL_KEY_COUNT: usize = 87;
/// Number of driver chips
pub const TKL_DRIVER_COUNT: usize = 2;
/// Bus addresses of the driver chips
pub const TKL_DRIVER_ADDRESSES: [u8; TKL_DRIVER_COUNT] = [0xA0, 0xBE];
/// Scan code of the caps lock key
pub const TKL_CAPS_LOCK_SCAN: u8 = 50;

/// Indicator bindings of the reference board
pub static TKL_INDICATORS: [IndicatorBinding; 1] =
    [IndicatorBinding::new(HostIndicator::CapsLock, TKL_CAPS_LOCK_SCAN)];

const BOARD_DEPTH: f32 = 64.0;

/// Key and underglow positions, `y` measured downward from the top edge
#[rustfmt::skip]
const POSITIONS: [(f32, f32); TKL_LED_COUNT] = [
    // Function row
    (7.0, 5.0), (31.0, 5.0), (43.0, 5.0), (55.0, 5.0), (67.0, 5.0), (85.0, 5.0),
    (97.0, 5.0), (109.0, 5.0), (121.0, 5.0), (139.0, 5.0), (151.0, 5.0), (163.0, 5.0),
    (175.0, 5.0), (193.0, 5.0), (205.0, 5.0), (217.0, 5.0),
    // Number row
    (7.0, 20.0), (19.0, 20.0), (31.0, 20.0), (43.0, 20.0), (55.0, 20.0), (67.0, 20.0),
    (79.0, 20.0), (91.0, 20.0), (103.0, 20.0), (115.0, 20.0), (127.0, 20.0), (139.0, 20.0),
    (151.0, 20.0), (169.0, 20.0), (193.0, 20.0), (205.0, 20.0), (217.0, 20.0),
    // Top letter row
    (10.0, 30.0), (25.0, 30.0), (37.0, 30.0), (49.0, 30.0), (61.0, 30.0), (73.0, 30.0),
    (85.0, 30.0), (97.0, 30.0), (109.0, 30.0), (121.0, 30.0), (133.0, 30.0), (145.0, 30.0),
    (157.0, 30.0), (172.0, 30.0), (193.0, 30.0), (205.0, 30.0), (217.0, 30.0),
    // Home row
    (11.0, 39.0), (28.0, 39.0), (40.0, 39.0), (52.0, 39.0), (64.0, 39.0), (76.0, 39.0),
    (88.0, 39.0), (100.0, 39.0), (112.0, 39.0), (124.0, 39.0), (136.0, 39.0), (148.0, 39.0),
    (168.0, 39.0),
    // Bottom letter row
    (14.0, 49.0), (34.0, 49.0), (46.0, 49.0), (58.0, 49.0), (70.0, 49.0), (82.0, 49.0),
    (94.0, 49.0), (106.0, 49.0), (118.0, 49.0), (130.0, 49.0), (142.0, 49.0), (165.0, 49.0),
    (205.0, 49.0),
    // Modifier row
    (8.0, 59.0), (23.0, 59.0), (38.0, 59.0), (83.0, 59.0), (129.0, 59.0), (144.0, 59.0),
    (159.0, 59.0), (174.0, 59.0), (193.0, 59.0), (205.0, 59.0), (217.0, 59.0),
    // Underglow
    (222.0, 64.0), (204.0, 64.0), (186.0, 64.0), (167.0, 64.0), (149.0, 64.0), (130.0, 64.0),
    (112.0, 64.0), (94.0, 64.0), (75.0, 64.0), (57.0, 64.0), (38.0, 64.0), (20.0, 64.0),
    (0.0, 64.0), (0.0, 47.0), (0.0, 32.0), (0.0, 17.0), (0.0, 0.0), (20.0, 0.0),
    (38.0, 0.0), (57.0, 0.0), (75.0, 0.0), (94.0, 0.0), (112.0, 0.0), (130.0, 0.0),
    (149.0, 0.0), (167.0, 0.0), (186.0, 0.0), (204.0, 0.0), (222.0, 1.0), (224.0, 17.0),
    (224.0, 32.0), (224.0, 47.0),
];

/// Wiring of LED `index`
///
/// Each chip drives 64 LEDs: 16 current sources by 4 groups of three switch
/// lines.
#[allow(clippy::cast_possible_truncation)]
const fn address(index: usize) -> LedAddress {
    let driver = (index / 64 + 1) as u8;
    let cs = (index % 16 + 1) as u8;
    let group = ((index % 64) / 16) as u8;
    LedAddress::new(driver, cs, group * 3 + 1, group * 3 + 2, group * 3 + 3)
}

/// Build the reference layout
///
/// `y` is flipped so it grows toward the top edge.
#[allow(clippy::cast_possible_truncation)]
pub const fn tkl_layout() -> [LedLayout; TKL_LED_COUNT] {
    let mut layout = [LedLayout::new(0, address(0), 0.0, 0.0, NO_SCAN_CODE); TKL_LED_COUNT];
    let mut index = 0;
    while index < TKL_LED_COUNT {
        let (x, y) = POSITIONS[index];
        let scan = if index < TKL_KEY_COUNT {
            index as u8
        } else {
            NO_SCAN_CODE
        };
        layout[index] = LedLayout::new(
            (index + 1) as u8,
            address(index),
            x,
            BOARD_DEPTH - y,
            scan,
        );
        index += 1;
    }
    layout
}

/// The reference layout, built at compile time
pub static TKL_LAYOUT: [LedLayout; TKL_LED_COUNT] = tkl_layout();
