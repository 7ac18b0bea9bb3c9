mod accumulator;
mod utils;

use smart_leds::RGB8;

pub use accumulator::ColorAccumulator;
pub use utils::{invert_for_indicator, rgb_from_u32};

pub type Rgb = RGB8;
