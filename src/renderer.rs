//! Chunked frame renderer
//!
//! Computes one chunk of LEDs per call so a full frame is spread over several
//! scheduler ticks. The live color buffer is the single source of truth; every
//! processed LED is flushed into the driver PWM bytes right away.

use crate::breathe::{BreatheConfig, BreatheEnvelope};
use crate::color::{ColorAccumulator, Rgb, invert_for_indicator};
use crate::display::DisplayExtents;
use crate::instruction::{LedInstruction, PatternSet, highest_active_layer, resolve};
use crate::pattern::builtin::PATTERNS;
use crate::pattern::custom::{CustomPattern, CustomPatternError};
use crate::pattern::{BandFlags, PatternBand, Scroll};
use crate::topology::{DriverRegisters, Led, LedLayout, Topology};

/// Default number of LEDs rendered per scheduler tick
pub const DEFAULT_CHUNK_SIZE: usize = 15;

/// Default animation speed
pub const DEFAULT_SPEED: f32 = 4.0;

const LIGHTING_MODE_NORMAL: u8 = 0;
const LIGHTING_MODE_KEYS_ONLY: u8 = 1;
const LIGHTING_MODE_NON_KEYS_ONLY: u8 = 2;
const LIGHTING_MODE_INDICATORS_ONLY: u8 = 3;
const LIGHTING_MODE_EXTERNAL: u8 = 4;

/// Which LEDs the animation paints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum LightingMode {
    /// Every LED
    #[default]
    Normal = LIGHTING_MODE_NORMAL,
    /// Only LEDs under keys; the rest keep their last color
    KeysOnly = LIGHTING_MODE_KEYS_ONLY,
    /// Only LEDs not under keys
    NonKeysOnly = LIGHTING_MODE_NON_KEYS_ONLY,
    /// Nothing but host lock indicators
    IndicatorsOnly = LIGHTING_MODE_INDICATORS_ONLY,
    /// The renderer leaves the live buffer to direct-set operations
    External = LIGHTING_MODE_EXTERNAL,
}

impl LightingMode {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            LIGHTING_MODE_NORMAL => Self::Normal,
            LIGHTING_MODE_KEYS_ONLY => Self::KeysOnly,
            LIGHTING_MODE_NON_KEYS_ONLY => Self::NonKeysOnly,
            LIGHTING_MODE_INDICATORS_ONLY => Self::IndicatorsOnly,
            LIGHTING_MODE_EXTERNAL => Self::External,
            _ => return None,
        })
    }

    /// Whether the animation paints `led` in this mode
    pub const fn paints(self, led: &Led) -> bool {
        match self {
            Self::Normal => true,
            Self::KeysOnly => led.is_key(),
            Self::NonKeysOnly => !led.is_key(),
            Self::IndicatorsOnly | Self::External => false,
        }
    }
}

/// Host keyboard indicator, numbered by its bit in the host LED report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HostIndicator {
    NumLock = 0,
    CapsLock = 1,
    ScrollLock = 2,
    Compose = 3,
    Kana = 4,
}

impl HostIndicator {
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// Binds a host indicator to the LED under a scan code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorBinding {
    pub indicator: HostIndicator,
    pub scan: u8,
}

impl IndicatorBinding {
    pub const fn new(indicator: HostIndicator, scan: u8) -> Self {
        Self { indicator, scan }
    }
}

/// Static renderer configuration
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig<'a> {
    /// LEDs rendered per call
    pub chunk_size: usize,
    pub breathe: BreatheConfig,
    /// Pattern table indexed by animation id
    pub patterns: &'a [&'a [PatternBand]],
    pub indicators: &'a [IndicatorBinding],
}

impl RendererConfig<'static> {
    pub const DEFAULT: Self = Self {
        chunk_size: DEFAULT_CHUNK_SIZE,
        breathe: BreatheConfig::DEFAULT,
        patterns: &PATTERNS,
        indicators: &[],
    };
}

impl Default for RendererConfig<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Animation parameters controlled by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    /// Pattern index; `patterns.len()` selects the custom pattern
    pub id: u8,
    pub mode: LightingMode,
    pub speed: f32,
    /// Swap scroll directions
    pub reversed: bool,
    pub breathing: bool,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            id: 0,
            mode: LightingMode::Normal,
            speed: DEFAULT_SPEED,
            reversed: false,
            breathing: false,
        }
    }
}

/// Position of the renderer inside the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCursor {
    /// A new frame begins with the next chunk
    Start,
    /// The next chunk begins at this LED index
    At(usize),
    /// Every LED of the frame has been processed
    Complete,
}

/// Values computed once per frame
#[derive(Debug, Clone, Copy)]
struct FrameState {
    breathe_multiplier: f32,
    scroll: Scroll,
    highest_layer: u8,
}

/// Color and position of one LED
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedSnapshot {
    pub color: Rgb,
    pub x: f32,
    pub y: f32,
    pub px: f32,
    pub py: f32,
}

/// Frame renderer
pub struct Renderer<'a, const LEDS: usize, const DRIVERS: usize> {
    topology: Topology<LEDS, DRIVERS>,
    extents: DisplayExtents,
    live: [Rgb; LEDS],

    patterns: &'a [&'a [PatternBand]],
    custom: CustomPattern,
    indicators: &'a [IndicatorBinding],
    chunk_size: usize,

    animation: Animation,
    breathe: BreatheEnvelope,
    cursor: FrameCursor,
    frame: u32,
    frame_state: FrameState,

    layer_state: u32,
    host_indicators: u8,
}

impl<'a, const LEDS: usize, const DRIVERS: usize> Renderer<'a, LEDS, DRIVERS> {
    /// Build the topology, normalize the display and clear every LED
    pub fn new(
        addresses: [u8; DRIVERS],
        layout: &[LedLayout; LEDS],
        config: &RendererConfig<'a>,
    ) -> Self {
        let mut topology = Topology::build(addresses, layout);
        let extents = DisplayExtents::measure(&topology.leds);
        extents.normalize(&mut topology.leds);

        let mut renderer = Self {
            topology,
            extents,
            live: [Rgb::default(); LEDS],
            patterns: config.patterns,
            custom: CustomPattern::new(),
            indicators: config.indicators,
            chunk_size: config.chunk_size.max(1),
            animation: Animation::default(),
            breathe: BreatheEnvelope::new(config.breathe),
            cursor: FrameCursor::Complete,
            frame: 0,
            frame_state: FrameState {
                breathe_multiplier: 1.0,
                scroll: Scroll::NONE,
                highest_layer: 0,
            },
            layer_state: 0,
            host_indicators: 0,
        };
        renderer.flush_all();
        renderer
    }

    /// Render the next chunk of the current frame
    ///
    /// Starts a new frame first if the cursor sits at [`FrameCursor::Start`].
    /// Returns the number of LEDs processed, `0` once the frame is complete.
    pub fn render_chunk(&mut self, instructions: &[LedInstruction]) -> usize {
        let start = match self.cursor {
            FrameCursor::Complete => return 0,
            FrameCursor::Start => {
                self.begin_frame();
                0
            }
            FrameCursor::At(index) => index,
        };
        let end = start.saturating_add(self.chunk_size).min(LEDS);

        let patterns = PatternSet {
            builtin: self.patterns,
            rotating: select_pattern(self.patterns, &self.custom, self.animation.id),
            scroll: self.frame_state.scroll,
        };

        for index in start..end {
            let led = self.topology.leds[index];
            if self.animation.mode != LightingMode::External {
                if self.animation.mode.paints(&led) {
                    let contribution = resolve(
                        instructions,
                        &patterns,
                        &led,
                        self.frame_state.highest_layer,
                    );
                    self.live[index] = self.shade(contribution, led.scan);
                } else if indicator_bound(self.indicators, led.scan) {
                    // Masked indicator keys still show the lock state
                    self.live[index] = self.shade(ColorAccumulator::ZERO, led.scan);
                }
            }
            self.topology.write_color(index, self.live[index]);
        }

        self.cursor = if end >= LEDS {
            FrameCursor::Complete
        } else {
            FrameCursor::At(end)
        };
        end - start
    }

    /// Clamp, breathe and apply the indicator override to one contribution
    fn shade(&self, contribution: ColorAccumulator, scan: u8) -> Rgb {
        let mut shaded = contribution.clamped();
        if self.animation.breathing {
            shaded = shaded.scaled(self.frame_state.breathe_multiplier);
        }

        let color = shaded.to_rgb();
        if indicator_lit(self.indicators, self.host_indicators, scan) {
            invert_for_indicator(color)
        } else {
            color
        }
    }

    /// Per-frame computations done before the first chunk
    fn begin_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);

        self.frame_state.breathe_multiplier = if self.animation.breathing {
            self.breathe.advance()
        } else {
            1.0
        };
        self.frame_state.scroll = Scroll::new(
            Scroll::offset_for_frame(self.frame, self.animation.speed),
            self.animation.reversed,
        );
        self.frame_state.highest_layer = highest_active_layer(self.layer_state);
    }

    /// Mark the current frame done and arm the next one
    pub fn restart_frame(&mut self) {
        self.cursor = FrameCursor::Start;
    }

    pub const fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    pub const fn is_frame_complete(&self) -> bool {
        matches!(self.cursor, FrameCursor::Complete)
    }

    /// Number of frames started so far
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    /// Copy the whole live buffer into the driver PWM bytes
    fn flush_all(&mut self) {
        for (index, color) in self.live.iter().enumerate() {
            self.topology.write_color(index, *color);
        }
    }

    /// Paint every LED immediately
    pub fn set_all(&mut self, color: Rgb) {
        self.live = [color; LEDS];
        self.flush_all();
    }

    /// Paint one LED immediately; out-of-range indices are ignored
    ///
    /// Returns whether the index was valid.
    pub fn set_led(&mut self, index: usize, color: Rgb) -> bool {
        let Some(live) = self.live.get_mut(index) else {
            return false;
        };
        *live = color;
        self.topology.write_color(index, color);
        true
    }

    /// Live color of one LED
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.live.get(index).copied()
    }

    /// Live color and position of one LED
    pub fn snapshot(&self, index: usize) -> Option<LedSnapshot> {
        let color = self.live.get(index)?;
        let led = self.topology.leds.get(index)?;
        Some(LedSnapshot {
            color: *color,
            x: led.x,
            y: led.y,
            px: led.px,
            py: led.py,
        })
    }

    pub const fn colors(&self) -> &[Rgb; LEDS] {
        &self.live
    }

    pub const fn leds(&self) -> &[Led; LEDS] {
        &self.topology.leds
    }

    pub const fn drivers(&self) -> &[DriverRegisters; DRIVERS] {
        &self.topology.drivers
    }

    pub const fn extents(&self) -> DisplayExtents {
        self.extents
    }

    pub const fn animation(&self) -> Animation {
        self.animation
    }

    /// Replace the animation parameters
    ///
    /// Animation ids past the pattern table select the custom pattern slot.
    pub fn set_animation(&mut self, animation: Animation) {
        let custom_slot = u8::try_from(self.patterns.len()).unwrap_or(u8::MAX);
        if animation.breathing && !self.animation.breathing {
            self.breathe.reset();
        }
        self.animation = Animation {
            id: animation.id.min(custom_slot),
            ..animation
        };
    }

    /// Active keymap layers as a bitmask
    pub fn set_layer_state(&mut self, layer_state: u32) {
        self.layer_state = layer_state;
    }

    /// Host LED report (num lock, caps lock, ...)
    pub fn set_host_indicators(&mut self, report: u8) {
        self.host_indicators = report;
    }

    /// Build and hold a custom pattern
    pub fn set_custom_pattern(
        &mut self,
        colors: &[Rgb],
        repeat: u8,
        flags: BandFlags,
    ) -> Result<(), CustomPatternError> {
        self.custom.set(colors, repeat, flags)
    }

    pub fn custom_pattern(&self) -> Option<&[PatternBand]> {
        self.custom.bands()
    }

    /// Pattern currently selected by the animation id
    pub fn rotating_pattern(&self) -> Option<&[PatternBand]> {
        select_pattern(self.patterns, &self.custom, self.animation.id)
    }
}

fn select_pattern<'p>(
    patterns: &'p [&'p [PatternBand]],
    custom: &'p CustomPattern,
    id: u8,
) -> Option<&'p [PatternBand]> {
    match patterns.get(usize::from(id)) {
        Some(bands) => Some(bands),
        None => custom.bands(),
    }
}

fn indicator_bound(bindings: &[IndicatorBinding], scan: u8) -> bool {
    bindings.iter().any(|binding| binding.scan == scan)
}

fn indicator_lit(bindings: &[IndicatorBinding], report: u8, scan: u8) -> bool {
    report != 0
        && bindings
            .iter()
            .any(|binding| binding.scan == scan && report & binding.indicator.mask() != 0)
}
