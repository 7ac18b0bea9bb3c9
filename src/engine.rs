//! Matrix engine
//!
//! One value owning every piece of lighting state: the renderer, the GCR
//! controller, the frame pacing and the user hooks. The firmware threads it
//! through three entry points: [`MatrixEngine::task`] from the main loop,
//! [`MatrixEngine::gcr_tick`] from the power-check timer, and the host
//! operations used by [`crate::host`].

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedBus;
use crate::color::Rgb;
use crate::display::DisplayExtents;
use crate::frame_scheduler::{DEFAULT_UPDATE_INTERVAL, FrameScheduler};
use crate::gcr::{GcrConfig, GcrController, GcrEffects, PowerSample};
use crate::instruction::LedInstruction;
use crate::pattern::BandFlags;
use crate::pattern::custom::CustomPatternError;
use crate::renderer::{
    Animation, DEFAULT_SPEED, LedSnapshot, LightingMode, Renderer, RendererConfig,
};
use crate::topology::LedLayout;
use crate::transfer::{TransferQueue, TransferRequest};

/// Static engine configuration
#[derive(Debug, Clone, Copy)]
pub struct MatrixConfig<'a> {
    pub renderer: RendererConfig<'a>,
    pub gcr: GcrConfig,
    /// Minimum time between frame starts
    pub update_interval: Duration,
}

impl MatrixConfig<'static> {
    pub const DEFAULT: Self = Self {
        renderer: RendererConfig::DEFAULT,
        gcr: GcrConfig::DEFAULT,
        update_interval: DEFAULT_UPDATE_INTERVAL,
    };
}

impl Default for MatrixConfig<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lighting settings exposed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    /// Start new frames
    pub enabled: bool,
    pub mode: LightingMode,
    /// Desired global current
    pub brightness: u8,
    pub animation_id: u8,
    pub breathing: bool,
    /// Swap scroll directions
    pub reversed: bool,
    pub speed: f32,
    /// Let the supply voltage limit the global current
    pub auto_gcr: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: LightingMode::Normal,
            brightness: GcrConfig::DEFAULT.max,
            animation_id: 0,
            breathing: false,
            reversed: false,
            speed: DEFAULT_SPEED,
            auto_gcr: GcrConfig::DEFAULT.auto,
        }
    }
}

/// Board-specific behavior injected into the engine
pub trait MatrixHooks {
    /// Override rules checked for every LED
    fn instructions(&self) -> &[LedInstruction] {
        &[]
    }

    /// Adjust the lighting settings once before the first frame
    fn init(&mut self, _lighting: &mut LightingConfig) {}

    /// Persist the lighting settings
    fn commit(&mut self, _lighting: &LightingConfig) {}
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl MatrixHooks for NoHooks {}

/// Static instruction table with no other hooks
#[derive(Debug, Clone, Copy)]
pub struct Instructions<'a>(pub &'a [LedInstruction]);

impl MatrixHooks for Instructions<'_> {
    fn instructions(&self) -> &[LedInstruction] {
        self.0
    }
}

/// What one scheduler tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOutcome {
    /// A new frame was started and its transfers queued
    pub frame_started: bool,
    /// Transfer requests that did not fit in the queue
    pub rejected: usize,
    /// LEDs rendered this tick
    pub rendered: usize,
}

/// Device parameters reported to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceParams {
    pub led_count: usize,
    pub extents: DisplayExtents,
}

/// Lighting engine for a matrix of `LEDS` LEDs on `DRIVERS` driver chips
pub struct MatrixEngine<'a, H: MatrixHooks, const LEDS: usize, const DRIVERS: usize> {
    renderer: Renderer<'a, LEDS, DRIVERS>,
    gcr: GcrController,
    /// Drivers still owed the current GCR value
    gcr_pending: [bool; DRIVERS],
    scheduler: FrameScheduler,
    hooks: H,
}

impl<'a, H: MatrixHooks, const LEDS: usize, const DRIVERS: usize> MatrixEngine<'a, H, LEDS, DRIVERS> {
    /// Build the engine and render the first chunk
    ///
    /// The init hook runs before anything is rendered.
    pub fn new(
        addresses: [u8; DRIVERS],
        layout: &[LedLayout; LEDS],
        config: &MatrixConfig<'a>,
        hooks: H,
    ) -> Self {
        let mut engine = Self {
            renderer: Renderer::new(addresses, layout, &config.renderer),
            gcr: GcrController::new(config.gcr),
            gcr_pending: [false; DRIVERS],
            scheduler: FrameScheduler::new(config.update_interval),
            hooks,
        };

        let mut lighting = LightingConfig {
            brightness: config.gcr.max,
            auto_gcr: config.gcr.auto,
            ..LightingConfig::default()
        };
        engine.hooks.init(&mut lighting);
        engine.set_lighting_config(lighting);

        engine.renderer.restart_frame();
        engine.renderer.render_chunk(engine.hooks.instructions());
        engine
    }

    /// Scheduler tick
    ///
    /// Starts a new frame when one is due: the changed GCR value and every
    /// driver's PWM page are queued and the queue is kicked. Then renders one
    /// chunk if the frame is still incomplete.
    pub fn task<B: LedBus, const Q: usize>(
        &mut self,
        now: Instant,
        queue: &TransferQueue<Q>,
        bus: &mut B,
    ) -> TaskOutcome {
        let mut outcome = TaskOutcome::default();

        if self
            .scheduler
            .poll(now, self.renderer.is_frame_complete(), queue.is_idle())
        {
            outcome.rejected = self.queue_frame(queue);
            outcome.frame_started = true;
            queue.run(bus);
            self.renderer.restart_frame();
        }

        if !self.renderer.is_frame_complete() {
            outcome.rendered = self.renderer.render_chunk(self.hooks.instructions());
        }

        outcome
    }

    /// Queue GCR for every driver still owed it, then every PWM page
    ///
    /// A driver whose GCR request is rejected stays owed and is retried with
    /// the next frame.
    fn queue_frame<const Q: usize>(&mut self, queue: &TransferQueue<Q>) -> usize {
        if self.gcr.take_changed().is_some() {
            self.gcr_pending = [true; DRIVERS];
        }

        let mut rejected = 0;
        let value = self.gcr.actual();
        let drivers = self.renderer.drivers();
        for (driver, pending) in drivers.iter().zip(self.gcr_pending.iter_mut()) {
            if !*pending {
                continue;
            }
            if queue.try_enqueue(TransferRequest::gcr(driver, value)).is_ok() {
                *pending = false;
            } else {
                rejected += 1;
            }
        }
        for driver in drivers {
            if queue.try_enqueue(TransferRequest::pwm(driver)).is_err() {
                rejected += 1;
            }
        }

        #[cfg(feature = "esp32-log")]
        if rejected > 0 {
            println!("[MatrixEngine.task] transfer queue full, {} requests rejected", rejected);
        }
        rejected
    }

    /// Power check tick
    ///
    /// The returned effects must be applied to the hardware by the caller.
    pub fn gcr_tick(&mut self, sample: PowerSample) -> GcrEffects {
        self.gcr.tick(sample)
    }

    /// Current lighting settings
    pub fn lighting_config(&self) -> LightingConfig {
        let animation = self.renderer.animation();
        LightingConfig {
            enabled: self.scheduler.is_enabled(),
            mode: animation.mode,
            brightness: self.gcr.desired(),
            animation_id: animation.id,
            breathing: animation.breathing,
            reversed: animation.reversed,
            speed: animation.speed,
            auto_gcr: self.gcr.is_auto(),
        }
    }

    /// Apply lighting settings
    ///
    /// Brightness is capped at the GCR maximum and animation ids past the
    /// pattern table select the custom pattern.
    pub fn set_lighting_config(&mut self, lighting: LightingConfig) {
        self.scheduler.set_enabled(lighting.enabled);
        self.gcr.set_desired(lighting.brightness);
        self.gcr.set_auto(lighting.auto_gcr);
        self.gcr.set_breathing(lighting.breathing);
        self.renderer.set_animation(Animation {
            id: lighting.animation_id,
            mode: lighting.mode,
            speed: lighting.speed,
            reversed: lighting.reversed,
            breathing: lighting.breathing,
        });
    }

    /// Paint every LED immediately
    pub fn set_all(&mut self, color: Rgb) {
        self.renderer.set_all(color);
    }

    /// Paint one LED by 0-based index; returns whether the index was valid
    pub fn set_led(&mut self, index: usize, color: Rgb) -> bool {
        self.renderer.set_led(index, color)
    }

    /// Live color and position of one LED by 0-based index
    pub fn led(&self, index: usize) -> Option<LedSnapshot> {
        self.renderer.snapshot(index)
    }

    pub fn colors(&self) -> &[Rgb; LEDS] {
        self.renderer.colors()
    }

    pub fn device_params(&self) -> DeviceParams {
        DeviceParams {
            led_count: LEDS,
            extents: self.renderer.extents(),
        }
    }

    /// Replace the custom pattern
    pub fn set_custom_pattern(
        &mut self,
        colors: &[Rgb],
        repeat: u8,
        flags: BandFlags,
    ) -> Result<(), CustomPatternError> {
        self.renderer.set_custom_pattern(colors, repeat, flags)
    }

    /// Hand the current settings to the commit hook
    pub fn commit(&mut self) {
        let lighting = self.lighting_config();
        self.hooks.commit(&lighting);
    }

    /// Active keymap layers as a bitmask
    pub fn set_layer_state(&mut self, layer_state: u32) {
        self.renderer.set_layer_state(layer_state);
    }

    /// Host LED report
    pub fn set_host_indicators(&mut self, report: u8) {
        self.renderer.set_host_indicators(report);
    }

    pub const fn renderer(&self) -> &Renderer<'a, LEDS, DRIVERS> {
        &self.renderer
    }

    pub const fn gcr(&self) -> &GcrController {
        &self.gcr
    }

    pub const fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}
