//! Global current regulation
//!
//! Keeps the LED drivers' global current (GCR) inside what the USB host can
//! supply. The controller steps the applied value toward a target and, in
//! auto mode, backs off whenever the averaged 5V rail sags. A catastrophic
//! drop of the instantaneous reading cuts the drivers immediately.
//!
//! Call [`GcrController::tick`] on a fixed period (5 ms in the reference
//! firmware) independently of frame rendering.

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Default maximum GCR value
pub const DEFAULT_GCR_MAX: u8 = 165;
/// Default change per control tick
pub const DEFAULT_GCR_STEP: u8 = 2;
/// Default 5V ADC level above which auto mode may raise the current
pub const DEFAULT_V5_HIGH: u16 = 2540;
/// Default 5V ADC level below which auto mode lowers the current
pub const DEFAULT_V5_LOW: u16 = 2480;
/// Default 5V ADC level treated as a catastrophic drop
pub const DEFAULT_V5_CATASTROPHIC: u16 = 2200;
/// Control ticks the drivers stay off after a catastrophic drop (~100 ms)
pub const DEFAULT_RECOVERY_TICKS: u8 = 20;
/// Control ticks at minimum current before the extra port is shut down (~1 s)
pub const DEFAULT_EXTRA_PORT_TICKS: u8 = 200;

/// Controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcrConfig {
    pub max: u8,
    pub step: u8,
    pub v5_high: u16,
    pub v5_low: u16,
    pub v5_catastrophic: u16,
    pub recovery_ticks: u8,
    pub extra_port_ticks: u8,
    /// Start in auto mode
    pub auto: bool,
}

impl GcrConfig {
    pub const DEFAULT: Self = Self {
        max: DEFAULT_GCR_MAX,
        step: DEFAULT_GCR_STEP,
        v5_high: DEFAULT_V5_HIGH,
        v5_low: DEFAULT_V5_LOW,
        v5_catastrophic: DEFAULT_V5_CATASTROPHIC,
        recovery_ticks: DEFAULT_RECOVERY_TICKS,
        extra_port_ticks: DEFAULT_EXTRA_PORT_TICKS,
        auto: true,
    };
}

impl Default for GcrConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// State of the secondary (extra) USB port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraPortState {
    #[default]
    Disabled,
    Enabled,
    /// Shut down for power reasons until the host connection is cycled
    DisabledUntilReplug,
}

/// Supply readings for one control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSample {
    /// Instantaneous 5V rail reading
    pub v5: u16,
    /// Averaged 5V rail reading
    pub v5_avg: u16,
    pub extra_port: ExtraPortState,
}

/// Hardware actions requested by a control tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcrEffects {
    /// Switch the LED driver chips on or off
    pub drivers_enabled: Option<bool>,
    /// Shut the extra port down until the host connection is cycled
    pub disable_extra_port: bool,
}

impl GcrEffects {
    /// Check if any effects need to be applied
    pub const fn has_effects(&self) -> bool {
        self.drivers_enabled.is_some() || self.disable_extra_port
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Hold,
    Increase,
    Decrease,
}

/// Global current controller
#[derive(Debug, Clone)]
pub struct GcrController {
    config: GcrConfig,
    desired: u8,
    breathe: u8,
    actual: u8,
    actual_last: u8,
    auto: bool,
    breathing: bool,
    min_counter: u8,
    catastrophic_countdown: u8,
}

impl GcrController {
    pub const fn new(config: GcrConfig) -> Self {
        Self {
            config,
            desired: 0,
            breathe: 0,
            actual: 0,
            actual_last: 0,
            auto: config.auto,
            breathing: false,
            min_counter: 0,
            catastrophic_countdown: 0,
        }
    }

    pub const fn config(&self) -> &GcrConfig {
        &self.config
    }

    /// Target under commanded lighting
    pub const fn desired(&self) -> u8 {
        self.desired
    }

    /// Target while breathing
    pub const fn breathe(&self) -> u8 {
        self.breathe
    }

    /// Currently applied value
    pub const fn actual(&self) -> u8 {
        self.actual
    }

    pub const fn is_auto(&self) -> bool {
        self.auto
    }

    /// Whether the drivers are held off after a catastrophic drop
    pub const fn is_recovering(&self) -> bool {
        self.catastrophic_countdown > 0
    }

    /// Set the commanded target, capped at the configured maximum
    ///
    /// The breathe target follows the new value.
    pub fn set_desired(&mut self, desired: u8) {
        self.desired = desired.min(self.config.max);
        self.breathe = self.desired;
    }

    pub fn set_auto(&mut self, auto: bool) {
        self.auto = auto;
    }

    /// Track whether a breathing animation is running
    ///
    /// Entering breathing re-arms the breathe target from the desired value.
    pub fn set_breathing(&mut self, breathing: bool) {
        if breathing && !self.breathing {
            self.breathe = self.desired;
        }
        self.breathing = breathing;
    }

    /// Return the applied value if it changed since the last call
    pub fn take_changed(&mut self) -> Option<u8> {
        if self.actual == self.actual_last {
            return None;
        }
        self.actual_last = self.actual;
        Some(self.actual)
    }

    fn target(&self) -> u8 {
        if self.breathing {
            self.breathe
        } else {
            self.desired
        }
    }

    /// Run one control tick
    pub fn tick(&mut self, sample: PowerSample) -> GcrEffects {
        let mut effects = GcrEffects::default();

        if sample.v5 < self.config.v5_catastrophic {
            #[cfg(feature = "esp32-log")]
            if self.catastrophic_countdown == 0 {
                println!("[GcrController.tick] 5V catastrophic level, disabling LED drivers");
            }
            self.catastrophic_countdown = self.config.recovery_ticks.max(1);
            self.actual = 0;
            self.auto = true;
            effects.drivers_enabled = Some(false);
            return effects;
        }

        if self.catastrophic_countdown > 1 {
            self.catastrophic_countdown -= 1;
            return effects;
        }

        if self.catastrophic_countdown == 1 {
            #[cfg(feature = "esp32-log")]
            println!("[GcrController.tick] re-enabling LED drivers");
            self.catastrophic_countdown = 0;
            effects.drivers_enabled = Some(true);
            return effects;
        }

        match self.next_step(sample) {
            Step::Hold => {
                self.min_counter = 0;
            }
            Step::Increase => {
                self.actual = self
                    .actual
                    .saturating_add(self.config.step)
                    .min(self.config.max);
                self.min_counter = 0;
            }
            Step::Decrease => {
                effects.disable_extra_port = self.decrease(sample.extra_port);
            }
        }

        effects
    }

    fn next_step(&self, sample: PowerSample) -> Step {
        let target = self.target();

        if self.auto {
            if sample.v5_avg < self.config.v5_low {
                Step::Decrease
            } else if sample.v5_avg > self.config.v5_high && self.actual < target {
                Step::Increase
            } else if self.actual > target {
                Step::Decrease
            } else {
                Step::Hold
            }
        } else if self.actual < target {
            Step::Increase
        } else if self.actual > target {
            Step::Decrease
        } else {
            Step::Hold
        }
    }

    /// Step down; returns whether the extra port should be shut down
    fn decrease(&mut self, extra_port: ExtraPortState) -> bool {
        if let Some(lowered) = self.actual.checked_sub(self.config.step) {
            self.actual = lowered;
            self.min_counter = 0;

            // A host short on current makes the top of the breathe cycle
            // unstable; settle the breathe target where the supply holds.
            if self.breathing {
                self.breathe = self.actual;
            }
            return false;
        }

        // Nothing left to take from the LEDs; the extra port is next.
        self.actual = 0;
        if extra_port != ExtraPortState::Enabled {
            return false;
        }

        self.min_counter = self.min_counter.saturating_add(1);
        if self.min_counter > self.config.extra_port_ticks {
            #[cfg(feature = "esp32-log")]
            println!("[GcrController.tick] disabling extra port until replug");
            self.min_counter = 0;
            return true;
        }
        false
    }
}
