//! Breathing envelope
//!
//! A triangular ramp over an 8-bit step counter, mapped through a quadratic
//! curve into a brightness multiplier.

/// Curve coefficient: 256 steps cover 0 to ~98% brightness
const CURVE: f32 = 0.000_015;

/// Configuration for the breathing envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreatheConfig {
    /// Lowest step of the ramp
    pub min_step: u8,
    /// Highest step of the ramp
    pub max_step: u8,
    /// Steps advanced per frame
    pub step: u8,
}

impl BreatheConfig {
    pub const DEFAULT: Self = Self {
        min_step: 0,
        max_step: 255,
        step: 1,
    };
}

impl Default for BreatheConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Inhale,
    Exhale,
}

/// Breathing envelope state
#[derive(Debug, Clone)]
pub struct BreatheEnvelope {
    config: BreatheConfig,
    current: u8,
    direction: Direction,
}

impl BreatheEnvelope {
    pub const fn new(config: BreatheConfig) -> Self {
        Self {
            config,
            current: config.min_step,
            direction: Direction::Inhale,
        }
    }

    /// Current ramp step
    pub const fn current(&self) -> u8 {
        self.current
    }

    /// Restart the ramp from the bottom
    pub fn reset(&mut self) {
        self.current = self.config.min_step;
        self.direction = Direction::Inhale;
    }

    /// Advance one frame and return the new brightness multiplier
    pub fn advance(&mut self) -> f32 {
        self.current = match self.direction {
            Direction::Inhale => self.current.saturating_add(self.config.step),
            Direction::Exhale => self.current.saturating_sub(self.config.step),
        };

        if self.current >= self.config.max_step {
            self.current = self.config.max_step;
            self.direction = Direction::Exhale;
        } else if self.current <= self.config.min_step {
            self.current = self.config.min_step;
            self.direction = Direction::Inhale;
        }

        self.multiplier()
    }

    /// Brightness multiplier for the current step, in `[0, 1]`
    pub fn multiplier(&self) -> f32 {
        let step = f32::from(self.current);
        (CURVE * step * step).clamp(0.0, 1.0)
    }
}
