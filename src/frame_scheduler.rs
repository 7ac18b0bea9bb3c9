//! Frame update pacing
//!
//! Portable pacing without async/await or platform timers. The caller feeds
//! the current time on every tick; a new frame may start only once the update
//! interval has elapsed, the previous frame is fully rendered, and the
//! transfer queue has drained.

use embassy_time::{Duration, Instant};

/// Default time between frame starts
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(15);

/// Decides when the next frame may start
#[derive(Debug, Clone, Copy)]
pub struct FrameScheduler {
    next_run: Instant,
    interval: Duration,
    enabled: bool,
}

impl FrameScheduler {
    /// Create an enabled scheduler whose first frame is due immediately
    pub const fn new(interval: Duration) -> Self {
        Self {
            next_run: Instant::from_ticks(0),
            interval,
            enabled: true,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn next_run(&self) -> Instant {
        self.next_run
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stop or resume frame starts; rendering of a started frame continues
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether a new frame should start at `now`
    ///
    /// On `true` the next run is scheduled one interval after `now`.
    pub fn poll(&mut self, now: Instant, frame_complete: bool, queue_idle: bool) -> bool {
        if !self.enabled || now < self.next_run || !frame_complete || !queue_idle {
            return false;
        }
        self.next_run = now + self.interval;
        true
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}
