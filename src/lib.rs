#![no_std]

pub mod breathe;
pub mod color;
pub mod display;
pub mod engine;
pub mod frame_scheduler;
pub mod gcr;
pub mod host;
pub mod instruction;
pub mod layout;
pub mod pattern;
pub mod renderer;
pub mod topology;
pub mod transfer;

pub use breathe::{BreatheConfig, BreatheEnvelope};
pub use display::DisplayExtents;
pub use engine::{
    DeviceParams, Instructions, LightingConfig, MatrixConfig, MatrixEngine, MatrixHooks, NoHooks,
    TaskOutcome,
};
pub use frame_scheduler::FrameScheduler;
pub use gcr::{ExtraPortState, GcrConfig, GcrController, GcrEffects, PowerSample};
pub use host::{HostRequest, HostResponse, LedPage, PageStatus};
pub use instruction::{InstructionAction, LedIdSet, LedInstruction};
pub use pattern::custom::{CustomPattern, CustomPatternError};
pub use pattern::{BandFlags, PatternBand, Scroll};
pub use renderer::{
    Animation, FrameCursor, HostIndicator, IndicatorBinding, LedSnapshot, LightingMode, Renderer,
    RendererConfig,
};
pub use topology::{DriverRegisters, Led, LedAddress, LedLayout, Topology};
pub use transfer::{TransferQueue, TransferRequest, TrySendError};

pub use color::{ColorAccumulator, Rgb};
pub use embassy_time::{Duration, Instant};

/// Bus to the LED driver chips
///
/// Implement this trait to support different hardware platforms. A transfer
/// is only started here; the platform reports its end through
/// [`TransferQueue::on_transfer_complete`] or
/// [`TransferQueue::on_transfer_error`].
pub trait LedBus {
    /// Begin writing `request` to its driver chip
    fn start_transfer(&mut self, request: &TransferRequest);
}
