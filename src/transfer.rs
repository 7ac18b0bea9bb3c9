//! Driver transfer queue shared with interrupt handlers
//!
//! Requests are queued from the cooperative context and drained one at a time
//! by the bus. The DMA-complete interrupt calls
//! [`TransferQueue::on_transfer_complete`], which clears the busy flag and
//! starts the next request. Everything is guarded by `critical-section`; the
//! busy flag is an atomic so it can be polled without entering one.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedBus;
use crate::topology::{DriverRegisters, PWM_PAGE_BYTES};

/// Attempts made for a failing transfer after the first one
pub const MAX_TRANSFER_RETRIES: u8 = 3;

/// Error returned when the queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// One write to a driver chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    /// Global current register
    Gcr { address: u8, value: u8 },
    /// Full PWM page
    Pwm {
        address: u8,
        data: [u8; PWM_PAGE_BYTES],
    },
}

impl TransferRequest {
    pub const fn gcr(driver: &DriverRegisters, value: u8) -> Self {
        Self::Gcr {
            address: driver.address(),
            value,
        }
    }

    pub const fn pwm(driver: &DriverRegisters) -> Self {
        Self::Pwm {
            address: driver.address(),
            data: *driver.pwm_page(),
        }
    }

    /// Bus address of the target chip
    pub const fn address(&self) -> u8 {
        match self {
            Self::Gcr { address, .. } | Self::Pwm { address, .. } => *address,
        }
    }
}

struct InFlight {
    request: TransferRequest,
    retries: u8,
}

struct QueueState<const SIZE: usize> {
    pending: Deque<TransferRequest, SIZE>,
    in_flight: Option<InFlight>,
}

/// Bounded transfer queue with a single transfer in flight
pub struct TransferQueue<const SIZE: usize> {
    state: Mutex<RefCell<QueueState<SIZE>>>,
    busy: AtomicBool,
    bus_errors: AtomicU32,
    dropped: AtomicU32,
}

impl<const SIZE: usize> TransferQueue<SIZE> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(QueueState {
                pending: Deque::new(),
                in_flight: None,
            })),
            busy: AtomicBool::new(false),
            bus_errors: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Queue a request without starting it
    ///
    /// Returns `Err(TrySendError(request))` if the queue is full.
    pub fn try_enqueue(&self, request: TransferRequest) -> Result<(), TrySendError<TransferRequest>> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.pending.push_back(request).map_err(TrySendError)
        })
    }

    /// Start the next queued request unless one is already in flight
    ///
    /// Returns whether a transfer was started.
    pub fn run<B: LedBus>(&self, bus: &mut B) -> bool {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            self.start_next(&mut state, bus)
        })
    }

    /// Transfer-complete interrupt entry point
    pub fn on_transfer_complete<B: LedBus>(&self, bus: &mut B) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.in_flight = None;
            self.busy.store(false, Ordering::Release);
            self.start_next(&mut state, bus);
        });
    }

    /// Transfer-error interrupt entry point
    ///
    /// The failed request is restarted up to [`MAX_TRANSFER_RETRIES`] times,
    /// then dropped so the queue keeps draining.
    pub fn on_transfer_error<B: LedBus>(&self, bus: &mut B) {
        self.bus_errors.fetch_add(1, Ordering::Relaxed);

        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            let Some(in_flight) = state.in_flight.as_mut() else {
                self.busy.store(false, Ordering::Release);
                return;
            };

            if in_flight.retries < MAX_TRANSFER_RETRIES {
                in_flight.retries += 1;
                bus.start_transfer(&in_flight.request);
                return;
            }

            #[cfg(feature = "esp32-log")]
            println!(
                "[TransferQueue.on_transfer_error] dropping transfer to {:#04x}",
                in_flight.request.address()
            );
            self.dropped.fetch_add(1, Ordering::Relaxed);
            state.in_flight = None;
            self.busy.store(false, Ordering::Release);
            self.start_next(&mut state, bus);
        });
    }

    /// Bus error interrupt entry point
    ///
    /// Only records the error; the bus is expected to report the failed
    /// transfer through [`TransferQueue::on_transfer_error`].
    pub fn on_bus_error(&self) {
        self.bus_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether a transfer is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Nothing in flight and nothing pending
    pub fn is_idle(&self) -> bool {
        !self.is_busy() && self.pending() == 0
    }

    /// Number of queued requests not yet started
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.state.borrow(cs).borrow().pending.len())
    }

    /// Bus and transfer errors seen so far
    pub fn bus_errors(&self) -> u32 {
        self.bus_errors.load(Ordering::Relaxed)
    }

    /// Transfers given up on after exhausting their retries
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn start_next<B: LedBus>(&self, state: &mut QueueState<SIZE>, bus: &mut B) -> bool {
        if self.busy.load(Ordering::Acquire) {
            return false;
        }
        let Some(request) = state.pending.pop_front() else {
            return false;
        };

        self.busy.store(true, Ordering::Release);
        bus.start_transfer(&request);
        state.in_flight = Some(InFlight {
            request,
            retries: 0,
        });
        true
    }
}

impl<const SIZE: usize> Default for TransferQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
