//! Host request dispatch
//!
//! Typed form of the requests a configuration tool sends over the raw HID
//! channel. Decoding packets into [`HostRequest`] and encoding
//! [`HostResponse`] back is left to the transport.
//!
//! LED indices written through this surface are 1-based and index `0` ends
//! a batch. Single LED reads take a 0-based index.

use heapless::Vec;

use crate::color::Rgb;
use crate::engine::{DeviceParams, LightingConfig, MatrixEngine, MatrixHooks};
use crate::pattern::BandFlags;
use crate::renderer::LedSnapshot;

/// Size of one raw HID packet
pub const RAW_PACKET_SIZE: usize = 32;
/// Bytes of packet header in front of the payload
pub const PACKET_HEADER_SIZE: usize = 4;
/// Colors that fit in one paged read response
pub const PAGE_SIZE: usize = (RAW_PACKET_SIZE - PACKET_HEADER_SIZE) / 3;

/// One request from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostRequest<'r> {
    Ping,
    GetLightingConfig,
    SetLightingConfig(LightingConfig),
    SetAll(Rgb),
    /// Paint LEDs by 1-based index; stops at the first index `0`
    SetLeds(&'r [(u8, Rgb)]),
    GetDeviceParams,
    /// One LED by 0-based index, unlike the set paths
    GetLed(u8),
    /// One page of [`PAGE_SIZE`] colors, pages numbered from 1
    GetLedPage(u8),
    SetCustomPattern {
        colors: &'r [Rgb],
        repeat: u8,
        flags: BandFlags,
    },
    Commit,
    /// A request id the transport could not map
    Unknown(u8),
}

/// Whether a paged read has further pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    More,
    Done,
}

/// One page of live colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedPage {
    pub status: PageStatus,
    pub colors: Vec<Rgb, PAGE_SIZE>,
}

impl LedPage {
    /// Slice page `page` (1-based) out of `colors`
    ///
    /// Returns `None` for page `0` and for pages past the end.
    pub fn read(colors: &[Rgb], page: u8) -> Option<Self> {
        let index = usize::from(page).checked_sub(1)?;
        let start = index * PAGE_SIZE;
        if start >= colors.len() {
            return None;
        }
        let end = (start + PAGE_SIZE).min(colors.len());

        let status = if end < colors.len() {
            PageStatus::More
        } else {
            PageStatus::Done
        };
        Some(Self {
            status,
            colors: Vec::from_slice(&colors[start..end]).ok()?,
        })
    }
}

/// Response handed back to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum HostResponse {
    Ack,
    Lighting(LightingConfig),
    DeviceParams(DeviceParams),
    Led(LedSnapshot),
    Page(LedPage),
    /// Unknown request or a request that could not be served
    Error,
}

/// Serve one host request
pub fn handle<H: MatrixHooks, const LEDS: usize, const DRIVERS: usize>(
    engine: &mut MatrixEngine<'_, H, LEDS, DRIVERS>,
    request: HostRequest<'_>,
) -> HostResponse {
    match request {
        HostRequest::Ping => HostResponse::Ack,
        HostRequest::GetLightingConfig => HostResponse::Lighting(engine.lighting_config()),
        HostRequest::SetLightingConfig(lighting) => {
            engine.set_lighting_config(lighting);
            HostResponse::Ack
        }
        HostRequest::SetAll(color) => {
            engine.set_all(color);
            HostResponse::Ack
        }
        HostRequest::SetLeds(entries) => {
            set_leds(engine, entries);
            HostResponse::Ack
        }
        HostRequest::GetDeviceParams => HostResponse::DeviceParams(engine.device_params()),
        HostRequest::GetLed(index) => engine
            .led(usize::from(index))
            .map_or(HostResponse::Error, HostResponse::Led),
        HostRequest::GetLedPage(page) => LedPage::read(engine.colors(), page)
            .map_or(HostResponse::Error, HostResponse::Page),
        HostRequest::SetCustomPattern {
            colors,
            repeat,
            flags,
        } => match engine.set_custom_pattern(colors, repeat, flags) {
            Ok(()) => HostResponse::Ack,
            Err(_) => HostResponse::Error,
        },
        HostRequest::Commit => {
            engine.commit();
            HostResponse::Ack
        }
        HostRequest::Unknown(_) => HostResponse::Error,
    }
}

/// Paint a batch of LEDs by 1-based index
///
/// Stops at the first index `0`; out-of-range indices are skipped. Every
/// index up to the LED count is accepted, including the last LED.
pub fn set_leds<H: MatrixHooks, const LEDS: usize, const DRIVERS: usize>(
    engine: &mut MatrixEngine<'_, H, LEDS, DRIVERS>,
    entries: &[(u8, Rgb)],
) {
    for &(id, color) in entries {
        let Some(index) = usize::from(id).checked_sub(1) else {
            break;
        };
        engine.set_led(index, color);
    }
}
