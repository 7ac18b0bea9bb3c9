//! LED controller topology
//!
//! Maps logical LEDs onto the register images of the IS31FL3733-style
//! driver chips. Each chip addresses `CS_COUNT` current sources by
//! `SW_COUNT` switch lines; every RGB LED occupies one current source on
//! three switch lines.
//!
//! Every register page starts with one byte reserved for the I2C memory
//! start offset, so channel bytes begin at index 1.

use crate::color::Rgb;

/// Current sources ("columns") per driver chip
pub const CS_COUNT: usize = 16;
/// Switch lines ("rows") per driver chip
pub const SW_COUNT: usize = 12;
/// Single-color channels per driver chip
pub const CHANNEL_COUNT: usize = CS_COUNT * SW_COUNT;

/// LED control page (on/off, open, short bitmaps)
pub const ONOFF_PAGE_BYTES: usize = CHANNEL_COUNT / 8 + 1;
/// PWM page, one byte per channel
pub const PWM_PAGE_BYTES: usize = CHANNEL_COUNT + 1;
/// Auto breath mode page, one byte per channel
pub const ABM_PAGE_BYTES: usize = CHANNEL_COUNT + 1;
/// Function page
pub const FUNCTION_PAGE_BYTES: usize = 18 + 1;

/// Scan code marking an LED that does not sit under a key
pub const NO_SCAN_CODE: u8 = 0xFF;

/// PWM byte offset of a channel: `1 + (sw - 1) * 16 + (cs - 1)`
///
/// `sw` and `cs` are 1-based as printed in the datasheet. Returns `None`
/// for coordinates outside the chip.
pub const fn pwm_offset(sw: u8, cs: u8) -> Option<usize> {
    if !is_valid_channel(sw, cs) {
        return None;
    }
    Some(1 + (sw as usize - 1) * CS_COUNT + (cs as usize - 1))
}

/// On/off register position of a channel as `(byte, bit)`
///
/// Byte: `1 + (sw - 1) * 2 + (cs - 1) / 8`, bit: `(cs - 1) % 8`.
pub const fn onoff_position(sw: u8, cs: u8) -> Option<(usize, u8)> {
    if !is_valid_channel(sw, cs) {
        return None;
    }
    let cs0 = cs as usize - 1;
    #[allow(clippy::cast_possible_truncation)]
    let bit = (cs0 % 8) as u8;
    Some((1 + (sw as usize - 1) * 2 + cs0 / 8, bit))
}

const fn is_valid_channel(sw: u8, cs: u8) -> bool {
    sw >= 1 && sw as usize <= SW_COUNT && cs >= 1 && cs as usize <= CS_COUNT
}

/// Hardware address of one RGB LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedAddress {
    /// Driver number, 1-based position in the driver address list
    pub driver: u8,
    /// Current source, 1-based
    pub cs: u8,
    /// Switch line of the red channel, 1-based
    pub sw_red: u8,
    /// Switch line of the green channel, 1-based
    pub sw_green: u8,
    /// Switch line of the blue channel, 1-based
    pub sw_blue: u8,
}

impl LedAddress {
    pub const fn new(driver: u8, cs: u8, sw_red: u8, sw_green: u8, sw_blue: u8) -> Self {
        Self {
            driver,
            cs,
            sw_red,
            sw_green,
            sw_blue,
        }
    }

    /// Switch lines in R, G, B order
    pub const fn switch_lines(self) -> [u8; 3] {
        [self.sw_red, self.sw_green, self.sw_blue]
    }
}

/// One entry of a static board layout table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedLayout {
    /// PCB reference id, 1-based
    pub id: u8,
    pub address: LedAddress,
    /// Physical position
    pub x: f32,
    pub y: f32,
    /// Key scan code, [`NO_SCAN_CODE`] for LEDs without a key
    pub scan: u8,
}

impl LedLayout {
    pub const fn new(id: u8, address: LedAddress, x: f32, y: f32, scan: u8) -> Self {
        Self {
            id,
            address,
            x,
            y,
            scan,
        }
    }
}

/// A single PWM byte inside a driver register image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTarget {
    /// Index into the driver bank, 0-based
    pub driver: usize,
    /// Byte offset into the PWM page
    pub offset: usize,
}

/// Resolved LED descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Led {
    pub id: u8,
    /// Write targets in R, G, B order; `None` if the address is outside the
    /// driver bank
    pub targets: Option<[WriteTarget; 3]>,
    pub address: LedAddress,
    pub x: f32,
    pub y: f32,
    /// Normalized horizontal position in percent
    pub px: f32,
    /// Normalized vertical position in percent
    pub py: f32,
    pub scan: u8,
}

impl Led {
    /// Whether the LED sits under a key
    pub const fn is_key(&self) -> bool {
        self.scan != NO_SCAN_CODE
    }
}

/// Register image of one LED driver chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRegisters {
    address: u8,
    onoff: [u8; ONOFF_PAGE_BYTES],
    open: [u8; ONOFF_PAGE_BYTES],
    short: [u8; ONOFF_PAGE_BYTES],
    pwm: [u8; PWM_PAGE_BYTES],
    abm: [u8; ABM_PAGE_BYTES],
    function: [u8; FUNCTION_PAGE_BYTES],
}

impl DriverRegisters {
    /// Create a zeroed register image for the driver at `address`
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            onoff: [0; ONOFF_PAGE_BYTES],
            open: [0; ONOFF_PAGE_BYTES],
            short: [0; ONOFF_PAGE_BYTES],
            pwm: [0; PWM_PAGE_BYTES],
            abm: [0; ABM_PAGE_BYTES],
            function: [0; FUNCTION_PAGE_BYTES],
        }
    }

    /// I2C address of the chip
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Turn on the channel at (`sw`, `cs`)
    pub fn enable_channel(&mut self, sw: u8, cs: u8) {
        if let Some((byte, bit)) = onoff_position(sw, cs) {
            self.onoff[byte] |= 1 << bit;
        }
    }

    /// Check whether the channel at (`sw`, `cs`) is turned on
    pub fn is_channel_enabled(&self, sw: u8, cs: u8) -> bool {
        onoff_position(sw, cs).is_some_and(|(byte, bit)| self.onoff[byte] & (1 << bit) != 0)
    }

    /// PWM value at a page offset, `0` outside the page
    pub fn pwm(&self, offset: usize) -> u8 {
        self.pwm.get(offset).copied().unwrap_or(0)
    }

    /// Write a PWM value; offsets outside the page are ignored
    pub fn set_pwm(&mut self, offset: usize, value: u8) {
        if let Some(byte) = self.pwm.get_mut(offset) {
            *byte = value;
        }
    }

    pub const fn onoff_page(&self) -> &[u8; ONOFF_PAGE_BYTES] {
        &self.onoff
    }

    pub const fn open_page(&self) -> &[u8; ONOFF_PAGE_BYTES] {
        &self.open
    }

    pub const fn short_page(&self) -> &[u8; ONOFF_PAGE_BYTES] {
        &self.short
    }

    pub const fn pwm_page(&self) -> &[u8; PWM_PAGE_BYTES] {
        &self.pwm
    }

    pub const fn abm_page(&self) -> &[u8; ABM_PAGE_BYTES] {
        &self.abm
    }

    pub const fn function_page(&self) -> &[u8; FUNCTION_PAGE_BYTES] {
        &self.function
    }
}

/// Driver register images plus the resolved LED descriptors
#[derive(Debug, Clone)]
pub struct Topology<const LEDS: usize, const DRIVERS: usize> {
    pub drivers: [DriverRegisters; DRIVERS],
    pub leds: [Led; LEDS],
}

impl<const LEDS: usize, const DRIVERS: usize> Topology<LEDS, DRIVERS> {
    /// Build the driver images and resolve every LED's write targets
    ///
    /// Driver images start zeroed except for the on/off bits of every channel
    /// used by the layout. Normalized positions are left at zero until the
    /// display normalizer runs.
    pub fn build(addresses: [u8; DRIVERS], layout: &[LedLayout; LEDS]) -> Self {
        let mut drivers = addresses.map(DriverRegisters::new);

        let leds = (*layout).map(|entry| {
            let address = entry.address;
            let driver = usize::from(address.driver).checked_sub(1);
            let targets = driver
                .filter(|index| *index < DRIVERS)
                .and_then(|index| resolve_targets(index, address));

            if let (Some(index), Some(_)) = (driver, targets) {
                for sw in address.switch_lines() {
                    drivers[index].enable_channel(sw, address.cs);
                }
            }

            Led {
                id: entry.id,
                targets,
                address,
                x: entry.x,
                y: entry.y,
                px: 0.0,
                py: 0.0,
                scan: entry.scan,
            }
        });

        Self { drivers, leds }
    }

    /// Copy a color into the PWM bytes of the LED at `index`
    pub fn write_color(&mut self, index: usize, color: Rgb) {
        let Some(targets) = self.leds.get(index).and_then(|led| led.targets) else {
            return;
        };
        let [red, green, blue] = targets;
        for (target, value) in [(red, color.r), (green, color.g), (blue, color.b)] {
            if let Some(driver) = self.drivers.get_mut(target.driver) {
                driver.set_pwm(target.offset, value);
            }
        }
    }

    /// Read back the color stored in the PWM bytes of the LED at `index`
    pub fn read_color(&self, index: usize) -> Option<Rgb> {
        let [red, green, blue] = self.leds.get(index)?.targets?;
        let read = |target: WriteTarget| {
            self.drivers
                .get(target.driver)
                .map_or(0, |driver| driver.pwm(target.offset))
        };
        Some(Rgb {
            r: read(red),
            g: read(green),
            b: read(blue),
        })
    }
}

fn resolve_targets(driver: usize, address: LedAddress) -> Option<[WriteTarget; 3]> {
    let target = |sw: u8| {
        pwm_offset(sw, address.cs).map(|offset| WriteTarget { driver, offset })
    };
    Some([
        target(address.sw_red)?,
        target(address.sw_green)?,
        target(address.sw_blue)?,
    ])
}
