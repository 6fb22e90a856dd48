//! Fixed-point encodings for the fractional-N synthesizer.
//!
//! All conversions use exact integer arithmetic and round once, at the end
//! of the full expression, with ties going to the even value.

use core::ops::RangeInclusive;

/// Reference crystal frequency
pub const XTAL_FREQ: u32 = 30_000_000;

/// Output divider for the 2 m band (142-175 MHz)
pub const OUTDIV_2M: u32 = 24;

/// Supported transmit range
pub const BAND_2M: RangeInclusive<u32> = 144_000_000..=146_000_000;

const FRAC_BITS: u32 = 19;
const FRAC_ONE: i64 = 1 << FRAC_BITS;

/// Divide rounding to nearest, ties to even. `den` must be positive.
const fn div_round(num: i64, den: i64) -> i64 {
    let quot = num.div_euclid(den);
    let twice_rem = 2 * num.rem_euclid(den);
    if twice_rem > den || (twice_rem == den && quot & 1 == 1) {
        quot + 1
    } else {
        quot
    }
}

/// Integer and fractional synthesizer divider
///
/// The fractional part is kept in [2^19, 2^20), so the effective divider
/// ratio is `integer + fractional / 2^19` with the fraction in [1, 2).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyControl {
    integer: u8,
    fractional: u32,
}

impl FrequencyControl {
    pub const fn from_raw(integer: u8, fractional: u32) -> Self {
        Self {
            integer,
            fractional,
        }
    }

    pub fn integer(&self) -> u8 {
        self.integer
    }

    pub fn fractional(&self) -> u32 {
        self.fractional
    }

    /// FREQ_CONTROL_INTE payload
    pub fn integer_bytes(&self) -> [u8; 1] {
        [self.integer]
    }

    /// FREQ_CONTROL_FRAC payload, big-endian
    pub fn fractional_bytes(&self) -> [u8; 3] {
        let raw = self.fractional.to_be_bytes();
        [raw[1], raw[2], raw[3]]
    }
}

/// FSK frequency deviation
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyDeviation {
    raw: u32,
}

impl FrequencyDeviation {
    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn as_bytes(&self) -> [u8; 3] {
        let raw = self.raw.to_be_bytes();
        [raw[1], raw[2], raw[3]]
    }
}

/// Carrier offset, two's complement
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyOffset {
    raw: u16,
}

impl FrequencyOffset {
    pub fn raw(&self) -> i16 {
        self.raw as i16
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.raw.to_be_bytes()
    }
}

/// Synthesizer parameters: crystal reference and output divider
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Synthesizer {
    xtal: u32,
    outdiv: u32,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            xtal: XTAL_FREQ,
            outdiv: OUTDIV_2M,
        }
    }
}

impl Synthesizer {
    /// `None` if either the crystal frequency or the divider is zero
    pub const fn new(xtal: u32, outdiv: u32) -> Option<Self> {
        if xtal == 0 || outdiv == 0 {
            None
        } else {
            Some(Self { xtal, outdiv })
        }
    }

    pub const fn xtal(&self) -> u32 {
        self.xtal
    }

    pub const fn outdiv(&self) -> u32 {
        self.outdiv
    }

    /// Frequency of one integer divider step: `2 * xtal / outdiv`
    pub const fn channel_step(&self) -> u32 {
        2 * self.xtal / self.outdiv
    }

    /// Divider settings for the given carrier frequency, `None` if the
    /// integer divider does not fit FREQ_CONTROL_INTE
    pub fn frequency(&self, freq: u32) -> Option<FrequencyControl> {
        let reference = 2 * self.xtal as i64;
        let scaled = freq as i64 * self.outdiv as i64;
        // the fraction lives in [1, 2), hence one step below the floor
        let mut integer = scaled.div_euclid(reference) - 1;
        let mut fractional = div_round((scaled - integer * reference) * FRAC_ONE, reference);
        if fractional >= 2 * FRAC_ONE {
            integer += 1;
            fractional -= FRAC_ONE;
        }
        let integer = u8::try_from(integer).ok()?;
        Some(FrequencyControl {
            integer,
            fractional: fractional as u32,
        })
    }

    /// Carrier frequency produced by the given divider settings, rounded to Hz
    pub fn output_hz(&self, ctl: FrequencyControl) -> u64 {
        let ratio = ctl.integer as i64 * FRAC_ONE + ctl.fractional as i64;
        div_round(
            ratio * 2 * self.xtal as i64,
            self.outdiv as i64 * FRAC_ONE,
        ) as u64
    }

    /// MODEM_FREQ_DEV encoding, masked to 24 bits
    pub fn deviation(&self, hz: u32) -> FrequencyDeviation {
        FrequencyDeviation {
            raw: (self.fine_steps(hz as i64) & 0xff_ffff) as u32,
        }
    }

    /// MODEM_FREQ_OFFSET encoding, masked to 16 bits
    pub fn offset(&self, hz: i32) -> FrequencyOffset {
        FrequencyOffset {
            raw: (self.fine_steps(hz as i64) & 0xffff) as u16,
        }
    }

    /// `round(2^19 * outdiv * hz / (2 * xtal))`
    fn fine_steps(&self, hz: i64) -> i64 {
        div_round(
            FRAC_ONE * self.outdiv as i64 * hz,
            2 * self.xtal as i64,
        )
    }
}
