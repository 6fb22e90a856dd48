use bitflags::bitflags;

pub mod frequency;

pub use frequency::*;

/// Chip state machine states, as used by CHANGE_STATE and REQUEST_DEVICE_STATE
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    NoChange = 0x00,
    Sleep = 0x01,
    SpiActive = 0x02,
    #[default]
    Ready = 0x03,
    TxTune = 0x05,
    Tx = 0x07,
}

impl TryFrom<u8> for DeviceState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(DeviceState::NoChange),
            0x01 => Ok(DeviceState::Sleep),
            0x02 => Ok(DeviceState::SpiActive),
            0x03 => Ok(DeviceState::Ready),
            0x05 => Ok(DeviceState::TxTune),
            0x07 => Ok(DeviceState::Tx),
            _ => Err(value),
        }
    }
}

/// Last lifecycle step completed by the driver
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lifecycle {
    #[default]
    Unpowered,
    Awake,
    Booted,
    Verified,
    Configured,
    Transmitting,
}

/// Logging verbosity of a driver instance
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verbosity {
    #[default]
    Quiet,
    /// Commands and decoded replies
    Commands,
    /// Commands plus every raw frame on the bus
    Bus,
}

/// Configuration parameters
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub xtal_freq: u32,
    pub xo_tune: u8,
    pub pa_bias: u8,
    pub data_rate: u32,
    pub accepted_parts: &'static [u16],
    pub cts_pin_polls: u16,
    pub cts_spi_polls: u8,
    pub cts_poll_interval_ms: u32,
    pub synth: Option<SynthTuning>,
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            xtal_freq: XTAL_FREQ,
            xo_tune: 0x40,
            pa_bias: 0x00,
            data_rate: 64_000,
            accepted_parts: &[0x4063],
            cts_pin_polls: 1000,
            cts_spi_polls: 10,
            cts_poll_interval_ms: 1,
            synth: None,
            verbosity: Verbosity::Quiet,
        }
    }
}

impl Config {
    /// Synthesizer for the 2 m band, `None` when `xtal_freq` is zero
    pub fn synthesizer(&self) -> Option<Synthesizer> {
        Synthesizer::new(self.xtal_freq, OUTDIV_2M)
    }
}

bitflags! {
    /// GLOBAL_CONFIG flags
    #[derive(Copy, Clone, Default, PartialEq, Debug)]
    pub struct GlobalConfig: u8 {
        const Reserved = (1 << 6);
        const SequencerFast = (1 << 5);
        const FifoHalfDuplex = (1 << 4);
        const ProtocolIeee802154 = (1 << 1);
        const LowPower = 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GlobalConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "GlobalConfig {{ 0b{0=0..8:08b} }}", self.bits())
    }
}

/// Modulation selector of MODEM_MOD_TYPE
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModulationType {
    Cw = 0x00,
    Ook = 0x01,
    Fsk = 0x02,
}

impl TryFrom<u8> for ModulationType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ModulationType::Cw),
            0x01 => Ok(ModulationType::Ook),
            0x02 => Ok(ModulationType::Fsk),
            _ => Err(value),
        }
    }
}

/// Direct mode modulation
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Modulation {
    Cw,
    Ook,
    /// Frequency shift keying with the given deviation in Hz
    Fsk { deviation: u32 },
}

impl Modulation {
    pub fn mod_type(&self) -> ModulationType {
        match self {
            Modulation::Cw => ModulationType::Cw,
            Modulation::Ook => ModulationType::Ook,
            Modulation::Fsk { .. } => ModulationType::Fsk,
        }
    }
}

/// MODEM_MOD_TYPE: asynchronous direct mode
pub const TX_DIRECT_MODE_ASYNC: u8 = 1 << 7;

/// MODEM_MOD_TYPE: direct mode data taken from GPIO0
pub const TX_DIRECT_MODE_GPIO0: u8 = 0 << 5;

/// MODEM_MOD_TYPE: modulation source is the direct mode pin
pub const MOD_SOURCE_DIRECT: u8 = 1 << 3;

/// MODEM_CLKGEN_BAND: skip forced synthesizer recalibration
pub const SY_SEL_SKIP_RECAL: u8 = 1 << 4;

/// MODEM_CLKGEN_BAND: divide-by-2 prescaler, high performance
pub const SY_SEL_DIV_BY_2: u8 = 1 << 3;

/// MODEM_CLKGEN_BAND: VCO divided by 24 (3.6 GHz / 24 = 150 MHz)
pub const BAND_FVCO_DIV_24: u8 = 0x05;

/// PA_MODE: external TX ramp signal enabled
pub const PA_EXT_RAMP_ENABLE: u8 = 1 << 7;

/// PA_MODE: high power, coarse step size
pub const PA_SEL_HP_COARSE: u8 = 0x02 << 2;

/// PA_BIAS_CLKDUTY: differential 50% duty cycle
pub const CLKDUTY_DIFF_50: u8 = 0x00 << 6;

/// TX oversampling ratio selector of MODEM_TX_NCO_MODE (10x)
pub const TXOSR_10X: u8 = 0x00;

/// Synthesizer loop tuning, for boards where the default loop is unstable
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SynthTuning {
    pub cp_ff: u8,
    pub cp_int: u8,
    pub kv_dir: u8,
    pub kv_int: u8,
}

impl Default for SynthTuning {
    fn default() -> Self {
        Self {
            cp_ff: 0x00,
            cp_int: 0x00,
            kv_dir: 0x01,
            kv_int: 0x01,
        }
    }
}

impl SynthTuning {
    pub fn vco_kv(&self) -> u8 {
        (self.kv_dir & 0x03) << 2 | (self.kv_int & 0x03)
    }
}

/// Radio configuration applied by `Si4063::configure`
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Carrier frequency in Hz
    pub frequency: u32,
    pub modulation: Modulation,
    /// Carrier offset in Hz
    pub offset: i32,
    /// PA level, 0..=127
    pub power: u8,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency: 144_050_000,
            modulation: Modulation::Cw,
            offset: 0,
            power: 0x3f,
        }
    }
}

/// PART_INFO reply
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartInfo {
    pub chip_rev: u8,
    pub part: u16,
    pub build: u8,
    pub id: u16,
    pub customer: u8,
    pub rom_id: u8,
}

impl PartInfo {
    pub(crate) fn new(raw: &[u8; 8]) -> Self {
        Self {
            chip_rev: raw[0],
            part: u16::from_be_bytes([raw[1], raw[2]]),
            build: raw[3],
            id: u16::from_be_bytes([raw[4], raw[5]]),
            customer: raw[6],
            rom_id: raw[7],
        }
    }
}

/// Outcome of a PART_INFO query
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartInfoReply {
    /// Number of reply reads, including the successful one
    pub attempts: u8,
    pub info: Option<PartInfo>,
}

/// REQUEST_DEVICE_STATE reply
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub state: Option<DeviceState>,
    pub channel: u8,
}

/// Raw battery and temperature ADC codes
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcReading {
    pub battery_raw: u16,
    pub temperature_raw: u16,
}

impl AdcReading {
    /// Battery voltage in volts
    pub fn battery_voltage(&self) -> f32 {
        3.0 * self.battery_raw as f32 / 1280.0
    }

    /// Die temperature in degrees Celsius
    pub fn temperature(&self) -> f32 {
        (899.0 / 4096.0) * self.temperature_raw as f32 - 293.0
    }
}
