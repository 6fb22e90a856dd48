//! A platform agnostic Rust driver for the Si4063 transmitter, based on the `embedded-hal` traits.
//!
//! The chip is driven over a bit-banged SPI bus ([`SoftSpi`]) and used in
//! direct asynchronous mode: once [`Si4063::start_tx`] has been issued the
//! carrier is keyed by [`Si4063::set_output_bit`], whose timing is entirely
//! up to the caller. Only the 2 m band (144-146 MHz) is supported.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

use commands::*;
use embedded_hal::{
    delay::DelayNs,
    digital::{OutputPin, PinState, StatefulOutputPin},
    spi::SpiBus,
};

pub mod bus;
pub mod commands;
pub mod config;
pub mod cts;
pub mod properties;

pub use bus::{BusError, SelectBus, SoftSpi};
pub use config::*;
pub use cts::*;
pub use properties::*;

/// PART_INFO reply reads before giving up
pub const PART_INFO_ATTEMPTS: u8 = 10;

/// SYNC_CONFIG: do not transmit a sync word
pub const SYNC_NO_TRANSMIT: u8 = 1 << 7;

/// Si4063 error
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Error<E> {
    PinError,
    TransferError(E),
    ConfigError,
    InvalidModulation(u8),
    FrequencyOutOfRange(u32),
    ChipNotDetected,
    UnknownChip(u16),
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinError => write!(f, "GPIO Error"),
            Self::TransferError(err) => write!(f, "SPI Error: {:?}", err),
            Self::ConfigError => write!(f, "Config Error"),
            Self::InvalidModulation(code) => write!(f, "Invalid modulation type: {}", code),
            Self::FrequencyOutOfRange(freq) => write!(f, "Frequency out of range: {} Hz", freq),
            Self::ChipNotDetected => write!(f, "Chip not detected"),
            Self::UnknownChip(part) => write!(f, "Wrong chip: {:04x}", part),
        }
    }
}

/// Driver for the Si4063
pub struct Si4063<BUS, SDN, TXD, GATE, DELAY> {
    bus: BUS,
    sdn: SDN,
    tx_data: TXD,
    gate: GATE,
    delay: DELAY,
    cfg: Config,
    lifecycle: Lifecycle,
}

impl<BUS, SDN, TXD, GATE, DELAY> Si4063<BUS, SDN, TXD, GATE, DELAY> {
    /// Create a driver without touching the hardware
    pub fn new(bus: BUS, sdn: SDN, tx_data: TXD, gate: GATE, delay: DELAY, cfg: Config) -> Self {
        Self {
            bus,
            sdn,
            tx_data,
            gate,
            delay,
            cfg,
            lifecycle: Lifecycle::Unpowered,
        }
    }

    /// Releases bus, control pins, CTS gate and delay
    pub fn release(self) -> (BUS, SDN, TXD, GATE, DELAY) {
        (self.bus, self.sdn, self.tx_data, self.gate, self.delay)
    }

    /// Set common config
    pub fn set_config(&mut self, cfg: Config) {
        self.cfg = cfg;
    }

    /// Get common config
    pub fn get_config(&self) -> Config {
        self.cfg
    }

    /// Last lifecycle step completed
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn verbose(&self, level: Verbosity) -> bool {
        self.cfg.verbosity >= level
    }
}

impl<BUS, SDN, TXD, GATE, DELAY> Si4063<BUS, SDN, TXD, GATE, DELAY>
where
    BUS: SelectBus,
    SDN: OutputPin,
    TXD: OutputPin,
    GATE: ClearToSend,
    DELAY: DelayNs,
{
    /// Create a driver, reset and boot the chip and check its identity
    pub fn try_new(
        bus: BUS,
        sdn: SDN,
        tx_data: TXD,
        gate: GATE,
        delay: DELAY,
        cfg: Config,
    ) -> Result<Self, Error<BUS::Error>> {
        if cfg.synthesizer().is_none() {
            return Err(Error::ConfigError);
        }
        let mut radio = Self::new(bus, sdn, tx_data, gate, delay, cfg);
        radio.init_pins()?;
        radio.reset()?;
        radio.power_up()?;
        radio.verify_part()?;
        Ok(radio)
    }

    /// Drive the bus and control lines to their idle levels
    pub fn init_pins(&mut self) -> Result<(), Error<BUS::Error>> {
        self.bus.init().map_err(Error::TransferError)?;
        self.bus.deselect().map_err(Error::TransferError)?;
        self.sdn.set_high().map_err(|_| Error::PinError)?;
        self.tx_data.set_low().map_err(|_| Error::PinError)
    }

    /// Enter shutdown state
    pub fn shutdown(&mut self) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("shutdown()");
        }
        self.sdn.set_high().map_err(|_| Error::PinError)?;
        self.delay.delay_ms(1);
        self.lifecycle = Lifecycle::Unpowered;
        Ok(())
    }

    /// Leave shutdown state and wait for the chip to come up
    pub fn wakeup(&mut self) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("wakeup()");
        }
        self.sdn.set_low().map_err(|_| Error::PinError)?;
        self.delay.delay_ms(20);
        self.settle()?;
        self.lifecycle = Lifecycle::Awake;
        Ok(())
    }

    /// Reset radio
    pub fn reset(&mut self) -> Result<(), Error<BUS::Error>> {
        self.shutdown()?;
        self.wakeup()
    }

    /// Boot the chip from its crystal oscillator
    pub fn power_up(&mut self) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("power_up({})", self.cfg.xtal_freq);
        }
        let xtal = self.cfg.xtal_freq.to_be_bytes();
        self.write(
            &[
                Command::PowerUp as u8,
                BOOT_EZRADIO_PRO,
                CLOCK_XTAL,
                xtal[0],
                xtal[1],
                xtal[2],
                xtal[3],
            ],
            true,
        )?;
        self.delay.delay_ms(10);
        self.settle()?;
        self.lifecycle = Lifecycle::Booted;
        Ok(())
    }

    /// No operation, returns the byte clocked out after the command
    pub fn nop(&mut self) -> Result<u8, Error<BUS::Error>> {
        let cts = self.wait_cts()?;
        let mut reply = [0];
        self.frame(cts, true, |bus| {
            bus.write(&[Command::Nop as u8])?;
            bus.read(&mut reply)
        })?;
        if self.verbose(Verbosity::Commands) {
            debug!("nop() -> {:02x}", reply[0]);
        }
        Ok(reply[0])
    }

    /// Query the part number, retrying until the reply is ready
    pub fn part_info(&mut self) -> Result<PartInfoReply, Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("part_info()");
        }
        self.write(&[Command::PartInfo as u8], true)?;
        self.delay.delay_ms(10);

        let mut reply = [0; 9];
        for attempt in 1..=PART_INFO_ATTEMPTS {
            self.read(&mut reply, true)?;
            if reply[0] == CTS_READY {
                let mut raw = [0; 8];
                raw.copy_from_slice(&reply[1..]);
                let info = PartInfo::new(&raw);
                if self.verbose(Verbosity::Commands) {
                    debug!("part {:04x} after {} reads", info.part, attempt);
                }
                return Ok(PartInfoReply {
                    attempts: attempt,
                    info: Some(info),
                });
            }
            if attempt < PART_INFO_ATTEMPTS {
                self.delay.delay_ms(100);
            }
        }
        Ok(PartInfoReply {
            attempts: PART_INFO_ATTEMPTS,
            info: None,
        })
    }

    /// Check that the chip is one of the accepted parts
    pub fn verify_part(&mut self) -> Result<PartInfo, Error<BUS::Error>> {
        let info = self.part_info()?.info.ok_or(Error::ChipNotDetected)?;
        if !self.cfg.accepted_parts.contains(&info.part) {
            warn!("unexpected part {:04x}", info.part);
            return Err(Error::UnknownChip(info.part));
        }
        self.lifecycle = Lifecycle::Verified;
        Ok(info)
    }

    /// Read battery voltage and die temperature
    pub fn get_adc_reading(&mut self) -> Result<Option<AdcReading>, Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("get_adc_reading()");
        }
        self.write(
            &[Command::GetAdcReading as u8, ADC_TEMPERATURE_BATTERY, 0x00],
            true,
        )?;
        self.delay.delay_ms(20);

        let mut reply = [0; 7];
        self.read(&mut reply, true)?;
        if reply[0] != CTS_READY {
            return Ok(None);
        }
        Ok(Some(AdcReading {
            battery_raw: u16::from_be_bytes([reply[3], reply[4]]),
            temperature_raw: u16::from_be_bytes([reply[5], reply[6]]),
        }))
    }

    /// Query the current state and channel
    pub fn request_device_state(&mut self) -> Result<Option<DeviceStatus>, Error<BUS::Error>> {
        self.write(&[Command::RequestDeviceState as u8], true)?;
        self.delay.delay_ms(10);

        let mut reply = [0; 3];
        self.read(&mut reply, true)?;
        if self.verbose(Verbosity::Commands) {
            debug!("request_device_state() -> {:?}", reply);
        }
        if reply[0] != CTS_READY {
            return Ok(None);
        }
        Ok(Some(DeviceStatus {
            state: DeviceState::try_from(reply[1] & 0x0f).ok(),
            channel: reply[2],
        }))
    }

    /// Move the chip state machine to `state`
    pub fn change_state(&mut self, state: DeviceState) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("change_state({:?})", state);
        }
        self.write(&[Command::ChangeState as u8, state as u8], true)
    }

    /// Set chip operating mode: fast sequencer, split FIFO, generic protocol, high performance
    pub fn set_global_config(&mut self) -> Result<(), Error<BUS::Error>> {
        let global = GlobalConfig::Reserved | GlobalConfig::SequencerFast;
        self.write_property(Property::GlobalConfig, &[global.bits()])
    }

    /// Set crystal oscillator tuning capacitance
    pub fn set_global_xo_tune(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::GlobalXoTune, &[self.cfg.xo_tune & 0x7f])
    }

    /// Disable chip and packet handler interrupts
    pub fn set_int_ctl_enable(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::IntCtlEnable, &[0x00])
    }

    /// Disable TX preamble
    pub fn set_preamble_tx_length(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::PreambleTxLength, &[0x00])
    }

    /// Disable sync word on transmit
    pub fn set_sync_config(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::SyncConfig, &[SYNC_NO_TRANSMIT])
    }

    /// Select asynchronous direct mode from GPIO0 with the given modulation code
    pub fn set_modem_mod_type_direct(&mut self, code: u8) -> Result<(), Error<BUS::Error>> {
        let mod_type = ModulationType::try_from(code).map_err(Error::InvalidModulation)?;
        let value = TX_DIRECT_MODE_ASYNC | TX_DIRECT_MODE_GPIO0 | MOD_SOURCE_DIRECT | mod_type as u8;
        self.write_property(Property::ModemModType, &[value])
    }

    /// Set data rate, unused by the modem in asynchronous direct mode
    pub fn set_modem_data_rate(&mut self, data_rate: u32) -> Result<(), Error<BUS::Error>> {
        let raw = data_rate.to_be_bytes();
        self.write_property(Property::ModemDataRate, &raw[1..])
    }

    /// Set NCO modulo for 10x TX oversampling
    pub fn set_modem_tx_nco_mode(&mut self) -> Result<(), Error<BUS::Error>> {
        let mut raw = (self.cfg.xtal_freq / 10).to_be_bytes();
        raw[0] = (TXOSR_10X << 2) | (raw[0] & 0x03);
        self.write_property(Property::ModemTxNcoMode, &raw)
    }

    /// Set FSK deviation in Hz
    pub fn set_modem_freq_dev(&mut self, deviation: u32) -> Result<(), Error<BUS::Error>> {
        let dev = self.synthesizer()?.deviation(deviation);
        if self.verbose(Verbosity::Commands) {
            debug!("set_modem_freq_dev({}) -> {}", deviation, dev.raw());
        }
        self.write_property(Property::ModemFreqDev, &dev.as_bytes())
    }

    /// Set carrier offset in Hz
    pub fn set_modem_freq_offset(&mut self, offset: i32) -> Result<(), Error<BUS::Error>> {
        let raw = self.synthesizer()?.offset(offset);
        if self.verbose(Verbosity::Commands) {
            debug!("set_modem_freq_offset({}) -> {}", offset, raw.raw());
        }
        self.write_property(Property::ModemFreqOffset, &raw.as_bytes())
    }

    /// Select high performance synthesizer and the 2 m band divider
    pub fn set_modem_clkgen_band(&mut self) -> Result<(), Error<BUS::Error>> {
        let value = SY_SEL_SKIP_RECAL | SY_SEL_DIV_BY_2 | BAND_FVCO_DIV_24;
        self.write_property(Property::ModemClkgenBand, &[value])
    }

    /// Set PA bias current with a differential 50% clock
    pub fn set_pa_bias_clkduty(&mut self, bias: u8) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::PaBiasClkduty, &[CLKDUTY_DIFF_50 | (bias & 0x3f)])
    }

    /// Enable TX ramp and select the high power coarse PA
    pub fn set_pa_mode(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::PaMode, &[PA_EXT_RAMP_ENABLE | PA_SEL_HP_COARSE])
    }

    /// Set PA output level, 0x00 (min) to 0x7f (max)
    pub fn set_pa_pwr_lvl(&mut self, level: u8) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::PaPwrLvl, &[level & 0x7f])
    }

    /// Set charge pump currents and VCO gain
    pub fn set_synth_tuning(&mut self, tuning: SynthTuning) -> Result<(), Error<BUS::Error>> {
        self.write_property(Property::SynthPfdcpCpff, &[tuning.cp_ff])?;
        self.write_property(Property::SynthPfdcpCpint, &[tuning.cp_int])?;
        self.write_property(Property::SynthVcoKv, &[tuning.vco_kv()])
    }

    /// Set RF frequency
    pub fn set_radio_frequency(&mut self, freq: u32) -> Result<(), Error<BUS::Error>> {
        if !BAND_2M.contains(&freq) {
            return Err(Error::FrequencyOutOfRange(freq));
        }
        let synth = self.synthesizer()?;
        let ctl = synth
            .frequency(freq)
            .ok_or(Error::FrequencyOutOfRange(freq))?;
        if self.verbose(Verbosity::Commands) {
            debug!(
                "set_radio_frequency({}) -> int {}, frac {}, out {}",
                freq,
                ctl.integer(),
                ctl.fractional(),
                synth.output_hz(ctl)
            );
        }
        self.write_property(Property::FreqControlInte, &ctl.integer_bytes())?;
        self.write_property(Property::FreqControlFrac, &ctl.fractional_bytes())
    }

    /// Write the direct mode configuration. Must follow `power_up`.
    pub fn setup(&mut self, modulation: Modulation) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("setup({:?})", modulation);
        }
        self.synthesizer()?;
        self.set_global_config()?;
        self.set_global_xo_tune()?;
        self.set_int_ctl_enable()?;
        self.set_preamble_tx_length()?;
        self.set_sync_config()?;
        self.set_modem_tx_nco_mode()?;
        self.set_modem_data_rate(self.cfg.data_rate)?;
        self.set_modem_mod_type_direct(modulation.mod_type() as u8)?;
        if let Modulation::Fsk { deviation } = modulation {
            self.set_modem_freq_dev(deviation)?;
        }
        self.set_modem_clkgen_band()?;
        self.set_pa_bias_clkduty(self.cfg.pa_bias)?;
        self.set_pa_mode()?;
        if let Some(tuning) = self.cfg.synth {
            self.set_synth_tuning(tuning)?;
        }
        self.lifecycle = Lifecycle::Configured;
        Ok(())
    }

    /// Apply a complete radio configuration
    pub fn configure(&mut self, radio: &RadioConfig) -> Result<(), Error<BUS::Error>> {
        if !BAND_2M.contains(&radio.frequency) {
            return Err(Error::FrequencyOutOfRange(radio.frequency));
        }
        self.synthesizer()?;
        self.setup(radio.modulation)?;
        self.set_radio_frequency(radio.frequency)?;
        self.set_modem_freq_offset(radio.offset)?;
        self.set_pa_pwr_lvl(radio.power)
    }

    /// Start an unbounded direct mode transmission, returning to READY when done
    pub fn start_tx(&mut self) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Commands) {
            debug!("start_tx()");
        }
        let condition = (DeviceState::Ready as u8) << 4;
        self.write(
            &[Command::StartTx as u8, 0x00, condition, 0x00, 0x00, 0x00, 0x00],
            true,
        )?;
        self.lifecycle = Lifecycle::Transmitting;
        Ok(())
    }

    /// Stop transmitting and return to READY
    pub fn stop_tx(&mut self) -> Result<(), Error<BUS::Error>> {
        self.change_state(DeviceState::Ready)?;
        self.lifecycle = Lifecycle::Configured;
        Ok(())
    }

    /// Enter TX through CHANGE_STATE
    pub fn enable_tx(&mut self) -> Result<(), Error<BUS::Error>> {
        self.change_state(DeviceState::Tx)?;
        self.lifecycle = Lifecycle::Transmitting;
        Ok(())
    }

    /// Drive the direct mode data pin. No CTS handshake.
    pub fn set_output_bit(&mut self, bit: bool) -> Result<(), Error<BUS::Error>> {
        self.tx_data
            .set_state(PinState::from(bit))
            .map_err(|_| Error::PinError)
    }

    /// Set a single-byte property
    pub fn set_property(&mut self, group: u8, index: u8, value: u8) -> Result<(), Error<BUS::Error>> {
        self.write(&[Command::SetProperty as u8, group, 1, index, value], true)
    }

    /// Set consecutive properties starting at `index`
    pub fn set_properties(
        &mut self,
        group: u8,
        index: u8,
        values: &[u8],
    ) -> Result<(), Error<BUS::Error>> {
        if values.is_empty() || values.len() > MAX_PROPERTIES {
            return Err(Error::ConfigError);
        }
        let len = 4 + values.len();
        let mut frame = [0; 4 + MAX_PROPERTIES];
        frame[..4].copy_from_slice(&[Command::SetProperty as u8, group, values.len() as u8, index]);
        frame[4..len].copy_from_slice(values);
        self.write(&frame[..len], true)
    }

    /// Read consecutive properties starting at `index` into `values`
    pub fn get_property(
        &mut self,
        group: u8,
        index: u8,
        values: &mut [u8],
    ) -> Result<(), Error<BUS::Error>> {
        if values.is_empty() || values.len() > MAX_PROPERTIES {
            return Err(Error::ConfigError);
        }
        self.write(
            &[Command::GetProperty as u8, group, values.len() as u8, index],
            true,
        )?;
        self.delay.delay_ms(10);

        let mut scratch = [0; 1 + MAX_PROPERTIES];
        let reply = &mut scratch[..1 + values.len()];
        self.read(reply, true)?;
        values.copy_from_slice(&reply[1..]);
        Ok(())
    }

    /// Rewrite a whole property
    pub fn write_property(&mut self, prop: Property, values: &[u8]) -> Result<(), Error<BUS::Error>> {
        let addr = prop.address();
        if values.len() != addr.count as usize {
            return Err(Error::ConfigError);
        }
        if self.verbose(Verbosity::Commands) {
            debug!("write_property({:?}, {:?})", prop, values);
        }
        match values {
            [value] => self.set_property(addr.group, addr.index, *value),
            _ => self.set_properties(addr.group, addr.index, values),
        }
    }

    /// Read back a whole property
    pub fn read_property(&mut self, prop: Property, values: &mut [u8]) -> Result<(), Error<BUS::Error>> {
        let addr = prop.address();
        if values.len() != addr.count as usize {
            return Err(Error::ConfigError);
        }
        self.get_property(addr.group, addr.index, values)
    }

    /// Wait for CTS then write `bytes` as one frame
    pub fn write(&mut self, bytes: &[u8], deselect: bool) -> Result<(), Error<BUS::Error>> {
        if self.verbose(Verbosity::Bus) {
            trace!("write({:?})", bytes);
        }
        let cts = self.wait_cts()?;
        self.frame(cts, deselect, |bus| bus.write(bytes))
    }

    /// Wait for CTS then read the command buffer; `reply[0]` is the CTS byte
    pub fn read(&mut self, reply: &mut [u8], deselect: bool) -> Result<(), Error<BUS::Error>> {
        let cts = self.wait_cts()?;
        self.frame(cts, deselect, |bus| {
            if cts == Cts::ClearSelected && !reply.is_empty() {
                // CTS byte already consumed by the gate
                reply[0] = CTS_READY;
                bus.read(&mut reply[1..])
            } else {
                bus.write(&[Command::ReadCmdBuff as u8])?;
                bus.read(reply)
            }
        })?;
        if self.verbose(Verbosity::Bus) {
            trace!("read() -> {:?}", reply);
        }
        Ok(())
    }

    /// Poll the CTS gate once through its bounded retries
    pub fn wait_cts(&mut self) -> Result<Cts, Error<BUS::Error>> {
        let cts = self
            .gate
            .wait_cts(&mut self.bus, &mut self.delay, &self.cfg)?;
        if cts == Cts::Timeout {
            warn!("CTS timeout");
        }
        Ok(cts)
    }

    fn synthesizer(&self) -> Result<Synthesizer, Error<BUS::Error>> {
        self.cfg.synthesizer().ok_or(Error::ConfigError)
    }

    fn settle(&mut self) -> Result<Cts, Error<BUS::Error>> {
        let cts = self.wait_cts()?;
        if cts == Cts::ClearSelected {
            self.bus.deselect().map_err(Error::TransferError)?;
        }
        Ok(cts)
    }

    fn frame<F>(&mut self, cts: Cts, deselect: bool, exchange: F) -> Result<(), Error<BUS::Error>>
    where
        F: FnOnce(&mut BUS) -> Result<(), BUS::Error>,
    {
        let result = Self::exchange(&mut self.bus, cts, deselect, exchange);
        if result.is_err() {
            self.bus.deselect().ok();
        }
        result.map_err(Error::TransferError)
    }

    fn exchange<F>(bus: &mut BUS, cts: Cts, deselect: bool, words: F) -> Result<(), BUS::Error>
    where
        F: FnOnce(&mut BUS) -> Result<(), BUS::Error>,
    {
        if cts != Cts::ClearSelected {
            bus.select()?;
        }
        words(bus)?;
        if deselect {
            bus.deselect()?;
        }
        Ok(())
    }
}

impl<BUS, SDN, TXD, GATE, DELAY> Si4063<BUS, SDN, TXD, GATE, DELAY>
where
    BUS: SelectBus,
    TXD: StatefulOutputPin,
{
    /// Invert the direct mode data pin
    pub fn toggle_output_bit(&mut self) -> Result<(), Error<BUS::Error>> {
        self.tx_data.toggle().map_err(|_| Error::PinError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as MockState, Transaction as PinTransaction,
    };

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type MockBus = SoftSpi<PinMock, PinMock, PinMock, PinMock>;
    type MockRadio = Si4063<MockBus, PinMock, PinMock, CtsPin<PinMock>, NoDelay>;

    fn radio(tx_data: &[PinTransaction]) -> MockRadio {
        let bus = SoftSpi::new(
            PinMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&[]),
        );
        Si4063::new(
            bus,
            PinMock::new(&[]),
            PinMock::new(tx_data),
            CtsPin::new(PinMock::new(&[])),
            NoDelay,
            Config::default(),
        )
    }

    fn done(radio: MockRadio) {
        let (bus, mut sdn, mut tx_data, gate, _) = radio.release();
        let (mut nsel, mut sclk, mut sdi, mut sdo) = bus.release();
        for pin in [&mut nsel, &mut sclk, &mut sdi, &mut sdo, &mut sdn, &mut tx_data] {
            pin.done();
        }
        gate.release().done();
    }

    #[test]
    fn invalid_modulation_has_no_side_effects() {
        let mut radio = radio(&[]);
        assert_eq!(
            radio.set_modem_mod_type_direct(5),
            Err(Error::InvalidModulation(5))
        );
        done(radio);
    }

    #[test]
    fn out_of_band_frequency_has_no_side_effects() {
        let mut radio = radio(&[]);
        assert_eq!(
            radio.set_radio_frequency(433_920_000),
            Err(Error::FrequencyOutOfRange(433_920_000))
        );
        let cfg = RadioConfig {
            frequency: 143_999_999,
            ..Default::default()
        };
        assert_eq!(
            radio.configure(&cfg),
            Err(Error::FrequencyOutOfRange(143_999_999))
        );
        done(radio);
    }

    #[test]
    fn oversized_property_write_is_rejected() {
        let mut radio = radio(&[]);
        assert_eq!(
            radio.set_properties(0x20, 0x00, &[0; MAX_PROPERTIES + 1]),
            Err(Error::ConfigError)
        );
        assert_eq!(
            radio.write_property(Property::ModemFreqDev, &[0x00, 0x01]),
            Err(Error::ConfigError)
        );
        done(radio);
    }

    #[test]
    fn output_bit_writes_pin_directly() {
        let mut radio = radio(&[
            PinTransaction::set(MockState::High),
            PinTransaction::set(MockState::Low),
        ]);
        radio.set_output_bit(true).unwrap();
        radio.set_output_bit(false).unwrap();
        done(radio);
    }
}
