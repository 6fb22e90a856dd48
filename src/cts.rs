//! Clear-to-send gating.
//!
//! Every command waits for the chip to report CTS. Two sources are
//! supported: a GPIO configured as CTS output, or the CTS byte returned by
//! READ_CMD_BUFF over SPI. Running out of retries is not an error: the gate
//! reports [`Cts::Timeout`] and the caller carries on.

use embedded_hal::{delay::DelayNs, digital::InputPin, spi::SpiBus};

use crate::bus::SelectBus;
use crate::commands::{Command, CTS_READY};
use crate::{Config, Error};

/// Result of a CTS check
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cts {
    /// Clear to send, bus deselected
    Clear,
    /// Clear to send, bus still selected inside a READ_CMD_BUFF transaction
    ClearSelected,
    /// Retries exhausted
    Timeout,
}

impl Cts {
    pub fn is_clear(&self) -> bool {
        *self != Cts::Timeout
    }

    /// CTS byte as reported by the chip: 0xff when clear, 0x00 on timeout
    pub fn sentinel(&self) -> u8 {
        if self.is_clear() {
            CTS_READY
        } else {
            0x00
        }
    }
}

/// Source of the clear-to-send signal
pub trait ClearToSend {
    fn wait_cts<BUS, DELAY>(
        &mut self,
        bus: &mut BUS,
        delay: &mut DELAY,
        cfg: &Config,
    ) -> Result<Cts, Error<BUS::Error>>
    where
        BUS: SelectBus,
        DELAY: DelayNs;
}

/// CTS read from a GPIO routed to the chip's CTS output
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtsPin<P> {
    pin: P,
}

impl<P> CtsPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> ClearToSend for CtsPin<P> {
    fn wait_cts<BUS, DELAY>(
        &mut self,
        _bus: &mut BUS,
        delay: &mut DELAY,
        cfg: &Config,
    ) -> Result<Cts, Error<BUS::Error>>
    where
        BUS: SelectBus,
        DELAY: DelayNs,
    {
        for _ in 0..cfg.cts_pin_polls {
            if self.pin.is_high().map_err(|_| Error::PinError)? {
                return Ok(Cts::Clear);
            }
            delay.delay_ms(cfg.cts_poll_interval_ms);
        }
        Ok(Cts::Timeout)
    }
}

/// CTS polled in-band with READ_CMD_BUFF
#[derive(Copy, Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtsCommand {
    leave_selected: bool,
}

impl CtsCommand {
    /// Deselect the bus once the chip reports CTS
    pub fn new() -> Self {
        Self {
            leave_selected: false,
        }
    }

    /// Keep the bus selected once the chip reports CTS, so that the
    /// following bytes continue the same transaction
    pub fn leave_selected() -> Self {
        Self {
            leave_selected: true,
        }
    }

    fn poll<BUS: SelectBus>(&self, bus: &mut BUS) -> Result<bool, BUS::Error> {
        let mut status = [0];
        bus.select()?;
        bus.write(&[Command::ReadCmdBuff as u8])?;
        bus.read(&mut status)?;
        let ready = status[0] == CTS_READY;
        if !ready || !self.leave_selected {
            bus.deselect()?;
        }
        Ok(ready)
    }
}

impl ClearToSend for CtsCommand {
    fn wait_cts<BUS, DELAY>(
        &mut self,
        bus: &mut BUS,
        delay: &mut DELAY,
        cfg: &Config,
    ) -> Result<Cts, Error<BUS::Error>>
    where
        BUS: SelectBus,
        DELAY: DelayNs,
    {
        for _ in 0..cfg.cts_spi_polls {
            match self.poll(bus) {
                Ok(true) if self.leave_selected => return Ok(Cts::ClearSelected),
                Ok(true) => return Ok(Cts::Clear),
                Ok(false) => delay.delay_ms(cfg.cts_poll_interval_ms),
                Err(err) => {
                    bus.deselect().ok();
                    return Err(Error::TransferError(err));
                }
            }
        }
        Ok(Cts::Timeout)
    }
}
