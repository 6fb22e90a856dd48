//! Software SPI bus driven over four GPIO lines.
//!
//! The Si4063 samples SDI on the rising edge of SCLK and shifts SDO out on
//! the falling edge, MSB first. No delays are inserted between edges; the
//! GPIO layer is slow enough that only the ordering of the edges matters.

use embedded_hal::{
    digital::{InputPin, OutputPin, PinState},
    spi::{self, ErrorKind, ErrorType, SpiBus},
};

/// Software SPI error
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    Pin,
}

impl spi::Error for BusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// SPI bus with an explicitly controlled chip select line
///
/// The radio needs the select line held across the CTS query and the
/// command that follows it, so chip select cannot be hidden behind
/// `SpiDevice` transactions.
pub trait SelectBus: SpiBus<u8> {
    /// Drive the bus lines to their idle levels
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Drive nSEL low
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Drive nSEL high
    fn deselect(&mut self) -> Result<(), Self::Error>;
}

/// Bit-banged SPI master
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftSpi<NSEL, SCLK, SDI, SDO> {
    nsel: NSEL,
    sclk: SCLK,
    sdi: SDI,
    sdo: SDO,
}

impl<NSEL, SCLK, SDI, SDO> SoftSpi<NSEL, SCLK, SDI, SDO> {
    /// Create a new bus without touching the lines
    pub fn new(nsel: NSEL, sclk: SCLK, sdi: SDI, sdo: SDO) -> Self {
        Self {
            nsel,
            sclk,
            sdi,
            sdo,
        }
    }

    /// Releases bus pins
    pub fn release(self) -> (NSEL, SCLK, SDI, SDO) {
        (self.nsel, self.sclk, self.sdi, self.sdo)
    }
}

impl<NSEL, SCLK, SDI, SDO> SoftSpi<NSEL, SCLK, SDI, SDO>
where
    NSEL: OutputPin,
    SCLK: OutputPin,
    SDI: OutputPin,
    SDO: InputPin,
{
    /// Shift a byte out, MSB first
    pub fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        for bit in (0..8).rev() {
            self.clock(PinState::Low)?;
            self.data((value >> bit) & 1 == 1)?;
            self.clock(PinState::High)?;
        }
        self.clock(PinState::Low)?;
        self.data(false)
    }

    /// Shift a byte in while holding the data output high
    pub fn read_byte(&mut self) -> Result<u8, BusError> {
        self.exchange(0xff)
    }

    fn exchange(&mut self, value: u8) -> Result<u8, BusError> {
        let mut received = 0;
        for bit in (0..8).rev() {
            self.clock(PinState::Low)?;
            self.data((value >> bit) & 1 == 1)?;
            let level = self.sdo.is_high().map_err(|_| BusError::Pin)?;
            received = received << 1 | level as u8;
            self.clock(PinState::High)?;
        }
        self.clock(PinState::Low)?;
        Ok(received)
    }

    fn clock(&mut self, state: PinState) -> Result<(), BusError> {
        self.sclk.set_state(state).map_err(|_| BusError::Pin)
    }

    fn data(&mut self, bit: bool) -> Result<(), BusError> {
        self.sdi.set_state(PinState::from(bit)).map_err(|_| BusError::Pin)
    }
}

impl<NSEL, SCLK, SDI, SDO> ErrorType for SoftSpi<NSEL, SCLK, SDI, SDO> {
    type Error = BusError;
}

impl<NSEL, SCLK, SDI, SDO> SpiBus<u8> for SoftSpi<NSEL, SCLK, SDI, SDO>
where
    NSEL: OutputPin,
    SCLK: OutputPin,
    SDI: OutputPin,
    SDO: InputPin,
{
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.read_byte()?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for word in words {
            self.write_byte(*word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for idx in 0..read.len().max(write.len()) {
            let received = self.exchange(write.get(idx).copied().unwrap_or(0xff))?;
            if let Some(word) = read.get_mut(idx) {
                *word = received;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<NSEL, SCLK, SDI, SDO> SelectBus for SoftSpi<NSEL, SCLK, SDI, SDO>
where
    NSEL: OutputPin,
    SCLK: OutputPin,
    SDI: OutputPin,
    SDO: InputPin,
{
    /// Deselected, data low, clock low
    fn init(&mut self) -> Result<(), Self::Error> {
        self.nsel.set_high().map_err(|_| BusError::Pin)?;
        self.sdi.set_low().map_err(|_| BusError::Pin)?;
        self.sclk.set_low().map_err(|_| BusError::Pin)
    }

    fn select(&mut self) -> Result<(), Self::Error> {
        self.nsel.set_low().map_err(|_| BusError::Pin)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.nsel.set_high().map_err(|_| BusError::Pin)
    }
}
