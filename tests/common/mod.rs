#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    convert::Infallible,
    rc::Rc,
};

use embedded_hal::{
    delay::DelayNs,
    digital::{self, InputPin, OutputPin, StatefulOutputPin},
    spi::{ErrorType, SpiBus},
};
use si4063::*;

/// Chip side of the fake bus
pub struct ChipState {
    pub selected: bool,
    /// Select windows opened so far
    pub windows: usize,
    /// Command frames, with any leading READ_CMD_BUFF stripped
    pub frames: Vec<Vec<u8>>,
    /// Status bytes answered to READ_CMD_BUFF before falling back to 0xff
    pub statuses: VecDeque<u8>,
    pub properties: HashMap<(u8, u8), u8>,
    pub part: u16,
    pub state: u8,
    pub powered: bool,
    pub battery_raw: u16,
    pub temperature_raw: u16,
    mosi: Vec<u8>,
    miso: VecDeque<u8>,
    response: Vec<u8>,
}

/// Byte-level model of the Si4063 command interface
#[derive(Clone)]
pub struct FakeChip(pub Rc<RefCell<ChipState>>);

impl FakeChip {
    pub fn new(part: u16) -> Self {
        Self(Rc::new(RefCell::new(ChipState {
            selected: false,
            windows: 0,
            frames: Vec::new(),
            statuses: VecDeque::new(),
            properties: HashMap::new(),
            part,
            state: DeviceState::Ready as u8,
            powered: false,
            battery_raw: 0,
            temperature_raw: 0,
            mosi: Vec::new(),
            miso: VecDeque::new(),
            response: Vec::new(),
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, ChipState> {
        self.0.borrow_mut()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.0.borrow().frames.clone()
    }

    pub fn property(&self, group: u8, index: u8) -> Option<u8> {
        self.0.borrow().properties.get(&(group, index)).copied()
    }

    pub fn properties(&self, group: u8, index: u8, count: u8) -> Vec<Option<u8>> {
        (0..count)
            .map(|offset| self.property(group, index + offset))
            .collect()
    }
}

impl ChipState {
    fn execute(&mut self, frame: &[u8]) {
        let Some((&cmd, args)) = frame.split_first() else {
            return;
        };
        self.response.clear();
        match cmd {
            0x01 => {
                let part = self.part.to_be_bytes();
                self.response = vec![0x11, part[0], part[1], 0x00, 0x00, 0x0f, 0x00, 0x03];
            }
            0x02 => self.powered = true,
            0x11 => {
                let (group, count, index) = (args[0], args[1], args[2]);
                for (offset, value) in args[3..3 + count as usize].iter().enumerate() {
                    self.properties.insert((group, index + offset as u8), *value);
                }
            }
            0x12 => {
                let (group, count, index) = (args[0], args[1], args[2]);
                self.response = (0..count)
                    .map(|offset| {
                        self.properties
                            .get(&(group, index + offset))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect();
            }
            0x14 => {
                let battery = self.battery_raw.to_be_bytes();
                let temperature = self.temperature_raw.to_be_bytes();
                self.response = vec![
                    0x00,
                    0x00,
                    battery[0],
                    battery[1],
                    temperature[0],
                    temperature[1],
                ];
            }
            0x31 => self.state = DeviceState::Tx as u8,
            0x33 => self.response = vec![self.state, 0x00],
            0x34 => self.state = args[0],
            _ => {}
        }
        self.frames.push(frame.to_vec());
    }
}

impl ErrorType for FakeChip {
    type Error = Infallible;
}

impl SpiBus<u8> for FakeChip {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        assert!(chip.selected, "read while deselected");
        for word in words.iter_mut() {
            *word = chip.miso.pop_front().unwrap_or(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        assert!(chip.selected, "write while deselected");
        for word in words {
            if chip.mosi.is_empty() && *word == 0x44 {
                let status = chip.statuses.pop_front().unwrap_or(0xff);
                chip.miso.push_back(status);
                if status == 0xff {
                    let response = chip.response.clone();
                    chip.miso.extend(response);
                }
            }
            chip.mosi.push(*word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        unimplemented!()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SelectBus for FakeChip {
    fn select(&mut self) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        assert!(!chip.selected, "select while selected");
        chip.selected = true;
        chip.windows += 1;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        if !chip.selected {
            return Ok(());
        }
        chip.selected = false;
        chip.miso.clear();
        let mosi = std::mem::take(&mut chip.mosi);
        let frame = match mosi.split_first() {
            Some((&0x44, rest)) => rest,
            _ => &mosi[..],
        };
        chip.execute(frame);
        Ok(())
    }
}

/// GPIO recording every level driven on it
#[derive(Clone)]
pub struct FakePin {
    pub history: Rc<RefCell<Vec<bool>>>,
    pub input: Rc<Cell<bool>>,
}

impl FakePin {
    pub fn high() -> Self {
        Self {
            history: Rc::new(RefCell::new(Vec::new())),
            input: Rc::new(Cell::new(true)),
        }
    }

    pub fn low() -> Self {
        let pin = Self::high();
        pin.input.set(false);
        pin
    }

    pub fn history(&self) -> Vec<bool> {
        self.history.borrow().clone()
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(true);
        Ok(())
    }
}

impl StatefulOutputPin for FakePin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.history.borrow().last().copied().unwrap_or(false))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.input.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.get())
    }
}

/// Delay accumulating the requested time instead of sleeping
#[derive(Clone, Default)]
pub struct FakeDelay {
    pub total_ns: Rc<Cell<u64>>,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns.set(self.total_ns.get() + ms as u64 * 1_000_000);
    }
}

pub struct Harness<GATE> {
    pub chip: FakeChip,
    pub sdn: FakePin,
    pub tx_data: FakePin,
    pub delay: FakeDelay,
    pub radio: Si4063<FakeChip, FakePin, FakePin, GATE, FakeDelay>,
}

pub fn harness_with<GATE: ClearToSend>(part: u16, gate: GATE) -> Harness<GATE> {
    let chip = FakeChip::new(part);
    let sdn = FakePin::high();
    let tx_data = FakePin::high();
    let delay = FakeDelay::default();
    let radio = Si4063::new(
        chip.clone(),
        sdn.clone(),
        tx_data.clone(),
        gate,
        delay.clone(),
        Config::default(),
    );
    Harness {
        chip,
        sdn,
        tx_data,
        delay,
        radio,
    }
}

/// Driver gated by a CTS pin that is always high
pub fn harness() -> Harness<CtsPin<FakePin>> {
    harness_with(0x4063, CtsPin::new(FakePin::high()))
}

/// Bus whose writes fail, optionally sparing READ_CMD_BUFF queries
#[derive(Clone)]
pub struct FailingBus {
    pub selected: Rc<Cell<bool>>,
    pub spare_cts_query: bool,
}

impl FailingBus {
    pub fn new(spare_cts_query: bool) -> Self {
        Self {
            selected: Rc::new(Cell::new(false)),
            spare_cts_query,
        }
    }

    pub fn selected(&self) -> bool {
        self.selected.get()
    }
}

impl ErrorType for FailingBus {
    type Error = BusError;
}

impl SpiBus<u8> for FailingBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0xff);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        match words {
            [0x44] if self.spare_cts_query => Ok(()),
            _ => Err(BusError::Pin),
        }
    }

    fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.write(words)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SelectBus for FailingBus {
    fn select(&mut self) -> Result<(), Self::Error> {
        self.selected.set(true);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.selected.set(false);
        Ok(())
    }
}

pub fn failing<GATE: ClearToSend>(
    bus: &FailingBus,
    gate: GATE,
) -> Si4063<FailingBus, FakePin, FakePin, GATE, FakeDelay> {
    Si4063::new(
        bus.clone(),
        FakePin::high(),
        FakePin::high(),
        gate,
        FakeDelay::default(),
        Config::default(),
    )
}
