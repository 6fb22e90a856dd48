/// Si4063 API commands
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Nop = 0x00,
    PartInfo = 0x01,
    PowerUp = 0x02,
    SetProperty = 0x11,
    GetProperty = 0x12,
    GetAdcReading = 0x14,
    StartTx = 0x31,
    RequestDeviceState = 0x33,
    ChangeState = 0x34,
    ReadCmdBuff = 0x44,
}

/// Status byte returned by READ_CMD_BUFF once the chip is clear to send
pub const CTS_READY: u8 = 0xff;

/// POWER_UP boot function: EZRadioPRO
pub const BOOT_EZRADIO_PRO: u8 = 0x01;

/// POWER_UP clock source: crystal oscillator
pub const CLOCK_XTAL: u8 = 0x00;

/// GET_ADC_READING enables: temperature and battery voltage, no GPIO pin
pub const ADC_TEMPERATURE_BATTERY: u8 = (1 << 4) | (1 << 3);
