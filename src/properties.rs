/// Maximum number of property bytes a single SET_PROPERTY frame carries
pub const MAX_PROPERTIES: usize = 12;

/// Location of one or more contiguous properties
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyAddress {
    pub group: u8,
    pub index: u8,
    pub count: u8,
}

impl PropertyAddress {
    pub const fn new(group: u8, index: u8, count: u8) -> Self {
        Self {
            group,
            index,
            count,
        }
    }
}

/// Si4063 properties used in direct transmit mode
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Property {
    GlobalXoTune,
    GlobalClkCfg,
    GlobalConfig,
    IntCtlEnable,
    PreambleTxLength,
    SyncConfig,
    ModemModType,
    ModemDataRate,
    ModemTxNcoMode,
    ModemFreqDev,
    ModemFreqOffset,
    ModemClkgenBand,
    PaMode,
    PaPwrLvl,
    PaBiasClkduty,
    SynthPfdcpCpff,
    SynthPfdcpCpint,
    SynthVcoKv,
    FreqControlInte,
    FreqControlFrac,
}

impl Property {
    pub const fn address(self) -> PropertyAddress {
        let (group, index, count) = match self {
            Property::GlobalXoTune => (0x00, 0x00, 1),
            Property::GlobalClkCfg => (0x00, 0x01, 1),
            Property::GlobalConfig => (0x00, 0x03, 1),
            Property::IntCtlEnable => (0x01, 0x00, 1),
            Property::PreambleTxLength => (0x10, 0x00, 1),
            Property::SyncConfig => (0x11, 0x00, 1),
            Property::ModemModType => (0x20, 0x00, 1),
            Property::ModemDataRate => (0x20, 0x03, 3),
            Property::ModemTxNcoMode => (0x20, 0x06, 4),
            Property::ModemFreqDev => (0x20, 0x0a, 3),
            Property::ModemFreqOffset => (0x20, 0x0d, 2),
            Property::ModemClkgenBand => (0x20, 0x51, 1),
            Property::PaMode => (0x22, 0x00, 1),
            Property::PaPwrLvl => (0x22, 0x01, 1),
            Property::PaBiasClkduty => (0x22, 0x02, 1),
            Property::SynthPfdcpCpff => (0x23, 0x00, 1),
            Property::SynthPfdcpCpint => (0x23, 0x01, 1),
            Property::SynthVcoKv => (0x23, 0x02, 1),
            Property::FreqControlInte => (0x40, 0x00, 1),
            Property::FreqControlFrac => (0x40, 0x01, 3),
        };
        PropertyAddress::new(group, index, count)
    }
}

impl From<Property> for PropertyAddress {
    fn from(prop: Property) -> Self {
        prop.address()
    }
}
