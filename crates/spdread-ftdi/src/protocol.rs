//! FTDI chip identification and adapter constants

/// FTDI vendor ID
pub const FTDI_VID: u16 = 0x0403;

/// USB latency timer in milliseconds
pub const LATENCY_TIMER_MS: u8 = 2;

/// Default time to wait for response bytes, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// `SetBitsLow` with every ADBUS line an input
pub const RELEASE_PINS: [u8; 3] = [0x80, 0x00, 0x00];

/// High-speed FTDI chips with an MPSSE engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FtdiDeviceType {
    /// FT2232H
    #[default]
    Ft2232H,
    /// FT4232H
    Ft4232H,
    /// FT232H
    Ft232H,
    /// FT4233H
    Ft4233H,
}

/// Static description of one chip
#[derive(Debug)]
pub struct ChipInfo {
    /// Chip this entry describes
    pub device_type: FtdiDeviceType,
    /// Marketing name
    pub name: &'static str,
    /// USB product ID (vendor is always [`FTDI_VID`])
    pub product_id: u16,
    /// Number of MPSSE-capable channels
    pub channels: u8,
}

/// Every chip the transport can drive
pub const SUPPORTED_DEVICES: &[ChipInfo] = &[
    ChipInfo {
        device_type: FtdiDeviceType::Ft2232H,
        name: "FT2232H",
        product_id: 0x6010,
        channels: 2,
    },
    ChipInfo {
        device_type: FtdiDeviceType::Ft4232H,
        name: "FT4232H",
        product_id: 0x6011,
        channels: 4,
    },
    ChipInfo {
        device_type: FtdiDeviceType::Ft232H,
        name: "FT232H",
        product_id: 0x6014,
        channels: 1,
    },
    ChipInfo {
        device_type: FtdiDeviceType::Ft4233H,
        name: "FT4233H",
        product_id: 0x6041,
        channels: 4,
    },
];

impl FtdiDeviceType {
    fn info(self) -> &'static ChipInfo {
        SUPPORTED_DEVICES
            .iter()
            .find(|chip| chip.device_type == self)
            .unwrap_or(&SUPPORTED_DEVICES[0])
    }

    /// USB product ID
    pub fn product_id(self) -> u16 {
        self.info().product_id
    }

    /// Number of MPSSE channels
    pub fn channel_count(self) -> u8 {
        self.info().channels
    }

    /// Chip name, e.g. "FT2232H"
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Parse "2232h", "FT2232H" and similar
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_uppercase();
        let s = s.strip_prefix("FT").unwrap_or(&s);
        SUPPORTED_DEVICES
            .iter()
            .find(|chip| &chip.name[2..] == s)
            .map(|chip| chip.device_type)
    }

    /// Identify a chip from its USB IDs
    pub fn from_usb_ids(vid: u16, pid: u16) -> Option<Self> {
        if vid != FTDI_VID {
            return None;
        }
        SUPPORTED_DEVICES
            .iter()
            .find(|chip| chip.product_id == pid)
            .map(|chip| chip.device_type)
    }
}

/// MPSSE channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FtdiInterface {
    /// Channel A
    #[default]
    A,
    /// Channel B
    B,
    /// Channel C
    C,
    /// Channel D
    D,
}

impl FtdiInterface {
    const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Parse a single channel letter
    pub fn parse(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [c] => Self::ALL
                .get(c.to_ascii_uppercase().checked_sub(b'A')? as usize)
                .copied(),
            _ => None,
        }
    }

    /// Zero-based channel index
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Channel letter
    pub fn letter(self) -> char {
        (b'A' + self.index()) as char
    }

    pub(crate) fn to_libftdi(self) -> ftdi::Interface {
        match self {
            Self::A => ftdi::Interface::A,
            Self::B => ftdi::Interface::B,
            Self::C => ftdi::Interface::C,
            Self::D => ftdi::Interface::D,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_type() {
        assert_eq!(FtdiDeviceType::parse("FT4232H"), Some(FtdiDeviceType::Ft4232H));
        assert_eq!(FtdiDeviceType::parse("232h"), Some(FtdiDeviceType::Ft232H));
        assert_eq!(FtdiDeviceType::parse("ft4233h"), Some(FtdiDeviceType::Ft4233H));
        assert_eq!(FtdiDeviceType::parse("jtagkey"), None);
    }

    #[test]
    fn test_chip_table() {
        assert_eq!(FtdiDeviceType::Ft2232H.product_id(), 0x6010);
        assert_eq!(FtdiDeviceType::Ft232H.channel_count(), 1);
        assert_eq!(FtdiDeviceType::Ft4233H.name(), "FT4233H");
    }

    #[test]
    fn test_parse_interface() {
        assert_eq!(FtdiInterface::parse("b"), Some(FtdiInterface::B));
        assert_eq!(FtdiInterface::parse("E"), None);
        assert_eq!(FtdiInterface::parse("AB"), None);
        assert_eq!(FtdiInterface::parse(""), None);
        assert_eq!(FtdiInterface::parse("0"), None);
        assert_eq!(FtdiInterface::D.letter(), 'D');
    }

    #[test]
    fn test_usb_id_lookup() {
        assert_eq!(
            FtdiDeviceType::from_usb_ids(0x0403, 0x6014),
            Some(FtdiDeviceType::Ft232H)
        );
        assert_eq!(FtdiDeviceType::from_usb_ids(0x0403, 0x6001), None);
        assert_eq!(FtdiDeviceType::from_usb_ids(0x1234, 0x6010), None);
    }
}
