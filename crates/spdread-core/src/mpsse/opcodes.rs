//! MPSSE opcodes and pin assignments
//!
//! Values are dictated by the FTDI MPSSE command set (AN_108).

use bitflags::bitflags;

/// MPSSE command opcodes used by the I2C emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Clock bytes out on the falling edge, MSB first
    ClockBytesOutFalling = 0x11,
    /// Clock bits in on the rising edge, MSB first
    ClockBitsInRising = 0x22,
    /// Clock bytes in on the falling edge, MSB first
    ClockBytesInFalling = 0x24,
    /// Set value and direction of the low byte pins (ADBUS)
    SetBitsLow = 0x80,
    /// Set value and direction of the high byte pins (ACBUS)
    SetBitsHigh = 0x82,
    /// Disconnect TDI/DO from TDO/DI loopback
    LoopbackOff = 0x85,
    /// Program the TCK/SK clock divisor
    SetClockDivisor = 0x86,
    /// Flush the adapter's return buffer to the host
    SendImmediate = 0x87,
    /// Run from the 60 MHz master clock
    DisableDivBy5 = 0x8A,
    /// Use the 12 MHz divided clock
    EnableDivBy5 = 0x8B,
    /// Enable three-phase data clocking
    EnableThreePhase = 0x8C,
    /// Disable three-phase data clocking
    DisableThreePhase = 0x8D,
    /// Enable adaptive clocking
    EnableAdaptiveClock = 0x96,
    /// Disable adaptive clocking
    DisableAdaptiveClock = 0x97,
    /// Deliberately invalid opcode used to synchronise with the engine
    BadCommand = 0xAA,
}

/// First byte the engine answers an unknown opcode with, followed by the opcode
pub const BAD_COMMAND_RESPONSE: u8 = 0xFA;

impl Opcode {
    /// Decode an opcode byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x11 => Self::ClockBytesOutFalling,
            0x22 => Self::ClockBitsInRising,
            0x24 => Self::ClockBytesInFalling,
            0x80 => Self::SetBitsLow,
            0x82 => Self::SetBitsHigh,
            0x85 => Self::LoopbackOff,
            0x86 => Self::SetClockDivisor,
            0x87 => Self::SendImmediate,
            0x8A => Self::DisableDivBy5,
            0x8B => Self::EnableDivBy5,
            0x8C => Self::EnableThreePhase,
            0x8D => Self::DisableThreePhase,
            0x96 => Self::EnableAdaptiveClock,
            0x97 => Self::DisableAdaptiveClock,
            0xAA => Self::BadCommand,
            _ => return None,
        })
    }

    /// Number of operand bytes that follow the opcode (excluding data payloads)
    pub fn operand_len(self) -> usize {
        match self {
            Self::ClockBytesOutFalling | Self::ClockBytesInFalling => 2,
            Self::ClockBitsInRising => 1,
            Self::SetBitsLow | Self::SetBitsHigh | Self::SetClockDivisor => 2,
            _ => 0,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

bitflags! {
    /// Low byte (ADBUS) pin mask
    ///
    /// SCL is driven on SK, SDA is driven on DO and sampled on DI. The two
    /// data pins are tied together on the adapter cable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Pins: u8 {
        /// ADBUS0 / SK: I2C clock
        const SCL = 1 << 0;
        /// ADBUS1 / DO: I2C data out
        const SDA_OUT = 1 << 1;
        /// ADBUS2 / DI: I2C data in
        const SDA_IN = 1 << 2;
        /// ADBUS4
        const GPIOL0 = 1 << 4;
        /// ADBUS5
        const GPIOL1 = 1 << 5;
        /// ADBUS6
        const GPIOL2 = 1 << 6;
        /// ADBUS7
        const GPIOL3 = 1 << 7;

        /// All four GPIOL pins
        const GPIOL = Self::GPIOL0.bits() | Self::GPIOL1.bits()
            | Self::GPIOL2.bits() | Self::GPIOL3.bits();
    }
}

/// Both bus lines driven, GPIOL pins outputs
pub const DIR_BUS_DRIVEN: Pins = Pins::GPIOL.union(Pins::SCL).union(Pins::SDA_OUT);

/// SDA released for the acknowledge bit, GPIOL pins outputs
pub const DIR_SDA_RELEASED: Pins = Pins::GPIOL.union(Pins::SCL);

/// Lines released at the end of a stop condition
pub const DIR_BUS_RELEASED: Pins = Pins::GPIOL;

/// Direction used while clocking a byte in
pub const DIR_READ: Pins = Pins::GPIOL0.union(Pins::SCL);

/// Direction used while generating the master acknowledge clock after a read
pub const DIR_READ_ACK: Pins = Pins::GPIOL0.union(Pins::SCL).union(Pins::SDA_OUT);
