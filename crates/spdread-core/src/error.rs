//! Error types for spdread-core
//!
//! This module provides a no_std compatible error type shared by the
//! encoder, the transaction coordinator and the decoder.

use core::fmt;

/// Details about a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The adapter rejected or failed an outgoing transfer
    WriteFailed,
    /// Fewer bytes were accepted by the adapter than were submitted
    ShortWrite {
        /// Bytes submitted
        expected: usize,
        /// Bytes accepted
        written: usize,
    },
    /// The incoming transfer failed
    ReadFailed,
    /// The adapter returned fewer bytes than the command stream clocks in
    NoResponse {
        /// Bytes expected
        expected: usize,
        /// Bytes received
        received: usize,
    },
    /// The adapter could not be configured
    ConfigFailed,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The link to the adapter failed to deliver or receive bytes
    Transport(TransportError),
    /// A target did not acknowledge a byte
    Nack {
        /// 7-bit address of the addressed target
        address: u8,
        /// Byte that was not acknowledged
        byte: u8,
    },
    /// The SPD time-base byte declares units other than 125 ps / 1 ps
    UnsupportedTimeBase(u8),
    /// The clock divisor would need a read sequence larger than the command buffer
    InvalidClockDivisor(u16),
    /// Not a 7-bit I2C address
    InvalidDeviceAddress(u8),
    /// DIMM slot outside 0-7
    InvalidSlot(u8),
}

impl Error {
    /// Whether the error came from the link rather than from the bus
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write to adapter failed"),
            Self::ShortWrite { expected, written } => {
                write!(f, "short write: {} of {} bytes accepted", written, expected)
            }
            Self::ReadFailed => write!(f, "read from adapter failed"),
            Self::NoResponse { expected, received } => {
                write!(
                    f,
                    "no response: expected {} bytes, received {}",
                    expected, received
                )
            }
            Self::ConfigFailed => write!(f, "adapter configuration failed"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Nack { address, byte } => write!(
                f,
                "device 0x{:02X} did not acknowledge byte 0x{:02X}",
                address, byte
            ),
            Self::UnsupportedTimeBase(b) => {
                write!(f, "unsupported SPD time base (byte 0x11 = 0x{:02X})", b)
            }
            Self::InvalidClockDivisor(d) => write!(
                f,
                "clock divisor 0x{:04X} is too slow for the command buffer",
                d
            ),
            Self::InvalidDeviceAddress(a) => write!(f, "invalid 7-bit I2C address 0x{:02X}", a),
            Self::InvalidSlot(s) => write!(f, "invalid DIMM slot {} (must be 0-7)", s),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
