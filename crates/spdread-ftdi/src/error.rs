//! Error types for the FTDI transport

use spdread_core::TransportError;
use thiserror::Error;

/// Errors that can occur while opening or driving an FTDI adapter
#[derive(Debug, Error)]
pub enum FtdiError {
    /// Failed to open device
    #[error("Failed to open FTDI {device} channel {channel}: {source}")]
    OpenFailed {
        device: &'static str,
        channel: char,
        #[source]
        source: ftdi::Error,
    },

    /// Failed to configure device
    #[error("Failed to configure device ({step}): {source}")]
    ConfigFailed {
        step: &'static str,
        #[source]
        source: ftdi::Error,
    },

    /// USB write failed
    #[error("USB write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// USB read failed
    #[error("USB read failed: {0}")]
    ReadFailed(#[source] std::io::Error),

    /// The MPSSE engine did not echo the bad-command marker
    #[error("MPSSE synchronisation failed: expected FA AA, got {0:02X?}")]
    SyncFailed(Vec<u8>),

    /// Invalid device type
    #[error("Invalid device type '{0}'. Valid types: 2232h, 4232h, 232h, 4233h")]
    InvalidDeviceType(String),

    /// Invalid channel/port specification
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// USB enumeration error
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),
}

impl From<&FtdiError> for TransportError {
    fn from(e: &FtdiError) -> Self {
        match e {
            FtdiError::WriteFailed(_) => TransportError::WriteFailed,
            FtdiError::ReadFailed(_) => TransportError::ReadFailed,
            _ => TransportError::ConfigFailed,
        }
    }
}

/// Result type for FTDI operations
pub type Result<T> = std::result::Result<T, FtdiError>;
