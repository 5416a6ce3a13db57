//! spdread-core - Core library for reading DIMM management devices
//!
//! This crate turns logical I2C operations into FTDI MPSSE command streams
//! and decodes the byte tables read back from the SPD EEPROM and the
//! registering clock driver (RCD) of a DDR4 module. It is `no_std`
//! compatible; the transport to the adapter is supplied by the caller
//! through the [`Transport`](i2c::Transport) trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable `Transport` for boxed transports
//!
//! # Example
//!
//! ```ignore
//! use spdread_core::device::{self, DeviceKind};
//! use spdread_core::i2c::Session;
//! use spdread_core::mpsse::ClockConfig;
//! use spdread_core::spd;
//!
//! fn dump<T: spdread_core::i2c::Transport>(transport: T) -> spdread_core::Result<()> {
//!     let mut session = Session::new(transport, ClockConfig::default())?;
//!     let table = device::scan(&mut session, DeviceKind::SpdEeprom)?;
//!     let decoded = spd::decode(&table)?;
//!     for (name, value) in decoded.fields() {
//!         println!("{}: {}", name, value);
//!     }
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod device;
pub mod error;
pub mod i2c;
pub mod mpsse;
pub mod spd;

pub use error::{Error, Result, TransportError};
