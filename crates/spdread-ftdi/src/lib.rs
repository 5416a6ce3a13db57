//! spdread-ftdi - FTDI MPSSE adapter transport
//!
//! Opens an FTDI high-speed device through libftdi1, switches the selected
//! channel to MPSSE mode and exposes it as a
//! [`Transport`](spdread_core::i2c::Transport) for the I2C session in
//! `spdread-core`.
//!
//! # Supported Devices
//!
//! - FTDI FT2232H (dual channel, 60 MHz)
//! - FTDI FT4232H (quad channel, 60 MHz)
//! - FTDI FT232H (single channel, 60 MHz)
//! - FTDI FT4233H (quad channel, 60 MHz)
//!
//! # Wiring
//!
//! ADBUS0 (SK) is SCL. ADBUS1 (DO) and ADBUS2 (DI) are tied together and
//! form SDA. GPIOL0-3 are driven to the levels given by the `gpio` option,
//! which is useful for bus multiplexers or SMBus isolators.
//!
//! # Example
//!
//! ```no_run
//! use spdread_core::device::{self, DeviceKind};
//! use spdread_core::i2c::Session;
//! use spdread_core::mpsse::ClockConfig;
//! use spdread_ftdi::{Ftdi, FtdiConfig};
//!
//! let config = FtdiConfig::default();
//! let ftdi = Ftdi::open(&config)?;
//! let clock = ClockConfig::new(config.divisor)?;
//! let mut session = Session::with_gpio(ftdi, clock, config.gpio)?;
//! let table = device::scan(&mut session, DeviceKind::SpdEeprom)?;
//! println!("{:02X?}", table.as_bytes());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Programmer Options
//!
//! - `type=<device>` - Device type (2232h, 4232h, 232h, 4233h; default: 2232h)
//! - `port=<A|B|C|D>` - Channel to use (default: A)
//! - `divisor=<N>` - MPSSE clock divisor, decimal or `0x` hex (default: 0x95)
//! - `gpio=<0-15>` - Levels of GPIOL0-3 (default: 0)
//! - `timeout=<ms>` - Read timeout (default: 100)
//!
//! # I2C Clock Speed
//!
//! ```text
//! SCL = 60 MHz / ((1 + divisor) * 2)
//! ```
//!
//! | Divisor | SCL       |
//! |---------|-----------|
//! | 0x4A    | 400 kHz   |
//! | 0x95    | 200 kHz   |
//! | 0x12B   | 100 kHz   |

mod device;
mod error;
mod protocol;

pub use device::{list_devices, parse_options, Ftdi, FtdiConfig, FtdiDeviceInfo};
pub use error::{FtdiError, Result};
pub use protocol::{ChipInfo, FtdiDeviceType, FtdiInterface, FTDI_VID, SUPPORTED_DEVICES};
