//! FTDI MPSSE device implementation
//!
//! This module provides the `Ftdi` struct that carries the MPSSE command
//! stream built by `spdread-core` to the adapter and implements the
//! `Transport` trait.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use ftdi::{find_by_vid_pid, BitMode, Device};
use spdread_core::error::{Result as CoreResult, TransportError};
use spdread_core::i2c::Transport;
use spdread_core::mpsse::{
    ClockConfig, Opcode, Pins, BAD_COMMAND_RESPONSE, DEFAULT_DIVISOR, DIR_BUS_DRIVEN,
};

use crate::error::{FtdiError, Result};
use crate::protocol::*;

/// Adapter selection and bus settings
#[derive(Debug, Clone)]
pub struct FtdiConfig {
    /// Chip to look for
    pub device_type: FtdiDeviceType,
    /// MPSSE channel wired to the SMBus
    pub interface: FtdiInterface,
    /// Clock divisor, SCL = 60 MHz / ((1 + divisor) * 2)
    pub divisor: u16,
    /// Levels of GPIOL0-3 (low nibble)
    pub gpio: u8,
    /// How long to wait for response bytes
    pub timeout: Duration,
}

impl Default for FtdiConfig {
    fn default() -> Self {
        Self::for_device(FtdiDeviceType::default())
    }
}

impl FtdiConfig {
    /// Defaults for the given chip: channel A at 200 kHz
    pub fn for_device(device_type: FtdiDeviceType) -> Self {
        FtdiConfig {
            device_type,
            interface: FtdiInterface::default(),
            divisor: DEFAULT_DIVISOR,
            gpio: 0,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Select the channel, checking that the chip has it
    pub fn interface(mut self, interface: FtdiInterface) -> Result<Self> {
        let channels = self.device_type.channel_count();
        if interface.index() >= channels {
            return Err(FtdiError::InvalidChannel(format!(
                "{} has no channel {} (channels A-{})",
                self.device_type.name(),
                interface.letter(),
                (b'A' + channels - 1) as char
            )));
        }
        self.interface = interface;
        Ok(self)
    }

    /// Set the clock divisor, rejecting values too slow for the command buffer
    pub fn divisor(mut self, divisor: u16) -> Result<Self> {
        ClockConfig::new(divisor).map_err(|e| FtdiError::InvalidParameter(e.to_string()))?;
        self.divisor = divisor;
        Ok(self)
    }

    /// Set the GPIOL0-3 levels
    pub fn gpio(mut self, gpio: u8) -> Result<Self> {
        if gpio > 0x0F {
            return Err(FtdiError::InvalidParameter(format!(
                "gpio {} out of range (0-15)",
                gpio
            )));
        }
        self.gpio = gpio;
        Ok(self)
    }

    /// SCL frequency in kHz
    pub fn i2c_clock_khz(&self) -> f64 {
        ClockConfig::new(self.divisor)
            .map(|c| c.clock_khz())
            .unwrap_or(0.0)
    }
}

/// FTDI MPSSE adapter
///
/// The pins are released when the value is dropped.
pub struct Ftdi {
    /// libftdi device context
    device: Device,
    /// GPIOL levels, shifted into the high nibble
    gpio: u8,
    /// Read timeout
    timeout: Duration,
}

impl Ftdi {
    /// Open an FTDI device and put the channel into MPSSE mode
    pub fn open(config: &FtdiConfig) -> Result<Self> {
        log::info!(
            "Opening FTDI {} channel {}",
            config.device_type.name(),
            config.interface.letter()
        );

        let pid = config.device_type.product_id();
        log::debug!("Looking for {:04X}:{:04X}", FTDI_VID, pid);

        let mut device = find_by_vid_pid(FTDI_VID, pid)
            .interface(config.interface.to_libftdi())
            .open()
            .map_err(|source| FtdiError::OpenFailed {
                device: config.device_type.name(),
                channel: config.interface.letter(),
                source,
            })?;

        let step = |step: &'static str| {
            move |source: ftdi::Error| FtdiError::ConfigFailed { step, source }
        };
        device.usb_reset().map_err(step("USB reset"))?;
        device.usb_purge_buffers().map_err(step("purge buffers"))?;
        device
            .set_latency_timer(LATENCY_TIMER_MS)
            .map_err(step("latency timer"))?;
        device
            .set_bitmode(0x00, BitMode::Reset)
            .map_err(step("bitmode reset"))?;
        device
            .set_bitmode(0x00, BitMode::Mpsse)
            .map_err(step("MPSSE mode"))?;

        // MPSSE needs a moment after the mode switch before it parses commands
        std::thread::sleep(Duration::from_millis(50));

        let mut ftdi = Ftdi {
            device,
            gpio: (config.gpio & 0x0F) << 4,
            timeout: config.timeout,
        };
        ftdi.synchronize()?;

        log::info!(
            "FTDI {} ready, I2C clock {:.1} kHz",
            config.device_type.name(),
            config.i2c_clock_khz()
        );
        Ok(ftdi)
    }

    /// Check that the MPSSE engine is parsing commands
    ///
    /// An invalid opcode makes the engine answer with `FA` followed by the
    /// rejected opcode.
    fn synchronize(&mut self) -> Result<()> {
        let bad = Opcode::BadCommand as u8;
        self.send(&[bad])?;

        let mut echo = [0u8; 2];
        let n = self.recv(&mut echo)?;
        if echo[..n] != [BAD_COMMAND_RESPONSE, bad] {
            return Err(FtdiError::SyncFailed(echo[..n].to_vec()));
        }
        log::debug!("MPSSE synchronised");
        Ok(())
    }

    /// Send data to the FTDI device
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.device.write_all(data).map_err(FtdiError::WriteFailed)?;
        log::trace!("Sent {} bytes", data.len());
        Ok(())
    }

    /// Receive up to `buf.len()` bytes, waiting at most the configured timeout
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let deadline = Instant::now() + self.timeout;
        let mut total = 0;

        while total < buf.len() {
            match self.device.read(&mut buf[total..]) {
                Ok(0) => {
                    if Instant::now() >= deadline {
                        log::debug!("Read timeout: {} of {} bytes", total, buf.len());
                        break;
                    }
                    std::thread::sleep(Duration::from_micros(100));
                }
                Ok(n) => total += n,
                Err(e) => return Err(FtdiError::ReadFailed(e)),
            }
        }

        log::trace!("Received {} bytes", total);
        Ok(total)
    }

    /// Release I/O pins (set all as inputs)
    fn release_pins(&mut self) -> Result<()> {
        self.send(&RELEASE_PINS)
    }
}

fn transport_error(e: FtdiError) -> spdread_core::Error {
    log::error!("{}", e);
    TransportError::from(&e).into()
}

impl Transport for Ftdi {
    fn configure(&mut self, clock_divisor: u16) -> CoreResult<()> {
        let [lo, hi] = clock_divisor.to_le_bytes();
        let idle = (Pins::SCL | Pins::SDA_OUT).bits() | self.gpio;
        let buf = [
            Opcode::DisableDivBy5 as u8,
            Opcode::DisableAdaptiveClock as u8,
            Opcode::DisableThreePhase as u8,
            Opcode::SetBitsLow as u8,
            idle,
            DIR_BUS_DRIVEN.bits(),
            Opcode::SetClockDivisor as u8,
            lo,
            hi,
            Opcode::LoopbackOff as u8,
        ];
        log::debug!("Setting clock divisor 0x{:04X}", clock_divisor);
        self.send(&buf).map_err(|e| {
            log::error!("{}", e);
            spdread_core::Error::from(TransportError::ConfigFailed)
        })
    }

    fn flush(&mut self, bytes: &[u8]) -> CoreResult<usize> {
        self.send(bytes).map_err(transport_error)?;
        Ok(bytes.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> CoreResult<usize> {
        self.recv(buf).map_err(transport_error)
    }
}

impl Drop for Ftdi {
    fn drop(&mut self) {
        if let Err(e) = self.release_pins() {
            log::warn!("Failed to release pins on close: {}", e);
        }
    }
}

/// Information about a connected FTDI device
#[derive(Debug, Clone)]
pub struct FtdiDeviceInfo {
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
    /// Chip found at this position
    pub device_type: FtdiDeviceType,
    /// Serial number (if reported)
    pub serial: Option<String>,
}

impl std::fmt::Display for FtdiDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<8} bus {:03} device {:03} ({:04X}:{:04X})",
            self.device_type.name(),
            self.bus,
            self.address,
            FTDI_VID,
            self.device_type.product_id()
        )?;
        if let Some(serial) = &self.serial {
            write!(f, " serial {}", serial)?;
        }
        Ok(())
    }
}

/// List connected FTDI devices
pub fn list_devices() -> Result<Vec<FtdiDeviceInfo>> {
    let mut devices = Vec::new();

    for dev in nusb::list_devices()? {
        let Some(device_type) = FtdiDeviceType::from_usb_ids(dev.vendor_id(), dev.product_id())
        else {
            continue;
        };
        log::debug!(
            "Found {} at {}:{}",
            device_type.name(),
            dev.bus_number(),
            dev.device_address()
        );
        devices.push(FtdiDeviceInfo {
            bus: dev.bus_number(),
            address: dev.device_address(),
            device_type,
            serial: dev.serial_number().map(str::to_string),
        });
    }

    Ok(devices)
}

fn parse_number<T: TryFrom<u64>>(key: &str, value: &str) -> Result<T> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed
        .ok()
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| FtdiError::InvalidParameter(format!("Invalid {} '{}'", key, value)))
}

/// Parse programmer options
///
/// Format: "type=<type>,port=<A|B|C|D>,divisor=<N>,gpio=<0-15>,timeout=<ms>"
pub fn parse_options(options: &[(&str, &str)]) -> Result<FtdiConfig> {
    let mut config = FtdiConfig::default();

    for (key, value) in options {
        match *key {
            "type" => {
                config.device_type = FtdiDeviceType::parse(value)
                    .ok_or_else(|| FtdiError::InvalidDeviceType(value.to_string()))?;
            }
            "port" | "channel" => {
                let interface = FtdiInterface::parse(value).ok_or_else(|| {
                    FtdiError::InvalidChannel(format!(
                        "Invalid channel '{}': must be A, B, C, or D",
                        value
                    ))
                })?;
                config.interface = interface;
            }
            "divisor" => {
                config = config.divisor(parse_number(key, value)?)?;
            }
            "gpio" => {
                config = config.gpio(parse_number(key, value)?)?;
            }
            "timeout" => {
                config.timeout = Duration::from_millis(parse_number(key, value)?);
            }
            _ => {
                log::warn!("Unknown FTDI option: {}={}", key, value);
            }
        }
    }

    // Validate the channel against the final device type
    let interface = config.interface;
    config.interface(interface)
}
