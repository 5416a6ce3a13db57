//! spdread-dummy - Emulated DIMM for testing
//!
//! This crate provides a [`Transport`] that behaves like an FTDI adapter in
//! MPSSE mode wired to a DIMM's SMBus. The outgoing command stream is
//! interpreted: `SetBitsLow` edges on SCL/SDA produce start and stop
//! conditions, clocked-out bytes are delivered to the addressed target and
//! acknowledge bits and clocked-in bytes are queued as the adapter's
//! response. It's useful for testing without real hardware.

mod bus;
mod image;
mod targets;

pub use image::{ddr4_rcd_registers, ddr4_rdimm_spd, EEPROM_SIZE};
pub use targets::{I2cTarget, RcdTarget, SpdEepromTarget, RCD_STATUS_OK};

use spdread_core::device::{RCD_BASE_ADDRESS, SPD_BASE_ADDRESS};
use spdread_core::error::Result;
use spdread_core::i2c::Transport;
use spdread_core::mpsse::Opcode;

use bus::Interpreter;

/// Emulated adapter with zero or more devices on its bus
pub struct DummyDimm {
    interpreter: Interpreter,
    unresponsive: bool,
    flushes: usize,
}

impl Default for DummyDimm {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyDimm {
    /// Create an adapter with an empty bus
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            unresponsive: false,
            flushes: 0,
        }
    }

    /// Create an adapter with a DDR4 RDIMM (SPD EEPROM and RCD) on `slot`
    pub fn ddr4_rdimm(slot: u8) -> Self {
        Self::new()
            .with_target(SpdEepromTarget::new(
                SPD_BASE_ADDRESS | slot,
                ddr4_rdimm_spd(),
            ))
            .with_target(RcdTarget::new(
                RCD_BASE_ADDRESS | slot,
                ddr4_rcd_registers(),
            ))
    }

    /// Attach a target to the bus
    pub fn with_target(mut self, target: impl I2cTarget + 'static) -> Self {
        self.interpreter.bus.attach(Box::new(target));
        self
    }

    /// Stop answering reads, as an unplugged adapter would
    pub fn set_unresponsive(&mut self, unresponsive: bool) {
        self.unresponsive = unresponsive;
    }

    /// Last programmed clock divisor
    pub fn divisor(&self) -> Option<u16> {
        self.interpreter.divisor
    }

    /// Number of command flushes received
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Borrow the target at `address`
    pub fn target(&self, address: u8) -> Option<&dyn I2cTarget> {
        self.interpreter.bus.target(address)
    }
}

impl Transport for DummyDimm {
    fn configure(&mut self, clock_divisor: u16) -> Result<()> {
        let [lo, hi] = clock_divisor.to_le_bytes();
        self.interpreter.feed(&[Opcode::SetClockDivisor as u8, lo, hi]);
        log::debug!("dummy: clock divisor 0x{:04X}", clock_divisor);
        Ok(())
    }

    fn flush(&mut self, bytes: &[u8]) -> Result<usize> {
        log::trace!("dummy: {} command bytes", bytes.len());
        self.flushes += 1;
        self.interpreter.feed(bytes);
        Ok(bytes.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.unresponsive {
            self.interpreter.responses.clear();
            return Ok(0);
        }
        let responses = &mut self.interpreter.responses;
        let n = buf.len().min(responses.len());
        for (slot, byte) in buf.iter_mut().zip(responses.drain(..n)) {
            *slot = byte;
        }
        if n < buf.len() {
            log::debug!("dummy: short read, {} of {} bytes", n, buf.len());
        }
        Ok(n)
    }
}
