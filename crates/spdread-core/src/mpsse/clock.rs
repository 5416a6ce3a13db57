//! Bus clock configuration

use crate::error::{Error, Result};

use super::encoder::{read_sequence_len, ACK_RELEASE_LEN, COMMAND_BUFFER_CAPACITY};

/// MPSSE master clock in kHz (H-series devices with divide-by-5 disabled)
pub const BASE_CLOCK_KHZ: u32 = 60_000;

/// Default clock divisor: SCL = 60 MHz / ((1 + 0x95) * 2) = 200 kHz
pub const DEFAULT_DIVISOR: u16 = 0x0095;

/// Bus clock at which a read needs `REFERENCE_LOOP_COUNT` toggles per group
const REFERENCE_CLOCK_KHZ: u64 = 200;
const REFERENCE_LOOP_COUNT: u64 = 10;

/// Clock divisor for one session
///
/// The divisor programs the MPSSE TCK generator; the derived SCL frequency
/// also determines how many idle toggles the encoder inserts around each
/// read so that the sampling window stays wide enough at low clock rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    divisor: u16,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_DIVISOR,
        }
    }
}

impl ClockConfig {
    /// Create a clock configuration
    ///
    /// Fails if a single-byte read at this clock would not fit in the
    /// command buffer.
    pub fn new(divisor: u16) -> Result<Self> {
        let config = Self { divisor };
        if ACK_RELEASE_LEN + read_sequence_len(config.loop_count()) > COMMAND_BUFFER_CAPACITY {
            return Err(Error::InvalidClockDivisor(divisor));
        }
        Ok(config)
    }

    /// The raw divisor value programmed with `SetClockDivisor`
    pub fn divisor(&self) -> u16 {
        self.divisor
    }

    /// SCL frequency in kHz
    pub fn clock_khz(&self) -> f64 {
        BASE_CLOCK_KHZ as f64 / (1.0 + self.divisor as f64) / 2.0
    }

    /// Number of toggles per group in a read sequence
    ///
    /// `round(10 * 200 kHz / clock_khz)`, never less than one. Computed in
    /// integers so that slow clocks do not collapse to a zero kHz divisor.
    pub fn loop_count(&self) -> usize {
        let num = REFERENCE_LOOP_COUNT * REFERENCE_CLOCK_KHZ * 2 * (1 + self.divisor as u64);
        let den = BASE_CLOCK_KHZ as u64;
        core::cmp::max(1, (num + den / 2) / den) as usize
    }
}
