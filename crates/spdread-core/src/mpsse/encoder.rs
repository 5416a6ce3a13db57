//! I2C bus primitives as MPSSE command sequences
//!
//! I2C is emulated by toggling SCL and SDA with `SetBitsLow` and by using
//! the byte/bit shifters for data. Every primitive repeats its transitions
//! several times: each `SetBitsLow` takes one MPSSE clock period, so the
//! repetitions are what keep setup and hold times within I2C limits.

use heapless::Vec;

use super::clock::ClockConfig;
use super::opcodes::*;

/// Capacity of one outgoing command buffer
pub const COMMAND_BUFFER_CAPACITY: usize = 1024;

/// Repetitions of each line state in start and stop conditions
pub const CONDITION_REPEAT: usize = 4;

/// Length of a `SetBitsLow` command
const SET_BITS_LEN: usize = 3;

/// Length of the sequence appended by [`Encoder::ack_release`]
pub const ACK_RELEASE_LEN: usize = SET_BITS_LEN;

/// Length of the sequence appended by [`Encoder::byte_out`]
pub const BYTE_OUT_LEN: usize = 10;

/// Length of a start or stop condition
pub const CONDITION_LEN: usize = (2 * CONDITION_REPEAT + 1) * SET_BITS_LEN;

/// Length of a read sequence for the given loop count
pub const fn read_sequence_len(loop_count: usize) -> usize {
    2 * SET_BITS_LEN + 3 * loop_count * SET_BITS_LEN
}

/// Outgoing MPSSE command bytes for one flush
///
/// The buffer is append-only until it is handed to the transport and
/// cleared. Overflowing it means a transaction was composed incorrectly,
/// so it panics instead of truncating.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    bytes: Vec<u8, COMMAND_BUFFER_CAPACITY>,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append one byte
    pub fn push(&mut self, byte: u8) {
        if self.bytes.push(byte).is_err() {
            panic!(
                "MPSSE command buffer overflow (capacity {} bytes)",
                COMMAND_BUFFER_CAPACITY
            );
        }
    }

    /// Append a byte sequence
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        if self.bytes.extend_from_slice(bytes).is_err() {
            panic!(
                "MPSSE command buffer overflow: {} + {} bytes exceeds capacity {}",
                self.bytes.len(),
                bytes.len(),
                COMMAND_BUFFER_CAPACITY
            );
        }
    }

    fn set_bits_low(&mut self, value: u8, direction: Pins) {
        self.extend_from_slice(&[Opcode::SetBitsLow as u8, value, direction.bits()]);
    }

    /// Queued bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of queued bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop all queued bytes
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Builds bus primitives for one clock and GPIOL configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    /// GPIOL output levels, already shifted into the high nibble
    gpio: u8,
    loop_count: usize,
}

impl Encoder {
    /// Create an encoder
    ///
    /// `gpio` holds the levels of GPIOL0-3 in its low nibble. It is combined
    /// bitwise into every value byte that drives the GPIOL pins.
    pub fn new(clock: &ClockConfig, gpio: u8) -> Self {
        Self {
            gpio: (gpio & 0x0F) << 4,
            loop_count: clock.loop_count(),
        }
    }

    /// Toggles per group in a read sequence
    pub fn loop_count(&self) -> usize {
        self.loop_count
    }

    fn level(&self, lines: Pins) -> u8 {
        lines.bits() | self.gpio
    }

    /// Append a start (or repeated start) condition
    ///
    /// Both lines high, then SDA falls while SCL is high, then SCL falls.
    pub fn start(&self, buf: &mut CommandBuffer) {
        for _ in 0..CONDITION_REPEAT {
            buf.set_bits_low(self.level(Pins::SCL | Pins::SDA_OUT), DIR_BUS_DRIVEN);
        }
        for _ in 0..CONDITION_REPEAT {
            buf.set_bits_low(self.level(Pins::SCL), DIR_BUS_DRIVEN);
        }
        buf.set_bits_low(self.level(Pins::empty()), DIR_BUS_DRIVEN);
    }

    /// Append a stop condition and release the bus lines
    pub fn stop(&self, buf: &mut CommandBuffer) {
        for _ in 0..CONDITION_REPEAT {
            buf.set_bits_low(self.level(Pins::SCL), DIR_BUS_DRIVEN);
        }
        for _ in 0..CONDITION_REPEAT {
            buf.set_bits_low(self.level(Pins::SCL | Pins::SDA_OUT), DIR_BUS_DRIVEN);
        }
        buf.set_bits_low(self.level(Pins::empty()), DIR_BUS_RELEASED);
    }

    /// Append a byte transfer followed by sampling of the acknowledge bit
    ///
    /// The adapter returns one byte whose bit 0 is the sampled SDA level.
    pub fn byte_out(&self, buf: &mut CommandBuffer, byte: u8) {
        buf.extend_from_slice(&[Opcode::ClockBytesOutFalling as u8, 0x00, 0x00, byte]);
        buf.set_bits_low(self.level(Pins::empty()), DIR_SDA_RELEASED);
        buf.extend_from_slice(&[Opcode::ClockBitsInRising as u8, 0x00]);
        buf.push(Opcode::SendImmediate as u8);
    }

    /// Append the bus release that must follow acknowledge sampling
    pub fn ack_release(&self, buf: &mut CommandBuffer) {
        buf.set_bits_low(self.level(Pins::SDA_OUT), DIR_BUS_DRIVEN);
    }

    /// Append a read of `len` bytes
    ///
    /// After the data byte the master drives SDA high across a stretched
    /// ninth clock (not-acknowledge), `loop_count` commands per phase.
    pub fn read(&self, buf: &mut CommandBuffer, len: usize) {
        debug_assert!(len >= 1 && len <= 0x1_0000);
        let count = (len - 1) as u16;

        buf.set_bits_low(0x00, DIR_READ);
        buf.push(Opcode::ClockBytesInFalling as u8);
        buf.extend_from_slice(&count.to_le_bytes());

        for level in [Pins::SDA_OUT, Pins::SDA_OUT | Pins::SCL, Pins::SDA_OUT] {
            for _ in 0..self.loop_count {
                buf.set_bits_low(level.bits(), DIR_READ_ACK);
            }
        }
    }
}
