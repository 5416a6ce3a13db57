//! FTDI MPSSE command encoding
//!
//! The MPSSE engine is driven by a byte stream of opcodes and operands. This
//! module holds the opcode set, the clock configuration and the encoder that
//! turns I2C bus primitives into pin-toggle command sequences.

mod clock;
mod encoder;
mod opcodes;

pub use clock::*;
pub use encoder::*;
pub use opcodes::*;
