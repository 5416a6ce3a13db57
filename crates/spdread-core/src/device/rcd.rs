//! RCD register access over the SMBus block protocol
//!
//! The DDR4 RCD is not register-addressed like an EEPROM. Each I2C write
//! carries a command byte and one data byte; a sequence of them, framed by
//! the BEGIN and END flags, forms a block that first supplies a 4-byte
//! address (function space and register) and then either the data to write
//! or, for reads, primes a status byte plus four register bytes that are
//! collected with one read per byte.

use bitflags::bitflags;

use crate::error::Result;
use crate::i2c::{Session, Transport};

bitflags! {
    /// RCD SMBus command byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RcdCommand: u8 {
        /// First byte of a block
        const BEGIN = 0x80;
        /// Last byte of a block
        const END = 0x40;
        /// Packet error checking enabled
        const PEC = 0x20;
        /// Block writes data (clear for reads)
        const WRITE = 0x04;
    }
}

/// Function space byte of the address frame
pub const RCD_FUNCTION_SPACE: u8 = 0xB0;

/// Bytes returned per read block: status followed by four registers
pub const RCD_GROUP_LEN: usize = 5;

/// Registers per read block
pub const RCD_REGISTER_STRIDE: u8 = 4;

/// Number of blocks covering registers 0x00-0x1F
pub const RCD_GROUP_COUNT: usize = 8;

/// Length of a complete RCD table
pub const RCD_TABLE_LEN: usize = RCD_GROUP_LEN * RCD_GROUP_COUNT;

/// Register bring-up written before reading: soft reset, drive strength,
/// RDIMM mode and operating speed
pub const RCD_DEFAULT_INIT: &[(u8, u8)] = &[
    (0x0B, 0x00),
    (0x09, 0x50),
    (0x0A, 0x55),
    (0x0E, 0x40),
    (0x0D, 0x00),
    (0x12, 0x12),
];

/// First register of read block `group`
pub fn rcd_group_register(group: usize) -> u8 {
    group as u8 * RCD_REGISTER_STRIDE
}

/// Command byte for position `index` of an `len`-byte block
pub fn rcd_block_command(index: usize, len: usize, write: bool) -> RcdCommand {
    let mut cmd = RcdCommand::empty();
    if index == 0 {
        cmd |= RcdCommand::BEGIN;
    }
    if index + 1 == len {
        cmd |= RcdCommand::END;
    }
    if write {
        cmd |= RcdCommand::WRITE;
    }
    cmd
}

/// Address frame `[00, function, 00, register]` with its command bytes
///
/// The frame opens the block; `END` is only set here for reads, where the
/// frame is the whole block.
fn address_frame(register: u8, write: bool) -> [(u8, u8); 4] {
    let data = [0x00, RCD_FUNCTION_SPACE, 0x00, register];
    let block_len = if write { data.len() + 1 } else { data.len() };
    let mut frame = [(0u8, 0u8); 4];
    for (i, slot) in frame.iter_mut().enumerate() {
        *slot = (rcd_block_command(i, block_len, write).bits(), data[i]);
    }
    frame
}

/// Read one block: status byte plus registers `register..register + 4`
pub fn read_rcd_group<T: Transport>(
    session: &mut Session<T>,
    address: u8,
    register: u8,
    out: &mut [u8; RCD_GROUP_LEN],
) -> Result<()> {
    let mut reads = [0u8; RCD_GROUP_LEN];
    for (i, cmd) in reads.iter_mut().enumerate() {
        *cmd = rcd_block_command(i, RCD_GROUP_LEN, false).bits();
    }

    session.multi_setup_then_read(address, &address_frame(register, false), &reads, out)?;
    log::debug!(
        "RCD 0x{:02X} registers 0x{:02X}..0x{:02X}: status {:02X}, data {:02X?}",
        address,
        register,
        register + RCD_REGISTER_STRIDE - 1,
        out[0],
        &out[1..]
    );
    Ok(())
}

/// Write one RCD register
pub fn write_rcd_register<T: Transport>(
    session: &mut Session<T>,
    address: u8,
    register: u8,
    value: u8,
) -> Result<()> {
    log::debug!("RCD 0x{:02X} register 0x{:02X} <- 0x{:02X}", address, register, value);
    for (cmd, data) in address_frame(register, true) {
        session.write_register(address, cmd, data)?;
    }
    let last = rcd_block_command(4, 5, true);
    session.write_register(address, last.bits(), value)
}

/// Write a sequence of `(register, value)` pairs
pub fn initialize_rcd<T: Transport>(
    session: &mut Session<T>,
    address: u8,
    sequence: &[(u8, u8)],
) -> Result<()> {
    for &(register, value) in sequence {
        write_rcd_register(session, address, register, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::testing::*;
    use crate::mpsse::ClockConfig;
    use std::vec::Vec;

    #[test]
    fn test_read_frame_commands() {
        assert_eq!(
            address_frame(0x0C, false),
            [(0x80, 0x00), (0x00, 0xB0), (0x00, 0x00), (0x40, 0x0C)]
        );
    }

    #[test]
    fn test_write_frame_commands() {
        assert_eq!(
            address_frame(0x0B, true),
            [(0x84, 0x00), (0x04, 0xB0), (0x04, 0x00), (0x04, 0x0B)]
        );
        assert_eq!(rcd_block_command(4, 5, true).bits(), 0x44);
    }

    #[test]
    fn test_read_block_commands() {
        let cmds: Vec<u8> = (0..RCD_GROUP_LEN)
            .map(|i| rcd_block_command(i, RCD_GROUP_LEN, false).bits())
            .collect();
        assert_eq!(cmds, [0x80, 0x00, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn test_write_register_transactions() {
        // five writes, three handshakes each
        let mock = MockTransport::with_responses(&[0x00; 15]);
        let mut session = Session::new(mock, ClockConfig::default()).unwrap();
        write_rcd_register(&mut session, 0x58, 0x0E, 0x40).unwrap();

        let written = session.transport().written();
        let mut stops = 0;
        let mut i = 0;
        while i + STOP.len() <= written.len() {
            if written[i..i + STOP.len()] == STOP {
                stops += 1;
                i += STOP.len();
            } else {
                i += 1;
            }
        }
        assert_eq!(stops, 5);
    }

    #[test]
    fn test_group_registers() {
        assert_eq!(rcd_group_register(0), 0x00);
        assert_eq!(rcd_group_register(7), 0x1C);
    }
}
