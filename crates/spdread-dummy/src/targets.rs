//! Emulated I2C targets

use spdread_core::device::{RcdCommand, RCD_FUNCTION_SPACE, RCD_GROUP_LEN, RCD_REGISTER_STRIDE};
use spdread_core::spd::RCD_REGISTER_COUNT;

/// Status byte the emulated RCD returns ahead of register data
pub const RCD_STATUS_OK: u8 = 0x01;

/// A device on the emulated bus
pub trait I2cTarget {
    /// 7-bit bus address
    fn address(&self) -> u8;

    /// Byte `index` of a write transfer (the address byte excluded)
    ///
    /// Returns whether the byte is acknowledged.
    fn write(&mut self, index: usize, byte: u8) -> bool;

    /// Next byte of a read transfer
    fn read(&mut self) -> u8;

    /// Stop condition ended a transfer to this target
    fn stop(&mut self) {}
}

/// EE1004-style SPD EEPROM: the first written byte sets the pointer,
/// reads auto-increment it
#[derive(Debug, Clone)]
pub struct SpdEepromTarget {
    address: u8,
    data: Vec<u8>,
    pointer: usize,
}

impl SpdEepromTarget {
    /// Create an EEPROM holding `data`
    pub fn new(address: u8, data: Vec<u8>) -> Self {
        Self {
            address,
            data,
            pointer: 0,
        }
    }

    /// Current contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl I2cTarget for SpdEepromTarget {
    fn address(&self) -> u8 {
        self.address
    }

    fn write(&mut self, index: usize, byte: u8) -> bool {
        if self.data.is_empty() {
            return false;
        }
        if index == 0 {
            self.pointer = usize::from(byte) % self.data.len();
        } else {
            self.data[self.pointer] = byte;
            self.pointer = (self.pointer + 1) % self.data.len();
        }
        true
    }

    fn read(&mut self) -> u8 {
        let Some(&byte) = self.data.get(self.pointer) else {
            return 0xFF;
        };
        self.pointer = (self.pointer + 1) % self.data.len();
        byte
    }
}

/// DDR4 RCD speaking the SMBus block protocol
///
/// Each write transfer carries a command byte and a data byte. A block
/// starts at a `BEGIN` command and is executed at `END`: a write block
/// stores its last byte into the addressed register, a read block loads
/// status plus four registers for the following reads.
#[derive(Debug, Clone)]
pub struct RcdTarget {
    address: u8,
    registers: [u8; RCD_REGISTER_COUNT],
    command: u8,
    block: Vec<u8>,
    block_write: bool,
    response: [u8; RCD_GROUP_LEN],
    response_pos: usize,
}

impl RcdTarget {
    /// Create an RCD with the given register contents
    pub fn new(address: u8, registers: [u8; RCD_REGISTER_COUNT]) -> Self {
        Self {
            address,
            registers,
            command: 0,
            block: Vec::new(),
            block_write: false,
            response: [0xFF; RCD_GROUP_LEN],
            response_pos: 0,
        }
    }

    /// Current register contents
    pub fn registers(&self) -> &[u8; RCD_REGISTER_COUNT] {
        &self.registers
    }

    fn execute(&mut self) {
        // [00, function space, 00, register, (data)]
        let (frame, data) = self.block.split_at(self.block.len().min(4));
        if frame.len() < 4 || frame[1] != RCD_FUNCTION_SPACE {
            log::debug!("RCD: ignoring block {:02X?}", self.block);
            return;
        }
        let register = usize::from(frame[3]);

        if self.block_write {
            if let (Some(&value), Some(slot)) = (data.first(), self.registers.get_mut(register)) {
                *slot = value;
            }
        } else {
            self.response[0] = RCD_STATUS_OK;
            for i in 0..usize::from(RCD_REGISTER_STRIDE) {
                self.response[1 + i] = self.registers.get(register + i).copied().unwrap_or(0xFF);
            }
            self.response_pos = 0;
        }
    }
}

impl I2cTarget for RcdTarget {
    fn address(&self) -> u8 {
        self.address
    }

    fn write(&mut self, index: usize, byte: u8) -> bool {
        match index {
            0 => self.command = byte,
            1 => {
                let cmd = RcdCommand::from_bits_truncate(self.command);
                if cmd.contains(RcdCommand::BEGIN) {
                    self.block.clear();
                    self.block_write = cmd.contains(RcdCommand::WRITE);
                }
                self.block.push(byte);
                if cmd.contains(RcdCommand::END) {
                    self.execute();
                }
            }
            _ => return false,
        }
        true
    }

    fn read(&mut self) -> u8 {
        let byte = self.response.get(self.response_pos).copied().unwrap_or(0xFF);
        self.response_pos += 1;
        byte
    }
}
