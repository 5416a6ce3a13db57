//! MPSSE command interpreter and I2C bus model

use std::collections::VecDeque;

use spdread_core::mpsse::{Opcode, Pins, BAD_COMMAND_RESPONSE};

use crate::targets::I2cTarget;

/// Byte returned when nobody drives SDA
const IDLE_BUS_BYTE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Address,
    Write(usize),
    Read(usize),
    Ignored,
}

/// Targets and protocol state of the emulated I2C bus
pub(crate) struct Bus {
    targets: Vec<Box<dyn I2cTarget>>,
    phase: Phase,
    index: usize,
    scl: bool,
    sda: bool,
    ack: bool,
}

impl Bus {
    pub(crate) fn new() -> Self {
        Self {
            targets: Vec::new(),
            phase: Phase::Idle,
            index: 0,
            scl: true,
            sda: true,
            ack: false,
        }
    }

    pub(crate) fn attach(&mut self, target: Box<dyn I2cTarget>) {
        self.targets.push(target);
    }

    pub(crate) fn target(&self, address: u8) -> Option<&dyn I2cTarget> {
        self.targets
            .iter()
            .find(|t| t.address() == address)
            .map(|t| t.as_ref())
    }

    /// Apply a `SetBitsLow` and detect start/stop conditions
    ///
    /// A released line reads high through the bus pull-ups.
    fn set_lines(&mut self, value: u8, direction: u8) {
        let level = |pin: Pins| direction & pin.bits() == 0 || value & pin.bits() != 0;
        let scl = level(Pins::SCL);
        let sda = level(Pins::SDA_OUT);

        if self.scl && scl {
            if self.sda && !sda {
                self.start();
            } else if !self.sda && sda {
                self.stop();
            }
        }
        self.scl = scl;
        self.sda = sda;
    }

    fn start(&mut self) {
        log::trace!("dummy: START");
        self.phase = Phase::Address;
    }

    fn stop(&mut self) {
        log::trace!("dummy: STOP");
        if let Phase::Write(i) | Phase::Read(i) = self.phase {
            self.targets[i].stop();
        }
        self.phase = Phase::Idle;
    }

    fn write_byte(&mut self, byte: u8) {
        self.ack = match self.phase {
            Phase::Address => {
                let address = byte >> 1;
                match self.targets.iter().position(|t| t.address() == address) {
                    Some(i) => {
                        self.phase = if byte & 1 != 0 {
                            Phase::Read(i)
                        } else {
                            Phase::Write(i)
                        };
                        self.index = 0;
                        true
                    }
                    None => {
                        log::trace!("dummy: no target at 0x{:02X}", address);
                        self.phase = Phase::Ignored;
                        false
                    }
                }
            }
            Phase::Write(i) => {
                let ack = self.targets[i].write(self.index, byte);
                self.index += 1;
                ack
            }
            Phase::Read(_) | Phase::Idle | Phase::Ignored => false,
        };
    }

    fn read_byte(&mut self) -> u8 {
        match self.phase {
            Phase::Read(i) => self.targets[i].read(),
            _ => IDLE_BUS_BYTE,
        }
    }
}

/// Parses MPSSE commands and queues the adapter's responses
pub(crate) struct Interpreter {
    pub(crate) bus: Bus,
    pending: Vec<u8>,
    pub(crate) responses: VecDeque<u8>,
    pub(crate) divisor: Option<u16>,
}

impl Interpreter {
    pub(crate) fn new() -> Self {
        Self {
            bus: Bus::new(),
            pending: Vec::new(),
            responses: VecDeque::new(),
            divisor: None,
        }
    }

    /// Execute every complete command in `bytes`; a trailing partial
    /// command waits for the next call
    pub(crate) fn feed(&mut self, bytes: &[u8]) {
        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(bytes);
        let mut pos = 0;
        while let Some(used) = self.execute(&pending[pos..]) {
            pos += used;
        }
        pending.drain(..pos);
        self.pending = pending;
    }

    /// Execute the command at the start of `cmd`, returning its length
    fn execute(&mut self, cmd: &[u8]) -> Option<usize> {
        let &op = cmd.first()?;
        let opcode = match Opcode::from_u8(op) {
            Some(Opcode::BadCommand) | None => {
                log::debug!("dummy: bad command 0x{:02X}", op);
                self.responses.extend([BAD_COMMAND_RESPONSE, op]);
                return Some(1);
            }
            Some(opcode) => opcode,
        };
        let header = 1 + opcode.operand_len();
        if cmd.len() < header {
            return None;
        }
        let arg = |i: usize| cmd[1 + i];
        let length = || usize::from(u16::from_le_bytes([arg(0), arg(1)])) + 1;

        match opcode {
            Opcode::ClockBytesOutFalling => {
                let n = length();
                let data = cmd.get(header..header + n)?;
                for &b in data {
                    self.bus.write_byte(b);
                }
                return Some(header + n);
            }
            Opcode::ClockBitsInRising => {
                // SDA is sampled into bit 0; low means acknowledge
                let sampled = if self.bus.ack { 0x00 } else { 0x01 };
                self.responses.push_back(sampled);
            }
            Opcode::ClockBytesInFalling => {
                for _ in 0..length() {
                    let b = self.bus.read_byte();
                    self.responses.push_back(b);
                }
            }
            Opcode::SetBitsLow => self.bus.set_lines(arg(0), arg(1)),
            Opcode::SetClockDivisor => {
                self.divisor = Some(u16::from_le_bytes([arg(0), arg(1)]));
            }
            _ => {}
        }
        Some(header)
    }
}
