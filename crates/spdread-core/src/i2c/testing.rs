//! Recording transport for unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use crate::error::{Result, TransportError};

use super::Transport;

/// Records every flush and serves scripted response bytes
#[derive(Debug, Default)]
pub struct MockTransport {
    pub divisor: Option<u16>,
    pub flushes: Vec<Vec<u8>>,
    pub responses: VecDeque<u8>,
    pub fail_writes: bool,
}

impl MockTransport {
    pub fn with_responses(bytes: &[u8]) -> Self {
        Self {
            responses: bytes.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// All flushed bytes in order
    pub fn written(&self) -> Vec<u8> {
        self.flushes.concat()
    }
}

impl Transport for MockTransport {
    fn configure(&mut self, clock_divisor: u16) -> Result<()> {
        self.divisor = Some(clock_divisor);
        Ok(())
    }

    fn flush(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.fail_writes {
            return Err(TransportError::WriteFailed.into());
        }
        self.flushes.push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.responses.pop_front() {
                Some(b) => buf[n] = b,
                None => break,
            }
            n += 1;
        }
        Ok(n)
    }
}

pub const START: [u8; 27] = [
    0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, //
    0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, //
    0x80, 0x00, 0xF3,
];

pub const STOP: [u8; 27] = [
    0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, 0x80, 0x01, 0xF3, //
    0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, 0x80, 0x03, 0xF3, //
    0x80, 0x00, 0xF0,
];

pub const RELEASE: [u8; 3] = [0x80, 0x02, 0xF3];

pub fn byte_out(byte: u8) -> [u8; 10] {
    [0x11, 0x00, 0x00, byte, 0x80, 0x00, 0xF1, 0x22, 0x00, 0x87]
}

/// Single-byte read at the default 200 kHz clock (ten toggles per group)
pub fn read_one() -> Vec<u8> {
    let mut seq = std::vec![0x80, 0x00, 0x11, 0x24, 0x00, 0x00];
    for level in [0x02u8, 0x03, 0x02] {
        for _ in 0..10 {
            seq.extend_from_slice(&[0x80, level, 0x13]);
        }
    }
    seq
}
