//! Device-level I2C transactions
//!
//! Composes bus primitives into register accesses. Link failures abort the
//! transaction immediately and leave the queue as it was after the failing
//! flush. A target that does not acknowledge gets a stop condition before
//! the error is returned. Nothing is retried; callers decide whether to go
//! on.

use crate::error::{Error, Result};

use super::{Session, Transport};

/// Largest valid 7-bit I2C address
pub const MAX_DEVICE_ADDRESS: u8 = 0x7F;

fn write_address(address: u8) -> Result<u8> {
    if address > MAX_DEVICE_ADDRESS {
        return Err(Error::InvalidDeviceAddress(address));
    }
    Ok(address << 1)
}

impl<T: Transport> Session<T> {
    /// Clock a byte out; on NACK close the transaction with a stop
    fn send(&mut self, address: u8, byte: u8) -> Result<()> {
        let ack = self.byte_out(byte)?;
        match ack.check(address, byte) {
            Err(e @ Error::Nack { .. }) => {
                log::warn!("Device 0x{:02X} NACKed byte 0x{:02X}", address, byte);
                self.stop();
                self.flush()?;
                Err(e)
            }
            other => other,
        }
    }

    /// Write one register: start, address+W, register, value, stop
    pub fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        let addr_write = write_address(address)?;
        log::debug!(
            "I2C write 0x{:02X}[0x{:02X}] = 0x{:02X}",
            address,
            register,
            value
        );

        self.start();
        self.send(address, addr_write)?;
        self.send(address, register)?;
        self.send(address, value)?;
        self.stop();
        self.flush()
    }

    /// Read one register: start, address+W, register, restart, address+R, read, stop
    pub fn read_register(&mut self, address: u8, register: u8) -> Result<u8> {
        let addr_write = write_address(address)?;

        self.start();
        self.send(address, addr_write)?;
        self.send(address, register)?;
        self.start();
        self.send(address, addr_write | 0x01)?;

        let mut data = [0u8; 1];
        self.read(&mut data)?;
        self.stop();
        self.flush()?;

        log::debug!(
            "I2C read 0x{:02X}[0x{:02X}] = 0x{:02X}",
            address,
            register,
            data[0]
        );
        Ok(data[0])
    }

    /// Issue setup writes, then one register read per entry of `reads`
    ///
    /// Every `(register, value)` pair in `writes` is a complete
    /// start..stop transaction. `out` receives one byte per read.
    pub fn multi_setup_then_read(
        &mut self,
        address: u8,
        writes: &[(u8, u8)],
        reads: &[u8],
        out: &mut [u8],
    ) -> Result<()> {
        assert_eq!(
            reads.len(),
            out.len(),
            "one output byte is needed per read command"
        );

        for &(register, value) in writes {
            self.write_register(address, register, value)?;
        }
        for (slot, &register) in out.iter_mut().zip(reads) {
            *slot = self.read_register(address, register)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::i2c::testing::*;
    use crate::mpsse::ClockConfig;
    use std::vec::Vec;

    fn session(responses: &[u8]) -> Session<MockTransport> {
        Session::new(
            MockTransport::with_responses(responses),
            ClockConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_read_register_fixture() {
        let mut s = session(&[0x00, 0x00, 0x00, 0x23]);
        assert_eq!(s.read_register(0x50, 0x00), Ok(0x23));

        let mut expected = Vec::new();
        expected.extend_from_slice(&START);
        expected.extend_from_slice(&byte_out(0xA0));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&byte_out(0x00));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&START);
        expected.extend_from_slice(&byte_out(0xA1));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&read_one());
        expected.extend_from_slice(&STOP);

        assert_eq!(s.transport().written(), expected);
        // one flush per handshake, one for the read, one for the stop
        assert_eq!(s.transport().flushes.len(), 5);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn test_write_register_sequence() {
        let mut s = session(&[0x00, 0x00, 0x00]);
        s.write_register(0x58, 0x80, 0x00).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&START);
        expected.extend_from_slice(&byte_out(0xB0));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&byte_out(0x80));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&byte_out(0x00));
        expected.extend_from_slice(&RELEASE);
        expected.extend_from_slice(&STOP);

        assert_eq!(s.transport().written(), expected);
    }

    #[test]
    fn test_write_register_without_handshake() {
        let mut s = session(&[]);
        assert_eq!(
            s.write_register(0x50, 0x10, 0x55),
            Err(Error::Transport(TransportError::NoResponse {
                expected: 1,
                received: 0
            }))
        );

        // Only the start and the first byte went out; no stop was queued
        let mut expected = Vec::new();
        expected.extend_from_slice(&START);
        expected.extend_from_slice(&byte_out(0xA0));
        assert_eq!(s.transport().written(), expected);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn test_nack_sends_stop() {
        let mut s = session(&[0x01]);
        assert_eq!(
            s.read_register(0x51, 0x00),
            Err(Error::Nack {
                address: 0x51,
                byte: 0xA2
            })
        );

        let flushes = &s.transport().flushes;
        let mut last = RELEASE.to_vec();
        last.extend_from_slice(&STOP);
        assert_eq!(flushes.last().unwrap(), &last);
    }

    #[test]
    fn test_invalid_address() {
        let mut s = session(&[]);
        assert_eq!(
            s.read_register(0x80, 0x00),
            Err(Error::InvalidDeviceAddress(0x80))
        );
        assert!(s.transport().flushes.is_empty());
    }

    #[test]
    fn test_multi_setup_then_read() {
        // two writes of three handshakes each, then two reads
        let mut responses = std::vec![0x00; 6];
        responses.extend_from_slice(&[0x00, 0x00, 0x00, 0x11]);
        responses.extend_from_slice(&[0x00, 0x00, 0x00, 0x22]);
        let mut s = session(&responses);

        let mut out = [0u8; 2];
        s.multi_setup_then_read(0x58, &[(0x80, 0x00), (0x40, 0x04)], &[0x80, 0x40], &mut out)
            .unwrap();
        assert_eq!(out, [0x11, 0x22]);
        // 4 flushes per write, 5 per read
        assert_eq!(s.transport().flushes.len(), 2 * 4 + 2 * 5);
    }
}
