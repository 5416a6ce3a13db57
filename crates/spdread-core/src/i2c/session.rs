//! Per-adapter session state and bus primitives

use crate::error::{Error, Result, TransportError};
use crate::mpsse::{ClockConfig, CommandBuffer, Encoder};

use super::Transport;

/// Outcome of clocking one byte out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckResult {
    /// The adapter returned the handshake byte
    pub delivered: bool,
    /// The target pulled SDA low during the acknowledge clock
    pub acknowledged: bool,
}

impl AckResult {
    /// Turn the outcome into an error for the given target and byte
    pub fn check(self, address: u8, byte: u8) -> Result<()> {
        if !self.delivered {
            return Err(TransportError::NoResponse {
                expected: 1,
                received: 0,
            }
            .into());
        }
        if !self.acknowledged {
            return Err(Error::Nack { address, byte });
        }
        Ok(())
    }
}

/// One I2C master session on an MPSSE adapter
///
/// The session is the single owner of the transport and the command buffer;
/// bus transactions are therefore serialised by `&mut self`.
pub struct Session<T: Transport> {
    transport: T,
    clock: ClockConfig,
    encoder: Encoder,
    cmd: CommandBuffer,
}

impl<T: Transport> Session<T> {
    /// Start a session, programming the clock divisor into the adapter
    pub fn new(transport: T, clock: ClockConfig) -> Result<Self> {
        Self::with_gpio(transport, clock, 0)
    }

    /// Start a session with GPIOL0-3 driven to the levels in `gpio`'s low nibble
    pub fn with_gpio(mut transport: T, clock: ClockConfig, gpio: u8) -> Result<Self> {
        log::debug!(
            "Configuring I2C clock: divisor 0x{:04X} ({:.1} kHz, {} read toggles)",
            clock.divisor(),
            clock.clock_khz(),
            clock.loop_count()
        );
        transport.configure(clock.divisor())?;

        Ok(Self {
            transport,
            clock,
            encoder: Encoder::new(&clock, gpio),
            cmd: CommandBuffer::new(),
        })
    }

    /// Clock configuration of this session
    pub fn clock(&self) -> &ClockConfig {
        &self.clock
    }

    /// Bytes queued but not yet flushed
    pub fn pending(&self) -> &[u8] {
        self.cmd.as_slice()
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// End the session and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Queue a start or repeated start condition
    pub fn start(&mut self) {
        self.encoder.start(&mut self.cmd);
    }

    /// Queue a stop condition
    pub fn stop(&mut self) {
        self.encoder.stop(&mut self.cmd);
    }

    /// Send all queued bytes as one unit and empty the buffer
    pub fn flush(&mut self) -> Result<()> {
        if self.cmd.is_empty() {
            return Ok(());
        }

        let expected = self.cmd.len();
        let result = self.transport.flush(self.cmd.as_slice());
        self.cmd.clear();

        let written = result?;
        log::trace!("Flushed {} bytes", written);
        if written != expected {
            return Err(TransportError::ShortWrite { expected, written }.into());
        }
        Ok(())
    }

    /// Clock one byte out and sample the acknowledge bit
    ///
    /// Flushes the queue. When the handshake byte arrives the bus release
    /// is queued for the next primitive; when it does not, nothing further
    /// is queued.
    pub fn byte_out(&mut self, byte: u8) -> Result<AckResult> {
        self.encoder.byte_out(&mut self.cmd, byte);
        self.flush()?;

        let mut handshake = [0u8; 1];
        let received = self.transport.receive(&mut handshake)?;
        log::trace!("Received {} handshake bytes", received);
        if received == 0 {
            log::debug!("No acknowledge byte returned for 0x{:02X}", byte);
            return Ok(AckResult {
                delivered: false,
                acknowledged: false,
            });
        }

        self.encoder.ack_release(&mut self.cmd);

        Ok(AckResult {
            delivered: true,
            acknowledged: handshake[0] & 0x01 == 0,
        })
    }

    /// Clock `buf.len()` bytes in
    ///
    /// Flushes the queue and fails unless every byte arrives.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.encoder.read(&mut self.cmd, buf.len());
        self.flush()?;

        let received = self.transport.receive(buf)?;
        log::trace!("Received {} data bytes", received);
        if received < buf.len() {
            return Err(TransportError::NoResponse {
                expected: buf.len(),
                received,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::testing::*;

    #[test]
    fn test_session_programs_divisor() {
        let session = Session::new(MockTransport::default(), ClockConfig::default()).unwrap();
        assert_eq!(session.transport().divisor, Some(0x0095));
    }

    #[test]
    fn test_byte_out_ack() {
        let mock = MockTransport::with_responses(&[0x00]);
        let mut session = Session::new(mock, ClockConfig::default()).unwrap();

        let ack = session.byte_out(0xA0).unwrap();
        assert_eq!(
            ack,
            AckResult {
                delivered: true,
                acknowledged: true
            }
        );
        assert_eq!(session.transport().flushes, [byte_out(0xA0).to_vec()]);
        assert_eq!(session.pending(), &RELEASE);
    }

    #[test]
    fn test_byte_out_nack_uses_bit_zero() {
        let mock = MockTransport::with_responses(&[0xFE, 0x01]);
        let mut session = Session::new(mock, ClockConfig::default()).unwrap();

        assert!(session.byte_out(0x10).unwrap().acknowledged);
        assert!(!session.byte_out(0x11).unwrap().acknowledged);
    }

    #[test]
    fn test_byte_out_without_handshake() {
        let mut session = Session::new(MockTransport::default(), ClockConfig::default()).unwrap();

        let ack = session.byte_out(0xA0).unwrap();
        assert!(!ack.delivered);
        assert!(session.pending().is_empty());
        assert!(ack.check(0x50, 0xA0).unwrap_err().is_transport());
    }

    #[test]
    fn test_flush_error_clears_buffer() {
        let mock = MockTransport {
            fail_writes: true,
            ..Default::default()
        };
        let mut session = Session::new(mock, ClockConfig::default()).unwrap();
        session.start();

        assert_eq!(
            session.flush(),
            Err(Error::Transport(TransportError::WriteFailed))
        );
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_short_read_is_error() {
        let mut session = Session::new(MockTransport::default(), ClockConfig::default()).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(
            session.read(&mut buf),
            Err(Error::Transport(TransportError::NoResponse {
                expected: 1,
                received: 0
            }))
        );
    }

    #[test]
    fn test_ack_check() {
        let nack = AckResult {
            delivered: true,
            acknowledged: false,
        };
        assert_eq!(
            nack.check(0x50, 0xA0),
            Err(Error::Nack {
                address: 0x50,
                byte: 0xA0
            })
        );
    }
}
