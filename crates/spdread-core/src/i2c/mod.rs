//! Bit-banged I2C master over an MPSSE transport
//!
//! A [`Session`] owns the transport, the clock configuration and the
//! command buffer. Bus primitives are queued through the MPSSE encoder and
//! flushed whenever the adapter has to report something back (an
//! acknowledge bit or read data), so every handshake is observed before the
//! next byte is queued.

mod session;
mod transaction;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use session::*;
pub use transaction::*;
pub use transport::*;
