//! Transport trait definition

use crate::error::Result;

/// Byte link to an MPSSE adapter
///
/// Implementations own an already opened adapter in MPSSE mode. Errors are
/// reported as [`Error::Transport`](crate::Error::Transport).
pub trait Transport {
    /// Program the bus clock divisor
    fn configure(&mut self, clock_divisor: u16) -> Result<()>;

    /// Submit an outgoing command sequence, returning the number of bytes accepted
    fn flush(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Receive up to `buf.len()` bytes of pending response data
    ///
    /// May return fewer bytes than requested when the adapter's read
    /// timeout expires.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn configure(&mut self, clock_divisor: u16) -> Result<()> {
        (**self).configure(clock_divisor)
    }

    fn flush(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).flush(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}

// Allows `Session<Box<dyn Transport>>` for runtime-selected adapters
#[cfg(feature = "alloc")]
impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    fn configure(&mut self, clock_divisor: u16) -> Result<()> {
        (**self).configure(clock_divisor)
    }

    fn flush(&mut self, bytes: &[u8]) -> Result<usize> {
        (**self).flush(bytes)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}
