//! JEDEC DDR4 SPD and RCD table decoding
//!
//! All functions here are pure transforms over a captured
//! [`RawByteTable`](crate::device::RawByteTable). A table shorter than its
//! device layout is a caller bug and panics; a table whose time-base byte
//! declares units other than 125 ps / 1 ps is rejected with
//! [`Error::UnsupportedTimeBase`](crate::Error::UnsupportedTimeBase).

mod crc;
mod decode;
mod fields;
mod types;

pub use crc::*;
pub use decode::*;
pub use fields::*;
pub use types::*;
