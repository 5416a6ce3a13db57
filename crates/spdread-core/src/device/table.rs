//! Raw register tables

use core::ops::Index;

use heapless::Vec;

use super::DeviceKind;

/// Capacity of a raw table (the larger of the SPD and RCD layouts)
pub const MAX_TABLE_LEN: usize = 128;

/// Bytes captured from one device, in register order
///
/// Built once by a scan and read-only afterwards. Indexing past the end is
/// a caller bug and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawByteTable {
    kind: DeviceKind,
    bytes: Vec<u8, MAX_TABLE_LEN>,
}

impl RawByteTable {
    /// Create an empty table
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            bytes: Vec::new(),
        }
    }

    /// Build a table from a saved image
    ///
    /// Longer images (a full 512-byte SPD dump, for instance) are cut to the
    /// length of the kind's table. Returns `None` if the image is too short.
    pub fn from_bytes(kind: DeviceKind, data: &[u8]) -> Option<Self> {
        let len = kind.table_len();
        if data.len() < len {
            return None;
        }
        let mut table = Self::new(kind);
        table.extend_from_slice(&data[..len]);
        Some(table)
    }

    pub(crate) fn push(&mut self, byte: u8) {
        if self.bytes.push(byte).is_err() {
            panic!("raw table overflow (capacity {} bytes)", MAX_TABLE_LEN);
        }
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Device kind the table was read from
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Captured bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of captured bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether every register of the device has been captured
    pub fn is_complete(&self) -> bool {
        self.bytes.len() == self.kind.table_len()
    }
}

impl Index<usize> for RawByteTable {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.bytes[index]
    }
}
