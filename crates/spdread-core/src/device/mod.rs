//! DIMM management devices and register scans
//!
//! SPD EEPROMs and RCDs differ only in their bus address and in how a
//! register is fetched, so both are scanned through one loop driven by a
//! [`DeviceProfile`].

mod rcd;
mod table;

pub use rcd::*;
pub use table::*;

use crate::error::{Error, Result};
use crate::i2c::{Session, Transport};

/// Base address of the SPD EEPROM on slot 0 (`1010_000`)
pub const SPD_BASE_ADDRESS: u8 = 0x50;

/// Base address of the RCD on slot 0 (`1011_000`)
pub const RCD_BASE_ADDRESS: u8 = 0x58;

/// Number of DIMM slots addressable on one SMBus segment
pub const MAX_SLOTS: u8 = 8;

/// Bytes read from an SPD EEPROM (base configuration and DRAM parameters)
pub const SPD_TABLE_LEN: usize = 128;

/// Byte stored in place of a register that could not be read
pub const FILL_BYTE: u8 = 0xFF;

/// Kind of management device on a DIMM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// SPD EEPROM (JEDEC EE1004)
    SpdEeprom,
    /// Registering clock driver
    Rcd,
}

impl DeviceKind {
    /// Length of a complete raw table for this kind
    pub fn table_len(self) -> usize {
        match self {
            Self::SpdEeprom => SPD_TABLE_LEN,
            Self::Rcd => RCD_TABLE_LEN,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::SpdEeprom => "SPD EEPROM",
            Self::Rcd => "RCD",
        }
    }
}

/// Where a device sits on the bus and how much of it to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Kind of device
    pub kind: DeviceKind,
    /// 7-bit bus address
    pub address: u8,
}

impl DeviceProfile {
    /// Profile for the device on slot 0
    pub fn for_kind(kind: DeviceKind) -> Self {
        Self {
            kind,
            address: match kind {
                DeviceKind::SpdEeprom => SPD_BASE_ADDRESS,
                DeviceKind::Rcd => RCD_BASE_ADDRESS,
            },
        }
    }

    /// Profile for the device on the given slot (0-7)
    pub fn for_slot(kind: DeviceKind, slot: u8) -> Result<Self> {
        if slot >= MAX_SLOTS {
            return Err(Error::InvalidSlot(slot));
        }
        let mut profile = Self::for_kind(kind);
        profile.address |= slot;
        Ok(profile)
    }

    /// Number of read steps a scan performs
    pub fn steps(&self) -> usize {
        match self.kind {
            DeviceKind::SpdEeprom => SPD_TABLE_LEN,
            DeviceKind::Rcd => RCD_GROUP_COUNT,
        }
    }
}

/// What a scan does when a register read fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the first error
    #[default]
    Abort,
    /// Fill the failed cells with [`FILL_BYTE`] and keep going
    Continue,
}

/// Result of a scan under [`ErrorPolicy::Continue`]
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Captured bytes
    pub table: RawByteTable,
    /// Number of read steps that failed
    pub failures: usize,
    /// First error seen, if any
    pub first_error: Option<Error>,
}

/// Read the complete register table of the device on slot 0
pub fn scan<T: Transport>(session: &mut Session<T>, kind: DeviceKind) -> Result<RawByteTable> {
    let profile = DeviceProfile::for_kind(kind);
    scan_with(session, &profile, ErrorPolicy::Abort, |_, _| {}).map(|outcome| outcome.table)
}

/// Read the complete register table described by `profile`
///
/// `progress` is called after every step with `(done, total)`.
pub fn scan_with<T, F>(
    session: &mut Session<T>,
    profile: &DeviceProfile,
    policy: ErrorPolicy,
    mut progress: F,
) -> Result<ScanOutcome>
where
    T: Transport,
    F: FnMut(usize, usize),
{
    log::info!(
        "Reading {} at address 0x{:02X}",
        profile.kind.name(),
        profile.address
    );

    let mut table = RawByteTable::new(profile.kind);
    let mut failures = 0;
    let mut first_error = None;
    let total = profile.steps();

    for step in 0..total {
        let result = match profile.kind {
            DeviceKind::SpdEeprom => session
                .read_register(profile.address, step as u8)
                .map(|byte| table.push(byte)),
            DeviceKind::Rcd => {
                let mut group = [0u8; RCD_GROUP_LEN];
                read_rcd_group(session, profile.address, rcd_group_register(step), &mut group)
                    .map(|()| table.extend_from_slice(&group))
            }
        };

        if let Err(e) = result {
            match policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Continue => {
                    log::warn!("{} step {} failed: {}", profile.kind.name(), step, e);
                    let width = match profile.kind {
                        DeviceKind::SpdEeprom => 1,
                        DeviceKind::Rcd => RCD_GROUP_LEN,
                    };
                    for _ in 0..width {
                        table.push(FILL_BYTE);
                    }
                    failures += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        progress(step + 1, total);
    }

    Ok(ScanOutcome {
        table,
        failures,
        first_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::i2c::testing::MockTransport;
    use crate::mpsse::ClockConfig;
    use std::vec::Vec;

    #[test]
    fn test_profiles() {
        assert_eq!(DeviceProfile::for_kind(DeviceKind::SpdEeprom).address, 0x50);
        assert_eq!(DeviceProfile::for_kind(DeviceKind::Rcd).address, 0x58);
        assert_eq!(
            DeviceProfile::for_slot(DeviceKind::SpdEeprom, 3)
                .unwrap()
                .address,
            0x53
        );
        assert_eq!(
            DeviceProfile::for_slot(DeviceKind::Rcd, 8),
            Err(Error::InvalidSlot(8))
        );
    }

    #[test]
    fn test_spd_scan_reads_every_register() {
        let mut responses = Vec::new();
        for i in 0..SPD_TABLE_LEN {
            responses.extend_from_slice(&[0x00, 0x00, 0x00, i as u8]);
        }
        let mut session = Session::new(
            MockTransport::with_responses(&responses),
            ClockConfig::default(),
        )
        .unwrap();

        let table = scan(&mut session, DeviceKind::SpdEeprom).unwrap();
        assert_eq!(table.len(), SPD_TABLE_LEN);
        assert!(table.is_complete());
        assert_eq!(table[0x7F], 0x7F);
    }

    #[test]
    fn test_scan_abort_policy() {
        let mut session =
            Session::new(MockTransport::default(), ClockConfig::default()).unwrap();
        let err = scan(&mut session, DeviceKind::SpdEeprom).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::NoResponse { .. })
        ));
    }

    #[test]
    fn test_scan_continue_policy_fills() {
        let mut session =
            Session::new(MockTransport::default(), ClockConfig::default()).unwrap();
        let profile = DeviceProfile::for_kind(DeviceKind::Rcd);
        let mut calls = 0;

        let outcome =
            scan_with(&mut session, &profile, ErrorPolicy::Continue, |_, _| calls += 1).unwrap();
        assert_eq!(outcome.failures, RCD_GROUP_COUNT);
        assert_eq!(calls, RCD_GROUP_COUNT);
        assert!(outcome.table.is_complete());
        assert!(outcome.table.as_bytes().iter().all(|&b| b == FILL_BYTE));
        assert!(outcome.first_error.is_some());
    }
}
