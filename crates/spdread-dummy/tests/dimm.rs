//! Full scans against the emulated DIMM

use spdread_core::device::{
    self, initialize_rcd, scan_with, DeviceKind, DeviceProfile, ErrorPolicy, FILL_BYTE,
    RCD_DEFAULT_INIT, RCD_TABLE_LEN,
};
use spdread_core::i2c::Session;
use spdread_core::mpsse::ClockConfig;
use spdread_core::spd::{self, Decoded, DecodedField, ModuleType};
use spdread_core::{Error, TransportError};
use spdread_dummy::{ddr4_rcd_registers, ddr4_rdimm_spd, DummyDimm, RCD_STATUS_OK};

fn session(dimm: DummyDimm) -> Session<DummyDimm> {
    Session::new(dimm, ClockConfig::default()).unwrap()
}

#[test]
fn test_clock_divisor_programmed() {
    let s = session(DummyDimm::ddr4_rdimm(0));
    assert_eq!(s.transport().divisor(), Some(0x95));
}

#[test]
fn test_spd_scan_and_decode() {
    let mut s = session(DummyDimm::ddr4_rdimm(0));
    let table = device::scan(&mut s, DeviceKind::SpdEeprom).unwrap();
    assert!(table.is_complete());
    assert_eq!(table.as_bytes(), &ddr4_rdimm_spd()[..128]);

    let Decoded::Spd(info) = spd::decode(&table).unwrap() else {
        panic!("expected an SPD decode");
    };
    assert_eq!(info.memory_type.name(), "DDR4 SDRAM");
    assert_eq!(info.module_type, ModuleType::Rdimm);
    assert_eq!(info.geometry.capacity_mb, 8192);
    assert_eq!(info.timings.taa, 13.75);
    assert!(info.crc.is_valid());
}

#[test]
fn test_spd_scan_on_other_slot() {
    let mut s = session(DummyDimm::ddr4_rdimm(3));
    let profile = DeviceProfile::for_slot(DeviceKind::SpdEeprom, 3).unwrap();
    let mut last = (0, 0);
    let outcome = scan_with(&mut s, &profile, ErrorPolicy::Abort, |done, total| {
        last = (done, total)
    })
    .unwrap();
    assert_eq!(last, (128, 128));
    assert_eq!(outcome.failures, 0);
    assert_eq!(outcome.table[0x02], 0x0C);

    // nothing answers on slot 0
    assert_eq!(
        device::scan(&mut s, DeviceKind::SpdEeprom).unwrap_err(),
        Error::Nack {
            address: 0x50,
            byte: 0xA0
        }
    );
}

#[test]
fn test_rcd_scan() {
    let mut s = session(DummyDimm::ddr4_rdimm(0));
    let table = device::scan(&mut s, DeviceKind::Rcd).unwrap();
    assert_eq!(table.len(), RCD_TABLE_LEN);

    let Decoded::Rcd(regs) = spd::decode(&table).unwrap() else {
        panic!("expected an RCD decode");
    };
    assert!(regs.status.iter().all(|&s| s == RCD_STATUS_OK));
    assert_eq!(regs.registers, ddr4_rcd_registers());

    let fields = Decoded::Rcd(regs).fields();
    assert_eq!(fields[1], ("RW00", DecodedField::Hex(0xB3)));
}

#[test]
fn test_rcd_init_then_scan() {
    let mut s = session(DummyDimm::ddr4_rdimm(0));
    initialize_rcd(&mut s, 0x58, RCD_DEFAULT_INIT).unwrap();

    let table = device::scan(&mut s, DeviceKind::Rcd).unwrap();
    let Decoded::Rcd(regs) = spd::decode(&table).unwrap() else {
        panic!("expected an RCD decode");
    };
    for &(register, value) in RCD_DEFAULT_INIT {
        assert_eq!(regs.registers[usize::from(register)], value);
    }
}

#[test]
fn test_register_write_read_back() {
    let mut s = session(DummyDimm::ddr4_rdimm(0));
    s.write_register(0x50, 0x40, 0x5A).unwrap();
    assert_eq!(s.read_register(0x50, 0x40), Ok(0x5A));
    assert_eq!(s.read_register(0x50, 0x02), Ok(0x0C));
}

#[test]
fn test_empty_bus_continue_policy() {
    let mut s = session(DummyDimm::new());
    let profile = DeviceProfile::for_kind(DeviceKind::SpdEeprom);
    let outcome = scan_with(&mut s, &profile, ErrorPolicy::Continue, |_, _| {}).unwrap();

    assert_eq!(outcome.failures, 128);
    assert!(outcome.table.as_bytes().iter().all(|&b| b == FILL_BYTE));
    assert!(matches!(outcome.first_error, Some(Error::Nack { .. })));
    // every NACKed transaction was closed
    assert!(s.pending().is_empty());
}

#[test]
fn test_unresponsive_adapter() {
    let mut dimm = DummyDimm::ddr4_rdimm(0);
    dimm.set_unresponsive(true);
    let mut s = session(dimm);

    let err = s.read_register(0x50, 0x00).unwrap_err();
    assert_eq!(
        err,
        Error::Transport(TransportError::NoResponse {
            expected: 1,
            received: 0
        })
    );
    assert!(err.is_transport());
    // no stop queued after the failed handshake
    assert!(s.pending().is_empty());
    assert_eq!(s.transport().flush_count(), 1);
}
