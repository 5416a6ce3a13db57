//! DDR4 SPD field extraction

use heapless::Vec;

use super::{
    bitfield, nibble_word, timing_ns, verify_crc, CasLatencies, Decoded, Geometry, MemoryType,
    ModuleType, RcdRegisters, SignalLoading, SpdInfo, Timings, CAS_MASK_BITS,
};
use crate::device::{DeviceKind, RawByteTable, SPD_TABLE_LEN};
use crate::error::{Error, Result};

// ============================================================================
// SPD byte offsets (DDR4, base configuration)
// ============================================================================

/// Bytes used / bytes total
pub const SPD_BYTES: usize = 0x00;
/// SPD revision
pub const SPD_REVISION: usize = 0x01;
/// DRAM device type
pub const SPD_MEMORY_TYPE: usize = 0x02;
/// Module type
pub const SPD_MODULE_TYPE: usize = 0x03;
/// Density and banks
pub const SPD_DENSITY_BANKS: usize = 0x04;
/// Row and column addressing
pub const SPD_ADDRESSING: usize = 0x05;
/// Primary package type
pub const SPD_PACKAGE: usize = 0x06;
/// Module organisation
pub const SPD_ORGANIZATION: usize = 0x0C;
/// Module memory bus width
pub const SPD_BUS_WIDTH: usize = 0x0D;
/// Time bases
pub const SPD_TIMEBASES: usize = 0x11;
/// First byte of the CAS latency mask
pub const SPD_CAS_MASK: usize = 0x14;

const T_CK_MIN: usize = 0x12;
const T_CK_MAX: usize = 0x13;
const T_AA: usize = 0x18;
const T_RCD: usize = 0x19;
const T_RP: usize = 0x1A;
const T_RAS_RC_UPPER: usize = 0x1B;
const T_RAS: usize = 0x1C;
const T_RC: usize = 0x1D;
const T_RFC1: usize = 0x1E;
const T_RFC2: usize = 0x20;
const T_RFC4: usize = 0x22;
const T_FAW_UPPER: usize = 0x24;
const T_FAW: usize = 0x25;
const T_RRD_S: usize = 0x26;
const T_RRD_L: usize = 0x27;
const T_CCD_L: usize = 0x28;
const T_WR_UPPER: usize = 0x29;
const T_WR: usize = 0x2A;
const T_WTR_UPPER: usize = 0x2B;
const T_WTR_S: usize = 0x2C;
const T_WTR_L: usize = 0x2D;

const FINE_CCD_L: usize = 0x75;
const FINE_RRD_L: usize = 0x76;
const FINE_RRD_S: usize = 0x77;
const FINE_RC: usize = 0x78;
const FINE_RP: usize = 0x79;
const FINE_RCD: usize = 0x7A;
const FINE_AA: usize = 0x7B;
const FINE_CK_MAX: usize = 0x7C;
const FINE_CK_MIN: usize = 0x7D;

/// Time-base bits of byte 0x11 (MTB in 3:2, FTB in 1:0); zero means 125 ps / 1 ps
const TIMEBASE_MASK: u8 = 0x0F;

/// Lowest CAS latency of the mask when byte 0x17 bit 7 is clear
const CAS_BASE_LOW: u8 = 7;
/// Lowest CAS latency of the mask when byte 0x17 bit 7 is set
const CAS_BASE_HIGH: u8 = 23;

// ============================================================================
// Field decoders
// ============================================================================

/// Reject time bases other than 125 ps (medium) and 1 ps (fine)
pub fn check_time_base(table: &[u8]) -> Result<()> {
    let tb = table[SPD_TIMEBASES];
    if tb & TIMEBASE_MASK != 0 {
        return Err(Error::UnsupportedTimeBase(tb));
    }
    Ok(())
}

/// Decode organisation, addressing and capacity
pub fn decode_geometry(table: &[u8]) -> Geometry {
    let banks = table[SPD_DENSITY_BANKS];
    let addressing = table[SPD_ADDRESSING];
    let package = table[SPD_PACKAGE];
    let organization = table[SPD_ORGANIZATION];
    let bus = table[SPD_BUS_WIDTH];

    let die_density_mbit = 256u32 << (banks & 0x07);
    let dies = bitfield(package, 3, 4) + 1;
    let signal_loading = SignalLoading::from_bits(bitfield(package, 2, 0));
    let device_width = 4u16 << bitfield(organization, 3, 0);
    let ranks = bitfield(organization, 3, 3) + 1;
    let bus_width = 8u16 << bitfield(bus, 3, 0);
    let ecc_width = if bitfield(bus, 2, 3) == 1 { 8 } else { 0 };

    let die_factor = if signal_loading == SignalLoading::SingleLoadStack {
        u32::from(dies)
    } else {
        1
    };
    let capacity_mb = (die_density_mbit / 8)
        * (u32::from(bus_width) / u32::from(device_width))
        * u32::from(ranks)
        * die_factor;

    Geometry {
        die_density_mbit,
        bank_groups: 1 << bitfield(banks, 2, 6),
        banks_per_group: 1 << (bitfield(banks, 2, 4) + 2),
        row_bits: bitfield(addressing, 3, 3) + 12,
        column_bits: bitfield(addressing, 3, 0) + 9,
        monolithic: bitfield(package, 1, 7) == 0,
        dies,
        signal_loading,
        device_width,
        ranks,
        bus_width,
        ecc_width,
        capacity_mb,
    }
}

/// Enumerate the CAS latencies set in bytes 0x14..=0x17
pub fn decode_cas_latencies(table: &[u8]) -> CasLatencies {
    let b = &table[SPD_CAS_MASK..SPD_CAS_MASK + 4];
    let mask = u32::from(b[0])
        | u32::from(b[1]) << 8
        | u32::from(b[2]) << 16
        | u32::from(b[3] & 0x3F) << 24;
    let base = if b[3] & 0x80 != 0 {
        CAS_BASE_HIGH
    } else {
        CAS_BASE_LOW
    };

    let mut list = Vec::new();
    for bit in 0..CAS_MASK_BITS {
        if mask & (1 << bit) != 0 {
            // at most CAS_MASK_BITS entries
            let _ = list.push(base + bit as u8);
        }
    }
    CasLatencies(list)
}

fn mtb_word(table: &[u8], low: usize) -> u16 {
    u16::from_le_bytes([table[low], table[low + 1]])
}

/// Decode the timing parameters
///
/// Fails without computing anything if the time bases are not 125 ps / 1 ps.
pub fn decode_timing_table(table: &[u8]) -> Result<Timings> {
    check_time_base(table)?;

    let t = |mtb: usize, ftb: usize| timing_ns(table[mtb].into(), table[ftb]);
    let ras_rc = table[T_RAS_RC_UPPER];
    let wtr = table[T_WTR_UPPER];

    Ok(Timings {
        tck_min: t(T_CK_MIN, FINE_CK_MIN),
        tck_max: t(T_CK_MAX, FINE_CK_MAX),
        taa: t(T_AA, FINE_AA),
        trcd: t(T_RCD, FINE_RCD),
        trp: t(T_RP, FINE_RP),
        tras: timing_ns(nibble_word(ras_rc, table[T_RAS]), 0),
        trc: timing_ns(nibble_word(ras_rc >> 4, table[T_RC]), table[FINE_RC]),
        trfc1: timing_ns(mtb_word(table, T_RFC1), 0),
        trfc2: timing_ns(mtb_word(table, T_RFC2), 0),
        trfc4: timing_ns(mtb_word(table, T_RFC4), 0),
        tfaw: timing_ns(nibble_word(table[T_FAW_UPPER], table[T_FAW]), 0),
        trrd_s: t(T_RRD_S, FINE_RRD_S),
        trrd_l: t(T_RRD_L, FINE_RRD_L),
        tccd_l: t(T_CCD_L, FINE_CCD_L),
        twr: timing_ns(nibble_word(table[T_WR_UPPER], table[T_WR]), 0),
        twtr_s: timing_ns(nibble_word(wtr, table[T_WTR_S]), 0),
        twtr_l: timing_ns(nibble_word(wtr >> 4, table[T_WTR_L]), 0),
    })
}

/// Decode a complete 128-byte SPD table
///
/// # Panics
///
/// Panics if `table` is shorter than 128 bytes.
pub fn decode_spd(table: &[u8]) -> Result<SpdInfo> {
    assert!(
        table.len() >= SPD_TABLE_LEN,
        "SPD table needs {} bytes, got {}",
        SPD_TABLE_LEN,
        table.len()
    );

    let timings = decode_timing_table(table)?;
    let crc = verify_crc(table);
    if !crc.is_valid() {
        log::warn!(
            "SPD CRC mismatch: stored 0x{:04X}, computed 0x{:04X}",
            crc.stored,
            crc.computed
        );
    }

    let info = SpdInfo {
        bytes_used: 128 * u16::from(bitfield(table[SPD_BYTES], 4, 0)),
        bytes_total: match bitfield(table[SPD_BYTES], 3, 4) {
            1 => 256,
            2 => 512,
            _ => 0,
        },
        revision: (
            bitfield(table[SPD_REVISION], 4, 4),
            bitfield(table[SPD_REVISION], 4, 0),
        ),
        memory_type: MemoryType::from_u8(table[SPD_MEMORY_TYPE]),
        module_type: ModuleType::from_u8(table[SPD_MODULE_TYPE]),
        geometry: decode_geometry(table),
        cas_latencies: decode_cas_latencies(table),
        timings,
        crc,
    };
    log::debug!(
        "Decoded {} {}: {} MB",
        info.memory_type.name(),
        info.module_type.name(),
        info.geometry.capacity_mb
    );
    Ok(info)
}

/// Decode a raw table according to the kind of device it was read from
///
/// # Panics
///
/// Panics if the table is shorter than the device layout.
pub fn decode(table: &RawByteTable) -> Result<Decoded> {
    let bytes = table.as_bytes();
    match table.kind() {
        DeviceKind::SpdEeprom => decode_spd(bytes).map(Decoded::Spd),
        DeviceKind::Rcd => {
            assert!(
                table.is_complete(),
                "RCD table needs {} bytes, got {}",
                DeviceKind::Rcd.table_len(),
                bytes.len()
            );
            Ok(Decoded::Rcd(RcdRegisters::from_table(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spd::fix_crc;

    /// 8 GB DDR4-2400 single-rank x8 RDIMM
    fn ddr4_table() -> [u8; 128] {
        let mut t = [0u8; 128];
        t[0x00] = 0x23;
        t[0x01] = 0x11;
        t[0x02] = 0x0C;
        t[0x03] = 0x01;
        t[0x04] = 0x85; // 8 Gb, 4 banks, 4 groups: density bits 0b0101
        t[0x05] = 0x21; // 16 row bits, 10 column bits
        t[0x0C] = 0x01; // x8, 1 rank
        t[0x0D] = 0x0B; // 64 bit + 8 bit ECC
        t[0x12] = 0x07;
        t[0x13] = 0x0C;
        t[0x14] = 0xFC;
        t[0x15] = 0x2B;
        t[0x16] = 0x00;
        t[0x17] = 0x00;
        t[0x18] = 0x6E;
        t[0x19] = 0x6E;
        t[0x1A] = 0x6E;
        t[0x1B] = 0x11;
        t[0x1C] = 0x00; // tRAS 0x100 -> 32 ns
        t[0x1D] = 0x6E; // tRC 0x16E -> 45.75 ns
        t[0x1E] = 0xF0;
        t[0x1F] = 0x0A; // tRFC1 0x0AF0 -> 350 ns
        t[0x20] = 0x20;
        t[0x21] = 0x08; // tRFC2 260 ns
        t[0x22] = 0x00;
        t[0x23] = 0x05; // tRFC4 160 ns
        t[0x24] = 0x00;
        t[0x25] = 0xA8; // tFAW 21 ns
        t[0x26] = 0x1B;
        t[0x27] = 0x28;
        t[0x28] = 0x28;
        t[0x29] = 0x00;
        t[0x2A] = 0x78; // tWR 15 ns
        t[0x2B] = 0x00;
        t[0x2C] = 0x14; // tWTR_S 2.5 ns
        t[0x2D] = 0x3C; // tWTR_L 7.5 ns
        t[0x7D] = 0xD6; // tCKmin fine -42
        fix_crc(&mut t);
        t
    }

    #[test]
    fn test_zero_geometry() {
        let g = decode_geometry(&[0u8; 128]);
        assert_eq!(g.bank_groups, 1);
        assert_eq!(g.banks_per_group, 4);
        assert_eq!(g.banks(), 4);
        assert_eq!(g.rows(), 1 << 12);
        assert_eq!(g.columns(), 1 << 9);
        assert_eq!(g.device_width, 4);
        assert_eq!(g.ranks, 1);
    }

    #[test]
    fn test_geometry_capacity() {
        let g = decode_geometry(&ddr4_table());
        assert_eq!(g.die_density_mbit, 8192);
        assert_eq!(g.bank_groups, 4);
        assert_eq!(g.banks_per_group, 4);
        assert_eq!(g.row_bits, 16);
        assert_eq!(g.column_bits, 10);
        assert_eq!(g.device_width, 8);
        assert_eq!(g.bus_width, 64);
        assert_eq!(g.ecc_width, 8);
        assert_eq!(g.capacity_mb, 8192);
    }

    #[test]
    fn test_capacity_counts_dies_only_for_3ds() {
        let mut t = ddr4_table();
        t[0x06] = 0b1001_0010; // non-monolithic, 2 dies, single load stack
        assert_eq!(decode_geometry(&t).capacity_mb, 16384);

        t[0x06] = 0b1001_0001; // multi load stack
        assert_eq!(decode_geometry(&t).capacity_mb, 8192);
    }

    #[test]
    fn test_cas_single_bit() {
        for k in 0..CAS_MASK_BITS {
            let mut t = [0u8; 128];
            let mask = 1u32 << k;
            t[0x14..0x18].copy_from_slice(&mask.to_le_bytes());
            assert_eq!(decode_cas_latencies(&t).as_slice(), &[7 + k as u8]);

            t[0x17] |= 0x80;
            assert_eq!(decode_cas_latencies(&t).as_slice(), &[23 + k as u8]);
        }
    }

    #[test]
    fn test_cas_list_sorted() {
        let cl = decode_cas_latencies(&ddr4_table());
        assert_eq!(cl.as_slice(), &[9, 10, 11, 12, 13, 14, 15, 16, 18, 20]);
        assert!(cl.contains(16));
        assert!(!cl.contains(17));
    }

    #[test]
    fn test_timings() {
        let tm = decode_timing_table(&ddr4_table()).unwrap();
        assert!((tm.tck_min - 0.833).abs() < 1e-9);
        assert_eq!(tm.tck_max, 1.5);
        assert_eq!(tm.taa, 13.75);
        assert_eq!(tm.trcd, 13.75);
        assert_eq!(tm.trp, 13.75);
        assert_eq!(tm.tras, 32.0);
        assert_eq!(tm.trc, 45.75);
        assert_eq!(tm.trfc1, 350.0);
        assert_eq!(tm.trfc2, 260.0);
        assert_eq!(tm.trfc4, 160.0);
        assert_eq!(tm.tfaw, 21.0);
        assert_eq!(tm.trrd_s, 3.375);
        assert_eq!(tm.trrd_l, 5.0);
        assert_eq!(tm.tccd_l, 5.0);
        assert_eq!(tm.twr, 15.0);
        assert_eq!(tm.twtr_s, 2.5);
        assert_eq!(tm.twtr_l, 7.5);
    }

    #[test]
    fn test_unsupported_time_base() {
        let mut t = ddr4_table();
        t[0x11] = 0x01;
        assert_eq!(decode_timing_table(&t), Err(Error::UnsupportedTimeBase(0x01)));
        assert_eq!(decode_spd(&t), Err(Error::UnsupportedTimeBase(0x01)));
    }

    #[test]
    fn test_decode_reports_ddr4() {
        let table = RawByteTable::from_bytes(DeviceKind::SpdEeprom, &ddr4_table()).unwrap();
        let Decoded::Spd(info) = decode(&table).unwrap() else {
            panic!("expected SPD decode");
        };
        assert_eq!(info.memory_type.name(), "DDR4 SDRAM");
        assert_eq!(info.module_type, ModuleType::Rdimm);
        assert_eq!(info.bytes_used, 384);
        assert_eq!(info.bytes_total, 512);
        assert_eq!(info.revision, (1, 1));
        assert!(info.crc.is_valid());

        let fields = Decoded::Spd(info).fields();
        assert!(fields
            .iter()
            .any(|(name, value)| *name == "Memory Type"
                && *value == crate::spd::DecodedField::Label("DDR4 SDRAM")));
    }

    #[test]
    fn test_crc_mismatch_is_not_fatal() {
        let mut t = ddr4_table();
        t[0x7E] ^= 0xFF;
        let info = decode_spd(&t).unwrap();
        assert!(!info.crc.is_valid());
    }

    #[test]
    #[should_panic]
    fn test_short_table_panics() {
        let _ = decode_spd(&[0u8; 64]);
    }
}
