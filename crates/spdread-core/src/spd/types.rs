//! Decoded SPD and RCD types

use core::fmt;

use heapless::Vec;

use super::CrcStatus;
use crate::device::{RCD_GROUP_COUNT, RCD_GROUP_LEN, RCD_REGISTER_STRIDE};

/// Number of bits in the CAS latency mask
pub const CAS_MASK_BITS: usize = 30;

/// Upper bound on the number of entries returned by [`Decoded::fields`]
pub const MAX_FIELDS: usize = 48;

/// Number of RCD control registers covered by a table
pub const RCD_REGISTER_COUNT: usize = RCD_GROUP_COUNT * RCD_REGISTER_STRIDE as usize;

// ============================================================================
// Memory and module types
// ============================================================================

/// DRAM device type (SPD byte 0x02)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryType {
    /// DDR3 SDRAM
    Ddr3,
    /// DDR4 SDRAM
    Ddr4,
    /// DDR4E SDRAM
    Ddr4e,
    /// LPDDR3 SDRAM
    Lpddr3,
    /// LPDDR4 SDRAM
    Lpddr4,
    /// LPDDR4X SDRAM
    Lpddr4x,
    /// DDR5 SDRAM
    Ddr5,
    /// Anything else
    Unknown(u8),
}

impl MemoryType {
    /// Decode the key byte
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x0B => Self::Ddr3,
            0x0C => Self::Ddr4,
            0x0E => Self::Ddr4e,
            0x0F => Self::Lpddr3,
            0x10 => Self::Lpddr4,
            0x11 => Self::Lpddr4x,
            0x12 => Self::Ddr5,
            other => Self::Unknown(other),
        }
    }

    /// Display label
    pub fn name(self) -> &'static str {
        match self {
            Self::Ddr3 => "DDR3 SDRAM",
            Self::Ddr4 => "DDR4 SDRAM",
            Self::Ddr4e => "DDR4E SDRAM",
            Self::Lpddr3 => "LPDDR3 SDRAM",
            Self::Lpddr4 => "LPDDR4 SDRAM",
            Self::Lpddr4x => "LPDDR4X SDRAM",
            Self::Ddr5 => "DDR5 SDRAM",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// Base module type (SPD byte 0x03, bits 3:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    /// Extended module type
    Extended,
    /// Registered DIMM
    Rdimm,
    /// Unbuffered DIMM
    Udimm,
    /// Unbuffered SO-DIMM
    SoDimm,
    /// Load-reduced DIMM
    Lrdimm,
    /// Mini registered DIMM
    MiniRdimm,
    /// Mini unbuffered DIMM
    MiniUdimm,
    /// 72-bit registered SO-DIMM
    SoRdimm72,
    /// 72-bit unbuffered SO-DIMM
    SoUdimm72,
    /// 16-bit SO-DIMM
    SoDimm16,
    /// 32-bit SO-DIMM
    SoDimm32,
    /// Reserved encoding
    Reserved(u8),
}

impl ModuleType {
    /// Decode the low nibble of the module type byte
    pub fn from_u8(value: u8) -> Self {
        match value & 0x0F {
            0x0 => Self::Extended,
            0x1 => Self::Rdimm,
            0x2 => Self::Udimm,
            0x3 => Self::SoDimm,
            0x4 => Self::Lrdimm,
            0x5 => Self::MiniRdimm,
            0x6 => Self::MiniUdimm,
            0x8 => Self::SoRdimm72,
            0x9 => Self::SoUdimm72,
            0xC => Self::SoDimm16,
            0xD => Self::SoDimm32,
            other => Self::Reserved(other),
        }
    }

    /// Display label
    pub fn name(self) -> &'static str {
        match self {
            Self::Extended => "Extended",
            Self::Rdimm => "RDIMM",
            Self::Udimm => "UDIMM",
            Self::SoDimm => "SO-DIMM",
            Self::Lrdimm => "LRDIMM",
            Self::MiniRdimm => "Mini-RDIMM",
            Self::MiniUdimm => "Mini-UDIMM",
            Self::SoRdimm72 => "72b-SO-RDIMM",
            Self::SoUdimm72 => "72b-SO-UDIMM",
            Self::SoDimm16 => "16b-SO-DIMM",
            Self::SoDimm32 => "32b-SO-DIMM",
            Self::Reserved(_) => "Reserved",
        }
    }

    /// Whether modules of this type carry a registering clock driver
    pub fn has_rcd(self) -> bool {
        matches!(
            self,
            Self::Rdimm | Self::Lrdimm | Self::MiniRdimm | Self::SoRdimm72
        )
    }
}

/// Stack signal loading (SPD byte 0x06, bits 1:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalLoading {
    /// Not specified (monolithic or DDP/QDP)
    NotSpecified,
    /// Multi load stack
    MultiLoadStack,
    /// Single load stack (3DS)
    SingleLoadStack,
    /// Reserved encoding
    Reserved,
}

impl SignalLoading {
    /// Decode the two-bit field
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::NotSpecified,
            1 => Self::MultiLoadStack,
            2 => Self::SingleLoadStack,
            _ => Self::Reserved,
        }
    }

    /// Display label
    pub fn name(self) -> &'static str {
        match self {
            Self::NotSpecified => "Not specified",
            Self::MultiLoadStack => "Multi load stack",
            Self::SingleLoadStack => "Single load stack (3DS)",
            Self::Reserved => "Reserved",
        }
    }
}

// ============================================================================
// Geometry and timings
// ============================================================================

/// Module organisation and addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// SDRAM die density in Mbit
    pub die_density_mbit: u32,
    /// Number of bank groups
    pub bank_groups: u8,
    /// Banks in each bank group
    pub banks_per_group: u8,
    /// Row address bits
    pub row_bits: u8,
    /// Column address bits
    pub column_bits: u8,
    /// Whether the package holds a single die
    pub monolithic: bool,
    /// Dies per package
    pub dies: u8,
    /// Stack signal loading
    pub signal_loading: SignalLoading,
    /// SDRAM device width in bits
    pub device_width: u16,
    /// Package ranks per DIMM
    pub ranks: u8,
    /// Primary bus width in bits
    pub bus_width: u16,
    /// Bus width extension (ECC) in bits
    pub ecc_width: u8,
    /// Module capacity in MB
    pub capacity_mb: u32,
}

impl Geometry {
    /// Total banks per device
    pub fn banks(&self) -> u32 {
        u32::from(self.bank_groups) * u32::from(self.banks_per_group)
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        1 << self.row_bits
    }

    /// Number of columns
    pub fn columns(&self) -> u32 {
        1 << self.column_bits
    }
}

/// Supported CAS latencies in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CasLatencies(pub(crate) Vec<u8, CAS_MASK_BITS>);

impl CasLatencies {
    /// Latencies as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Whether `cl` is supported
    pub fn contains(&self, cl: u8) -> bool {
        self.0.contains(&cl)
    }

    /// Number of supported latencies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no latency is supported
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CasLatencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cl) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", cl)?;
        }
        Ok(())
    }
}

/// SDRAM timing parameters in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timings {
    /// Minimum cycle time (tCKAVGmin)
    pub tck_min: f64,
    /// Maximum cycle time (tCKAVGmax)
    pub tck_max: f64,
    /// CAS latency time (tAAmin)
    pub taa: f64,
    /// RAS to CAS delay (tRCDmin)
    pub trcd: f64,
    /// Row precharge delay (tRPmin)
    pub trp: f64,
    /// Active to precharge delay (tRASmin)
    pub tras: f64,
    /// Active to active/refresh delay (tRCmin)
    pub trc: f64,
    /// Refresh recovery delay (tRFC1min)
    pub trfc1: f64,
    /// Refresh recovery delay, 2x mode (tRFC2min)
    pub trfc2: f64,
    /// Refresh recovery delay, 4x mode (tRFC4min)
    pub trfc4: f64,
    /// Four activate window (tFAWmin)
    pub tfaw: f64,
    /// Activate to activate, different bank group (tRRD_Smin)
    pub trrd_s: f64,
    /// Activate to activate, same bank group (tRRD_Lmin)
    pub trrd_l: f64,
    /// CAS to CAS, same bank group (tCCD_Lmin)
    pub tccd_l: f64,
    /// Write recovery time (tWRmin)
    pub twr: f64,
    /// Write to read, different bank group (tWTR_Smin)
    pub twtr_s: f64,
    /// Write to read, same bank group (tWTR_Lmin)
    pub twtr_l: f64,
}

impl Timings {
    /// Named timings in report order
    pub fn named(&self) -> [(&'static str, f64); 17] {
        [
            ("tCKAVGmin", self.tck_min),
            ("tCKAVGmax", self.tck_max),
            ("tAA", self.taa),
            ("tRCD", self.trcd),
            ("tRP", self.trp),
            ("tRAS", self.tras),
            ("tRC", self.trc),
            ("tRFC1", self.trfc1),
            ("tRFC2", self.trfc2),
            ("tRFC4", self.trfc4),
            ("tFAW", self.tfaw),
            ("tRRD_S", self.trrd_s),
            ("tRRD_L", self.trrd_l),
            ("tCCD_L", self.tccd_l),
            ("tWR", self.twr),
            ("tWTR_S", self.twtr_s),
            ("tWTR_L", self.twtr_l),
        ]
    }
}

/// Everything decoded from an SPD table
#[derive(Debug, Clone, PartialEq)]
pub struct SpdInfo {
    /// SPD bytes used by the module (0 if undefined)
    pub bytes_used: u16,
    /// SPD device size in bytes (0 if undefined)
    pub bytes_total: u16,
    /// SPD revision (major, minor)
    pub revision: (u8, u8),
    /// DRAM device type
    pub memory_type: MemoryType,
    /// Base module type
    pub module_type: ModuleType,
    /// Organisation and addressing
    pub geometry: Geometry,
    /// Supported CAS latencies
    pub cas_latencies: CasLatencies,
    /// Timing parameters
    pub timings: Timings,
    /// Base-configuration checksum
    pub crc: CrcStatus,
}

/// Raw RCD control registers and per-block status bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcdRegisters {
    /// Status byte returned with each block
    pub status: [u8; RCD_GROUP_COUNT],
    /// Registers 0x00..0x1F
    pub registers: [u8; RCD_REGISTER_COUNT],
}

impl RcdRegisters {
    /// Split a 40-byte table into status and register bytes
    pub fn from_table(bytes: &[u8]) -> Self {
        let mut regs = Self {
            status: [0; RCD_GROUP_COUNT],
            registers: [0; RCD_REGISTER_COUNT],
        };
        let stride = RCD_REGISTER_STRIDE as usize;
        for (group, chunk) in bytes
            .chunks_exact(RCD_GROUP_LEN)
            .take(RCD_GROUP_COUNT)
            .enumerate()
        {
            regs.status[group] = chunk[0];
            regs.registers[group * stride..(group + 1) * stride].copy_from_slice(&chunk[1..]);
        }
        regs
    }
}

// ============================================================================
// Report view
// ============================================================================

/// One decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedField {
    /// Enumerated label
    Label(&'static str),
    /// Plain count
    Count(u32),
    /// Width in bits
    Bits(u32),
    /// Size in megabits
    Megabits(u32),
    /// Size in megabytes
    Megabytes(u32),
    /// Duration in nanoseconds
    Nanoseconds(f64),
    /// Version number
    Revision(u8, u8),
    /// CAS latency list
    Latencies(CasLatencies),
    /// Raw register byte
    Hex(u8),
    /// Checksum comparison
    Crc(CrcStatus),
}

impl fmt::Display for DecodedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(s) => write!(f, "{}", s),
            Self::Count(n) => write!(f, "{}", n),
            Self::Bits(n) => write!(f, "{} bits", n),
            Self::Megabits(n) => write!(f, "{} Mb", n),
            Self::Megabytes(n) => write!(f, "{} MB", n),
            Self::Nanoseconds(ns) => write!(f, "{:.3} ns", ns),
            Self::Revision(major, minor) => write!(f, "{}.{}", major, minor),
            Self::Latencies(cl) => write!(f, "{}", cl),
            Self::Hex(b) => write!(f, "0x{:02X}", b),
            Self::Crc(crc) if crc.is_valid() => write!(f, "0x{:04X} (OK)", crc.stored),
            Self::Crc(crc) => write!(
                f,
                "0x{:04X} (MISMATCH, computed 0x{:04X})",
                crc.stored, crc.computed
            ),
        }
    }
}

/// Named fields in report order
pub type FieldList = Vec<(&'static str, DecodedField), MAX_FIELDS>;

/// Result of decoding a raw table
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// SPD EEPROM contents
    Spd(SpdInfo),
    /// RCD registers
    Rcd(RcdRegisters),
}

static RCD_REGISTER_NAMES: [&str; RCD_REGISTER_COUNT] = [
    "RW00", "RW01", "RW02", "RW03", "RW04", "RW05", "RW06", "RW07", //
    "RW08", "RW09", "RW0A", "RW0B", "RW0C", "RW0D", "RW0E", "RW0F", //
    "RW10", "RW11", "RW12", "RW13", "RW14", "RW15", "RW16", "RW17", //
    "RW18", "RW19", "RW1A", "RW1B", "RW1C", "RW1D", "RW1E", "RW1F",
];

static RCD_STATUS_NAMES: [&str; RCD_GROUP_COUNT] = [
    "Status RW00-03",
    "Status RW04-07",
    "Status RW08-0B",
    "Status RW0C-0F",
    "Status RW10-13",
    "Status RW14-17",
    "Status RW18-1B",
    "Status RW1C-1F",
];

fn push(fields: &mut FieldList, name: &'static str, value: DecodedField) {
    if fields.push((name, value)).is_err() {
        panic!("decoded field list overflow (capacity {})", MAX_FIELDS);
    }
}

impl Decoded {
    /// Flatten into `(name, value)` pairs
    pub fn fields(&self) -> FieldList {
        let mut fields = FieldList::new();
        match self {
            Self::Spd(info) => {
                let g = &info.geometry;
                push(&mut fields, "SPD Bytes Used", DecodedField::Count(info.bytes_used.into()));
                push(&mut fields, "SPD Bytes Total", DecodedField::Count(info.bytes_total.into()));
                push(
                    &mut fields,
                    "SPD Revision",
                    DecodedField::Revision(info.revision.0, info.revision.1),
                );
                push(&mut fields, "Memory Type", DecodedField::Label(info.memory_type.name()));
                push(&mut fields, "Module Type", DecodedField::Label(info.module_type.name()));
                push(&mut fields, "Die Density", DecodedField::Megabits(g.die_density_mbit));
                push(&mut fields, "Bank Groups", DecodedField::Count(g.bank_groups.into()));
                push(&mut fields, "Banks per Group", DecodedField::Count(g.banks_per_group.into()));
                push(&mut fields, "Row Address Bits", DecodedField::Bits(g.row_bits.into()));
                push(&mut fields, "Column Address Bits", DecodedField::Bits(g.column_bits.into()));
                push(
                    &mut fields,
                    "Package",
                    DecodedField::Label(if g.monolithic { "Monolithic" } else { "Non-monolithic" }),
                );
                push(&mut fields, "Die Count", DecodedField::Count(g.dies.into()));
                push(&mut fields, "Signal Loading", DecodedField::Label(g.signal_loading.name()));
                push(&mut fields, "Device Width", DecodedField::Bits(g.device_width.into()));
                push(&mut fields, "Ranks", DecodedField::Count(g.ranks.into()));
                push(&mut fields, "Bus Width", DecodedField::Bits(g.bus_width.into()));
                push(&mut fields, "ECC Width", DecodedField::Bits(g.ecc_width.into()));
                push(&mut fields, "Capacity", DecodedField::Megabytes(g.capacity_mb));
                push(
                    &mut fields,
                    "CAS Latencies",
                    DecodedField::Latencies(info.cas_latencies.clone()),
                );
                for (name, ns) in info.timings.named() {
                    push(&mut fields, name, DecodedField::Nanoseconds(ns));
                }
                push(&mut fields, "CRC", DecodedField::Crc(info.crc));
            }
            Self::Rcd(regs) => {
                for (group, &status) in regs.status.iter().enumerate() {
                    push(&mut fields, RCD_STATUS_NAMES[group], DecodedField::Hex(status));
                    let stride = RCD_REGISTER_STRIDE as usize;
                    for reg in group * stride..(group + 1) * stride {
                        push(&mut fields, RCD_REGISTER_NAMES[reg], DecodedField::Hex(regs.registers[reg]));
                    }
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_memory_type_labels() {
        assert_eq!(MemoryType::from_u8(0x0C), MemoryType::Ddr4);
        assert_eq!(MemoryType::from_u8(0x0C).name(), "DDR4 SDRAM");
        assert_eq!(MemoryType::from_u8(0x42), MemoryType::Unknown(0x42));
    }

    #[test]
    fn test_module_type_rcd() {
        assert!(ModuleType::from_u8(0x01).has_rcd());
        assert!(ModuleType::from_u8(0x84).has_rcd());
        assert!(!ModuleType::from_u8(0x02).has_rcd());
        assert_eq!(ModuleType::from_u8(0x0F), ModuleType::Reserved(0x0F));
    }

    #[test]
    fn test_field_display() {
        assert_eq!(DecodedField::Nanoseconds(13.75).to_string(), "13.750 ns");
        assert_eq!(DecodedField::Megabytes(8192).to_string(), "8192 MB");
        assert_eq!(DecodedField::Hex(0x0A).to_string(), "0x0A");

        let mut cl = CasLatencies::default();
        for n in [9u8, 10, 11] {
            cl.0.push(n).unwrap();
        }
        assert_eq!(DecodedField::Latencies(cl).to_string(), "9 10 11");

        let bad = CrcStatus {
            stored: 0x1234,
            computed: 0xABCD,
        };
        assert_eq!(
            DecodedField::Crc(bad).to_string(),
            "0x1234 (MISMATCH, computed 0xABCD)"
        );
    }

    #[test]
    fn test_rcd_fields() {
        let mut bytes = [0u8; RCD_GROUP_COUNT * RCD_GROUP_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let regs = RcdRegisters::from_table(&bytes);
        assert_eq!(regs.status[1], 5);
        assert_eq!(regs.registers[4], 6);
        assert_eq!(regs.registers[0x1F], 39);

        let fields = Decoded::Rcd(regs).fields();
        assert_eq!(fields.len(), 40);
        assert_eq!(fields[0], ("Status RW00-03", DecodedField::Hex(0)));
        assert_eq!(fields[6], ("RW04", DecodedField::Hex(6)));
    }
}
