//! Default device contents

use spdread_core::spd::{fix_crc, RCD_REGISTER_COUNT};

/// Size of an EE1004 SPD EEPROM
pub const EEPROM_SIZE: usize = 512;

/// SPD image of an 8 GB DDR4-2400 single-rank x8 registered DIMM
///
/// CL 9-16, 18, 20; tAA/tRCD/tRP 13.75 ns. The base-configuration CRC is
/// valid.
pub fn ddr4_rdimm_spd() -> Vec<u8> {
    let mut spd = vec![0u8; EEPROM_SIZE];
    let base: [(usize, u8); 38] = [
        (0x00, 0x23), // 384 bytes used, 512 total
        (0x01, 0x11), // revision 1.1
        (0x02, 0x0C), // DDR4 SDRAM
        (0x03, 0x01), // RDIMM
        (0x04, 0x85), // 8 Gb, 4 bank groups of 4 banks
        (0x05, 0x21), // 16 row bits, 10 column bits
        (0x06, 0x00), // monolithic
        (0x0B, 0x03), // 1.2 V
        (0x0C, 0x01), // x8, 1 rank
        (0x0D, 0x0B), // 64 bit + ECC
        (0x11, 0x00), // 125 ps / 1 ps
        (0x12, 0x07), // tCKAVGmin
        (0x13, 0x0C), // tCKAVGmax
        (0x14, 0xFC),
        (0x15, 0x2B),
        (0x16, 0x00),
        (0x17, 0x00),
        (0x18, 0x6E), // tAA
        (0x19, 0x6E), // tRCD
        (0x1A, 0x6E), // tRP
        (0x1B, 0x11),
        (0x1C, 0x00), // tRAS
        (0x1D, 0x6E), // tRC
        (0x1E, 0xF0),
        (0x1F, 0x0A), // tRFC1
        (0x20, 0x20),
        (0x21, 0x08), // tRFC2
        (0x22, 0x00),
        (0x23, 0x05), // tRFC4
        (0x25, 0xA8), // tFAW
        (0x26, 0x1B), // tRRD_S
        (0x27, 0x28), // tRRD_L
        (0x28, 0x28), // tCCD_L
        (0x2A, 0x78), // tWR
        (0x2C, 0x14), // tWTR_S
        (0x2D, 0x3C), // tWTR_L
        (0x7D, 0xD6), // tCKAVGmin fine
        (0x7C, 0x00),
    ];
    for (offset, value) in base {
        spd[offset] = value;
    }
    fix_crc(&mut spd[..128]);

    // Module part number
    spd[0x149..0x149 + 16].copy_from_slice(b"SPDREAD-DUMMY-01");
    spd
}

/// RCD register contents after power-up
pub fn ddr4_rcd_registers() -> [u8; RCD_REGISTER_COUNT] {
    let mut regs = [0u8; RCD_REGISTER_COUNT];
    // vendor and device ID
    regs[..4].copy_from_slice(&[0xB3, 0x04, 0x31, 0x00]);
    // revision
    regs[4] = 0xB0;
    regs
}

#[cfg(test)]
mod tests {
    use super::*;
    use spdread_core::spd::verify_crc;

    #[test]
    fn test_image_crc_valid() {
        let spd = ddr4_rdimm_spd();
        assert_eq!(spd.len(), EEPROM_SIZE);
        assert!(verify_crc(&spd).is_valid());
    }
}
