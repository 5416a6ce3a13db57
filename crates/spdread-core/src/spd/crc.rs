//! SPD checksum

/// Last byte covered by the base-configuration CRC
pub const SPD_CRC_END: usize = 0x7D;

/// Offset of the stored CRC (LSB first)
pub const SPD_CRC_OFFSET: usize = 0x7E;

const CRC16_POLY: u16 = 0x1021;

/// CRC-16 as used by JEDEC SPD (polynomial 0x1021, initial value 0)
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Stored and recomputed base-configuration checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcStatus {
    /// Value found at bytes 0x7E/0x7F
    pub stored: u16,
    /// Value computed over bytes 0x00..=0x7D
    pub computed: u16,
}

impl CrcStatus {
    /// Whether the stored checksum matches the table contents
    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

/// Compute and compare the checksum of a 128-byte SPD table
pub fn verify_crc(table: &[u8]) -> CrcStatus {
    CrcStatus {
        stored: u16::from_le_bytes([table[SPD_CRC_OFFSET], table[SPD_CRC_OFFSET + 1]]),
        computed: crc16(&table[..=SPD_CRC_END]),
    }
}

/// Write the checksum of bytes 0x00..=0x7D into bytes 0x7E/0x7F
pub fn fix_crc(table: &mut [u8]) {
    let crc = crc16(&table[..=SPD_CRC_END]).to_le_bytes();
    table[SPD_CRC_OFFSET..SPD_CRC_OFFSET + 2].copy_from_slice(&crc);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16(b"123456789"), 0x31C3);
        assert_eq!(crc16(&[]), 0);
    }

    #[test]
    fn test_verify_after_fix() {
        let mut table = [0u8; 128];
        table[0x02] = 0x0C;
        table[0x12] = 0x07;
        assert!(!verify_crc(&table).is_valid());

        fix_crc(&mut table);
        let status = verify_crc(&table);
        assert!(status.is_valid());
        assert_eq!(status.stored, crc16(&table[..0x7E]));
    }
}
