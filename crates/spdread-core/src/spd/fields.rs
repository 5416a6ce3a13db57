//! Bit-level helpers and the dual time-base conversion

/// Medium time base in picoseconds
pub const MTB_PS: i32 = 125;

/// Fine time base in picoseconds
pub const FTB_PS: i32 = 1;

/// Extract `width` bits of `byte` starting at bit `shift`
#[inline]
pub const fn bitfield(byte: u8, width: u32, shift: u32) -> u8 {
    (byte >> shift) & ((1u16 << width) - 1) as u8
}

/// Interpret a byte as a signed 8-bit value
#[inline]
pub const fn twos_complement(byte: u8) -> i32 {
    byte as i8 as i32
}

/// Convert a medium/fine time-base pair to nanoseconds
///
/// `medium` is an unsigned count of [`MTB_PS`] units; `fine` is a signed
/// correction in [`FTB_PS`] units.
pub fn timing_ns(medium: u16, fine: u8) -> f64 {
    timing_ns_with_units(medium, fine, MTB_PS, FTB_PS)
}

/// [`timing_ns`] with explicit time-base units
pub fn timing_ns_with_units(medium: u16, fine: u8, medium_unit_ps: i32, fine_unit_ps: i32) -> f64 {
    let ps = i32::from(medium) * medium_unit_ps + twos_complement(fine) * fine_unit_ps;
    f64::from(ps) / 1000.0
}

/// Join a 4-bit high part and a byte into a 12-bit count
#[inline]
pub const fn nibble_word(high: u8, low: u8) -> u16 {
    ((high as u16 & 0x0F) << 8) | low as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitfield() {
        assert_eq!(bitfield(0b1011_0110, 2, 6), 0b10);
        assert_eq!(bitfield(0b1011_0110, 3, 3), 0b110);
        assert_eq!(bitfield(0xFF, 8, 0), 0xFF);
        assert_eq!(bitfield(0x5A, 1, 0), 0);
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(twos_complement(0x00), 0);
        assert_eq!(twos_complement(0x7F), 127);
        assert_eq!(twos_complement(0x80), -128);
        assert_eq!(twos_complement(0xFF), -1);
        assert_eq!(twos_complement(0xD6), -42);
    }

    #[test]
    fn test_timing_medium_only() {
        for m in [0u16, 1, 8, 100, 255, 0x0FFF] {
            assert_eq!(timing_ns(m, 0), f64::from(m) * 125.0 / 1000.0);
        }
    }

    #[test]
    fn test_timing_fine_step_is_linear() {
        for m in [0u16, 7, 110] {
            for f in -128i32..=126 {
                let a = timing_ns(m, f as i8 as u8);
                let b = timing_ns(m, (f + 1) as i8 as u8);
                assert!((b - a - 0.001).abs() < 1e-9, "m={} f={}", m, f);
            }
        }
    }

    #[test]
    fn test_timing_known_values() {
        // tCKAVGmin of DDR4-2400: 7 MTB, -42 FTB
        assert!((timing_ns(0x07, 0xD6) - 0.833).abs() < 1e-9);
        // tAA of 13.75 ns: 110 MTB, 0 FTB
        assert_eq!(timing_ns(0x6E, 0x00), 13.75);
    }

    #[test]
    fn test_nibble_word() {
        assert_eq!(nibble_word(0x11, 0x40), 0x140);
        assert_eq!(nibble_word(0xF0, 0xFF), 0x0FF);
    }
}
