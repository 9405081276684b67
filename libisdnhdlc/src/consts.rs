//! Flag octets, CRC parameters, and the bit patterns used by the fast paths.

pub mod flags {
    /// Frame delimiter, `01111110`.
    pub const FLAG: u8 = 0x7E;

    /// Line idle, all ones. Seven or more ones inside a frame abort it.
    pub const IDLE: u8 = 0xFF;
}

pub mod crc {
    /// CRC-16/HDLC generator `x^16 + x^12 + x^5 + 1`, reflected.
    pub const POLYNOMIAL: u16 = 0x8408;

    /// Register value at the start of each frame.
    pub const INIT: u16 = 0xFFFF;

    /// Register value after running a good frame, including its
    /// complemented CRC, through the CRC.
    pub const RESIDUE: u16 = 0xF0B8;
}

/// Octet patterns for skipping runs of flags or idle a whole octet at a
/// time.
///
/// All patterns are in scan order, i.e. the next bit on the line is the
/// MSB. Indices are the number of bits left in the current octet,
/// including the current one.
pub mod fast {
    /// Rest of the octet after the last bit of a flag, if it holds
    /// nothing but the start of another flag.
    pub const FLAG: [u8; 9] = [0x00, 0x00, 0x00, 0x20, 0x30, 0x38, 0x3c, 0x3e, 0x3f];

    /// Octet seen on a line of back-to-back flags after a flag ended
    /// with the given number of bits left.
    pub const FLAG_VALUE: [u8; 9] = [0x00, 0x7e, 0xfc, 0xf9, 0xf3, 0xe7, 0xcf, 0x9f, 0x3f];

    /// Top `n - 1` bits set.
    pub const ABORT: [u8; 10] = [0x00, 0x00, 0x80, 0xc0, 0xe0, 0xf0, 0xf8, 0xfc, 0xfe, 0xff];

    /// Repeating flag octet for the transmitter, indexed by the number
    /// of closing flag bits still waiting in the output octet. The
    /// octet starts with exactly those bits.
    pub const TX_FLAG_VALUE: [u8; 9] = [0x7e, 0x3f, 0x9f, 0xcf, 0xe7, 0xf3, 0xf9, 0xfc, 0x7e];
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fast_flag_tables() {
        for k in 1..=8u32 {
            assert_eq!(fast::FLAG_VALUE[k as usize], flags::FLAG.rotate_left(k - 1));
        }

        for k in 2..=8usize {
            // a zero, then the leading zero and ones of the next flag
            let ones = (1u8 << (k - 2)) - 1;
            assert_eq!(fast::FLAG[k], ones << (8 - k));
        }

        for d in 0..=8u32 {
            assert_eq!(fast::TX_FLAG_VALUE[d as usize], flags::FLAG.rotate_right(d));
        }
    }

    #[test]
    fn test_fast_abort_table() {
        for n in 1..=9usize {
            let mask = !(0xffffu16 >> (n - 1)) >> 8;
            assert_eq!(fast::ABORT[n], mask as u8);
        }
        assert_eq!(fast::ABORT[0], 0x00);
    }
}
