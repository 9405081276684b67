//! CRC-16/HDLC, the frame check sequence of HDLC (also known as CRC-16/X-25).

use crate::consts;


/// Lookup table for the reflected generator, one entry per octet value.
pub const TABLE: [u16; 256] = table(consts::crc::POLYNOMIAL);

const fn table(poly: u16) -> [u16; 256] {
    let mut table = [0; 256];

    let mut i = 0;
    while i < table.len() {
        let mut crc = i as u16;

        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
            bit += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Feed one octet into a running CRC register.
#[inline]
pub fn update(crc: u16, byte: u8) -> u16 {
    (crc >> 8) ^ TABLE[((crc ^ byte as u16) & 0xff) as usize]
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    register: u16,
}

impl Crc16 {
    pub fn new() -> Self {
        Self { register: consts::crc::INIT }
    }

    pub fn put_u8(&mut self, byte: u8) -> &mut Self {
        self.register = update(self.register, byte);
        self
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for b in bytes {
            self.put_u8(*b);
        }
        self
    }

    /// Raw register contents.
    pub fn register(&self) -> u16 {
        self.register
    }

    /// Frame check sequence, i.e. the complemented register. Sent low
    /// octet first.
    pub fn value(&self) -> u16 {
        !self.register
    }

    /// Whether the data fed so far was a frame followed by its correct
    /// check sequence.
    pub fn is_residue(&self) -> bool {
        self.register == consts::crc::RESIDUE
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}


pub fn crc16(data: &[u8]) -> u16 {
    Crc16::new().put_bytes(data).value()
}
