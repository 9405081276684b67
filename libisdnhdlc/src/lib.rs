//! Bit-level HDLC codec for transparent ISDN channels.
//!
//! Converts the raw bitstream of a B- or D-channel into HDLC frames and
//! back: flag and abort detection, bit (de-)stuffing, and CRC-16/HDLC
//! generation and checking. Both directions are plain state machines
//! operating on caller-supplied buffers, see [`decoder::decode`] and
//! [`encoder::encode`]. The [`codec`] module wraps them for use with
//! `tokio_util`.

pub mod codec;
pub mod consts;
pub mod crc;
pub mod decoder;
pub mod encoder;

pub use codec::Codec;
pub use decoder::Decoder;
pub use encoder::Encoder;


/// ISDN channel type.
///
/// The two only differ in what the transmitter sends between frames:
/// repeated flags on a bearer channel, all-ones idle on a signalling
/// channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    /// Bearer channel.
    #[default]
    B,

    /// Signalling channel.
    D,
}

/// Per-direction construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub channel: Channel,

    /// 56 kbit/s rate adaptation: only 7 bits of each octet carry HDLC
    /// data, the 8th is always set.
    pub adapt56: bool,

    /// Raw octets carry the first bit on the line in their MSB instead
    /// of their LSB.
    pub bit_reverse: bool,
}

impl Config {
    pub fn b_channel() -> Self {
        Self { channel: Channel::B, ..Default::default() }
    }

    pub fn d_channel() -> Self {
        Self { channel: Channel::D, ..Default::default() }
    }

    pub fn with_adapt56(self, adapt56: bool) -> Self {
        Self { adapt56, ..self }
    }

    pub fn with_bit_reverse(self, bit_reverse: bool) -> Self {
        Self { bit_reverse, ..self }
    }

    pub(crate) fn octet_bits(&self) -> u8 {
        if self.adapt56 { 7 } else { 8 }
    }

    pub(crate) fn from_wire(&self, byte: u8) -> u8 {
        if self.bit_reverse { byte } else { byte.reverse_bits() }
    }

    pub(crate) fn to_wire(&self, byte: u8) -> u8 {
        self.from_wire(byte)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config() {
        assert_eq!(Config::default(), Config::b_channel());
        assert_eq!(Config::d_channel().channel, Channel::D);

        let cfg = Config::d_channel().with_adapt56(true).with_bit_reverse(true);
        assert_eq!(cfg, Config { channel: Channel::D, adapt56: true, bit_reverse: true });
        assert_eq!(cfg.octet_bits(), 7);
        assert_eq!(Config::b_channel().octet_bits(), 8);
    }

    #[test]
    fn test_wire_bit_order() {
        let lsb = Config::b_channel();
        assert_eq!(lsb.from_wire(0x01), 0x80);
        assert_eq!(lsb.to_wire(0x80), 0x01);
        assert_eq!(lsb.from_wire(0x7E), 0x7E);

        let msb = Config::b_channel().with_bit_reverse(true);
        assert_eq!(msb.from_wire(0x01), 0x01);
        assert_eq!(msb.to_wire(0x3B), 0x3B);
    }
}
