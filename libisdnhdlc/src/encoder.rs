//! Transmit side: HDLC frames to raw channel bits.

use super::consts::{self, fast, flags};
use super::crc;
use super::{Channel, Config};


/// Result of a single [`encode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Number of frame octets taken from the source.
    pub consumed: usize,

    /// Number of octets written to the destination.
    pub produced: usize,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SendData,
    SendCrc1,

    /// Repeating whole flag octets (B-channel).
    SendFastFlag,

    /// Opening flag after idle (D-channel).
    SendFirstFlag,

    SendCrc2,
    SendClosingFlag,

    /// Ones up to the next octet boundary after a frame (D-channel).
    SendIdle1,

    /// Repeating whole idle octets (D-channel).
    SendFastIdle,

    /// Flags bit by bit, needed with 56k adaptation.
    SendFlagB0,
    SendFlagB1A6,
    SendFlagB7,

    Stopped,
}


/// Transmit state of one channel.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: Config,

    state: State,
    bit_shift: u8,
    ones: u8,
    data_bits: u8,
    shift_reg: u8,
    crc: u16,
    cbin: u8,
    ff_value: u8,
    closing: bool,
}

impl Encoder {
    pub fn new(config: Config) -> Self {
        let mut enc = Self {
            config,
            state: State::SendFirstFlag,
            bit_shift: 0,
            ones: 0,
            data_bits: 0,
            shift_reg: 0,
            crc: consts::crc::INIT,
            cbin: 0,
            ff_value: flags::FLAG,
            closing: false,
        };

        match (config.channel, config.adapt56) {
            (Channel::D, _) => {},
            (Channel::B, true) => {
                enc.state = State::SendFlagB0;
            },
            (Channel::B, false) => {
                // one full flag is owed before the first frame
                enc.state = State::SendFastFlag;
                enc.cbin = flags::FLAG;
                enc.data_bits = 8;
            },
        }

        enc
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return to the initial state, dropping any partially sent frame.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Park the encoder: only idle octets are produced and no frame data
    /// is accepted until [`Encoder::reset`].
    pub fn stop(&mut self) {
        self.state = State::Stopped;
    }

    pub fn is_stopped(&self) -> bool {
        self.state == State::Stopped
    }

    /// Whether the last frame has been sent completely, including its
    /// closing flag and the fill completing the last octet.
    pub fn is_idle(&self) -> bool {
        let busy = matches!(self.state,
            State::SendData
            | State::SendCrc1
            | State::SendCrc2
            | State::SendClosingFlag
            | State::SendIdle1
        );

        !busy && !self.closing && self.bit_shift == 0
    }

    pub fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Outcome {
        encode(self, src, dst)
    }

    fn wire(&self, byte: u8) -> u8 {
        self.config.to_wire(byte)
    }

    fn push_bit(&mut self, bit: bool) {
        self.cbin = (self.cbin << 1) | bit as u8;
        self.data_bits += 1;

        if self.config.adapt56 && self.data_bits == 7 {
            self.cbin = (self.cbin << 1) | 1;
            self.data_bits = 8;
        }
    }

    /// Insert a zero after five ones. Returns whether a bit was sent.
    fn stuff(&mut self) -> bool {
        if self.ones < 5 {
            return false;
        }

        self.push_bit(false);
        self.ones = 0;
        true
    }

    fn shift_out(&mut self) {
        let bit = self.shift_reg & 0x01 != 0;

        self.push_bit(bit);
        self.ones = if bit { self.ones + 1 } else { 0 };
        self.shift_reg >>= 1;
        self.bit_shift -= 1;
    }

    fn open_frame(&mut self) {
        self.state = State::SendData;
        self.crc = consts::crc::INIT;
        self.ones = 0;
    }

    fn begin_trailer(&mut self) {
        self.crc ^= 0xffff;
        self.shift_reg = (self.crc & 0xff) as u8;
        self.bit_shift = 8;
        self.state = State::SendCrc1;
        self.closing = true;
    }
}


/// Produce channel octets, taking frame data from `src`.
///
/// `src` holds the rest of the current frame: its last octet is the
/// last octet of the frame. With an empty `src`, a frame in progress is
/// ended, otherwise the line is filled with flags (B-channel) or idle
/// (D-channel). Every call fills `dst` completely. Once all of a frame
/// has been consumed, [`Encoder::is_idle`] tells whether its trailer has
/// been sent, too.
pub fn encode(enc: &mut Encoder, src: &[u8], dst: &mut [u8]) -> Outcome {
    if enc.state == State::Stopped {
        dst.fill(flags::IDLE);
        return Outcome { consumed: 0, produced: dst.len() };
    }

    let mut consumed = 0;
    let mut produced = 0;

    while produced < dst.len() {
        if enc.bit_shift == 0 {
            if !enc.closing && consumed < src.len() {
                enc.shift_reg = src[consumed];
                enc.bit_shift = 8;
                consumed += 1;
                enc.closing = consumed == src.len();
            } else if enc.state == State::SendData {
                enc.begin_trailer();
            }
        }

        // a loaded octet that has not been started yet
        let pending = enc.bit_shift == 8;

        match enc.state {
            State::Stopped => break,

            State::SendFastFlag => {
                if !pending {
                    dst[produced] = enc.wire(enc.ff_value);
                    produced += 1;
                    continue;
                }

                // complete the flag from the last output octet
                enc.cbin = ((enc.ff_value as u16) >> (8 - enc.data_bits)) as u8;
                enc.open_frame();
            },
            State::SendFastIdle => {
                if !pending {
                    dst[produced] = enc.wire(flags::IDLE);
                    produced += 1;
                    continue;
                }

                enc.state = State::SendFirstFlag;
                continue;
            },
            State::SendFirstFlag => {
                if !pending {
                    enc.state = State::SendFastIdle;
                    continue;
                }

                if enc.config.adapt56 {
                    enc.state = State::SendFlagB0;
                    continue;
                }

                enc.cbin = flags::FLAG;
                enc.data_bits = 8;
                enc.open_frame();
            },
            State::SendFlagB0 => {
                enc.push_bit(false);
                enc.ones = 0;
                enc.state = State::SendFlagB1A6;
            },
            State::SendFlagB1A6 => {
                enc.push_bit(true);
                enc.ones += 1;

                if enc.ones == 6 {
                    enc.state = State::SendFlagB7;
                }
            },
            State::SendFlagB7 => {
                enc.push_bit(false);
                enc.ones = 0;

                if pending {
                    enc.open_frame();
                } else {
                    enc.state = State::SendFlagB0;
                }
            },
            State::SendData => {
                if !enc.stuff() {
                    if enc.bit_shift == 8 {
                        enc.crc = crc::update(enc.crc, enc.shift_reg);
                    }
                    enc.shift_out();
                }
            },
            State::SendCrc1 => {
                if !enc.stuff() {
                    enc.shift_out();

                    if enc.bit_shift == 0 {
                        enc.shift_reg = (enc.crc >> 8) as u8;
                        enc.bit_shift = 8;
                        enc.state = State::SendCrc2;
                    }
                }
            },
            State::SendCrc2 => {
                if !enc.stuff() {
                    enc.shift_out();

                    if enc.bit_shift == 0 {
                        enc.shift_reg = flags::FLAG;
                        enc.bit_shift = 8;
                        enc.state = State::SendClosingFlag;
                    }
                }
            },
            State::SendClosingFlag => {
                if !enc.stuff() {
                    // flags are never stuffed
                    let bit = enc.shift_reg & 0x01 != 0;
                    enc.push_bit(bit);
                    enc.shift_reg >>= 1;
                    enc.bit_shift -= 1;

                    if enc.bit_shift == 0 {
                        enc.closing = false;
                        enc.ones = 0;

                        match (enc.config.channel, enc.config.adapt56) {
                            (Channel::D, _) => {
                                enc.state = State::SendIdle1;
                            },
                            (Channel::B, true) => {
                                enc.state = State::SendFlagB0;
                            },
                            (Channel::B, false) => {
                                enc.ff_value = fast::TX_FLAG_VALUE[enc.data_bits as usize];
                                enc.state = State::SendFastFlag;
                            },
                        }
                    }
                }
            },
            State::SendIdle1 => {
                enc.push_bit(true);
                enc.ones += 1;

                // at least seven ones, so the receiver sees an abort
                if enc.data_bits == 8 && enc.ones >= 7 {
                    enc.state = State::SendFastIdle;
                    enc.ones = 0;
                }
            },
        }

        if enc.data_bits == 8 {
            dst[produced] = enc.wire(enc.cbin);
            produced += 1;
            enc.data_bits = 0;
        }
    }

    Outcome { consumed, produced }
}
