//! Receive side: raw channel bits to HDLC frames.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::consts::{self, fast, flags};
use super::crc;
use super::Config;


/// Reasons for dropping a received frame.
///
/// The discriminants are the status codes reported to ISDN drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Error {
    /// Frame aborted by the sender, or too short to hold a CRC.
    Framing = 1,

    /// Frame check sequence mismatch.
    Crc = 2,

    /// Frame larger than the destination buffer.
    Length = 3,
}

impl Error {
    pub fn description(&self) -> &'static str {
        match self {
            Error::Framing => "Frame aborted or too short",
            Error::Crc => "Frame check sequence mismatch",
            Error::Length => "Frame exceeds buffer size",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Error {}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All input consumed, no frame completed yet.
    Continue,

    /// A good frame is in the destination buffer.
    Frame,

    FramingError,
    CrcError,
    LengthError,
}

impl Status {
    pub fn error(&self) -> Option<Error> {
        match self {
            Status::Continue | Status::Frame => None,
            Status::FramingError => Some(Error::Framing),
            Status::CrcError => Some(Error::Crc),
            Status::LengthError => Some(Error::Length),
        }
    }
}

impl From<Error> for Status {
    fn from(value: Error) -> Self {
        match value {
            Error::Framing => Status::FramingError,
            Error::Crc => Status::CrcError,
            Error::Length => Status::LengthError,
        }
    }
}


/// Result of a single [`decode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Number of source octets used. Anything after them has not been
    /// looked at and must be passed in again.
    pub consumed: usize,

    /// Payload length for [`Status::Frame`], number of octets buffered
    /// before the problem for errors, zero otherwise.
    pub length: usize,

    pub status: Status,
}

impl Outcome {
    fn pending(consumed: usize) -> Self {
        Self { consumed, length: 0, status: Status::Continue }
    }

    /// Payload length of a completed frame, `None` if more data is
    /// needed.
    pub fn result(&self) -> Result<Option<usize>, Error> {
        match self.status.error() {
            Some(err) => Err(err),
            None if self.status == Status::Frame => Ok(Some(self.length)),
            None => Ok(None),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Skipping all-ones octets.
    FastIdle,

    /// Hunting for the leading zero of a flag.
    GetFlagB0,

    /// Counting the six ones of a flag.
    GetFlagB1A6,

    /// Expecting the trailing zero of a flag.
    GetFlagB7,

    GetData,

    /// Skipping octets of back-to-back flags.
    FastFlag,
}


/// Receive state of one channel.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: Config,
    fast: bool,

    state: State,
    bit_shift: u8,
    ones: u8,
    data_bits: u8,
    shift_reg: u8,
    crc: u16,
    cbin: u8,
    data_received: bool,
    ff_value: u8,
    ff_bit_shift: u8,
    pos: usize,
}

impl Decoder {
    pub fn new(config: Config) -> Self {
        Self::with_fast_paths(config, true)
    }

    /// Decoder that looks at every single bit, even on idle lines or
    /// runs of flags. Produces the same results as [`Decoder::new`].
    pub fn bitwise(config: Config) -> Self {
        Self::with_fast_paths(config, false)
    }

    fn with_fast_paths(config: Config, fast: bool) -> Self {
        Self {
            config,
            fast,
            state: if fast { State::FastIdle } else { State::GetFlagB0 },
            bit_shift: 0,
            ones: 0,
            data_bits: 0,
            shift_reg: 0,
            crc: consts::crc::INIT,
            cbin: 0,
            data_received: false,
            ff_value: 0,
            ff_bit_shift: 0,
            pos: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop all state, including any partially received frame.
    pub fn reset(&mut self) {
        *self = Self::with_fast_paths(self.config, self.fast);
    }

    /// Whether a frame has started but not yet been closed.
    pub fn in_frame(&self) -> bool {
        self.state == State::GetData && self.data_received
    }

    pub fn decode(&mut self, src: &[u8], dst: &mut [u8]) -> Outcome {
        decode(self, src, dst)
    }

    fn shortcuts(&self) -> bool {
        self.fast && !self.config.adapt56
    }

    fn load(&mut self, byte: u8) {
        self.cbin = self.config.from_wire(byte);
        self.bit_shift = self.config.octet_bits();
    }

    fn step(&mut self, dst: &mut [u8]) -> Option<(Status, usize)> {
        let bit = self.cbin & 0x80 != 0;

        let event = match self.state {
            State::FastIdle => {
                self.fast_idle();
                return None;
            },
            State::FastFlag => {
                self.fast_flag();
                return None;
            },
            State::GetFlagB0 => {
                if !bit {
                    self.state = State::GetFlagB1A6;
                    self.ones = 0;
                } else {
                    self.ones = self.ones.saturating_add(1);

                    if self.shortcuts() && self.ones >= 8 && self.bit_shift == 1 {
                        self.state = State::FastIdle;
                    }
                }
                None
            },
            State::GetFlagB1A6 => {
                if bit {
                    self.ones += 1;
                    if self.ones == 6 {
                        self.state = State::GetFlagB7;
                    }
                } else {
                    self.ones = 0;
                }
                None
            },
            State::GetFlagB7 => {
                if bit {
                    // seven ones: abort or idle, start over
                    self.state = State::GetFlagB0;
                    self.ones += 1;
                } else {
                    self.open_frame();
                }
                None
            },
            State::GetData => self.data_bit(bit, dst),
        };

        self.cbin <<= 1;
        self.bit_shift -= 1;

        event
    }

    fn fast_idle(&mut self) {
        if self.cbin == flags::IDLE {
            self.bit_shift = 0;
        } else {
            self.state = State::GetFlagB0;
            self.ones = 0;
            self.bit_shift = self.config.octet_bits();
        }
    }

    fn fast_flag(&mut self) {
        if self.cbin == self.ff_value {
            self.bit_shift = 0;
        } else if self.cbin == flags::IDLE {
            self.state = State::FastIdle;
            self.bit_shift = 0;
        } else if self.ff_bit_shift == 8 {
            // previous octet ended with the leading zero and six ones
            self.state = State::GetFlagB7;
        } else {
            // replay the start of the flag in the previous octet as data
            let n = self.ff_bit_shift;

            self.shift_reg = fast::ABORT[n as usize - 1];
            self.ones = n.saturating_sub(2);
            self.data_bits = n - 1;
            self.state = State::GetData;
            self.data_received = false;
        }
    }

    fn open_frame(&mut self) {
        self.state = State::GetData;
        self.crc = consts::crc::INIT;
        self.shift_reg = 0;
        self.ones = 0;
        self.data_bits = 0;
        self.data_received = false;
        self.pos = 0;
    }

    fn data_bit(&mut self, bit: bool, dst: &mut [u8]) -> Option<(Status, usize)> {
        if bit {
            self.ones += 1;

            match self.ones {
                6 => return None,
                7 => return self.abort(),
                _ => {
                    self.shift_reg = (self.shift_reg >> 1) | 0x80;
                    self.data_bits += 1;
                },
            }
        } else {
            let ones = std::mem::replace(&mut self.ones, 0);

            match ones {
                // stuffed zero
                5 => return None,
                6 => return self.close_frame(),
                _ => {
                    self.shift_reg >>= 1;
                    self.data_bits += 1;
                },
            }
        }

        if self.data_bits < 8 {
            return None;
        }

        self.data_bits = 0;
        self.data_received = true;
        self.crc = crc::update(self.crc, self.shift_reg);

        if let Some(slot) = dst.get_mut(self.pos) {
            *slot = self.shift_reg;
            self.pos += 1;
            return None;
        }

        // too long, drop the rest of it
        let length = self.pos;

        self.pos = 0;
        self.data_received = false;
        self.state = State::GetFlagB0;
        self.ones = 0;

        Some((Status::LengthError, length))
    }

    fn abort(&mut self) -> Option<(Status, usize)> {
        let event = self.data_received.then_some((Status::FramingError, self.pos));

        self.pos = 0;
        self.data_received = false;

        if self.shortcuts() && self.cbin == fast::ABORT[self.bit_shift as usize + 1] {
            // rest of the octet is ones, too
            self.state = State::FastIdle;
            self.bit_shift = 1;
        } else {
            self.state = State::GetFlagB0;
        }

        event
    }

    fn close_frame(&mut self) -> Option<(Status, usize)> {
        let event = if self.data_received { self.check_frame() } else { None };

        self.crc = consts::crc::INIT;
        self.shift_reg = 0;
        self.data_bits = 0;
        self.data_received = false;
        self.pos = 0;

        // the closing flag may also open the next frame
        let k = self.bit_shift as usize;
        if self.shortcuts() && self.cbin == fast::FLAG[k] {
            self.ff_value = fast::FLAG_VALUE[k];
            self.ff_bit_shift = self.bit_shift;
            self.state = State::FastFlag;
            self.bit_shift = 1;
        } else {
            self.state = State::GetData;
        }

        event
    }

    fn check_frame(&self) -> Option<(Status, usize)> {
        if self.pos < 2 {
            return Some((Status::FramingError, self.pos));
        }

        if self.crc != consts::crc::RESIDUE {
            return Some((Status::CrcError, self.pos));
        }

        match self.pos - 2 {
            0 => {
                tracing::trace!("skipping empty frame");
                None
            },
            n => Some((Status::Frame, n)),
        }
    }
}


/// Run raw channel octets through the receiver.
///
/// Stops after the first completed frame or error, or once `src` is
/// exhausted. Received octets are written to `dst`, which must be the
/// same buffer for all calls making up one frame and must have room for
/// the payload plus the two CRC octets. A completed frame's payload is
/// `dst[..outcome.length]` and has to be taken out before the next call.
pub fn decode(dec: &mut Decoder, src: &[u8], dst: &mut [u8]) -> Outcome {
    let mut consumed = 0;

    loop {
        if dec.bit_shift == 0 {
            let Some(&byte) = src.get(consumed) else {
                return Outcome::pending(consumed);
            };

            consumed += 1;
            dec.load(byte);
        }

        if let Some((status, length)) = dec.step(dst) {
            return Outcome { consumed, length, status };
        }
    }
}
