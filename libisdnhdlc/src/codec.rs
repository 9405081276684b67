use super::{decoder, encoder, Config};

use bytes::{Buf, Bytes, BytesMut};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;


pub const DEFAULT_MAX_FRAME: usize = 4096;


/// Counters for everything the receive side has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames: u64,
    pub framing_errors: u64,
    pub crc_errors: u64,
    pub length_errors: u64,
}

impl Stats {
    fn record(&mut self, err: decoder::Error) {
        match err {
            decoder::Error::Framing => self.framing_errors += 1,
            decoder::Error::Crc => self.crc_errors += 1,
            decoder::Error::Length => self.length_errors += 1,
        }
    }

    pub fn errors(&self) -> u64 {
        self.framing_errors + self.crc_errors + self.length_errors
    }
}


/// Frame codec for one channel, both directions.
#[derive(Debug)]
pub struct Codec {
    dec: decoder::Decoder,
    enc: encoder::Encoder,
    buf: Box<[u8]>,
    stats: Stats,
}

impl Codec {
    pub fn new(config: Config) -> Self {
        Self::with_capacity(config, DEFAULT_MAX_FRAME)
    }

    /// Codec accepting received payloads of up to `max_frame` octets.
    pub fn with_capacity(config: Config, max_frame: usize) -> Self {
        Self {
            dec: decoder::Decoder::new(config),
            enc: encoder::Encoder::new(config),
            // payload and FCS
            buf: vec![0; max_frame + 2].into_boxed_slice(),
            stats: Stats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        self.dec.config()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.dec.reset();
        self.enc.reset();
    }

    /// Append `n` octets of inter-frame fill.
    pub fn idle(&mut self, dst: &mut BytesMut, n: usize) {
        let start = dst.len();

        dst.resize(start + n, 0);
        let res = self.enc.encode(&[], &mut dst[start..]);
        dst.truncate(start + res.produced);
    }

    pub fn wrap<T>(self, io: T) -> Framed<T, Codec>
    where
        T: AsyncRead + AsyncWrite,
    {
        Framed::with_capacity(io, self, 4096 as _)
    }
}

impl tokio_util::codec::Encoder<&[u8]> for Codec {
    type Error = std::io::Error;

    fn encode(&mut self, frame: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        use std::io::{Error, ErrorKind};

        if frame.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "cannot send empty frame"));
        }

        if self.enc.is_stopped() {
            return Err(Error::new(ErrorKind::InvalidInput, "encoder has been stopped"));
        }

        // at most one stuffed bit per five data bits, plus FCS and flags
        dst.reserve(frame.len() + frame.len() / 4 + 8);

        // one octet per call, so the frame is not followed by fill
        let mut consumed = 0;
        while consumed < frame.len() || !self.enc.is_idle() {
            let start = dst.len();
            dst.resize(start + 1, 0);

            let res = self.enc.encode(&frame[consumed..], &mut dst[start..]);
            consumed += res.consumed;
        }

        Ok(())
    }
}

impl tokio_util::codec::Encoder<Bytes> for Codec {
    type Error = std::io::Error;

    fn encode(&mut self, frame: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        tokio_util::codec::Encoder::<&[u8]>::encode(self, &frame[..], dst)
    }
}

impl tokio_util::codec::Decoder for Codec {
    type Item = Bytes;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while !src.is_empty() {
            let res = self.dec.decode(&src[..], &mut self.buf);
            src.advance(res.consumed);

            match res.result() {
                Ok(Some(len)) => {
                    self.stats.frames += 1;
                    tracing::trace!("received frame of {len} bytes");
                    return Ok(Some(Bytes::copy_from_slice(&self.buf[..len])));
                },
                Ok(None) => {},
                Err(e) => {
                    self.stats.record(e);
                    tracing::warn!(code = u8::from(e), length = res.length, "error decoding data: {e}");
                },
            }
        }

        Ok(None)
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::Channel;

    use futures::{SinkExt, StreamExt};
    use tokio_util::codec::{Decoder, Encoder};

    fn configs() -> Vec<Config> {
        [Channel::B, Channel::D].into_iter()
            .flat_map(|channel| [false, true].map(|adapt56| Config { channel, adapt56, ..Default::default() }))
            .collect()
    }

    #[test]
    fn test_encode_decode() {
        let frames: [&[u8]; 4] = [&[0x01, 0x02, 0x03], &[0x7e; 9], &[0xff; 33], &[0x00]];

        for config in configs() {
            let mut codec = Codec::new(config);
            let mut buf = BytesMut::new();

            for (i, frame) in frames.iter().enumerate() {
                codec.encode(*frame, &mut buf).unwrap();
                codec.idle(&mut buf, i);
            }

            let mut decoded = Vec::new();
            while let Some(frame) = codec.decode(&mut buf).unwrap() {
                decoded.push(frame);
            }

            assert!(buf.is_empty());
            assert_eq!(decoded, frames.map(Bytes::from_static), "{config:?}");
            assert_eq!(codec.stats().frames, 4);
            assert_eq!(codec.stats().errors(), 0);
        }
    }

    #[test]
    fn test_encode_bytes() {
        let mut codec = Codec::new(Config::b_channel());
        let mut buf = BytesMut::new();
        assert_eq!(codec.config(), &Config::b_channel());

        codec.encode(Bytes::from_static(&[0x01, 0x02, 0x03]), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x7e, 0x01, 0x02, 0x03, 0x3b, 0x9d, 0x7e]);

        codec.idle(&mut buf, 2);
        assert_eq!(&buf[7..], &[0x7e, 0x7e]);
    }

    #[test]
    fn test_encode_invalid() {
        let mut codec = Codec::new(Config::b_channel());
        let mut buf = BytesMut::new();

        let err = codec.encode(&[0u8; 0][..], &mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        codec.enc.stop();
        let err = codec.encode(&[0x01u8][..], &mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(buf.is_empty());

        codec.reset();
        codec.encode(&[0x01u8][..], &mut buf).unwrap();
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        let mut codec = Codec::with_capacity(Config::b_channel(), 3);

        let mut buf = BytesMut::from(&[
            0x7e, 0x01, 0x7e,                               // too short
            0x7e, 0x12, 0x34, 0x56, 0x90, 0x11, 0x7e,       // bad FCS
            0x7e, 0x01, 0x02, 0x03, 0x04, 0x91, 0x39, 0x7e, // too long
            0x7e, 0x04, 0x5c, 0xb6, 0x7e,
        ][..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Bytes::from_static(&[0x04])));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        let stats = codec.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.framing_errors, 1);
        assert_eq!(stats.crc_errors, 1);
        assert_eq!(stats.length_errors, 1);
    }

    #[tokio::test]
    async fn test_framed() {
        let config = Config::d_channel();
        let (a, b) = tokio::io::duplex(64);

        let mut tx = Codec::new(config).wrap(a);
        let mut rx = Codec::new(config).wrap(b);

        let frames = [
            Bytes::from_static(b"hello"),
            Bytes::from(vec![0x7e; 300]),
            Bytes::from_static(&[0x00, 0xff]),
        ];

        let send = async {
            for frame in frames.iter() {
                tx.send(frame.clone()).await.unwrap();
            }
            SinkExt::<Bytes>::close(&mut tx).await.unwrap();
        };

        let recv = async {
            let mut received = Vec::new();
            while let Some(frame) = rx.next().await {
                received.push(frame.unwrap());
            }
            received
        };

        let ((), received) = tokio::join!(send, recv);
        assert_eq!(received, frames);
        assert_eq!(rx.codec().stats().frames, 3);
    }
}
