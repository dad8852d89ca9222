//! Streaming frame codec.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{Frame, FrameParser, ETX, MAX_PAYLOAD_SIZE, STX, WAKEUP};
use crate::config::ProtocolConfig;
use crate::error::ProtocolError;

/// Tokio codec turning a serial byte stream into frames.
///
/// With resynchronisation enabled, bytes that cannot start a frame are
/// discarded up to the next wakeup or STX byte, and a malformed frame is
/// skipped one byte at a time until a valid one lines up. Each discard is
/// logged and counted. CRC mismatches are always returned to the caller
/// after the damaged frame has been consumed, so the next call continues
/// with the following frame.
#[derive(Debug)]
pub struct FrameCodec {
    verify_crc: bool,
    max_payload: usize,
    resync: bool,
    wakeup_count: u8,
    stx_count: u8,
    discarded: u64,
}

impl FrameCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self {
            verify_crc: true,
            max_payload: MAX_PAYLOAD_SIZE,
            resync: true,
            wakeup_count: 1,
            stx_count: 1,
            discarded: 0,
        }
    }

    /// Create a codec from protocol settings.
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            verify_crc: config.verify_crc,
            max_payload: config.max_payload,
            resync: config.resync,
            wakeup_count: config.wakeup_count,
            stx_count: config.stx_count,
            discarded: 0,
        }
    }

    /// Create a codec with custom max payload size.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            max_payload,
            ..Self::new()
        }
    }

    /// Return framing errors instead of skipping past them.
    pub fn without_resync(mut self) -> Self {
        self.resync = false;
        self
    }

    /// Bytes dropped while resynchronising so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn discard(&mut self, src: &mut BytesMut, n: usize) {
        src.advance(n);
        self.discarded += n as u64;
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = crate::Error;

    fn decode(
        &mut self,
        src: &mut BytesMut,
    ) -> std::result::Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.resync {
                let skip = src
                    .iter()
                    .position(|&b| b == WAKEUP || b == STX)
                    .unwrap_or(src.len());
                if skip > 0 {
                    tracing::warn!(bytes = skip, "discarding bytes before frame start");
                    self.discard(src, skip);
                }
            }
            if src.is_empty() {
                return Ok(None);
            }

            let mut parser = FrameParser::new()
                .verify_crc(self.verify_crc)
                .max_payload(self.max_payload);
            let mut complete = None;
            let mut failure = None;
            for (i, &byte) in src.iter().enumerate() {
                match parser.push(byte) {
                    Ok(None) => {}
                    Ok(Some(frame)) => {
                        complete = Some((i, frame));
                        break;
                    }
                    Err(e) => {
                        failure = Some((i, e));
                        break;
                    }
                }
            }

            if let Some((end, frame)) = complete {
                src.advance(end + 1);
                return Ok(Some(frame));
            }

            let Some((at, err)) = failure else {
                // Wait for the rest of the frame
                src.reserve(parser.bytes_needed());
                return Ok(None);
            };

            if err.is_crc_error() {
                let mut consumed = at + 1;
                if src.get(consumed) == Some(&ETX) {
                    consumed += 1;
                }
                src.advance(consumed);
                tracing::warn!(error = %err, "dropping frame with bad CRC");
                return Err(err);
            }

            if !self.resync {
                src.advance(at + 1);
                return Err(err);
            }

            tracing::warn!(error = %err, offset = at, "resynchronising after framing error");
            self.discard(src, 1);
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = crate::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        if item.payload().len() > self.max_payload {
            return Err(ProtocolError::PayloadTooLarge {
                size: item.payload().len(),
                max: self.max_payload,
            }
            .into());
        }

        // Frames with default framing take the configured marker counts
        let frame = if item.wakeup_count() == 1 && item.stx_count() == 1 {
            Frame::builder(item.command(), item.payload().to_vec())
                .wakeup_count(self.wakeup_count)
                .stx_count(self.stx_count)
                .crc(item.crc())
                .verify_crc(false)
                .build()?
        } else {
            item
        };

        dst.reserve(frame.encoded_len());
        frame.encode_into(dst);
        tracing::trace!(command = %frame.command(), length = frame.length(), "encoded frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_frame, Command};

    #[test]
    fn test_codec_roundtrip() {
        let mut codec = FrameCodec::new();
        let frame = Frame::new(Command::GetSysdata, [0x00, 0x80]).unwrap();

        let mut buf = BytesMut::new();
        codec.encode(frame.clone(), &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_partial() {
        let mut codec = FrameCodec::new();
        let bytes = encode_frame(Command::Beep, &[0x02]).unwrap();

        let mut buf = BytesMut::from(&bytes[..4]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 4);

        buf.extend_from_slice(&bytes[4..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.command(), Command::Beep);
    }

    #[test]
    fn test_codec_resync_skips_junk() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0x55, 0x13, 0x37][..]);
        buf.extend_from_slice(&encode_frame(Command::GetTime, &[]).unwrap());

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.command(), Command::GetTime);
        assert_eq!(codec.discarded(), 3);
    }

    #[test]
    fn test_codec_resync_after_bad_etx() {
        let mut codec = FrameCodec::new();
        let mut bad = encode_frame(Command::GetTime, &[]).unwrap();
        *bad.last_mut().unwrap() = 0x00;

        let mut buf = BytesMut::from(&bad[..]);
        buf.extend_from_slice(&encode_frame(Command::GetMs, &[]).unwrap());

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.command(), Command::GetMs);
        assert!(codec.discarded() > 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_crc_error_consumes_frame() {
        let mut codec = FrameCodec::new();
        let mut bad = encode_frame(Command::GetTime, &[]).unwrap();
        let crc_at = bad.len() - 2;
        bad[crc_at] ^= 0x01;

        let mut buf = BytesMut::from(&bad[..]);
        buf.extend_from_slice(&encode_frame(Command::GetMs, &[]).unwrap());

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(err.is_crc_error());

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.command(), Command::GetMs);
        assert_eq!(codec.discarded(), 0);
    }

    #[test]
    fn test_codec_without_resync() {
        let mut codec = FrameCodec::new().without_resync();
        let mut buf = BytesMut::from(&[0x55, 0x02][..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(err.is_framing_error());
        assert_eq!(&buf[..], &[0x02]);
    }

    #[test]
    fn test_codec_applies_configured_framing() {
        let config = ProtocolConfig {
            wakeup_count: 2,
            stx_count: 2,
            ..ProtocolConfig::default()
        };
        let mut codec = FrameCodec::from_config(&config);
        let mut buf = BytesMut::new();
        codec
            .encode(Frame::new(Command::GetTime, Vec::new()).unwrap(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[0xFF, 0xFF, 0x02, 0x02, 0xF7, 0x00, 0xF7, 0x00, 0x03]);
    }
}
