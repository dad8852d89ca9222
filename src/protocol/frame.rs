//! Extended protocol frames.

use bytes::BufMut;

use super::{crc16, Command, ProtocolFamily, ETX, FRAME_OVERHEAD, MAX_PAYLOAD_SIZE, STX, WAKEUP};
use crate::error::{ProtocolError, Result};

/// A complete extended protocol instruction.
///
/// Frames are immutable once built. The CRC always covers
/// `CMD || LEN || DATA`; it may disagree with the payload only when the frame
/// was parsed or built with verification disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    wakeup_count: u8,
    stx_count: u8,
    command: Command,
    payload: Vec<u8>,
    crc: [u8; 2],
}

impl Frame {
    /// Create a frame with one wakeup byte, one STX and a computed CRC.
    pub fn new(command: Command, payload: impl Into<Vec<u8>>) -> Result<Self> {
        FrameBuilder::new(command, payload).build()
    }

    /// Start building a frame.
    pub fn builder(command: Command, payload: impl Into<Vec<u8>>) -> FrameBuilder {
        FrameBuilder::new(command, payload)
    }

    pub fn wakeup_count(&self) -> u8 {
        self.wakeup_count
    }

    pub fn stx_count(&self) -> u8 {
        self.stx_count
    }

    /// ETX is never repeated.
    pub fn etx_count(&self) -> u8 {
        1
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Declared payload length.
    pub fn length(&self) -> u8 {
        self.payload.len() as u8
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Transmitted CRC, big-endian.
    pub fn crc(&self) -> [u8; 2] {
        self.crc
    }

    /// CRC computed from command, length and payload.
    pub fn expected_crc(&self) -> [u8; 2] {
        checksum(self.command, &self.payload)
    }

    pub fn crc_is_valid(&self) -> bool {
        self.crc == self.expected_crc()
    }

    /// Size of the encoded frame in bytes.
    pub fn encoded_len(&self) -> usize {
        self.wakeup_count as usize + self.stx_count as usize - 1 + FRAME_OVERHEAD
            + self.payload.len()
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Append wire bytes to `buf`.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_bytes(WAKEUP, self.wakeup_count as usize);
        buf.put_bytes(STX, self.stx_count as usize);
        buf.put_u8(self.command.code());
        buf.put_u8(self.length());
        buf.put_slice(&self.payload);
        buf.put_slice(&self.crc);
        buf.put_u8(ETX);
    }

    /// Decode exactly one frame from `data`, verifying the CRC.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, true)
    }

    /// Decode exactly one frame from `data`.
    ///
    /// Trailing bytes after ETX are an error; a buffer ending before ETX
    /// reports how many bytes were still required.
    pub fn decode_with(data: &[u8], verify_crc: bool) -> Result<Self> {
        let mut parser = FrameParser::new().verify_crc(verify_crc);
        for (i, &byte) in data.iter().enumerate() {
            if let Some(frame) = parser.push(byte)? {
                let rest = data.len() - i - 1;
                if rest > 0 {
                    return Err(ProtocolError::ExtraData(rest).into());
                }
                return Ok(frame);
            }
        }
        Err(ProtocolError::Truncated {
            expected: data.len() + parser.bytes_needed(),
            got: data.len(),
        }
        .into())
    }
}

/// Encode a frame for `command` and `payload` with default framing.
pub fn encode_frame(command: Command, payload: &[u8]) -> Result<Vec<u8>> {
    Ok(Frame::new(command, payload)?.encode())
}

/// Decode one frame from a complete buffer.
pub fn decode_frame(data: &[u8]) -> Result<Frame> {
    Frame::decode(data)
}

fn checksum(command: Command, payload: &[u8]) -> [u8; 2] {
    let mut span = Vec::with_capacity(payload.len() + 2);
    span.push(command.code());
    span.push(payload.len() as u8);
    span.extend_from_slice(payload);
    crc16(&span)
}

fn ensure_extended(byte: u8) -> Result<Command> {
    if ProtocolFamily::of(byte) == ProtocolFamily::Legacy {
        return Err(ProtocolError::LegacyUnsupported(byte).into());
    }
    Ok(Command::try_from(byte)?)
}

/// Builder for outgoing frames.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    command: Command,
    payload: Vec<u8>,
    wakeup_count: u8,
    stx_count: u8,
    crc: Option<[u8; 2]>,
    verify_crc: bool,
}

impl FrameBuilder {
    pub fn new(command: Command, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            payload: payload.into(),
            wakeup_count: 1,
            stx_count: 1,
            crc: None,
            verify_crc: true,
        }
    }

    pub fn wakeup_count(mut self, count: u8) -> Self {
        self.wakeup_count = count;
        self
    }

    pub fn stx_count(mut self, count: u8) -> Self {
        self.stx_count = count;
        self
    }

    /// Use a precomputed CRC instead of computing one.
    pub fn crc(mut self, crc: [u8; 2]) -> Self {
        self.crc = Some(crc);
        self
    }

    /// Check a supplied CRC against the computed one.
    pub fn verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    pub fn build(self) -> Result<Frame> {
        ensure_extended(self.command.code())?;
        if self.stx_count == 0 {
            return Err(ProtocolError::StxMissing.into());
        }
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            }
            .into());
        }

        let expected = checksum(self.command, &self.payload);
        let crc = match self.crc {
            Some(got) if self.verify_crc && got != expected => {
                return Err(ProtocolError::CrcMismatch { expected, got }.into());
            }
            Some(got) => got,
            None => expected,
        };

        Ok(Frame {
            wakeup_count: self.wakeup_count,
            stx_count: self.stx_count,
            command: self.command,
            payload: self.payload,
            crc,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Wakeup,
    Stx,
    Command,
    Length,
    Data,
    Crc,
    Etx,
}

/// Incremental frame parser.
///
/// Bytes are pushed one at a time in wire order. Any error resets the parser
/// so the next byte starts a fresh frame.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: State,
    verify_crc: bool,
    max_payload: usize,
    wakeup_count: u8,
    stx_count: u8,
    command: Option<Command>,
    length: usize,
    payload: Vec<u8>,
    crc: [u8; 2],
    crc_seen: usize,
}

impl FrameParser {
    /// Create a parser that verifies CRCs.
    pub fn new() -> Self {
        Self {
            state: State::Wakeup,
            verify_crc: true,
            max_payload: MAX_PAYLOAD_SIZE,
            wakeup_count: 0,
            stx_count: 0,
            command: None,
            length: 0,
            payload: Vec::new(),
            crc: [0; 2],
            crc_seen: 0,
        }
    }

    pub fn verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Reject frames declaring more than `max` payload bytes.
    pub fn max_payload(mut self, max: usize) -> Self {
        self.max_payload = max;
        self
    }

    /// Discard any partial frame.
    pub fn reset(&mut self) {
        self.state = State::Wakeup;
        self.wakeup_count = 0;
        self.stx_count = 0;
        self.command = None;
        self.length = 0;
        self.payload.clear();
        self.crc = [0; 2];
        self.crc_seen = 0;
    }

    /// True when no byte of a frame has been consumed.
    pub fn is_idle(&self) -> bool {
        self.state == State::Wakeup && self.wakeup_count == 0
    }

    /// Minimum number of further bytes before a frame can complete.
    pub fn bytes_needed(&self) -> usize {
        match self.state {
            State::Wakeup => FRAME_OVERHEAD,
            State::Stx if self.stx_count == 0 => FRAME_OVERHEAD,
            State::Stx | State::Command => FRAME_OVERHEAD - 1,
            State::Length => FRAME_OVERHEAD - 2,
            State::Data => self.length - self.payload.len() + 3,
            State::Crc => 2 - self.crc_seen + 1,
            State::Etx => 1,
        }
    }

    /// Feed one byte; returns a frame once ETX is accepted.
    pub fn push(&mut self, byte: u8) -> Result<Option<Frame>> {
        let result = self.step(byte);
        if !matches!(result, Ok(None)) {
            self.reset();
        }
        result
    }

    fn step(&mut self, byte: u8) -> Result<Option<Frame>> {
        if self.state == State::Wakeup {
            if byte == WAKEUP {
                self.wakeup_count = self.wakeup_count.saturating_add(1);
                return Ok(None);
            }
            self.state = State::Stx;
        }

        match self.state {
            State::Wakeup => unreachable!("wakeup handled above"),
            State::Stx => {
                if byte == STX {
                    self.stx_count = self.stx_count.saturating_add(1);
                    return Ok(None);
                }
                if self.stx_count == 0 {
                    return Err(ProtocolError::StxMissing.into());
                }
                self.state = State::Command;
                self.step(byte)
            }
            State::Command => {
                self.command = Some(ensure_extended(byte)?);
                self.state = State::Length;
                Ok(None)
            }
            State::Length => {
                let length = byte as usize;
                if length > self.max_payload {
                    return Err(ProtocolError::PayloadTooLarge {
                        size: length,
                        max: self.max_payload,
                    }
                    .into());
                }
                self.length = length;
                self.payload.reserve(length);
                self.state = if length == 0 { State::Crc } else { State::Data };
                Ok(None)
            }
            State::Data => {
                self.payload.push(byte);
                if self.payload.len() == self.length {
                    self.state = State::Crc;
                }
                Ok(None)
            }
            State::Crc => {
                self.crc[self.crc_seen] = byte;
                self.crc_seen += 1;
                if self.crc_seen < 2 {
                    return Ok(None);
                }
                if self.verify_crc {
                    let command = self.command.ok_or(ProtocolError::StxMissing)?;
                    let expected = checksum(command, &self.payload);
                    if expected != self.crc {
                        return Err(ProtocolError::CrcMismatch {
                            expected,
                            got: self.crc,
                        }
                        .into());
                    }
                }
                self.state = State::Etx;
                Ok(None)
            }
            State::Etx => {
                if byte != ETX {
                    return Err(ProtocolError::InvalidEtx(byte).into());
                }
                let command = self.command.ok_or(ProtocolError::StxMissing)?;
                let frame = Frame {
                    wakeup_count: self.wakeup_count,
                    stx_count: self.stx_count,
                    command,
                    payload: std::mem::take(&mut self.payload),
                    crc: self.crc,
                };
                tracing::trace!(
                    command = %frame.command,
                    length = frame.payload.len(),
                    "decoded frame"
                );
                Ok(Some(frame))
            }
        }
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
