//! SPORTident wire protocol.
//!
//! Only the extended protocol is framed here; legacy instructions are
//! recognised by their command byte and rejected.
//!
//! ## Extended Instruction Format
//!
//! ```text
//! ┌────────────┬──────────┬─────┬─────┬──────────┬───────────┬─────┐
//! │ 0xFF *     │ 0x02 (2) │ CMD │ LEN │ DATA ... │ CRC16 (2) │ 0x03│
//! │ wakeup     │ STX      │     │     │ LEN bytes│ BE        │ ETX │
//! └────────────┴──────────┴─────┴─────┴──────────┴───────────┴─────┘
//! ```
//!
//! The CRC covers `CMD || LEN || DATA`.

mod codec;
mod command;
mod crc;
mod frame;
pub mod requests;

pub use codec::FrameCodec;
pub use command::{Command, ProtocolFamily};
pub use crc::crc16;
pub use frame::{decode_frame, encode_frame, Frame, FrameBuilder, FrameParser};

/// Wakeup byte sent ahead of a frame.
pub const WAKEUP: u8 = 0xFF;

/// Start of text.
pub const STX: u8 = 0x02;

/// End of text.
pub const ETX: u8 = 0x03;

/// Positive acknowledge.
pub const ACK: u8 = 0x06;

/// Data link escape (legacy protocol).
pub const DLE: u8 = 0x10;

/// Negative acknowledge.
pub const NAK: u8 = 0x15;

/// Largest payload a length byte can describe.
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Bytes framing a payload: STX, CMD, LEN, CRC16, ETX.
pub const FRAME_OVERHEAD: usize = 6;
