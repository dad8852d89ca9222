//! Error types for the SPORTident codec layer.

use std::io;

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Error, Debug)]
pub enum Error {
    // Wire errors
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // Field codec errors
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Instruction framing and integrity errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid instruction; STX missing")]
    StxMissing,

    #[error("invalid ETX byte: 0x{0:02X}")]
    InvalidEtx(u8),

    #[error("extra data: {0} bytes after ETX")]
    ExtraData(usize),

    #[error("truncated instruction: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("unknown command byte: 0x{0:02X}")]
    UnknownCommand(u8),

    #[error("unknown command name: {0}")]
    UnknownCommandName(String),

    #[error("legacy protocol instruction 0x{0:02X} is not supported")]
    LegacyUnsupported(u8),

    #[error("length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("CRC mismatch: expected {}, got {}", hex::encode(expected), hex::encode(got))]
    CrcMismatch { expected: [u8; 2], got: [u8; 2] },
}

/// Field codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid constant: got {}, expected {}", hex::encode(got), hex::encode(expected))]
    InvalidConstant { expected: Vec<u8>, got: Vec<u8> },

    #[error("invalid {name} value: {value}")]
    InvalidEnumValue { name: &'static str, value: u64 },

    #[error("unknown {name} name: {key}")]
    UnknownEnumName { name: &'static str, key: String },

    #[error("length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("unsupported product: {0}")]
    UnsupportedProduct(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("not applicable: {0}")]
    NotApplicable(String),

    #[error("unable to set {0} directly")]
    DerivedOnly(&'static str),
}

impl Error {
    /// Check if the error is a CRC integrity failure on an otherwise well-formed frame.
    pub fn is_crc_error(&self) -> bool {
        matches!(self, Error::Protocol(ProtocolError::CrcMismatch { .. }))
    }

    /// Check if the error is a structural framing failure.
    pub fn is_framing_error(&self) -> bool {
        matches!(self, Error::Protocol(e) if !matches!(e, ProtocolError::CrcMismatch { .. }))
    }

    /// Check if the error is local to one frame (the stream can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }
}
