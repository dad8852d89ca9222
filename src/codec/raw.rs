//! Passthrough bytes.

use super::{Codec, EncodeOutcome};
use crate::error::{CodecError, Result};

/// Passes bytes through unchanged, optionally enforcing a fixed width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCodec {
    len: Option<usize>,
}

impl RawCodec {
    /// Any length.
    pub const fn new() -> Self {
        Self { len: None }
    }

    /// Exactly `len` bytes.
    pub const fn fixed(len: usize) -> Self {
        Self { len: Some(len) }
    }

    fn check(&self, got: usize) -> Result<()> {
        match self.len {
            Some(expected) if expected != got => {
                Err(CodecError::LengthMismatch { expected, got }.into())
            }
            _ => Ok(()),
        }
    }
}

impl Codec for RawCodec {
    type Value = Vec<u8>;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<Vec<u8>> {
        self.check(view.len())?;
        Ok(view.to_vec())
    }

    fn encode_view(&self, value: &Vec<u8>, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        self.check(value.len())?;
        Ok(EncodeOutcome::Bytes(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_fixed() {
        let codec = RawCodec::fixed(2);
        assert_eq!(codec.decode(&[0x81, 0x97], None).unwrap(), vec![0x81, 0x97]);
        assert!(codec.decode(&[0x81], None).is_err());
        assert!(codec.encode(&vec![1, 2, 3], None, None).is_err());
        assert_eq!(RawCodec::new().decode(&[], None).unwrap(), Vec::<u8>::new());
    }
}
