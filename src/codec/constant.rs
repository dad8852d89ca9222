//! Fixed marker bytes.

use super::{Codec, EncodeOutcome};
use crate::error::{CodecError, Result};

/// Codec for a fixed byte sequence, such as a protocol marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantCodec {
    expected: &'static [u8],
}

impl ConstantCodec {
    /// Create a codec expecting exactly `expected`.
    pub const fn new(expected: &'static [u8]) -> Self {
        Self { expected }
    }

    /// The constant bytes.
    pub const fn bytes(&self) -> &'static [u8] {
        self.expected
    }

    /// Width in bytes.
    pub const fn len(&self) -> usize {
        self.expected.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }
}

impl Codec for ConstantCodec {
    type Value = ();
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<()> {
        if view != self.expected {
            return Err(CodecError::InvalidConstant {
                expected: self.expected.to_vec(),
                got: view.to_vec(),
            }
            .into());
        }
        Ok(())
    }

    fn encode_view(&self, _: &(), _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        Ok(EncodeOutcome::Bytes(self.expected.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETX: ConstantCodec = ConstantCodec::new(&[0x03]);

    #[test]
    fn test_constant() {
        assert!(ETX.decode(&[0x03], None).is_ok());
        assert_eq!(ETX.encode(&(), None, None).unwrap().data(), &[0x03]);

        let err = ETX.decode(&[0x04], None).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Codec(CodecError::InvalidConstant { .. })
        ));
    }
}
