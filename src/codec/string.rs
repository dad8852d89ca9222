//! Fixed-width Latin-1 strings.

use super::{Codec, EncodeOutcome};
use crate::error::{CodecError, Result};

/// Which side of the field the text sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Filler on the right.
    Left,
    /// Filler on the left.
    Right,
}

/// Fixed-width string, padded with a filler character on encode.
///
/// Decoding is raw: filler characters are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeStringCodec {
    width: usize,
    filler: u8,
    align: Align,
}

impl FixedSizeStringCodec {
    pub const fn new(width: usize, filler: u8, align: Align) -> Self {
        Self {
            width,
            filler,
            align,
        }
    }

    /// Width in bytes.
    pub const fn width(&self) -> usize {
        self.width
    }
}

impl Codec for FixedSizeStringCodec {
    type Value = String;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<String> {
        if view.len() != self.width {
            return Err(CodecError::LengthMismatch {
                expected: self.width,
                got: view.len(),
            }
            .into());
        }
        Ok(view.iter().map(|&b| char::from(b)).collect())
    }

    fn encode_view(&self, value: &String, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        let mut text = Vec::with_capacity(self.width);
        for c in value.chars().take(self.width) {
            let b = u8::try_from(u32::from(c)).map_err(|_| {
                CodecError::InvalidValue(format!("character {c:?} is not Latin-1"))
            })?;
            text.push(b);
        }

        let fill = vec![self.filler; self.width - text.len()];
        let out = match self.align {
            Align::Left => [text, fill].concat(),
            Align::Right => [fill, text].concat(),
        };
        Ok(EncodeOutcome::Bytes(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        let codec = FixedSizeStringCodec::new(3, b'0', Align::Right);
        assert_eq!(codec.encode(&"5".into(), None, None).unwrap().data(), b"005");
        assert_eq!(codec.encode(&"3112".into(), None, None).unwrap().data(), b"311");
        assert_eq!(codec.decode(b"311", None).unwrap(), "311");

        let codec = FixedSizeStringCodec::new(4, b' ', Align::Left);
        assert_eq!(codec.encode(&"ab".into(), None, None).unwrap().data(), b"ab  ");
    }

    #[test]
    fn test_non_latin1_rejected() {
        let codec = FixedSizeStringCodec::new(2, b' ', Align::Left);
        assert!(codec.encode(&"€".into(), None, None).is_err());
    }
}
