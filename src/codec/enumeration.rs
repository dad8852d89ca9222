//! Enumerations carried as integers.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use super::{Codec, EncodeOutcome, Int8u, Mask};
use crate::error::{CodecError, Result};

/// Maps the scalar decoded by an inner integer codec onto an enumeration.
pub struct EnumCodec<E, C = Int8u> {
    inner: C,
    mask: Option<u8>,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C> EnumCodec<E, C> {
    /// Wrap `inner`.
    pub const fn new(inner: C) -> Self {
        Self {
            inner,
            mask: None,
            _marker: PhantomData,
        }
    }

    /// Wrap `inner` with a uniform class mask.
    pub const fn masked(inner: C, mask: u8) -> Self {
        Self {
            inner,
            mask: Some(mask),
            _marker: PhantomData,
        }
    }
}

impl<E, C: fmt::Debug> fmt::Debug for EnumCodec<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumCodec")
            .field("enum", &short_name::<E>())
            .field("inner", &self.inner)
            .field("mask", &self.mask)
            .finish()
    }
}

fn short_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}

impl<E, C, R> EnumCodec<E, C>
where
    C: Codec<Value = R, Hints = ()>,
    R: Copy + Into<u64>,
    E: Copy + Into<R> + TryFrom<R> + FromStr,
{
    /// Encode the member named `key`.
    pub fn encode_name(
        &self,
        key: &str,
        data: Option<&mut [u8]>,
        idxs: Option<&[usize]>,
    ) -> Result<EncodeOutcome> {
        let value = E::from_str(key).map_err(|_| CodecError::UnknownEnumName {
            name: short_name::<E>(),
            key: key.to_string(),
        })?;
        self.encode(&value, data, idxs)
    }
}

impl<E, C, R> Codec for EnumCodec<E, C>
where
    C: Codec<Value = R, Hints = ()>,
    R: Copy + Into<u64>,
    E: Copy + Into<R> + TryFrom<R>,
{
    type Value = E;
    type Hints = ();

    fn mask(&self) -> Option<Mask> {
        self.mask.map(Mask::Uniform)
    }

    fn decode_view(&self, view: &[u8]) -> Result<E> {
        let raw = self.inner.decode_view(view)?;
        E::try_from(raw).map_err(|_| {
            CodecError::InvalidEnumValue {
                name: short_name::<E>(),
                value: raw.into(),
            }
            .into()
        })
    }

    fn encode_view(&self, value: &E, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        self.inner.encode_view(&(*value).into(), &(), current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Marker {
        Stx,
        Etx,
    }

    impl TryFrom<u8> for Marker {
        type Error = u8;

        fn try_from(value: u8) -> std::result::Result<Self, u8> {
            match value {
                0x02 => Ok(Marker::Stx),
                0x03 => Ok(Marker::Etx),
                other => Err(other),
            }
        }
    }

    impl From<Marker> for u8 {
        fn from(m: Marker) -> u8 {
            match m {
                Marker::Stx => 0x02,
                Marker::Etx => 0x03,
            }
        }
    }

    impl FromStr for Marker {
        type Err = ();

        fn from_str(s: &str) -> std::result::Result<Self, ()> {
            match s {
                "STX" => Ok(Marker::Stx),
                "ETX" => Ok(Marker::Etx),
                _ => Err(()),
            }
        }
    }

    const CODEC: EnumCodec<Marker> = EnumCodec::new(Int8u::new());

    #[test]
    fn test_enum_decode() {
        assert_eq!(CODEC.decode(&[0x03], None).unwrap(), Marker::Etx);
        let err = CODEC.decode(&[0x09], None).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Codec(CodecError::InvalidEnumValue {
                name: "Marker",
                value: 9
            })
        ));
    }

    #[test]
    fn test_enum_encode_by_name() {
        assert_eq!(CODEC.encode_name("STX", None, None).unwrap().data(), &[0x02]);
        assert!(CODEC.encode_name("DLE", None, None).is_err());
    }
}
