//! Fixed-width integers.

use std::fmt;
use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{Codec, EncodeOutcome};
use crate::error::{CodecError, Result};

/// A primitive integer with a fixed wire width.
pub trait Integer: Copy + fmt::Debug + PartialEq {
    /// Width in bytes.
    const WIDTH: usize;

    fn read<O: ByteOrder>(buf: &[u8]) -> Self;

    fn write<O: ByteOrder>(self, buf: &mut [u8]);
}

impl Integer for u8 {
    const WIDTH: usize = 1;

    fn read<O: ByteOrder>(buf: &[u8]) -> Self {
        buf[0]
    }

    fn write<O: ByteOrder>(self, buf: &mut [u8]) {
        buf[0] = self;
    }
}

impl Integer for i8 {
    const WIDTH: usize = 1;

    fn read<O: ByteOrder>(buf: &[u8]) -> Self {
        buf[0] as i8
    }

    fn write<O: ByteOrder>(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $width:expr, $read:ident, $write:ident;)*) => {
        $(
            impl Integer for $ty {
                const WIDTH: usize = $width;

                fn read<O: ByteOrder>(buf: &[u8]) -> Self {
                    O::$read(buf)
                }

                fn write<O: ByteOrder>(self, buf: &mut [u8]) {
                    O::$write(buf, self);
                }
            }
        )*
    };
}

impl_integer! {
    u16 => 2, read_u16, write_u16;
    i16 => 2, read_i16, write_i16;
    u32 => 4, read_u32, write_u32;
    i32 => 4, read_i32, write_i32;
    u64 => 8, read_u64, write_u64;
    i64 => 8, read_i64, write_i64;
}

/// Integer codec parametrised by value type and byte order.
pub struct IntegerCodec<T, O> {
    _marker: PhantomData<fn() -> (T, O)>,
}

impl<T: Integer, O: ByteOrder> IntegerCodec<T, O> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Width in bits.
    pub const fn bitsize(&self) -> usize {
        T::WIDTH * 8
    }
}

impl<T, O> Clone for IntegerCodec<T, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, O> Copy for IntegerCodec<T, O> {}

impl<T: Integer, O: ByteOrder> Default for IntegerCodec<T, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O> fmt::Debug for IntegerCodec<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegerCodec<{}>", std::any::type_name::<T>())
    }
}

impl<T: Integer, O: ByteOrder> Codec for IntegerCodec<T, O> {
    type Value = T;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<T> {
        if view.len() != T::WIDTH {
            return Err(CodecError::LengthMismatch {
                expected: T::WIDTH,
                got: view.len(),
            }
            .into());
        }
        Ok(T::read::<O>(view))
    }

    fn encode_view(&self, value: &T, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        let mut buf = vec![0u8; T::WIDTH];
        value.write::<O>(&mut buf);
        Ok(EncodeOutcome::Bytes(buf))
    }
}

pub type Int8u = IntegerCodec<u8, BigEndian>;
pub type Int8s = IntegerCodec<i8, BigEndian>;
pub type Int16u = IntegerCodec<u16, BigEndian>;
pub type Int16ul = IntegerCodec<u16, LittleEndian>;
pub type Int16s = IntegerCodec<i16, BigEndian>;
pub type Int16sl = IntegerCodec<i16, LittleEndian>;
pub type Int32u = IntegerCodec<u32, BigEndian>;
pub type Int32ul = IntegerCodec<u32, LittleEndian>;
pub type Int32s = IntegerCodec<i32, BigEndian>;
pub type Int32sl = IntegerCodec<i32, LittleEndian>;
pub type Int64u = IntegerCodec<u64, BigEndian>;
pub type Int64ul = IntegerCodec<u64, LittleEndian>;
pub type Int64s = IntegerCodec<i64, BigEndian>;
pub type Int64sl = IntegerCodec<i64, LittleEndian>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        let be = Int32u::new();
        let le = Int32ul::new();
        let bytes = [0x00, 0x00, 0x08, 0x46];
        assert_eq!(be.decode(&bytes, None).unwrap(), 2118);
        assert_eq!(le.decode(&bytes, None).unwrap(), 0x4608_0000);
        assert_eq!(be.encode(&2118, None, None).unwrap().data(), &bytes);
    }

    #[test]
    fn test_signed() {
        assert_eq!(Int8s::new().decode(&[0xFF], None).unwrap(), -1);
        assert_eq!(
            Int16sl::new().encode(&-2, None, None).unwrap().data(),
            &[0xFE, 0xFF]
        );
        assert_eq!(Int64s::new().decode(&[0xFF; 8], None).unwrap(), -1);
    }

    #[test]
    fn test_width_checked() {
        assert!(Int16u::new().decode(&[0x01], None).is_err());
        assert_eq!(Int16u::new().bitsize(), 16);
    }
}
