//! Masked/indexed field codec framework.
//!
//! Every field codec operates on a small view of a larger buffer. The view is
//! gathered from `idxs` (or is the buffer itself), AND-ed with the codec's
//! class mask on decode, and merged back into the destination with
//! read-modify-write semantics on encode:
//!
//! ```text
//!   buffer ──gather(idxs)──► view ──& mask──► decode_view ──► value
//!   value ──encode_view(hints, current view)──► EncodeOutcome ──merge──► buffer
//! ```
//!
//! A mask byte of `0x00` leaves the destination byte untouched, `0xFF`
//! overwrites it, and anything else installs only the masked-in bits.

mod constant;
mod date;
mod enumeration;
mod integer;
mod raw;
mod string;

pub use constant::ConstantCodec;
pub use date::DateCodec;
pub use enumeration::EnumCodec;
pub use integer::{
    Int16s, Int16sl, Int16u, Int16ul, Int32s, Int32sl, Int32u, Int32ul, Int64s, Int64sl,
    Int64u, Int64ul, Int8s, Int8u, Integer, IntegerCodec,
};
pub use raw::RawCodec;
pub use string::{Align, FixedSizeStringCodec};

use crate::error::Result;

/// Per-codec AND-mask applied to the gathered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mask {
    /// One mask byte broadcast to every byte of the view.
    Uniform(u8),
    /// One mask byte per view byte.
    PerByte(Vec<u8>),
}

impl Mask {
    /// Expand to one mask byte per position.
    pub fn expand(&self, len: usize) -> Vec<u8> {
        match self {
            Mask::Uniform(m) => vec![*m; len],
            Mask::PerByte(bytes) => {
                assert_eq!(bytes.len(), len, "mask length does not match data length");
                bytes.clone()
            }
        }
    }

    /// AND the mask into `view` in place.
    pub fn apply(&self, view: &mut [u8]) {
        let mask = self.expand(view.len());
        for (b, m) in view.iter_mut().zip(mask) {
            *b &= m;
        }
    }
}

/// Encoded bytes plus the destination offsets they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedData {
    pub data: Vec<u8>,
    pub idxs: Vec<usize>,
}

/// Encoded bytes plus the bits of each destination byte they may overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedData {
    pub data: Vec<u8>,
    pub mask: Vec<u8>,
}

impl MaskedData {
    /// Create masked data; panics if the lengths differ.
    pub fn new(data: Vec<u8>, mask: Vec<u8>) -> Self {
        assert_eq!(data.len(), mask.len(), "mask length does not match data length");
        Self { data, mask }
    }

    /// A write that changes nothing.
    pub fn untouched(len: usize) -> Self {
        Self::new(vec![0; len], vec![0; len])
    }
}

/// Encoded bytes with both destination offsets and mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedIndexedData {
    pub data: Vec<u8>,
    pub idxs: Vec<usize>,
    pub mask: Vec<u8>,
}

impl MaskedIndexedData {
    /// Create masked indexed data; panics if the lengths differ.
    pub fn new(data: Vec<u8>, idxs: Vec<usize>, mask: Vec<u8>) -> Self {
        assert_eq!(data.len(), idxs.len(), "idxs length does not match data length");
        assert_eq!(data.len(), mask.len(), "mask length does not match data length");
        Self { data, idxs, mask }
    }
}

/// Result of an encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeOutcome {
    Bytes(Vec<u8>),
    Indexed(IndexedData),
    Masked(MaskedData),
    MaskedIndexed(MaskedIndexedData),
}

impl EncodeOutcome {
    /// The encoded bytes.
    pub fn data(&self) -> &[u8] {
        match self {
            EncodeOutcome::Bytes(data) => data,
            EncodeOutcome::Indexed(d) => &d.data,
            EncodeOutcome::Masked(d) => &d.data,
            EncodeOutcome::MaskedIndexed(d) => &d.data,
        }
    }

    /// Destination offsets, if the outcome carries any.
    pub fn idxs(&self) -> Option<&[usize]> {
        match self {
            EncodeOutcome::Indexed(d) => Some(&d.idxs),
            EncodeOutcome::MaskedIndexed(d) => Some(&d.idxs),
            _ => None,
        }
    }

    /// Per-byte mask, if the outcome carries one.
    pub fn mask(&self) -> Option<&[u8]> {
        match self {
            EncodeOutcome::Masked(d) => Some(&d.mask),
            EncodeOutcome::MaskedIndexed(d) => Some(&d.mask),
            _ => None,
        }
    }

    /// Consume into the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            EncodeOutcome::Bytes(data) => data,
            EncodeOutcome::Indexed(d) => d.data,
            EncodeOutcome::Masked(d) => d.data,
            EncodeOutcome::MaskedIndexed(d) => d.data,
        }
    }

    /// Fill in offsets and mask the codec did not override.
    pub fn or_defaults(self, idxs: Option<&[usize]>, class_mask: Option<&Mask>) -> Self {
        let own_idxs = self.idxs().map(<[usize]>::to_vec);
        let own_mask = self.mask().map(<[u8]>::to_vec);
        let data = self.into_bytes();

        let idxs = own_idxs.or_else(|| idxs.map(<[usize]>::to_vec));
        let mask = own_mask.or_else(|| class_mask.map(|m| m.expand(data.len())));

        match (idxs, mask) {
            (None, None) => EncodeOutcome::Bytes(data),
            (Some(idxs), None) => {
                assert_eq!(data.len(), idxs.len(), "idxs length does not match data length");
                EncodeOutcome::Indexed(IndexedData { data, idxs })
            }
            (None, Some(mask)) => EncodeOutcome::Masked(MaskedData::new(data, mask)),
            (Some(idxs), Some(mask)) => {
                EncodeOutcome::MaskedIndexed(MaskedIndexedData::new(data, idxs, mask))
            }
        }
    }

    /// Merge the encoded bytes into `dest`.
    ///
    /// Without offsets the data lands at `dest[0..len]`. Panics on an
    /// out-of-range offset or mismatched lengths.
    pub fn merge_into(&self, dest: &mut [u8]) {
        let data = self.data();
        let mask = self.mask();
        if let Some(idxs) = self.idxs() {
            assert_eq!(data.len(), idxs.len(), "idxs length does not match data length");
        } else {
            assert!(data.len() <= dest.len(), "encoded data longer than destination");
        }

        for (i, &byte) in data.iter().enumerate() {
            let d = self.idxs().map_or(i, |idxs| idxs[i]);
            match mask.map(|m| m[i]) {
                None | Some(0xFF) => dest[d] = byte,
                Some(0) => {}
                Some(m) => dest[d] = (dest[d] & !m) | (byte & m),
            }
        }
    }
}

/// Gather the bytes at `idxs` from `data`, or copy `data` verbatim.
pub fn gather(data: &[u8], idxs: Option<&[usize]>) -> Vec<u8> {
    match idxs {
        Some(idxs) => idxs.iter().map(|&i| data[i]).collect(),
        None => data.to_vec(),
    }
}

/// A field codec over a gathered view of a larger buffer.
///
/// Implementors provide `decode_view` and `encode_view`; the provided
/// `decode`/`encode` methods handle gathering, masking and merging.
pub trait Codec {
    /// Domain value.
    type Value;

    /// Extra context some encoders need (other fields they depend on).
    type Hints: Default;

    /// Class mask applied on decode and used as the default encode mask.
    fn mask(&self) -> Option<Mask> {
        None
    }

    /// Decode an already gathered and masked view.
    fn decode_view(&self, view: &[u8]) -> Result<Self::Value>;

    /// Encode `value`; `current` is the unmasked destination view, if any.
    fn encode_view(
        &self,
        value: &Self::Value,
        hints: &Self::Hints,
        current: Option<&[u8]>,
    ) -> Result<EncodeOutcome>;

    /// Decode from `data`, reading only `idxs` when given.
    fn decode(&self, data: &[u8], idxs: Option<&[usize]>) -> Result<Self::Value> {
        let mut view = gather(data, idxs);
        if let Some(mask) = self.mask() {
            mask.apply(&mut view);
        }
        self.decode_view(&view)
    }

    /// Encode `value`, merging into `data` when a destination is given.
    fn encode(
        &self,
        value: &Self::Value,
        data: Option<&mut [u8]>,
        idxs: Option<&[usize]>,
    ) -> Result<EncodeOutcome> {
        self.encode_with(value, &Self::Hints::default(), data, idxs)
    }

    /// Like [`Codec::encode`], with explicit hints.
    fn encode_with(
        &self,
        value: &Self::Value,
        hints: &Self::Hints,
        data: Option<&mut [u8]>,
        idxs: Option<&[usize]>,
    ) -> Result<EncodeOutcome> {
        let current = data.as_deref().map(|d| gather(d, idxs));
        let outcome = self
            .encode_view(value, hints, current.as_deref())?
            .or_defaults(idxs, self.mask().as_ref());
        if let Some(dest) = data {
            outcome.merge_into(dest);
        }
        Ok(outcome)
    }
}
