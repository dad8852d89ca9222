//! Identity fields: family, bus type, board, serial number, firmware.

use crate::codec::{
    Align, Codec, DateCodec, EncodeOutcome, EnumCodec, FixedSizeStringCodec, Int8u, Mask,
    MaskedData, RawCodec,
};
use crate::error::{CodecError, Result};
use crate::product::{cfg, ProductFamily};

/// `ProductFamily` from `[CFG0]`.
pub type ProductFamilyCodec = EnumCodec<ProductFamily, Int8u>;

pub const PRODUCT_FAMILY: ProductFamilyCodec = EnumCodec::masked(Int8u::new(), 0xFF);

/// `BusType` from `[CFG2]`, the raw byte.
pub const BUS_TYPE: Int8u = Int8u::new();

/// `ProductConfiguration` from `[CFG1, CFG0]`.
pub const PRODUCT_CONFIGURATION: RawCodec = RawCodec::fixed(2);

/// `ProductionDate` from `[PROD_YEAR, PROD_MONTH, PROD_DAY]`.
pub const PRODUCTION_DATE: DateCodec = DateCodec::new();

/// Decode the family byte, failing on unknown values.
pub(crate) fn family(cfg0: u8) -> Result<ProductFamily> {
    Ok(ProductFamily::try_from(cfg0)?)
}

/// Family of a destination byte about to be overwritten; unknown reads as unset.
pub(crate) fn current_family(cfg0: u8) -> ProductFamily {
    ProductFamily::from_repr(cfg0).unwrap_or(ProductFamily::NotSet)
}

/// Serial number from `BN3..BN0`; SRR modules only use three bytes.
pub(crate) fn serial_from(bn: &[u8], family: ProductFamily) -> u32 {
    let bn3 = if family == ProductFamily::SimSrr { 0 } else { bn[0] };
    u32::from_be_bytes([bn3, bn[1], bn[2], bn[3]])
}

/// Board version, the low nibble of `[CFG0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardVersionCodec;

impl Codec for BoardVersionCodec {
    type Value = u8;
    type Hints = ();

    fn mask(&self) -> Option<Mask> {
        Some(Mask::Uniform(cfg::CFG0_BOARDNUM_MASK))
    }

    fn decode_view(&self, view: &[u8]) -> Result<u8> {
        Int8u::new().decode_view(view)
    }

    fn encode_view(&self, value: &u8, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        if *value > cfg::CFG0_BOARDNUM_MASK {
            return Err(
                CodecError::InvalidValue(format!("board version out of range: {value}")).into(),
            );
        }
        Ok(EncodeOutcome::Bytes(vec![*value]))
    }
}

/// Serial number from `[BN3, BN2, BN1, BN0, CFG0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialNumberCodec;

impl Codec for SerialNumberCodec {
    type Value = u32;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<u32> {
        Ok(serial_from(&view[..4], current_family(view[4])))
    }

    fn encode_view(&self, value: &u32, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        let cfg0 = current.map_or(0, |c| c[4]);
        let mut mask = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x00];
        if current_family(cfg0) == ProductFamily::SimSrr {
            if *value >= 1 << 24 {
                return Err(CodecError::InvalidValue(format!(
                    "SRR serial number must fit in three bytes: {value}"
                ))
                .into());
            }
            mask[0] = 0;
        }

        let mut data = value.to_be_bytes().to_vec();
        data.push(cfg0);
        Ok(EncodeOutcome::Masked(MaskedData::new(data, mask)))
    }
}

/// Firmware version from `[SV2, SV1, SV0]`: three ASCII digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirmwareVersionCodec;

const FIRMWARE_DIGITS: FixedSizeStringCodec = FixedSizeStringCodec::new(3, b'0', Align::Right);

impl Codec for FirmwareVersionCodec {
    type Value = u32;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<u32> {
        let text = FIRMWARE_DIGITS.decode_view(view)?;
        text.parse().map_err(|_| {
            CodecError::InvalidValue(format!("invalid firmware version: {text:?}")).into()
        })
    }

    fn encode_view(&self, value: &u32, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        if *value > 999 {
            return Err(
                CodecError::InvalidValue(format!("firmware version out of range: {value}")).into(),
            );
        }
        FIRMWARE_DIGITS.encode_view(&value.to_string(), &(), current)
    }
}
