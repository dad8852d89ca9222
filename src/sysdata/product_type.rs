//! Product type from `[CFG0, CFG1, CFG2, BN3, BN2, BN1, BN0]`.

use super::identity::{current_family, family, serial_from};
use crate::codec::{Codec, EncodeOutcome, MaskedData};
use crate::error::{CodecError, Result};
use crate::product::{cfg, is_bs11_loop_antenna, Bsx8Polarity, ProductFamily, ProductType};

const CFG0: usize = 0;
const CFG1: usize = 1;
const CFG2: usize = 2;
const BN: std::ops::Range<usize> = 3..7;

/// Context a product type encode may need beyond the destination bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductTypeHints {
    /// Whether a `Bsf8` carries an SRR module; decides its `CFG1`.
    pub attached_srr_module: Option<bool>,
    /// Serial number to write and to resolve BS11 variants with.
    pub serial_number: Option<u32>,
}

/// Types identified by the family byte alone.
fn by_family(family: ProductFamily) -> Option<ProductType> {
    match family {
        ProductFamily::SimSrr => Some(ProductType::SimSrr),
        ProductFamily::Bs8SiMaster => Some(ProductType::Bs8SiMaster),
        ProductFamily::Bs11LoopAntenna => Some(ProductType::Bs11LoopAntenna),
        ProductFamily::Bs11Large => Some(ProductType::Bs11Large),
        ProductFamily::SiGsmDn => Some(ProductType::SiGsmDn),
        _ => None,
    }
}

/// Types identified by family and `CFG1`.
fn by_family_cfg1(family: ProductFamily, cfg1: u8) -> Option<ProductType> {
    match (family, cfg1) {
        (ProductFamily::SiPoint, cfg::CFG1_POGOLF) => Some(ProductType::SiPointGolf),
        (ProductFamily::SiPoint, cfg::CFG1_POSI) => Some(ProductType::SiPointSportident),
        (ProductFamily::Bsx7, cfg::CFG1_BSM) => Some(ProductType::Bsm7),
        (ProductFamily::Bsx7, cfg::CFG1_BSF) => Some(ProductType::Bsf7),
        (ProductFamily::Bsx7, cfg::CFG1_BSP) => Some(ProductType::Bs7P),
        (ProductFamily::Bsx7, cfg::CFG1_BSS) => Some(ProductType::Bs7S),
        (ProductFamily::Bsx8, cfg::CFG1_BSF) => Some(ProductType::Bsf8),
        _ => None,
    }
}

/// Reverse of the lookup tables for types without special handling.
fn table_entry(product: ProductType) -> Option<(ProductFamily, Option<u8>)> {
    let entry = match product {
        ProductType::SimSrr => (ProductFamily::SimSrr, None),
        ProductType::Bs8SiMaster => (ProductFamily::Bs8SiMaster, None),
        ProductType::Bs11Large => (ProductFamily::Bs11Large, None),
        ProductType::SiGsmDn => (ProductFamily::SiGsmDn, None),
        ProductType::SiPointGolf => (ProductFamily::SiPoint, Some(cfg::CFG1_POGOLF)),
        ProductType::SiPointSportident => (ProductFamily::SiPoint, Some(cfg::CFG1_POSI)),
        ProductType::Bsm7 => (ProductFamily::Bsx7, Some(cfg::CFG1_BSM)),
        ProductType::Bsf7 => (ProductFamily::Bsx7, Some(cfg::CFG1_BSF)),
        ProductType::Bs7P => (ProductFamily::Bsx7, Some(cfg::CFG1_BSP)),
        ProductType::Bs7S => (ProductFamily::Bsx7, Some(cfg::CFG1_BSS)),
        _ => return None,
    };
    Some(entry)
}

/// Product type codec.
///
/// Decoding consults the family, `CFG1`, the UART1 bits of `CFG2` (for BSx8
/// stations) and the serial number (for BS11 stations). Encoding picks bytes
/// and a mask so the same decode reproduces the requested type and leaves
/// unrelated bits of the destination alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductTypeCodec {
    polarity: Bsx8Polarity,
}

impl ProductTypeCodec {
    pub const fn new(polarity: Bsx8Polarity) -> Self {
        Self { polarity }
    }
}

impl Codec for ProductTypeCodec {
    type Value = ProductType;
    type Hints = ProductTypeHints;

    fn decode_view(&self, view: &[u8]) -> Result<ProductType> {
        let family = family(view[CFG0])?;
        let cfg1 = view[CFG1];
        let serial = serial_from(&view[BN], family);

        if let Some(product) = by_family(family).or_else(|| by_family_cfg1(family, cfg1)) {
            return Ok(product);
        }
        match family {
            ProductFamily::Bsx8 if cfg1 == cfg::CFG1_BSM => {
                if self.polarity.is_master(view[CFG2]) {
                    Ok(ProductType::Bsm8)
                } else {
                    Ok(ProductType::Bsf8)
                }
            }
            ProductFamily::Bs11Small if is_bs11_loop_antenna(serial) => {
                Ok(ProductType::Bs11LoopAntenna)
            }
            ProductFamily::Bs11Small => Ok(ProductType::Bs11Small),
            _ => Err(CodecError::UnsupportedProduct(format!(
                "family {family} with CFG1 {cfg1}"
            ))
            .into()),
        }
    }

    fn encode_view(
        &self,
        value: &ProductType,
        hints: &ProductTypeHints,
        current: Option<&[u8]>,
    ) -> Result<EncodeOutcome> {
        let current_serial = current.map(|c| serial_from(&c[BN], current_family(c[CFG0])));
        let serial = hints.serial_number.or(current_serial).unwrap_or(0);

        let mut cfg1 = current.map_or(cfg::CFG1_DEFAULT, |c| c[CFG1]);
        let mut cfg2 = cfg::CFG2_DEFAULT;
        let mut mask = [0u8; 7];
        mask[CFG0] = 0xFF;

        let family = if let Some((family, table_cfg1)) = table_entry(*value) {
            if let Some(table_cfg1) = table_cfg1 {
                cfg1 = table_cfg1;
                mask[CFG1] = 0xFF;
            }
            family
        } else {
            match value {
                ProductType::Bsm8 => {
                    cfg1 = cfg::CFG1_BSM;
                    cfg2 = (cfg2 & !cfg::CFG2_UART1_MASK) | self.polarity.uart1_bits(true);
                    mask[CFG1] = 0xFF;
                    mask[CFG2] = cfg::CFG2_UART1_MASK;
                    ProductFamily::Bsx8
                }
                ProductType::Bsf8 => {
                    let attached = hints
                        .attached_srr_module
                        .unwrap_or_else(|| current.is_some_and(|c| c[CFG1] == cfg::CFG1_BSM));
                    mask[CFG1] = 0xFF;
                    if attached {
                        cfg1 = cfg::CFG1_BSM;
                        cfg2 = (cfg2 & !cfg::CFG2_UART1_MASK) | self.polarity.uart1_bits(false);
                        mask[CFG2] = cfg::CFG2_UART1_MASK;
                    } else {
                        cfg1 = cfg::CFG1_BSF;
                    }
                    ProductFamily::Bsx8
                }
                ProductType::Bs11LoopAntenna if is_bs11_loop_antenna(serial) => {
                    ProductFamily::Bs11Small
                }
                ProductType::Bs11LoopAntenna => ProductFamily::Bs11LoopAntenna,
                ProductType::Bs11Small => {
                    if let Some(hinted) = hints.serial_number {
                        assert!(
                            !is_bs11_loop_antenna(hinted),
                            "serial number {hinted} belongs to a BS11 loop antenna"
                        );
                    } else if is_bs11_loop_antenna(serial) {
                        return Err(CodecError::InvalidValue(format!(
                            "serial number {serial} belongs to a BS11 loop antenna"
                        ))
                        .into());
                    }
                    ProductFamily::Bs11Small
                }
                other => {
                    return Err(CodecError::UnsupportedProduct(other.to_string()).into());
                }
            }
        };

        if hints.serial_number.is_some() {
            mask[BN].fill(0xFF);
        }

        let mut data = vec![family.into(), cfg1, cfg2];
        data.extend_from_slice(&serial.to_be_bytes());
        Ok(EncodeOutcome::Masked(MaskedData::new(data, mask.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODEC: ProductTypeCodec = ProductTypeCodec::new(Bsx8Polarity::UsbMeansMaster);

    fn view(cfg0: u8, cfg1: u8, cfg2: u8, serial: u32) -> Vec<u8> {
        let mut v = vec![cfg0, cfg1, cfg2];
        v.extend_from_slice(&serial.to_be_bytes());
        v
    }

    #[test]
    fn test_decode_family_only() {
        let v = view(33, 111, 0xFF, 2118);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::SimSrr);
        let v = view(157, 0, 0, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::SiGsmDn);
    }

    #[test]
    fn test_decode_family_cfg1() {
        let v = view(151, cfg::CFG1_BSP, 0, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::Bs7P);
        let v = view(241, cfg::CFG1_POGOLF, 0, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::SiPointGolf);
    }

    #[test]
    fn test_decode_bsx8_polarity() {
        let v = view(152, cfg::CFG1_BSM, 0xF0, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::Bsm8);
        let v = view(152, cfg::CFG1_BSM, 0xC0, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), ProductType::Bsf8);

        let inverted = ProductTypeCodec::new(Bsx8Polarity::UsbMeansSrr);
        let v = view(152, cfg::CFG1_BSM, 0xF0, 0);
        assert_eq!(inverted.decode(&v, None).unwrap(), ProductType::Bsf8);
    }

    #[test]
    fn test_decode_unsupported() {
        let v = view(151, 0x42, 0, 0);
        let err = CODEC.decode(&v, None).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Codec(CodecError::UnsupportedProduct(_))
        ));
        let v = view(150, 0, 0, 0);
        assert!(CODEC.decode(&v, None).is_err());
    }

    #[test]
    fn test_encode_masks() {
        let outcome = CODEC.encode(&ProductType::Bs11Large, None, None).unwrap();
        assert_eq!(outcome.mask(), Some(&[0xFF, 0, 0, 0, 0, 0, 0][..]));

        let outcome = CODEC.encode(&ProductType::Bsm7, None, None).unwrap();
        assert_eq!(outcome.data()[..2], [151, cfg::CFG1_BSM]);
        assert_eq!(outcome.mask(), Some(&[0xFF, 0xFF, 0, 0, 0, 0, 0][..]));

        let outcome = CODEC.encode(&ProductType::Bsm8, None, None).unwrap();
        assert_eq!(
            outcome.mask(),
            Some(&[0xFF, 0xFF, cfg::CFG2_UART1_MASK, 0, 0, 0, 0][..])
        );
    }

    #[test]
    fn test_encode_bsm8_keeps_other_bus_bits() {
        let mut data = view(0, 0, 0b1100_0101, 0);
        CODEC.encode(&ProductType::Bsm8, Some(&mut data), None).unwrap();
        assert_eq!(data[CFG2], 0b1111_0101);
        assert_eq!(CODEC.decode(&data, None).unwrap(), ProductType::Bsm8);
    }

    #[test]
    fn test_encode_bsf8_tiers() {
        let hints = ProductTypeHints {
            attached_srr_module: Some(true),
            ..Default::default()
        };
        let mut data = view(0, 0, 0xFF, 0);
        CODEC
            .encode_with(&ProductType::Bsf8, &hints, Some(&mut data), None)
            .unwrap();
        assert_eq!(data[CFG1], cfg::CFG1_BSM);
        assert_eq!(CODEC.decode(&data, None).unwrap(), ProductType::Bsf8);

        // Falls back to the CFG1 already present
        CODEC.encode(&ProductType::Bsf8, Some(&mut data), None).unwrap();
        assert_eq!(data[CFG1], cfg::CFG1_BSM);

        // Defaults to no SRR module
        let mut data = view(0, 0, 0xFF, 0);
        CODEC.encode(&ProductType::Bsf8, Some(&mut data), None).unwrap();
        assert_eq!(data[CFG1], cfg::CFG1_BSF);
        assert_eq!(CODEC.decode(&data, None).unwrap(), ProductType::Bsf8);
    }

    #[test]
    fn test_encode_bs11_by_serial() {
        let hints = ProductTypeHints {
            serial_number: Some(301101),
            ..Default::default()
        };
        let outcome = CODEC
            .encode_with(&ProductType::Bs11LoopAntenna, &hints, None, None)
            .unwrap();
        assert_eq!(outcome.data()[CFG0], ProductFamily::Bs11Small as u8);

        let hints = ProductTypeHints {
            serial_number: Some(400000),
            ..Default::default()
        };
        let outcome = CODEC
            .encode_with(&ProductType::Bs11LoopAntenna, &hints, None, None)
            .unwrap();
        assert_eq!(outcome.data()[CFG0], ProductFamily::Bs11LoopAntenna as u8);
    }

    #[test]
    #[should_panic(expected = "loop antenna")]
    fn test_encode_bs11_small_with_loop_serial_panics() {
        let hints = ProductTypeHints {
            serial_number: Some(301101),
            ..Default::default()
        };
        let _ = CODEC.encode_with(&ProductType::Bs11Small, &hints, None, None);
    }

    #[test]
    fn test_encode_bs11_small_with_stored_loop_serial() {
        let mut data = view(0, 0, 0, 301101);
        assert!(CODEC.encode(&ProductType::Bs11Small, Some(&mut data), None).is_err());
    }

    #[test]
    fn test_encode_unsupported() {
        assert!(CODEC.encode(&ProductType::Bsx4, None, None).is_err());
        assert!(CODEC.encode(&ProductType::NotSet, None, None).is_err());
    }
}
