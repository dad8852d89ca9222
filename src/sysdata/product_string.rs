//! Human-readable product string over `[CFG0, CFG1, CFG2, BN3, BN2, BN1, BN0]`.

use std::sync::OnceLock;

use regex::Regex;

use super::identity::{current_family, family, serial_from};
use crate::codec::{Codec, EncodeOutcome, MaskedData};
use crate::error::{CodecError, Result};
use crate::product::{cfg, is_bs11_loop_antenna, Bsx8Polarity, ProductFamily};

const CFG0: usize = 0;
const CFG1: usize = 1;
const CFG2: usize = 2;
const BN: std::ops::Range<usize> = 3..7;

const BSX_PATTERN: &str = concat!(
    r"^BS(?P<mf>[MF])(?P<num>[78])(?P<suffix>-(?:PS|P|S))?",
    r"(?: (?P<rfmod>RFMOD))?",
    r"(?: (?P<uart>UART0 \((?:USB|RS232)\) \+ UART1 \((?:USB|RS232)\)",
    r"|UART[01] \((?:USB|RS232)\)))?$",
);
const UART_PATTERN: &str = r"UART([01]) \((USB|RS232)\)";

/// Compiled product string patterns.
struct Patterns {
    bsx: Regex,
    uart: Regex,
    si_master: Regex,
    bsx8_srr: Regex,
    bs11_loop_antenna: Regex,
    bs11_large: Regex,
    bs11_small: Regex,
    si_point_sportident: Regex,
    si_point: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("invalid product string pattern");
        Patterns {
            bsx: re(BSX_PATTERN),
            uart: re(UART_PATTERN),
            si_master: re(r"^BSM8 (?:RFMOD )?Master$"),
            bsx8_srr: re(r"^BS[MF]8 UART1 \(SRR\)$"),
            bs11_loop_antenna: re(r"^BS11 loop antenna(?: RFMOD)?$"),
            bs11_large: re(r"^BS11 large(?: RFMOD)?$"),
            bs11_small: re(r"^BS11 small(?: RFMOD)?$"),
            si_point_sportident: re(r"^SI-Point SPORTident(?: RFMOD)?$"),
            si_point: re(r"^SI-Point(?: RFMOD)?$"),
        }
    })
}

/// Bytes the caller already knows, used where the destination is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductStringHints {
    pub cfg1: Option<u8>,
    pub cfg2: Option<u8>,
    pub serial_number: Option<u32>,
}

/// Product string codec, e.g. `"BSM7-P RFMOD UART0 (USB)"`.
///
/// The mask is built per call: bytes neither present in the destination
/// nor given as hints are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductStringCodec {
    polarity: Bsx8Polarity,
}

impl ProductStringCodec {
    pub const fn new(polarity: Bsx8Polarity) -> Self {
        Self { polarity }
    }

    fn bsx_text(
        &self,
        family: ProductFamily,
        cfg0: u8,
        cfg1: u8,
        cfg2: u8,
    ) -> Result<(String, String)> {
        let mut master = cfg0 & cfg::CFG0_FLAG_M != 0;
        let printout = cfg1 & cfg::CFG1_FLAG_PRINTOUT != 0;
        let uart1 = cfg1 & cfg::CFG1_FLAG_UART1 != 0;
        let uart0 = cfg1 & cfg::CFG1_FLAG_UART0 != 0;
        let sprint = cfg1 & cfg::CFG1_FLAG_SPRINT != 0;

        let mut suffix = String::new();
        if printout {
            suffix.push_str("-P");
        }
        if sprint {
            suffix.push_str(if suffix.is_empty() { "-S" } else { "S" });
        }

        let mut uart = String::new();
        if !(uart0 || uart1) {
            master = false;
        } else if family == ProductFamily::Bsx8
            && cfg1 == cfg::CFG1_BSM
            && !self.polarity.is_master(cfg2)
        {
            uart.push_str(" UART1 (SRR)");
            master = false;
        } else {
            uart.push_str(" UART");
            if uart0 {
                uart.push('0');
                uart.push_str(bus_text(
                    0,
                    cfg2 & cfg::CFG2_UART0_MASK,
                    cfg::CFG2_UART0_USB,
                    cfg::CFG2_UART0_RS232,
                )?);
            }
            if uart1 {
                uart.push_str(if uart0 { " + UART1" } else { "1" });
                uart.push_str(bus_text(
                    1,
                    cfg2 & cfg::CFG2_UART1_MASK,
                    cfg::CFG2_UART1_USB,
                    cfg::CFG2_UART1_RS232,
                )?);
            }
        }

        let num = cfg0 & cfg::CFG0_BOARDNUM_MASK;
        let base = format!("BS{}{num}{suffix}", if master { 'M' } else { 'F' });
        Ok((base, uart))
    }
}

/// Bus suffix for the masked `CFG2` bits of one UART.
fn bus_text(uart: u8, bits: u8, usb: u8, rs232: u8) -> Result<&'static str> {
    if bits == usb {
        Ok(" (USB)")
    } else if bits == rs232 {
        Ok(" (RS232)")
    } else {
        Err(CodecError::InvalidValue(format!(
            "UART{uart} bus bits 0b{bits:08b} are neither USB nor RS232"
        ))
        .into())
    }
}

fn reject_cfg1(cfg1: u8, reserved: &[u8]) -> Result<()> {
    if reserved.contains(&cfg1) {
        let expected: Vec<String> = reserved.iter().map(u8::to_string).collect();
        return Err(CodecError::InvalidValue(format!(
            "invalid CFG1: {cfg1}; expected anything else than {}",
            expected.join(", ")
        ))
        .into());
    }
    Ok(())
}

/// How a literal product string fixes `CFG1`.
enum Cfg1Rule {
    Keep,
    Force(u8),
    DefaultTo(u8),
}

impl Codec for ProductStringCodec {
    type Value = String;
    type Hints = ProductStringHints;

    fn decode_view(&self, view: &[u8]) -> Result<String> {
        let (cfg0, cfg1, cfg2) = (view[CFG0], view[CFG1], view[CFG2]);
        let family = family(cfg0)?;
        let serial = serial_from(&view[BN], family);
        let mut rfmod = cfg1 & cfg::CFG1_FLAG_RFMOD != 0;

        let (base, tail) = match family {
            ProductFamily::SimSrr => {
                rfmod = false;
                let kind = match cfg1 {
                    cfg::CFG1_SRR_AP => " AP (Dongle)",
                    cfg::CFG1_SRR_ED_LDK => " ED_LDK (BS)",
                    cfg::CFG1_SRR_ED_AH => " ED_AH (ActiveCard)",
                    _ => "",
                };
                (format!("SRR{kind}"), String::new())
            }
            ProductFamily::Bs8SiMaster => {
                let mf = if cfg0 & cfg::CFG0_FLAG_M != 0 { 'M' } else { 'F' };
                let num = cfg0 & cfg::CFG0_BOARDNUM_MASK;
                (format!("BS{mf}{num}"), " Master".to_string())
            }
            ProductFamily::Bsx7 | ProductFamily::Bsx8 => {
                self.bsx_text(family, cfg0, cfg1, cfg2)?
            }
            ProductFamily::Bs11LoopAntenna => ("BS11 loop antenna".to_string(), String::new()),
            ProductFamily::Bs11Large => ("BS11 large".to_string(), String::new()),
            ProductFamily::Bs11Small if is_bs11_loop_antenna(serial) => {
                ("BS11 loop antenna".to_string(), String::new())
            }
            ProductFamily::Bs11Small => ("BS11 small".to_string(), String::new()),
            ProductFamily::SiGsmDn => {
                rfmod = false;
                ("SI-GSMDN".to_string(), String::new())
            }
            ProductFamily::SiPoint => {
                let name = match cfg1 {
                    cfg::CFG1_POGOLF => "SI-Point Golf",
                    cfg::CFG1_POSI => "SI-Point SPORTident",
                    _ => "SI-Point",
                };
                (name.to_string(), String::new())
            }
            other => return Err(CodecError::UnsupportedProduct(other.to_string()).into()),
        };

        Ok(format!("{base}{}{tail}", if rfmod { " RFMOD" } else { "" }))
    }

    fn encode_view(
        &self,
        value: &String,
        hints: &ProductStringHints,
        current: Option<&[u8]>,
    ) -> Result<EncodeOutcome> {
        let s = value.as_str();
        let mut mask = [0u8; 7];
        mask[CFG0] = 0xFF;

        let cfg1 = hints.cfg1.or(current.map(|c| c[CFG1]));
        let cfg2 = hints.cfg2.or(current.map(|c| c[CFG2]));
        if cfg1.is_some() {
            mask[CFG1] = 0xFF;
        }
        if cfg2.is_some() {
            mask[CFG2] = 0xFF;
        }
        let serial = hints
            .serial_number
            .or_else(|| current.map(|c| serial_from(&c[BN], current_family(c[CFG0]))))
            .unwrap_or(0);
        if hints.serial_number.is_some() {
            mask[BN].fill(0xFF);
        }

        let mut cfg1_val = cfg1.unwrap_or(0);
        let mut cfg2_val = cfg2.unwrap_or(cfg::CFG2_DEFAULT);
        let mut rfmod_applies = true;
        let mut bsx = false;
        let re = patterns();

        let (family, rule) = if let Some(caps) = re.bsx.captures(s) {
            bsx = true;
            let family = if &caps["num"] == "7" {
                ProductFamily::Bsx7
            } else {
                ProductFamily::Bsx8
            };
            let suffix = caps.name("suffix").map_or("", |m| m.as_str());
            let uart = caps.name("uart").map_or("", |m| m.as_str());

            if cfg1_val == 0 {
                cfg1_val = cfg::CFG1_DEFAULT;
                mask[CFG1] |= cfg::CFG1_DEFAULT;
            }
            cfg1_val &= !cfg::CFG1_FLAGS_BSX;
            if suffix.contains('P') {
                cfg1_val |= cfg::CFG1_FLAG_PRINTOUT;
            }
            if uart.contains("UART1") {
                cfg1_val |= cfg::CFG1_FLAG_UART1;
            }
            if uart.contains("UART0") {
                cfg1_val |= cfg::CFG1_FLAG_UART0;
            }
            if suffix.contains('S') {
                cfg1_val |= cfg::CFG1_FLAG_SPRINT;
            }
            mask[CFG1] |= cfg::CFG1_FLAGS_BSX;

            let uart_bits = cfg::CFG2_UART0_MASK | cfg::CFG2_UART1_MASK;
            cfg2_val |= uart_bits;
            mask[CFG2] |= uart_bits;
            for caps in re.uart.captures_iter(uart) {
                let shift = if &caps[1] == "1" { 3 } else { 0 };
                let bus = if &caps[2] == "USB" {
                    cfg::CFG2_UART0_USB
                } else {
                    cfg::CFG2_UART0_RS232
                };
                cfg2_val = (cfg2_val & !(cfg::CFG2_UART0_MASK << shift)) | (bus << shift);
            }
            (family, Cfg1Rule::Keep)
        } else if re.si_master.is_match(s) {
            (ProductFamily::Bs8SiMaster, Cfg1Rule::DefaultTo(cfg::CFG1_BSF))
        } else if re.bsx8_srr.is_match(s) {
            cfg2_val = (cfg2_val & !cfg::CFG2_UART1_MASK) | self.polarity.uart1_bits(false);
            mask[CFG2] |= cfg::CFG2_UART1_MASK;
            rfmod_applies = false;
            (ProductFamily::Bsx8, Cfg1Rule::Force(cfg::CFG1_BSM))
        } else if s == "SRR" {
            reject_cfg1(
                cfg1_val,
                &[cfg::CFG1_SRR_ED_AH, cfg::CFG1_SRR_ED_LDK, cfg::CFG1_SRR_AP],
            )?;
            rfmod_applies = false;
            (ProductFamily::SimSrr, Cfg1Rule::Keep)
        } else if let Some(srr_cfg1) = match s {
            "SRR AP (Dongle)" => Some(cfg::CFG1_SRR_AP),
            "SRR ED_LDK (BS)" => Some(cfg::CFG1_SRR_ED_LDK),
            "SRR ED_AH (ActiveCard)" => Some(cfg::CFG1_SRR_ED_AH),
            _ => None,
        } {
            (ProductFamily::SimSrr, Cfg1Rule::Force(srr_cfg1))
        } else if re.bs11_loop_antenna.is_match(s) {
            if is_bs11_loop_antenna(serial) {
                (ProductFamily::Bs11Small, Cfg1Rule::DefaultTo(cfg::CFG1_BS11SMALL))
            } else {
                (ProductFamily::Bs11LoopAntenna, Cfg1Rule::DefaultTo(cfg::CFG1_BSM))
            }
        } else if re.bs11_large.is_match(s) {
            (ProductFamily::Bs11Large, Cfg1Rule::DefaultTo(cfg::CFG1_BS11LARGE))
        } else if re.bs11_small.is_match(s) {
            (ProductFamily::Bs11Small, Cfg1Rule::DefaultTo(cfg::CFG1_BS11SMALL))
        } else if s == "SI-GSMDN" {
            rfmod_applies = false;
            (ProductFamily::SiGsmDn, Cfg1Rule::DefaultTo(cfg::CFG1_SIGSMDN))
        } else if s == "SI-Point Golf" {
            (ProductFamily::SiPoint, Cfg1Rule::Force(cfg::CFG1_POGOLF))
        } else if re.si_point_sportident.is_match(s) {
            (ProductFamily::SiPoint, Cfg1Rule::Force(cfg::CFG1_POSI))
        } else if re.si_point.is_match(s) {
            reject_cfg1(cfg1_val, &[cfg::CFG1_POGOLF, cfg::CFG1_POSI])?;
            (ProductFamily::SiPoint, Cfg1Rule::Keep)
        } else {
            return Err(CodecError::UnsupportedProduct(s.to_string()).into());
        };

        match rule {
            Cfg1Rule::Force(v) => {
                cfg1_val = v;
                mask[CFG1] = 0xFF;
                rfmod_applies = false;
            }
            Cfg1Rule::DefaultTo(v) if cfg1_val == 0 => {
                cfg1_val = v;
                mask[CFG1] = 0xFF;
            }
            Cfg1Rule::DefaultTo(_) | Cfg1Rule::Keep => {}
        }

        if rfmod_applies {
            if s.contains("RFMOD") {
                cfg1_val |= cfg::CFG1_FLAG_RFMOD;
            } else {
                cfg1_val &= !cfg::CFG1_FLAG_RFMOD;
            }
            mask[CFG1] |= cfg::CFG1_FLAG_RFMOD;
        }

        // CFG1 145 on a Bsx8 lets the UART1 bus stand for an SRR module
        if bsx
            && family == ProductFamily::Bsx8
            && cfg1_val == cfg::CFG1_BSM
            && !self.polarity.is_master(cfg2_val)
        {
            return Err(CodecError::InvalidValue(format!(
                "{s}: UART1 bus reads as an SRR module under {:?}",
                self.polarity
            ))
            .into());
        }

        let mut data = vec![family.into(), cfg1_val, cfg2_val];
        data.extend_from_slice(&serial.to_be_bytes());
        Ok(EncodeOutcome::Masked(MaskedData::new(data, mask.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODEC: ProductStringCodec = ProductStringCodec::new(Bsx8Polarity::UsbMeansMaster);
    const INVERTED: ProductStringCodec = ProductStringCodec::new(Bsx8Polarity::UsbMeansSrr);

    fn view(cfg0: u8, cfg1: u8, cfg2: u8, serial: u32) -> Vec<u8> {
        let mut v = vec![cfg0, cfg1, cfg2];
        v.extend_from_slice(&serial.to_be_bytes());
        v
    }

    fn roundtrip(codec: &ProductStringCodec, s: &str) -> String {
        let mut data = view(0, 0, 0xFF, 0);
        codec.encode(&s.to_string(), Some(&mut data), None).unwrap();
        codec.decode(&data, None).unwrap()
    }

    #[test]
    fn test_decode_bsx_flags() {
        let cfg1 = cfg::CFG1_DEFAULT
            | cfg::CFG1_FLAG_PRINTOUT
            | cfg::CFG1_FLAG_UART0
            | cfg::CFG1_FLAG_RFMOD;
        let v = view(151, cfg1, 0xFE, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), "BSM7-P RFMOD UART0 (USB)");

        let cfg1 = cfg::CFG1_DEFAULT | cfg::CFG1_FLAG_PRINTOUT | cfg::CFG1_FLAG_SPRINT;
        let v = view(151, cfg1, 0xFF, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), "BSF7-PS");

        let cfg1 = cfg::CFG1_DEFAULT | cfg::CFG1_FLAG_UART0 | cfg::CFG1_FLAG_UART1;
        let v = view(152, cfg1, 0b0010_1110, 0);
        assert_eq!(
            CODEC.decode(&v, None).unwrap(),
            "BSM8 UART0 (USB) + UART1 (RS232)"
        );
    }

    #[test]
    fn test_decode_bsx8_srr() {
        let v = view(152, cfg::CFG1_BSM, 0b1100_0111, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), "BSF8 UART1 (SRR)");
        let v = view(152, cfg::CFG1_BSM, 0b1111_0111, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), "BSM8 UART1 (USB)");
    }

    #[test]
    fn test_decode_unknown_bus_bits() {
        let v = view(151, cfg::CFG1_DEFAULT | cfg::CFG1_FLAG_UART0, 0x00, 1);
        let err = CODEC.decode(&v, None).unwrap_err();
        assert!(matches!(err, crate::Error::Codec(CodecError::InvalidValue(_))));

        let v = view(151, cfg::CFG1_DEFAULT | cfg::CFG1_FLAG_UART1, 0b0011_1110, 0);
        assert!(CODEC.decode(&v, None).is_err());

        // Zero UART1 bits only mean something as an SRR module
        let v = view(152, cfg::CFG1_BSM, 0b1100_0111, 0);
        assert_eq!(CODEC.decode(&v, None).unwrap(), "BSF8 UART1 (SRR)");
        assert!(INVERTED.decode(&v, None).is_err());
    }

    #[test]
    fn test_decode_literals() {
        assert_eq!(CODEC.decode(&view(33, 111, 0, 0), None).unwrap(), "SRR AP (Dongle)");
        assert_eq!(CODEC.decode(&view(33, 0, 0, 0), None).unwrap(), "SRR");
        assert_eq!(CODEC.decode(&view(157, 27, 0, 0), None).unwrap(), "SI-GSMDN");
        assert_eq!(CODEC.decode(&view(136, 0x81, 0, 0), None).unwrap(), "BSM8 Master");
        assert_eq!(
            CODEC.decode(&view(241, 146, 0, 0), None).unwrap(),
            "SI-Point SPORTident RFMOD"
        );
        assert_eq!(
            CODEC.decode(&view(155, 205, 0, 301101), None).unwrap(),
            "BS11 loop antenna"
        );
        assert_eq!(CODEC.decode(&view(155, 205, 0, 400000), None).unwrap(), "BS11 small");
    }

    #[test]
    fn test_decode_unsupported() {
        assert!(CODEC.decode(&view(148, 0, 0, 0), None).is_err());
        assert!(CODEC.decode(&view(0, 0, 0, 0), None).is_err());
    }

    #[test]
    fn test_roundtrips() {
        for s in [
            "BSM7-P RFMOD UART0 (USB)",
            "BSM8-PS UART0 (RS232) + UART1 (USB)",
            "BSM7 UART1 (RS232)",
            "BSF8 UART1 (SRR)",
            "BSM8 RFMOD Master",
            "SRR AP (Dongle)",
            "SRR ED_LDK (BS)",
            "SRR ED_AH (ActiveCard)",
            "BS11 large RFMOD",
            "BS11 small",
            "BS11 loop antenna",
            "SI-GSMDN",
            "SI-Point Golf",
            "SI-Point SPORTident RFMOD",
            "SI-Point",
        ] {
            for codec in [CODEC, INVERTED] {
                assert_eq!(roundtrip(&codec, s), s, "{:?}", codec.polarity);
            }
        }
    }

    #[test]
    fn test_encode_bsm8_uart1_follows_polarity() {
        let mut data = view(0, 0, 0xFF, 0);
        let err = INVERTED
            .encode(&"BSM8 UART1 (USB)".to_string(), Some(&mut data), None)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Codec(CodecError::InvalidValue(_))));
        assert_eq!(data, view(0, 0, 0xFF, 0));
        assert_eq!(roundtrip(&INVERTED, "BSM8 UART1 (RS232)"), "BSM8 UART1 (RS232)");

        assert!(CODEC
            .encode(&"BSM8 UART1 (RS232)".to_string(), None, None)
            .is_err());
        assert_eq!(roundtrip(&CODEC, "BSM8 UART1 (USB)"), "BSM8 UART1 (USB)");
    }

    #[test]
    fn test_patterns_compiled_once() {
        assert!(std::ptr::eq(patterns(), patterns()));
        assert!(patterns().bsx.is_match("BSF7-PS RFMOD"));
        assert!(!patterns().si_point.is_match("SI-Point Golf"));
    }

    #[test]
    fn test_encode_bs11_loop_antenna_by_serial() {
        let mut data = view(0, 0, 0, 301570);
        CODEC
            .encode(&"BS11 loop antenna".to_string(), Some(&mut data), None)
            .unwrap();
        assert_eq!(data[CFG0], ProductFamily::Bs11Small as u8);
        assert_eq!(CODEC.decode(&data, None).unwrap(), "BS11 loop antenna");
    }

    #[test]
    fn test_encode_mask_tracks_known_bytes() {
        let outcome = CODEC.encode(&"SI-GSMDN".to_string(), None, None).unwrap();
        assert_eq!(outcome.mask(), Some(&[0xFF, 0xFF, 0, 0, 0, 0, 0][..]));

        let hints = ProductStringHints {
            serial_number: Some(5),
            ..Default::default()
        };
        let outcome = CODEC
            .encode_with(&"SRR".to_string(), &hints, None, None)
            .unwrap();
        assert_eq!(outcome.mask(), Some(&[0xFF, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF][..]));
    }

    #[test]
    fn test_encode_rejects() {
        let err = CODEC.encode(&"BSX9".to_string(), None, None).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Codec(CodecError::UnsupportedProduct(_))
        ));

        let mut data = view(33, 111, 0, 0);
        assert!(CODEC.encode(&"SRR".to_string(), Some(&mut data), None).is_err());
        let mut data = view(241, 144, 0, 0);
        assert!(CODEC.encode(&"SI-Point".to_string(), Some(&mut data), None).is_err());
    }
}
