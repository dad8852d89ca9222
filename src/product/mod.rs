//! Hardware product identification.
//!
//! A station reports its model through the `CFG0`, `CFG1` and `CFG2`
//! system-data bytes. `CFG0` carries the [`ProductFamily`]; the fine-grained
//! [`ProductType`] additionally depends on `CFG1`, on UART bits of `CFG2`
//! and, for BS11 stations, on the serial number.

pub mod cfg;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Serial numbers of BS11 loop antennas that report the `Bs11Small` family.
pub const BS11_LOOP_ANTENNA_SN: [u32; 29] = [
    301101, 301102, 301103, 301104, 301105, 301410, 301411, 301568, 301569, 301570, 301571,
    301572, 301573, 301734, 301735, 301743, 301744, 301745, 301875, 301876, 301920, 302065,
    302066, 302354, 302355, 302356, 302357, 302358, 302359,
];

/// True when `serial` is a loop antenna shipped with the `Bs11Small` family byte.
pub fn is_bs11_loop_antenna(serial: u32) -> bool {
    BS11_LOOP_ANTENNA_SN.contains(&serial)
}

macro_rules! product_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $repr:ty {
            $($variant:ident = $value:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn from_repr(v: $repr) -> Option<Self> {
                match v {
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = CodecError;

            fn try_from(v: $repr) -> Result<Self, Self::Error> {
                $name::from_repr(v).ok_or(CodecError::InvalidEnumValue {
                    name: stringify!($name),
                    value: u64::from(v),
                })
            }
        }

        impl From<$name> for $repr {
            fn from(v: $name) -> $repr {
                v as $repr
            }
        }

        impl FromStr for $name {
            type Err = CodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)*
                    _ => Err(CodecError::UnknownEnumName {
                        name: stringify!($name),
                        key: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

product_enum! {
    /// Coarse hardware family, stored in `CFG0`.
    ProductFamily: u8 {
        NotSet = 0,
        SimSrr = 33,
        Bs8SiMaster = 136,
        Bs10UfoReaderSiGolf = 138,
        Bs10UfoReaderSportIdent = 139,
        Bsx4 = 148,
        Bsx6 = 150,
        Bsx7 = 151,
        Bsx8 = 152,
        Bs11LoopAntenna = 153,
        Bs11Large = 154,
        Bs11Small = 155,
        Bs12GsmUart = 156,
        SiGsmDn = 157,
        SiPoint = 241,
    }
}

product_enum! {
    /// Fine hardware model; the value is `CFG1 * 256 + CFG0`.
    ProductType: u16 {
        NotSet = 0,
        SimSrr = 33,
        Bs8SiMaster = 33160,
        Bs10UfoReaderSiGolf = 35210,
        Bs10UfoReaderSportIdent = 35211,
        Bsx4 = 148,
        Bsx6 = 150,
        Bsf7 = 33175,
        Bsm7 = 37271,
        Bs7S = 38295,
        Bs7P = 45463,
        Bsf8 = 33176,
        Bsm8 = 37272,
        Bs11LoopAntenna = 37273,
        Bs11Large = 40346,
        Bs11Small = 52635,
        Bs12GsmUart = 6556,
        SiGsmDn = 7069,
        SiPointGolf = 37105,
        SiPointSportident = 37617,
    }
}

impl ProductFamily {
    /// Control stations carry battery and backup memory data.
    pub fn is_control_station(self) -> bool {
        matches!(
            self,
            ProductFamily::Bs8SiMaster
                | ProductFamily::Bsx7
                | ProductFamily::Bsx8
                | ProductFamily::Bs11LoopAntenna
                | ProductFamily::Bs11Large
                | ProductFamily::Bs11Small
                | ProductFamily::SiGsmDn
        )
    }
}

impl ProductType {
    /// `CFG1` byte implied by the type value.
    pub fn cfg1(self) -> u8 {
        (u16::from(self) >> 8) as u8
    }

    /// `CFG0` byte implied by the type value.
    pub fn cfg0(self) -> u8 {
        u16::from(self) as u8
    }
}

/// How UART1 bits of `CFG2` separate `Bsm8` from `Bsf8` when `CFG1` is 145.
///
/// Firmware revisions disagree on the direction, so it is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bsx8Polarity {
    /// UART1 on USB means master (`Bsm8`); anything else means an SRR module.
    #[default]
    UsbMeansMaster,
    /// UART1 on USB means an SRR module is attached (`Bsf8`).
    UsbMeansSrr,
}

impl Bsx8Polarity {
    /// Whether `cfg2` describes a master station.
    pub fn is_master(self, cfg2: u8) -> bool {
        let usb = cfg2 & cfg::CFG2_UART1_MASK == cfg::CFG2_UART1_USB;
        match self {
            Bsx8Polarity::UsbMeansMaster => usb,
            Bsx8Polarity::UsbMeansSrr => !usb,
        }
    }

    /// UART1 bits to write for a master (`true`) or SRR-equipped station.
    ///
    /// A `UsbMeansSrr` master gets RS232 so its product string names a bus.
    pub fn uart1_bits(self, master: bool) -> u8 {
        match (self, master) {
            (Bsx8Polarity::UsbMeansMaster, true) | (Bsx8Polarity::UsbMeansSrr, false) => {
                cfg::CFG2_UART1_USB
            }
            (Bsx8Polarity::UsbMeansMaster, false) => cfg::CFG2_UART1_SRR,
            (Bsx8Polarity::UsbMeansSrr, true) => cfg::CFG2_UART1_RS232,
        }
    }
}

impl FromStr for Bsx8Polarity {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usb-means-master" => Ok(Bsx8Polarity::UsbMeansMaster),
            "usb-means-srr" => Ok(Bsx8Polarity::UsbMeansSrr),
            _ => Err(CodecError::UnknownEnumName {
                name: "Bsx8Polarity",
                key: s.to_string(),
            }),
        }
    }
}
