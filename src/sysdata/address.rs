//! System-data byte addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

macro_rules! sysaddr {
    ($($variant:ident = $offset:literal => $name:literal,)*) => {
        /// Named offsets within the 128-byte system-data block.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum SysAddr {
            $($variant = $offset,)*
        }

        impl SysAddr {
            pub const ALL: &'static [SysAddr] = &[$(SysAddr::$variant,)*];

            pub fn from_u8(v: u8) -> Option<Self> {
                match v {
                    $($offset => Some(SysAddr::$variant),)*
                    _ => None,
                }
            }

            /// Firmware name of the address, e.g. `CFG0`.
            pub fn name(self) -> &'static str {
                match self {
                    $(SysAddr::$variant => $name,)*
                }
            }
        }

        impl FromStr for SysAddr {
            type Err = CodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(SysAddr::$variant),)*
                    _ => SysAddr::alias(s).ok_or_else(|| CodecError::UnknownEnumName {
                        name: "SysAddr",
                        key: s.to_string(),
                    }),
                }
            }
        }
    };
}

sysaddr! {
    Bn3 = 0x00 => "BN3",
    Bn2 = 0x01 => "BN2",
    Bn1 = 0x02 => "BN1",
    Bn0 = 0x03 => "BN0",
    Cfg2 = 0x04 => "CFG2",
    Sv2 = 0x05 => "SV2",
    Sv1 = 0x06 => "SV1",
    Sv0 = 0x07 => "SV0",
    ProdYear = 0x08 => "PROD_YEAR",
    ProdMonth = 0x09 => "PROD_MONTH",
    ProdDay = 0x0A => "PROD_DAY",
    Cfg1 = 0x0B => "CFG1",
    Cfg0 = 0x0C => "CFG0",
    Bms = 0x0D => "BMS",
    XCap = 0x0E => "X_CAP",
    XTime = 0x0F => "X_TIME",
    Act = 0x10 => "ACT",
    Stb = 0x11 => "STB",
    Pun = 0x12 => "PUN",
    Lumi = 0x13 => "LUMI",
    Fld = 0x14 => "FLD",
    BattYear = 0x15 => "BATT_YEAR",
    BattMonth = 0x16 => "BATT_MONTH",
    BattDay = 0x17 => "BATT_DAY",
    BattCap3 = 0x18 => "BATT_CAP3",
    BattCap2 = 0x19 => "BATT_CAP2",
    BattCap1 = 0x1A => "BATT_CAP1",
    BattCap0 = 0x1B => "BATT_CAP0",
    Ep3 = 0x1C => "EP3",
    Ep2 = 0x1D => "EP2",
    Usb = 0x1E => "USB",
    Rs232 = 0x1F => "RS232",
    Sst = 0x20 => "SST",
    Ep1 = 0x21 => "EP1",
    Ep0 = 0x22 => "EP0",
    ActM = 0x23 => "ACT_M",
    ActH = 0x24 => "ACT_H",
    ActL = 0x25 => "ACT_L",
    StbM = 0x26 => "STB_M",
    StbH = 0x27 => "STB_H",
    StbL = 0x28 => "STB_L",
    PunM = 0x29 => "PUN_M",
    PunH = 0x2A => "PUN_H",
    PunL = 0x2B => "PUN_L",
    Ms = 0x2C => "MS",
    Sca = 0x2D => "SCA",
    Sicf1 = 0x2E => "SICF1",
    Sicf0 = 0x2F => "SICF0",
    Fcg = 0x30 => "FCG",
    Ewd = 0x31 => "EWD",
    Eshdn = 0x32 => "ESHDN",
    CardBlocks = 0x33 => "CARD_BLOCKS",
    Pi3 = 0x34 => "PI3",
    Pi2 = 0x35 => "PI2",
    Pi1 = 0x36 => "PI1",
    Pi0 = 0x37 => "PI0",
    Pw3 = 0x38 => "PW3",
    Pw2 = 0x39 => "PW2",
    Pw1 = 0x3A => "PW1",
    Pw0 = 0x3B => "PW0",
    Print = 0x3C => "PRINT",
    Bckf = 0x3D => "BCKF",
    Baud0 = 0x3E => "BAUD0",
    Baud1 = 0x3F => "BAUD1",
    Tc1 = 0x40 => "TC1",
    Tc0 = 0x41 => "TC0",
    Tt1 = 0x42 => "TT1",
    Tt0 = 0x43 => "TT0",
    To1 = 0x44 => "TO1",
    To0 = 0x45 => "TO0",
    BeepLen1 = 0x46 => "BEEP_LEN1",
    BeepLen0 = 0x47 => "BEEP_LEN0",
    PulsScanAct1 = 0x48 => "PULS_SCAN_ACT1",
    PulsScanAct0 = 0x49 => "PULS_SCAN_ACT0",
    PulsScanStb1 = 0x4A => "PULS_SCAN_STB1",
    PulsScanStb0 = 0x4B => "PULS_SCAN_STB0",
    VbatMin1 = 0x4C => "VBAT_MIN1",
    VbatMin0 = 0x4D => "VBAT_MIN0",
    BakeField = 0x4E => "BAKE_FIELD",
    BakeDelay = 0x4F => "BAKE_DELAY",
    AdcvBat1 = 0x50 => "ADCV_BAT1",
    AdcvBat0 = 0x51 => "ADCV_BAT0",
    AdcvBate1 = 0x52 => "ADCV_BATE1",
    AdcvBate0 = 0x53 => "ADCV_BATE0",
    Fopt = 0x58 => "FOPT",
    Facu = 0x59 => "FACU",
    Fzyk = 0x5A => "FZYK",
    Mhts = 0x5B => "MHTS",
    BootV3 = 0x60 => "BOOT_V3",
    BootV2 = 0x61 => "BOOT_V2",
    BootV1 = 0x62 => "BOOT_V1",
    BootV0 = 0x63 => "BOOT_V0",
    FuncMo7 = 0x64 => "FUNC_MO7",
    FuncMo6 = 0x65 => "FUNC_MO6",
    FuncMo5 = 0x66 => "FUNC_MO5",
    FuncMo4 = 0x67 => "FUNC_MO4",
    FuncMo3 = 0x68 => "FUNC_MO3",
    FuncMo2 = 0x69 => "FUNC_MO2",
    FuncMo1 = 0x6A => "FUNC_MO1",
    FuncMo0 = 0x6B => "FUNC_MO0",
    GsmBdata = 0x6D => "GSM_BDATA",
    GsmAsnd = 0x6E => "GSM_ASND",
    GsmGsmon = 0x6F => "GSM_GSMON",
    Sc = 0x70 => "SC",
    Mo = 0x71 => "MO",
    Cnl = 0x72 => "CNL",
    SmCnh = 0x73 => "SM_CNH",
    Cpc = 0x74 => "CPC",
    PotYy = 0x75 => "POT_YY",
    PotMm = 0x76 => "POT_MM",
    PotDd = 0x77 => "POT_DD",
    PotDow = 0x78 => "POT_DOW",
    PotTimh = 0x79 => "POT_TIMH",
    PotTiml = 0x7A => "POT_TIML",
    TotDow = 0x7B => "TOT_DOW",
    TotTimh = 0x7C => "TOT_TIMH",
    TotTiml = 0x7D => "TOT_TIML",
    OffValh = 0x7E => "OFF_VALH",
    OffVall = 0x7F => "OFF_VALL",
}

impl SysAddr {
    // SRR access points reuse the radio configuration bytes
    pub const AP_FREQ_1: SysAddr = SysAddr::Fcg;
    pub const AP_FREQ_2: SysAddr = SysAddr::Ewd;
    pub const AP_FREQ_3: SysAddr = SysAddr::Eshdn;
    pub const AP_FREQ_4: SysAddr = SysAddr::CardBlocks;
    pub const AP_FREQ_C: SysAddr = SysAddr::Pi3;
    pub const AP_HANDSHAKE: SysAddr = SysAddr::Baud0;
    pub const AP_TELEGRAM: SysAddr = SysAddr::Bckf;
    pub const AP_PROT: SysAddr = SysAddr::Baud1;

    // Stamp buffer pointers overlay the function module bytes
    pub const STAMP_BUFFER_SIZE: SysAddr = SysAddr::FuncMo7;
    pub const STAMP_BUFFER_IN: SysAddr = SysAddr::FuncMo5;
    pub const STAMP_BUFFER_OUT_UART: SysAddr = SysAddr::FuncMo3;
    pub const STAMP_BUFFER_OUT_GSM: SysAddr = SysAddr::FuncMo1;
    fn alias(name: &str) -> Option<Self> {
        let addr = match name {
            "AP_FREQ_1" => Self::AP_FREQ_1,
            "AP_FREQ_2" => Self::AP_FREQ_2,
            "AP_FREQ_3" => Self::AP_FREQ_3,
            "AP_FREQ_4" => Self::AP_FREQ_4,
            "AP_FREQ_C" => Self::AP_FREQ_C,
            "AP_HANDSHAKE" => Self::AP_HANDSHAKE,
            "AP_TELEGRAM" => Self::AP_TELEGRAM,
            "AP_PROT" => Self::AP_PROT,
            "STAMP_BUFFER_SIZE" => Self::STAMP_BUFFER_SIZE,
            "STAMP_BUFFER_IN" => Self::STAMP_BUFFER_IN,
            "STAMP_BUFFER_OUT_UART" => Self::STAMP_BUFFER_OUT_UART,
            "STAMP_BUFFER_OUT_GSM" => Self::STAMP_BUFFER_OUT_GSM,
            _ => return None,
        };
        Some(addr)
    }

    /// Byte offset into the system-data block.
    pub fn offset(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_offsets() {
        assert_eq!(SysAddr::Bn3.offset(), 0x00);
        assert_eq!(SysAddr::Bn0.offset(), 0x03);
        assert_eq!(SysAddr::Cfg2.offset(), 0x04);
        assert_eq!(SysAddr::Sv2.offset(), 0x05);
        assert_eq!(SysAddr::Sv0.offset(), 0x07);
        assert_eq!(SysAddr::Cfg1.offset(), 0x0B);
        assert_eq!(SysAddr::Cfg0.offset(), 0x0C);
        assert_eq!(SysAddr::Bms.offset(), 0x0D);
        assert_eq!(SysAddr::OffVall.offset(), 0x7F);
    }

    #[test]
    fn test_names() {
        assert_eq!("BATT_CAP3".parse::<SysAddr>().unwrap(), SysAddr::BattCap3);
        assert_eq!("AP_PROT".parse::<SysAddr>().unwrap(), SysAddr::Baud1);
        assert!("NOPE".parse::<SysAddr>().is_err());
        for &addr in SysAddr::ALL {
            assert_eq!(SysAddr::from_u8(addr as u8), Some(addr));
            assert_eq!(addr.name().parse::<SysAddr>().unwrap(), addr);
        }
    }
}
