//! Instruction command bytes.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Which protocol an instruction byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    Legacy,
    Extended,
}

impl ProtocolFamily {
    /// Legacy response marker sitting inside the extended range.
    pub const LEGACY_CARVE_OUT: u8 = 0xC4;

    /// Classify a command byte.
    pub fn of(byte: u8) -> Self {
        if byte >= 0x80 && byte != Self::LEGACY_CARVE_OUT {
            ProtocolFamily::Extended
        } else {
            ProtocolFamily::Legacy
        }
    }
}

macro_rules! commands {
    ($($variant:ident = $code:literal => $name:literal,)*) => {
        /// Known instruction command bytes of both protocol families.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Command {
            $($variant = $code,)*
        }

        impl Command {
            /// Every known command.
            pub const ALL: &'static [Command] = &[$(Command::$variant,)*];

            pub fn from_u8(v: u8) -> Option<Self> {
                match v {
                    $($code => Some(Command::$variant),)*
                    _ => None,
                }
            }

            /// Name used in station documentation, e.g. `GET_SYSDATA`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Command::$variant => $name,)*
                }
            }
        }

        impl FromStr for Command {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Command::$variant),)*
                    _ => Err(ProtocolError::UnknownCommandName(s.to_string())),
                }
            }
        }
    };
}

commands! {
    // Legacy protocol
    BeepCard = 0x06 => "BEEP_CARD",
    SetCardnoOld = 0x30 => "SET_CARDNO_OLD",
    Card5DataOld = 0x31 => "CARD5_DATA_OLD",
    PunchTriggerVeryOld = 0x33 => "PUNCH_TRIGGER_VERYOLD",
    WriteCard5PageOld = 0x43 => "WRITE_CARD5_PAGE_OLD",
    CardMoveOld = 0x46 => "CARD_MOVE_OLD",
    By2Card5Old = 0x49 => "BY2_CARD5_OLD",
    By2CardOutOld = 0x4F => "BY2_CARD_OUT_OLD",
    SeriesRCard5 = 0x52 => "SERIES_R_CARD5",
    PunchTriggerOld = 0x53 => "PUNCH_TRIGGER_OLD",
    TimeTriggerOld = 0x54 => "TIME_TRIGGER_OLD",
    SeriesUCard5 = 0x55 => "SERIES_U_CARD5",
    Card6DataOld = 0x61 => "CARD6_DATA_OLD",
    WriteCard6PageOld = 0x62 => "WRITE_CARD6_PAGE_OLD",
    ReadCard6WordOld = 0x63 => "READ_CARD6_WORD_OLD",
    WriteCard6WordOld = 0x64 => "WRITE_CARD6_WORD_OLD",
    Card6InOld = 0x66 => "CARD6_IN_OLD",
    SetMsOld = 0x70 => "SET_MS_OLD",
    GetMsOld = 0x71 => "GET_MS_OLD",
    SetSdataOld = 0x72 => "SET_SDATA_OLD",
    GetSdataOld = 0x73 => "GET_SDATA_OLD",
    ReadBackupOld = 0x74 => "READ_BACKUP_OLD",
    EraseBDataOld = 0x75 => "ERASE_B_DATA_OLD",
    SetTimeOld = 0x76 => "SET_TIME_OLD",
    GetTimeOld = 0x77 => "GET_TIME_OLD",
    SetWperiodOld = 0x78 => "SET_WPERIOD_OLD",
    ResetOld = 0x79 => "RESET_OLD",
    ReadExtbackupOld = 0x7A => "READ_EXTBACKUP_OLD",
    SetBaudOld = 0x7E => "SET_BAUD_OLD",

    // Extended protocol
    WriteBackup = 0x80 => "WRITE_BACKUP",
    ReadBackup = 0x81 => "READ_BACKUP",
    SetSysdata = 0x82 => "SET_SYSDATA",
    GetSysdata = 0x83 => "GET_SYSDATA",
    SetPrint = 0x84 => "SET_PRINT",
    SetStddata = 0x86 => "SET_STDDATA",
    GetStddata = 0x87 => "GET_STDDATA",
    SetSysdata2 = 0x88 => "SET_SYSDATA2",
    GetSysdata2 = 0x89 => "GET_SYSDATA2",
    Boot = 0x8E => "BOOT",
    Reset = 0x8F => "RESET",
    SetSrrSysdata = 0xA2 => "SET_SRR_SYSDATA",
    GetSrrSysdata = 0xA3 => "GET_SRR_SYSDATA",
    SrrQuery = 0xA6 => "SRR_QUERY",
    SrrPing = 0xA7 => "SRR_PING",
    SrrAdhoc = 0xA8 => "SRR_ADHOC",
    Card5Data = 0xB1 => "CARD5_DATA",
    WriteCard5Page = 0xC3 => "WRITE_CARD5_PAGE",
    PunchTrigger = 0xD3 => "PUNCH_TRIGGER",
    ClearCardValue = 0xE0 => "CLEAR_CARD_VALUE",
    Card6Data = 0xE1 => "CARD6_DATA",
    WriteCard6Page = 0xE2 => "WRITE_CARD6_PAGE",
    WriteCard6Word = 0xE4 => "WRITE_CARD6_WORD",
    Card5In = 0xE5 => "CARD5_IN",
    Card6In = 0xE6 => "CARD6_IN",
    CardOut = 0xE7 => "CARD_OUT",
    CardXIn = 0xE8 => "CARD_X_IN",
    WriteCardXWord = 0xEA => "WRITE_CARDX_WORD",
    ReadCardXWord = 0xEB => "READ_CARDX_WORD",
    WriteCardXId = 0xEC => "WRITE_CARDX_ID",
    ReadCardXPage = 0xED => "READ_CARDX_PAGE",
    ReadCardXBlock = 0xEF => "READ_CARDX_BLOCK",
    SetMs = 0xF0 => "SET_MS",
    GetMs = 0xF1 => "GET_MS",
    EraseBData = 0xF5 => "ERASE_B_DATA",
    SetTime = 0xF6 => "SET_TIME",
    GetTime = 0xF7 => "GET_TIME",
    SetWperiod = 0xF8 => "SET_WPERIOD",
    Beep = 0xF9 => "BEEP",
    SetBaud = 0xFE => "SET_BAUD",
}

impl Command {
    /// Raw command byte.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn family(self) -> ProtocolFamily {
        ProtocolFamily::of(self.code())
    }

    pub fn is_extended(self) -> bool {
        self.family() == ProtocolFamily::Extended
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Command::from_u8(v).ok_or(ProtocolError::UnknownCommand(v))
    }
}

impl From<Command> for u8 {
    fn from(c: Command) -> u8 {
        c.code()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_classification() {
        assert_eq!(ProtocolFamily::of(0x80), ProtocolFamily::Extended);
        assert_eq!(ProtocolFamily::of(0xFE), ProtocolFamily::Extended);
        assert_eq!(ProtocolFamily::of(0xC4), ProtocolFamily::Legacy);
        assert_eq!(ProtocolFamily::of(0x7F), ProtocolFamily::Legacy);
        assert_eq!(ProtocolFamily::of(0x02), ProtocolFamily::Legacy);
    }

    #[test]
    fn test_table_consistency() {
        for &cmd in Command::ALL {
            assert_eq!(Command::from_u8(cmd.code()), Some(cmd));
            assert_eq!(cmd.name().parse::<Command>().unwrap(), cmd);
            assert_eq!(cmd.is_extended(), cmd.code() >= 0x80);
        }
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Command::try_from(0x85), Err(ProtocolError::UnknownCommand(0x85)));
        assert_eq!(Command::GetSysdata.to_string(), "GET_SYSDATA (0x83)");
    }
}
