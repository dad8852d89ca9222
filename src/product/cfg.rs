//! Configuration byte constants.

// CFG0
pub const CFG0_FLAG_M: u8 = 0b1000_0000;
pub const CFG0_BOARDNUM_MASK: u8 = 0b0000_1111;

// CFG1 model values
pub const CFG1_BSF: u8 = 129;
pub const CFG1_BSM: u8 = 145;
pub const CFG1_BSS: u8 = 149;
pub const CFG1_BSP: u8 = 177;
pub const CFG1_POGOLF: u8 = 144;
pub const CFG1_POSI: u8 = 146;
pub const CFG1_BS11LARGE: u8 = 157;
pub const CFG1_BS11SMALL: u8 = 205;
pub const CFG1_SIGSMDN: u8 = 27;
pub const CFG1_SRR_AP: u8 = 111;
pub const CFG1_SRR_ED_LDK: u8 = 107;
pub const CFG1_SRR_ED_AH: u8 = 106;

/// Written when a BSx string is encoded over an unset `CFG1`.
pub const CFG1_DEFAULT: u8 = 0b1000_0001;

// CFG1 flag bits
pub const CFG1_FLAG_PRINTOUT: u8 = 0b0010_0000;
pub const CFG1_FLAG_UART1: u8 = 0b0001_0000;
pub const CFG1_FLAG_UART0: u8 = 0b0000_1000;
pub const CFG1_FLAG_SPRINT: u8 = 0b0000_0100;
pub const CFG1_FLAG_RFMOD: u8 = 0b0000_0010;
pub const CFG1_FLAGS_BSX: u8 =
    CFG1_FLAG_PRINTOUT | CFG1_FLAG_UART1 | CFG1_FLAG_UART0 | CFG1_FLAG_SPRINT;

// CFG2 bus bits
pub const CFG2_DEFAULT: u8 = 0xFF;
pub const CFG2_UART0_MASK: u8 = 0b0000_0111;
pub const CFG2_UART0_USB: u8 = 0b0000_0110;
pub const CFG2_UART0_RS232: u8 = 0b0000_0101;
pub const CFG2_UART1_MASK: u8 = 0b0011_1000;
pub const CFG2_UART1_USB: u8 = 0b0011_0000;
pub const CFG2_UART1_RS232: u8 = 0b0010_1000;
pub const CFG2_UART1_SRR: u8 = 0b0000_0000;

/// Backup memory size byte of an unprogrammed station.
pub const BMS_UNSET: u8 = 0xFF;
