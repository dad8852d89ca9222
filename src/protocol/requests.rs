//! Request payloads for system-data access.

use super::{Command, Frame};
use crate::error::{CodecError, Result};
use crate::sysdata::SYSDATA_SIZE;

/// Build a `GET_SYSDATA` request for `len` bytes starting at `adr`.
pub fn get_sysdata(adr: u8, len: u8) -> Result<Frame> {
    check_range(adr, len)?;
    Frame::new(Command::GetSysdata, [adr, len])
}

/// Parse a `GET_SYSDATA` request payload into `(adr, len)`.
pub fn parse_get_sysdata(payload: &[u8]) -> Result<(u8, u8)> {
    let &[adr, len] = payload else {
        return Err(CodecError::LengthMismatch {
            expected: 2,
            got: payload.len(),
        }
        .into());
    };
    check_range(adr, len)?;
    Ok((adr, len))
}

fn check_range(adr: u8, len: u8) -> Result<()> {
    if adr as usize + len as usize > SYSDATA_SIZE {
        return Err(CodecError::InvalidValue(format!(
            "system data range 0x{adr:02X}+{len} exceeds {SYSDATA_SIZE} bytes"
        ))
        .into());
    }
    Ok(())
}
