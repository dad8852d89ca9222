//! Three-byte `YY MM DD` dates.

use chrono::{Datelike, Local, NaiveDate};

use super::{Codec, EncodeOutcome};
use crate::error::{CodecError, Result};

/// Date stored as two-digit year, month, day.
///
/// Years up to the reference year's two digits decode into the 2000s, later
/// ones into the 1900s. Without an explicit reference the current year is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateCodec {
    reference_year: Option<i32>,
}

impl DateCodec {
    pub const fn new() -> Self {
        Self {
            reference_year: None,
        }
    }

    /// Pivot on a fixed year instead of the current one.
    pub const fn with_reference_year(year: i32) -> Self {
        Self {
            reference_year: Some(year),
        }
    }

    fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Local::now().year())
    }

    /// Full year a two-digit year decodes to.
    fn century(&self, yy: i32) -> i32 {
        if yy <= self.reference_year() - 2000 {
            2000 + yy
        } else {
            1900 + yy
        }
    }
}

impl Codec for DateCodec {
    type Value = NaiveDate;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<NaiveDate> {
        let &[yy, mm, dd] = view else {
            return Err(CodecError::LengthMismatch {
                expected: 3,
                got: view.len(),
            }
            .into());
        };
        let yy = i32::from(yy);
        if yy > 99 {
            return Err(CodecError::InvalidValue(format!("year byte out of range: {yy}")).into());
        }
        let year = self.century(yy);
        NaiveDate::from_ymd_opt(year, u32::from(mm), u32::from(dd)).ok_or_else(|| {
            CodecError::InvalidValue(format!("invalid date: {year:04}-{mm:02}-{dd:02}")).into()
        })
    }

    fn encode_view(&self, value: &NaiveDate, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
        let year = value.year();
        let yy = year.rem_euclid(100);
        if self.century(yy) != year {
            return Err(CodecError::InvalidValue(format!(
                "year {year} outside the two-digit window ending {}",
                self.reference_year()
            ))
            .into());
        }
        Ok(EncodeOutcome::Bytes(vec![
            yy as u8,
            value.month() as u8,
            value.day() as u8,
        ]))
    }
}
