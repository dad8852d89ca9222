//! Station fields whose meaning depends on the product family.
//!
//! Battery and backup memory data only exist on control stations; every
//! codec here carries `CFG0` as its last view byte (never written) to find
//! out which family it is looking at.

use chrono::NaiveDate;

use super::identity::{current_family, family};
use crate::codec::{Codec, DateCodec, EncodeOutcome, MaskedData};
use crate::error::{CodecError, Result};
use crate::product::{cfg, Bsx8Polarity, ProductFamily};

/// Capacities at or above this many mAh read as empty.
const BATT_CAP_LIMIT_MAH: f64 = 100_000.0;
/// Battery capacity units per mAh.
const BATT_CAP_SCALE: f64 = 3600.0;

/// Fail unless the destination (if known) is a control station.
fn require_control_station(field: &str, current: Option<&[u8]>) -> Result<()> {
    let Some(cfg0) = current.and_then(<[u8]>::last) else {
        return Ok(());
    };
    let family = current_family(*cfg0);
    if family.is_control_station() {
        Ok(())
    } else {
        Err(CodecError::NotApplicable(format!("{field} is not available on {family}")).into())
    }
}

/// Whether an SRR module is fitted, over `[CFG0, CFG1, CFG2]`.
///
/// Only a `Bsx8` with `CFG1 == 145` can carry one; the UART1 bits of `CFG2`
/// then tell master and SRR apart according to the configured polarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedSrrModuleCodec {
    polarity: Bsx8Polarity,
}

impl AttachedSrrModuleCodec {
    pub const fn new(polarity: Bsx8Polarity) -> Self {
        Self { polarity }
    }
}

impl Codec for AttachedSrrModuleCodec {
    type Value = bool;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<bool> {
        let family = family(view[0])?;
        Ok(family == ProductFamily::Bsx8
            && view[1] == cfg::CFG1_BSM
            && !self.polarity.is_master(view[2]))
    }

    fn encode_view(&self, value: &bool, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        let (cfg0, cfg1, cfg2) = current.map_or((0, 0, cfg::CFG2_DEFAULT), |c| (c[0], c[1], c[2]));
        let bsx8 = ProductFamily::Bsx8 as u8;

        if *value {
            if (cfg0 != 0 && cfg0 != bsx8) || (cfg1 != 0 && cfg1 != cfg::CFG1_BSM) {
                return Err(CodecError::InvalidValue(format!(
                    "cannot attach an SRR module to CFG0={cfg0} CFG1={cfg1}; \
                     set ProductType to Bsm8 first"
                ))
                .into());
            }
            let cfg2 = (cfg2 & !cfg::CFG2_UART1_MASK) | self.polarity.uart1_bits(false);
            return Ok(EncodeOutcome::Masked(MaskedData::new(
                vec![bsx8, cfg::CFG1_BSM, cfg2],
                vec![0xFF, 0xFF, cfg::CFG2_UART1_MASK],
            )));
        }

        if cfg0 == bsx8 && cfg1 == cfg::CFG1_BSM {
            let cfg2 = (cfg2 & !cfg::CFG2_UART1_MASK) | self.polarity.uart1_bits(true);
            return Ok(EncodeOutcome::Masked(MaskedData::new(
                vec![cfg0, cfg1, cfg2],
                vec![0, 0, cfg::CFG2_UART1_MASK],
            )));
        }
        Ok(EncodeOutcome::Masked(MaskedData::untouched(3)))
    }
}

/// Whether the station runs on a battery, over `[CFG1, CFG0]`. Read only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasBatteryCodec;

impl Codec for HasBatteryCodec {
    /// Always `Some` on decode; only `None` may be encoded.
    type Value = Option<bool>;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<Option<bool>> {
        let family = family(view[1])?;
        let powered = (family != ProductFamily::Bsx8 && view[0] == cfg::CFG1_BSM)
            || family == ProductFamily::SimSrr;
        Ok(Some(!powered))
    }

    fn encode_view(
        &self,
        value: &Option<bool>,
        _: &(),
        _: Option<&[u8]>,
    ) -> Result<EncodeOutcome> {
        match value {
            Some(_) => Err(CodecError::DerivedOnly("HasBattery").into()),
            None => Ok(EncodeOutcome::Masked(MaskedData::untouched(2))),
        }
    }
}

/// Backup memory size in KiB, over `[BMS, CFG0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupMemorySizeCodec;

impl Codec for BackupMemorySizeCodec {
    type Value = Option<u8>;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<Option<u8>> {
        if !family(view[1])?.is_control_station() {
            return Ok(None);
        }
        Ok(Some(if view[0] == cfg::BMS_UNSET { 0 } else { view[0] }))
    }

    fn encode_view(&self, value: &Option<u8>, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        let Some(size) = *value else {
            return Ok(EncodeOutcome::Masked(MaskedData::untouched(2)));
        };
        require_control_station("BackupMemorySize", current)?;
        let bms = match size {
            0 => cfg::BMS_UNSET,
            cfg::BMS_UNSET => {
                return Err(
                    CodecError::InvalidValue(format!("backup memory size out of range: {size}"))
                        .into(),
                )
            }
            n => n,
        };
        let cfg0 = current.map_or(0, |c| c[1]);
        Ok(EncodeOutcome::Masked(MaskedData::new(vec![bms, cfg0], vec![0xFF, 0])))
    }
}

/// Date the battery was fitted, over `[BATT_YEAR, BATT_MONTH, BATT_DAY, CFG0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatteryDateCodec {
    date: DateCodec,
}

impl BatteryDateCodec {
    pub const fn new() -> Self {
        Self {
            date: DateCodec::new(),
        }
    }

    pub const fn with_reference_year(year: i32) -> Self {
        Self {
            date: DateCodec::with_reference_year(year),
        }
    }
}

impl Codec for BatteryDateCodec {
    type Value = Option<NaiveDate>;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<Option<NaiveDate>> {
        if !family(view[3])?.is_control_station() {
            return Ok(None);
        }
        self.date.decode_view(&view[..3]).map(Some)
    }

    fn encode_view(
        &self,
        value: &Option<NaiveDate>,
        _: &(),
        current: Option<&[u8]>,
    ) -> Result<EncodeOutcome> {
        let Some(date) = value else {
            return Ok(EncodeOutcome::Masked(MaskedData::untouched(4)));
        };
        require_control_station("BatteryDate", current)?;
        let mut data = self.date.encode_view(date, &(), None)?.into_bytes();
        data.push(current.map_or(0, |c| c[3]));
        Ok(EncodeOutcome::Masked(MaskedData::new(data, vec![0xFF, 0xFF, 0xFF, 0])))
    }
}

/// Battery capacity in mAh, over `[BATT_CAP3..BATT_CAP0, CFG0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatteryCapacityCodec;

impl Codec for BatteryCapacityCodec {
    type Value = Option<f64>;
    type Hints = ();

    fn decode_view(&self, view: &[u8]) -> Result<Option<f64>> {
        if !family(view[4])?.is_control_station() {
            return Ok(None);
        }
        let raw = u32::from_be_bytes([view[0], view[1], view[2], view[3]]);
        let mah = f64::from(raw) / BATT_CAP_SCALE;
        Ok(Some(if mah >= BATT_CAP_LIMIT_MAH { 0.0 } else { mah }))
    }

    fn encode_view(&self, value: &Option<f64>, _: &(), current: Option<&[u8]>) -> Result<EncodeOutcome> {
        let Some(mah) = *value else {
            return Ok(EncodeOutcome::Masked(MaskedData::untouched(5)));
        };
        require_control_station("BatteryCapacity", current)?;
        if !(0.0..BATT_CAP_LIMIT_MAH).contains(&mah) {
            return Err(
                CodecError::InvalidValue(format!("battery capacity out of range: {mah} mAh"))
                    .into(),
            );
        }
        let raw = (mah * BATT_CAP_SCALE).round() as u32;
        let mut data = raw.to_be_bytes().to_vec();
        data.push(current.map_or(0, |c| c[4]));
        Ok(EncodeOutcome::Masked(MaskedData::new(
            data,
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0],
        )))
    }
}
