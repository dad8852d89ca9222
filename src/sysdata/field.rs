//! Logical fields and the bytes they occupy.

use std::fmt;
use std::str::FromStr;

use super::SysAddr;
use crate::error::CodecError;

/// A named system-data field.
///
/// Fields may share bytes: `CFG0` feeds the family, type, board version and
/// several family-dependent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AttachedSrrModule,
    BackupMemorySize,
    BatteryCapacity,
    BatteryDate,
    BoardVersion,
    BusType,
    FirmwareVersion,
    HasBattery,
    ProductConfiguration,
    ProductFamily,
    ProductionDate,
    ProductString,
    ProductType,
    SerialNumber,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::AttachedSrrModule,
        Field::BackupMemorySize,
        Field::BatteryCapacity,
        Field::BatteryDate,
        Field::BoardVersion,
        Field::BusType,
        Field::FirmwareVersion,
        Field::HasBattery,
        Field::ProductConfiguration,
        Field::ProductFamily,
        Field::ProductionDate,
        Field::ProductString,
        Field::ProductType,
        Field::SerialNumber,
    ];

    /// Addresses read and written by the field's codec, in codec order.
    pub fn addrs(self) -> &'static [SysAddr] {
        use SysAddr::*;
        match self {
            Field::AttachedSrrModule => &[Cfg0, Cfg1, Cfg2],
            Field::BackupMemorySize => &[Bms, Cfg0],
            Field::BatteryCapacity => &[BattCap3, BattCap2, BattCap1, BattCap0, Cfg0],
            Field::BatteryDate => &[BattYear, BattMonth, BattDay, Cfg0],
            Field::BoardVersion | Field::ProductFamily => &[Cfg0],
            Field::BusType => &[Cfg2],
            Field::FirmwareVersion => &[Sv2, Sv1, Sv0],
            Field::HasBattery | Field::ProductConfiguration => &[Cfg1, Cfg0],
            Field::ProductionDate => &[ProdYear, ProdMonth, ProdDay],
            Field::ProductString | Field::ProductType => &[Cfg0, Cfg1, Cfg2, Bn3, Bn2, Bn1, Bn0],
            Field::SerialNumber => &[Bn3, Bn2, Bn1, Bn0, Cfg0],
        }
    }

    /// Byte offsets of [`Field::addrs`].
    pub fn idxs(self) -> Vec<usize> {
        self.addrs().iter().map(|a| a.offset()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::AttachedSrrModule => "AttachedSrrModule",
            Field::BackupMemorySize => "BackupMemorySize",
            Field::BatteryCapacity => "BatteryCapacity",
            Field::BatteryDate => "BatteryDate",
            Field::BoardVersion => "BoardVersion",
            Field::BusType => "BusType",
            Field::FirmwareVersion => "FirmwareVersion",
            Field::HasBattery => "HasBattery",
            Field::ProductConfiguration => "ProductConfiguration",
            Field::ProductFamily => "ProductFamily",
            Field::ProductionDate => "ProductionDate",
            Field::ProductString => "ProductString",
            Field::ProductType => "ProductType",
            Field::SerialNumber => "SerialNumber",
        }
    }
}

impl FromStr for Field {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| CodecError::UnknownEnumName {
                name: "Field",
                key: s.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_offsets() {
        assert_eq!(Field::SerialNumber.idxs(), vec![0x00, 0x01, 0x02, 0x03, 0x0C]);
        assert_eq!(Field::FirmwareVersion.idxs(), vec![0x05, 0x06, 0x07]);
        assert_eq!(
            Field::ProductType.idxs(),
            vec![0x0C, 0x0B, 0x04, 0x00, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn test_field_names() {
        for &field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert!("Nope".parse::<Field>().is_err());
    }

    #[test]
    fn test_shared_cfg0() {
        let sharing = Field::ALL
            .iter()
            .filter(|f| f.addrs().contains(&SysAddr::Cfg0))
            .count();
        assert_eq!(sharing, 11);
    }
}
