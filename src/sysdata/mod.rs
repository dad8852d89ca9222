//! The 128-byte system-data block of a station.
//!
//! [`SystemData`] owns the bytes and is the only place that maps logical
//! [`Field`]s onto offsets. Field codecs see a gathered view of the bytes a
//! field occupies and write back through masked merges, so fields sharing a
//! byte (most of them share `CFG0`) never clobber each other's bits.

mod address;
mod field;
mod identity;
mod product_string;
mod product_type;
mod station;

pub use address::SysAddr;
pub use field::Field;
pub use identity::{
    BoardVersionCodec, FirmwareVersionCodec, ProductFamilyCodec, SerialNumberCodec, BUS_TYPE,
    PRODUCTION_DATE, PRODUCT_CONFIGURATION, PRODUCT_FAMILY,
};
pub use product_string::{ProductStringCodec, ProductStringHints};
pub use product_type::{ProductTypeCodec, ProductTypeHints};
pub use station::{
    AttachedSrrModuleCodec, BackupMemorySizeCodec, BatteryCapacityCodec, BatteryDateCodec,
    HasBatteryCodec,
};

use chrono::NaiveDate;
use tracing::debug;

use crate::codec::{Codec, EncodeOutcome, MaskedData};
use crate::error::{CodecError, Result};
use crate::product::{Bsx8Polarity, ProductFamily, ProductType};
use crate::protocol::{Command, Frame};

/// Size of the system-data block.
pub const SYSDATA_SIZE: usize = 128;

/// One `GET_SYSDATA` response: `CN1 CN0 ADR DATA...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysDataChunk {
    pub station_code: u16,
    pub address: u8,
    pub data: Vec<u8>,
}

impl SysDataChunk {
    /// Split a response payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let [cn1, cn0, address, data @ ..] = payload else {
            return Err(CodecError::LengthMismatch {
                expected: 3,
                got: payload.len(),
            }
            .into());
        };
        Ok(Self {
            station_code: u16::from_be_bytes([*cn1, *cn0]),
            address: *address,
            data: data.to_vec(),
        })
    }

    /// Split the payload of a `GET_SYSDATA` frame.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        if frame.command() != Command::GetSysdata {
            return Err(CodecError::InvalidValue(format!(
                "expected a GET_SYSDATA response, got {}",
                frame.command()
            ))
            .into());
        }
        Self::from_payload(frame.payload())
    }
}

/// A station's system data.
#[derive(Clone, PartialEq, Eq)]
pub struct SystemData {
    bytes: [u8; SYSDATA_SIZE],
    polarity: Bsx8Polarity,
}

impl SystemData {
    /// An all-zero block.
    pub fn new() -> Self {
        Self {
            bytes: [0; SYSDATA_SIZE],
            polarity: Bsx8Polarity::default(),
        }
    }

    pub fn from_bytes(bytes: [u8; SYSDATA_SIZE]) -> Self {
        Self {
            bytes,
            ..Self::new()
        }
    }

    /// Use `polarity` to tell `Bsm8` from `Bsf8` stations.
    pub fn with_polarity(mut self, polarity: Bsx8Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn polarity(&self) -> Bsx8Polarity {
        self.polarity
    }

    pub fn as_bytes(&self) -> &[u8; SYSDATA_SIZE] {
        &self.bytes
    }

    /// Byte at a named address.
    pub fn get(&self, addr: SysAddr) -> u8 {
        self.bytes[addr.offset()]
    }

    /// Install `data` at `address`, as read back from the station.
    pub fn load(&mut self, address: u8, data: &[u8]) -> Result<()> {
        let start = usize::from(address);
        let end = start + data.len();
        if end > SYSDATA_SIZE {
            return Err(CodecError::InvalidValue(format!(
                "system data chunk 0x{address:02X}+{} exceeds {SYSDATA_SIZE} bytes",
                data.len()
            ))
            .into());
        }
        self.bytes[start..end].copy_from_slice(data);
        debug!(address, len = data.len(), "loaded system data");
        Ok(())
    }

    /// Install a response chunk.
    pub fn load_chunk(&mut self, chunk: &SysDataChunk) -> Result<()> {
        self.load(chunk.address, &chunk.data)
    }

    /// Offsets a field occupies, in codec order.
    pub fn field_idxs(field: Field) -> Vec<usize> {
        field.idxs()
    }

    /// Current bytes of a field, in codec order.
    pub fn field_bytes(&self, field: Field) -> Vec<u8> {
        field.addrs().iter().map(|&a| self.get(a)).collect()
    }

    /// Merge a masked write into the bytes of `field`.
    ///
    /// Panics if the write does not cover exactly the field's bytes.
    pub fn apply_masked_write(&mut self, field: Field, write: &MaskedData) {
        let mut view = self.field_bytes(field);
        assert_eq!(
            write.data.len(),
            view.len(),
            "masked write length does not match field {field}"
        );
        EncodeOutcome::Masked(write.clone()).merge_into(&mut view);
        self.store(field, &view);
    }

    /// Write a merged view back to the offsets of `field`.
    fn store(&mut self, field: Field, view: &[u8]) {
        for (&addr, &after) in field.addrs().iter().zip(view) {
            let slot = &mut self.bytes[addr.offset()];
            if *slot != after {
                debug!(%field, %addr, before = *slot, after, "system data write");
                *slot = after;
            }
        }
    }

    /// Decode `field` with `codec`.
    pub fn read<C: Codec>(&self, field: Field, codec: &C) -> Result<C::Value> {
        codec.decode(&self.field_bytes(field), None)
    }

    /// Encode `value` into `field` with `codec`.
    pub fn write<C: Codec>(
        &mut self,
        field: Field,
        codec: &C,
        value: &C::Value,
        hints: &C::Hints,
    ) -> Result<()> {
        let mut view = self.field_bytes(field);
        codec.encode_with(value, hints, Some(view.as_mut_slice()), None)?;
        self.store(field, &view);
        Ok(())
    }

    pub fn serial_number(&self) -> Result<u32> {
        self.read(Field::SerialNumber, &SerialNumberCodec)
    }

    pub fn set_serial_number(&mut self, serial: u32) -> Result<()> {
        self.write(Field::SerialNumber, &SerialNumberCodec, &serial, &())
    }

    pub fn bus_type(&self) -> Result<u8> {
        self.read(Field::BusType, &BUS_TYPE)
    }

    pub fn set_bus_type(&mut self, bus_type: u8) -> Result<()> {
        self.write(Field::BusType, &BUS_TYPE, &bus_type, &())
    }

    pub fn firmware_version(&self) -> Result<u32> {
        self.read(Field::FirmwareVersion, &FirmwareVersionCodec)
    }

    pub fn set_firmware_version(&mut self, version: u32) -> Result<()> {
        self.write(Field::FirmwareVersion, &FirmwareVersionCodec, &version, &())
    }

    pub fn production_date(&self) -> Result<NaiveDate> {
        self.read(Field::ProductionDate, &PRODUCTION_DATE)
    }

    pub fn set_production_date(&mut self, date: NaiveDate) -> Result<()> {
        self.write(Field::ProductionDate, &PRODUCTION_DATE, &date, &())
    }

    /// Raw `[CFG1, CFG0]`.
    pub fn product_configuration(&self) -> Result<Vec<u8>> {
        self.read(Field::ProductConfiguration, &PRODUCT_CONFIGURATION)
    }

    pub fn set_product_configuration(&mut self, bytes: &[u8]) -> Result<()> {
        self.write(
            Field::ProductConfiguration,
            &PRODUCT_CONFIGURATION,
            &bytes.to_vec(),
            &(),
        )
    }

    pub fn product_family(&self) -> Result<ProductFamily> {
        self.read(Field::ProductFamily, &PRODUCT_FAMILY)
    }

    pub fn set_product_family(&mut self, family: ProductFamily) -> Result<()> {
        self.write(Field::ProductFamily, &PRODUCT_FAMILY, &family, &())
    }

    pub fn board_version(&self) -> Result<u8> {
        self.read(Field::BoardVersion, &BoardVersionCodec)
    }

    pub fn set_board_version(&mut self, version: u8) -> Result<()> {
        self.write(Field::BoardVersion, &BoardVersionCodec, &version, &())
    }

    pub fn product_type(&self) -> Result<ProductType> {
        self.read(Field::ProductType, &ProductTypeCodec::new(self.polarity))
    }

    pub fn set_product_type(&mut self, product: ProductType) -> Result<()> {
        self.set_product_type_with(product, &ProductTypeHints::default())
    }

    pub fn set_product_type_with(
        &mut self,
        product: ProductType,
        hints: &ProductTypeHints,
    ) -> Result<()> {
        let codec = ProductTypeCodec::new(self.polarity);
        self.write(Field::ProductType, &codec, &product, hints)
    }

    pub fn product_string(&self) -> Result<String> {
        self.read(Field::ProductString, &ProductStringCodec::new(self.polarity))
    }

    pub fn set_product_string(&mut self, product: &str) -> Result<()> {
        self.set_product_string_with(product, &ProductStringHints::default())
    }

    pub fn set_product_string_with(
        &mut self,
        product: &str,
        hints: &ProductStringHints,
    ) -> Result<()> {
        let codec = ProductStringCodec::new(self.polarity);
        self.write(Field::ProductString, &codec, &product.to_string(), hints)
    }

    pub fn attached_srr_module(&self) -> Result<bool> {
        self.read(
            Field::AttachedSrrModule,
            &AttachedSrrModuleCodec::new(self.polarity),
        )
    }

    pub fn set_attached_srr_module(&mut self, attached: bool) -> Result<()> {
        let codec = AttachedSrrModuleCodec::new(self.polarity);
        self.write(Field::AttachedSrrModule, &codec, &attached, &())
    }

    /// Derived from the product; there is no setter.
    pub fn has_battery(&self) -> Result<bool> {
        Ok(self
            .read(Field::HasBattery, &HasBatteryCodec)?
            .unwrap_or_default())
    }

    pub fn backup_memory_size(&self) -> Result<Option<u8>> {
        self.read(Field::BackupMemorySize, &BackupMemorySizeCodec)
    }

    pub fn set_backup_memory_size(&mut self, size: Option<u8>) -> Result<()> {
        self.write(Field::BackupMemorySize, &BackupMemorySizeCodec, &size, &())
    }

    pub fn battery_date(&self) -> Result<Option<NaiveDate>> {
        self.read(Field::BatteryDate, &BatteryDateCodec::new())
    }

    pub fn set_battery_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.write(Field::BatteryDate, &BatteryDateCodec::new(), &date, &())
    }

    /// Battery capacity in mAh.
    pub fn battery_capacity(&self) -> Result<Option<f64>> {
        self.read(Field::BatteryCapacity, &BatteryCapacityCodec)
    }

    pub fn set_battery_capacity(&mut self, mah: Option<f64>) -> Result<()> {
        self.write(Field::BatteryCapacity, &BatteryCapacityCodec, &mah, &())
    }
}

impl Default for SystemData {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemData")
            .field("bytes", &hex::encode(self.bytes))
            .field("polarity", &self.polarity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IndexedData;
    use crate::protocol::decode_frame;

    /// `GET_SYSDATA` response of an SRR dongle, address 0, 128 bytes.
    const DEMO_FRAME: &str = concat!(
        "ff020283830846000d000846043331310e06046f21ffffff0206001b173f1818",
        "062908053efe0aeb0aebffffffffffffffffffffffffffff92ba1a4200ffffe1",
        "ffffffffffffffff0b070c000d5d0e440fec102d113b12731323143b1501191d",
        "1a1c1bc71c001db021b6221023ea240a250026112c882d312e0bffffffffffff",
        "ffffffffffffffffc42803",
    );

    fn demo() -> SystemData {
        let bytes = hex::decode(DEMO_FRAME).unwrap();
        let frame = decode_frame(&bytes).unwrap();
        let chunk = SysDataChunk::from_frame(&frame).unwrap();
        let mut sysdata = SystemData::new();
        sysdata.load_chunk(&chunk).unwrap();
        sysdata
    }

    #[test]
    fn test_demo_chunk() {
        let bytes = hex::decode(DEMO_FRAME).unwrap();
        let frame = decode_frame(&bytes).unwrap();
        assert_eq!(frame.crc(), [0xC4, 0x28]);
        let chunk = SysDataChunk::from_frame(&frame).unwrap();
        assert_eq!(chunk.station_code, 0x0846);
        assert_eq!(chunk.address, 0);
        assert_eq!(chunk.data.len(), SYSDATA_SIZE);
    }

    #[test]
    fn test_demo_fields() {
        let sysdata = demo();
        assert_eq!(sysdata.serial_number().unwrap(), 2118);
        assert_eq!(sysdata.firmware_version().unwrap(), 311);
        assert_eq!(
            sysdata.production_date().unwrap(),
            NaiveDate::from_ymd_opt(2014, 6, 4).unwrap()
        );
        assert_eq!(sysdata.product_family().unwrap(), ProductFamily::SimSrr);
        assert_eq!(sysdata.product_type().unwrap(), ProductType::SimSrr);
        assert_eq!(sysdata.product_string().unwrap(), "SRR AP (Dongle)");
        assert_eq!(sysdata.bus_type().unwrap(), 0x04);
        assert_eq!(sysdata.product_configuration().unwrap(), vec![0x6F, 0x21]);
        assert!(!sysdata.has_battery().unwrap());
        assert!(!sysdata.attached_srr_module().unwrap());
        assert_eq!(sysdata.backup_memory_size().unwrap(), None);
        assert_eq!(sysdata.battery_capacity().unwrap(), None);
        assert_eq!(sysdata.battery_date().unwrap(), None);
    }

    #[test]
    fn test_load_bounds() {
        let mut sysdata = SystemData::new();
        assert!(sysdata.load(0x70, &[0; 0x20]).is_err());
        sysdata.load(0x7E, &[1, 2]).unwrap();
        assert_eq!(sysdata.as_bytes()[0x7F], 2);
        assert!(SysDataChunk::from_payload(&[0x08, 0x46]).is_err());
    }

    #[test]
    fn test_shared_bytes_are_not_clobbered() {
        let mut sysdata = SystemData::new();
        sysdata.set_product_type(ProductType::Bsm7).unwrap();
        sysdata.set_serial_number(12345).unwrap();
        sysdata.set_bus_type(0x3E).unwrap();
        assert_eq!(sysdata.get(SysAddr::Cfg0), 151);
        assert_eq!(sysdata.board_version().unwrap(), 7);

        sysdata.set_board_version(7).unwrap();
        assert_eq!(sysdata.product_type().unwrap(), ProductType::Bsm7);
        assert_eq!(sysdata.serial_number().unwrap(), 12345);
        assert_eq!(sysdata.bus_type().unwrap(), 0x3E);
    }

    #[test]
    fn test_control_station_fields() {
        let mut sysdata = SystemData::new();
        sysdata.set_product_type(ProductType::Bs11Large).unwrap();
        sysdata.set_backup_memory_size(Some(128)).unwrap();
        sysdata.set_battery_capacity(Some(1.5)).unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 9, 30).unwrap();
        sysdata.set_battery_date(Some(date)).unwrap();

        assert_eq!(sysdata.backup_memory_size().unwrap(), Some(128));
        assert_eq!(sysdata.battery_capacity().unwrap(), Some(1.5));
        assert_eq!(sysdata.battery_date().unwrap(), Some(date));
        assert!(sysdata.has_battery().unwrap());
        assert_eq!(sysdata.product_type().unwrap(), ProductType::Bs11Large);
    }

    /// Writes only `CFG0`, addressed by its position in the field view.
    struct Cfg0Only;

    impl Codec for Cfg0Only {
        type Value = u8;
        type Hints = ();

        fn decode_view(&self, view: &[u8]) -> Result<u8> {
            Ok(view[1])
        }

        fn encode_view(&self, value: &u8, _: &(), _: Option<&[u8]>) -> Result<EncodeOutcome> {
            Ok(EncodeOutcome::Indexed(IndexedData {
                data: vec![*value],
                idxs: vec![1],
            }))
        }
    }

    #[test]
    fn test_write_honours_codec_offsets() {
        let mut sysdata = SystemData::new();
        sysdata.set_product_configuration(&[0x81, 0x97]).unwrap();

        sysdata
            .write(Field::ProductConfiguration, &Cfg0Only, &0x42, &())
            .unwrap();
        assert_eq!(sysdata.get(SysAddr::Cfg0), 0x42);
        assert_eq!(sysdata.get(SysAddr::Cfg1), 0x81);
        assert_eq!(
            sysdata.read(Field::ProductConfiguration, &Cfg0Only).unwrap(),
            0x42
        );
    }

    #[test]
    fn test_apply_masked_write() {
        let mut sysdata = SystemData::new();
        sysdata.set_bus_type(0xA5).unwrap();
        sysdata.apply_masked_write(Field::BusType, &MaskedData::new(vec![0x0F], vec![0x3C]));
        assert_eq!(sysdata.bus_type().unwrap(), 0x8D);
        sysdata.apply_masked_write(Field::BusType, &MaskedData::untouched(1));
        assert_eq!(sysdata.bus_type().unwrap(), 0x8D);
    }

    #[test]
    fn test_write_with_polarity() {
        let mut sysdata = SystemData::new().with_polarity(Bsx8Polarity::UsbMeansSrr);
        sysdata.set_product_type(ProductType::Bsm8).unwrap();
        assert_eq!(sysdata.product_type().unwrap(), ProductType::Bsm8);
        sysdata.set_attached_srr_module(true).unwrap();
        assert_eq!(sysdata.product_type().unwrap(), ProductType::Bsf8);
        assert_eq!(sysdata.product_string().unwrap(), "BSF8 UART1 (SRR)");
    }
}
