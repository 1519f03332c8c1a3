// SPDX-License-Identifier: MIT

//! A wrapper around the HID Core items. This module handles splitting
//! a report descriptor byte stream into its individual items.
//! Interpretation of the resulting items (building the collection and field tree)
//! is left to the parser that builds the [DeviceDescriptor](crate::DeviceDescriptor).
//!
//! In this document and unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).
//!
//! # Itemizing HID Report Descriptors
//!
//! Entry point is usually [`ReportDescriptorItems::try_from(bytes)`](ReportDescriptorItems::try_from):
//!
//! ```
//! # use hidtree::hid::*;
//! # fn parse(bytes: &[u8]) {
//! let rdesc_items = ReportDescriptorItems::try_from(bytes).unwrap();
//! for rdesc_item in rdesc_items.iter() {
//!     println!("Item at offset {:02x}", rdesc_item.offset());
//!     match rdesc_item.item_type() {
//!         ItemType::Main(MainItem::Output(_)) => println!("This is an output item"),
//!         _ => {}
//!     }
//! }
//! # }
//! ```

use crate::types::*;
use crate::{ensure, ParserError};

use thiserror::Error;
use tracing::trace;

/// Convenience function to be extract a single bit as bool from a value
fn bit(bits: u32, bit: u8) -> bool {
    bits & (1 << bit) != 0
}

/// Represents one value extracted from the (LE) data bytes of an item.
///
/// Whether the value is signed depends on the item and, for the maxima,
/// on the previously seen minimum. The item layer therefore keeps the
/// raw value together with its width and leaves the interpretation to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidValue {
    value: u32,
    nbytes: usize,
}

impl HidValue {
    /// The length of the value in bytes (0, 1, 2 or 4), required to
    /// determine where the sign bit is.
    pub fn len(&self) -> usize {
        self.nbytes
    }

    pub fn is_empty(&self) -> bool {
        self.nbytes == 0
    }

    /// The value zero-extended to 32 bits.
    pub fn unsigned(&self) -> u32 {
        self.value
    }

    /// The value sign-extended from its byte width.
    pub fn signed(&self) -> i32 {
        match self.nbytes {
            0 => 0,
            1 => (self.value as u8) as i8 as i32,
            2 => (self.value as u16) as i16 as i32,
            _ => self.value as i32,
        }
    }
}

impl TryFrom<&[u8]> for HidValue {
    type Error = HidError;

    fn try_from(bytes: &[u8]) -> Result<HidValue> {
        let value = match bytes {
            [] => 0,
            [b0] => u32::from(*b0),
            [b0, b1] => u32::from(u16::from_le_bytes([*b0, *b1])),
            [b0, b1, b2, b3] => u32::from_le_bytes([*b0, *b1, *b2, *b3]),
            _ => {
                return Err(HidError::InvalidData {
                    data: 0,
                    message: format!("Invalid data length {}", bytes.len()),
                })
            }
        };
        Ok(HidValue {
            value,
            nbytes: bytes.len(),
        })
    }
}

#[derive(Error, Debug)]
pub enum HidError {
    #[error("Invalid data {data}: {message}")]
    InvalidData { data: u32, message: String },
    #[error("Insufficient data")]
    InsufficientData,
}

type Result<T> = std::result::Result<T, HidError>;

/// The type of a HID item may be one of [MainItem], [GlobalItem], or [LocalItem].
/// These items comprise the report descriptor and how the report descriptor should
/// be compiled.
///
/// The special types [ItemType::Long] and [ItemType::Reserved] are placeholders
/// for items this crate skips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemType {
    Main(MainItem),
    Global(GlobalItem),
    Local(LocalItem),
    Long,
    Reserved,
}

/// Main items, see Section 6.2.2.4.
///
/// > Main items are used to either define or group certain types of data fields within a
/// > Report descriptor. There are two types of Main items: data and non-data. Data-
/// > type Main items are used to create a field within a report and include Input,
/// > Output, and Feature. Other items do not create fields and are subsequently
/// > referred to as non-data Main items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MainItem {
    Input(Attributes),
    Output(Attributes),
    Feature(Attributes),
    Collection(CollectionKind),
    EndCollection,
    /// A main item tag that HID 1.11 reserves (`byte[0] & 0xFC`).
    Reserved { tag: u8 },
}

/// Main Data Item, see Section 6.2.2.5.
///
/// A data item is a [MainItem] that "create a field within a report and include Input,
/// Output, and Feature.". These have shared properties provided by this trait.
///
/// These properties come in pairs (bit set or unset in the HID report descriptor item),
/// for readability in the caller, a function is provided for each state.
pub trait MainDataItem {
    /// True if the data is constant and never changes. This typically means the data
    /// can be ignored.
    fn is_constant(&self) -> bool;

    /// True if the field carries data.
    fn is_data(&self) -> bool {
        !self.is_constant()
    }

    /// True if the data is a variable field.
    fn is_variable(&self) -> bool;

    /// True if the data is an array field, i.e. the value is an index
    /// into a usage range rather than a quantity.
    fn is_array(&self) -> bool {
        !self.is_variable()
    }

    /// True if the data is relative to the previous report.
    fn is_relative(&self) -> bool;

    fn is_absolute(&self) -> bool {
        !self.is_relative()
    }

    /// True if the data rolls over when reaching the extremes.
    fn wraps(&self) -> bool;

    fn is_nonlinear(&self) -> bool;

    fn is_linear(&self) -> bool {
        !self.is_nonlinear()
    }

    fn has_no_preferred_state(&self) -> bool;

    fn has_preferred_state(&self) -> bool {
        !self.has_no_preferred_state()
    }

    fn has_null_state(&self) -> bool;

    /// True if the device may change the data without host interaction.
    /// This bit is reserved for Input items.
    fn is_volatile(&self) -> bool;

    fn is_buffered_bytes(&self) -> bool;

    fn is_bitfield(&self) -> bool {
        !self.is_buffered_bytes()
    }
}

/// The data of an Input, Output or Feature item as the bitset
/// found in the report descriptor, see Section 6.2.2.5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes(pub u32);

impl Attributes {
    pub const CONSTANT: u32 = 1 << 0;
    pub const VARIABLE: u32 = 1 << 1;
    pub const RELATIVE: u32 = 1 << 2;
    pub const WRAP: u32 = 1 << 3;
    pub const NONLINEAR: u32 = 1 << 4;
    pub const NO_PREFERRED: u32 = 1 << 5;
    pub const NULL_STATE: u32 = 1 << 6;
    pub const VOLATILE: u32 = 1 << 7;
    pub const BUFFERED_BYTES: u32 = 1 << 8;

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl MainDataItem for Attributes {
    fn is_constant(&self) -> bool {
        bit(self.0, 0)
    }
    fn is_variable(&self) -> bool {
        bit(self.0, 1)
    }
    fn is_relative(&self) -> bool {
        bit(self.0, 2)
    }
    fn wraps(&self) -> bool {
        bit(self.0, 3)
    }
    fn is_nonlinear(&self) -> bool {
        bit(self.0, 4)
    }
    fn has_no_preferred_state(&self) -> bool {
        bit(self.0, 5)
    }
    fn has_null_state(&self) -> bool {
        bit(self.0, 6)
    }
    fn is_volatile(&self) -> bool {
        bit(self.0, 7)
    }
    fn is_buffered_bytes(&self) -> bool {
        bit(self.0, 8)
    }
}

/// The type of a collection, see Section 6.2.2.6.
///
/// > A Collection item identifies a relationship between two or more data (Input,
/// > Output, or Feature.) For example, a mouse could be described as a collection of
/// > two to four data (x, y, button 1, button 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Physical,
    Application,
    Logical,
    Report,
    NamedArray,
    UsageSwitch,
    UsageModifier,
    Reserved { value: u8 },
    VendorDefined { value: u8 },
}

impl From<&CollectionKind> for u8 {
    fn from(c: &CollectionKind) -> u8 {
        match c {
            CollectionKind::Physical => 0x00,
            CollectionKind::Application => 0x01,
            CollectionKind::Logical => 0x02,
            CollectionKind::Report => 0x03,
            CollectionKind::NamedArray => 0x04,
            CollectionKind::UsageSwitch => 0x05,
            CollectionKind::UsageModifier => 0x06,
            CollectionKind::Reserved { value } => *value,
            CollectionKind::VendorDefined { value } => *value,
        }
    }
}

impl From<CollectionKind> for u8 {
    fn from(c: CollectionKind) -> u8 {
        u8::from(&c)
    }
}

impl From<u8> for CollectionKind {
    fn from(v: u8) -> CollectionKind {
        match v {
            0x00 => CollectionKind::Physical,
            0x01 => CollectionKind::Application,
            0x02 => CollectionKind::Logical,
            0x03 => CollectionKind::Report,
            0x04 => CollectionKind::NamedArray,
            0x05 => CollectionKind::UsageSwitch,
            0x06 => CollectionKind::UsageModifier,
            value @ 0x07..=0x7f => CollectionKind::Reserved { value },
            value @ 0x80..=0xff => CollectionKind::VendorDefined { value },
        }
    }
}

/// See Section 6.2.2.7, a global item applies to all subsequently identified items.
///
/// > Global items describe rather than define data from a control. A new Main item
/// > assumes the characteristics of the item state table. Global items can change the
/// > state table. As a result Global item tags apply to all subsequently defined items
/// > unless overridden by another Global item.
///
/// The minima and maxima are kept as [HidValue] since their signedness can only be
/// decided while interpreting the descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobalItem {
    UsagePage(UsagePage),
    LogicalMinimum(HidValue),
    LogicalMaximum(HidValue),
    PhysicalMinimum(HidValue),
    PhysicalMaximum(HidValue),
    UnitExponent(UnitExponent),
    Unit(Unit),
    ReportSize(ReportSize),
    ReportId(ReportId),
    ReportCount(ReportCount),
    Push,
    Pop,
    Reserved,
}

/// See Section 6.2.2.8, a local item applies to the current [MainItem].
///
/// > Local item tags define characteristics of controls. These items do not carry over to
/// > the next Main item. If a Main item defines more than one control, it may be
/// > preceded by several similar Local item tags. For example, an Input item may
/// > have several Usage tags associated with it, one for each control.
///
/// Note that the [LocalItem::UsageId] item does not exist in HID 1.11,
/// it is a simplification in this crate. A HID Usage included in a LocalItem
/// may or may not include a Usage Page. Where it does not, this crate uses
/// the [LocalItem::UsageId] instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalItem {
    /// A Usage LocalItem that **does** include a Usage Page, i.e. the
    /// MSB 16 bit component is the Usage Page, the LSB 16 bit component
    /// is the Usage ID.
    Usage(UsagePage, UsageId),
    /// A Usage LocalItem that does **not** include a Usage Page
    UsageId(UsageId),
    UsageMinimum(UsageMinimum),
    UsageMaximum(UsageMaximum),
    /// A 4-byte Usage Minimum, the MSB 16 bit component is the Usage Page
    ExtendedUsageMinimum(UsagePage, UsageMinimum),
    /// A 4-byte Usage Maximum, the MSB 16 bit component is the Usage Page
    ExtendedUsageMaximum(UsagePage, UsageMaximum),
    DesignatorIndex(u32),
    DesignatorMinimum(u32),
    DesignatorMaximum(u32),
    StringIndex(u32),
    StringMinimum(u32),
    StringMaximum(u32),
    Delimiter(u32),
    // The value of the upper 6 bits of the first byte,
    // excluding the two lowest size bits (`byte[0] & 0xFC`).
    Reserved { value: u8 },
}

impl TryFrom<&[u8]> for ItemType {
    type Error = HidError;

    fn try_from(bytes: &[u8]) -> Result<ItemType> {
        ensure!(!bytes.is_empty(), HidError::InsufficientData);
        let itype = (bytes[0] & 0b1100) >> 2;
        match itype {
            0 => Ok(ItemType::Main(MainItem::try_from(bytes)?)),
            1 => Ok(ItemType::Global(GlobalItem::try_from(bytes)?)),
            2 => Ok(ItemType::Local(LocalItem::try_from(bytes)?)),
            _ => Ok(ItemType::Reserved),
        }
    }
}

impl TryFrom<&[u8]> for MainItem {
    type Error = HidError;

    fn try_from(bytes: &[u8]) -> Result<MainItem> {
        ensure!(!bytes.is_empty(), HidError::InsufficientData);
        let value = HidValue::try_from(&bytes[1..])?;
        let tag = bytes[0] & 0b11111100;
        match tag {
            0b10000000 => Ok(MainItem::Input(Attributes(value.unsigned()))),
            0b10010000 => Ok(MainItem::Output(Attributes(value.unsigned()))),
            0b10110000 => Ok(MainItem::Feature(Attributes(value.unsigned()))),
            // A collection without data is a Physical collection
            0b10100000 => {
                let v = value.unsigned();
                let kind = u8::try_from(v).map_err(|_| HidError::InvalidData {
                    data: v,
                    message: format!("Invalid collection type {v:#x}"),
                })?;
                Ok(MainItem::Collection(CollectionKind::from(kind)))
            }
            0b11000000 => Ok(MainItem::EndCollection),
            _ => Ok(MainItem::Reserved { tag }),
        }
    }
}

impl TryFrom<&[u8]> for GlobalItem {
    type Error = HidError;

    fn try_from(bytes: &[u8]) -> Result<GlobalItem> {
        ensure!(!bytes.is_empty(), HidError::InsufficientData);
        let value = HidValue::try_from(&bytes[1..])?;
        let item = match bytes[0] & 0b11111100 {
            0b00000100 => GlobalItem::UsagePage(UsagePage(value.unsigned() as u16)),
            0b00010100 => GlobalItem::LogicalMinimum(value),
            0b00100100 => GlobalItem::LogicalMaximum(value),
            0b00110100 => GlobalItem::PhysicalMinimum(value),
            0b01000100 => GlobalItem::PhysicalMaximum(value),
            0b01010100 => GlobalItem::UnitExponent(unit_exponent(value)),
            0b01100100 => GlobalItem::Unit(Unit(value.unsigned())),
            0b01110100 => {
                let size = value.unsigned();
                ensure!(
                    size <= 32,
                    HidError::InvalidData {
                        data: size,
                        message: "Report Size must not exceed 32 bits".into(),
                    }
                );
                GlobalItem::ReportSize(ReportSize(size as usize))
            }
            0b10000100 => {
                let id = value.unsigned();
                ensure!(
                    (1..=255).contains(&id),
                    HidError::InvalidData {
                        data: id,
                        message: "Report ID must be in the range 1..=255".into(),
                    }
                );
                GlobalItem::ReportId(ReportId(id as u8))
            }
            0b10010100 => GlobalItem::ReportCount(ReportCount(value.unsigned() as usize)),
            0b10100100 => GlobalItem::Push,
            0b10110100 => GlobalItem::Pop,
            _ => GlobalItem::Reserved,
        };
        Ok(item)
    }
}

impl TryFrom<&[u8]> for LocalItem {
    type Error = HidError;

    fn try_from(bytes: &[u8]) -> Result<LocalItem> {
        ensure!(!bytes.is_empty(), HidError::InsufficientData);
        let value = HidValue::try_from(&bytes[1..])?;
        let v = value.unsigned();
        let item = match bytes[0] & 0b11111100 {
            0b00001000 => match value.len() {
                4 => LocalItem::Usage(UsagePage((v >> 16) as u16), UsageId(v & 0xFFFF)),
                _ => LocalItem::UsageId(UsageId(v)),
            },
            0b00011000 => match value.len() {
                4 => LocalItem::ExtendedUsageMinimum(
                    UsagePage((v >> 16) as u16),
                    UsageMinimum(v & 0xFFFF),
                ),
                _ => LocalItem::UsageMinimum(UsageMinimum(v)),
            },
            0b00101000 => match value.len() {
                4 => LocalItem::ExtendedUsageMaximum(
                    UsagePage((v >> 16) as u16),
                    UsageMaximum(v & 0xFFFF),
                ),
                _ => LocalItem::UsageMaximum(UsageMaximum(v)),
            },
            0b00111000 => LocalItem::DesignatorIndex(v),
            0b01001000 => LocalItem::DesignatorMinimum(v),
            0b01011000 => LocalItem::DesignatorMaximum(v),
            0b01111000 => LocalItem::StringIndex(v),
            0b10001000 => LocalItem::StringMinimum(v),
            0b10011000 => LocalItem::StringMaximum(v),
            0b10101000 => LocalItem::Delimiter(v),
            n => LocalItem::Reserved { value: n },
        };
        Ok(item)
    }
}

/// Section 6.2.2.7 encodes the unit exponent as a 4-bit two's complement
/// nibble (0xE is -2). Values that do not fit a nibble are taken as
/// sign-extended from their byte width.
fn unit_exponent(value: HidValue) -> UnitExponent {
    let v = value.unsigned();
    if value.len() == 1 && v <= 0x0f {
        UnitExponent(((v << 28) as i32) >> 28)
    } else {
        UnitExponent(value.signed())
    }
}

/// The header byte of a long item, see Section 6.2.2.3.
const LONG_ITEM_HEADER: u8 = 0b11111110;

/// A single item in a parsed (but not yet interpreted) report descriptor.
///
/// Items in a HID report descriptor are represented as short items (1-5 bytes)
/// and long items (3 to 258 bytes), see Section 6.2.2.2 and 6.2.2.3.
#[derive(Debug)]
pub struct ReportDescriptorItem {
    offset: usize,
    size: usize,
    header: u8,
    item_type: ItemType,
}

impl ReportDescriptorItem {
    /// The offset of this item in the Report Descriptor it was extracted from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The length of this item in bytes, inclusive of the header byte.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The header byte of this item. For short items this
    /// comprises data size, type and tag. For long items this is a constant
    /// value of 0xfe.
    pub fn header(&self) -> u8 {
        self.header
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn is_long_item(&self) -> bool {
        matches!(self.item_type, ItemType::Long)
    }
}

/// The set of items extracted from a report descriptor byte array. This is the
/// result of splitting a report descriptor without *interpreting* it.
#[derive(Debug)]
pub struct ReportDescriptorItems {
    items: Vec<ReportDescriptorItem>,
}

impl std::ops::Deref for ReportDescriptorItems {
    type Target = [ReportDescriptorItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl TryFrom<&[u8]> for ReportDescriptorItems {
    type Error = ParserError;

    /// Attempts to itemize the given HID report descriptor into its
    /// set of [ReportDescriptorItem]s.
    fn try_from(bytes: &[u8]) -> crate::Result<Self> {
        itemize(bytes)
    }
}

/// Splits one item off the front of `bytes`.
fn next_item(bytes: &[u8], offset: usize) -> crate::Result<ReportDescriptorItem> {
    let header = bytes[0];

    if header == LONG_ITEM_HEADER {
        // header, data size, long item tag, data
        ensure!(bytes.len() >= 3, ParserError::InsufficientData { offset });
        let size = 3 + usize::from(bytes[1]);
        ensure!(bytes.len() >= size, ParserError::InsufficientData { offset });
        return Ok(ReportDescriptorItem {
            offset,
            size,
            header,
            item_type: ItemType::Long,
        });
    }

    let size = match header & 0b11 {
        0 => 1,
        1 => 2,
        2 => 3,
        _ => 5,
    };
    ensure!(bytes.len() >= size, ParserError::InsufficientData { offset });

    let item_type = ItemType::try_from(&bytes[..size]).map_err(|e| match e {
        HidError::InsufficientData => ParserError::InsufficientData { offset },
        HidError::InvalidData { data, message } => ParserError::InvalidData {
            offset,
            data,
            message,
        },
    })?;

    Ok(ReportDescriptorItem {
        offset,
        size,
        header,
        item_type,
    })
}

/// Split the HID Report Descriptor represented by bytes into its set of
/// items.
fn itemize(bytes: &[u8]) -> crate::Result<ReportDescriptorItems> {
    let mut offset = 0;
    let mut items: Vec<ReportDescriptorItem> = Vec::new();

    while offset < bytes.len() {
        let item = next_item(&bytes[offset..], offset)?;
        trace!(
            offset,
            header = item.header,
            size = item.size,
            "item {:?}",
            item.item_type
        );
        offset += item.size;
        items.push(item);
    }

    Ok(ReportDescriptorItems { items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_size() {
        for size in 0..4 {
            let itype = 0b100; // Global
            let tag = 0b00010000; // Logical Minimum
            let bytes: [u8; 5] = [tag | itype | size, 1, 2, 3, 4];

            let item = next_item(&bytes, 0).unwrap();
            match size {
                0 => assert_eq!(item.size(), 1),
                1 => assert_eq!(item.size(), 2),
                2 => assert_eq!(item.size(), 3),
                3 => assert_eq!(item.size(), 5),
                _ => panic!("Size {size} cannot happen"),
            }
        }
    }

    #[test]
    fn item_type() {
        let itype = 0b10010000; // Output
        let size = 2;
        let bytes: [u8; 3] = [itype | size, 0b10101010, 0b1];

        let items = ReportDescriptorItems::try_from(&bytes[..]).unwrap();
        assert_eq!(items.len(), 1);
        match items[0].item_type() {
            ItemType::Main(MainItem::Output(o)) => {
                assert!(!o.is_constant());
                assert!(o.is_variable());
                assert!(!o.is_relative());
                assert!(o.wraps());
                assert!(!o.is_nonlinear());
                assert!(o.has_no_preferred_state());
                assert!(!o.has_null_state());
                assert!(o.is_volatile());
                assert!(o.is_buffered_bytes());
            }
            _ => panic!("Wrong item type"),
        }
    }

    macro_rules! test_hid_value {
        ($bytes:expr, $unsigned:expr, $signed:expr) => {
            let v = HidValue::try_from($bytes.as_slice()).unwrap();
            assert_eq!(v.unsigned(), $unsigned);
            assert_eq!(v.signed(), $signed);
        };
    }

    #[test]
    fn hid_value() {
        test_hid_value!([0x1, 0x2, 0x3, 0x4], 0x04030201u32, 0x04030201);

        test_hid_value!([0x7F], 0x7F, 127);
        test_hid_value!([0x80], 0x80, -128);
        test_hid_value!([0xFF], 0xFF, -1);
        test_hid_value!([0x0], 0x0, 0);

        test_hid_value!([0xFF, 0x7F], 0x7FFFu32, 32767); // max positive i16
        test_hid_value!([0x00, 0x80], 0x8000u32, -32768); // min i16
        test_hid_value!([0xCC, 0xED], 0xEDCCu32, -4660);

        test_hid_value!([0x00, 0x00, 0x00, 0x80], 0x80000000u32, -2147483648); // min i32
        test_hid_value!([0xFF, 0xFF, 0xFF, 0xFF], 0xFFFFFFFFu32, -1);

        let empty: [u8; 0] = [];
        test_hid_value!(empty, 0, 0);
        assert!(HidValue::try_from([1u8, 2, 3].as_slice()).is_err());
    }

    #[test]
    fn truncated_item() {
        // Logical Maximum announcing two bytes, only one present
        let bytes = [0x05, 0x01, 0x26, 0xff];
        let err = ReportDescriptorItems::try_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, ParserError::InsufficientData { offset: 2 }));
    }

    #[test]
    fn long_item() {
        #[rustfmt::skip]
        let bytes = [
            0xfe, 0x02, 0xf0, 0xaa, 0xbb,  // Long item, 2 data bytes
            0x05, 0x01,                    // Usage Page (Generic Desktop)
        ];
        let items = ReportDescriptorItems::try_from(&bytes[..]).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_long_item());
        assert_eq!(items[0].size(), 5);
        assert_eq!(items[1].offset(), 5);

        let truncated = [0xfe, 0x04, 0xf0, 0xaa];
        assert!(ReportDescriptorItems::try_from(&truncated[..]).is_err());
    }

    #[test]
    fn usages() {
        #[rustfmt::skip]
        let bytes = [
            0x09, 0x30,                    // Usage (X)
            0x0b, 0x38, 0x02, 0x0c, 0x00,  // Usage (Consumer, AC Pan)
            0x19, 0x01,                    // UsageMinimum (1)
            0x2a, 0xff, 0x00,              // UsageMaximum (255)
            0x1b, 0x01, 0x00, 0x09, 0x00,  // UsageMinimum (Button, 1)
            0x2b, 0x10, 0x00, 0x09, 0x00,  // UsageMaximum (Button, 16)
        ];
        let items = ReportDescriptorItems::try_from(&bytes[..]).unwrap();
        let types: Vec<ItemType> = items.iter().map(|i| i.item_type()).collect();
        assert_eq!(
            types,
            vec![
                ItemType::Local(LocalItem::UsageId(UsageId(0x30))),
                ItemType::Local(LocalItem::Usage(UsagePage(0x0c), UsageId(0x238))),
                ItemType::Local(LocalItem::UsageMinimum(UsageMinimum(1))),
                ItemType::Local(LocalItem::UsageMaximum(UsageMaximum(255))),
                ItemType::Local(LocalItem::ExtendedUsageMinimum(UsagePage(0x09), UsageMinimum(1))),
                ItemType::Local(LocalItem::ExtendedUsageMaximum(UsagePage(0x09), UsageMaximum(16))),
            ]
        );
    }

    #[test]
    fn invalid_globals() {
        // Report Size (33)
        let err = ReportDescriptorItems::try_from(&[0x75, 0x21][..]).unwrap_err();
        assert!(matches!(err, ParserError::InvalidData { offset: 0, data: 33, .. }));

        // Report ID (0)
        let err = ReportDescriptorItems::try_from(&[0x85, 0x00][..]).unwrap_err();
        assert!(matches!(err, ParserError::InvalidData { data: 0, .. }));
    }

    #[test]
    fn unit_exponents() {
        let exponent = |bytes: &[u8]| match ReportDescriptorItems::try_from(bytes).unwrap()[0]
            .item_type()
        {
            ItemType::Global(GlobalItem::UnitExponent(e)) => i32::from(e),
            _ => panic!("Not a unit exponent"),
        };
        assert_eq!(exponent(&[0x55, 0x0e]), -2);
        assert_eq!(exponent(&[0x55, 0x03]), 3);
        assert_eq!(exponent(&[0x55, 0xfe]), -2);
        assert_eq!(exponent(&[0x56, 0xfd, 0xff]), -3);
        assert_eq!(exponent(&[0x54]), 0);
    }

    #[test]
    fn collections() {
        let items = ReportDescriptorItems::try_from(&[0xa1, 0x01, 0xa0, 0xc0, 0xc0][..]).unwrap();
        let types: Vec<ItemType> = items.iter().map(|i| i.item_type()).collect();
        assert_eq!(
            types,
            vec![
                ItemType::Main(MainItem::Collection(CollectionKind::Application)),
                ItemType::Main(MainItem::Collection(CollectionKind::Physical)),
                ItemType::Main(MainItem::EndCollection),
                ItemType::Main(MainItem::EndCollection),
            ]
        );
        assert_eq!(CollectionKind::from(0x85), CollectionKind::VendorDefined { value: 0x85 });
        assert_eq!(u8::from(CollectionKind::UsageModifier), 0x06);

        // Collection (Application) with a two byte payload
        let items = ReportDescriptorItems::try_from(&[0xa2, 0x01, 0x00][..]).unwrap();
        assert_eq!(
            items[0].item_type(),
            ItemType::Main(MainItem::Collection(CollectionKind::Application))
        );

        // Collection types are one byte, 0x0100 must not become Physical
        let err = ReportDescriptorItems::try_from(&[0xa2, 0x00, 0x01][..]).unwrap_err();
        assert!(matches!(err, ParserError::InvalidData { offset: 0, data: 0x100, .. }));
    }

    #[test]
    fn reserved_main_items() {
        #[rustfmt::skip]
        let bytes = [
            0xd0,                          // Main item, reserved tag 0xd0
            0xf1, 0x01,                    // Main item, reserved tag 0xf0
            0x81, 0x02,                    // Input (Data,Var,Abs)
        ];
        let items = ReportDescriptorItems::try_from(&bytes[..]).unwrap();
        let types: Vec<ItemType> = items.iter().map(|i| i.item_type()).collect();
        assert_eq!(
            types,
            vec![
                ItemType::Main(MainItem::Reserved { tag: 0xd0 }),
                ItemType::Main(MainItem::Reserved { tag: 0xf0 }),
                ItemType::Main(MainItem::Input(Attributes(0x02))),
            ]
        );
    }
}
