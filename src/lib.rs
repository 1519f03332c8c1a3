// SPDX-License-Identifier: MIT

//! Compiles a HID Report Descriptor into a tree of [Collection]s and
//! [Field]s, decodes input reports into field values and encodes field
//! values into output reports.
//!
//! ```
//! # use hidtree::*;
//! #[rustfmt::skip]
//! let bytes = [
//!     0x05, 0x01,                    // Usage Page (Generic Desktop)
//!     0x09, 0x02,                    // Usage (Mouse)
//!     0xa1, 0x01,                    // Collection (Application)
//!     0x09, 0x30,                    //   Usage (X)
//!     0x09, 0x31,                    //   Usage (Y)
//!     0x15, 0x81,                    //   Logical Minimum (-127)
//!     0x25, 0x7f,                    //   Logical Maximum (127)
//!     0x75, 0x08,                    //   Report Size (8)
//!     0x95, 0x02,                    //   Report Count (2)
//!     0x81, 0x06,                    //   Input (Data,Var,Rel)
//!     0xc0,                          // End Collection
//! ];
//!
//! let mut rdesc = DeviceDescriptor::try_from(bytes.as_slice()).unwrap();
//! assert_eq!(rdesc.root().num_elements(), 2);
//!
//! rdesc.decode(&[0x05, 0xfb], |field| {
//!     println!("usage {}:{} is now {}", field.usage_page, field.usage, field.value());
//! }).unwrap();
//! assert_eq!(rdesc.fields()[1].value(), -5);
//! ```
//!
//! The tree is an arena: the [DeviceDescriptor] owns every [Collection] and
//! every [Field], and they refer to each other by [CollectionIndex] and
//! [FieldIndex]. Fields are numbered in descriptor order across the whole
//! device, so iterating [DeviceDescriptor::fields] visits them in the order
//! they appear in the reports.
//!
//! This crate uses [tracing] for diagnostics but does not install a subscriber.
//!
//! In this document and unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).

use thiserror::Error;

macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}
pub(crate) use ensure;

pub mod bits;
mod collection;
mod field;
pub mod hid;
mod parser;
mod report;
pub mod types;

pub use collection::Collection;
pub use field::{Field, IoKind};
pub use hid::{Attributes, CollectionKind, MainDataItem};
pub use parser::ParserLimits;
pub use report::ReportTable;
pub use types::*;

/// A compiled report descriptor.
///
/// Collection index 0 is the device root. It is not declared by the
/// descriptor and holds every top-level field and collection.
#[derive(Clone, Debug)]
pub struct DeviceDescriptor {
    collections: Vec<Collection>,
    fields: Vec<Field>,
    reports: ReportTable,
}

impl DeviceDescriptor {
    /// Parses `bytes` with custom [ParserLimits]. [DeviceDescriptor::try_from]
    /// uses [ParserLimits::default].
    pub fn parse_with_limits(bytes: &[u8], limits: ParserLimits) -> Result<Self> {
        parser::parse_report_descriptor(bytes, limits)
    }

    pub fn root(&self) -> &Collection {
        &self.collections[CollectionIndex::ROOT.0]
    }

    pub fn collection(&self, index: CollectionIndex) -> Option<&Collection> {
        self.collections.get(index.0)
    }

    /// All collections in the order they were opened, starting with the root.
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn field(&self, index: FieldIndex) -> Option<&Field> {
        self.fields.get(index.0)
    }

    pub fn field_mut(&mut self, index: FieldIndex) -> Option<&mut Field> {
        self.fields.get_mut(index.0)
    }

    /// All fields in descriptor order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The fields of the given kind in descriptor order.
    pub fn fields_of(&self, kind: IoKind) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }

    /// The fields of the given kind and report in the order they appear in the report.
    pub fn fields_for(&self, kind: IoKind, report_id: ReportId) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(move |f| f.kind == kind && f.report_id == report_id)
    }

    pub fn reports(&self) -> &ReportTable {
        &self.reports
    }

    /// The report IDs declared by the descriptor, in declaration order, or
    /// report ID 0 only if the device does not use report IDs.
    pub fn report_ids(&self) -> Vec<ReportId> {
        self.reports.ids().collect()
    }

    pub fn uses_report_ids(&self) -> bool {
        self.reports.uses_report_ids()
    }

    /// The length in bytes of the output report returned by
    /// [DeviceDescriptor::encode], including the report ID byte.
    pub fn output_report_len(&self, report_id: ReportId) -> Option<usize> {
        self.reports
            .output_bits(report_id)
            .map(|bits| 1 + bits.div_ceil(8))
    }
}

impl TryFrom<&[u8]> for DeviceDescriptor {
    type Error = ParserError;

    /// Parses a report descriptor with the default [ParserLimits].
    fn try_from(bytes: &[u8]) -> Result<Self> {
        parser::parse_report_descriptor(bytes, ParserLimits::default())
    }
}

impl TryFrom<&Vec<u8>> for DeviceDescriptor {
    type Error = ParserError;

    fn try_from(bytes: &Vec<u8>) -> Result<Self> {
        Self::try_from(bytes.as_slice())
    }
}

/// Errors while parsing a report descriptor. Every variant carries the
/// byte offset of the offending item.
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Insufficient data for item at offset {offset}")]
    InsufficientData { offset: usize },
    #[error("Invalid data {data} at offset {offset}: {message}")]
    InvalidData {
        offset: usize,
        data: u32,
        message: String,
    },
    #[error("End Collection without matching Collection at offset {offset}")]
    UnbalancedEndCollection { offset: usize },
    #[error("More than {limit} usages before a Main item at offset {offset}")]
    TooManyUsages { offset: usize, limit: usize },
    #[error("More than {limit} report IDs at offset {offset}")]
    TooManyReportIds { offset: usize, limit: usize },
    #[error("More than {limit} fields at offset {offset}")]
    TooManyFields { offset: usize, limit: usize },
}

type Result<T> = std::result::Result<T, ParserError>;

/// Errors while decoding or encoding a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unknown report ID {0}")]
    UnknownReportId(ReportId),
    #[error("Empty report from a device that uses report IDs")]
    EmptyReport,
    #[error("Field {0} is not an Output field")]
    NotAnOutputField(FieldIndex),
    #[error("No field with index {0}")]
    NoSuchField(FieldIndex),
}

/// Errors while interpreting the value of a field.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Field {index} has an empty logical range")]
    EmptyLogicalRange { index: FieldIndex },
    #[error("Field {index} has an empty physical range")]
    EmptyPhysicalRange { index: FieldIndex },
}
