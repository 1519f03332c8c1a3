// SPDX-License-Identifier: MIT

//! Standalone HID types that exist for type safety only.
//! These are all simple wrappers around their underlying integer data type.
//!
//! In this document and unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).

/// Creates a `From<Foo> for u32` and `From<u32> for Foo` implementation for the given `Foo` type.
/// Use like this: `impl_from(Foo, Foo, u32)`.
macro_rules! impl_from {
    ($tipo:ty, $tipo_expr:expr, $to:ty) => {
        impl From<$tipo> for $to {
            fn from(f: $tipo) -> $to {
                f.0
            }
        }
        impl From<&$tipo> for $to {
            fn from(f: &$tipo) -> $to {
                f.0
            }
        }
        impl From<$to> for $tipo {
            fn from(f: $to) -> Self {
                $tipo_expr(f)
            }
        }
    };
}

/// Creates a `impl Display for Foo` that just converts into the underlying number.
/// Use like this: `impl_fmt(Foo, u32)`.
macro_rules! impl_fmt {
    ($tipo:ty, $to:ty) => {
        impl std::fmt::Display for $tipo {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let v: $to = self.into();
                write!(f, "{v}")
            }
        }
    };
}

// ---------- GLOBAL ITEMS ---------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsagePage(pub u16);

impl_from!(UsagePage, UsagePage, u16);
impl_fmt!(UsagePage, u16);

/// The lower bound of a field's logical range. The bounds are stored
/// wider than any item payload so that an unsigned 32-bit
/// [LogicalMaximum] of up to 0xffffffff keeps its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalMinimum(pub i64);

impl_from!(LogicalMinimum, LogicalMinimum, i64);
impl_fmt!(LogicalMinimum, i64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalMaximum(pub i64);

impl_from!(LogicalMaximum, LogicalMaximum, i64);
impl_fmt!(LogicalMaximum, i64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalMinimum(pub i64);

impl_from!(PhysicalMinimum, PhysicalMinimum, i64);
impl_fmt!(PhysicalMinimum, i64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalMaximum(pub i64);

impl_from!(PhysicalMaximum, PhysicalMaximum, i64);
impl_fmt!(PhysicalMaximum, i64);

/// The unit system and exponents, see Section 6.2.2.7. This crate
/// does not interpret the nibbles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unit(pub u32);

impl_from!(Unit, Unit, u32);
impl_fmt!(Unit, u32);

/// A power of ten applied to the [Unit]. One-byte values up to 0x0f are
/// a 4-bit two's complement nibble, anything else is sign-extended from
/// the width of the item it was declared in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitExponent(pub i32);

impl_from!(UnitExponent, UnitExponent, i32);
impl_fmt!(UnitExponent, i32);

/// The size of a single field in bits. Fields in this crate
/// are between 1 and 32 bits wide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSize(pub usize);

impl_from!(ReportSize, ReportSize, usize);
impl_fmt!(ReportSize, usize);

/// A report ID. The value 0 is reserved by Section 6.2.2.7 and used
/// in this crate to mean "the device does not use report IDs".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportId(pub u8);

impl_from!(ReportId, ReportId, u8);
impl_fmt!(ReportId, u8);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCount(pub usize);

impl_from!(ReportCount, ReportCount, usize);
impl_fmt!(ReportCount, usize);

// ----------------- LOCAL ITEMS --------------------

/// A usage ID. This is 32 bits wide since usages derived from a
/// [UsageMinimum] are computed as an offset that may exceed 16 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsageId(pub u32);

impl_from!(UsageId, UsageId, u32);
impl_fmt!(UsageId, u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageMinimum(pub u32);

impl_from!(UsageMinimum, UsageMinimum, u32);
impl_fmt!(UsageMinimum, u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageMaximum(pub u32);

impl_from!(UsageMaximum, UsageMaximum, u32);
impl_fmt!(UsageMaximum, u32);

// ----------------- TREE INDICES --------------------

/// The index of a [Field](crate::Field) within its
/// [DeviceDescriptor](crate::DeviceDescriptor). Indices are assigned
/// in descriptor order, starting at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldIndex(pub usize);

impl_from!(FieldIndex, FieldIndex, usize);
impl_fmt!(FieldIndex, usize);

/// The index of a [Collection](crate::Collection) within its
/// [DeviceDescriptor](crate::DeviceDescriptor). Index 0 is the device root,
/// collections opened by the descriptor start at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionIndex(pub usize);

impl_from!(CollectionIndex, CollectionIndex, usize);
impl_fmt!(CollectionIndex, usize);

impl CollectionIndex {
    /// The index of the device root collection.
    pub const ROOT: CollectionIndex = CollectionIndex(0);
}
