// SPDX-License-Identifier: MIT

//! A single field of a report, i.e. one control created by an Input,
//! Output or Feature item.

use crate::hid::{Attributes, MainDataItem};
use crate::types::*;
use crate::FieldError;

/// The "direction" of a field, i.e. the Main item that created it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IoKind {
    Input,
    Output,
    Feature,
}

/// One field in a report. A Main item with a Report Count of *n* creates
/// *n* fields, each [ReportSize] bits wide.
///
/// The descriptive part of a field is fixed once the descriptor is parsed.
/// The runtime part ([Field::value], [Field::raw_value], [Field::array_value])
/// is updated by [DeviceDescriptor::decode](crate::DeviceDescriptor::decode)
/// and read by [DeviceDescriptor::encode](crate::DeviceDescriptor::encode).
#[derive(Clone, Debug)]
pub struct Field {
    /// The index of this field in descriptor order
    pub index: FieldIndex,
    /// The collection this field belongs to
    pub collection: CollectionIndex,
    pub kind: IoKind,
    pub attributes: Attributes,
    pub usage_page: UsagePage,
    /// For array fields this is updated on every decoded non-zero value
    pub usage: UsageId,
    pub usage_minimum: Option<UsageMinimum>,
    pub usage_maximum: Option<UsageMaximum>,
    /// The report ID, 0 if the device does not use report IDs
    pub report_id: ReportId,
    pub report_size: ReportSize,
    /// The position of this field among the fields created by the same Main item
    pub report_index: usize,
    pub logical_minimum: LogicalMinimum,
    pub logical_maximum: LogicalMaximum,
    /// Equal to the logical minimum if the descriptor leaves the physical range at 0/0
    pub physical_minimum: PhysicalMinimum,
    /// Equal to the logical maximum if the descriptor leaves the physical range at 0/0
    pub physical_maximum: PhysicalMaximum,
    pub unit: Unit,
    pub unit_exponent: UnitExponent,

    raw_value: u32,
    value: i64,
    array_value: u32,
    force_notify: bool,
}

impl Field {
    /// The static part of the field, runtime state starts at zero.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: FieldIndex,
        collection: CollectionIndex,
        kind: IoKind,
        attributes: Attributes,
        usage_page: UsagePage,
        usage: UsageId,
        report_index: usize,
        template: &FieldTemplate,
    ) -> Field {
        let (physical_minimum, physical_maximum) =
            match (template.physical_minimum, template.physical_maximum) {
                (PhysicalMinimum(0), PhysicalMaximum(0)) => (
                    PhysicalMinimum(template.logical_minimum.0),
                    PhysicalMaximum(template.logical_maximum.0),
                ),
                (min, max) => (min, max),
            };

        Field {
            index,
            collection,
            kind,
            attributes,
            usage_page,
            usage,
            usage_minimum: template.usage_minimum,
            usage_maximum: template.usage_maximum,
            report_id: template.report_id,
            report_size: template.report_size,
            report_index,
            logical_minimum: template.logical_minimum,
            logical_maximum: template.logical_maximum,
            physical_minimum,
            physical_maximum,
            unit: template.unit,
            unit_exponent: template.unit_exponent,
            raw_value: 0,
            value: 0,
            array_value: 0,
            force_notify: false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.attributes.is_array()
    }

    pub fn is_constant(&self) -> bool {
        self.attributes.is_constant()
    }

    pub fn is_relative(&self) -> bool {
        self.attributes.is_relative()
    }

    /// The last bit pattern decoded for this field.
    pub fn raw_value(&self) -> u32 {
        self.raw_value
    }

    /// The interpreted value: sign-extended if the logical minimum is
    /// negative, 0 or 1 for array fields, the unsigned raw value otherwise.
    /// For Output fields this is the value that will be encoded.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// For array fields, the last non-zero index into the usage range
    /// or 0 if no usage is active.
    pub fn array_value(&self) -> u32 {
        self.array_value
    }

    pub fn force_notify(&self) -> bool {
        self.force_notify
    }

    /// If set, every decoded report notifies this field even if its
    /// value did not change.
    pub fn set_force_notify(&mut self, force: bool) {
        self.force_notify = force;
    }

    /// Sets the interpreted value, typically of an Output field prior
    /// to encoding.
    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }

    /// Updates the runtime state from a bit pattern read from an input
    /// report. Returns true if the caller should be notified.
    pub(crate) fn update_from_input(&mut self, raw: u32) -> bool {
        let notify = raw != self.raw_value || self.force_notify;
        self.raw_value = raw;

        if self.logical_minimum.0 < 0 {
            self.value = i64::from(sign_extend(raw, self.report_size.0));
        } else if self.is_array() {
            if raw == 0 {
                // No usage active, the usage stays whatever was active last
                self.value = 0;
                self.array_value = 0;
            } else {
                let minimum = self.usage_minimum.map(u32::from).unwrap_or(0);
                self.usage = UsageId(minimum.wrapping_add(raw));
                self.value = 1;
                self.array_value = raw;
            }
        } else {
            self.value = i64::from(raw);
        }

        notify
    }

    /// The value mapped into the range [0, 1] of the logical range.
    /// Array fields return their value as-is, they are indices, not ranges.
    pub fn logical_value(&self) -> Result<f32, FieldError> {
        if self.is_array() {
            return Ok(self.value as f32);
        }
        let min = self.logical_minimum.0 as f64;
        let max = self.logical_maximum.0 as f64;
        if self.logical_minimum.0 == self.logical_maximum.0 {
            return Err(FieldError::EmptyLogicalRange { index: self.index });
        }
        Ok(((self.value as f64 - min) / (max - min)) as f32)
    }

    /// The value mapped into the physical range.
    /// Array fields return their value as-is.
    pub fn physical_value(&self) -> Result<f32, FieldError> {
        if self.is_array() {
            return Ok(self.value as f32);
        }
        let normalized = f64::from(self.logical_value()?);
        let min = self.physical_minimum.0 as f64;
        let max = self.physical_maximum.0 as f64;
        Ok((normalized * (max - min) + min) as f32)
    }

    /// Sets the value from a normalized value in [0, 1], the inverse
    /// of [Field::logical_value]. The result is clamped to the logical range.
    pub fn set_logical_value(&mut self, normalized: f32) -> Result<(), FieldError> {
        if self.is_array() {
            self.value = normalized.round() as i64;
            return Ok(());
        }
        let (min, max) = (self.logical_minimum.0, self.logical_maximum.0);
        if min == max {
            return Err(FieldError::EmptyLogicalRange { index: self.index });
        }
        let value = f64::from(normalized) * (max - min) as f64 + min as f64;
        let value = value
            .round()
            .clamp(min.min(max) as f64, min.max(max) as f64);
        self.value = value as i64;
        Ok(())
    }

    /// The resolution in logical units per physical unit, see Section 6.2.2.7:
    ///
    /// ```text
    /// (logical max - logical min) / ((physical max - physical min) * 10^unit exponent)
    /// ```
    pub fn resolution(&self) -> Result<f64, FieldError> {
        let logical = (self.logical_maximum.0 - self.logical_minimum.0) as f64;
        let physical = (self.physical_maximum.0 - self.physical_minimum.0) as f64;
        if physical == 0.0 {
            return Err(FieldError::EmptyPhysicalRange { index: self.index });
        }
        Ok(logical / (physical * 10f64.powi(self.unit_exponent.0)))
    }

    /// The HUT usage of this field, if the usage page and usage are known
    /// to the HID Usage Tables.
    #[cfg(feature = "hut")]
    pub fn hut_usage(&self) -> Option<hut::Usage> {
        let usage_id = u16::try_from(self.usage.0).ok()?;
        hut::Usage::new_from_page_and_id(self.usage_page.0, usage_id).ok()
    }
}

/// Interprets the lowest `nbits` of `raw` as two's complement.
fn sign_extend(raw: u32, nbits: usize) -> i32 {
    match nbits {
        0 => 0,
        1..=31 => {
            let shift = 32 - nbits as u32;
            ((raw << shift) as i32) >> shift
        }
        _ => raw as i32,
    }
}

/// The global and local state that every new field copies from, i.e.
/// the item state table of Section 6.2.2.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FieldTemplate {
    pub usage_page: UsagePage,
    pub usage: UsageId,
    pub usage_minimum: Option<UsageMinimum>,
    pub usage_maximum: Option<UsageMaximum>,
    pub logical_minimum: LogicalMinimum,
    pub logical_maximum: LogicalMaximum,
    pub physical_minimum: PhysicalMinimum,
    pub physical_maximum: PhysicalMaximum,
    pub unit: Unit,
    pub unit_exponent: UnitExponent,
    pub report_size: ReportSize,
    pub report_id: ReportId,
    pub report_count: ReportCount,
}
