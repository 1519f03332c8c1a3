// SPDX-License-Identifier: MIT

//! Decoding of input reports into [Field] values and encoding of
//! [Field] values into output reports.
//!
//! A report is an optional report ID byte followed by the fields of that
//! report in descriptor order, packed little-endian with no padding
//! between fields, see Section 8.4.

use tracing::{debug, trace, warn};

use crate::bits::{BitReader, BitWriter};
use crate::field::{Field, IoKind};
use crate::types::*;
use crate::{ensure, DeviceDescriptor, ReportError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReportEntry {
    id: ReportId,
    output_bits: usize,
}

/// The reports declared by a descriptor and the size of their Output part.
///
/// Report ID 0 is always present and stands for "no report ID". Once a
/// descriptor declares a Report ID item, report ID 0 is no longer
/// addressable.
#[derive(Clone, Debug)]
pub struct ReportTable {
    reports: Vec<ReportEntry>,
}

impl ReportTable {
    pub(crate) fn new() -> Self {
        ReportTable {
            reports: vec![ReportEntry {
                id: ReportId(0),
                output_bits: 0,
            }],
        }
    }

    /// The number of entries, including the implicit report ID 0.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// True if the descriptor declared at least one Report ID item. Every
    /// report of such a device is prefixed with its report ID.
    pub fn uses_report_ids(&self) -> bool {
        self.reports.len() > 1
    }

    pub fn contains_id(&self, id: ReportId) -> bool {
        if id == ReportId(0) {
            !self.uses_report_ids()
        } else {
            self.reports.iter().any(|r| r.id == id)
        }
    }

    /// The addressable report IDs in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = ReportId> + '_ {
        self.reports
            .iter()
            .map(|r| r.id)
            .filter(|id| self.contains_id(*id))
    }

    /// The total width of all Output fields of this report in bits.
    pub fn output_bits(&self, id: ReportId) -> Option<usize> {
        if !self.contains_id(id) {
            return None;
        }
        self.reports
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.output_bits)
    }

    pub(crate) fn register(&mut self, id: ReportId) {
        if !self.reports.iter().any(|r| r.id == id) {
            self.reports.push(ReportEntry { id, output_bits: 0 });
        }
    }

    pub(crate) fn add_output_bits(&mut self, id: ReportId, bits: usize) {
        match self.reports.iter_mut().find(|r| r.id == id) {
            Some(entry) => entry.output_bits += bits,
            None => self.reports.push(ReportEntry {
                id,
                output_bits: bits,
            }),
        }
    }
}

impl DeviceDescriptor {
    /// Decodes one input report and updates the runtime state of every
    /// Input field in that report. `on_change` is called for each field
    /// whose bit pattern differs from the previous report, or whose
    /// [Field::force_notify] is set, in descriptor order. Returns the
    /// number of fields notified.
    ///
    /// If the device uses report IDs, the first byte of `report` is the
    /// report ID. Fields that do not fit into the remainder of a short
    /// report keep their previous state.
    ///
    /// ```
    /// # use hidtree::*;
    /// #[rustfmt::skip]
    /// let bytes = [
    ///     0x75, 0x08,        // Report Size (8)
    ///     0x95, 0x02,        // Report Count (2)
    ///     0x26, 0xff, 0x00,  // Logical Maximum (255)
    ///     0x81, 0x02,        // Input (Data,Var,Abs)
    /// ];
    /// let mut rdesc = DeviceDescriptor::try_from(bytes.as_slice()).unwrap();
    /// let mut changed = vec![];
    /// rdesc.decode(&[10, 20], |f| changed.push((f.index, f.value()))).unwrap();
    /// assert_eq!(changed, vec![(FieldIndex(0), 10), (FieldIndex(1), 20)]);
    /// ```
    pub fn decode<F>(&mut self, report: &[u8], mut on_change: F) -> Result<usize, ReportError>
    where
        F: FnMut(&Field),
    {
        let (report_id, payload) = if self.uses_report_ids() {
            let (id, payload) = report.split_first().ok_or(ReportError::EmptyReport)?;
            (ReportId(*id), payload)
        } else {
            (ReportId(0), report)
        };

        ensure!(
            self.fields_for(IoKind::Input, report_id).next().is_some(),
            ReportError::UnknownReportId(report_id)
        );

        let mut reader = BitReader::new(payload);
        let mut notified = 0;
        for field in self
            .fields
            .iter_mut()
            .filter(|f| f.kind == IoKind::Input && f.report_id == report_id)
        {
            let Some(raw) = reader.read(field.report_size.0) else {
                warn!(
                    %report_id,
                    index = %field.index,
                    remaining = reader.remaining_bits(),
                    "Input report too short for remaining fields"
                );
                break;
            };
            let notify = field.update_from_input(raw);
            trace!(index = %field.index, raw, value = field.value(), notify, "Decoded field");
            if notify {
                on_change(field);
                notified += 1;
            }
        }

        Ok(notified)
    }

    /// Encodes the current [Field::value] of every Output field of the
    /// given report into a new output report. The first byte is the
    /// report ID (0 if the device does not use report IDs), followed by
    /// the packed field values.
    pub fn encode(&self, report_id: ReportId) -> Result<Vec<u8>, ReportError> {
        let bits = self
            .reports
            .output_bits(report_id)
            .ok_or(ReportError::UnknownReportId(report_id))?;
        let len = 1 + bits.div_ceil(8);

        let mut writer = BitWriter::with_prefix(&[report_id.0], len);
        for field in self.fields_for(IoKind::Output, report_id) {
            writer.write(field.value() as u32, field.report_size.0);
        }
        let bytes = writer.into_bytes();
        debug!(%report_id, bits, "Encoded output report {bytes:02x?}");

        Ok(bytes)
    }

    /// Sets the value of the Output field at `index` and returns the
    /// encoded output report that field belongs to.
    pub fn set_output_value(
        &mut self,
        index: FieldIndex,
        value: i64,
    ) -> Result<Vec<u8>, ReportError> {
        let field = self
            .field_mut(index)
            .ok_or(ReportError::NoSuchField(index))?;
        ensure!(
            field.kind == IoKind::Output,
            ReportError::NotAnOutputField(index)
        );
        field.set_value(value);
        let report_id = field.report_id;
        self.encode(report_id)
    }
}
