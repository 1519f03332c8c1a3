// SPDX-License-Identifier: MIT

//! Interprets the items of a report descriptor and builds the
//! [DeviceDescriptor] tree of [Collection]s and [Field]s.
//!
//! The item state table of Section 6.2.2 is a [FieldTemplate] threaded through
//! the parse. Global items overwrite it and persist until overwritten again,
//! Local items accumulate until the next Main item consumes them.

use tracing::{debug, trace, warn};

use crate::collection::Collection;
use crate::field::{Field, FieldTemplate, IoKind};
use crate::hid::*;
use crate::report::ReportTable;
use crate::types::*;
use crate::{ensure, DeviceDescriptor, ParserError, Result};

/// Upper bounds for the tables built while parsing. A descriptor exceeding
/// any of these fails to parse instead of growing without bounds.
///
/// ```
/// # use hidtree::*;
/// let limits = ParserLimits::default().with_max_fields(1024);
/// let rdesc = DeviceDescriptor::parse_with_limits(&[], limits).unwrap();
/// assert_eq!(rdesc.fields().len(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserLimits {
    /// Usages collected between two Main items
    pub max_usages: usize,
    /// Distinct report IDs, including the implicit report ID 0
    pub max_report_ids: usize,
    /// Fields in the whole descriptor
    pub max_fields: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        ParserLimits {
            max_usages: 256,
            max_report_ids: 256,
            max_fields: 65536,
        }
    }
}

impl ParserLimits {
    pub fn with_max_usages(mut self, max: usize) -> Self {
        self.max_usages = max;
        self
    }

    pub fn with_max_report_ids(mut self, max: usize) -> Self {
        self.max_report_ids = max;
        self
    }

    pub fn with_max_fields(mut self, max: usize) -> Self {
        self.max_fields = max;
        self
    }
}

/// A Usage local item. Extended usages carry their own usage page.
#[derive(Clone, Copy, Debug)]
struct LocalUsage {
    usage_page: Option<UsagePage>,
    usage_id: UsageId,
}

#[derive(Debug, Default)]
struct Locals {
    usages: Vec<LocalUsage>,
    /// Set by Usage Minimum, cancelled by a subsequent Usage
    range_start: Option<UsageMinimum>,
    /// The usage page of an extended Usage Minimum or Usage Maximum
    range_page: Option<UsagePage>,
    /// The usage page of the last Usage if it was an extended usage
    usage_page: Option<UsagePage>,
}

struct Parser {
    limits: ParserLimits,
    template: FieldTemplate,
    locals: Locals,
    parent: CollectionIndex,
    nesting: usize,
    collections: Vec<Collection>,
    fields: Vec<Field>,
    reports: ReportTable,
}

impl Parser {
    fn new(limits: ParserLimits) -> Self {
        Parser {
            limits,
            template: FieldTemplate::default(),
            locals: Locals::default(),
            parent: CollectionIndex::ROOT,
            nesting: 0,
            collections: vec![Collection::root()],
            fields: Vec::new(),
            reports: ReportTable::new(),
        }
    }

    /// Locals do not carry over past a Main item.
    fn reset_locals(&mut self) {
        self.locals = Locals::default();
        self.template.usage = UsageId(0);
        self.template.usage_minimum = None;
        self.template.usage_maximum = None;
    }

    fn open_collection(&mut self, kind: CollectionKind) {
        let index = CollectionIndex(self.collections.len());
        let collection = Collection {
            index,
            kind: Some(kind),
            usage_page: self.locals.usage_page.unwrap_or(self.template.usage_page),
            usage: self.template.usage,
            usage_minimum: self.template.usage_minimum,
            usage_maximum: self.template.usage_maximum,
            parent: Some(self.parent),
            ..Collection::root()
        };
        debug!(
            %index,
            parent = %self.parent,
            ?kind,
            usage_page = %collection.usage_page,
            usage = %collection.usage,
            depth = self.nesting + 1,
            "Opening collection"
        );

        self.collections[self.parent.0].children.push(index);
        let mut ancestor = Some(self.parent);
        while let Some(a) = ancestor {
            let c = &mut self.collections[a.0];
            c.num_collections += 1;
            ancestor = c.parent;
        }
        self.collections.push(collection);

        self.parent = index;
        self.nesting += 1;
        self.reset_locals();
    }

    fn close_collection(&mut self, offset: usize) -> Result<()> {
        let closing = &self.collections[self.parent.0];
        let parent = closing
            .parent
            .ok_or(ParserError::UnbalancedEndCollection { offset })?;
        debug!(index = %closing.index, "Closing collection");

        // The closing collection's usage becomes the current usage again
        self.template.usage_page = closing.usage_page;
        let usage = closing.usage;

        self.parent = parent;
        self.nesting -= 1;
        self.reset_locals();
        self.template.usage = usage;
        Ok(())
    }

    fn usage_for(&self, n: usize) -> (UsagePage, UsageId) {
        let usage_page = self.template.usage_page;
        if let Some(UsageMinimum(min)) = self.locals.range_start {
            let usage_page = self.locals.range_page.unwrap_or(usage_page);
            return (usage_page, UsageId(min.wrapping_add(n as u32)));
        }
        match self.locals.usages.get(n) {
            Some(LocalUsage {
                usage_page: Some(up),
                usage_id,
            }) => (*up, *usage_id),
            Some(LocalUsage {
                usage_page: None,
                usage_id,
            }) => (usage_page, *usage_id),
            None => (usage_page, UsageId(0)),
        }
    }

    fn handle_main_item(
        &mut self,
        kind: IoKind,
        attributes: Attributes,
        offset: usize,
    ) -> Result<()> {
        let count = usize::from(self.template.report_count);
        let size = usize::from(self.template.report_size);

        ensure!(
            count == 0 || (1..=32).contains(&size),
            ParserError::InvalidData {
                offset,
                data: size as u32,
                message: "Report Size must be between 1 and 32 bits".into(),
            }
        );
        ensure!(
            self.fields.len() + count <= self.limits.max_fields,
            ParserError::TooManyFields {
                offset,
                limit: self.limits.max_fields,
            }
        );

        let first = self.fields.len();
        for report_index in 0..count {
            let index = FieldIndex(self.fields.len());
            let (usage_page, usage) = self.usage_for(report_index);
            let field = Field::new(
                index,
                self.parent,
                kind,
                attributes,
                usage_page,
                usage,
                report_index,
                &self.template,
            );
            trace!(%index, ?kind, %usage_page, %usage, "New field");

            self.collections[self.parent.0].fields.push(index);
            let mut ancestor = Some(self.parent);
            while let Some(a) = ancestor {
                let c = &mut self.collections[a.0];
                c.num_elements += 1;
                ancestor = c.parent;
            }
            if kind == IoKind::Output {
                self.reports.add_output_bits(self.template.report_id, size);
            }
            self.fields.push(field);
        }
        debug!(
            ?kind,
            report_id = %self.template.report_id,
            report_size = size,
            report_count = count,
            first_index = first,
            attributes = attributes.bits(),
            "Main item created fields"
        );

        self.reset_locals();
        Ok(())
    }

    fn handle_global_item(&mut self, item: GlobalItem, offset: usize) -> Result<()> {
        let t = &mut self.template;
        match item {
            GlobalItem::UsagePage(usage_page) => t.usage_page = usage_page,
            GlobalItem::LogicalMinimum(v) => {
                t.logical_minimum = LogicalMinimum(i64::from(v.signed()))
            }
            // The maximum is only signed if the minimum is negative
            GlobalItem::LogicalMaximum(v) => {
                t.logical_maximum = LogicalMaximum(if t.logical_minimum.0 < 0 {
                    i64::from(v.signed())
                } else {
                    i64::from(v.unsigned())
                })
            }
            GlobalItem::PhysicalMinimum(v) => {
                t.physical_minimum = PhysicalMinimum(i64::from(v.signed()))
            }
            GlobalItem::PhysicalMaximum(v) => {
                t.physical_maximum = PhysicalMaximum(if t.physical_minimum.0 < 0 {
                    i64::from(v.signed())
                } else {
                    i64::from(v.unsigned())
                })
            }
            GlobalItem::UnitExponent(exponent) => t.unit_exponent = exponent,
            GlobalItem::Unit(unit) => t.unit = unit,
            GlobalItem::ReportSize(size) => t.report_size = size,
            GlobalItem::ReportCount(count) => t.report_count = count,
            GlobalItem::ReportId(id) => {
                if !self.reports.contains_id(id) {
                    ensure!(
                        self.reports.len() < self.limits.max_report_ids,
                        ParserError::TooManyReportIds {
                            offset,
                            limit: self.limits.max_report_ids,
                        }
                    );
                    self.reports.register(id);
                }
                t.report_id = id;
            }
            GlobalItem::Push | GlobalItem::Pop => {
                warn!(offset, "Push/Pop items are not supported, ignoring");
            }
            GlobalItem::Reserved => {
                warn!(offset, "Skipping reserved global item");
            }
        }
        Ok(())
    }

    fn handle_local_item(&mut self, item: LocalItem, offset: usize) -> Result<()> {
        let usage = match item {
            LocalItem::Usage(usage_page, usage_id) => LocalUsage {
                usage_page: Some(usage_page),
                usage_id,
            },
            LocalItem::UsageId(usage_id) => LocalUsage {
                usage_page: None,
                usage_id,
            },
            LocalItem::UsageMinimum(min) => {
                self.template.usage_minimum = Some(min);
                self.locals.range_start = Some(min);
                return Ok(());
            }
            LocalItem::ExtendedUsageMinimum(usage_page, min) => {
                self.template.usage_minimum = Some(min);
                self.locals.range_start = Some(min);
                self.locals.range_page = Some(usage_page);
                return Ok(());
            }
            LocalItem::UsageMaximum(max) => {
                self.template.usage_maximum = Some(max);
                return Ok(());
            }
            LocalItem::ExtendedUsageMaximum(usage_page, max) => {
                self.template.usage_maximum = Some(max);
                self.locals.range_page.get_or_insert(usage_page);
                return Ok(());
            }
            // Designators, strings and delimiters do not affect the tree
            _ => return Ok(()),
        };

        ensure!(
            self.locals.usages.len() < self.limits.max_usages,
            ParserError::TooManyUsages {
                offset,
                limit: self.limits.max_usages,
            }
        );
        self.locals.usages.push(usage);
        self.locals.usage_page = usage.usage_page;
        self.locals.range_start = None;
        self.template.usage = usage.usage_id;
        Ok(())
    }

    fn finish(self) -> DeviceDescriptor {
        if self.nesting > 0 {
            warn!(
                open = self.nesting,
                "Report descriptor ends with unclosed collections"
            );
        }
        debug!(
            fields = self.fields.len(),
            collections = self.collections.len() - 1,
            reports = self.reports.len(),
            "Parsed report descriptor"
        );
        DeviceDescriptor {
            collections: self.collections,
            fields: self.fields,
            reports: self.reports,
        }
    }
}

pub(crate) fn parse_report_descriptor(
    bytes: &[u8],
    limits: ParserLimits,
) -> Result<DeviceDescriptor> {
    let items = ReportDescriptorItems::try_from(bytes)?;
    let mut parser = Parser::new(limits);

    for rdesc_item in items.iter() {
        let offset = rdesc_item.offset();
        match rdesc_item.item_type() {
            ItemType::Main(MainItem::Collection(kind)) => parser.open_collection(kind),
            ItemType::Main(MainItem::EndCollection) => parser.close_collection(offset)?,
            ItemType::Main(MainItem::Input(attrs)) => {
                parser.handle_main_item(IoKind::Input, attrs, offset)?
            }
            ItemType::Main(MainItem::Output(attrs)) => {
                parser.handle_main_item(IoKind::Output, attrs, offset)?
            }
            ItemType::Main(MainItem::Feature(attrs)) => {
                parser.handle_main_item(IoKind::Feature, attrs, offset)?
            }
            ItemType::Main(MainItem::Reserved { tag }) => {
                warn!(offset, tag, "Skipping reserved main item")
            }
            ItemType::Global(item) => parser.handle_global_item(item, offset)?,
            ItemType::Local(item) => parser.handle_local_item(item, offset)?,
            ItemType::Long => warn!(offset, "Skipping long item"),
            ItemType::Reserved => warn!(offset, "Skipping reserved item"),
        }
    }

    Ok(parser.finish())
}
