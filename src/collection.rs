// SPDX-License-Identifier: MIT

use crate::hid::CollectionKind;
use crate::types::*;

/// A collection groups fields and other collections, see Section 6.2.2.6.
///
/// Collections do not own their [Field](crate::Field)s, they refer to them by
/// [FieldIndex] into the device-wide sequence of the
/// [DeviceDescriptor](crate::DeviceDescriptor). Child collections are referred
/// to by [CollectionIndex] in the same manner.
#[derive(Clone, Debug)]
pub struct Collection {
    pub(crate) index: CollectionIndex,
    pub(crate) kind: Option<CollectionKind>,
    pub(crate) usage_page: UsagePage,
    pub(crate) usage: UsageId,
    pub(crate) usage_minimum: Option<UsageMinimum>,
    pub(crate) usage_maximum: Option<UsageMaximum>,
    pub(crate) parent: Option<CollectionIndex>,
    pub(crate) fields: Vec<FieldIndex>,
    pub(crate) children: Vec<CollectionIndex>,
    pub(crate) num_elements: usize,
    pub(crate) num_collections: usize,
}

impl Collection {
    /// The device root. It has no kind, no usage and no parent.
    pub(crate) fn root() -> Collection {
        Collection {
            index: CollectionIndex::ROOT,
            kind: None,
            usage_page: UsagePage(0),
            usage: UsageId(0),
            usage_minimum: None,
            usage_maximum: None,
            parent: None,
            fields: Vec::new(),
            children: Vec::new(),
            num_elements: 0,
            num_collections: 0,
        }
    }

    pub fn index(&self) -> CollectionIndex {
        self.index
    }

    /// The collection type, `None` for the device root.
    pub fn kind(&self) -> Option<CollectionKind> {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn usage_page(&self) -> UsagePage {
        self.usage_page
    }

    pub fn usage(&self) -> UsageId {
        self.usage
    }

    pub fn usage_minimum(&self) -> Option<UsageMinimum> {
        self.usage_minimum
    }

    pub fn usage_maximum(&self) -> Option<UsageMaximum> {
        self.usage_maximum
    }

    /// The parent collection, `None` for the device root.
    pub fn parent(&self) -> Option<CollectionIndex> {
        self.parent
    }

    /// The fields directly contained in this collection, in descriptor order.
    pub fn fields(&self) -> &[FieldIndex] {
        &self.fields
    }

    /// The collections directly contained in this collection, in descriptor order.
    pub fn children(&self) -> &[CollectionIndex] {
        &self.children
    }

    /// The number of fields in this collection and all its descendants.
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// The number of collections nested in this collection at any depth.
    pub fn num_collections(&self) -> usize {
        self.num_collections
    }

    /// The HUT usage of this collection, if the usage page and usage are
    /// known to the HID Usage Tables.
    #[cfg(feature = "hut")]
    pub fn hut_usage(&self) -> Option<hut::Usage> {
        let usage_id = u16::try_from(self.usage.0).ok()?;
        hut::Usage::new_from_page_and_id(self.usage_page.0, usage_id).ok()
    }
}
