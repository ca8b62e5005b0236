//! The ordered collection: one flat, order-significant sequence of records
//! plus the hierarchy derived from it.
//!
//! Every structural change rebuilds the hierarchy for the whole sequence and
//! then fires the collection's change hook. Lookups and mutations keyed by an
//! id that isn't present are silent no-ops: a UI can hold a stale id while a
//! concurrent delete lands, and that must not be an error.

use tracing::debug;

use super::hierarchy::Hierarchy;
use crate::model::record::{Record, RecordId};

/// Called after every structural change with the full, rebuilt sequence
pub trait ChangeHook<T> {
    fn after_change(&mut self, records: &[T]);
}

/// Hook for collections that are persisted as part of something larger
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl<T> ChangeHook<T> for NoopHook {
    fn after_change(&mut self, _records: &[T]) {}
}

/// Where `add` places a new record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Append after the last record
    End,
    /// Immediately before the record with this id
    Before(RecordId),
    /// Immediately after the record with this id
    After(RecordId),
}

impl InsertPosition {
    /// Anchor form used by list UIs: "near this record, before or after".
    /// No anchor means the end of the list.
    pub fn near(anchor: Option<RecordId>, before: bool) -> Self {
        match anchor {
            None => InsertPosition::End,
            Some(id) if before => InsertPosition::Before(id),
            Some(id) => InsertPosition::After(id),
        }
    }
}

/// An ordered, indent-structured collection of records
#[derive(Debug, Clone)]
pub struct OrderedCollection<T, H = NoopHook> {
    records: Vec<T>,
    hierarchy: Hierarchy,
    hook: H,
}

impl<T: Record, H: ChangeHook<T> + Default> Default for OrderedCollection<T, H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<T: Record, H: ChangeHook<T>> OrderedCollection<T, H> {
    /// Create an empty collection that reports changes to `hook`
    pub fn new(hook: H) -> Self {
        OrderedCollection {
            records: Vec::new(),
            hierarchy: Hierarchy::default(),
            hook,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Position of the record with this id
    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.index_of(id).map(|i| &self.records[i])
    }

    pub fn last(&self) -> Option<&T> {
        self.records.last()
    }

    /// Ids in sequence order, as the reorder endpoints expect them
    pub fn orders(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id()).collect()
    }

    pub fn parent(&self, id: RecordId) -> Option<&T> {
        let idx = self.index_of(id)?;
        self.hierarchy.parent(idx).map(|p| &self.records[p])
    }

    pub fn is_parent(&self, id: RecordId) -> bool {
        self.index_of(id).is_some_and(|idx| self.hierarchy.is_parent(idx))
    }

    /// Every (transitive) child of `id`, in sequence order
    pub fn children(&self, id: RecordId) -> &[T] {
        match self.index_of(id) {
            Some(idx) => &self.records[self.hierarchy.children(idx)],
            None => &[],
        }
    }

    /// Children whose nearest ancestor is `id` itself
    pub fn direct_children(&self, id: RecordId) -> Vec<&T> {
        match self.index_of(id) {
            Some(idx) => self
                .hierarchy
                .direct_children(idx)
                .map(|c| &self.records[c])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ids of every (transitive) child of `id`
    pub fn descendant_ids(&self, id: RecordId) -> Vec<RecordId> {
        self.children(id).iter().map(|r| r.id()).collect()
    }

    /// True when some ancestor of `id` is collapsed
    pub fn is_hidden(&self, id: RecordId) -> bool {
        match self.index_of(id) {
            Some(idx) => self.is_hidden_at(idx),
            None => false,
        }
    }

    fn is_hidden_at(&self, idx: usize) -> bool {
        self.hierarchy
            .ancestors(idx)
            .any(|a| self.records[a].is_collapsed())
    }

    /// Records not hidden under a collapsed ancestor, in sequence order
    pub fn visible(&self) -> impl Iterator<Item = &T> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.is_hidden_at(*idx))
            .map(|(_, r)| r)
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    // -----------------------------------------------------------------------
    // Structural mutations
    // -----------------------------------------------------------------------

    /// Replace the whole sequence (fresh server response or cache snapshot).
    pub fn import_array(&mut self, records: Vec<T>) {
        debug!(count = records.len(), "importing records");
        self.records = records;
        self.changed();
    }

    /// Concatenate records onto the end of the sequence.
    pub fn append_array(&mut self, records: impl IntoIterator<Item = T>) {
        let before = self.records.len();
        self.records.extend(records);
        debug!(
            appended = self.records.len() - before,
            total = self.records.len(),
            "appending records"
        );
        self.changed();
    }

    /// Replace the record with the same id, keeping its position.
    ///
    /// An unknown id drops `record`; the hierarchy is still rebuilt and the
    /// hook still fires.
    pub fn update(&mut self, record: T) {
        match self.index_of(record.id()) {
            Some(idx) => self.records[idx] = record,
            None => debug!(id = record.id(), "update of unknown record ignored"),
        }
        self.changed();
    }

    /// `update` each record in turn, then fire the hook once more.
    pub fn update_many(&mut self, records: impl IntoIterator<Item = T>) {
        for record in records {
            self.update(record);
        }
        self.hook.after_change(&self.records);
    }

    /// Remove the record and every one of its (transitive) children.
    ///
    /// The child set is taken from the hierarchy as it stood before the
    /// removal. Unknown ids remove nothing.
    pub fn delete(&mut self, id: RecordId) {
        let Some(idx) = self.index_of(id) else {
            debug!(id, "delete of unknown record ignored");
            self.changed();
            return;
        };
        // the record and its child run are contiguous
        let end = self.hierarchy.children(idx).end;
        let removed = end - idx;
        self.records.drain(idx..end);
        debug!(id, removed, "deleted record with children");
        self.changed();
    }

    /// Insert `record` relative to an anchor.
    ///
    /// A missing anchor falls back to the end of the list. Order numbers are
    /// not touched: call `update_orders` and push `orders()` afterwards.
    pub fn add(&mut self, record: T, position: InsertPosition) {
        let end = self.records.len();
        let idx = match position {
            InsertPosition::End => end,
            InsertPosition::Before(anchor) => self.index_of(anchor).unwrap_or(end),
            InsertPosition::After(anchor) => self.index_of(anchor).map_or(end, |i| i + 1),
        };
        debug!(id = record.id(), index = idx, ?position, "adding record");
        self.records.insert(idx, record);
        self.changed();
    }

    /// Change a record's indent by `delta` levels (clamped at the top level).
    pub fn reindent(&mut self, id: RecordId, delta: i32) {
        let Some(mut record) = self.get(id).cloned() else {
            debug!(id, "reindent of unknown record ignored");
            return;
        };
        let meta = record.meta_mut();
        let target = meta.indent().saturating_add(delta);
        meta.set_indent(target);
        self.update(record);
    }

    /// Number each record by its 1-based position in the sequence.
    pub fn update_orders(&mut self) {
        for (i, record) in self.records.iter_mut().enumerate() {
            record.meta_mut().item_order = i as i32 + 1;
        }
        self.hook.after_change(&self.records);
    }

    /// Empty the sequence without notifying the hook.
    pub fn clear_array(&mut self) {
        self.records.clear();
        self.hierarchy = Hierarchy::default();
    }

    /// In-place edit of one record's payload.
    ///
    /// Neither the hierarchy nor the hook is touched, so `f` must not change
    /// the indent. Returns false for an unknown id.
    pub(crate) fn modify(&mut self, id: RecordId, f: impl FnOnce(&mut T)) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                f(&mut self.records[idx]);
                true
            }
            None => false,
        }
    }

    fn changed(&mut self) {
        self.hierarchy = Hierarchy::build(&self.records);
        self.hook.after_change(&self.records);
    }
}
