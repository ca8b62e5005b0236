use tracing::debug;

use super::collection::{ChangeHook, NoopHook, OrderedCollection};
use crate::model::record::{Record, RecordId};
use crate::model::task::Task;

/// Tasks of one project or one query. Persisted only as part of a larger
/// snapshot, so changes notify nobody.
pub type TaskCollection = OrderedCollection<Task, NoopHook>;

impl<H: ChangeHook<Task>> OrderedCollection<Task, H> {
    /// Mark tasks checked in place. Unknown ids are skipped.
    pub fn complete_items(&mut self, ids: &[RecordId]) {
        self.set_checked(ids, true);
    }

    /// Clear the checked mark in place. Unknown ids are skipped.
    pub fn uncomplete_items(&mut self, ids: &[RecordId]) {
        self.set_checked(ids, false);
    }

    fn set_checked(&mut self, ids: &[RecordId], checked: bool) {
        let mut touched = 0usize;
        for &id in ids {
            if self.modify(id, |task| task.checked = checked) {
                touched += 1;
            }
        }
        debug!(checked, requested = ids.len(), touched, "set checked state");
    }

    /// The task and every task nested under it: what a completion toggle
    /// acts on.
    pub fn completion_targets(&self, id: RecordId) -> Vec<RecordId> {
        if self.get(id).is_none() {
            return Vec::new();
        }
        let mut ids = vec![id];
        ids.extend(self.descendant_ids(id));
        ids
    }

    /// Indent a new task should get when placed next to `near`.
    ///
    /// Before a task: a sibling of it. After a task with children: its first
    /// child. After a leaf: a sibling. No anchor (or a stale one): top level.
    pub fn indent_for_insert(&self, near: Option<RecordId>, before: bool) -> i32 {
        let Some(anchor) = near.and_then(|id| self.get(id)) else {
            return crate::model::record::INDENT_MIN;
        };
        if !before && self.is_parent(anchor.id()) {
            anchor.indent() + 1
        } else {
            anchor.indent()
        }
    }

    /// Unchecked tasks, for outstanding-count bookkeeping
    pub fn outstanding(&self) -> usize {
        self.records().iter().filter(|t| !t.checked).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::RecordMeta;

    fn task(id: RecordId, indent: i32) -> Task {
        Task::new(RecordMeta::new(id, false, indent, 1), 7, format!("t{}", id))
    }

    fn sample() -> TaskCollection {
        let mut c = TaskCollection::default();
        c.import_array(vec![task(1, 1), task(2, 2), task(3, 3), task(4, 1)]);
        c
    }

    #[test]
    fn complete_and_uncomplete_in_place() {
        let mut c = sample();
        c.complete_items(&[1, 3, 99]);
        assert!(c.get(1).unwrap().checked);
        assert!(!c.get(2).unwrap().checked);
        assert!(c.get(3).unwrap().checked);
        assert_eq!(c.outstanding(), 2);
        c.uncomplete_items(&[3]);
        assert!(!c.get(3).unwrap().checked);
        assert_eq!(c.orders(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn completion_targets_include_descendants() {
        let c = sample();
        assert_eq!(c.completion_targets(1), vec![1, 2, 3]);
        assert_eq!(c.completion_targets(2), vec![2, 3]);
        assert_eq!(c.completion_targets(4), vec![4]);
        assert!(c.completion_targets(42).is_empty());
    }

    #[test]
    fn insert_indent_follows_anchor() {
        let c = sample();
        assert_eq!(c.indent_for_insert(None, false), 1);
        assert_eq!(c.indent_for_insert(Some(42), false), 1);
        // before anything: sibling
        assert_eq!(c.indent_for_insert(Some(2), true), 2);
        // after a parent: first child
        assert_eq!(c.indent_for_insert(Some(1), false), 2);
        assert_eq!(c.indent_for_insert(Some(2), false), 3);
        // after a leaf: sibling
        assert_eq!(c.indent_for_insert(Some(3), false), 3);
        assert_eq!(c.indent_for_insert(Some(4), false), 1);
    }
}
