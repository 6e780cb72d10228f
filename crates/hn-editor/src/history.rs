//! Bounded linear undo/redo over whole-model snapshots.

use std::sync::Arc;

use hn_model::{SnapshotCloner, SystemModel};

use crate::selection::Selection;

pub const MAX_HISTORY: usize = 50;

/// One history entry: the model and what the edit selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub model: SystemModel,
    pub selection: Selection,
}

/// Snapshots are taken through the cloner on the way in and on the way out, so
/// no entry ever shares data with the live model.
#[derive(Debug)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    capacity: usize,
    cloner: Arc<SnapshotCloner>,
}

impl History {
    /// A history holding one snapshot of `initial` at index 0.
    pub fn new(initial: &SystemModel, capacity: usize, cloner: Arc<SnapshotCloner>) -> Self {
        let mut history = Self {
            entries: Vec::with_capacity(capacity.max(1)),
            index: 0,
            capacity: capacity.max(1),
            cloner,
        };
        history.reset(initial);
        history
    }

    pub fn reset(&mut self, model: &SystemModel) {
        let entry = self.snapshot(model, Selection::None);
        self.entries.clear();
        self.entries.push(entry);
        self.index = 0;
    }

    /// Discards the redo branch, appends, and evicts from the front past capacity.
    pub fn push(&mut self, model: &SystemModel, selection: Selection) {
        self.entries.truncate(self.index + 1);
        let entry = self.snapshot(model, selection);
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.drain(..evicted);
            tracing::trace!(evicted, capacity = self.capacity, "history evicted oldest snapshots");
        }
        self.index = self.entries.len() - 1;
    }

    /// Steps back and returns a fresh copy of the snapshot now current.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.restore())
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.restore())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    fn snapshot(&self, model: &SystemModel, selection: Selection) -> Snapshot {
        Snapshot {
            model: self.cloner.snapshot(model).into_value(),
            selection,
        }
    }

    fn restore(&self) -> Snapshot {
        let entry = &self.entries[self.index];
        self.snapshot(&entry.model, entry.selection.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_fluid(fluid: &str) -> SystemModel {
        let mut model = SystemModel::empty();
        model.fluid_id = fluid.to_string();
        model
    }

    fn push(h: &mut History, model: &SystemModel) {
        h.push(model, Selection::None);
    }

    fn history(capacity: usize) -> History {
        History::new(&model_with_fluid("f0"), capacity, Arc::new(SnapshotCloner::new()))
    }

    #[test]
    fn starts_with_one_entry() {
        let h = history(MAX_HISTORY);
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_redo_walk_the_entries() {
        let mut h = history(MAX_HISTORY);
        push(&mut h, &model_with_fluid("f1"));
        push(&mut h, &model_with_fluid("f2"));

        assert_eq!(h.undo().unwrap().model.fluid_id, "f1");
        assert_eq!(h.undo().unwrap().model.fluid_id, "f0");
        assert!(h.undo().is_none());
        assert_eq!(h.redo().unwrap().model.fluid_id, "f1");
        assert_eq!(h.redo().unwrap().model.fluid_id, "f2");
        assert!(h.redo().is_none());
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut h = history(MAX_HISTORY);
        push(&mut h, &model_with_fluid("f1"));
        push(&mut h, &model_with_fluid("f2"));
        h.undo();
        h.undo();
        push(&mut h, &model_with_fluid("g1"));

        assert!(!h.can_redo());
        assert_eq!(h.len(), 2);
        assert_eq!(h.current().model.fluid_id, "g1");
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut h = history(3);
        for i in 1..=4 {
            push(&mut h, &model_with_fluid(&format!("f{i}")));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.index(), 2);
        assert_eq!(h.current().model.fluid_id, "f4");
        assert_eq!(h.undo().unwrap().model.fluid_id, "f3");
        assert_eq!(h.undo().unwrap().model.fluid_id, "f2");
        assert!(!h.can_undo());
    }

    #[test]
    fn snapshots_do_not_alias_the_pushed_model() {
        let mut h = history(MAX_HISTORY);
        let mut live = model_with_fluid("f1");
        push(&mut h, &live);
        live.fluid_id.push_str("-edited");
        assert_eq!(h.current().model.fluid_id, "f1");

        let mut restored = h.undo().unwrap();
        restored.model.fluid_id = "scribbled".into();
        assert_eq!(h.redo().unwrap().model.fluid_id, "f1");
        assert_eq!(h.undo().unwrap().model.fluid_id, "f0");
    }

    #[test]
    fn entries_keep_their_selection() {
        let mut h = history(MAX_HISTORY);
        h.push(&model_with_fluid("f1"), Selection::Node("n1".into()));
        let back = h.undo().unwrap();
        assert!(back.selection.is_none());
        let forward = h.redo().unwrap();
        assert_eq!(forward.selection, Selection::Node("n1".into()));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut h = history(0);
        push(&mut h, &model_with_fluid("f1"));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len(), 1);
        assert_eq!(h.current().model.fluid_id, "f1");
    }
}
