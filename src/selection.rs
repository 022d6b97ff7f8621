use crate::record::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of selected record identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection(BTreeSet<RecordId>);

impl Selection {
    pub fn contains(&self, id: &RecordId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.0.iter()
    }
}

/// Tracks selected identities independently of filtering and pagination.
/// Hidden records stay selected.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selection: Selection,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn add(&mut self, id: RecordId) -> &Selection {
        self.selection.0.insert(id);
        &self.selection
    }

    pub fn remove(&mut self, id: &RecordId) -> &Selection {
        self.selection.0.remove(id);
        &self.selection
    }

    pub fn replace<I>(&mut self, ids: I) -> &Selection
    where
        I: IntoIterator<Item = RecordId>,
    {
        self.selection.0 = ids.into_iter().collect();
        &self.selection
    }

    pub fn clear(&mut self) -> &Selection {
        self.selection.0.clear();
        &self.selection
    }

    pub fn is_selected(&self, record: &Record) -> bool {
        self.selection.contains(record.id())
    }

    /// Selected records among `records`, in the order given. Selected ids
    /// with no matching record are skipped but stay selected.
    pub fn selected_records<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.is_selected(r)).collect()
    }
}
