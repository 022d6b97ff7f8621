use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub type RenderFn = dyn Fn(&Record) -> String + Send + Sync;

/// One column of the canonical catalogue.
///
/// `sortable` and `searchable` declare what the column supports; a rendering
/// collaborator consults them instead of wiring callbacks that do nothing.
#[derive(Clone)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub searchable: bool,
    render: Arc<RenderFn>,
}

impl ColumnSpec {
    pub fn new<F>(key: &str, label: &str, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
            searchable: true,
            render: Arc::new(render),
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn render(&self, record: &Record) -> String {
        (self.render)(record)
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .finish_non_exhaustive()
    }
}

/// Set of visible column keys. Order-insensitive; it masks the catalogue and
/// never reorders it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleColumns(HashSet<String>);

impl VisibleColumns {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Columns in canonical, stable order.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalogue {
    columns: Vec<ColumnSpec>,
}

impl ColumnCatalogue {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn get(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Catalogue subsequence whose keys are visible, in catalogue order.
    pub fn project(&self, visible: &VisibleColumns) -> Vec<&ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| visible.contains(&c.key))
            .collect()
    }

    /// `(label, key)` pairs offered as smart filter fields.
    pub fn searchable_fields(&self) -> Vec<(&str, &str)> {
        self.columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| (c.label.as_str(), c.key.as_str()))
            .collect()
    }

    pub fn all_visible(&self) -> VisibleColumns {
        VisibleColumns::new(self.keys())
    }
}
