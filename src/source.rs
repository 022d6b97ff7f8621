use crate::error::FetchError;
use crate::pager::{Cursor, Page};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Data source collaborator: returns one page per call, or a failure.
///
/// `cursor` is `None` only for the very first page.
pub trait DataSource {
    fn fetch_page(&mut self, limit: usize, cursor: Option<&Cursor>) -> Result<Page, FetchError>;
}

impl<S: DataSource + ?Sized> DataSource for &mut S {
    fn fetch_page(&mut self, limit: usize, cursor: Option<&Cursor>) -> Result<Page, FetchError> {
        (**self).fetch_page(limit, cursor)
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn fetch_page(&mut self, limit: usize, cursor: Option<&Cursor>) -> Result<Page, FetchError> {
        (**self).fetch_page(limit, cursor)
    }
}

/// In-memory source paging over a fixed item list with numeric offset cursors.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<Value>,
    calls: usize,
}

impl MemorySource {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items, calls: 0 }
    }

    /// Load items from a JSON file holding an array, or an object with an
    /// `items` array.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))?;
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(eyre!(
                        "{} must hold a JSON array or an object with an \"items\" array",
                        path.display()
                    ))
                }
            },
            _ => {
                return Err(eyre!(
                    "{} must hold a JSON array or an object with an \"items\" array",
                    path.display()
                ))
            }
        };
        debug!(path = %path.display(), items = items.len(), "Opened record file");
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of `fetch_page` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// First page, served synchronously to seed the explorer.
    pub fn initial_page(&self, limit: usize) -> Page {
        self.slice(0, limit)
    }

    fn slice(&self, offset: usize, limit: usize) -> Page {
        let start = offset.min(self.items.len());
        let end = start.saturating_add(limit).min(self.items.len());
        let next_cursor = if end < self.items.len() {
            Cursor::from_value(Value::from(end))
        } else {
            None
        };
        Page::new(self.items[start..end].to_vec(), next_cursor, self.items.len())
    }
}

impl DataSource for MemorySource {
    fn fetch_page(&mut self, limit: usize, cursor: Option<&Cursor>) -> Result<Page, FetchError> {
        self.calls += 1;
        let offset = match cursor {
            None => 0,
            Some(cursor) => cursor
                .as_value()
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| FetchError::new(format!("invalid cursor: {}", cursor.as_value())))?,
        };
        Ok(self.slice(offset, limit))
    }
}
