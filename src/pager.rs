//! Accumulated records, the fetch cursor and the fetch state machine.
//!
//! ```text
//! Idle --load-next--> Fetching --ok(cursor)--> Idle
//!                              --ok(none)----> Exhausted
//!                              --err(msg)----> Error(msg) --retry--> Fetching
//! ```
//!
//! At most one fetch is outstanding. A load-next while already fetching is
//! dropped, never queued. Once exhausted, nothing is fetched again.

use crate::error::FetchError;
use crate::record::{Record, RecordId, RecordSchema};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Opaque continuation token from the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cursor(Value);

impl Cursor {
    /// `None` for values that signal exhaustion: `null`, `""`, `{}` and `[]`.
    pub fn from_value(value: Value) -> Option<Self> {
        let exhausted = match &value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if exhausted {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

fn deserialize_cursor<'de, D>(deserializer: D) -> Result<Option<Cursor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(Cursor::from_value))
}

/// One page as returned by the data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(
        default,
        rename = "nextCursor",
        alias = "next_cursor",
        alias = "lastEvaluatedKey",
        deserialize_with = "deserialize_cursor"
    )]
    pub next_cursor: Option<Cursor>,
    #[serde(default)]
    pub total: usize,
}

impl Page {
    pub fn new(items: Vec<Value>, next_cursor: Option<Cursor>, total: usize) -> Self {
        Self {
            items,
            next_cursor,
            total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message")]
pub enum FetchState {
    #[default]
    Idle,
    Fetching,
    Exhausted,
    Error(String),
}

impl FetchState {
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Parameters of the single outstanding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub limit: usize,
    pub cursor: Cursor,
}

#[derive(Debug, Clone)]
pub struct PageCursorStore {
    schema: RecordSchema,
    page_size: usize,
    records: Vec<Record>,
    known_ids: HashSet<RecordId>,
    cursor: Option<Cursor>,
    total: usize,
    state: FetchState,
}

impl PageCursorStore {
    /// Seed the store with the server-supplied first page. A seed without a
    /// cursor starts out exhausted.
    pub fn seed(schema: RecordSchema, page_size: usize, initial: Page) -> Self {
        let mut store = Self {
            schema,
            page_size,
            records: Vec::new(),
            known_ids: HashSet::new(),
            cursor: None,
            total: 0,
            state: FetchState::Idle,
        };
        store.absorb(initial);
        debug!(
            loaded = store.records.len(),
            total = store.total,
            state = ?store.state,
            "Seeded page store"
        );
        store
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn loaded(&self) -> usize {
        self.records.len()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some() && !self.state.is_exhausted()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_fetching()
    }

    /// `Idle -> Fetching`. Returns `None` (and changes nothing) when already
    /// fetching, exhausted, in error, or holding no cursor.
    pub fn begin_load(&mut self) -> Option<FetchRequest> {
        match &self.state {
            FetchState::Idle => {}
            other => {
                debug!(state = ?other, "Ignoring load-next request");
                return None;
            }
        }
        let Some(cursor) = self.cursor.clone() else {
            debug!("Ignoring load-next request without a cursor");
            return None;
        };
        self.state = FetchState::Fetching;
        Some(FetchRequest {
            limit: self.page_size,
            cursor,
        })
    }

    /// `Error -> Fetching` with the same cursor. No-op in any other state.
    pub fn begin_retry(&mut self) -> Option<FetchRequest> {
        if self.state.error().is_none() {
            debug!(state = ?self.state, "Ignoring retry request");
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.state = FetchState::Fetching;
        Some(FetchRequest {
            limit: self.page_size,
            cursor,
        })
    }

    /// Apply the outcome of the outstanding fetch. Outcomes arriving when no
    /// fetch is outstanding are discarded.
    pub fn complete(&mut self, outcome: Result<Page, FetchError>) {
        if !self.state.is_fetching() {
            warn!(state = ?self.state, "Discarding fetch outcome with no fetch outstanding");
            return;
        }
        match outcome {
            Ok(page) => {
                let before = self.records.len();
                self.absorb(page);
                info!(
                    appended = self.records.len() - before,
                    loaded = self.records.len(),
                    total = self.total,
                    exhausted = self.state.is_exhausted(),
                    "Loaded page"
                );
            }
            Err(err) => {
                warn!(error = %err, "Page fetch failed");
                self.state = FetchState::Error(err.message);
            }
        }
    }

    /// Leave the error state without fetching. Cursor and records stay.
    pub fn clear_error(&mut self) {
        if self.state.error().is_some() {
            self.state = FetchState::Idle;
        }
    }

    fn absorb(&mut self, page: Page) {
        for raw in page.items {
            let Some(record) = self.schema.ingest(raw) else {
                warn!(
                    identity_field = %self.schema.identity_field,
                    "Skipping item without a usable identity"
                );
                continue;
            };
            if !self.known_ids.insert(record.id().clone()) {
                debug!(id = %record.id(), "Skipping duplicate record");
                continue;
            }
            self.records.push(record);
        }
        self.total = page.total;
        self.cursor = page.next_cursor;
        self.state = if self.cursor.is_some() {
            FetchState::Idle
        } else {
            FetchState::Exhausted
        };
    }
}
