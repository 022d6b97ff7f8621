use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::mpsc::channel;
use tracing::trace;

pub mod cli;
pub mod columns;
pub mod config;
pub mod error;
pub mod explorer;
pub mod field;
pub mod filter;
pub mod logging;
pub mod options;
pub mod orders;
pub mod pager;
pub mod record;
pub mod render;
pub mod selection;
pub mod source;

pub use cli::{Args, OutputFormat};
pub use columns::{ColumnCatalogue, ColumnSpec, VisibleColumns};
pub use config::{AppConfig, ConfigManager};
pub use error::FetchError;
pub use explorer::{Explorer, ExplorerView, Intent, Profile, SelectionChange, Summary};
pub use field::{FieldRegistry, FieldValue, Purpose, Resolver};
pub use filter::{DiscreteFilter, DiscreteFilterState, FilterPipeline, FilterState, SmartFilter};
pub use options::{FilterOptions, ALL};
pub use pager::{Cursor, FetchRequest, FetchState, Page, PageCursorStore};
pub use record::{Record, RecordId, RecordSchema};
pub use selection::{Selection, SelectionTracker};
pub use source::{DataSource, MemorySource};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "pagelens";

/// Settings for one exploration run, resolved from config and CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ExploreOptions {
    pub page_size: usize,
    /// Additional pages to load after the initial one
    pub pages: usize,
    pub schema: RecordSchema,
    pub date_format: String,
    pub search_date_format: String,
    pub filters: Vec<(String, String)>,
    pub search: Option<SmartFilter>,
    pub columns: Option<Vec<String>>,
    pub select: Vec<RecordId>,
    pub output: OutputFormat,
}

impl ExploreOptions {
    /// Create ExploreOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Result<Self> {
        let page_size = args.page_size.unwrap_or(config.paging.page_size);
        if page_size == 0 {
            return Err(eyre!("--page-size must be greater than 0"));
        }

        let identity_field = args
            .identity_field
            .clone()
            .unwrap_or_else(|| config.records.identity_field.clone());
        let envelope_field = Some(config.records.envelope_field.clone()).filter(|f| !f.is_empty());

        let filters = args
            .filter
            .iter()
            .map(|raw| {
                cli::parse_filter_arg(raw)
                    .ok_or_else(|| eyre!("Invalid --filter {:?}, expected NAME=VALUE", raw))
            })
            .collect::<Result<Vec<_>>>()?;

        let search = args
            .search
            .as_deref()
            .map(|raw| {
                cli::parse_search_arg(raw)
                    .map(|(field, query)| SmartFilter::new(&field, &query))
                    .ok_or_else(|| eyre!("Invalid --search {:?}, expected FIELD:QUERY", raw))
            })
            .transpose()?;

        Ok(Self {
            page_size,
            pages: args.pages.unwrap_or(0),
            schema: RecordSchema {
                identity_field,
                envelope_field,
            },
            date_format: config.display.date_format.clone(),
            search_date_format: config.display.search_date_format.clone(),
            filters,
            search,
            columns: args
                .columns
                .clone()
                .or_else(|| config.display.visible_columns.clone()),
            select: args.select.iter().map(RecordId::new).collect(),
            output: args.output.unwrap_or_default(),
        })
    }

    /// The orders profile configured with these options' schema and date formats
    pub fn profile(&self) -> Profile {
        orders::profile(
            self.schema.clone(),
            &self.date_format,
            &self.search_date_format,
        )
    }

    /// User intents for this run, in application order. Pages are loaded
    /// first so that filter values from later pages are accepted.
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = Vec::new();
        intents.extend(std::iter::repeat_with(|| Intent::LoadNextPage).take(self.pages));
        if let Some(columns) = &self.columns {
            intents.push(Intent::SetVisibleColumns(VisibleColumns::new(columns.iter().cloned())));
        }
        for (name, value) in &self.filters {
            intents.push(Intent::SetDiscreteFilter {
                name: name.clone(),
                value: value.clone(),
            });
        }
        if let Some(search) = &self.search {
            intents.push(Intent::SetSmartFilter(search.clone()));
        }
        if !self.select.is_empty() {
            intents.push(Intent::SetSelection(SelectionChange::Replace(self.select.clone())));
        }
        intents
    }
}

/// Feed intents to the explorer through a channel. Each intent is run to
/// completion, follow-ups included, before the next one is taken.
pub fn drive<S: DataSource>(explorer: &mut Explorer<S>, intents: Vec<Intent>) -> Result<()> {
    let (tx, rx) = channel::<Intent>();
    for intent in intents {
        tx.send(intent)?;
        while let Ok(event) = rx.try_recv() {
            trace!(?event, "Dispatching intent");
            if let Some(next) = explorer.event(event) {
                tx.send(next)?;
            }
        }
    }
    Ok(())
}
