//! The explorer view model.
//!
//! State lives here and changes only through [`Intent`]s passed to
//! [`Explorer::event`]. Derived data (filtered rows, projected columns,
//! filter options) is recomputed from that state by the pure functions in
//! `filter`, `options` and `columns`.

use crate::columns::{ColumnCatalogue, ColumnSpec, VisibleColumns};
use crate::error::FetchError;
use crate::field::FieldRegistry;
use crate::filter::{DiscreteFilter, FilterPipeline, FilterState, SmartFilter};
use crate::options::FilterOptions;
use crate::pager::{FetchRequest, FetchState, Page, PageCursorStore};
use crate::record::{Record, RecordId, RecordSchema};
use crate::selection::{Selection, SelectionTracker};
use crate::source::DataSource;
use serde::Serialize;
use tracing::{debug, warn};

/// Domain description the explorer runs against.
#[derive(Debug, Clone)]
pub struct Profile {
    pub schema: RecordSchema,
    pub registry: FieldRegistry,
    pub catalogue: ColumnCatalogue,
    pub filters: Vec<DiscreteFilter>,
    pub default_smart_field: String,
    pub default_visible: VisibleColumns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Add(RecordId),
    Remove(RecordId),
    Replace(Vec<RecordId>),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetDiscreteFilter { name: String, value: String },
    SetSmartFilter(SmartFilter),
    ResetFilters,
    LoadNextPage,
    Retry,
    SetVisibleColumns(VisibleColumns),
    SetSelection(SelectionChange),
    /// Internal: perform the outstanding fetch
    DoFetch(FetchRequest),
    /// Internal: outcome of the outstanding fetch
    FetchCompleted(Result<Page, FetchError>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub loaded: usize,
    pub current_count: usize,
    pub selected_count: usize,
    pub has_more: bool,
    pub is_loading: bool,
}

/// Everything a rendering collaborator needs for one frame.
#[derive(Debug)]
pub struct ExplorerView<'a> {
    pub records: Vec<&'a Record>,
    pub columns: Vec<&'a ColumnSpec>,
    pub selection: &'a Selection,
    pub fetch_state: &'a FetchState,
    pub filter_options: &'a FilterOptions,
    pub filters: &'a FilterState,
    pub smart_field_options: Vec<(&'a str, &'a str)>,
    pub summary: Summary,
}

pub struct Explorer<S> {
    profile: Profile,
    store: PageCursorStore,
    source: S,
    filters: FilterState,
    visible: VisibleColumns,
    selection: SelectionTracker,
    options: FilterOptions,
    fetch_issued: bool,
}

impl<S: DataSource> Explorer<S> {
    /// Seed with the initial page. No fetch is issued here.
    pub fn new(profile: Profile, page_size: usize, initial: Page, source: S) -> Self {
        let store = PageCursorStore::seed(profile.schema.clone(), page_size, initial);
        let options = FilterOptions::derive(store.records(), &profile.registry, &profile.filters);
        let filters = FilterState::new(
            Default::default(),
            SmartFilter::new(&profile.default_smart_field, ""),
        );
        let visible = profile.default_visible.clone();
        Self {
            profile,
            store,
            source,
            filters,
            visible,
            selection: SelectionTracker::new(),
            options,
            fetch_issued: false,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn store(&self) -> &PageCursorStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn visible_columns(&self) -> &VisibleColumns {
        &self.visible
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn fetch_state(&self) -> &FetchState {
        self.store.state()
    }

    fn pipeline(&self) -> FilterPipeline<'_> {
        FilterPipeline::new(&self.profile.registry, &self.profile.filters)
    }

    pub fn filtered_records(&self) -> Vec<&Record> {
        self.pipeline().apply(self.store.records(), &self.filters)
    }

    pub fn projected_columns(&self) -> Vec<&ColumnSpec> {
        self.profile.catalogue.project(&self.visible)
    }

    /// Selected records among those loaded, in loaded order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.selection.selected_records(self.store.records())
    }

    pub fn view(&self) -> ExplorerView<'_> {
        let records = self.filtered_records();
        let summary = Summary {
            total: self.store.total(),
            loaded: self.store.loaded(),
            current_count: records.len(),
            selected_count: self.selection().len(),
            has_more: self.store.has_more(),
            is_loading: self.store.is_loading(),
        };
        ExplorerView {
            records,
            columns: self.projected_columns(),
            selection: self.selection.selection(),
            fetch_state: self.store.state(),
            filter_options: &self.options,
            filters: &self.filters,
            smart_field_options: self.profile.catalogue.searchable_fields(),
            summary,
        }
    }

    /// Handle one intent. Returns the follow-up intent, if any, which the
    /// caller feeds back in (see [`Explorer::dispatch`]).
    pub fn event(&mut self, intent: Intent) -> Option<Intent> {
        match intent {
            Intent::SetDiscreteFilter { name, value } => {
                self.set_discrete_filter(&name, &value);
                None
            }
            Intent::SetSmartFilter(smart) => {
                self.set_smart_filter(smart);
                None
            }
            Intent::ResetFilters => {
                self.reset_filters();
                None
            }
            Intent::LoadNextPage => self.store.begin_load().map(Intent::DoFetch),
            Intent::Retry => self.store.begin_retry().map(Intent::DoFetch),
            Intent::SetVisibleColumns(visible) => {
                self.set_visible_columns(visible);
                None
            }
            Intent::SetSelection(change) => {
                self.apply_selection(change);
                None
            }
            Intent::DoFetch(request) => {
                if !self.store.is_loading() || self.fetch_issued {
                    warn!("Ignoring fetch request with no pending load");
                    return None;
                }
                if self.store.cursor() != Some(&request.cursor) {
                    warn!(cursor = %request.cursor.as_value(), "Ignoring fetch request for a foreign cursor");
                    return None;
                }
                self.fetch_issued = true;
                debug!(limit = request.limit, cursor = %request.cursor.as_value(), "Fetching page");
                let outcome = self.source.fetch_page(request.limit, Some(&request.cursor));
                Some(Intent::FetchCompleted(outcome))
            }
            Intent::FetchCompleted(outcome) => {
                self.fetch_issued = false;
                let succeeded = outcome.is_ok();
                self.store.complete(outcome);
                if succeeded {
                    self.options = FilterOptions::derive(
                        self.store.records(),
                        &self.profile.registry,
                        &self.profile.filters,
                    );
                }
                None
            }
        }
    }

    /// Handle an intent and every follow-up it produces.
    pub fn dispatch(&mut self, intent: Intent) {
        let mut next = Some(intent);
        while let Some(intent) = next {
            next = self.event(intent);
        }
    }

    fn set_discrete_filter(&mut self, name: &str, value: &str) {
        if !self.profile.filters.iter().any(|f| f.name == name) {
            warn!(filter = name, "Ignoring unknown discrete filter");
            return;
        }
        if !self.options.allows(name, value) {
            warn!(filter = name, value, "Ignoring value absent from filter options");
            return;
        }
        debug!(filter = name, value, "Set discrete filter");
        self.filters.discrete.set(name, value);
    }

    fn set_smart_filter(&mut self, smart: SmartFilter) {
        let known = self
            .profile
            .catalogue
            .searchable_fields()
            .iter()
            .any(|(_, key)| *key == smart.field);
        if !known {
            warn!(field = %smart.field, "Ignoring smart filter on a non-searchable field");
            return;
        }
        debug!(field = %smart.field, query = %smart.query, "Set smart filter");
        self.filters.smart = smart;
    }

    fn reset_filters(&mut self) {
        debug!("Reset filters");
        self.filters.discrete.reset();
        self.filters.smart = SmartFilter::new(&self.profile.default_smart_field, "");
        self.store.clear_error();
    }

    fn set_visible_columns(&mut self, visible: VisibleColumns) {
        let known = self
            .profile
            .catalogue
            .keys()
            .filter(|k| visible.contains(k))
            .count();
        if known < visible.len() {
            warn!(
                unknown = visible.len() - known,
                "Visible column set names keys outside the catalogue"
            );
        }
        self.visible = visible;
    }

    fn apply_selection(&mut self, change: SelectionChange) {
        let selection = match change {
            SelectionChange::Add(id) => self.selection.add(id),
            SelectionChange::Remove(id) => self.selection.remove(&id),
            SelectionChange::Replace(ids) => self.selection.replace(ids),
            SelectionChange::Clear => self.selection.clear(),
        };
        debug!(selected = selection.len(), "Selection changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders;
    use crate::source::MemorySource;
    use serde_json::json;

    fn explorer(page_size: usize) -> Explorer<MemorySource> {
        let source = MemorySource::new(vec![
            json!({"id": 1, "order_number": 1001, "financial_status": "paid", "email": "ann@x.com"}),
            json!({"id": 2, "order_number": 1002, "financial_status": "pending", "email": "carl@x.com"}),
            json!({"id": 3, "order_number": 1003, "financial_status": "refunded", "email": "bob@x.com"}),
        ]);
        let initial = source.initial_page(page_size);
        let profile = orders::profile(RecordSchema::default(), "%b %-d, %Y", "%-m/%-d/%Y");
        Explorer::new(profile, page_size, initial, source)
    }

    #[test]
    fn test_initial_state() {
        let ex = explorer(2);
        assert_eq!(ex.store().loaded(), 2);
        assert_eq!(ex.fetch_state(), &FetchState::Idle);
        assert_eq!(ex.filters().smart.field, "order_number");
        assert_eq!(ex.projected_columns().len(), 10);
        assert_eq!(ex.source().calls(), 0);
    }

    #[test]
    fn test_load_next_chains_through_do_fetch() {
        let mut ex = explorer(2);
        let next = ex.event(Intent::LoadNextPage);
        assert!(matches!(next, Some(Intent::DoFetch(_))));
        assert!(ex.event(Intent::LoadNextPage).is_none());
        let completed = ex.event(next.unwrap());
        assert!(matches!(completed, Some(Intent::FetchCompleted(Ok(_)))));
        assert!(ex.event(completed.unwrap()).is_none());
        assert!(ex.fetch_state().is_exhausted());
        assert_eq!(ex.source().calls(), 1);
    }

    #[test]
    fn test_options_refresh_after_page() {
        let mut ex = explorer(2);
        assert!(!ex.filter_options().allows("status", "refunded"));
        ex.dispatch(Intent::LoadNextPage);
        assert!(ex.filter_options().allows("status", "refunded"));
    }

    #[test]
    fn test_rejected_intents_leave_state() {
        let mut ex = explorer(3);
        ex.dispatch(Intent::SetDiscreteFilter {
            name: "status".into(),
            value: "voided".into(),
        });
        ex.dispatch(Intent::SetDiscreteFilter {
            name: "board".into(),
            value: "paid".into(),
        });
        ex.dispatch(Intent::SetSmartFilter(SmartFilter::new("nonexistent", "x")));
        assert_eq!(ex.filters().discrete.get("status"), "All");
        assert_eq!(ex.filters().smart.field, "order_number");
    }

    #[test]
    fn test_stray_do_fetch_ignored() {
        let mut ex = explorer(3);
        let request = FetchRequest {
            limit: 3,
            cursor: crate::pager::Cursor::from_value(json!(0)).unwrap(),
        };
        assert!(ex.event(Intent::DoFetch(request)).is_none());
        assert_eq!(ex.source().calls(), 0);
    }

    #[test]
    fn test_do_fetch_with_foreign_cursor_ignored() {
        let mut ex = explorer(2);
        let fetch = ex.event(Intent::LoadNextPage).unwrap();
        let foreign = Intent::DoFetch(FetchRequest {
            limit: 2,
            cursor: crate::pager::Cursor::from_value(json!(0)).unwrap(),
        });
        assert!(ex.event(foreign).is_none());
        assert_eq!(ex.source().calls(), 0);

        ex.dispatch(fetch);
        assert_eq!(ex.source().calls(), 1);
        assert_eq!(ex.store().loaded(), 3);
    }

    #[test]
    fn test_invalid_date_format_resolves_empty() {
        let source = MemorySource::new(vec![
            json!({"id": 1, "order_number": 1001, "created_at": "2024-01-09T10:00:00Z"}),
        ]);
        let initial = source.initial_page(10);
        let profile = orders::profile(RecordSchema::default(), "%Q", "%Q");
        let mut ex = Explorer::new(profile, 10, initial, source);

        ex.dispatch(Intent::SetSmartFilter(SmartFilter::new("created_at", "2024")));
        assert!(ex.filtered_records().is_empty());

        ex.dispatch(Intent::ResetFilters);
        let view = ex.view();
        let created = view.columns.iter().find(|c| c.key == "created_at").unwrap();
        assert_eq!(created.render(view.records[0]), "");
    }

    #[test]
    fn test_duplicate_do_fetch_issues_one_call() {
        let mut ex = explorer(2);
        let fetch = ex.event(Intent::LoadNextPage).unwrap();
        let completed = ex.event(fetch.clone()).unwrap();
        assert!(ex.event(fetch).is_none());
        ex.event(completed);
        assert_eq!(ex.source().calls(), 1);
        assert_eq!(ex.store().loaded(), 3);
    }
}
