//! Filtered view computation.
//!
//! Discrete filters are exact matches on a resolved field, with [`ALL`]
//! meaning no constraint. The smart filter is a case-insensitive substring
//! match on one field. Both are conjunctive predicates over the same base set,
//! so their order only affects how much work is done.

use crate::field::{FieldRegistry, Purpose};
use crate::options::ALL;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declaration of a discrete filter: operator-facing name bound to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteFilter {
    pub name: String,
    pub label: String,
    pub field: String,
}

impl DiscreteFilter {
    pub fn new(name: &str, label: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field: field.to_string(),
        }
    }
}

/// Chosen value per discrete filter. Absent entries read as [`ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteFilterState {
    values: BTreeMap<String, String>,
}

impl DiscreteFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or(ALL)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        if value == ALL {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value.to_string());
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.values.is_empty()
    }

    /// Constrained filters as `(name, value)` pairs.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Free-text filter over one field. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartFilter {
    pub field: String,
    pub query: String,
}

impl SmartFilter {
    pub fn new(field: &str, query: &str) -> Self {
        Self {
            field: field.to_string(),
            query: query.to_string(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.query.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub discrete: DiscreteFilterState,
    pub smart: SmartFilter,
}

impl FilterState {
    pub fn new(discrete: DiscreteFilterState, smart: SmartFilter) -> Self {
        Self { discrete, smart }
    }
}

/// Applies filter state to records using a field registry and the declared
/// discrete filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterPipeline<'r> {
    registry: &'r FieldRegistry,
    filters: &'r [DiscreteFilter],
}

impl<'r> FilterPipeline<'r> {
    pub fn new(registry: &'r FieldRegistry, filters: &'r [DiscreteFilter]) -> Self {
        Self { registry, filters }
    }

    fn field_for(&self, name: &str) -> Option<&'r str> {
        self.filters
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field.as_str())
    }

    /// Conjunction of every constrained discrete filter. Values for undeclared
    /// filter names do not constrain anything.
    pub fn matches_discrete(&self, record: &Record, discrete: &DiscreteFilterState) -> bool {
        discrete.active().all(|(name, value)| match self.field_for(name) {
            Some(field) => self.registry.resolve(field, record, Purpose::Display).as_text() == value,
            None => true,
        })
    }

    pub fn matches_smart(&self, record: &Record, smart: &SmartFilter) -> bool {
        if smart.is_noop() {
            return true;
        }
        let needle = smart.query.to_lowercase();
        self.registry
            .resolve(&smart.field, record, Purpose::Search)
            .contains_lowercase(&needle)
    }

    /// Discrete predicates first, then the smart predicate over what remains.
    pub fn apply<'a, I>(&self, records: I, state: &FilterState) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let narrowed = self.discrete_only(records, &state.discrete);
        self.smart_only(narrowed, &state.smart)
    }

    pub fn discrete_only<'a, I>(&self, records: I, discrete: &DiscreteFilterState) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|r| self.matches_discrete(r, discrete))
            .collect()
    }

    pub fn smart_only<'a, I>(&self, records: I, smart: &SmartFilter) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|r| self.matches_smart(r, smart))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordSchema;
    use serde_json::json;

    fn records() -> Vec<Record> {
        let schema = RecordSchema::default();
        [
            json!({"id": 1, "financial_status": "paid", "fulfillment_status": "fulfilled", "email": "ann@x.com"}),
            json!({"id": 2, "financial_status": "pending", "fulfillment_status": "fulfilled", "email": "carl@x.com"}),
            json!({"id": 3, "financial_status": "paid", "email": "bob@x.com"}),
        ]
        .into_iter()
        .filter_map(|v| schema.ingest(v))
        .collect()
    }

    fn filters() -> Vec<DiscreteFilter> {
        vec![
            DiscreteFilter::new("status", "Status", "financial_status"),
            DiscreteFilter::new("fulfillment", "Fulfillment", "fulfillment_status"),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_discrete_state_all_is_absent() {
        let mut state = DiscreteFilterState::new().with("status", "paid");
        assert_eq!(state.get("status"), "paid");
        assert_eq!(state.get("fulfillment"), ALL);
        state.set("status", ALL);
        assert!(state.is_unconstrained());
    }

    #[test]
    fn test_discrete_conjunction() {
        let registry = FieldRegistry::new();
        let filters = filters();
        let pipeline = FilterPipeline::new(&registry, &filters);
        let records = records();
        let state = FilterState::new(
            DiscreteFilterState::new()
                .with("status", "paid")
                .with("fulfillment", "fulfilled"),
            SmartFilter::default(),
        );
        assert_eq!(ids(&pipeline.apply(&records, &state)), vec!["1"]);
    }

    #[test]
    fn test_smart_case_insensitive() {
        let registry = FieldRegistry::new();
        let filters = filters();
        let pipeline = FilterPipeline::new(&registry, &filters);
        let records = records();
        let state = FilterState::new(DiscreteFilterState::new(), SmartFilter::new("email", "CARL"));
        assert_eq!(ids(&pipeline.apply(&records, &state)), vec!["2"]);
    }

    #[test]
    fn test_unknown_filter_name_does_not_constrain() {
        let registry = FieldRegistry::new();
        let filters = filters();
        let pipeline = FilterPipeline::new(&registry, &filters);
        let records = records();
        let discrete = DiscreteFilterState::new().with("board", "x");
        assert_eq!(pipeline.discrete_only(&records, &discrete).len(), 3);
    }

    #[test]
    fn test_empty_query_is_identity() {
        let registry = FieldRegistry::new();
        let filters = filters();
        let pipeline = FilterPipeline::new(&registry, &filters);
        let records = records();
        let discrete = DiscreteFilterState::new().with("status", "paid");
        let with_noop = pipeline.apply(&records, &FilterState::new(discrete.clone(), SmartFilter::new("email", "")));
        assert_eq!(ids(&with_noop), ids(&pipeline.discrete_only(&records, &discrete)));
    }
}
