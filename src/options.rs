//! Selectable option sets for discrete filters.
//!
//! Options are always derived from the unfiltered base records so that the
//! lists stay put while a smart query narrows the visible rows.

use crate::field::{FieldRegistry, Purpose};
use crate::filter::DiscreteFilter;
use crate::record::Record;
use serde::Serialize;
use std::collections::HashSet;

/// Sentinel discrete value meaning "no constraint".
pub const ALL: &str = "All";

/// `["All", ...unique values]` for `field`, unique values in first-seen order.
/// Empty resolved values are left out.
pub fn derive_options<'a, I>(records: I, registry: &FieldRegistry, field: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    let mut options = vec![ALL.to_string()];
    for record in records {
        let value = registry.resolve(field, record, Purpose::Display).as_text();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.clone()) {
            options.push(value);
        }
    }
    options
}

/// Option lists for every discrete filter, in filter declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    entries: Vec<(String, Vec<String>)>,
}

impl FilterOptions {
    pub fn derive(records: &[Record], registry: &FieldRegistry, filters: &[DiscreteFilter]) -> Self {
        let entries = filters
            .iter()
            .map(|f| (f.name.clone(), derive_options(records, registry, &f.field)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, filter_name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == filter_name)
            .map(|(_, opts)| opts.as_slice())
    }

    /// Whether `value` may be chosen for `filter_name`. `All` is always allowed
    /// for a known filter.
    pub fn allows(&self, filter_name: &str, value: &str) -> bool {
        self.get(filter_name)
            .map(|opts| opts.iter().any(|o| o == value))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, opts)| (name.as_str(), opts.as_slice()))
    }
}
