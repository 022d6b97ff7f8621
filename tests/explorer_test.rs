mod common;

use common::{emails, order_items, orders_profile};
use pagelens::{
    Explorer, Intent, MemorySource, RecordId, SelectionChange, SmartFilter, VisibleColumns,
};

fn explorer(page_size: usize) -> Explorer<MemorySource> {
    let source = MemorySource::new(order_items());
    let initial = source.initial_page(page_size);
    Explorer::new(orders_profile(), page_size, initial, source)
}

fn set_status(value: &str) -> Intent {
    Intent::SetDiscreteFilter {
        name: "status".to_string(),
        value: value.to_string(),
    }
}

#[test]
fn test_selection_survives_filtering_and_paging() {
    let mut ex = explorer(2);
    ex.dispatch(Intent::SetSelection(SelectionChange::Add(RecordId::new("2"))));
    ex.dispatch(set_status("paid"));

    let view = ex.view();
    assert_eq!(emails(&view.records), vec!["ann@x.com"]);
    assert_eq!(view.summary.selected_count, 1);
    drop(view);

    ex.dispatch(Intent::LoadNextPage);
    assert!(ex.selection().contains(&RecordId::new("2")));
    assert_eq!(emails(&ex.filtered_records()), vec!["ann@x.com", "bob@x.com"]);

    let selected: Vec<_> = ex.selected_records().iter().map(|r| r.id().to_string()).collect();
    assert_eq!(selected, vec!["2"]);
}

#[test]
fn test_selection_persists_when_filter_reverted() {
    let mut ex = explorer(3);
    ex.dispatch(Intent::SetSelection(SelectionChange::Add(RecordId::new("2"))));
    ex.dispatch(set_status("paid"));
    assert!(ex.view().records.iter().all(|r| r.id().as_str() != "2"));

    ex.dispatch(set_status("All"));
    let view = ex.view();
    let carl = view
        .records
        .iter()
        .find(|r| r.id().as_str() == "2")
        .expect("carl visible again");
    assert!(view.selection.contains(carl.id()));
}

#[test]
fn test_selection_of_unloaded_id_is_kept() {
    let mut ex = explorer(1);
    ex.dispatch(Intent::SetSelection(SelectionChange::Replace(vec![
        RecordId::new("3"),
        RecordId::new("1"),
    ])));
    assert_eq!(ex.selected_records().len(), 1);
    ex.dispatch(Intent::LoadNextPage);
    ex.dispatch(Intent::LoadNextPage);
    assert_eq!(ex.selected_records().len(), 2);

    ex.dispatch(Intent::SetSelection(SelectionChange::Remove(RecordId::new("1"))));
    assert_eq!(ex.selection().len(), 1);
    ex.dispatch(Intent::SetSelection(SelectionChange::Clear));
    assert!(ex.selection().is_empty());
}

#[test]
fn test_options_stable_while_typing_smart_query() {
    let mut ex = explorer(3);
    let before = ex.filter_options().clone();
    for query in ["b", "bo", "bob", "bob@"] {
        ex.dispatch(Intent::SetSmartFilter(SmartFilter::new("email", query)));
        assert_eq!(ex.filter_options(), &before);
    }
    assert_eq!(emails(&ex.filtered_records()), vec!["bob@x.com"]);

    // The narrowed view still allows picking a value only other rows carry
    ex.dispatch(set_status("pending"));
    assert_eq!(ex.filters().discrete.get("status"), "pending");
    assert!(ex.filtered_records().is_empty());
}

#[test]
fn test_reset_restores_defaults() {
    let mut ex = explorer(3);
    ex.dispatch(set_status("paid"));
    ex.dispatch(Intent::SetSmartFilter(SmartFilter::new("email", "ann")));
    ex.dispatch(Intent::SetSelection(SelectionChange::Add(RecordId::new("1"))));
    ex.dispatch(Intent::ResetFilters);

    assert!(ex.filters().discrete.is_unconstrained());
    assert_eq!(ex.filters().smart, SmartFilter::new("order_number", ""));
    assert_eq!(ex.filtered_records().len(), 3);
    assert_eq!(ex.selection().len(), 1);
}

#[test]
fn test_visible_columns_keep_catalogue_order() {
    let mut ex = explorer(3);
    ex.dispatch(Intent::SetVisibleColumns(VisibleColumns::new([
        "updated_at",
        "email",
        "order_number",
        "bogus",
    ])));
    let labels: Vec<_> = ex
        .projected_columns()
        .iter()
        .map(|c| c.label.clone())
        .collect();
    assert_eq!(labels, vec!["Order #", "Email", "Updated"]);

    ex.dispatch(Intent::SetVisibleColumns(VisibleColumns::default()));
    assert!(ex.view().columns.is_empty());
}

#[test]
fn test_view_summary_and_smart_field_options() {
    let mut ex = explorer(2);
    ex.dispatch(set_status("paid"));
    let view = ex.view();
    assert_eq!(view.summary.total, 3);
    assert_eq!(view.summary.loaded, 2);
    assert_eq!(view.summary.current_count, 1);
    assert!(view.summary.has_more);
    assert!(!view.summary.is_loading);
    assert_eq!(view.smart_field_options.len(), 10);
    assert_eq!(view.smart_field_options[0], ("Order #", "order_number"));
    assert_eq!(
        view.filter_options.get("status").expect("status options").to_vec(),
        vec!["All", "paid", "pending"]
    );
}
