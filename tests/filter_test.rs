mod common;

use common::{emails, order_records, orders_profile};
use pagelens::{DiscreteFilterState, FilterOptions, FilterPipeline, FilterState, SmartFilter};

#[test]
fn test_discrete_then_smart_narrowing() {
    let profile = orders_profile();
    let records = order_records();
    let pipeline = FilterPipeline::new(&profile.registry, &profile.filters);

    let paid = FilterState::new(
        DiscreteFilterState::new().with("status", "paid"),
        SmartFilter::new("order_number", ""),
    );
    let result = pipeline.apply(&records, &paid);
    assert_eq!(emails(&result), vec!["ann@x.com", "bob@x.com"]);

    let ann = FilterState::new(paid.discrete.clone(), SmartFilter::new("email", "ANN"));
    let result = pipeline.apply(&records, &ann);
    assert_eq!(emails(&result), vec!["ann@x.com"]);
}

#[test]
fn test_all_sentinel_is_unconstrained() {
    let profile = orders_profile();
    let records = order_records();
    let pipeline = FilterPipeline::new(&profile.registry, &profile.filters);
    let state = FilterState::new(
        DiscreteFilterState::new().with("status", "All"),
        SmartFilter::new("email", ""),
    );
    assert!(state.discrete.is_unconstrained());
    assert_eq!(pipeline.apply(&records, &state).len(), 3);
}

#[test]
fn test_filters_are_conjunctive() {
    let profile = orders_profile();
    let records = order_records();
    let pipeline = FilterPipeline::new(&profile.registry, &profile.filters);
    let state = FilterState::new(
        DiscreteFilterState::new()
            .with("status", "paid")
            .with("fulfillment", "partial"),
        SmartFilter::default(),
    );
    assert_eq!(emails(&pipeline.apply(&records, &state)), vec!["bob@x.com"]);
}

#[test]
fn test_smart_filter_on_composite_and_collection_fields() {
    let profile = orders_profile();
    let records = order_records();
    let pipeline = FilterPipeline::new(&profile.registry, &profile.filters);

    let by_customer = SmartFilter::new("customer", "carl d");
    assert_eq!(
        emails(&pipeline.smart_only(&records, &by_customer)),
        vec!["carl@x.com"]
    );

    let by_item = SmartFilter::new("line_items", "kettle");
    assert_eq!(
        emails(&pipeline.smart_only(&records, &by_item)),
        vec!["carl@x.com"]
    );

    let by_date = SmartFilter::new("created_at", "3/1/2024");
    assert_eq!(
        emails(&pipeline.smart_only(&records, &by_date)),
        vec!["bob@x.com"]
    );
}

#[test]
fn test_options_from_base_set() {
    let profile = orders_profile();
    let records = order_records();
    let options = FilterOptions::derive(&records, &profile.registry, &profile.filters);
    assert_eq!(
        options.get("status").expect("status options").to_vec(),
        vec!["All", "paid", "pending"]
    );
    assert_eq!(
        options.get("fulfillment").expect("fulfillment options").to_vec(),
        vec!["All", "fulfilled", "partial"]
    );
}
