#![allow(dead_code)]

use pagelens::{orders, Cursor, Page, Profile, Record, RecordSchema};
use serde_json::{json, Value};

/// Three orders: ann (paid), carl (pending), bob (paid).
pub fn order_items() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "order_number": 1001,
            "email": "ann@x.com",
            "financial_status": "paid",
            "fulfillment_status": "fulfilled",
            "customer": {"first_name": "Ann", "last_name": "Lee"},
            "line_items": [{"title": "Mug"}],
            "created_at": "2024-01-09T10:00:00Z"
        }),
        json!({
            "id": 2,
            "order_number": 1002,
            "email": "carl@x.com",
            "financial_status": "pending",
            "customer": {"first_name": "Carl", "last_name": "Diaz"},
            "line_items": [{"title": "Tea"}, {"name": "Kettle"}],
            "created_at": "2024-02-14T10:00:00Z"
        }),
        json!({
            "id": 3,
            "order_number": 1003,
            "email": "bob@x.com",
            "financial_status": "paid",
            "fulfillment_status": "partial",
            "customer": {"first_name": "Bob"},
            "created_at": "2024-03-01"
        }),
    ]
}

pub fn order_records() -> Vec<Record> {
    let schema = RecordSchema::default();
    order_items()
        .into_iter()
        .filter_map(|item| schema.ingest(item))
        .collect()
}

pub fn orders_profile() -> Profile {
    orders::profile(RecordSchema::default(), "%b %-d, %Y", "%-m/%-d/%Y")
}

pub fn page(ids: &[i64], cursor: Value, total: usize) -> Page {
    Page::new(
        ids.iter()
            .map(|id| json!({"id": id, "order_number": id}))
            .collect(),
        Cursor::from_value(cursor),
        total,
    )
}

pub fn emails(records: &[&Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            r.get("email")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
