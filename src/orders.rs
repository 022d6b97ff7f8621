//! Built-in profile for exploring orders.

use crate::columns::{ColumnCatalogue, ColumnSpec};
use crate::explorer::Profile;
use crate::field::{format_date, FieldRegistry, Purpose, Resolver};
use crate::filter::DiscreteFilter;
use crate::record::{value_to_text, Record, RecordSchema};
use serde_json::Value;

pub const DEFAULT_SMART_FIELD: &str = "order_number";

fn text(key: &'static str) -> impl Fn(&Record) -> String + Send + Sync + 'static {
    move |record| record.get(key).map(value_to_text).unwrap_or_default()
}

fn date(key: &'static str, date_format: String) -> impl Fn(&Record) -> String + Send + Sync {
    move |record| {
        record
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| format_date(raw, &date_format))
            .unwrap_or_default()
    }
}

fn total(record: &Record) -> String {
    let currency = record.get("currency").map(value_to_text).unwrap_or_default();
    let price = record.get("total_price").map(value_to_text).unwrap_or_default();
    if currency.is_empty() || price.is_empty() {
        String::new()
    } else {
        format!("{currency} {price}")
    }
}

fn item_count(record: &Record) -> String {
    match record.get("line_items") {
        Some(Value::Array(items)) => items.len().to_string(),
        _ => "0".to_string(),
    }
}

pub fn registry(search_date_format: &str) -> FieldRegistry {
    FieldRegistry::new()
        .with(
            "customer",
            Resolver::composite("customer", &["first_name", "last_name"]),
        )
        .with(
            "line_items",
            Resolver::collection("line_items", &["title", "name"]),
        )
        .with(
            "created_at",
            Resolver::temporal("created_at", search_date_format),
        )
        .with(
            "updated_at",
            Resolver::temporal("updated_at", search_date_format),
        )
}

pub fn catalogue(date_format: &str) -> ColumnCatalogue {
    let customer = Resolver::composite("customer", &["first_name", "last_name"]);
    ColumnCatalogue::new(vec![
        ColumnSpec::new("order_number", "Order #", text("order_number")),
        ColumnSpec::new("customer", "Customer", move |r| {
            customer.resolve(r, Purpose::Display).as_text()
        }),
        ColumnSpec::new("email", "Email", text("email")),
        ColumnSpec::new("phone", "Phone", text("phone")),
        ColumnSpec::new("total_price", "Total", total),
        ColumnSpec::new("financial_status", "Status", text("financial_status")),
        ColumnSpec::new("fulfillment_status", "Fulfillment", text("fulfillment_status")),
        ColumnSpec::new("line_items", "Items", item_count),
        ColumnSpec::new("created_at", "Created", date("created_at", date_format.to_string())),
        ColumnSpec::new("updated_at", "Updated", date("updated_at", date_format.to_string())),
    ])
}

pub fn filters() -> Vec<DiscreteFilter> {
    vec![
        DiscreteFilter::new("status", "Status", "financial_status"),
        DiscreteFilter::new("fulfillment", "Fulfillment", "fulfillment_status"),
    ]
}

/// Orders profile with the given column and search date formats.
pub fn profile(schema: RecordSchema, date_format: &str, search_date_format: &str) -> Profile {
    let catalogue = catalogue(date_format);
    let default_visible = catalogue.all_visible();
    Profile {
        schema,
        registry: registry(search_date_format),
        catalogue,
        filters: filters(),
        default_smart_field: DEFAULT_SMART_FIELD.to_string(),
        default_visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Record {
        RecordSchema::default()
            .ingest(json!({
                "id": 7,
                "order_number": 1007,
                "customer": {"first_name": "Ann", "last_name": "Lee"},
                "currency": "USD",
                "total_price": "19.90",
                "line_items": [{"title": "Mug"}, {"title": "Tea"}],
                "created_at": "2024-02-01T09:00:00Z"
            }))
            .unwrap()
    }

    fn cell(key: &str, record: &Record) -> String {
        catalogue("%b %-d, %Y").get(key).unwrap().render(record)
    }

    #[test]
    fn test_renders() {
        let r = order();
        assert_eq!(cell("order_number", &r), "1007");
        assert_eq!(cell("customer", &r), "Ann Lee");
        assert_eq!(cell("total_price", &r), "USD 19.90");
        assert_eq!(cell("line_items", &r), "2");
        assert_eq!(cell("created_at", &r), "Feb 1, 2024");
        assert_eq!(cell("updated_at", &r), "");
        assert_eq!(cell("email", &r), "");
    }

    #[test]
    fn test_missing_values_render_empty_or_zero() {
        let bare = RecordSchema::default().ingest(json!({"id": 1, "total_price": "5"})).unwrap();
        assert_eq!(cell("total_price", &bare), "");
        assert_eq!(cell("line_items", &bare), "0");
        assert_eq!(cell("customer", &bare), "");
    }

    #[test]
    fn test_catalogue_order_and_capabilities() {
        let cat = catalogue("%Y");
        let keys: Vec<_> = cat.keys().collect();
        assert_eq!(
            keys,
            vec![
                "order_number",
                "customer",
                "email",
                "phone",
                "total_price",
                "financial_status",
                "fulfillment_status",
                "line_items",
                "created_at",
                "updated_at"
            ]
        );
        assert!(cat.columns().iter().all(|c| c.searchable && !c.sortable));
    }

    #[test]
    fn test_registry_search_forms() {
        let registry = registry("%-m/%-d/%Y");
        let r = order();
        assert_eq!(
            registry.resolve("created_at", &r, Purpose::Search).as_text(),
            "2/1/2024"
        );
        assert!(registry
            .resolve("line_items", &r, Purpose::Search)
            .contains_lowercase("tea"));
        assert_eq!(
            registry.resolve("line_items", &r, Purpose::Display).as_text(),
            "2"
        );
    }
}
