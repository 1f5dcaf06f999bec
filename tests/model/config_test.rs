use reportsmith::model::{
    CalculatedField, ColumnRef, JoinType, ReportConfig, SortOrder,
};
use serde_json::json;

fn wire_config() -> serde_json::Value {
    json!({
        "report_name": "Monthly sales",
        "db_defination": [
            {"primary_table": "Sales", "joined_table": "Customers", "join_type": "left",
             "source_field": "CustomerId", "target_field": "Id"}
        ],
        "report_columns": [{"table": "Sales", "field": "Amount"}],
        "body_sort_order": [{"field": "Amount", "order": "desc"}],
        "custom_calculated_fields": [
            {"field_name": "Margin", "label": "Gross margin", "formula": "Amount - Cost"}
        ],
        "group_by_fields": {
            "zeta": {"table": "Customers", "field": "Region", "display": [], "group_total": []},
            "alpha": {"table": "Sales", "field": "Channel"}
        },
        "summary_fields": ["Amount"],
        "filters": [{"field": "Sales.Amount", "op": ">", "value": 100}]
    })
}

#[test]
fn test_deserialize_full_config() {
    let config: ReportConfig = serde_json::from_value(wire_config()).unwrap();

    assert_eq!(config.db_defination[0].join_type, JoinType::Left);
    assert_eq!(config.report_columns, vec![ColumnRef::new("Sales", "Amount")]);
    assert_eq!(config.body_sort_order[0].order, SortOrder::Desc);
    assert_eq!(
        config.custom_calculated_fields,
        vec![CalculatedField::new("Margin", "Amount - Cost").with_label("Gross margin")]
    );
    assert_eq!(config.summary_fields, vec!["Amount"]);
    assert!(config.filters.is_array());
}

#[test]
fn test_group_order_is_insertion_order() {
    let config: ReportConfig = serde_json::from_value(wire_config()).unwrap();
    let names: Vec<&str> = config.group_by_fields.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert!(config.group_by_fields["alpha"].display.is_empty());
}

#[test]
fn test_unknown_keys_survive_roundtrip() {
    let config: ReportConfig = serde_json::from_value(wire_config()).unwrap();
    assert_eq!(config.extra.get("report_name"), Some(&json!("Monthly sales")));

    let forwarded = serde_json::to_value(&config).unwrap();
    assert_eq!(forwarded["report_name"], "Monthly sales");
    assert_eq!(forwarded["filters"], wire_config()["filters"]);
}

#[test]
fn test_missing_collections_default_to_empty() {
    let config: ReportConfig = serde_json::from_value(json!({})).unwrap();
    assert_eq!(config, ReportConfig::default());
    assert!(config.filters.is_null());
}

#[test]
fn test_partial_entries_deserialize() {
    let config: ReportConfig = serde_json::from_value(json!({
        "report_columns": [{"table": "Sales"}],
        "body_sort_order": [{"field": "Amount"}]
    }))
    .unwrap();
    assert_eq!(config.report_columns[0].key(), None);
    assert_eq!(config.body_sort_order[0].order, SortOrder::Asc);
}
