use reportsmith::batch;
use reportsmith::model::{Schema, SemanticType};
use serde_json::json;

#[test]
fn test_schema_from_batch_records() {
    let raw = "--b_schema\n\
        {\"value\":[\
            {\"TableName\":\"Stock\",\"FieldName\":\"Item\",\"Label\":\"Item\",\"Type\":\"text\"},\
            {\"TableName\":\"Stock\",\"FieldName\":\"QtyAvailable\",\"Label\":\"Available\",\"Type\":\"number\"}\
        ]}\n\
        --b_schema\n\
        {\"value\":[\
            {\"TableName\":\"Prices\",\"FieldName\":\"Unit\",\"Type\":\"Currency\"},\
            {\"TableName\":\"Prices\",\"FieldName\":\"Markup\",\"Type\":\"percentage\"}\
        ]}\n\
        --b_schema--";

    let normalized = batch::normalize(raw).unwrap();
    assert_eq!(normalized.record_count, 2);

    let schema = Schema::from_records(&normalized.records);
    let tables: Vec<&str> = schema.table_names().collect();
    assert_eq!(tables, vec!["Stock", "Prices"]);

    let prices = schema.table("Prices").unwrap();
    let unit = prices.field("Unit").unwrap();
    assert_eq!(unit.label, "Unit");
    assert_eq!(unit.field_type, SemanticType::Currency);
    assert!(prices.field("Markup").unwrap().field_type.is_numeric());
}

#[test]
fn test_later_record_replaces_field_definition() {
    let records = vec![
        json!({"table": "Sales", "field": "Amount", "type": "number"}),
        json!({"table": "Sales", "field": "Amount", "type": "currency", "label": "Net amount"}),
    ];
    let schema = Schema::from_records(&records);
    let amount = schema.table("Sales").unwrap().field("Amount").unwrap();
    assert_eq!(amount.field_type, SemanticType::Currency);
    assert_eq!(amount.label, "Net amount");
    assert_eq!(schema.table("Sales").unwrap().len(), 1);
}

#[test]
fn test_unknown_type_is_preserved() {
    let records = vec![json!({"table": "Geo", "field": "Point", "type": "geography"})];
    let schema = Schema::from_records(&records);
    assert_eq!(
        schema.table("Geo").unwrap().field("Point").unwrap().field_type,
        SemanticType::Other("geography".to_string())
    );
}

#[test]
fn test_schema_serializes_as_nested_mapping() {
    let records = vec![json!({"table": "Sales", "field": "Amount", "type": "currency"})];
    let schema = Schema::from_records(&records);
    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({"Sales": {"Amount": {"label": "Amount", "type": "currency"}}})
    );
}

#[test]
fn test_empty_records_empty_schema() {
    let schema = Schema::from_records(&[]);
    assert!(schema.is_empty());
    assert_eq!(schema.table_names().count(), 0);
}
