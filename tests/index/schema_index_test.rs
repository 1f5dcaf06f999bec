use std::sync::Arc;

use reportsmith::index::{FieldOption, SchemaIndex, TableSource};
use reportsmith::model::{
    CalculatedField, FieldDef, JoinDefinition, ReportConfig, Schema, SemanticType, TableSchema,
    CALCULATED_TABLE,
};

fn sample_schema() -> Schema {
    Schema::new()
        .with_table(
            "Sales",
            TableSchema::new()
                .with_field("Region", FieldDef::new("Region", SemanticType::Text))
                .with_field("Qty", FieldDef::new("Quantity", SemanticType::Number))
                .with_field("Amount", FieldDef::new("Amount", SemanticType::Currency))
                .with_field("OrderDate", FieldDef::new("Order date", SemanticType::Date))
                .with_field("Discount", FieldDef::new("Discount", SemanticType::Percentage)),
        )
        .with_table(
            "Customers",
            TableSchema::new().with_field("Name", FieldDef::new("Name", SemanticType::Text)),
        )
        .with_table("Warehouses", TableSchema::new())
}

fn index() -> SchemaIndex {
    SchemaIndex::new(Arc::new(sample_schema()))
}

fn values(options: &[FieldOption]) -> Vec<&str> {
    options.iter().map(|o| o.value.as_str()).collect()
}

#[test]
fn test_list_tables_in_declaration_order() {
    assert_eq!(
        index().list_tables(),
        vec!["Sales", "Customers", "Warehouses"]
    );
}

#[test]
fn test_list_tables_excludes_pseudo_table() {
    let config = ReportConfig {
        custom_calculated_fields: vec![CalculatedField::new("Margin", "a - b")],
        ..Default::default()
    };
    let index = index();
    assert!(!index.list_tables().iter().any(|t| t == CALCULATED_TABLE));
    assert!(!index.list_fields(CALCULATED_TABLE, &config, None).is_empty());
}

#[test]
fn test_list_fields_unfiltered() {
    let options = index().list_fields("Sales", &ReportConfig::default(), None);
    assert_eq!(
        values(&options),
        vec!["Region", "Qty", "Amount", "OrderDate", "Discount"]
    );
    assert_eq!(options[1].label, "Quantity");
    assert_eq!(options[1].field_type, SemanticType::Number);
}

#[test]
fn test_numeric_filter_includes_currency_and_percentage() {
    let options = index().list_fields(
        "Sales",
        &ReportConfig::default(),
        Some(&SemanticType::Number),
    );
    assert_eq!(values(&options), vec!["Qty", "Amount", "Discount"]);
}

#[test]
fn test_other_filters_require_exact_match() {
    let config = ReportConfig::default();
    let index = index();

    let dates = index.list_fields("Sales", &config, Some(&SemanticType::Date));
    assert_eq!(values(&dates), vec!["OrderDate"]);

    let currency = index.list_fields("Sales", &config, Some(&SemanticType::Currency));
    assert_eq!(values(&currency), vec!["Amount"]);
}

#[test]
fn test_absent_table_is_empty() {
    let index = index();
    let config = ReportConfig::default();
    assert!(index.list_fields("Invoices", &config, None).is_empty());
    assert!(matches!(index.resolve("Invoices", &config), TableSource::Absent));
    assert!(index.list_fields("Warehouses", &config, None).is_empty());
}

#[test]
fn test_calculated_fields_from_config() {
    let config = ReportConfig {
        custom_calculated_fields: vec![
            CalculatedField::new("Margin", "Amount - Cost").with_label("Gross margin"),
            CalculatedField::new("", "orphan formula"),
            CalculatedField::new("Tax", "Amount * 0.2"),
        ],
        ..Default::default()
    };

    let options = index().list_fields(CALCULATED_TABLE, &config, None);
    assert_eq!(
        options,
        vec![
            FieldOption {
                value: "Margin".to_string(),
                label: "Gross margin".to_string(),
                field_type: SemanticType::Number,
            },
            FieldOption {
                value: "Tax".to_string(),
                label: "Tax".to_string(),
                field_type: SemanticType::Number,
            },
        ]
    );
}

#[test]
fn test_calculated_fields_respect_filter() {
    let config = ReportConfig {
        custom_calculated_fields: vec![CalculatedField::new("Margin", "a - b")],
        ..Default::default()
    };
    let index = index();
    assert_eq!(
        index
            .list_fields(CALCULATED_TABLE, &config, Some(&SemanticType::Number))
            .len(),
        1
    );
    assert!(index
        .list_fields(CALCULATED_TABLE, &config, Some(&SemanticType::Text))
        .is_empty());
}

#[test]
fn test_field_lookup() {
    let index = index();
    assert_eq!(
        index.field("Sales", "Amount").map(|f| &f.field_type),
        Some(&SemanticType::Currency)
    );
    assert!(index.field("Sales", "Missing").is_none());
    assert!(index.field("Missing", "Amount").is_none());
}

#[test]
fn test_body_tables() {
    let mut config = ReportConfig {
        db_defination: vec![JoinDefinition::new("Sales", "Customers")],
        ..Default::default()
    };
    let index = index();
    assert_eq!(index.body_tables(&config), vec!["Sales", "Customers"]);

    config
        .custom_calculated_fields
        .push(CalculatedField::new("Margin", "a - b"));
    assert_eq!(
        index.body_tables(&config),
        vec!["Sales", "Customers", CALCULATED_TABLE]
    );
}

#[test]
fn test_field_option_wire_shape() {
    let options = index().list_fields(
        "Customers",
        &ReportConfig::default(),
        None,
    );
    assert_eq!(
        serde_json::to_value(&options).unwrap(),
        serde_json::json!([{"value": "Name", "label": "Name", "type": "text"}])
    );
}
