use reportsmith::graph::{connected_tables, RelationshipGraph};
use reportsmith::model::{JoinDefinition, JoinType, ReportConfig};

fn config(joins: Vec<JoinDefinition>) -> ReportConfig {
    ReportConfig {
        db_defination: joins,
        ..Default::default()
    }
}

#[test]
fn test_chain_yields_exactly_connected_tables() {
    let cfg = config(vec![
        JoinDefinition::new("A", "B"),
        JoinDefinition::new("B", "C"),
    ]);
    let tables = connected_tables(&cfg);
    assert_eq!(tables.len(), 3);
    assert!(tables.contains("A") && tables.contains("B") && tables.contains("C"));
    assert!(!tables.contains("D"));
}

#[test]
fn test_no_joins_no_tables() {
    assert!(connected_tables(&ReportConfig::default()).is_empty());
    let graph = RelationshipGraph::build(&ReportConfig::default());
    assert_eq!(graph.table_count(), 0);
    assert_eq!(graph.component_count(), 0);
}

#[test]
fn test_order_is_first_seen() {
    let cfg = config(vec![
        JoinDefinition::new("Orders", "Customers"),
        JoinDefinition::new("Lines", "Orders"),
        JoinDefinition::new("Lines", "Items"),
    ]);
    let tables: Vec<String> = connected_tables(&cfg).into_iter().collect();
    assert_eq!(tables, vec!["Orders", "Customers", "Lines", "Items"]);

    let graph = RelationshipGraph::build(&cfg);
    let from_graph: Vec<&str> = graph.tables().collect();
    assert_eq!(from_graph, vec!["Orders", "Customers", "Lines", "Items"]);
}

#[test]
fn test_empty_sides_are_ignored() {
    let cfg = config(vec![
        JoinDefinition::new("", "B"),
        JoinDefinition::new("", ""),
        JoinDefinition::new("C", ""),
    ]);
    let tables: Vec<String> = connected_tables(&cfg).into_iter().collect();
    assert_eq!(tables, vec!["B", "C"]);

    let graph = RelationshipGraph::build(&cfg);
    assert!(graph.neighbors("B").is_empty());
    assert_eq!(graph.component_count(), 2);
}

#[test]
fn test_neighbors_and_joins_between() {
    let cfg = config(vec![
        JoinDefinition::new("Sales", "Customers").on("CustomerId", "Id"),
        JoinDefinition::new("Sales", "Items")
            .on("ItemId", "Id")
            .with_type(JoinType::Left),
        JoinDefinition::new("Customers", "Sales")
            .on("Id", "BillToId")
            .with_type(JoinType::Right),
    ]);
    let graph = RelationshipGraph::build(&cfg);

    assert_eq!(graph.neighbors("Sales"), vec!["Customers", "Items"]);
    assert_eq!(graph.neighbors("Items"), vec!["Sales"]);
    assert!(graph.neighbors("Nowhere").is_empty());

    let joins = graph.joins_between("Customers", "Sales");
    assert_eq!(joins.len(), 2);
    assert!(joins.iter().any(|j| j.join_type == JoinType::Right));

    let item_join = graph.joins_between("Items", "Sales");
    assert_eq!(item_join.len(), 1);
    assert_eq!(item_join[0].source_field, "ItemId");
    assert_eq!(item_join[0].join_type, JoinType::Left);

    assert!(graph.contains("Items"));
    assert!(!graph.contains("Warehouses"));
    assert_eq!(graph.component_count(), 1);
}

#[test]
fn test_wire_join_types() {
    let cfg: ReportConfig = serde_json::from_value(serde_json::json!({
        "db_defination": [
            {"primary_table": "A", "joined_table": "B", "join_type": "inner"},
            {"primary_table": "B", "joined_table": "C", "join_type": "LEFT"},
            {"primary_table": "C", "joined_table": "D"}
        ]
    }))
    .unwrap();

    assert_eq!(cfg.db_defination[1].join_type, JoinType::Left);
    assert_eq!(cfg.db_defination[2].join_type, JoinType::Inner);
    assert_eq!(connected_tables(&cfg).len(), 4);
}
