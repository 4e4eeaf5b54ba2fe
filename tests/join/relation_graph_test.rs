#[path = "../common/mod.rs"]
mod common;

use std::io::Write;

use common::{sales_relations, CONNECTION};
use vantage::join::{Relation, RelationGraph};
use vantage::query::Join;
use vantage::service::JoinPathRequest;

fn request(tables: &[&str]) -> JoinPathRequest {
    JoinPathRequest {
        connection_id: CONNECTION.to_string(),
        tables: tables.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn test_graph_shape() {
    let graph = sales_relations();
    assert_eq!(graph.table_count(), 3);
    assert_eq!(graph.relation_count(), 2);
}

#[test]
fn test_path_through_hub_table() {
    let graph = sales_relations();
    let path = graph.find_path("customers", "products").unwrap();

    assert_eq!(
        path,
        vec![
            Join::inner("orders.customer_id", "customers.id"),
            Join::inner("orders.product_id", "products.id"),
        ]
    );
}

#[test]
fn test_unknown_or_isolated_tables_have_no_path() {
    let graph = sales_relations();
    assert!(graph.find_path("orders", "audit_log").is_none());
    assert_eq!(graph.find_path("audit_log", "audit_log"), Some(Vec::new()));
}

#[test]
fn test_check_answers_like_catalog() {
    let graph = sales_relations();

    let connected = graph.check(&request(&["customers", "orders", "products"]));
    assert!(connected.path_exists);

    let disconnected = graph.check(&request(&["audit_log", "orders"]));
    assert!(!disconnected.path_exists);
    assert_eq!(
        disconnected.message,
        "no relation path between audit_log and orders"
    );
}

#[test]
fn test_auto_find_deduplicates_joins() {
    let graph = sales_relations();
    let response = graph.auto_find(&request(&["customers", "orders", "products"]));

    assert_eq!(
        response.joins,
        vec![
            Join::inner("orders.customer_id", "customers.id"),
            Join::inner("orders.product_id", "products.id"),
        ]
    );
    assert!(graph.auto_find(&request(&["orders", "audit_log"])).joins.is_empty());
}

#[test]
fn test_shortest_path_preferred() {
    let mut graph = sales_relations();
    graph
        .add_relation(Relation {
            from_column: "customers.favourite_product_id".to_string(),
            to_column: "products.id".to_string(),
        })
        .unwrap();

    let path = graph.find_path("customers", "products").unwrap();
    assert_eq!(
        path,
        vec![Join::inner("customers.favourite_product_id", "products.id")]
    );
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "relations": [
            {{ "fromColumn": "orders.customer_id", "toColumn": "customers.id" }}
        ] }}"#
    )
    .unwrap();

    let graph = RelationGraph::from_json_file(file.path()).unwrap();
    assert!(graph.path_exists(&["customers".to_string(), "orders".to_string()]));
}
