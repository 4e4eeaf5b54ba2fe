use std::io::Write;

use vantage::catalog::{DataType, FieldCatalog, FieldRef, FieldSource};

#[test]
fn test_register_table_classifies_numeric() {
    let mut catalog = FieldCatalog::new();
    catalog.register_table(
        "orders",
        [("total", DataType::Decimal), ("status", DataType::Text)],
    );

    let total = catalog.resolve("orders.total").unwrap();
    assert!(total.is_numeric);
    assert_eq!(total.name, "total");
    assert_eq!(
        total.source,
        FieldSource::Table {
            table: "orders".to_string()
        }
    );
    assert!(!catalog.resolve("orders.status").unwrap().is_numeric);
    assert!(catalog.resolve("orders.missing").is_none());
}

#[test]
fn test_register_derived_replaces_previous_headers() {
    let mut catalog = FieldCatalog::new();
    catalog.register_derived("42", &["Customer".to_string(), "Revenue".to_string()]);
    assert_eq!(catalog.derived_headers("42"), vec!["Customer", "Revenue"]);

    catalog.register_derived("42", &["Customer".to_string()]);
    assert_eq!(catalog.derived_headers("42"), vec!["Customer"]);
    assert!(!catalog.contains("report__42.Revenue"));

    let field = catalog.resolve("report__42.Customer").unwrap();
    assert_eq!(field.source_id().as_deref(), Some("report__42"));
    assert!(field.source.is_derived());
}

#[test]
fn test_remove_derived_only_touches_that_report() {
    let mut catalog = FieldCatalog::new();
    catalog.register_derived("1", &["A".to_string()]);
    catalog.register_derived("10", &["B".to_string()]);

    catalog.remove_derived("1");

    assert!(!catalog.contains("report__1.A"));
    assert!(catalog.contains("report__10.B"));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_table_columns_in_registration_order() {
    let mut catalog = FieldCatalog::new();
    catalog.register_table(
        "customers",
        [
            ("id", DataType::Integer),
            ("name", DataType::Text),
            ("region", DataType::Text),
        ],
    );
    catalog.register_table("orders", [("id", DataType::Integer)]);

    assert_eq!(catalog.table_columns("customers"), vec!["id", "name", "region"]);
    assert_eq!(catalog.table_columns("orders"), vec!["id"]);
    assert!(catalog.table_columns("nope").is_empty());
}

#[test]
fn test_field_ref_classification() {
    assert_eq!(
        FieldRef::parse("sales.orders.total"),
        Some(FieldRef::Base {
            table: "sales.orders".to_string(),
            column: "total".to_string()
        })
    );
    assert_eq!(
        FieldRef::parse("calc__margin"),
        Some(FieldRef::Calculated {
            name: "margin".to_string()
        })
    );
    assert_eq!(
        FieldRef::parse("report__7.Customer Name"),
        Some(FieldRef::Derived {
            report_id: "7".to_string(),
            column: "Customer Name".to_string()
        })
    );
    assert_eq!(FieldRef::parse("total"), None);
}

#[test]
fn test_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "tables": [
                {{ "name": "orders", "columns": [
                    {{ "name": "total", "type": "decimal(10,2)" }},
                    {{ "name": "placed_at", "type": "timestamp" }}
                ] }}
            ],
            "derived": [
                {{ "reportId": "9", "headers": ["Region", "Revenue"] }}
            ]
        }}"#
    )
    .unwrap();

    let catalog = FieldCatalog::from_json_file(file.path()).unwrap();

    assert_eq!(catalog.len(), 4);
    assert_eq!(
        catalog.resolve("orders.total").unwrap().declared_type,
        DataType::Decimal
    );
    assert!(catalog.resolve("orders.placed_at").unwrap().is_temporal());
    assert_eq!(catalog.derived_headers("9"), vec!["Region", "Revenue"]);
}

#[test]
fn test_from_json_file_missing() {
    assert!(FieldCatalog::from_json_file("/definitely/not/here.json").is_err());
}
