use vantage::binning::{BinMode, BinParams, BinSnapshot};
use vantage::builder::Composition;
use vantage::query::{
    Aggregation, Column, Filter, FilterOperator, FilterValue, Format, Group, GroupMethod, Join,
    Scalar, Sort,
};
use vantage::session::{DocumentError, ReportDocument, DOCUMENT_VERSION};

fn composition() -> Composition {
    let mut composition = Composition::new();
    composition.connection_id = Some("warehouse".to_string());
    composition
        .columns
        .push(Column::aggregated("orders.total", Aggregation::Sum).with_alias("Revenue"));
    composition.columns.push(Column::new("customers.region"));
    composition
        .filters
        .push(Filter::between("orders.total", 10.0, 500.0));
    composition.groups.push(Group::exact("customers.region"));
    composition.groups.push(
        Group::binned(
            "orders.total",
            BinParams::new(BinMode::Quantiles { bins: 4 }).with_k_format(),
        )
        .with_bins(BinSnapshot {
            edges: vec![0.0, 120.0, 480.0, 900.0, 2_000.0],
            sequence: vec![0, 1, 2, 3],
        }),
    );
    composition.sorts.push(Sort::desc("orders.total"));
    composition
        .joins
        .push(Join::inner("orders.customer_id", "customers.id"));
    composition
        .formats
        .insert("orders.total".to_string(), Format::currency("$", 0));
    composition.page_size = 25;
    composition
}

#[test]
fn test_round_trip() {
    let document = ReportDocument::new("Revenue by region", composition());
    let json = document.to_json().unwrap();
    let loaded = ReportDocument::from_json(&json).unwrap();

    assert_eq!(loaded, document);
    assert_eq!(loaded.version, DOCUMENT_VERSION);
}

#[test]
fn test_wire_shape_is_camel_case() {
    let json = ReportDocument::new("r", composition()).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let composition = &value["composition"];

    assert_eq!(composition["connectionId"], "warehouse");
    assert_eq!(composition["pageSize"], 25);
    assert_eq!(composition["columns"][0]["aggregation"], "SUM");
    assert_eq!(composition["filters"][0]["operator"], "BETWEEN");
    assert_eq!(composition["groups"][1]["method"], "bin");
    assert_eq!(composition["groups"][1]["params"]["mode"], "quantiles");
    assert_eq!(composition["groups"][1]["params"]["kFormat"], true);
    assert_eq!(composition["joins"][0]["leftColumn"], "orders.customer_id");
    assert_eq!(composition["joins"][0]["type"], "INNER");
}

#[test]
fn test_hand_written_document_uses_defaults() {
    let json = r#"{
        "name": "Paid orders",
        "composition": {
            "connectionId": "warehouse",
            "columns": [{ "field": "orders.status" }],
            "filters": [{ "field": "orders.status", "operator": "IN", "value": ["paid", "shipped"] }],
            "groups": [{ "field": "orders.placed_at", "method": "month" }]
        }
    }"#;
    let document = ReportDocument::from_json(json).unwrap();
    let composition = &document.composition;

    assert_eq!(document.version, DOCUMENT_VERSION);
    assert_eq!(composition.columns[0].aggregation, Aggregation::None);
    assert_eq!(composition.filters[0].operator, FilterOperator::In);
    assert_eq!(
        composition.filters[0].value,
        FilterValue::List(vec![Scalar::from("paid"), Scalar::from("shipped")])
    );
    assert_eq!(composition.groups[0].method, GroupMethod::Month);
    assert_eq!(composition.page, 1);
    assert_eq!(composition.page_size, 50);
}

#[test]
fn test_newer_version_rejected() {
    let json = r#"{ "version": 2, "name": "future", "composition": {} }"#;
    assert!(matches!(
        ReportDocument::from_json(json),
        Err(DocumentError::UnsupportedVersion { found: 2 })
    ));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revenue.report.json");
    let document = ReportDocument::new("Revenue", composition());

    document.write_file(&path).unwrap();
    assert_eq!(ReportDocument::from_file(&path).unwrap(), document);
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        ReportDocument::from_file("/no/such/report.json"),
        Err(DocumentError::Io(_))
    ));
}
