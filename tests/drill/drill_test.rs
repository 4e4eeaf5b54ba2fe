use vantage::binning::{BinMode, BinParams, BinSnapshot, Interval};
use vantage::drill::{DrillError, DrillNavigator};
use vantage::query::{Filter, Group, GroupMethod, Scalar};

fn groups() -> Vec<Group> {
    let params = BinParams::new(BinMode::CustomEdges {
        edges: vec![0.0, 10.0, 20.0, 30.0, 40.0],
    });
    vec![
        Group::exact("customers.region"),
        Group::with_method("orders.placed_at", GroupMethod::Month),
        Group::binned("orders.total", params).with_bins(BinSnapshot {
            edges: vec![0.0, 10.0, 20.0, 30.0, 40.0],
            sequence: vec![0, 1, 2, 3],
        }),
    ]
}

#[test]
fn test_bin_label_drills_into_between() {
    let groups = groups();
    let original = vec![Filter::equals("orders.status", "paid")];
    let mut filters = original.clone();
    let mut nav = DrillNavigator::new();

    nav.enter(&groups, &mut filters, "orders.total", Scalar::from("[20, 30)"))
        .unwrap();

    assert_eq!(filters.len(), 2);
    assert_eq!(filters[1], Filter::between("orders.total", 20.0, 30.0));

    let level = nav.back(&mut filters).unwrap();
    assert_eq!(level.field, "orders.total");
    assert_eq!(filters, original);
}

#[test]
fn test_exact_group_drills_into_equality() {
    let groups = groups();
    let mut filters = Vec::new();
    let mut nav = DrillNavigator::new();

    nav.enter(&groups, &mut filters, "customers.region", Scalar::from("EU"))
        .unwrap();
    assert_eq!(filters, vec![Filter::equals("customers.region", "EU")]);

    // Date-part groups also narrow on the raw value
    nav.enter(
        &groups,
        &mut filters,
        "orders.placed_at",
        Scalar::from("2024-03"),
    )
    .unwrap();
    assert_eq!(filters[1], Filter::equals("orders.placed_at", "2024-03"));
}

#[test]
fn test_n_enters_then_n_backs_restore_filters() {
    let groups = groups();
    let original = vec![
        Filter::equals("orders.status", "paid"),
        Filter::like("customers.name", "%co%"),
    ];
    let mut filters = original.clone();
    let mut nav = DrillNavigator::new();

    nav.enter(&groups, &mut filters, "customers.region", Scalar::from("EU"))
        .unwrap();
    nav.enter(&groups, &mut filters, "orders.total", Scalar::from("[0, 10)"))
        .unwrap();
    nav.enter(
        &groups,
        &mut filters,
        "orders.placed_at",
        Scalar::from("2024-01"),
    )
    .unwrap();
    assert_eq!(nav.depth(), 3);
    assert_eq!(filters.len(), 5);

    let snapshots: Vec<usize> = nav
        .levels()
        .iter()
        .map(|l| l.previous_filters.len())
        .collect();
    assert_eq!(snapshots, vec![2, 3, 4]);

    for _ in 0..3 {
        nav.back(&mut filters).unwrap();
    }
    assert_eq!(filters, original);
    assert!(!nav.is_active());
}

#[test]
fn test_back_discards_edits_made_while_drilled() {
    let groups = groups();
    let mut filters = vec![Filter::equals("orders.status", "paid")];
    let mut nav = DrillNavigator::new();

    nav.enter(&groups, &mut filters, "customers.region", Scalar::from("EU"))
        .unwrap();
    filters.push(Filter::equals("products.category", "toys"));

    nav.back(&mut filters).unwrap();
    assert_eq!(filters, vec![Filter::equals("orders.status", "paid")]);
}

#[test]
fn test_unknown_label_changes_nothing() {
    let groups = groups();
    let mut filters = Vec::new();
    let mut nav = DrillNavigator::new();

    let err = nav
        .enter(&groups, &mut filters, "orders.total", Scalar::from("[5, 15)"))
        .unwrap_err();

    assert_eq!(
        err,
        DrillError::NoMatchingBin {
            field: "orders.total".to_string(),
            label: "[5, 15)".to_string()
        }
    );
    assert!(filters.is_empty());
    assert_eq!(nav.depth(), 0);
}

#[test]
fn test_label_must_match_interval_style() {
    let params = BinParams::new(BinMode::CustomEdges {
        edges: vec![0.0, 10.0, 20.0],
    })
    .with_interval(Interval::OpenClosed);
    let groups = vec![Group::binned("orders.total", params).with_bins(BinSnapshot {
        edges: vec![0.0, 10.0, 20.0],
        sequence: vec![0, 1],
    })];
    let mut filters = Vec::new();
    let mut nav = DrillNavigator::new();

    assert!(nav
        .enter(&groups, &mut filters, "orders.total", Scalar::from("[10, 20)"))
        .is_err());
    nav.enter(&groups, &mut filters, "orders.total", Scalar::from("(10, 20]"))
        .unwrap();
    assert_eq!(filters, vec![Filter::between("orders.total", 10.0, 20.0)]);
}

#[test]
fn test_bin_group_without_edges() {
    let groups = vec![Group::binned("orders.total", BinParams::default())];
    let mut filters = Vec::new();
    let mut nav = DrillNavigator::new();

    assert_eq!(
        nav.enter(&groups, &mut filters, "orders.total", Scalar::from("[0, 10)"))
            .unwrap_err(),
        DrillError::MissingBins("orders.total".to_string())
    );
}

#[test]
fn test_ungrouped_field_rejected() {
    let mut filters = Vec::new();
    let mut nav = DrillNavigator::new();

    assert_eq!(
        nav.enter(&groups(), &mut filters, "orders.status", Scalar::from("paid"))
            .unwrap_err(),
        DrillError::NoSuchGroup("orders.status".to_string())
    );
    assert_eq!(nav.back(&mut filters).unwrap_err(), DrillError::EmptyStack);
}
