#[path = "../common/mod.rs"]
mod common;

use common::{sales_catalog, sales_relations, CONNECTION};
use vantage::catalog::DataType;
use vantage::join::{
    CandidateSource, DerivedJoinMatcher, Evaluation, JoinPathResolver, JoinState,
    SUBREPORT_REQUIRES_MANUAL_JOIN,
};
use vantage::query::{Column, Filter, Join, QueryModel};
use vantage::service::JoinPathResponse;

fn model(fields: &[&str]) -> QueryModel {
    let mut model = QueryModel::for_connection(CONNECTION);
    model.columns = fields.iter().map(|f| Column::new(*f)).collect();
    model
}

fn expect_check(resolver: &mut JoinPathResolver, model: &QueryModel) -> vantage::join::JoinCheckRequest {
    match resolver.evaluate(model, &sales_catalog()) {
        Evaluation::NeedsCatalog(request) => request,
        other => panic!("expected a catalog check, got {other:?}"),
    }
}

#[test]
fn test_single_source_settles_without_catalog() {
    let mut resolver = JoinPathResolver::new();
    let m = model(&["orders.total", "orders.status", "calc__margin"]);

    assert_eq!(resolver.evaluate(&m, &sales_catalog()), Evaluation::Settled(JoinState::Allowed));
    assert_eq!(resolver.state(), &JoinState::Allowed);
}

#[test]
fn test_filters_count_as_references() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["orders.total"]);
    m.filters.push(Filter::equals("customers.region", "EU"));

    let request = expect_check(&mut resolver, &m);
    assert_eq!(request.request.tables, vec!["customers", "orders"]);
    assert_eq!(request.request.connection_id, CONNECTION);
}

/// Northwind-style names that are not plain identifiers.
fn spaced_catalog() -> vantage::catalog::FieldCatalog {
    let mut catalog = sales_catalog();
    catalog.register_table(
        "Order Details",
        [("ProductID", DataType::Integer), ("UnitPrice", DataType::Decimal)],
    );
    catalog.register_table("order-items", [("qty", DataType::Integer)]);
    catalog
}

#[test]
fn test_non_identifier_tables_still_ask_catalog() {
    let mut resolver = JoinPathResolver::new();
    let m = model(&["Order Details.UnitPrice", "order-items.qty"]);

    match resolver.evaluate(&m, &spaced_catalog()) {
        Evaluation::NeedsCatalog(request) => {
            assert_eq!(request.request.tables, vec!["Order Details", "order-items"]);
        }
        other => panic!("expected a catalog check, got {other:?}"),
    }
}

#[test]
fn test_manual_join_between_spaced_tables_allowed() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["Order Details.UnitPrice", "products.category"]);
    m.joins.push(Join::inner("Order Details.ProductID", "products.id"));

    assert_eq!(
        resolver.evaluate(&m, &spaced_catalog()),
        Evaluation::Settled(JoinState::Allowed)
    );
}

#[test]
fn test_unrelated_tables_blocked_by_catalog() {
    let graph = sales_relations();
    let mut resolver = JoinPathResolver::new();
    let m = model(&["orders.total", "audit_log.action"]);

    let request = expect_check(&mut resolver, &m);
    assert!(resolver.apply_response(request.token, graph.check(&request.request)));

    assert!(resolver.state().is_blocked());
    assert!(resolver
        .state()
        .blocked_reason()
        .unwrap()
        .contains("audit_log"));
}

#[test]
fn test_related_tables_allowed_by_catalog() {
    let graph = sales_relations();
    let mut resolver = JoinPathResolver::new();
    let m = model(&["customers.name", "products.category", "orders.total"]);

    let request = expect_check(&mut resolver, &m);
    assert!(resolver.apply_response(request.token, graph.check(&request.request)));
    assert_eq!(resolver.state(), &JoinState::Allowed);
}

#[test]
fn test_derived_source_without_manual_join_blocked() {
    let mut resolver = JoinPathResolver::new();
    let m = model(&["report__7.Region", "orders.total"]);

    assert_eq!(
        resolver.evaluate(&m, &sales_catalog()),
        Evaluation::Settled(JoinState::Blocked(
            SUBREPORT_REQUIRES_MANUAL_JOIN.to_string()
        ))
    );
}

#[test]
fn test_derived_source_with_manual_join_allowed() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["report__7.Customer", "customers.name"]);
    m.joins.push(Join::inner("report__7.Customer", "customers.name"));

    assert_eq!(resolver.evaluate(&m, &sales_catalog()), Evaluation::Settled(JoinState::Allowed));
}

#[test]
fn test_derived_join_to_itself_does_not_count() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["report__7.Customer", "orders.total"]);
    m.joins.push(Join::inner("report__7.Customer", "report__7.Region"));

    assert!(resolver.evaluate(&m, &sales_catalog()) != Evaluation::Settled(JoinState::Allowed));
    assert!(resolver.state().is_blocked());
}

#[test]
fn test_derived_plus_two_bases_still_asks_catalog() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["report__7.Customer", "customers.name", "orders.total"]);
    m.joins.push(Join::inner("report__7.Customer", "customers.name"));

    let request = expect_check(&mut resolver, &m);
    assert_eq!(request.request.tables, vec!["customers", "orders"]);
}

#[test]
fn test_without_connection_allowed_locally() {
    let mut resolver = JoinPathResolver::new();
    let mut m = model(&["orders.total", "audit_log.action"]);
    m.connection_id = None;

    assert_eq!(resolver.evaluate(&m, &sales_catalog()), Evaluation::Settled(JoinState::Allowed));
}

#[test]
fn test_stale_response_discarded() {
    let mut resolver = JoinPathResolver::new();
    let m = model(&["orders.total", "customers.name"]);

    let first = expect_check(&mut resolver, &m);
    let second = expect_check(&mut resolver, &m);
    assert!(second.token > first.token);

    // The first answer arrives late and must not settle anything
    assert!(!resolver.apply_response(first.token, JoinPathResponse::disconnected("stale")));
    assert_eq!(
        resolver.state(),
        &JoinState::Checking {
            token: second.token
        }
    );

    assert!(resolver.apply_response(second.token, JoinPathResponse::connected()));
    assert_eq!(resolver.state(), &JoinState::Allowed);

    // Once settled, repeats of the same token are ignored too
    assert!(!resolver.apply_response(second.token, JoinPathResponse::disconnected("late")));
    assert_eq!(resolver.state(), &JoinState::Allowed);
}

#[test]
fn test_local_settlement_supersedes_pending_check() {
    let mut resolver = JoinPathResolver::new();
    let pending = expect_check(&mut resolver, &model(&["orders.total", "customers.name"]));

    resolver.evaluate(&model(&["orders.total"]), &sales_catalog());
    assert!(!resolver.apply_response(pending.token, JoinPathResponse::disconnected("gone")));
    assert_eq!(resolver.state(), &JoinState::Allowed);
}

#[test]
fn test_empty_disconnect_message_gets_default_reason() {
    let mut resolver = JoinPathResolver::new();
    let request = expect_check(&mut resolver, &model(&["orders.total", "customers.name"]));

    resolver.apply_response(
        request.token,
        JoinPathResponse {
            path_exists: false,
            message: String::new(),
        },
    );
    assert!(resolver.state().is_blocked());
    assert!(!resolver.state().blocked_reason().unwrap().is_empty());
}

#[test]
fn test_reset_invalidates_outstanding_tokens() {
    let mut resolver = JoinPathResolver::new();
    let request = expect_check(&mut resolver, &model(&["orders.total", "customers.name"]));

    resolver.reset();
    assert_eq!(resolver.state(), &JoinState::Allowed);
    assert!(!resolver.apply_failure(request.token, "too late"));
}

#[test]
fn test_suggests_joins_by_matching_names() {
    let mut catalog = sales_catalog();
    catalog.register_derived("7", &["Revenue".to_string(), "Region".to_string()]);
    let resolver = JoinPathResolver::new();
    let m = model(&["report__7.Revenue", "customers.name"]);

    assert_eq!(
        resolver.suggest_derived_joins(&m, &catalog),
        vec![Join::inner("report__7.Region", "customers.region")]
    );
}

#[test]
fn test_no_suggestion_once_joined() {
    let mut catalog = sales_catalog();
    catalog.register_derived("7", &["Region".to_string()]);
    let resolver = JoinPathResolver::new();
    let mut m = model(&["report__7.Region", "customers.name"]);
    m.joins.push(Join::inner("report__7.Region", "customers.region"));

    assert!(resolver.suggest_derived_joins(&m, &catalog).is_empty());
}

struct FirstColumnMatcher;

impl DerivedJoinMatcher for FirstColumnMatcher {
    fn propose(&self, derived: CandidateSource<'_>, table: CandidateSource<'_>) -> Option<Join> {
        let left = derived.columns.first()?;
        let right = table.columns.first()?;
        Some(Join::inner(
            format!("{}.{left}", derived.source),
            format!("{}.{right}", table.source),
        ))
    }
}

#[test]
fn test_custom_matcher() {
    let mut catalog = sales_catalog();
    catalog.register_derived("3", &["Anything".to_string()]);
    let resolver = JoinPathResolver::with_matcher(Box::new(FirstColumnMatcher));
    let m = model(&["report__3.Anything", "products.category"]);

    assert_eq!(
        resolver.suggest_derived_joins(&m, &catalog),
        vec![Join::inner("report__3.Anything", "products.id")]
    );
}
