#[path = "../common/mod.rs"]
mod common;

use common::{paged, row, sales_relations, unpaged, RecordingService, CONNECTION};
use serde_json::json;
use vantage::execute::{
    ExecuteError, ExecutionOrchestrator, FilterSources, GateRefusal, Paging, RenderedTable,
    EMPTY_MESSAGE,
};
use vantage::join::JoinState;
use vantage::query::{Column, Filter, Format, Group, QueryModel, Scalar};
use vantage::service::{ExecuteResponse, ServiceError};

fn model() -> QueryModel {
    let mut model = QueryModel::for_connection(CONNECTION);
    model.columns.push(Column::new("orders.status"));
    model.columns.push(Column::new("orders.total"));
    model
}

fn service() -> RecordingService {
    RecordingService::new(sales_relations())
}

#[tokio::test]
async fn test_gate_refuses_without_calling_executor() {
    let service = service();
    let mut orchestrator = ExecutionOrchestrator::new();

    let mut no_connection = model();
    no_connection.connection_id = None;
    let err = orchestrator
        .run(&service, &mut no_connection, FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap_err();
    assert_eq!(err, ExecuteError::Gated(GateRefusal::NoConnection));

    let mut empty = QueryModel::for_connection(CONNECTION);
    let err = orchestrator
        .run(&service, &mut empty, FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap_err();
    assert_eq!(err, ExecuteError::Gated(GateRefusal::NothingSelected));

    let blocked = JoinState::Blocked("no relation path between audit_log and orders".to_string());
    let err = orchestrator
        .run(&service, &mut model(), FilterSources::default(), &blocked)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExecuteError::Gated(GateRefusal::JoinBlocked(
            "no relation path between audit_log and orders".to_string()
        ))
    );

    assert_eq!(service.execute_calls(), 0);
    assert!(orchestrator.view().is_none());
}

#[tokio::test]
async fn test_groups_alone_are_a_selection() {
    let service = service();
    let mut orchestrator = ExecutionOrchestrator::new();
    let mut m = QueryModel::for_connection(CONNECTION);
    m.groups.push(Group::exact("orders.status"));

    orchestrator
        .run(&service, &mut m, FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();
    assert_eq!(service.execute_calls(), 1);
}

#[tokio::test]
async fn test_checking_state_does_not_gate() {
    let service = service();
    let mut orchestrator = ExecutionOrchestrator::new();

    orchestrator
        .run(
            &service,
            &mut model(),
            FilterSources::default(),
            &JoinState::Checking { token: 4 },
        )
        .await
        .unwrap();
    assert_eq!(service.execute_calls(), 1);
}

#[tokio::test]
async fn test_filters_merged_in_order() {
    let service = service();
    let mut orchestrator = ExecutionOrchestrator::new();
    let mut m = model();
    m.filters.push(Filter::equals("orders.status", "paid"));

    let quick = [Filter::like("customers.name", "%co%")];
    let panel = [Filter::one_of(
        "customers.region",
        vec![Scalar::from("EU"), Scalar::from("US")],
    )];
    orchestrator
        .run(
            &service,
            &mut m,
            FilterSources {
                quick: &quick,
                panel: &panel,
            },
            &JoinState::Allowed,
        )
        .await
        .unwrap();

    let sent = service.last_executed().unwrap();
    let expected = vec![quick[0].clone(), panel[0].clone(), m.filters[0].clone()];
    assert_eq!(sent.user_filters, expected);
    assert_eq!(m.user_filters, expected);
    // The model's own filters are untouched
    assert_eq!(m.filters, vec![Filter::equals("orders.status", "paid")]);
}

#[tokio::test]
async fn test_unpaged_response_shows_all_rows_without_controls() {
    let service = service().with_fallback(unpaged(15));
    let mut orchestrator = ExecutionOrchestrator::new();

    let view = orchestrator
        .run(&service, &mut model(), FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();

    assert_eq!(view.rows.len(), 15);
    assert_eq!(view.paging, Paging::Single);
    assert!(!view.has_page_controls());
    assert_eq!(view.current_page(), 1);
}

#[tokio::test]
async fn test_paged_response() {
    let service = service().with_fallback(paged(50, 2, 4));
    let mut orchestrator = ExecutionOrchestrator::new();

    let view = orchestrator
        .run(&service, &mut model(), FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();

    assert!(view.has_page_controls());
    assert_eq!(view.previous_page(), Some(1));
    assert_eq!(view.next_page(), Some(3));
    assert_eq!(view.total_rows, Some(200));
}

#[tokio::test]
async fn test_failure_keeps_previous_view_and_message_verbatim() {
    let service = service();
    let mut orchestrator = ExecutionOrchestrator::new();
    let mut m = model();

    service.push_execution(Ok(unpaged(2)));
    orchestrator
        .run(&service, &mut m, FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();
    let before = orchestrator.view().cloned().unwrap();
    let filters_before = m.user_filters.clone();

    service.push_execution(Err(ServiceError::Remote(
        "Invalid column name 'totl'.".to_string(),
    )));
    let quick = [Filter::like("orders.status", "%p%")];
    let err = orchestrator
        .run(
            &service,
            &mut m,
            FilterSources {
                quick: &quick,
                panel: &[],
            },
            &JoinState::Allowed,
        )
        .await
        .unwrap_err();

    assert_eq!(err, ExecuteError::Failed("Invalid column name 'totl'.".to_string()));
    assert_eq!(orchestrator.last_error(), Some("Invalid column name 'totl'."));
    assert_eq!(orchestrator.view(), Some(&before));
    assert_eq!(m.user_filters, filters_before);

    // The next success clears the error
    orchestrator
        .run(&service, &mut m, FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();
    assert!(orchestrator.last_error().is_none());
}

#[tokio::test]
async fn test_empty_result_renders_message() {
    let service = service().with_fallback(unpaged(0));
    let mut orchestrator = ExecutionOrchestrator::new();
    let m = model();

    let view = orchestrator
        .run(&service, &mut m.clone(), FilterSources::default(), &JoinState::Allowed)
        .await
        .unwrap();

    assert!(view.is_empty());
    assert_eq!(RenderedTable::build(view, &m).to_text(), EMPTY_MESSAGE);
}

#[test]
fn test_rendered_table_applies_formats_and_aliases() {
    let mut m = model();
    m.columns[1].alias = Some("Revenue".to_string());
    m.formats
        .insert("orders.total".to_string(), Format::currency("$", 2));

    let view = vantage::execute::ResultView::from_response(ExecuteResponse {
        headers: vec!["orders.status".to_string(), "Revenue".to_string()],
        rows: vec![
            row(&[("orders.status", json!("paid")), ("Revenue", json!(1234.5))]),
            row(&[("orders.status", json!("void")), ("Revenue", json!(-20))]),
        ],
        pagination: None,
        total_rows: None,
    });
    let table = RenderedTable::build(&view, &m);

    insta::assert_snapshot!(table.to_text(), @r"
    orders.status | Revenue
    --------------+----------
    paid          | $1,234.50
    void          | -$20.00
    ");
}
