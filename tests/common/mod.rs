//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use vantage::catalog::{DataType, FieldCatalog};
use vantage::join::{Relation, RelationGraph};
use vantage::query::{QueryModel, Scalar};
use vantage::service::{
    AutoJoinResponse, DistinctValues, DistinctValuesRequest, DistinctValuesResponse,
    ExecuteResponse, HeadersRequest, HeadersResponse, JoinPathRequest, JoinPathResponse,
    Pagination, ReportService, Row, ServiceError, ServiceResult,
};

pub const CONNECTION: &str = "warehouse";

/// orders, customers and products (related), plus an unrelated audit table.
pub fn sales_catalog() -> FieldCatalog {
    let mut catalog = FieldCatalog::new();
    catalog.register_table(
        "orders",
        [
            ("id", DataType::Integer),
            ("customer_id", DataType::Integer),
            ("product_id", DataType::Integer),
            ("total", DataType::Decimal),
            ("status", DataType::Text),
            ("placed_at", DataType::Timestamp),
        ],
    );
    catalog.register_table(
        "customers",
        [
            ("id", DataType::Integer),
            ("name", DataType::Text),
            ("region", DataType::Text),
        ],
    );
    catalog.register_table(
        "products",
        [("id", DataType::Integer), ("category", DataType::Text)],
    );
    catalog.register_table(
        "audit_log",
        [("id", DataType::Integer), ("action", DataType::Text)],
    );
    catalog
}

pub fn sales_relations() -> RelationGraph {
    RelationGraph::from_relations([
        Relation {
            from_column: "orders.customer_id".to_string(),
            to_column: "customers.id".to_string(),
        },
        Relation {
            from_column: "orders.product_id".to_string(),
            to_column: "products.id".to_string(),
        },
    ])
    .unwrap()
}

pub fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// `n` rows of `{ "orders.status": "s<i>", "orders.total": i }`.
pub fn rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| row(&[("orders.status", json!(format!("s{i}"))), ("orders.total", json!(i))]))
        .collect()
}

pub fn unpaged(n: usize) -> ExecuteResponse {
    ExecuteResponse {
        headers: vec!["orders.status".to_string(), "orders.total".to_string()],
        rows: rows(n),
        pagination: None,
        total_rows: None,
    }
}

pub fn paged(n: usize, current_page: u32, total_pages: u32) -> ExecuteResponse {
    ExecuteResponse {
        pagination: Some(Pagination {
            current_page,
            page_size: n as u32,
            total_pages,
        }),
        total_rows: Some(u64::from(total_pages) * n as u64),
        ..unpaged(n)
    }
}

/// In-memory service that records every call.
///
/// Join checks are answered from a relation graph. Execution answers come
/// from a queue, falling back to a fixed response when it runs dry.
pub struct RecordingService {
    graph: RelationGraph,
    executions: Mutex<VecDeque<ServiceResult<ExecuteResponse>>>,
    fallback: ExecuteResponse,
    headers: HashMap<String, Vec<String>>,
    distinct: BTreeMap<String, Vec<Scalar>>,
    join_check_error: Option<String>,
    pub executed: Mutex<Vec<QueryModel>>,
    pub join_checks: Mutex<Vec<JoinPathRequest>>,
    pub header_requests: Mutex<Vec<HeadersRequest>>,
    pub distinct_requests: Mutex<Vec<DistinctValuesRequest>>,
}

impl RecordingService {
    pub fn new(graph: RelationGraph) -> Self {
        Self {
            graph,
            executions: Mutex::new(VecDeque::new()),
            fallback: unpaged(3),
            headers: HashMap::new(),
            distinct: BTreeMap::new(),
            join_check_error: None,
            executed: Mutex::new(Vec::new()),
            join_checks: Mutex::new(Vec::new()),
            header_requests: Mutex::new(Vec::new()),
            distinct_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fallback(mut self, response: ExecuteResponse) -> Self {
        self.fallback = response;
        self
    }

    pub fn with_headers(mut self, report_id: &str, headers: &[&str]) -> Self {
        self.headers.insert(
            report_id.to_string(),
            headers.iter().map(|h| h.to_string()).collect(),
        );
        self
    }

    pub fn with_distinct(mut self, field: &str, values: Vec<Scalar>) -> Self {
        self.distinct.insert(field.to_string(), values);
        self
    }

    pub fn failing_join_checks(mut self, message: &str) -> Self {
        self.join_check_error = Some(message.to_string());
        self
    }

    pub fn push_execution(&self, result: ServiceResult<ExecuteResponse>) {
        self.executions.lock().unwrap().push_back(result);
    }

    pub fn execute_calls(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub fn join_check_calls(&self) -> usize {
        self.join_checks.lock().unwrap().len()
    }

    pub fn header_calls(&self) -> usize {
        self.header_requests.lock().unwrap().len()
    }

    pub fn distinct_calls(&self) -> usize {
        self.distinct_requests.lock().unwrap().len()
    }

    pub fn last_executed(&self) -> Option<QueryModel> {
        self.executed.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReportService for RecordingService {
    async fn execute(&self, model: &QueryModel) -> ServiceResult<ExecuteResponse> {
        self.executed.lock().unwrap().push(model.clone());
        let queued = self.executions.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn check_join_path(&self, request: &JoinPathRequest) -> ServiceResult<JoinPathResponse> {
        self.join_checks.lock().unwrap().push(request.clone());
        match &self.join_check_error {
            Some(message) => Err(ServiceError::Remote(message.clone())),
            None => Ok(self.graph.check(request)),
        }
    }

    async fn auto_find_joins(&self, request: &JoinPathRequest) -> ServiceResult<AutoJoinResponse> {
        Ok(self.graph.auto_find(request))
    }

    async fn distinct_values(
        &self,
        request: &DistinctValuesRequest,
    ) -> ServiceResult<DistinctValuesResponse> {
        self.distinct_requests.lock().unwrap().push(request.clone());
        let data = request
            .fields
            .iter()
            .filter_map(|f| {
                self.distinct.get(f).map(|values| {
                    (
                        f.clone(),
                        DistinctValues {
                            values: values.clone(),
                        },
                    )
                })
            })
            .collect();
        Ok(DistinctValuesResponse { data })
    }

    async fn derived_headers(&self, request: &HeadersRequest) -> ServiceResult<HeadersResponse> {
        self.header_requests.lock().unwrap().push(request.clone());
        match self.headers.get(&request.report_id) {
            Some(headers) => Ok(HeadersResponse {
                headers: headers.clone(),
            }),
            None => Err(ServiceError::Remote(format!(
                "report {} not found",
                request.report_id
            ))),
        }
    }
}
