//! ReportService over the executor worker.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::*;
use super::{ReportService, ServiceResult};
use crate::query::QueryModel;
use crate::worker::protocol::methods;
use crate::worker::WorkerClient;

/// [`ReportService`] backed by the executor process.
///
/// # Example
///
/// ```ignore
/// let client = WorkerClient::spawn_with_settings(&settings).await?;
/// let service = WorkerReportService::new(Arc::new(client));
/// let page = service.execute(&model).await?;
/// ```
pub struct WorkerReportService {
    client: Arc<WorkerClient>,
}

impl WorkerReportService {
    pub fn new(client: Arc<WorkerClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WorkerClient {
        &self.client
    }
}

#[async_trait]
impl ReportService for WorkerReportService {
    async fn execute(&self, model: &QueryModel) -> ServiceResult<ExecuteResponse> {
        Ok(self.client.call(methods::EXECUTE, model).await?)
    }

    async fn check_join_path(&self, request: &JoinPathRequest) -> ServiceResult<JoinPathResponse> {
        Ok(self.client.call(methods::CHECK_JOIN_PATH, request).await?)
    }

    async fn auto_find_joins(&self, request: &JoinPathRequest) -> ServiceResult<AutoJoinResponse> {
        Ok(self.client.call(methods::AUTO_FIND_JOINS, request).await?)
    }

    async fn distinct_values(
        &self,
        request: &DistinctValuesRequest,
    ) -> ServiceResult<DistinctValuesResponse> {
        Ok(self.client.call(methods::DISTINCT_VALUES, request).await?)
    }

    async fn derived_headers(&self, request: &HeadersRequest) -> ServiceResult<HeadersResponse> {
        Ok(self.client.call(methods::REPORT_HEADERS, request).await?)
    }
}
