//! Gating, filter merging and the execute call.

use thiserror::Error;

use super::view::ResultView;
use crate::join::JoinState;
use crate::query::{Filter, QueryModel};
use crate::service::ReportService;

/// Why execution was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRefusal {
    #[error("select a connection first")]
    NoConnection,

    #[error("add at least one column or group")]
    NothingSelected,

    #[error("{0}")]
    JoinBlocked(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Gated(#[from] GateRefusal),

    /// The executor's message, verbatim.
    #[error("{0}")]
    Failed(String),
}

/// Filters contributed outside the model's own `filters`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterSources<'a> {
    /// Header quick-filters.
    pub quick: &'a [Filter],
    /// Interactive filter-panel selections.
    pub panel: &'a [Filter],
}

/// Quick filters, then panel selections, then the model's filters
/// (which carry any drill filters). Combined with AND.
pub fn merge_filters(sources: FilterSources<'_>, model_filters: &[Filter]) -> Vec<Filter> {
    sources
        .quick
        .iter()
        .chain(sources.panel)
        .chain(model_filters)
        .cloned()
        .collect()
}

/// Local checks that must pass before the executor is called.
pub fn gate(model: &QueryModel, join_state: &JoinState) -> Result<(), GateRefusal> {
    if model.connection_id.is_none() {
        return Err(GateRefusal::NoConnection);
    }
    if !model.has_selection() {
        return Err(GateRefusal::NothingSelected);
    }
    if let JoinState::Blocked(reason) = join_state {
        return Err(GateRefusal::JoinBlocked(reason.clone()));
    }
    Ok(())
}

/// Runs the model and holds the last successful result.
#[derive(Debug, Default)]
pub struct ExecutionOrchestrator {
    view: Option<ResultView>,
    last_error: Option<String>,
}

impl ExecutionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the last successful run.
    pub fn view(&self) -> Option<&ResultView> {
        self.view.as_ref()
    }

    /// Message of the last failed run, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear(&mut self) {
        self.view = None;
        self.last_error = None;
    }

    /// Gate, merge filters and execute.
    ///
    /// `model.user_filters` and the view are only written after the executor
    /// answers successfully; a failure leaves both as they were.
    pub async fn run<S>(
        &mut self,
        service: &S,
        model: &mut QueryModel,
        sources: FilterSources<'_>,
        join_state: &JoinState,
    ) -> Result<&ResultView, ExecuteError>
    where
        S: ReportService + ?Sized,
    {
        gate(model, join_state).inspect_err(|refusal| {
            tracing::debug!(%refusal, "execution gated");
        })?;

        let mut request = model.clone();
        request.user_filters = merge_filters(sources, &model.filters);

        tracing::info!(
            page = request.page,
            page_size = request.page_size,
            filters = request.user_filters.len(),
            "executing report"
        );

        match service.execute(&request).await {
            Ok(response) => {
                model.user_filters = request.user_filters;
                self.last_error = None;
                let view: &ResultView = self.view.insert(ResultView::from_response(response));
                Ok(view)
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "execution failed");
                self.last_error = Some(message.clone());
                Err(ExecuteError::Failed(message))
            }
        }
    }
}
