//! The report session: single owner of all editing and execution state.
//!
//! ```text
//!            ┌────────────── ReportSession ───────────────┐
//! Intent ───►│ Composition ─► rebuild ─► QueryModel        │
//!            │                              │              │
//!            │                   JoinPathResolver ◄──► ReportService
//!            │                              │              │
//! drill ────►│ DrillNavigator ─► filters    ▼              │
//!            │             ExecutionOrchestrator ─► ResultView
//!            └────────────────────────────────────────────┘
//! ```
//!
//! Every mutation goes through the session, which always rebuilds the model
//! and then re-checks join feasibility. Nothing else holds a reference to
//! the model, so no locking is involved.

mod debounce;
mod document;
mod error;

pub use debounce::{Debouncer, PendingInput};
pub use document::{DocumentError, ReportDocument, DOCUMENT_VERSION};
pub use error::{ReportError, ReportResult};

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::binning::{BinMode, BinParams, HistogramPreview};
use crate::builder::{rebuild, Composition, Intent, SyncReport};
use crate::cache::ReportCache;
use crate::catalog::{FieldCatalog, REPORT_PREFIX};
use crate::config::SessionSettings;
use crate::drill::DrillNavigator;
use crate::execute::{ExecutionOrchestrator, FilterSources, GateRefusal, ResultView};
use crate::join::{Evaluation, JoinCheckRequest, JoinPathResolver, JoinState, ReferencedSources};
use crate::query::{Filter, GroupMethod, Join, QueryModel, Scalar};
use crate::service::{
    DistinctValuesRequest, HeadersRequest, JoinPathRequest, JoinPathResponse, ReportService,
    ServiceError,
};

/// One report being edited and run.
pub struct ReportSession<S: ReportService> {
    service: Arc<S>,
    settings: SessionSettings,
    catalog: FieldCatalog,
    name: String,
    composition: Composition,
    model: QueryModel,
    last_sync: SyncReport,
    resolver: JoinPathResolver,
    navigator: DrillNavigator,
    orchestrator: ExecutionOrchestrator,
    debouncer: Debouncer,
    /// Header quick-filter text by field.
    quick_filters: BTreeMap<String, String>,
    /// Filter-panel selections by field.
    panel_selections: BTreeMap<String, Vec<Scalar>>,
    cache: Option<ReportCache>,
}

impl<S: ReportService> ReportSession<S> {
    /// A session with an empty, unnamed report.
    pub fn new(service: Arc<S>, catalog: FieldCatalog, settings: SessionSettings) -> Self {
        let debouncer = Debouncer::new(settings.debounce);
        let mut session = Self {
            service,
            settings,
            catalog,
            name: String::new(),
            composition: Composition::new(),
            model: QueryModel::new(),
            last_sync: SyncReport::default(),
            resolver: JoinPathResolver::new(),
            navigator: DrillNavigator::new(),
            orchestrator: ExecutionOrchestrator::new(),
            debouncer,
            quick_filters: BTreeMap::new(),
            panel_selections: BTreeMap::new(),
            cache: None,
        };
        session.start_new("");
        session
    }

    pub fn with_cache(mut self, cache: ReportCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Swap the derived-join heuristic.
    pub fn with_resolver(mut self, resolver: JoinPathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &QueryModel {
        &self.model
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn join_state(&self) -> &JoinState {
        self.resolver.state()
    }

    /// What the last rebuild dropped or adjusted.
    pub fn sync_report(&self) -> &SyncReport {
        &self.last_sync
    }

    pub fn view(&self) -> Option<&ResultView> {
        self.orchestrator.view()
    }

    /// Message of the last failed execution.
    pub fn last_error(&self) -> Option<&str> {
        self.orchestrator.last_error()
    }

    pub fn navigator(&self) -> &DrillNavigator {
        &self.navigator
    }

    pub fn is_drilling(&self) -> bool {
        self.navigator.is_active()
    }

    pub fn has_pending_input(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Discard everything and start an empty report.
    pub fn start_new(&mut self, name: impl Into<String>) {
        let composition = Composition {
            page_size: self.settings.default_page_size,
            ..Composition::default()
        };
        self.replace_state(name.into(), composition);
    }

    /// Replace the whole session state with a saved document.
    ///
    /// The returned request, if any, is the join check the loaded model
    /// needs; pass it to [`resolve_join_check`](Self::resolve_join_check).
    pub fn load(&mut self, document: ReportDocument) -> Option<JoinCheckRequest> {
        tracing::info!(name = %document.name, "loading report");
        self.replace_state(document.name, document.composition)
    }

    pub fn save(&self) -> ReportDocument {
        ReportDocument::new(self.name.clone(), self.composition.clone())
    }

    fn replace_state(&mut self, name: String, composition: Composition) -> Option<JoinCheckRequest> {
        self.name = name;
        self.composition = composition;
        self.navigator.clear();
        self.orchestrator.clear();
        self.debouncer.clear();
        self.quick_filters.clear();
        self.panel_selections.clear();
        self.resolver.reset();
        self.resync()
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Rebuild the model from the composition, then re-check joins.
    fn resync(&mut self) -> Option<JoinCheckRequest> {
        self.last_sync = rebuild(&self.composition, &self.catalog, &mut self.model);
        match self.resolver.evaluate(&self.model, &self.catalog) {
            Evaluation::Settled(_) => None,
            Evaluation::NeedsCatalog(request) => Some(request),
        }
    }

    /// Apply a discrete intent immediately, without dispatching the join
    /// check it may require.
    ///
    /// Any pending text edit is applied first so edits land in the order
    /// they were made.
    pub fn apply_now(&mut self, intent: Intent) -> ReportResult<Option<JoinCheckRequest>> {
        let mut request = None;
        if let Some(pending) = self.debouncer.take() {
            request = self.apply_input(pending)?;
        }
        Ok(self.apply_intent(intent)?.or(request))
    }

    fn apply_intent(&mut self, intent: Intent) -> ReportResult<Option<JoinCheckRequest>> {
        let intent = self.with_default_bins(intent);
        if let Intent::SetPageSize(size) = intent {
            if size > self.settings.max_page_size {
                return Err(crate::builder::BuilderError::InvalidPageSize {
                    size,
                    max: self.settings.max_page_size,
                }
                .into());
            }
        }
        self.composition.apply(intent)?;
        Ok(self.resync())
    }

    /// Switching a group to `bin` starts from the configured bin count.
    fn with_default_bins(&self, intent: Intent) -> Intent {
        match intent {
            Intent::SetGroupMethod {
                index,
                method: GroupMethod::Bin,
            } if self
                .composition
                .groups
                .get(index)
                .is_some_and(|g| g.params.is_none()) =>
            {
                Intent::SetBinParams {
                    index,
                    params: BinParams::new(BinMode::Auto {
                        bins: self.settings.default_bins,
                    }),
                }
            }
            other => other,
        }
    }

    fn apply_input(&mut self, input: PendingInput) -> ReportResult<Option<JoinCheckRequest>> {
        match input {
            PendingInput::Intent(intent) => self.apply_intent(intent),
            PendingInput::QuickFilter { field, text } => {
                if text.trim().is_empty() {
                    self.quick_filters.remove(&field);
                } else {
                    self.quick_filters.insert(field, text);
                }
                self.composition.page = 1;
                Ok(self.resync())
            }
        }
    }

    /// Apply an intent and settle join feasibility.
    ///
    /// Text intents are buffered for the debounce period instead; see
    /// [`flush_pending`](Self::flush_pending).
    pub async fn apply(&mut self, intent: Intent) -> ReportResult<()> {
        if intent.is_text_input() {
            return self.buffer(PendingInput::Intent(intent)).await;
        }
        let request = self.apply_now(intent)?;
        self.settle(request).await;
        Ok(())
    }

    /// Type into a header quick-filter box (debounced).
    pub async fn set_quick_filter(
        &mut self,
        field: impl Into<String>,
        text: impl Into<String>,
    ) -> ReportResult<()> {
        self.buffer(PendingInput::QuickFilter {
            field: field.into(),
            text: text.into(),
        })
        .await
    }

    async fn buffer(&mut self, input: PendingInput) -> ReportResult<()> {
        if let Some(released) = self.debouncer.push(input) {
            let request = self.apply_input(released)?;
            self.settle(request).await;
        }
        Ok(())
    }

    /// Wait out the quiet period and apply the pending text edit, if any.
    pub async fn flush_pending(&mut self) -> ReportResult<()> {
        let Some(deadline) = self.debouncer.deadline() else {
            return Ok(());
        };
        tokio::time::sleep_until(deadline).await;
        self.apply_due().await
    }

    /// Apply the pending text edit only if its quiet period is over.
    pub async fn apply_due(&mut self) -> ReportResult<()> {
        if let Some(input) = self.debouncer.take_due() {
            let request = self.apply_input(input)?;
            self.settle(request).await;
        }
        Ok(())
    }

    /// Apply a pending edit immediately, ignoring the quiet period.
    async fn apply_pending_now(&mut self) -> ReportResult<()> {
        if let Some(input) = self.debouncer.take() {
            let request = self.apply_input(input)?;
            self.settle(request).await;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Join feasibility
    // ------------------------------------------------------------------

    async fn settle(&mut self, request: Option<JoinCheckRequest>) {
        if let Some(request) = request {
            self.resolve_join_check(request).await;
        }
    }

    /// Ask the catalog and apply its answer. Returns `false` if the answer
    /// arrived for a superseded check and was discarded.
    pub async fn resolve_join_check(&mut self, request: JoinCheckRequest) -> bool {
        let result = self.service.check_join_path(&request.request).await;
        self.complete_join_check(request.token, result)
    }

    /// Apply a catalog answer obtained elsewhere.
    pub fn complete_join_check(
        &mut self,
        token: u64,
        result: Result<JoinPathResponse, ServiceError>,
    ) -> bool {
        match result {
            Ok(response) => self.resolver.apply_response(token, response),
            Err(err) => {
                tracing::warn!(error = %err, "join path check failed");
                self.resolver.apply_failure(token, err.to_string())
            }
        }
    }

    /// Manual joins the matcher proposes for derived sources lacking one.
    pub fn suggest_derived_joins(&self) -> Vec<Join> {
        self.resolver.suggest_derived_joins(&self.model, &self.catalog)
    }

    /// Add joins (typically accepted suggestions) with one rebuild and one
    /// join check at the end.
    pub async fn accept_joins(&mut self, joins: Vec<Join>) -> ReportResult<()> {
        if joins.is_empty() {
            return Ok(());
        }
        for join in joins {
            self.composition.apply(Intent::AddJoin(join))?;
        }
        let request = self.resync();
        self.settle(request).await;
        Ok(())
    }

    /// Let the catalog's foreign-key search connect the referenced base
    /// tables, and materialize whatever it proposes.
    pub async fn auto_join_base_tables(&mut self) -> ReportResult<Vec<Join>> {
        let connection_id = self.connection_id()?;
        let tables: Vec<String> = ReferencedSources::collect(&self.model, &self.catalog)
            .base
            .into_iter()
            .collect();
        if tables.len() < 2 {
            return Ok(Vec::new());
        }
        let response = self
            .service
            .auto_find_joins(&JoinPathRequest {
                connection_id,
                tables,
            })
            .await?;
        tracing::info!(joins = response.joins.len(), "auto-join proposals");
        self.accept_joins(response.joins.clone()).await?;
        Ok(response.joins)
    }

    fn connection_id(&self) -> ReportResult<String> {
        self.model
            .connection_id
            .clone()
            .ok_or(ReportError::Gated(GateRefusal::NoConnection))
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Register saved reports as derived sources, fetching their headers
    /// (concurrently, cache first).
    pub async fn attach_derived_sources(&mut self, report_ids: &[String]) -> ReportResult<()> {
        let connection_id = self.connection_id()?;

        let mut missing = Vec::new();
        for report_id in report_ids {
            let cached = match &self.cache {
                Some(cache) => cache.derived_headers(&connection_id, report_id)?,
                None => None,
            };
            match cached {
                Some(headers) => self.catalog.register_derived(report_id, &headers),
                None => missing.push(HeadersRequest {
                    connection_id: connection_id.clone(),
                    report_id: report_id.clone(),
                }),
            }
        }

        let service = &self.service;
        let responses = join_all(missing.iter().map(|req| service.derived_headers(req))).await;
        for (request, response) in missing.iter().zip(responses) {
            let headers = response?.headers;
            if let Some(cache) = &self.cache {
                cache.put_derived_headers(&connection_id, &request.report_id, &headers)?;
            }
            self.catalog.register_derived(&request.report_id, &headers);
        }

        let request = self.resync();
        self.settle(request).await;
        Ok(())
    }

    pub async fn detach_derived_source(&mut self, report_id: &str) {
        let report_id = report_id.strip_prefix(REPORT_PREFIX).unwrap_or(report_id);
        self.catalog.remove_derived(report_id);
        let request = self.resync();
        self.settle(request).await;
    }

    /// Distinct values for filter panels, cache first.
    pub async fn filter_values(
        &mut self,
        fields: &[String],
    ) -> ReportResult<BTreeMap<String, Vec<Scalar>>> {
        let connection_id = self.connection_id()?;
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for field in fields {
            let cached = match &self.cache {
                Some(cache) => cache.distinct_values(&connection_id, field)?,
                None => None,
            };
            match cached {
                Some(v) => {
                    values.insert(field.clone(), v);
                }
                None => missing.push(field.clone()),
            }
        }

        if !missing.is_empty() {
            let response = self
                .service
                .distinct_values(&DistinctValuesRequest {
                    connection_id: connection_id.clone(),
                    fields: missing,
                })
                .await?;
            for (field, distinct) in response.data {
                if let Some(cache) = &self.cache {
                    cache.put_distinct_values(&connection_id, &field, &distinct.values)?;
                }
                values.insert(field, distinct.values);
            }
        }
        Ok(values)
    }

    /// Select values in a filter panel; an empty selection clears it.
    pub fn set_panel_selection(&mut self, field: impl Into<String>, values: Vec<Scalar>) {
        let field = field.into();
        if values.is_empty() {
            self.panel_selections.remove(&field);
        } else {
            self.panel_selections.insert(field, values);
        }
        self.composition.page = 1;
        self.model.page = 1;
    }

    pub fn clear_panel_selections(&mut self) {
        self.panel_selections.clear();
    }

    fn quick_filter_list(&self) -> Vec<Filter> {
        self.quick_filters
            .iter()
            .map(|(field, text)| Filter::like(field, format!("%{}%", text.trim())))
            .collect()
    }

    fn panel_filter_list(&self) -> Vec<Filter> {
        self.panel_selections
            .iter()
            .map(|(field, values)| Filter::one_of(field, values.clone()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Binning preview
    // ------------------------------------------------------------------

    /// Preview the bins of group `index` over `sample` and persist the
    /// resulting edges on the group.
    pub fn preview_group(
        &mut self,
        index: usize,
        sample: &[Option<f64>],
    ) -> ReportResult<HistogramPreview> {
        let group = self
            .composition
            .groups
            .get(index)
            .ok_or(crate::builder::BuilderError::IndexOutOfRange {
                kind: "group",
                index,
                len: self.composition.groups.len(),
            })?;
        let params = match (&group.method, &group.params) {
            (GroupMethod::Bin, Some(params)) => params.clone(),
            _ => return Err(ReportError::NotBinned(index)),
        };

        let sample = &sample[..sample.len().min(self.settings.preview_sample_size)];
        let preview = HistogramPreview::build(sample, &params)?;

        // Persisting edges does not change join feasibility
        self.composition.apply(Intent::SetGroupBins {
            index,
            bins: preview.bins.clone(),
        })?;
        self.last_sync = rebuild(&self.composition, &self.catalog, &mut self.model);
        Ok(preview)
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Execute the current model. Pending text input is applied first.
    pub async fn run(&mut self) -> ReportResult<&ResultView> {
        self.apply_pending_now().await?;

        let quick = self.quick_filter_list();
        let panel = self.panel_filter_list();
        let sources = FilterSources {
            quick: &quick,
            panel: &panel,
        };
        let view = self
            .orchestrator
            .run(
                self.service.as_ref(),
                &mut self.model,
                sources,
                self.resolver.state(),
            )
            .await?;
        Ok(view)
    }

    pub async fn go_to_page(&mut self, page: u32) -> ReportResult<&ResultView> {
        if let Some(view) = self.view() {
            if let Some(total_pages) = view.total_pages() {
                view.page_in_range(page)
                    .ok_or(ReportError::PageOutOfRange { page, total_pages })?;
            }
        }
        let request = self.apply_now(Intent::SetPage(page))?;
        self.settle(request).await;
        self.run().await
    }

    pub async fn next_page(&mut self) -> ReportResult<&ResultView> {
        let view = self.view().ok_or(ReportError::NoResults)?;
        let page = view.next_page().ok_or(ReportError::PageOutOfRange {
            page: view.current_page() + 1,
            total_pages: view.total_pages().unwrap_or(1),
        })?;
        self.go_to_page(page).await
    }

    pub async fn previous_page(&mut self) -> ReportResult<&ResultView> {
        let view = self.view().ok_or(ReportError::NoResults)?;
        let page = view.previous_page().ok_or(ReportError::PageOutOfRange {
            page: 0,
            total_pages: view.total_pages().unwrap_or(1),
        })?;
        self.go_to_page(page).await
    }

    // ------------------------------------------------------------------
    // Drill-down
    // ------------------------------------------------------------------

    /// Narrow into a grouped value and re-execute.
    pub async fn drill_into(&mut self, field: &str, value: Scalar) -> ReportResult<&ResultView> {
        self.apply_pending_now().await?;
        self.navigator
            .enter(&self.model.groups, &mut self.composition.filters, field, value)?;
        self.composition.page = 1;
        let request = self.resync();
        self.settle(request).await;
        self.run().await
    }

    /// Leave the innermost drill level and re-execute.
    pub async fn drill_back(&mut self) -> ReportResult<&ResultView> {
        self.apply_pending_now().await?;
        self.navigator.back(&mut self.composition.filters)?;
        self.composition.page = 1;
        let request = self.resync();
        self.settle(request).await;
        self.run().await
    }
}
