//! Execution orchestration.
//!
//! ```text
//! quick filters ─┐
//! panel filters ─┼─► merge ─► userFilters ─► gate ─► ReportService::execute
//! model.filters ─┘                                         │
//!                                    ok ◄──────────────────┤
//!                                    │                     └─► err: message verbatim,
//!                                    ▼                          prior view kept
//!                               ResultView ─► RenderedTable
//! ```

mod orchestrator;
mod render;
mod view;

pub use orchestrator::{
    gate, merge_filters, ExecuteError, ExecutionOrchestrator, FilterSources, GateRefusal,
};
pub use render::{format_cell, RenderedTable};
pub use view::{Paging, ResultView, EMPTY_MESSAGE};
