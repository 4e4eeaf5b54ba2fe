//! # Vantage
//!
//! Query-configuration and execution-orchestration engine for ad-hoc
//! reporting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Intents (UI edits, saved documents)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [builder]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Composition ─► rebuild against FieldCatalog         │
//! │                  ─► QueryModel + SyncReport              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [join]
//! ┌─────────────────────────────────────────────────────────┐
//! │  JoinPathResolver: Allowed / Blocked / Checking{token}   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [execute]
//! ┌─────────────────────────────────────────────────────────┐
//! │   gate ─► merge filters ─► ReportService ─► ResultView   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [drill]
//! ┌─────────────────────────────────────────────────────────┐
//! │        DrillNavigator pushes/pops narrowing filters      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`session::ReportSession`] owns all of the above. The executor itself is
//! an external process reached through [`worker`]; [`binning`] computes
//! numeric bins locally for previews and drill-down.

pub mod binning;
pub mod builder;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod drill;
pub mod execute;
pub mod join;
pub mod logging;
pub mod query;
pub mod service;
pub mod session;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::binning::{BinMode, BinParams, BinSnapshot, HistogramPreview};
    pub use crate::builder::{rebuild, Composition, Intent, SyncReport};
    pub use crate::catalog::{DataType, Field, FieldCatalog};
    pub use crate::config::{SessionSettings, Settings};
    pub use crate::execute::{RenderedTable, ResultView};
    pub use crate::join::{JoinPathResolver, JoinState, RelationGraph};
    pub use crate::query::{
        Aggregation, Column, Filter, FilterOperator, Format, FormatType, Group, GroupMethod, Join,
        JoinType, QueryModel, Scalar, Sort,
    };
    pub use crate::service::{ReportService, WorkerReportService};
    pub use crate::session::{ReportDocument, ReportError, ReportSession};
}

pub use builder::{Composition, Intent};
pub use query::QueryModel;
pub use session::{ReportError, ReportResult, ReportSession};
