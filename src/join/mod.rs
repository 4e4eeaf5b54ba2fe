//! Join feasibility.
//!
//! The resolver decides, after every rebuild, whether the sources a model
//! references can be combined in one query:
//!
//! ```text
//! sources(columns, filters) ──► < 2 sources ─────────────────────► Allowed
//!        │
//!        ├─► derived source without manual join ─────────────────► Blocked
//!        ├─► < 2 base tables, or manual joins connect all ───────► Allowed
//!        └─► ask catalog (token N) ──► Checking ──► Allowed | Blocked
//!                                         ▲
//!                    response token < N ──┘ discarded
//! ```
//!
//! Derived sources are never covered by relational discovery; a
//! [`DerivedJoinMatcher`] proposes manual joins for them instead.

mod graph;
mod matcher;
mod resolver;

pub use graph::{Relation, RelationError, RelationGraph, RelationsFile};
pub use matcher::{CandidateSource, CaseInsensitiveNameMatcher, DerivedJoinMatcher};
pub use resolver::{
    Evaluation, JoinCheckRequest, JoinPathResolver, JoinState, ReferencedSources,
    SUBREPORT_REQUIRES_MANUAL_JOIN,
};
