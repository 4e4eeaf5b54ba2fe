//! Visual builder state and the model synchronizer.
//!
//! One-way flow: the builder emits [`Intent`]s, which edit the
//! [`Composition`]; every applied intent is followed by a wholesale
//! [`rebuild`] of the [`QueryModel`](crate::query::QueryModel) and then a
//! join-feasibility re-check, always in that order.
//!
//! ```text
//! Intent ──► Composition::apply ──► rebuild() ──► QueryModel ──► JoinPathResolver
//!                                       │
//!                                       └──► SyncReport (dropped / adjusted)
//! ```

mod composition;
mod error;
mod intent;
mod sync;

pub use composition::{Composition, MAX_PAGE_SIZE};
pub use error::{BuilderError, BuilderResult};
pub use intent::Intent;
pub use sync::{rebuild, Adjustment, DroppedReference, ElementKind, SyncReport};
