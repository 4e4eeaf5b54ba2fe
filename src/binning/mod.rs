//! Grouping and binning engine.
//!
//! Translates a numeric field into group buckets and drives the live
//! histogram preview.
//!
//! ```text
//! sample ──► split nulls ──► exclude zeros? ──► cap outliers? ──► mode
//!                                                                   │
//!        auto ─ equal_width ─ quantiles ─ step ─ custom_edges ◄─────┘
//!                                   │
//!                                   ▼
//!                   edges + counts ──► labels ──► Binning
//!                                   │
//!                                   └──► BinSnapshot (persisted on the group)
//! ```
//!
//! The same [`BinParams`] are sent to the executor for the full dataset.
//! The local result is a preview only.

mod compute;
mod error;
mod label;
mod params;
mod preview;
pub mod stats;

pub use compute::{bin_index, compute_bins, Bin, BinSnapshot, BinStrategy, Binning, NullBucket};
pub use error::{BinningError, BinningResult};
pub use label::{bin_label, format_number, BRACKET_TEMPLATE, NULL_LABEL};
pub use params::{
    BinMode, BinParams, Interval, LabelStyle, NullHandling, DEFAULT_BINS, MAX_BINS,
    MAX_STEP_BINS, MIN_BINS,
};
pub use preview::{HistogramPreview, PreviewBar};
