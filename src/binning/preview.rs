//! Live histogram preview over a cached sample.
//!
//! The preview is advisory: it runs the same parameter contract as the
//! executor's full-dataset binning, but over a small sample, so bin edges
//! and counts may differ from what the executor returns.

use super::compute::{compute_bins, BinSnapshot, BinStrategy};
use super::error::BinningResult;
use super::params::BinParams;

/// One bar of the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBar {
    pub label: String,
    pub count: usize,
}

/// Histogram preview of a sample under a parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPreview {
    pub bars: Vec<PreviewBar>,
    /// Separate null bucket, when requested and non-empty.
    pub null_bar: Option<PreviewBar>,
    pub sample_size: usize,
    pub outside: usize,
    pub strategy: BinStrategy,
    pub recommendation: BinStrategy,
    /// Edges behind the bars, for persisting on the group.
    pub bins: BinSnapshot,
}

impl HistogramPreview {
    /// Bin `sample` with `params` and collect the bars.
    pub fn build(sample: &[Option<f64>], params: &BinParams) -> BinningResult<Self> {
        let binning = compute_bins(sample, params)?;
        let bins = binning.snapshot();
        Ok(Self {
            bars: binning
                .bins
                .iter()
                .map(|b| PreviewBar {
                    label: b.label.clone(),
                    count: b.count,
                })
                .collect(),
            null_bar: binning.null_bucket.map(|n| PreviewBar {
                label: n.label,
                count: n.count,
            }),
            sample_size: sample.len(),
            outside: binning.outside,
            strategy: binning.strategy,
            recommendation: binning.recommendation,
            bins,
        })
    }

    fn all_bars(&self) -> impl Iterator<Item = &PreviewBar> {
        self.bars.iter().chain(self.null_bar.iter())
    }

    /// Text rendering: one line per bar, scaled so the tallest is `width` wide.
    pub fn render(&self, width: usize) -> String {
        let label_width = self.all_bars().map(|b| b.label.len()).max().unwrap_or(0);
        let max_count = self.all_bars().map(|b| b.count).max().unwrap_or(0);

        self.all_bars()
            .map(|bar| {
                let len = if max_count == 0 {
                    0
                } else {
                    bar.count * width / max_count
                };
                format!(
                    "{:<label_width$} | {} {}",
                    bar.label,
                    "#".repeat(len),
                    bar.count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
