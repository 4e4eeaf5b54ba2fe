//! Bin edge computation and counting.

use serde::{Deserialize, Serialize};

use super::error::{BinningError, BinningResult};
use super::label::{bin_label, NULL_LABEL};
use super::params::{BinMode, BinParams, Interval, LabelStyle, NullHandling, MAX_STEP_BINS};
use super::stats::{cap_outliers, sorted_finite, Summary};

/// The concrete strategy that produced a set of bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinStrategy {
    EqualWidth,
    Quantiles,
    Step,
    CustomEdges,
}

/// One computed bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    /// Position in the edge list (bin spans `edges[index]..edges[index + 1]`).
    pub index: usize,
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
    pub label: String,
}

/// Persisted group metadata: computed edges plus the sequence indices of
/// the bins, enough to regenerate labels and map a label back to its range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinSnapshot {
    pub edges: Vec<f64>,
    pub sequence: Vec<usize>,
}

impl BinSnapshot {
    /// `(index, lo, hi)` for every recorded bin with valid edges.
    pub fn ranges(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.sequence.iter().filter_map(|&i| {
            let lo = *self.edges.get(i)?;
            let hi = *self.edges.get(i + 1)?;
            Some((i, lo, hi))
        })
    }

    /// Find the bin whose regenerated label equals `label`.
    pub fn find_by_label(&self, label: &str, style: &LabelStyle) -> Option<(f64, f64)> {
        self.ranges()
            .find(|&(i, lo, hi)| bin_label(lo, hi, i + 1, style) == label)
            .map(|(_, lo, hi)| (lo, hi))
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Result of binning a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    pub strategy: BinStrategy,
    pub bins: Vec<Bin>,
    /// Nulls seen in the sample (whether or not they got a bucket).
    pub null_count: usize,
    /// Present only with [`NullHandling::SeparateBucket`] and at least one null.
    pub null_bucket: Option<NullBucket>,
    /// Non-null values that fell outside every bin (custom edges / explicit range).
    pub outside: usize,
    /// What `auto` would pick for this sample.
    pub recommendation: BinStrategy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullBucket {
    pub count: usize,
    pub label: String,
}

impl Binning {
    /// Boundaries `e0 < e1 < ... < en` shared by consecutive bins.
    pub fn edges(&self) -> Vec<f64> {
        let mut edges: Vec<f64> = self.bins.iter().map(|b| b.lo).collect();
        if let Some(last) = self.bins.last() {
            edges.push(last.hi);
        }
        edges
    }

    pub fn snapshot(&self) -> BinSnapshot {
        BinSnapshot {
            edges: self.edges(),
            sequence: self.bins.iter().map(|b| b.index).collect(),
        }
    }

    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum::<usize>()
            + self.null_bucket.as_ref().map_or(0, |n| n.count)
    }
}

/// Bin a sample.
///
/// Nulls are split off first, then zeros are dropped (`exclude_zeros`),
/// then outliers are clamped to the Tukey fences (`cap_outliers`), then the
/// mode derives edges and every remaining value is counted.
pub fn compute_bins(sample: &[Option<f64>], params: &BinParams) -> BinningResult<Binning> {
    params.validate()?;

    let null_count = sample.iter().filter(|v| v.is_none()).count();
    let mut values = sorted_finite(sample.iter().flatten().copied());
    if params.exclude_zeros {
        values.retain(|v| *v != 0.0);
    }
    if params.cap_outliers {
        values = cap_outliers(&values);
    }

    let summary = Summary::from_sorted(&values);
    let recommendation = match summary {
        Some(s) if s.is_skewed() => BinStrategy::Quantiles,
        _ => BinStrategy::EqualWidth,
    };

    let (strategy, edges, counts) = match &params.mode {
        BinMode::Auto { bins } => match recommendation {
            BinStrategy::Quantiles => quantile_bins(&values, *bins),
            _ => width_bins(&values, equal_width_edges(summary, None, None, *bins)?, params.interval),
        },
        BinMode::EqualWidth { bins, from, to } => width_bins(
            &values,
            equal_width_edges(summary, *from, *to, *bins)?,
            params.interval,
        ),
        BinMode::Quantiles { bins } => quantile_bins(&values, *bins),
        BinMode::Step { width } => (
            BinStrategy::Step,
            step_edges(summary, *width)?,
            Vec::new(),
        ),
        BinMode::CustomEdges { edges } => (BinStrategy::CustomEdges, edges.clone(), Vec::new()),
    };

    // Step and custom edges are counted here; the others already counted.
    let counts = if counts.is_empty() && edges.len() >= 2 {
        count_into(&values, &edges, params.interval)
    } else {
        counts
    };

    let style = params.label_style();
    let bins: Vec<Bin> = edges
        .windows(2)
        .zip(counts.iter())
        .enumerate()
        .map(|(index, (w, &count))| Bin {
            index,
            lo: w[0],
            hi: w[1],
            count,
            label: bin_label(w[0], w[1], index + 1, &style),
        })
        .collect();

    let binned: usize = bins.iter().map(|b| b.count).sum();
    let outside = values.len() - binned;

    let null_bucket = (params.nulls == NullHandling::SeparateBucket && null_count > 0).then(|| {
        NullBucket {
            count: null_count,
            label: NULL_LABEL.to_string(),
        }
    });

    tracing::debug!(
        ?strategy,
        bins = bins.len(),
        nulls = null_count,
        outside,
        "computed bins"
    );

    Ok(Binning {
        strategy,
        bins,
        null_count,
        null_bucket,
        outside,
        recommendation,
    })
}

/// Edges for `bins` equal-width intervals. The last edge is exactly `to`.
fn equal_width_edges(
    summary: Option<Summary>,
    from: Option<f64>,
    to: Option<f64>,
    bins: usize,
) -> BinningResult<Vec<f64>> {
    let lo = from.or(summary.map(|s| s.min));
    let hi = to.or(summary.map(|s| s.max));
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return Ok(Vec::new());
    };
    if hi < lo {
        return Err(BinningError::InvalidRange { from: lo, to: hi });
    }
    if hi == lo {
        return Ok(vec![lo, hi]);
    }
    let width = (hi - lo) / bins as f64;
    Ok((0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect())
}

/// Edges every `width` from the minimum; the final edge is the maximum.
fn step_edges(summary: Option<Summary>, width: f64) -> BinningResult<Vec<f64>> {
    let Some(s) = summary else {
        return Ok(Vec::new());
    };
    if s.max == s.min {
        return Ok(vec![s.min, s.max]);
    }
    let count = ((s.max - s.min) / width).ceil() as usize;
    if count > MAX_STEP_BINS {
        return Err(BinningError::TooManyBins { count });
    }
    let mut edges: Vec<f64> = (0..count)
        .map(|i| s.min + width * i as f64)
        .take_while(|e| *e < s.max)
        .collect();
    edges.push(s.max);
    Ok(edges)
}

/// Equal-population bins: each gets `floor(N/k)` or `ceil(N/k)` elements
/// until ties merge neighbours.
fn quantile_bins(sorted: &[f64], bins: usize) -> (BinStrategy, Vec<f64>, Vec<usize>) {
    let n = sorted.len();
    let k = bins.min(n);
    if k == 0 {
        return (BinStrategy::Quantiles, Vec::new(), Vec::new());
    }
    let base = n / k;
    let extra = n % k;

    let mut edges = Vec::with_capacity(k + 1);
    let mut counts = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let size = base + usize::from(i < extra);
        edges.push(sorted[start]);
        counts.push(size);
        start += size;
    }
    edges.push(sorted[n - 1]);
    collapse_ties(&mut edges, &mut counts);
    (BinStrategy::Quantiles, edges, counts)
}

/// Fold zero-width bins left by tied values into the next bin so edges stay
/// strictly increasing. A zero-width last bin folds into the one before it.
/// A sample of one repeated value keeps its single `[v, v]` bin.
fn collapse_ties(edges: &mut Vec<f64>, counts: &mut Vec<usize>) {
    let mut i = 0;
    while counts.len() > 1 && i < counts.len() {
        if edges[i] < edges[i + 1] {
            i += 1;
        } else if i + 1 < counts.len() {
            counts[i + 1] += counts[i];
            counts.remove(i);
            edges.remove(i + 1);
        } else {
            counts[i - 1] += counts[i];
            counts.remove(i);
            edges.remove(i);
        }
    }
}

fn width_bins(
    sorted: &[f64],
    edges: Vec<f64>,
    interval: Interval,
) -> (BinStrategy, Vec<f64>, Vec<usize>) {
    let counts = if edges.len() >= 2 {
        count_into(sorted, &edges, interval)
    } else {
        Vec::new()
    };
    (BinStrategy::EqualWidth, edges, counts)
}

/// Count values into bins bounded by `edges`.
fn count_into(values: &[f64], edges: &[f64], interval: Interval) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    for &v in values {
        if let Some(i) = bin_index(v, edges, interval) {
            counts[i] += 1;
        }
    }
    counts
}

/// Bin a single value. Boundary values go to the upper bin for `[)`/`[]`
/// and to the lower bin for `(]`/`()`; the outermost edges are always
/// inclusive.
pub fn bin_index(value: f64, edges: &[f64], interval: Interval) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    let bins = edges.len().checked_sub(1).filter(|b| *b > 0)?;
    if value < first || value > last {
        return None;
    }
    let index = if interval.includes_lower() {
        edges.partition_point(|e| *e <= value).saturating_sub(1)
    } else {
        edges.partition_point(|e| *e < value).saturating_sub(1)
    };
    Some(index.min(bins - 1))
}
