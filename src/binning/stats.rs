//! Sample statistics used by the binning engine.

/// Relative mean/median deviation above which `auto` recommends quantiles.
pub const SKEW_THRESHOLD: f64 = 0.10;

/// Order statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Summary {
    /// Summarise an ascending-sorted sample. Returns `None` for an empty one.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            count: sorted.len(),
            min,
            max,
            mean,
            median: quantile(sorted, 0.5),
            q1: quantile(sorted, 0.25),
            q3: quantile(sorted, 0.75),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fences: `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    pub fn fences(&self) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - 1.5 * iqr, self.q3 + 1.5 * iqr)
    }

    /// Mean deviates from the median by more than 10% of the median.
    pub fn is_skewed(&self) -> bool {
        (self.mean - self.median).abs() > SKEW_THRESHOLD * self.median.abs()
    }
}

/// Linear-interpolation quantile over an ascending-sorted slice.
///
/// Uses the `(n - 1) * p` rank definition. Panics never; an empty slice
/// yields `NaN`.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (n - 1) as f64 * p.clamp(0.0, 1.0);
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Sort a sample ascending, dropping NaN.
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    out.sort_by(f64::total_cmp);
    out
}

/// Clamp values outside the Tukey fences to the fence. Input must be sorted;
/// output stays sorted.
pub fn cap_outliers(sorted: &[f64]) -> Vec<f64> {
    let Some(summary) = Summary::from_sorted(sorted) else {
        return Vec::new();
    };
    let (low, high) = summary.fences();
    sorted.iter().map(|v| v.clamp(low, high)).collect()
}
