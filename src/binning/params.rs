//! Binning parameters shared by the local preview and the remote executor.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{BinningError, BinningResult};

/// Smallest bin count accepted by count-driven modes.
pub const MIN_BINS: usize = 2;
/// Largest bin count accepted by count-driven modes.
pub const MAX_BINS: usize = 25;
/// Upper bound on bins produced by `step` mode.
pub const MAX_STEP_BINS: usize = 1000;

/// Default bin count for `auto`.
pub const DEFAULT_BINS: usize = 10;

/// How bin edges are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BinMode {
    /// Equal width unless the sample looks skewed, then quantiles.
    Auto { bins: usize },
    /// `bins` equal-width intervals over `[from, to]` (sample min/max by default).
    EqualWidth {
        bins: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<f64>,
    },
    /// Equal-population bins over the sorted sample.
    Quantiles { bins: usize },
    /// Fixed-width bins from the sample minimum; the final bin may be narrower.
    Step { width: f64 },
    /// Explicit ascending boundaries; N edges give N-1 bins.
    CustomEdges { edges: Vec<f64> },
}

impl Default for BinMode {
    fn default() -> Self {
        BinMode::Auto { bins: DEFAULT_BINS }
    }
}

/// Treatment of null sample values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullHandling {
    #[default]
    Exclude,
    SeparateBucket,
}

/// Bracket notation for bin boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    /// `[lo, hi)`
    #[default]
    #[serde(rename = "[)")]
    ClosedOpen,
    /// `[lo, hi]`
    #[serde(rename = "[]")]
    Closed,
    /// `(lo, hi]`
    #[serde(rename = "(]")]
    OpenClosed,
    /// `(lo, hi)`
    #[serde(rename = "()")]
    Open,
}

impl Interval {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "[)" => Some(Interval::ClosedOpen),
            "[]" => Some(Interval::Closed),
            "(]" => Some(Interval::OpenClosed),
            "()" => Some(Interval::Open),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::ClosedOpen => "[)",
            Interval::Closed => "[]",
            Interval::OpenClosed => "(]",
            Interval::Open => "()",
        }
    }

    pub fn open_char(&self) -> char {
        match self {
            Interval::ClosedOpen | Interval::Closed => '[',
            Interval::OpenClosed | Interval::Open => '(',
        }
    }

    pub fn close_char(&self) -> char {
        match self {
            Interval::ClosedOpen | Interval::Open => ')',
            Interval::Closed | Interval::OpenClosed => ']',
        }
    }

    /// Whether a value equal to an inner boundary belongs to the upper bin.
    pub fn includes_lower(&self) -> bool {
        matches!(self, Interval::ClosedOpen | Interval::Closed)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to regenerate a bin label from its edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelStyle {
    pub template: Option<String>,
    pub k_format: bool,
    pub interval: Interval,
}

/// Full parameter set for numeric binning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BinParams {
    #[serde(flatten)]
    pub mode: BinMode,
    pub exclude_zeros: bool,
    pub cap_outliers: bool,
    pub nulls: NullHandling,
    pub k_format: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_template: Option<String>,
    pub interval: Interval,
}

impl BinParams {
    pub fn new(mode: BinMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_exclude_zeros(mut self) -> Self {
        self.exclude_zeros = true;
        self
    }

    pub fn with_cap_outliers(mut self) -> Self {
        self.cap_outliers = true;
        self
    }

    pub fn with_nulls(mut self, nulls: NullHandling) -> Self {
        self.nulls = nulls;
        self
    }

    pub fn with_k_format(mut self) -> Self {
        self.k_format = true;
        self
    }

    pub fn with_label_template(mut self, template: impl Into<String>) -> Self {
        self.label_template = Some(template.into());
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn label_style(&self) -> LabelStyle {
        LabelStyle {
            template: self.label_template.clone(),
            k_format: self.k_format,
            interval: self.interval,
        }
    }

    /// Check the parameter contract without looking at any data.
    pub fn validate(&self) -> BinningResult<()> {
        match &self.mode {
            BinMode::Auto { bins } | BinMode::Quantiles { bins } => check_bin_count(*bins),
            BinMode::EqualWidth { bins, from, to } => {
                check_bin_count(*bins)?;
                if let (Some(from), Some(to)) = (from, to) {
                    if !(to > from) {
                        return Err(BinningError::InvalidRange {
                            from: *from,
                            to: *to,
                        });
                    }
                }
                Ok(())
            }
            BinMode::Step { width } => {
                if width.is_finite() && *width > 0.0 {
                    Ok(())
                } else {
                    Err(BinningError::InvalidStepWidth(*width))
                }
            }
            BinMode::CustomEdges { edges } => {
                if edges.len() < 2 {
                    return Err(BinningError::InvalidEdges(
                        "at least two edges are required".to_string(),
                    ));
                }
                if edges.iter().any(|e| !e.is_finite()) {
                    return Err(BinningError::InvalidEdges(
                        "edges must be finite numbers".to_string(),
                    ));
                }
                if edges.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(BinningError::InvalidEdges(
                        "edges must be strictly ascending".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn check_bin_count(bins: usize) -> BinningResult<()> {
    if (MIN_BINS..=MAX_BINS).contains(&bins) {
        Ok(())
    } else {
        Err(BinningError::BinCountOutOfRange { bins })
    }
}
