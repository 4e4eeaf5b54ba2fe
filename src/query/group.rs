//! Grouping and sort specifications.

use serde::{Deserialize, Serialize};

use crate::binning::{BinParams, BinSnapshot};
use crate::catalog::Field;

/// How a grouped field is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMethod {
    #[default]
    Exact,
    Year,
    Quarter,
    Month,
    Bin,
}

impl GroupMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "year" => Some(Self::Year),
            "quarter" => Some(Self::Quarter),
            "month" => Some(Self::Month),
            "bin" => Some(Self::Bin),
            _ => None,
        }
    }

    /// Date parts need a temporal field, binning needs a numeric one.
    pub fn allowed_for(&self, field: &Field) -> bool {
        match self {
            GroupMethod::Exact => true,
            GroupMethod::Year | GroupMethod::Quarter | GroupMethod::Month => field.is_temporal(),
            GroupMethod::Bin => field.is_numeric,
        }
    }
}

/// A grouping on a qualified field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub field: String,
    #[serde(default)]
    pub method: GroupMethod,
    /// Binning parameters; only meaningful for [`GroupMethod::Bin`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BinParams>,
    /// Edges computed for the current bins, persisted for drill-down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<BinSnapshot>,
}

impl Group {
    pub fn exact(field: impl Into<String>) -> Self {
        Self::with_method(field, GroupMethod::Exact)
    }

    pub fn with_method(field: impl Into<String>, method: GroupMethod) -> Self {
        Self {
            field: field.into(),
            method,
            params: None,
            bins: None,
        }
    }

    pub fn binned(field: impl Into<String>, params: BinParams) -> Self {
        Self {
            field: field.into(),
            method: GroupMethod::Bin,
            params: Some(params),
            bins: None,
        }
    }

    pub fn with_bins(mut self, bins: BinSnapshot) -> Self {
        self.bins = Some(bins);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}
