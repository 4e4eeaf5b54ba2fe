//! User intents emitted by the visual builder.

use crate::binning::{BinParams, BinSnapshot};
use crate::query::{
    Aggregation, CalculatedField, Column, Filter, FilterOperator, FilterValue, Format, Group,
    GroupMethod, Join, Sort,
};

/// A single edit to the composition.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetConnection(Option<String>),

    AddColumn(Column),
    RemoveColumn(usize),
    MoveColumn { from: usize, to: usize },
    SetAggregation { index: usize, aggregation: Aggregation },
    SetAlias { index: usize, alias: Option<String> },

    AddFilter(Filter),
    RemoveFilter(usize),
    SetFilterOperator { index: usize, operator: FilterOperator },
    SetFilterValue { index: usize, value: FilterValue },
    /// Free text typed into a filter input; parsed against the filter's operator.
    SetFilterText { index: usize, text: String },

    AddGroup(Group),
    RemoveGroup(usize),
    MoveGroup { from: usize, to: usize },
    SetGroupMethod { index: usize, method: GroupMethod },
    SetBinParams { index: usize, params: BinParams },
    SetGroupBins { index: usize, bins: BinSnapshot },

    AddSort(Sort),
    RemoveSort(usize),
    ToggleSortDirection(usize),

    AddJoin(Join),
    RemoveJoin(usize),

    AddCalculatedField(CalculatedField),
    RemoveCalculatedField(String),

    SetFormat { field: String, format: Format },
    ClearFormat(String),

    SetPage(u32),
    SetPageSize(u32),
}

impl Intent {
    /// Text inputs are debounced before triggering a rebuild.
    pub fn is_text_input(&self) -> bool {
        matches!(self, Intent::SetFilterText { .. } | Intent::SetAlias { .. })
    }

    /// Whether applying this intent sends paging back to the first page.
    pub fn resets_page(&self) -> bool {
        !matches!(
            self,
            Intent::SetPage(_)
                | Intent::SetAlias { .. }
                | Intent::SetFormat { .. }
                | Intent::ClearFormat(_)
                | Intent::SetGroupBins { .. }
        )
    }
}
