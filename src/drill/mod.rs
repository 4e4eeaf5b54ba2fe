//! Drill-down navigation.
//!
//! Clicking a grouped result value narrows the report to that value; "back"
//! restores the filters exactly as they were. Each level holds a deep copy
//! of the filter list taken on entry, so levels never alias each other or
//! the live list.

use thiserror::Error;

use crate::query::{Filter, Group, GroupMethod, Scalar};

pub type DrillResult<T> = Result<T, DrillError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrillError {
    #[error("no group on field '{0}'")]
    NoSuchGroup(String),

    #[error("no bin of '{field}' is labelled '{label}'")]
    NoMatchingBin { field: String, label: String },

    #[error("group on '{0}' has no computed bins")]
    MissingBins(String),

    #[error("not drilled in")]
    EmptyStack,
}

/// One entered drill level.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillLevel {
    pub field: String,
    pub value: Scalar,
    /// The filter list as it was before this level was entered.
    pub previous_filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default)]
pub struct DrillNavigator {
    stack: Vec<DrillLevel>,
}

impl DrillNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether drill mode is active (at least one level entered).
    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn levels(&self) -> &[DrillLevel] {
        &self.stack
    }

    /// Drop every level. Only a new report session does this.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Narrow into the grouped value `value` of `field`.
    ///
    /// Binned groups map the displayed label back to its bin through the
    /// persisted edges and push a `BETWEEN` filter; any other group pushes
    /// an equality filter on the raw value. On error nothing changes.
    pub fn enter(
        &mut self,
        groups: &[Group],
        filters: &mut Vec<Filter>,
        field: &str,
        value: Scalar,
    ) -> DrillResult<&DrillLevel> {
        let group = groups
            .iter()
            .find(|g| g.field == field)
            .ok_or_else(|| DrillError::NoSuchGroup(field.to_string()))?;

        let filter = match group.method {
            GroupMethod::Bin => bin_filter(group, &value)?,
            _ => Filter::equals(field, value.clone()),
        };

        tracing::debug!(field, depth = self.stack.len() + 1, "drill enter");
        self.stack.push(DrillLevel {
            field: field.to_string(),
            value,
            previous_filters: filters.clone(),
        });
        filters.push(filter);

        // Just pushed
        Ok(&self.stack[self.stack.len() - 1])
    }

    /// Leave the innermost level, replacing `filters` with its snapshot.
    pub fn back(&mut self, filters: &mut Vec<Filter>) -> DrillResult<DrillLevel> {
        let level = self.stack.pop().ok_or(DrillError::EmptyStack)?;
        tracing::debug!(field = %level.field, depth = self.stack.len(), "drill back");
        *filters = level.previous_filters.clone();
        Ok(level)
    }
}

fn bin_filter(group: &Group, value: &Scalar) -> DrillResult<Filter> {
    let label = match value {
        Scalar::Text(label) => label.as_str(),
        _ => {
            return Err(DrillError::NoMatchingBin {
                field: group.field.clone(),
                label: format!("{value:?}"),
            })
        }
    };
    let bins = group
        .bins
        .as_ref()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| DrillError::MissingBins(group.field.clone()))?;
    let style = group.params.clone().unwrap_or_default().label_style();

    let (lo, hi) = bins
        .find_by_label(label, &style)
        .ok_or_else(|| DrillError::NoMatchingBin {
            field: group.field.clone(),
            label: label.to_string(),
        })?;
    Ok(Filter::between(&group.field, lo, hi))
}
