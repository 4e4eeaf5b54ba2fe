//! The editable composition behind the visual builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{BuilderError, BuilderResult};
use super::intent::Intent;
use crate::binning::BinParams;
use crate::query::{
    CalculatedField, Column, Filter, FilterValue, Format, Group, GroupMethod, Join, QueryModel,
    Sort, DEFAULT_PAGE_SIZE,
};

/// Largest page size a composition accepts.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Ordered pill lists and settings as the user composed them.
///
/// Entries may reference fields that no longer resolve; the synchronizer
/// drops those when building the [`QueryModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Composition {
    pub connection_id: Option<String>,
    pub columns: Vec<Column>,
    pub filters: Vec<Filter>,
    pub groups: Vec<Group>,
    pub sorts: Vec<Sort>,
    pub joins: Vec<Join>,
    pub calculated_fields: Vec<CalculatedField>,
    pub formats: BTreeMap<String, Format>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            connection_id: None,
            columns: Vec::new(),
            filters: Vec::new(),
            groups: Vec::new(),
            sorts: Vec::new(),
            joins: Vec::new(),
            calculated_fields: Vec::new(),
            formats: BTreeMap::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn check_index(kind: &'static str, index: usize, len: usize) -> BuilderResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(BuilderError::IndexOutOfRange { kind, index, len })
    }
}

fn move_item<T>(items: &mut Vec<T>, kind: &'static str, from: usize, to: usize) -> BuilderResult<()> {
    check_index(kind, from, items.len())?;
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    Ok(())
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a composition from a saved model (drops the transient `userFilters`).
    pub fn from_model(model: &QueryModel) -> Self {
        Self {
            connection_id: model.connection_id.clone(),
            columns: model.columns.clone(),
            filters: model.filters.clone(),
            groups: model.groups.clone(),
            sorts: model.sorts.clone(),
            joins: model.joins.clone(),
            calculated_fields: model.calculated_fields.clone(),
            formats: model.formats.clone(),
            page: model.page.max(1),
            page_size: model.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Apply one intent. The caller is responsible for the follow-up
    /// rebuild and join re-check.
    pub fn apply(&mut self, intent: Intent) -> BuilderResult<()> {
        let resets_page = intent.resets_page();
        match intent {
            Intent::SetConnection(connection_id) => self.connection_id = connection_id,

            Intent::AddColumn(column) => self.columns.push(column),
            Intent::RemoveColumn(index) => {
                check_index("column", index, self.columns.len())?;
                self.columns.remove(index);
            }
            Intent::MoveColumn { from, to } => move_item(&mut self.columns, "column", from, to)?,
            Intent::SetAggregation { index, aggregation } => {
                check_index("column", index, self.columns.len())?;
                self.columns[index].aggregation = aggregation;
            }
            Intent::SetAlias { index, alias } => {
                check_index("column", index, self.columns.len())?;
                self.columns[index].alias = alias.filter(|a| !a.trim().is_empty());
            }

            Intent::AddFilter(filter) => self.filters.push(filter),
            Intent::RemoveFilter(index) => {
                check_index("filter", index, self.filters.len())?;
                self.filters.remove(index);
            }
            Intent::SetFilterOperator { index, operator } => {
                check_index("filter", index, self.filters.len())?;
                self.filters[index].operator = operator;
            }
            Intent::SetFilterValue { index, value } => {
                check_index("filter", index, self.filters.len())?;
                self.filters[index].value = value;
            }
            Intent::SetFilterText { index, text } => {
                check_index("filter", index, self.filters.len())?;
                let filter = &mut self.filters[index];
                filter.value = FilterValue::from_input(filter.operator, &text);
            }

            Intent::AddGroup(group) => self.groups.push(group),
            Intent::RemoveGroup(index) => {
                check_index("group", index, self.groups.len())?;
                self.groups.remove(index);
            }
            Intent::MoveGroup { from, to } => move_item(&mut self.groups, "group", from, to)?,
            Intent::SetGroupMethod { index, method } => {
                check_index("group", index, self.groups.len())?;
                let group = &mut self.groups[index];
                group.method = method;
                group.bins = None;
                group.params = match method {
                    GroupMethod::Bin => group.params.take().or_else(|| Some(BinParams::default())),
                    _ => None,
                };
            }
            Intent::SetBinParams { index, params } => {
                check_index("group", index, self.groups.len())?;
                let group = &mut self.groups[index];
                group.method = GroupMethod::Bin;
                group.params = Some(params);
                group.bins = None;
            }
            Intent::SetGroupBins { index, bins } => {
                check_index("group", index, self.groups.len())?;
                self.groups[index].bins = Some(bins);
            }

            Intent::AddSort(sort) => self.sorts.push(sort),
            Intent::RemoveSort(index) => {
                check_index("sort", index, self.sorts.len())?;
                self.sorts.remove(index);
            }
            Intent::ToggleSortDirection(index) => {
                check_index("sort", index, self.sorts.len())?;
                let sort = &mut self.sorts[index];
                sort.direction = sort.direction.toggled();
            }

            Intent::AddJoin(join) => {
                if !self.joins.contains(&join) {
                    self.joins.push(join);
                }
            }
            Intent::RemoveJoin(index) => {
                check_index("join", index, self.joins.len())?;
                self.joins.remove(index);
            }

            Intent::AddCalculatedField(calc) => {
                if self.calculated_fields.iter().any(|c| c.name == calc.name) {
                    return Err(BuilderError::DuplicateCalculatedField(calc.name));
                }
                self.calculated_fields.push(calc);
            }
            Intent::RemoveCalculatedField(name) => {
                let before = self.calculated_fields.len();
                self.calculated_fields.retain(|c| c.name != name);
                if self.calculated_fields.len() == before {
                    return Err(BuilderError::UnknownCalculatedField(name));
                }
            }

            Intent::SetFormat { field, format } => {
                self.formats.insert(field, format);
            }
            Intent::ClearFormat(field) => {
                self.formats.remove(&field);
            }

            Intent::SetPage(page) => {
                if page == 0 {
                    return Err(BuilderError::InvalidPage);
                }
                self.page = page;
            }
            Intent::SetPageSize(size) => {
                if size == 0 || size > MAX_PAGE_SIZE {
                    return Err(BuilderError::InvalidPageSize {
                        size,
                        max: MAX_PAGE_SIZE,
                    });
                }
                self.page_size = size;
            }
        }
        if resets_page {
            self.page = 1;
        }
        Ok(())
    }
}
