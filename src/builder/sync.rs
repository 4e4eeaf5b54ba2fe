//! Wholesale rebuild of the query model from the composition.

use std::collections::HashSet;

use crate::binning::BinParams;
use crate::catalog::{Field, FieldCatalog, FieldRef};
use crate::query::{Aggregation, CalculatedField, Group, GroupMethod, QueryModel};

use super::composition::Composition;

/// Kind of builder element a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Column,
    Filter,
    Group,
    Sort,
    Join,
    CalculatedField,
    Format,
}

/// A reference dropped because it no longer resolves in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedReference {
    pub kind: ElementKind,
    pub reference: String,
}

/// A kept element whose settings were adjusted to fit its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub kind: ElementKind,
    pub field: String,
    pub detail: String,
}

/// What a rebuild dropped or adjusted. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub dropped: Vec<DroppedReference>,
    pub adjusted: Vec<Adjustment>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.adjusted.is_empty()
    }

    fn drop_ref(&mut self, kind: ElementKind, reference: &str) {
        tracing::debug!(?kind, reference, "dropping unresolved reference");
        self.dropped.push(DroppedReference {
            kind,
            reference: reference.to_string(),
        });
    }

    fn adjust(&mut self, kind: ElementKind, field: &str, detail: String) {
        tracing::debug!(?kind, field, %detail, "adjusted element");
        self.adjusted.push(Adjustment {
            kind,
            field: field.to_string(),
            detail,
        });
    }
}

/// Resolves qualified names against the catalog plus the composition's
/// valid calculated fields.
struct Resolver<'a> {
    catalog: &'a FieldCatalog,
    calculated: HashSet<String>,
}

impl Resolver<'_> {
    fn resolve(&self, full_name: &str) -> Option<Field> {
        match FieldRef::parse(full_name) {
            Some(FieldRef::Calculated { name }) => self
                .calculated
                .contains(&name)
                .then(|| Field::calculated(name)),
            _ => self.catalog.resolve(full_name).cloned(),
        }
    }
}

/// Calculated fields whose every reference resolves, either to the catalog
/// or to another valid calculated field.
fn valid_calculated(calcs: &[CalculatedField], catalog: &FieldCatalog) -> HashSet<String> {
    let mut valid: HashSet<String> = HashSet::new();
    loop {
        let before = valid.len();
        for calc in calcs {
            if valid.contains(&calc.name) {
                continue;
            }
            let resolves = calc.references().iter().all(|r| match FieldRef::parse(r) {
                Some(FieldRef::Calculated { name }) => name != calc.name && valid.contains(&name),
                _ => catalog.contains(r),
            });
            if resolves {
                valid.insert(calc.name.clone());
            }
        }
        if valid.len() == before {
            return valid;
        }
    }
}

/// Rebuild every array of `model` from `composition`.
///
/// Arrays are replaced, never patched. References that no longer resolve
/// are dropped silently (recorded in the returned report). `userFilters`
/// is cleared; the orchestrator writes it before each execution.
pub fn rebuild(composition: &Composition, catalog: &FieldCatalog, model: &mut QueryModel) -> SyncReport {
    let mut report = SyncReport::default();

    let calculated = valid_calculated(&composition.calculated_fields, catalog);
    let calculated_fields: Vec<CalculatedField> = composition
        .calculated_fields
        .iter()
        .filter(|c| {
            let keep = calculated.contains(&c.name);
            if !keep {
                report.drop_ref(ElementKind::CalculatedField, &c.full_name());
            }
            keep
        })
        .cloned()
        .collect();

    let resolver = Resolver {
        catalog,
        calculated,
    };

    let mut columns = Vec::with_capacity(composition.columns.len());
    for column in &composition.columns {
        let Some(field) = resolver.resolve(&column.field) else {
            report.drop_ref(ElementKind::Column, &column.field);
            continue;
        };
        let mut column = column.clone();
        if !column.aggregation.allowed_for(field.is_numeric) {
            report.adjust(
                ElementKind::Column,
                &column.field,
                format!("{} not allowed on non-numeric field", column.aggregation),
            );
            column.aggregation = Aggregation::None;
        }
        columns.push(column);
    }

    let mut filters = Vec::with_capacity(composition.filters.len());
    for filter in &composition.filters {
        if resolver.resolve(&filter.field).is_some() {
            filters.push(filter.clone());
        } else {
            report.drop_ref(ElementKind::Filter, &filter.field);
        }
    }

    let mut groups = Vec::with_capacity(composition.groups.len());
    for group in &composition.groups {
        let Some(field) = resolver.resolve(&group.field) else {
            report.drop_ref(ElementKind::Group, &group.field);
            continue;
        };
        groups.push(sanitize_group(group, &field, &mut report));
    }

    let mut sorts = Vec::with_capacity(composition.sorts.len());
    for sort in &composition.sorts {
        if resolver.resolve(&sort.field).is_some() {
            sorts.push(sort.clone());
        } else {
            report.drop_ref(ElementKind::Sort, &sort.field);
        }
    }

    let mut joins = Vec::with_capacity(composition.joins.len());
    for join in &composition.joins {
        let resolves = catalog.contains(&join.left_column) && catalog.contains(&join.right_column);
        if resolves {
            joins.push(join.clone());
        } else {
            report.drop_ref(
                ElementKind::Join,
                &format!("{} = {}", join.left_column, join.right_column),
            );
        }
    }

    let mut formats = composition.formats.clone();
    formats.retain(|field, _| {
        let keep = resolver.resolve(field).is_some();
        if !keep {
            report.drop_ref(ElementKind::Format, field);
        }
        keep
    });

    *model = QueryModel {
        connection_id: composition.connection_id.clone(),
        columns,
        filters,
        groups,
        sorts,
        joins,
        calculated_fields,
        formats,
        user_filters: Vec::new(),
        page: composition.page.max(1),
        page_size: composition.page_size.max(1),
    };

    report
}

fn sanitize_group(group: &Group, field: &Field, report: &mut SyncReport) -> Group {
    let mut group = group.clone();
    if !group.method.allowed_for(field) {
        report.adjust(
            ElementKind::Group,
            &group.field,
            format!("{:?} grouping not available for this field", group.method),
        );
        group.method = GroupMethod::Exact;
    }
    if group.method == GroupMethod::Bin {
        if group.params.is_none() {
            group.params = Some(BinParams::default());
        }
    } else {
        group.params = None;
        group.bins = None;
    }
    group
}
