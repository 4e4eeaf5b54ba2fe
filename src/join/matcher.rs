//! Strategies for proposing joins onto derived (saved report) sources.

use crate::catalog::REPORT_PREFIX;
use crate::query::Join;

/// One side of a candidate pairing: a source and its known column names.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSource<'a> {
    /// Source identifier (`orders`, `report__42`).
    pub source: &'a str,
    pub columns: &'a [&'a str],
}

impl CandidateSource<'_> {
    fn qualify(&self, column: &str) -> String {
        format!("{}.{}", self.source, column)
    }
}

/// Proposes a manual join between a derived source and a base table.
///
/// Automatic relational discovery never covers derived sources, so the
/// resolver asks a matcher instead. Swap the implementation to change the
/// heuristic; the resolver's state machine does not depend on it.
pub trait DerivedJoinMatcher: Send + Sync {
    fn propose(&self, derived: CandidateSource<'_>, table: CandidateSource<'_>) -> Option<Join>;
}

/// Pairs the first derived header whose name equals a table column,
/// ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveNameMatcher;

impl DerivedJoinMatcher for CaseInsensitiveNameMatcher {
    fn propose(&self, derived: CandidateSource<'_>, table: CandidateSource<'_>) -> Option<Join> {
        debug_assert!(derived.source.starts_with(REPORT_PREFIX));
        derived.columns.iter().find_map(|header| {
            table
                .columns
                .iter()
                .find(|column| column.eq_ignore_ascii_case(header))
                .map(|column| Join::inner(derived.qualify(header), table.qualify(column)))
        })
    }
}
