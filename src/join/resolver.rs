//! Join-feasibility state machine.

use std::collections::{BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;

use super::matcher::{CandidateSource, CaseInsensitiveNameMatcher, DerivedJoinMatcher};
use crate::catalog::{FieldCatalog, FieldRef, FieldSource, REPORT_PREFIX};
use crate::query::{Join, QueryModel};
use crate::service::{JoinPathRequest, JoinPathResponse};

/// Reason given when a derived source lacks a manual join.
pub const SUBREPORT_REQUIRES_MANUAL_JOIN: &str = "subreport requires manual join";

/// Gating state of the current model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinState {
    Allowed,
    Blocked(String),
    /// Waiting for the catalog's answer to request `token`.
    Checking { token: u64 },
}

impl JoinState {
    pub fn is_blocked(&self) -> bool {
        matches!(self, JoinState::Blocked(_))
    }

    pub fn blocked_reason(&self) -> Option<&str> {
        match self {
            JoinState::Blocked(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A catalog question tagged with the token it was dispatched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCheckRequest {
    pub token: u64,
    pub request: JoinPathRequest,
}

/// Outcome of a local evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Decided locally; no catalog call.
    Settled(JoinState),
    /// The catalog must be asked; the resolver is now `Checking`.
    NeedsCatalog(JoinCheckRequest),
}

/// Distinct sources referenced by a model's columns and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedSources {
    pub base: BTreeSet<String>,
    /// Derived source ids, `report__<id>`.
    pub derived: BTreeSet<String>,
}

impl ReferencedSources {
    /// Classify each referenced field by its catalog source; names the
    /// catalog does not know are classified by their shape. Calculated
    /// fields are skipped.
    pub fn collect(model: &QueryModel, catalog: &FieldCatalog) -> Self {
        let mut sources = Self::default();
        let fields = model
            .columns
            .iter()
            .map(|c| c.field.as_str())
            .chain(model.filters.iter().map(|f| f.field.as_str()));
        for field in fields {
            if let Some(known) = catalog.resolve(field) {
                match (&known.source, known.source_id()) {
                    (FieldSource::Table { .. }, Some(id)) => {
                        sources.base.insert(id);
                    }
                    (FieldSource::Derived { .. }, Some(id)) => {
                        sources.derived.insert(id);
                    }
                    _ => {}
                }
                continue;
            }
            match FieldRef::parse(field) {
                Some(FieldRef::Base { table, .. }) => {
                    sources.base.insert(table);
                }
                Some(r @ FieldRef::Derived { .. }) => {
                    if let Some(id) = r.source_id() {
                        sources.derived.insert(id);
                    }
                }
                Some(FieldRef::Calculated { .. }) | None => {}
            }
        }
        sources
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn all(&self) -> impl Iterator<Item = &String> {
        self.base.iter().chain(self.derived.iter())
    }
}

/// Decides whether the sources a model references can be joined.
///
/// Every rebuild calls [`evaluate`](Self::evaluate), which bumps the request
/// token. Only a catalog response carrying the latest token can settle a
/// `Checking` state; anything older is dropped.
pub struct JoinPathResolver {
    state: JoinState,
    latest_token: u64,
    matcher: Box<dyn DerivedJoinMatcher>,
}

impl Default for JoinPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JoinPathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinPathResolver")
            .field("state", &self.state)
            .field("latest_token", &self.latest_token)
            .finish_non_exhaustive()
    }
}

impl JoinPathResolver {
    pub fn new() -> Self {
        Self::with_matcher(Box::new(CaseInsensitiveNameMatcher))
    }

    pub fn with_matcher(matcher: Box<dyn DerivedJoinMatcher>) -> Self {
        Self {
            state: JoinState::Allowed,
            latest_token: 0,
            matcher,
        }
    }

    pub fn state(&self) -> &JoinState {
        &self.state
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// Forget everything; used when a new session starts.
    pub fn reset(&mut self) {
        self.state = JoinState::Allowed;
        self.latest_token += 1;
    }

    /// Re-check the model. Supersedes any in-flight catalog request.
    pub fn evaluate(&mut self, model: &QueryModel, catalog: &FieldCatalog) -> Evaluation {
        self.latest_token += 1;
        let token = self.latest_token;

        let evaluation = match local_decision(model, catalog) {
            Decision::Settled(state) => Evaluation::Settled(state),
            Decision::AskCatalog(tables) => match &model.connection_id {
                Some(connection_id) => Evaluation::NeedsCatalog(JoinCheckRequest {
                    token,
                    request: JoinPathRequest {
                        connection_id: connection_id.clone(),
                        tables,
                    },
                }),
                // Execution is gated on the connection anyway
                None => Evaluation::Settled(JoinState::Allowed),
            },
        };

        let next = match &evaluation {
            Evaluation::Settled(state) => state.clone(),
            Evaluation::NeedsCatalog(req) => JoinState::Checking { token: req.token },
        };
        self.transition(next);
        evaluation
    }

    /// Apply a catalog answer. Returns `false` when the token is stale.
    pub fn apply_response(&mut self, token: u64, response: JoinPathResponse) -> bool {
        if !self.accepts(token) {
            return false;
        }
        let next = if response.path_exists {
            JoinState::Allowed
        } else if response.message.is_empty() {
            JoinState::Blocked("no join path between the selected tables".to_string())
        } else {
            JoinState::Blocked(response.message)
        };
        self.transition(next);
        true
    }

    /// Settle a check whose catalog call failed. Stale tokens are ignored.
    pub fn apply_failure(&mut self, token: u64, message: impl Into<String>) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.transition(JoinState::Blocked(message.into()));
        true
    }

    fn accepts(&self, token: u64) -> bool {
        let current = self.state == JoinState::Checking { token } && token == self.latest_token;
        if !current {
            tracing::debug!(token, latest = self.latest_token, "discarding stale join response");
        }
        current
    }

    fn transition(&mut self, next: JoinState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "join state");
        }
        self.state = next;
    }

    /// Propose manual joins for derived sources that have none, pairing each
    /// with every referenced base table through the configured matcher.
    pub fn suggest_derived_joins(&self, model: &QueryModel, catalog: &FieldCatalog) -> Vec<Join> {
        let sources = ReferencedSources::collect(model, catalog);
        let mut proposals = Vec::new();

        for derived in &sources.derived {
            if model.joins.iter().any(|j| j.connects(derived, catalog)) {
                continue;
            }
            let report_id = derived.strip_prefix(REPORT_PREFIX).unwrap_or(derived);
            let headers = catalog.derived_headers(report_id);
            for table in &sources.base {
                let columns = catalog.table_columns(table);
                let proposal = self.matcher.propose(
                    CandidateSource {
                        source: derived,
                        columns: &headers,
                    },
                    CandidateSource {
                        source: table,
                        columns: &columns,
                    },
                );
                if let Some(join) = proposal {
                    proposals.push(join);
                }
            }
        }
        proposals
    }
}

enum Decision {
    Settled(JoinState),
    /// Base tables the catalog must connect.
    AskCatalog(Vec<String>),
}

fn local_decision(model: &QueryModel, catalog: &FieldCatalog) -> Decision {
    let sources = ReferencedSources::collect(model, catalog);

    if sources.len() < 2 {
        return Decision::Settled(JoinState::Allowed);
    }

    for derived in &sources.derived {
        if !model.joins.iter().any(|j| j.connects(derived, catalog)) {
            return Decision::Settled(JoinState::Blocked(
                SUBREPORT_REQUIRES_MANUAL_JOIN.to_string(),
            ));
        }
    }

    if sources.base.len() < 2 || manually_connected(&sources, &model.joins, catalog) {
        return Decision::Settled(JoinState::Allowed);
    }

    Decision::AskCatalog(sources.base.into_iter().collect())
}

/// True when the manual joins alone connect every referenced source.
fn manually_connected(sources: &ReferencedSources, joins: &[Join], catalog: &FieldCatalog) -> bool {
    let index: HashMap<&str, usize> = sources
        .all()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();
    let mut sets = UnionFind::<usize>::new(index.len());

    for (left, right) in joins.iter().filter_map(|j| j.sources(catalog)) {
        if let (Some(&l), Some(&r)) = (index.get(left.as_str()), index.get(right.as_str())) {
            sets.union(l, r);
        }
    }

    let root = sets.find(0);
    (1..index.len()).all(|i| sets.find(i) == root)
}
