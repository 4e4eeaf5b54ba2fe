//! In-memory foreign-key graph.
//!
//! Answers the catalog's two join questions without a remote service:
//! whether a set of tables is connected, and which joins connect them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::FieldRef;
use crate::query::Join;
use crate::service::{AutoJoinResponse, JoinPathRequest, JoinPathResponse};

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("failed to read relations: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse relations: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relation column is not table-qualified: {0}")]
    Unqualified(String),
}

/// A foreign-key style relation between two qualified base columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub from_column: String,
    pub to_column: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationsFile {
    #[serde(default)]
    pub relations: Vec<Relation>,
}

struct ParentInfo {
    parent: NodeIndex,
    edge_idx: EdgeIndex,
}

/// Undirected table graph with one edge per relation.
#[derive(Debug, Default)]
pub struct RelationGraph {
    graph: UnGraph<String, Relation>,
    node_indices: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_relations(relations: impl IntoIterator<Item = Relation>) -> Result<Self, RelationError> {
        let mut graph = Self::new();
        for relation in relations {
            graph.add_relation(relation)?;
        }
        Ok(graph)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RelationError> {
        let content = std::fs::read_to_string(path)?;
        let file: RelationsFile = serde_json::from_str(&content)?;
        Self::from_relations(file.relations)
    }

    pub fn add_relation(&mut self, relation: Relation) -> Result<(), RelationError> {
        let from = base_table(&relation.from_column)?;
        let to = base_table(&relation.to_column)?;
        let a = self.node(from);
        let b = self.node(to);
        self.graph.add_edge(a, b, relation);
        Ok(())
    }

    fn node(&mut self, table: String) -> NodeIndex {
        if let Some(idx) = self.node_indices.get(&table) {
            return *idx;
        }
        let idx = self.graph.add_node(table.clone());
        self.node_indices.insert(table, idx);
        idx
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Shortest relation path between two tables, as joins in walk order.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<Join>> {
        if from == to {
            return Some(Vec::new());
        }
        let from_idx = *self.node_indices.get(from)?;
        let to_idx = *self.node_indices.get(to)?;

        let mut visited: HashSet<NodeIndex> = HashSet::from([from_idx]);
        let mut parents: HashMap<NodeIndex, ParentInfo> = HashMap::new();
        let mut queue = VecDeque::from([from_idx]);

        while let Some(current) = queue.pop_front() {
            for edge_ref in self.graph.edges(current) {
                let neighbor = if edge_ref.source() == current {
                    edge_ref.target()
                } else {
                    edge_ref.source()
                };
                if !visited.insert(neighbor) {
                    continue;
                }
                parents.insert(
                    neighbor,
                    ParentInfo {
                        parent: current,
                        edge_idx: edge_ref.id(),
                    },
                );
                if neighbor == to_idx {
                    return Some(self.reconstruct_path(from_idx, to_idx, &parents));
                }
                queue.push_back(neighbor);
            }
        }
        None
    }

    fn reconstruct_path(
        &self,
        from_idx: NodeIndex,
        to_idx: NodeIndex,
        parents: &HashMap<NodeIndex, ParentInfo>,
    ) -> Vec<Join> {
        let mut joins = Vec::new();
        let mut current = to_idx;
        while current != from_idx {
            let Some(info) = parents.get(&current) else {
                break;
            };
            let relation = &self.graph[info.edge_idx];
            joins.push(Join::inner(&relation.from_column, &relation.to_column));
            current = info.parent;
        }
        joins.reverse();
        joins
    }

    /// Whether every table can reach the first one.
    pub fn path_exists(&self, tables: &[String]) -> bool {
        match tables.split_first() {
            None => true,
            Some((root, rest)) => rest.iter().all(|t| self.find_path(root, t).is_some()),
        }
    }

    /// Deduplicated joins along the shortest path from the first table to
    /// each other table. Empty when any table is unreachable.
    pub fn find_joins(&self, tables: &[String]) -> Vec<Join> {
        let Some((root, rest)) = tables.split_first() else {
            return Vec::new();
        };
        let mut joins: Vec<Join> = Vec::new();
        for target in rest {
            let Some(path) = self.find_path(root, target) else {
                return Vec::new();
            };
            for join in path {
                if !joins.contains(&join) {
                    joins.push(join);
                }
            }
        }
        joins
    }

    /// Answer a join-path check the way the remote catalog would.
    pub fn check(&self, request: &JoinPathRequest) -> JoinPathResponse {
        if let Some((root, rest)) = request.tables.split_first() {
            if let Some(missing) = rest.iter().find(|t| self.find_path(root, t).is_none()) {
                return JoinPathResponse::disconnected(format!(
                    "no relation path between {root} and {missing}"
                ));
            }
        }
        JoinPathResponse::connected()
    }

    pub fn auto_find(&self, request: &JoinPathRequest) -> AutoJoinResponse {
        AutoJoinResponse {
            joins: self.find_joins(&request.tables),
        }
    }
}

fn base_table(column: &str) -> Result<String, RelationError> {
    match FieldRef::parse(column) {
        Some(FieldRef::Base { table, .. }) => Ok(table),
        _ => Err(RelationError::Unqualified(column.to_string())),
    }
}
