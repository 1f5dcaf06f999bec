//! Relationship graph derived from a configuration's join definitions.
//!
//! Only tables wired into at least one join are eligible for column, group
//! and sort selection. This is deliberately narrower than the full list of
//! declared tables.

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::{JoinDefinition, JoinType, ReportConfig};

/// Tables referenced by any join, in first-seen order.
///
/// Empty table names are ignored, so a half-edited join contributes only
/// the side that has been filled in.
pub fn connected_tables(config: &ReportConfig) -> IndexSet<String> {
    let mut tables = IndexSet::new();
    for join in &config.db_defination {
        if !join.primary_table.is_empty() {
            tables.insert(join.primary_table.clone());
        }
        if !join.joined_table.is_empty() {
            tables.insert(join.joined_table.clone());
        }
    }
    tables
}

/// Edge payload: the join as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEdge {
    pub join_type: JoinType,
    pub source_field: String,
    pub target_field: String,
}

impl From<&JoinDefinition> for JoinEdge {
    fn from(join: &JoinDefinition) -> Self {
        Self {
            join_type: join.join_type,
            source_field: join.source_field.clone(),
            target_field: join.target_field.clone(),
        }
    }
}

/// Undirected graph of tables connected by joins.
///
/// Nodes are table names; each complete join (both sides named) becomes
/// an edge. A join with only one side named still registers that table.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    graph: UnGraph<String, JoinEdge>,
    /// Index: table name → NodeIndex, in first-seen order
    table_index: IndexMap<String, NodeIndex>,
}

impl RelationshipGraph {
    pub fn build(config: &ReportConfig) -> Self {
        let mut graph = Self::default();
        for join in &config.db_defination {
            let primary = graph.add_table(&join.primary_table);
            let joined = graph.add_table(&join.joined_table);
            if let (Some(primary), Some(joined)) = (primary, joined) {
                graph.graph.add_edge(primary, joined, JoinEdge::from(join));
            }
        }
        graph
    }

    fn add_table(&mut self, name: &str) -> Option<NodeIndex> {
        if name.is_empty() {
            return None;
        }
        if let Some(idx) = self.table_index.get(name) {
            return Some(*idx);
        }
        let idx = self.graph.add_node(name.to_string());
        self.table_index.insert(name.to_string(), idx);
        Some(idx)
    }

    /// Connected tables in first-seen order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.table_index.keys().map(String::as_str)
    }

    pub fn table_count(&self) -> usize {
        self.table_index.len()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.table_index.contains_key(table)
    }

    /// Tables directly joined to `table`, sorted by name.
    pub fn neighbors(&self, table: &str) -> Vec<&str> {
        let Some(&idx) = self.table_index.get(table) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every join declared between two tables, in either direction.
    pub fn joins_between(&self, t1: &str, t2: &str) -> Vec<&JoinEdge> {
        let (Some(&a), Some(&b)) = (self.table_index.get(t1), self.table_index.get(t2)) else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(a, b)
            .map(|edge| edge.weight())
            .collect()
    }

    /// Number of disjoint join islands.
    pub fn component_count(&self) -> usize {
        if self.table_index.is_empty() {
            return 0;
        }
        connected_components(&self.graph)
    }
}
