//! Typed co-occurrence graphs: one per period, plus the merged view.
//!
//! Both graph kinds are built once by their pipeline stage and never mutated
//! afterwards. Node maps are `BTreeMap`s so every iteration order is stable,
//! which the seeded algorithms downstream rely on for reproducibility.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::mention::EntityType;

/// Order two entity names so that `(a, b)` and `(b, a)` share one key.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Weighted undirected co-occurrence between two entities within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoOccurrenceEdge {
    /// Lexicographically smaller endpoint.
    pub source: String,
    pub target: String,
    /// Number of distinct documents mentioning both entities.
    pub weight: u32,
    pub period_label: String,
    /// Contributing document ids, capped at the configured length.
    pub documents: Vec<String>,
}

impl CoOccurrenceEdge {
    pub fn key(&self) -> (&str, &str) {
        (self.source.as_str(), self.target.as_str())
    }
}

/// Per-entity metadata used when assembling a period graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeAttributes {
    pub entity_type: EntityType,
    pub total_occurrences: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodNode {
    pub name: String,
    pub entity_type: EntityType,
    pub total_occurrences: u64,
    pub period_label: String,
}

/// Co-occurrence network for a single period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodGraph {
    period_label: String,
    nodes: BTreeMap<String, PeriodNode>,
    edges: Vec<CoOccurrenceEdge>,
}

impl PeriodGraph {
    pub(crate) fn new(
        period_label: String,
        nodes: BTreeMap<String, PeriodNode>,
        edges: Vec<CoOccurrenceEdge>,
    ) -> Self {
        Self {
            period_label,
            nodes,
            edges,
        }
    }

    pub fn empty(period_label: impl Into<String>) -> Self {
        Self::new(period_label.into(), BTreeMap::new(), Vec::new())
    }

    pub fn period_label(&self) -> &str {
        &self.period_label
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PeriodNode> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&PeriodNode> {
        self.nodes.get(name)
    }

    pub fn edges(&self) -> &[CoOccurrenceEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn density(&self) -> f64 {
        density(self.node_count(), self.edge_count())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedNode {
    pub name: String,
    /// Type from the first period the entity appeared in.
    pub entity_type: EntityType,
    /// Periods in processing order, without duplicates.
    pub periods_present: Vec<String>,
    pub total_occurrences: u64,
    pub period_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedEdge {
    pub source: String,
    pub target: String,
    pub periods: Vec<String>,
    pub total_weight: u64,
}

/// Union of all period graphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedGraph {
    period_order: Vec<String>,
    nodes: BTreeMap<String, CombinedNode>,
    edges: BTreeMap<(String, String), CombinedEdge>,
}

impl CombinedGraph {
    pub(crate) fn new(
        period_order: Vec<String>,
        nodes: BTreeMap<String, CombinedNode>,
        edges: BTreeMap<(String, String), CombinedEdge>,
    ) -> Self {
        Self {
            period_order,
            nodes,
            edges,
        }
    }

    /// Period labels in the order the merger processed them.
    pub fn period_order(&self) -> &[String] {
        &self.period_order
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CombinedNode> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&CombinedNode> {
        self.nodes.get(name)
    }

    pub fn edges(&self) -> impl Iterator<Item = &CombinedEdge> {
        self.edges.values()
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&CombinedEdge> {
        let (a, b) = canonical_pair(a, b);
        self.edges.get(&(a.to_string(), b.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn density(&self) -> f64 {
        density(self.node_count(), self.edge_count())
    }
}

fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    let n = nodes as f64;
    2.0 * edges as f64 / (n * (n - 1.0))
}

// ---------------------------------------------------------------------------
// Algorithm view
// ---------------------------------------------------------------------------

/// Read-only weighted view shared by community detection, centrality and layout.
pub trait Network {
    /// Node names in a stable order.
    fn node_names(&self) -> Vec<&str>;

    /// Undirected weighted edges, each listed once.
    fn weighted_edges(&self) -> Vec<(&str, &str, f64)>;
}

impl Network for PeriodGraph {
    fn node_names(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    fn weighted_edges(&self) -> Vec<(&str, &str, f64)> {
        self.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.weight as f64))
            .collect()
    }
}

impl Network for CombinedGraph {
    fn node_names(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    fn weighted_edges(&self) -> Vec<(&str, &str, f64)> {
        self.edges
            .values()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.total_weight as f64))
            .collect()
    }
}

/// Dense index-based adjacency built from any `Network`.
#[derive(Debug, Clone)]
pub struct IndexedGraph {
    pub names: Vec<String>,
    /// Neighbour lists as `(index, weight)`; each undirected edge appears in both lists.
    pub adjacency: Vec<Vec<(usize, f64)>>,
    /// Sum of edge weights (each undirected edge counted once).
    pub total_weight: f64,
    pub edge_count: usize,
}

impl IndexedGraph {
    pub fn from_network<N: Network + ?Sized>(network: &N) -> Self {
        let names: Vec<String> = network
            .node_names()
            .into_iter()
            .map(String::from)
            .collect();
        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); names.len()];
        let mut total_weight = 0.0;
        let mut edge_count = 0;

        for (a, b, w) in network.weighted_edges() {
            let (Some(&i), Some(&j)) = (index.get(a), index.get(b)) else {
                continue;
            };
            if i == j {
                continue;
            }
            adjacency[i].push((j, w));
            adjacency[j].push((i, w));
            total_weight += w;
            edge_count += 1;
        }

        Self {
            names,
            adjacency,
            total_weight,
            edge_count,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Weighted degree of node `i`.
    pub fn strength(&self, i: usize) -> f64 {
        self.adjacency[i].iter().map(|(_, w)| w).sum()
    }

    /// Unweighted degree of node `i`.
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(a: &str, b: &str, w: u32) -> CoOccurrenceEdge {
        let (s, t) = canonical_pair(a, b);
        CoOccurrenceEdge {
            source: s.to_string(),
            target: t.to_string(),
            weight: w,
            period_label: "p".to_string(),
            documents: vec![],
        }
    }

    fn node(name: &str) -> (String, PeriodNode) {
        (
            name.to_string(),
            PeriodNode {
                name: name.to_string(),
                entity_type: EntityType::Unknown,
                total_occurrences: 0,
                period_label: "p".to_string(),
            },
        )
    }

    #[test]
    fn test_canonical_pair_orders() {
        assert_eq!(canonical_pair("b", "a"), ("a", "b"));
        assert_eq!(canonical_pair("a", "b"), ("a", "b"));
    }

    #[test]
    fn test_density() {
        let graph = PeriodGraph::new(
            "p".into(),
            [node("a"), node("b"), node("c")].into_iter().collect(),
            vec![edge("a", "b", 2), edge("b", "c", 2)],
        );
        assert!((graph.density() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(PeriodGraph::empty("p").density(), 0.0);
    }

    #[test]
    fn test_indexed_graph_symmetric_adjacency() {
        let graph = PeriodGraph::new(
            "p".into(),
            [node("a"), node("b"), node("c")].into_iter().collect(),
            vec![edge("a", "b", 2), edge("b", "c", 3)],
        );
        let indexed = IndexedGraph::from_network(&graph);
        assert_eq!(indexed.names, vec!["a", "b", "c"]);
        assert_eq!(indexed.degree(1), 2);
        assert_eq!(indexed.strength(1), 5.0);
        assert_eq!(indexed.total_weight, 5.0);
        assert_eq!(indexed.edge_count, 2);
    }
}
