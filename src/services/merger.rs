//! Temporal merge of per-period graphs into one combined graph.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::graph::{CombinedEdge, CombinedGraph, CombinedNode, PeriodGraph};

/// Union all period graphs, in the order given.
///
/// Edge weights are summed into `total_weight` and period labels appended in
/// processing order. A node keeps the entity type from the first period it was
/// seen in; conflicting types from later periods are ignored.
pub fn merge_period_graphs(graphs: &[PeriodGraph]) -> CombinedGraph {
    let mut nodes: BTreeMap<String, CombinedNode> = BTreeMap::new();
    let mut edges: BTreeMap<(String, String), CombinedEdge> = BTreeMap::new();
    let period_order: Vec<String> = graphs.iter().map(|g| g.period_label().to_string()).collect();

    for graph in graphs {
        let period = graph.period_label();

        for node in graph.nodes() {
            match nodes.get_mut(&node.name) {
                Some(existing) => {
                    if existing.entity_type != node.entity_type {
                        debug!(
                            entity = %node.name,
                            kept = %existing.entity_type,
                            ignored = %node.entity_type,
                            period,
                            "Entity type conflict across periods"
                        );
                    }
                    if !existing.periods_present.iter().any(|p| p == period) {
                        existing.periods_present.push(period.to_string());
                        existing.period_count += 1;
                    }
                    existing.total_occurrences += node.total_occurrences;
                }
                None => {
                    nodes.insert(
                        node.name.clone(),
                        CombinedNode {
                            name: node.name.clone(),
                            entity_type: node.entity_type,
                            periods_present: vec![period.to_string()],
                            total_occurrences: node.total_occurrences,
                            period_count: 1,
                        },
                    );
                }
            }
        }

        for edge in graph.edges() {
            let key = (edge.source.clone(), edge.target.clone());
            let combined = edges.entry(key).or_insert_with(|| CombinedEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                periods: Vec::new(),
                total_weight: 0,
            });
            combined.total_weight += u64::from(edge.weight);
            combined.periods.push(period.to_string());
        }
    }

    info!(
        periods = period_order.len(),
        nodes = nodes.len(),
        edges = edges.len(),
        "Merged period graphs"
    );

    CombinedGraph::new(period_order, nodes, edges)
}
