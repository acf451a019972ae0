//! Per-period centrality and the composite importance score.
//!
//! composite = 0.4 * degree_centrality + 0.3 * betweenness + 0.3 * normalized_degree
//!
//! `degree_centrality` and `normalized_degree` are both derived from raw
//! degree (divided by n-1 and min-max rescaled respectively), so degree is
//! effectively counted twice. The weights are kept as-is for compatibility
//! with existing renderings.

use graphrs::{algorithms::centrality, Edge, Graph, GraphSpecs, Node};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::graph::{IndexedGraph, Network};
use crate::utils::math::{finite_or_zero, min_max_normalize};
use crate::CooccurError;

pub const DEGREE_WEIGHT: f64 = 0.4;
pub const BETWEENNESS_WEIGHT: f64 = 0.3;
pub const NORMALIZED_DEGREE_WEIGHT: f64 = 0.3;

/// Centrality scores for one node within one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityScores {
    pub degree: usize,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub normalized_degree: f64,
    pub composite_score: f64,
}

pub fn composite_score(degree_centrality: f64, betweenness: f64, normalized_degree: f64) -> f64 {
    DEGREE_WEIGHT * degree_centrality
        + BETWEENNESS_WEIGHT * betweenness
        + NORMALIZED_DEGREE_WEIGHT * normalized_degree
}

/// Normalised unweighted betweenness via graphrs.
///
/// Graphs with fewer than three nodes or no edges have no intermediate nodes,
/// so every score is zero without consulting the library.
fn betweenness_scores(graph: &IndexedGraph) -> Result<HashMap<String, f64>, CooccurError> {
    if graph.len() < 3 || graph.edge_count == 0 {
        return Ok(graph.names.iter().map(|n| (n.clone(), 0.0)).collect());
    }

    let mut g = Graph::<String, ()>::new(GraphSpecs::undirected());
    for name in &graph.names {
        g.add_node(Node::from_name(name.clone()));
    }
    for (i, neighbours) in graph.adjacency.iter().enumerate() {
        for &(j, _) in neighbours {
            if i < j {
                let edge = Edge::new(graph.names[i].clone(), graph.names[j].clone());
                if let Err(e) = g.add_edge(edge) {
                    return Err(CooccurError::Graph(format!("Failed to add edge: {:?}", e)));
                }
            }
        }
    }

    match centrality::betweenness::betweenness_centrality(&g, false, true) {
        Ok(scores) => Ok(scores),
        Err(e) => Err(CooccurError::Graph(format!(
            "Betweenness centrality error: {:?}",
            e
        ))),
    }
}

/// Compute degree, betweenness, normalized degree and composite score for
/// every node of `network`.
pub fn compute_centrality<N: Network + ?Sized>(
    network: &N,
) -> Result<BTreeMap<String, CentralityScores>, CooccurError> {
    let graph = IndexedGraph::from_network(network);
    let n = graph.len();
    if n == 0 {
        return Ok(BTreeMap::new());
    }

    let degrees: Vec<usize> = (0..n).map(|i| graph.degree(i)).collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0) as f64;
    let max_degree = degrees.iter().copied().max().unwrap_or(0) as f64;
    let betweenness = betweenness_scores(&graph)?;

    let scores = graph
        .names
        .iter()
        .zip(degrees)
        .map(|(name, degree)| {
            let degree_centrality = if n > 1 {
                degree as f64 / (n - 1) as f64
            } else {
                0.0
            };
            let betweenness_centrality =
                finite_or_zero(betweenness.get(name).copied().unwrap_or(0.0));
            let normalized_degree = min_max_normalize(degree as f64, min_degree, max_degree);

            (
                name.clone(),
                CentralityScores {
                    degree,
                    degree_centrality,
                    betweenness_centrality,
                    normalized_degree,
                    composite_score: composite_score(
                        degree_centrality,
                        betweenness_centrality,
                        normalized_degree,
                    ),
                },
            )
        })
        .collect();

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoOccurrenceConfig;
    use crate::models::graph::PeriodGraph;
    use crate::models::mention::{EntityType, Mention};
    use crate::services::assembler::{assemble_period_graph, entity_attributes};
    use crate::services::cooccurrence::build_edges;

    fn graph_from_docs(docs: &[(&str, &[&str])], min_weight: u32) -> PeriodGraph {
        let mentions: Vec<Mention> = docs
            .iter()
            .flat_map(|(doc, names)| {
                names
                    .iter()
                    .map(move |name| Mention::new(*doc, *name, EntityType::Person, "p1", 1))
            })
            .collect();
        let config = CoOccurrenceConfig {
            min_weight,
            ..Default::default()
        };
        let edges = build_edges("p1", &mentions, &config);
        assemble_period_graph("p1", edges, &entity_attributes(&mentions))
    }

    #[test]
    fn test_composite_weights() {
        assert!((composite_score(1.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((composite_score(0.5, 0.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_literal_scenario_degrees() {
        let graph = graph_from_docs(
            &[
                ("doc1", &["A", "B"]),
                ("doc2", &["A", "B", "C"]),
                ("doc3", &["B", "C"]),
            ],
            2,
        );
        let scores = compute_centrality(&graph).unwrap();
        assert_eq!(scores["A"].degree, 1);
        assert_eq!(scores["B"].degree, 2);
        assert_eq!(scores["C"].degree, 1);

        assert!((scores["B"].degree_centrality - 1.0).abs() < 1e-12);
        assert!((scores["A"].degree_centrality - 0.5).abs() < 1e-12);
        assert_eq!(scores["B"].normalized_degree, 1.0);
        assert_eq!(scores["A"].normalized_degree, 0.0);

        assert!(scores["B"].betweenness_centrality > 0.0);
        assert_eq!(scores["A"].betweenness_centrality, 0.0);
        assert!(scores["B"].composite_score > scores["A"].composite_score);
        assert_eq!(scores["A"].composite_score, scores["C"].composite_score);
    }

    #[test]
    fn test_empty_graph() {
        let scores = compute_centrality(&PeriodGraph::empty("p1")).unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn test_single_pair_has_zero_betweenness() {
        let graph = graph_from_docs(&[("d1", &["A", "B"])], 1);
        let scores = compute_centrality(&graph).unwrap();
        assert_eq!(scores.len(), 2);
        for s in scores.values() {
            assert_eq!(s.degree, 1);
            assert_eq!(s.degree_centrality, 1.0);
            assert_eq!(s.betweenness_centrality, 0.0);
            assert_eq!(s.normalized_degree, 0.0);
            assert!((s.composite_score - 0.4).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scores_are_finite_and_bounded() {
        let graph = graph_from_docs(
            &[
                ("d1", &["A", "B", "C"]),
                ("d2", &["C", "D"]),
                ("d3", &["D", "E", "F"]),
                ("d4", &["F", "A"]),
            ],
            1,
        );
        for s in compute_centrality(&graph).unwrap().values() {
            assert!(s.composite_score.is_finite());
            assert!((0.0..=1.0).contains(&s.composite_score));
            assert!((0.0..=1.0).contains(&s.betweenness_centrality));
        }
    }
}
