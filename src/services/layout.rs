//! Layered 3-D layout.
//!
//! A single Fruchterman-Reingold embedding of the combined graph supplies
//! (x, y) for every entity, so an entity sits at the same spot in every
//! period. Each period then occupies its own horizontal band: z is the band's
//! base offset plus the node's composite centrality times `elevation_scale`.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::models::graph::{IndexedGraph, Network, PeriodGraph};
use crate::services::centrality::CentralityScores;

const MIN_DISTANCE: f64 = 0.01;
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Shared 2-D coordinates, rescaled into [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embedding {
    positions: BTreeMap<String, (f64, f64)>,
}

impl Embedding {
    pub fn position(&self, name: &str) -> Option<(f64, f64)> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, (f64, f64))> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Final 3-D placement of one entity within one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPosition {
    pub entity_name: String,
    pub period_label: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Optimal pairwise distance, shrinking with graph size but bounded below.
pub fn optimal_distance(node_count: usize, k_floor: f64) -> f64 {
    if node_count == 0 {
        return k_floor.max(1.0);
    }
    (1.0 / (node_count as f64).sqrt()).max(k_floor)
}

fn dense_weights(graph: &IndexedGraph) -> Array2<f64> {
    let n = graph.len();
    let mut weights = Array2::<f64>::zeros((n, n));
    for (i, neighbours) in graph.adjacency.iter().enumerate() {
        for &(j, w) in neighbours {
            weights[[i, j]] = w;
        }
    }
    weights
}

/// Centre on the mean and scale so the largest absolute coordinate is 1.
fn rescale(pos: &mut Array2<f64>) {
    if pos.nrows() == 0 {
        return;
    }
    if let Some(center) = pos.mean_axis(Axis(0)) {
        for mut row in pos.rows_mut() {
            row -= &center;
        }
    }
    let lim = pos.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if lim > 0.0 {
        pos.mapv_inplace(|v| v / lim);
    }
}

/// Force-directed embedding of any network with an explicit seed.
pub fn spring_layout<N: Network + ?Sized>(network: &N, config: &LayoutConfig) -> Embedding {
    let graph = IndexedGraph::from_network(network);
    let n = graph.len();

    if n == 0 {
        return Embedding {
            positions: BTreeMap::new(),
        };
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos = Array2::<f64>::from_shape_fn((n, 2), |_| rng.gen::<f64>());

    if n > 1 {
        let weights = dense_weights(&graph);
        let k = optimal_distance(n, config.k_floor);
        let spread_x = pos.column(0).fold(f64::MIN, |a, &v| a.max(v))
            - pos.column(0).fold(f64::MAX, |a, &v| a.min(v));
        let spread_y = pos.column(1).fold(f64::MIN, |a, &v| a.max(v))
            - pos.column(1).fold(f64::MAX, |a, &v| a.min(v));
        let mut temperature = spread_x.max(spread_y) * 0.1;
        let cooling = temperature / (config.iterations as f64 + 1.0);

        for iteration in 0..config.iterations {
            let mut displacement = Array2::<f64>::zeros((n, 2));

            for i in 0..n {
                let mut force = Array1::<f64>::zeros(2);
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[[i, 0]] - pos[[j, 0]];
                    let dy = pos[[i, 1]] - pos[[j, 1]];
                    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let magnitude =
                        k * k / (distance * distance) - weights[[i, j]] * distance / k;
                    force[0] += dx * magnitude;
                    force[1] += dy * magnitude;
                }
                displacement.row_mut(i).assign(&force);
            }

            let mut total_step = 0.0;
            for i in 0..n {
                let mut row = displacement.row_mut(i);
                let length = (row[0] * row[0] + row[1] * row[1]).sqrt().max(MIN_DISTANCE);
                row.mapv_inplace(|v| v * temperature / length);
                total_step += (row[0] * row[0] + row[1] * row[1]).sqrt();
            }

            pos += &displacement;
            temperature -= cooling;

            if total_step / (n as f64) < CONVERGENCE_THRESHOLD {
                debug!(iteration, "Spring layout converged");
                break;
            }
        }
    }

    rescale(&mut pos);

    let positions = graph
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), (pos[[i, 0]], pos[[i, 1]])))
        .collect();

    Embedding { positions }
}

/// Base z for a period band: an explicit offset if configured, otherwise
/// `index * layer_spacing`.
pub fn base_offset(period_label: &str, period_index: usize, config: &LayoutConfig) -> f64 {
    config
        .base_offsets
        .get(period_label)
        .copied()
        .unwrap_or(period_index as f64 * config.layer_spacing)
}

/// Place every node of one period graph in 3-D.
///
/// Nodes missing from the embedding sit at (0, 0); nodes missing a centrality
/// entry get no elevation. An empty period yields no positions.
pub fn place_period(
    graph: &PeriodGraph,
    period_index: usize,
    embedding: &Embedding,
    centrality: &BTreeMap<String, CentralityScores>,
    config: &LayoutConfig,
) -> Vec<LayoutPosition> {
    let base = base_offset(graph.period_label(), period_index, config);

    graph
        .nodes()
        .map(|node| {
            let (x, y) = embedding.position(&node.name).unwrap_or((0.0, 0.0));
            let elevation = centrality
                .get(&node.name)
                .map(|s| s.composite_score)
                .unwrap_or(0.0);
            LayoutPosition {
                entity_name: node.name.clone(),
                period_label: graph.period_label().to_string(),
                x: x * config.xy_scale,
                y: y * config.xy_scale,
                z: base + elevation * config.elevation_scale,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoOccurrenceConfig;
    use crate::models::mention::{EntityType, Mention};
    use crate::services::assembler::{assemble_period_graph, entity_attributes};
    use crate::services::centrality::compute_centrality;
    use crate::services::cooccurrence::build_edges;
    use crate::services::merger::merge_period_graphs;

    fn period(label: &str, pairs: &[(&str, &str)]) -> PeriodGraph {
        let mentions: Vec<Mention> = pairs
            .iter()
            .enumerate()
            .flat_map(|(i, (a, b))| {
                let doc = format!("{label}-d{i}");
                vec![
                    Mention::new(doc.clone(), *a, EntityType::Person, label, 1),
                    Mention::new(doc, *b, EntityType::Person, label, 1),
                ]
            })
            .collect();
        let config = CoOccurrenceConfig {
            min_weight: 1,
            ..Default::default()
        };
        let edges = build_edges(label, &mentions, &config);
        assemble_period_graph(label, edges, &entity_attributes(&mentions))
    }

    #[test]
    fn test_optimal_distance_floor() {
        assert!((optimal_distance(4, 0.01) - 0.5).abs() < 1e-12);
        assert_eq!(optimal_distance(1_000_000, 0.05), 0.05);
    }

    #[test]
    fn test_layout_is_reproducible() {
        let graph = period("p1", &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A"), ("A", "C")]);
        let config = LayoutConfig::default();
        let first = spring_layout(&graph, &config);
        let second = spring_layout(&graph, &config);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_layout_is_rescaled() {
        let graph = period("p1", &[("A", "B"), ("B", "C"), ("C", "D")]);
        let embedding = spring_layout(&graph, &LayoutConfig::default());
        let mut max_abs: f64 = 0.0;
        for (_, (x, y)) in embedding.iter() {
            assert!(x.is_finite() && y.is_finite());
            max_abs = max_abs.max(x.abs()).max(y.abs());
        }
        assert!((max_abs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_connected_nodes_closer_than_disconnected() {
        let graph = period(
            "p1",
            &[("A", "B"), ("B", "C"), ("A", "C"), ("X", "Y"), ("Y", "Z"), ("X", "Z")],
        );
        let embedding = spring_layout(&graph, &LayoutConfig::default());
        let dist = |a: &str, b: &str| {
            let (ax, ay) = embedding.position(a).unwrap();
            let (bx, by) = embedding.position(b).unwrap();
            ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
        };
        assert!(dist("A", "B") < dist("A", "X"));
    }

    #[test]
    fn test_empty_layout() {
        let empty = period("p1", &[]);
        assert!(spring_layout(&empty, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_place_period_bands() {
        let p1 = period("2019", &[("A", "B")]);
        let p2 = period("2020", &[("A", "B"), ("B", "C")]);
        let combined = merge_period_graphs(&[p1.clone(), p2.clone()]);
        let config = LayoutConfig::default();
        let embedding = spring_layout(&combined, &config);

        let first = place_period(&p1, 0, &embedding, &compute_centrality(&p1).unwrap(), &config);
        let second = place_period(&p2, 1, &embedding, &compute_centrality(&p2).unwrap(), &config);

        let a0 = first.iter().find(|p| p.entity_name == "A").unwrap();
        let a1 = second.iter().find(|p| p.entity_name == "A").unwrap();
        assert_eq!((a0.x, a0.y), (a1.x, a1.y), "x,y shared across periods");
        assert!(a0.z >= 0.0 && a0.z <= config.elevation_scale);
        assert!(a1.z >= config.layer_spacing);

        let b1 = second.iter().find(|p| p.entity_name == "B").unwrap();
        assert!(b1.z > a1.z, "hub is lifted above the periphery");
    }

    #[test]
    fn test_explicit_base_offset_and_missing_embedding() {
        let p = period("2021", &[("A", "B")]);
        let mut config = LayoutConfig::default();
        config.base_offsets.insert("2021".to_string(), 100.0);
        let empty = spring_layout(&PeriodGraph::empty("none"), &config);
        let positions = place_period(&p, 3, &empty, &BTreeMap::new(), &config);
        assert_eq!(positions.len(), 2);
        for pos in positions {
            assert_eq!((pos.x, pos.y, pos.z), (0.0, 0.0, 100.0));
        }
    }
}
