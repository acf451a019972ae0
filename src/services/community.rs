//! Consensus community detection.
//!
//! Runs seeded Louvain modularity optimisation `trials` times (trial `i` uses
//! seed `i`), then assigns every node the label it received most often across
//! runs. The spread of per-run modularity is reported as a stability signal:
//! a high standard deviation means the community structure depends heavily on
//! the random visiting order.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CommunityConfig;
use crate::models::graph::{IndexedGraph, Network};
use crate::utils::math::{finite_or_zero, mean, std_dev};

/// One seeded Louvain trial. Labels are indexed like `IndexedGraph::names`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityRun {
    pub seed: u64,
    pub labels: Vec<usize>,
    pub modularity: f64,
}

/// Plurality-vote partition across all trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusPartition {
    pub assignments: BTreeMap<String, usize>,
    /// Modularity of the consensus labelling on the input graph.
    pub modularity: f64,
    pub mean_modularity: f64,
    /// Standard deviation of per-trial modularity.
    pub modularity_std_dev: f64,
    pub trial_modularities: Vec<f64>,
    /// community id -> member count
    pub community_sizes: BTreeMap<usize, usize>,
    pub community_count: usize,
    pub trials_run: usize,
    /// False for graphs with no nodes.
    pub analyzable: bool,
}

impl ConsensusPartition {
    fn empty() -> Self {
        Self {
            assignments: BTreeMap::new(),
            modularity: 0.0,
            mean_modularity: 0.0,
            modularity_std_dev: 0.0,
            trial_modularities: Vec::new(),
            community_sizes: BTreeMap::new(),
            community_count: 0,
            trials_run: 0,
            analyzable: false,
        }
    }

    pub fn community_of(&self, node: &str) -> Option<usize> {
        self.assignments.get(node).copied()
    }
}

// ---------------------------------------------------------------------------
// Modularity
// ---------------------------------------------------------------------------

/// Newman modularity of `labels` on `graph` with resolution `gamma`.
///
/// Q = sum_c [ L_c / m - gamma * (d_c / 2m)^2 ], where L_c is the internal edge
/// weight of community c and d_c the summed strength of its members.
pub fn modularity(graph: &IndexedGraph, labels: &[usize], gamma: f64) -> f64 {
    let m = graph.total_weight;
    if m <= 0.0 {
        return 0.0;
    }

    let slots = label_slots(labels);
    let mut internal = vec![0.0; slots];
    let mut strength = vec![0.0; slots];

    for (i, neighbours) in graph.adjacency.iter().enumerate() {
        let ci = labels[i];
        for &(j, w) in neighbours {
            strength[ci] += w;
            if i < j && labels[j] == ci {
                internal[ci] += w;
            }
        }
    }

    let q = sum_modularity_terms(&internal, &strength, m, gamma);

    finite_or_zero(q)
}

/// One accumulator slot per label value, so sums run in label order.
fn label_slots(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&max| max + 1)
}

fn sum_modularity_terms(internal: &[f64], strength: &[f64], m: f64, gamma: f64) -> f64 {
    internal
        .iter()
        .zip(strength)
        .filter(|&(_, &d)| d > 0.0)
        .map(|(&l, &d)| l / m - gamma * (d / (2.0 * m)).powi(2))
        .sum()
}

// ---------------------------------------------------------------------------
// Louvain
// ---------------------------------------------------------------------------

/// Working graph for one Louvain level. Node `i` may carry a self-loop of
/// weight `loops[i]` (internal weight of an aggregated community).
struct LevelGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
}

impl LevelGraph {
    fn from_indexed(graph: &IndexedGraph) -> Self {
        Self {
            adjacency: graph.adjacency.clone(),
            loops: vec![0.0; graph.len()],
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn strength(&self, i: usize) -> f64 {
        2.0 * self.loops[i] + self.adjacency[i].iter().map(|(_, w)| w).sum::<f64>()
    }

    fn modularity(&self, community: &[usize], m: f64, gamma: f64) -> f64 {
        let slots = label_slots(community);
        let mut internal = vec![0.0; slots];
        let mut total = vec![0.0; slots];
        for i in 0..self.len() {
            let c = community[i];
            total[c] += self.strength(i);
            internal[c] += self.loops[i];
            for &(j, w) in &self.adjacency[i] {
                if i < j && community[j] == c {
                    internal[c] += w;
                }
            }
        }
        sum_modularity_terms(&internal, &total, m, gamma)
    }

    /// Collapse each community into a single node.
    fn aggregate(&self, community: &[usize], count: usize) -> LevelGraph {
        let mut loops = vec![0.0; count];
        let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for i in 0..self.len() {
            let ci = community[i];
            loops[ci] += self.loops[i];
            for &(j, w) in &self.adjacency[i] {
                if i >= j {
                    continue;
                }
                let cj = community[j];
                if ci == cj {
                    loops[ci] += w;
                } else {
                    *between.entry((ci.min(cj), ci.max(cj))).or_default() += w;
                }
            }
        }

        let mut adjacency = vec![Vec::new(); count];
        for ((a, b), w) in between {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }

        LevelGraph { adjacency, loops }
    }
}

/// Renumber labels to 0..k by first appearance. Returns the community count.
fn compact_labels(labels: &mut [usize]) -> usize {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for label in labels.iter_mut() {
        let next = mapping.len();
        *label = *mapping.entry(*label).or_insert(next);
    }
    mapping.len()
}

/// Greedy local moving phase. Returns true if any node changed community.
fn move_nodes(
    level: &LevelGraph,
    community: &mut [usize],
    m: f64,
    gamma: f64,
    rng: &mut StdRng,
) -> bool {
    let n = level.len();
    let strength: Vec<f64> = (0..n).map(|i| level.strength(i)).collect();
    let mut totals: Vec<f64> = vec![0.0; n];
    for i in 0..n {
        totals[community[i]] += strength[i];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut weights_to: Vec<f64> = vec![0.0; n];
    let mut is_touched: Vec<bool> = vec![false; n];
    let mut touched: Vec<usize> = Vec::new();
    let mut any_moved = false;
    let max_sweeps = 1000;

    for _ in 0..max_sweeps {
        let mut moved = 0usize;

        for &i in &order {
            let ci = community[i];
            let k_i = strength[i];

            for &(j, w) in &level.adjacency[i] {
                let cj = community[j];
                if !is_touched[cj] {
                    is_touched[cj] = true;
                    touched.push(cj);
                }
                weights_to[cj] += w;
            }

            totals[ci] -= k_i;
            let scale = gamma * k_i / (2.0 * m);
            let mut best = ci;
            let mut best_gain = weights_to[ci] - totals[ci] * scale;

            for &c in &touched {
                let gain = weights_to[c] - totals[c] * scale;
                if gain > best_gain + 1e-12 {
                    best = c;
                    best_gain = gain;
                }
            }

            totals[best] += k_i;
            if best != ci {
                community[i] = best;
                moved += 1;
            }

            for &c in &touched {
                weights_to[c] = 0.0;
                is_touched[c] = false;
            }
            touched.clear();
        }

        if moved == 0 {
            break;
        }
        any_moved = true;
    }

    any_moved
}

/// Run one seeded multi-level Louvain pass over `graph`.
pub fn louvain(graph: &IndexedGraph, config: &CommunityConfig, seed: u64) -> CommunityRun {
    let n = graph.len();
    let gamma = config.resolution;
    let m = graph.total_weight;
    let mut membership: Vec<usize> = (0..n).collect();

    if n == 0 || m <= 0.0 {
        return CommunityRun {
            seed,
            labels: membership,
            modularity: 0.0,
        };
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = LevelGraph::from_indexed(graph);
    let mut current_q = level.modularity(&(0..n).collect::<Vec<_>>(), m, gamma);

    for _ in 0..config.max_levels {
        let mut community: Vec<usize> = (0..level.len()).collect();
        if !move_nodes(&level, &mut community, m, gamma, &mut rng) {
            break;
        }
        let count = compact_labels(&mut community);

        for label in membership.iter_mut() {
            *label = community[*label];
        }

        let new_q = level.modularity(&community, m, gamma);
        let gain = new_q - current_q;
        current_q = new_q;
        if gain <= config.min_modularity_gain || count == level.len() {
            break;
        }
        level = level.aggregate(&community, count);
    }

    compact_labels(&mut membership);
    let q = modularity(graph, &membership, gamma);

    CommunityRun {
        seed,
        labels: membership,
        modularity: q,
    }
}

// ---------------------------------------------------------------------------
// Consensus
// ---------------------------------------------------------------------------

/// Plurality label per node across runs; ties go to the label seen first.
fn plurality_labels(node_count: usize, runs: &[CommunityRun]) -> Vec<usize> {
    (0..node_count)
        .map(|i| {
            let mut tally: Vec<(usize, usize)> = Vec::new();
            for run in runs {
                let Some(&label) = run.labels.get(i) else {
                    continue;
                };
                match tally.iter_mut().find(|(l, _)| *l == label) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((label, 1)),
                }
            }

            let mut best: Option<(usize, usize)> = None;
            for (label, count) in tally {
                if best.map_or(true, |(_, c)| count > c) {
                    best = Some((label, count));
                }
            }
            best.map(|(label, _)| label).unwrap_or(0)
        })
        .collect()
}

/// Final community ids: connected nodes keep their voted grouping, renumbered
/// by first appearance; every isolated node gets its own fresh id.
fn finalize_labels(graph: &IndexedGraph, voted: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut labels = vec![0usize; voted.len()];
    let mut next = 0usize;

    for i in 0..voted.len() {
        if graph.degree(i) == 0 {
            continue;
        }
        labels[i] = *mapping.entry(voted[i]).or_insert_with(|| {
            let id = next;
            next += 1;
            id
        });
    }
    for (i, label) in labels.iter_mut().enumerate() {
        if graph.degree(i) == 0 {
            *label = next;
            next += 1;
        }
    }
    labels
}

fn build_partition(
    graph: &IndexedGraph,
    labels: Vec<usize>,
    gamma: f64,
    trial_modularities: Vec<f64>,
) -> ConsensusPartition {
    let q = modularity(graph, &labels, gamma);

    let mut community_sizes: BTreeMap<usize, usize> = BTreeMap::new();
    for &label in &labels {
        *community_sizes.entry(label).or_default() += 1;
    }

    let assignments: BTreeMap<String, usize> = graph
        .names
        .iter()
        .cloned()
        .zip(labels)
        .collect();

    ConsensusPartition {
        assignments,
        modularity: q,
        mean_modularity: mean(&trial_modularities),
        modularity_std_dev: std_dev(&trial_modularities),
        community_count: community_sizes.len(),
        community_sizes,
        trials_run: trial_modularities.len(),
        trial_modularities,
        analyzable: true,
    }
}

/// Detect a consensus community partition for any graph.
pub fn detect_consensus<N: Network + ?Sized>(
    network: &N,
    config: &CommunityConfig,
) -> ConsensusPartition {
    let graph = IndexedGraph::from_network(network);

    if graph.is_empty() {
        debug!("Empty graph, community detection skipped");
        return ConsensusPartition::empty();
    }

    if graph.edge_count == 0 {
        debug!(nodes = graph.len(), "Edgeless graph, assigning singleton communities");
        let singletons: Vec<usize> = (0..graph.len()).collect();
        return build_partition(&graph, singletons, config.resolution, Vec::new());
    }

    let runs: Vec<CommunityRun> = (0..config.trials)
        .map(|trial| {
            let run = louvain(&graph, config, trial as u64);
            debug!(trial, modularity = run.modularity, "Louvain trial finished");
            run
        })
        .collect();

    let voted = plurality_labels(graph.len(), &runs);
    let labels = finalize_labels(&graph, &voted);
    let trial_modularities: Vec<f64> = runs.iter().map(|r| r.modularity).collect();

    let partition = build_partition(&graph, labels, config.resolution, trial_modularities);

    info!(
        nodes = graph.len(),
        communities = partition.community_count,
        modularity = partition.modularity,
        stability = partition.modularity_std_dev,
        "Consensus partition computed"
    );

    partition
}
