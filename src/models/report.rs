//! Output tables handed to renderers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::graph::{CoOccurrenceEdge, CombinedEdge};
use crate::models::mention::EntityType;

/// One row per (entity, period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub entity_name: String,
    pub period_label: String,
    pub entity_type: EntityType,
    pub total_occurrences: u64,
    pub degree: usize,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub composite_score: f64,
    pub community_id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One row per edge. Period edges carry a single label; combined edges list
/// every contributing period in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRecord {
    pub source_entity: String,
    pub target_entity: String,
    pub weight: u64,
    pub period_labels: Vec<String>,
}

impl From<&CoOccurrenceEdge> for EdgeRecord {
    fn from(edge: &CoOccurrenceEdge) -> Self {
        Self {
            source_entity: edge.source.clone(),
            target_entity: edge.target.clone(),
            weight: u64::from(edge.weight),
            period_labels: vec![edge.period_label.clone()],
        }
    }
}

impl From<&CombinedEdge> for EdgeRecord {
    fn from(edge: &CombinedEdge) -> Self {
        Self {
            source_entity: edge.source.clone(),
            target_entity: edge.target.clone(),
            weight: edge.total_weight,
            period_labels: edge.periods.clone(),
        }
    }
}

/// Per-period (or combined) network statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period_label: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub community_count: usize,
    pub modularity: f64,
    /// Standard deviation of modularity across trials.
    pub modularity_stability: f64,
    pub mean_trial_modularity: f64,
    /// False when the period produced no nodes.
    pub analyzable: bool,
}

/// Everything a renderer needs, in one serialisable document.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub periods: Vec<String>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub combined_edges: Vec<EdgeRecord>,
    pub summary: Vec<PeriodSummary>,
    pub combined_summary: PeriodSummary,
}
