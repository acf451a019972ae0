//! End-to-end network analysis.
//!
//! mentions -> per-period edges -> period graphs -> combined graph
//!          -> shared embedding + per-period centrality -> layered positions
//!          -> consensus communities (per period and combined)
//!
//! `analyze_mentions` is the pure batch entry point. `AnalysisService` wraps it
//! around a `MentionSource` so callers (CLI, tests) can swap where mentions
//! come from.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::io::source::MentionSource;
use crate::models::graph::{CombinedGraph, PeriodGraph};
use crate::models::mention::Mention;
use crate::models::report::{AnalysisReport, EdgeRecord, NodeRecord, PeriodSummary};
use crate::services::assembler::{assemble_period_graph, entity_attributes};
use crate::services::centrality::{compute_centrality, CentralityScores};
use crate::services::community::{detect_consensus, ConsensusPartition};
use crate::services::cooccurrence::{build_edges, group_by_period};
use crate::services::layout::{place_period, spring_layout, Embedding, LayoutPosition};
use crate::services::merger::merge_period_graphs;
use crate::CooccurError;

pub const COMBINED_LABEL: &str = "combined";

/// Results for one period.
#[derive(Debug, Clone)]
pub struct PeriodAnalysis {
    pub graph: PeriodGraph,
    pub centrality: BTreeMap<String, CentralityScores>,
    pub partition: ConsensusPartition,
    pub positions: Vec<LayoutPosition>,
}

impl PeriodAnalysis {
    pub fn period_label(&self) -> &str {
        self.graph.period_label()
    }

    pub fn summary(&self) -> PeriodSummary {
        summarize(
            self.period_label(),
            self.graph.node_count(),
            self.graph.edge_count(),
            self.graph.density(),
            &self.partition,
        )
    }
}

/// Full pipeline output.
#[derive(Debug, Clone)]
pub struct NetworkAnalysis {
    pub periods: Vec<PeriodAnalysis>,
    pub combined: CombinedGraph,
    pub combined_partition: ConsensusPartition,
    pub embedding: Embedding,
}

fn summarize(
    label: &str,
    node_count: usize,
    edge_count: usize,
    density: f64,
    partition: &ConsensusPartition,
) -> PeriodSummary {
    PeriodSummary {
        period_label: label.to_string(),
        node_count,
        edge_count,
        density,
        community_count: partition.community_count,
        modularity: partition.modularity,
        modularity_stability: partition.modularity_std_dev,
        mean_trial_modularity: partition.mean_modularity,
        analyzable: partition.analyzable,
    }
}

impl NetworkAnalysis {
    pub fn period(&self, label: &str) -> Option<&PeriodAnalysis> {
        self.periods.iter().find(|p| p.period_label() == label)
    }

    /// One row per (entity, period), periods in processing order.
    pub fn node_table(&self) -> Vec<NodeRecord> {
        let mut rows = Vec::new();
        for period in &self.periods {
            let positions: BTreeMap<&str, &LayoutPosition> = period
                .positions
                .iter()
                .map(|p| (p.entity_name.as_str(), p))
                .collect();

            for node in period.graph.nodes() {
                let scores = period.centrality.get(&node.name);
                let position = positions.get(node.name.as_str());
                rows.push(NodeRecord {
                    entity_name: node.name.clone(),
                    period_label: node.period_label.clone(),
                    entity_type: node.entity_type,
                    total_occurrences: node.total_occurrences,
                    degree: scores.map(|s| s.degree).unwrap_or(0),
                    degree_centrality: scores.map(|s| s.degree_centrality).unwrap_or(0.0),
                    betweenness_centrality: scores
                        .map(|s| s.betweenness_centrality)
                        .unwrap_or(0.0),
                    composite_score: scores.map(|s| s.composite_score).unwrap_or(0.0),
                    community_id: period.partition.community_of(&node.name).unwrap_or(0),
                    x: position.map(|p| p.x).unwrap_or(0.0),
                    y: position.map(|p| p.y).unwrap_or(0.0),
                    z: position.map(|p| p.z).unwrap_or(0.0),
                });
            }
        }
        rows
    }

    /// Per-period edges, periods in processing order.
    pub fn edge_table(&self) -> Vec<EdgeRecord> {
        self.periods
            .iter()
            .flat_map(|p| p.graph.edges())
            .map(EdgeRecord::from)
            .collect()
    }

    pub fn combined_edge_table(&self) -> Vec<EdgeRecord> {
        self.combined.edges().map(EdgeRecord::from).collect()
    }

    pub fn summary_table(&self) -> Vec<PeriodSummary> {
        self.periods.iter().map(|p| p.summary()).collect()
    }

    pub fn combined_summary(&self) -> PeriodSummary {
        summarize(
            COMBINED_LABEL,
            self.combined.node_count(),
            self.combined.edge_count(),
            self.combined.density(),
            &self.combined_partition,
        )
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            generated_at: Utc::now(),
            periods: self.combined.period_order().to_vec(),
            nodes: self.node_table(),
            edges: self.edge_table(),
            combined_edges: self.combined_edge_table(),
            summary: self.summary_table(),
            combined_summary: self.combined_summary(),
        }
    }
}

/// Build one graph per period, in processing order.
pub fn build_period_graphs(mentions: &[Mention], config: &PipelineConfig) -> Vec<PeriodGraph> {
    group_by_period(mentions, &config.periods)
        .into_iter()
        .map(|(label, batch)| {
            if batch.is_empty() {
                warn!(period = %label, "No mentions for period");
            }
            let edges = build_edges(&label, &batch, &config.cooccurrence);
            let attributes = entity_attributes(&batch);
            assemble_period_graph(&label, edges, &attributes)
        })
        .collect()
}

/// Run the whole pipeline on an in-memory batch of validated mentions.
pub fn analyze_mentions(
    mentions: &[Mention],
    config: &PipelineConfig,
) -> Result<NetworkAnalysis, CooccurError> {
    config.validate()?;

    info!(mentions = mentions.len(), "Starting network analysis");

    let graphs = build_period_graphs(mentions, config);
    let combined = merge_period_graphs(&graphs);
    let embedding = spring_layout(&combined, &config.layout);

    let mut periods = Vec::with_capacity(graphs.len());
    for (index, graph) in graphs.into_iter().enumerate() {
        let centrality = compute_centrality(&graph)?;
        let positions = place_period(&graph, index, &embedding, &centrality, &config.layout);
        let partition = detect_consensus(&graph, &config.community);

        info!(
            period = graph.period_label(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            communities = partition.community_count,
            "Period analysed"
        );

        periods.push(PeriodAnalysis {
            graph,
            centrality,
            partition,
            positions,
        });
    }

    let combined_partition = detect_consensus(&combined, &config.community);

    Ok(NetworkAnalysis {
        periods,
        combined,
        combined_partition,
        embedding,
    })
}

// ---------------------------------------------------------------------------
// AnalysisService
// ---------------------------------------------------------------------------

/// Runs the pipeline against a pluggable mention source.
pub struct AnalysisService {
    source: Arc<dyn MentionSource>,
    config: PipelineConfig,
}

impl AnalysisService {
    pub fn with_source(source: Arc<dyn MentionSource>, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn load_mentions(&self) -> Result<Vec<Mention>, CooccurError> {
        let mentions = self.source.load_mentions().await?;
        info!(
            source = %self.source.describe(),
            mentions = mentions.len(),
            "Mentions loaded"
        );
        Ok(mentions)
    }

    /// Load mentions and run the full analysis.
    pub async fn analyze(&self) -> Result<NetworkAnalysis, CooccurError> {
        let mentions = self.load_mentions().await?;
        analyze_mentions(&mentions, &self.config)
    }

    /// Period graphs only, without communities or layout.
    pub async fn period_graphs(&self) -> Result<Vec<PeriodGraph>, CooccurError> {
        let mentions = self.load_mentions().await?;
        Ok(build_period_graphs(&mentions, &self.config))
    }

    /// Edges of one period, or of the combined graph when `period` is `None`.
    pub async fn edges(&self, period: Option<&str>) -> Result<Vec<EdgeRecord>, CooccurError> {
        let graphs = self.period_graphs().await?;
        match period {
            Some(label) => Ok(find_period(&graphs, label)?
                .edges()
                .iter()
                .map(EdgeRecord::from)
                .collect()),
            None => Ok(merge_period_graphs(&graphs)
                .edges()
                .map(EdgeRecord::from)
                .collect()),
        }
    }

    /// Consensus partition for one period, or for the combined graph when
    /// `period` is `None`.
    pub async fn communities(
        &self,
        period: Option<&str>,
    ) -> Result<(PeriodSummary, ConsensusPartition), CooccurError> {
        let graphs = self.period_graphs().await?;
        match period {
            Some(label) => {
                let graph = find_period(&graphs, label)?;
                let partition = detect_consensus(graph, &self.config.community);
                let summary = summarize(
                    label,
                    graph.node_count(),
                    graph.edge_count(),
                    graph.density(),
                    &partition,
                );
                Ok((summary, partition))
            }
            None => {
                let combined = merge_period_graphs(&graphs);
                let partition = detect_consensus(&combined, &self.config.community);
                let summary = summarize(
                    COMBINED_LABEL,
                    combined.node_count(),
                    combined.edge_count(),
                    combined.density(),
                    &partition,
                );
                Ok((summary, partition))
            }
        }
    }

    /// Centrality scores for one period, ranked by composite score.
    pub async fn centrality(
        &self,
        period: &str,
        limit: usize,
    ) -> Result<Vec<(String, CentralityScores)>, CooccurError> {
        let graphs = self.period_graphs().await?;
        let graph = find_period(&graphs, period)?;
        let mut ranked: Vec<(String, CentralityScores)> =
            compute_centrality(graph)?.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.composite_score
                .partial_cmp(&a.1.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}

pub fn find_period<'a>(graphs: &'a [PeriodGraph], label: &str) -> Result<&'a PeriodGraph, CooccurError> {
    graphs
        .iter()
        .find(|g| g.period_label() == label)
        .ok_or_else(|| {
            let known: Vec<&str> = graphs.iter().map(|g| g.period_label()).collect();
            CooccurError::Validation(format!(
                "Unknown period '{}' (known: {})",
                label,
                known.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mention::EntityType;

    fn m(doc: &str, name: &str, period: &str) -> Mention {
        Mention::new(doc, name, EntityType::Person, period, 1)
    }

    fn sample() -> Vec<Mention> {
        vec![
            m("d1", "A", "2019"),
            m("d1", "B", "2019"),
            m("d2", "A", "2019"),
            m("d2", "B", "2019"),
            m("d2", "C", "2019"),
            m("d3", "B", "2019"),
            m("d3", "C", "2019"),
            m("d4", "A", "2020"),
            m("d4", "D", "2020"),
            m("d5", "A", "2020"),
            m("d5", "D", "2020"),
        ]
    }

    #[test]
    fn test_analyze_mentions_tables() {
        let analysis = analyze_mentions(&sample(), &PipelineConfig::default()).unwrap();
        assert_eq!(analysis.periods.len(), 2);

        let nodes = analysis.node_table();
        assert_eq!(nodes.len(), 5); // A,B,C in 2019; A,D in 2020
        let b = nodes
            .iter()
            .find(|n| n.entity_name == "B" && n.period_label == "2019")
            .unwrap();
        assert_eq!(b.degree, 2);

        let edges = analysis.edge_table();
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.weight >= 2));

        let combined = analysis.combined_edge_table();
        assert_eq!(combined.len(), 3);

        let summary = analysis.summary_table();
        assert_eq!(summary[0].period_label, "2019");
        assert_eq!(summary[0].node_count, 3);
        assert_eq!(summary[1].edge_count, 1);
    }

    #[test]
    fn test_explicit_empty_period_is_flagged() {
        let config = PipelineConfig {
            periods: vec!["2018".to_string()],
            ..Default::default()
        };
        let analysis = analyze_mentions(&sample(), &config).unwrap();
        let empty = analysis.period("2018").unwrap();
        let summary = empty.summary();
        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.edge_count, 0);
        assert!(!summary.analyzable);
        assert!(empty.positions.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.community.trials = 0;
        assert!(analyze_mentions(&sample(), &config).is_err());
    }

    #[test]
    fn test_find_period_unknown() {
        let graphs = vec![PeriodGraph::empty("2019")];
        let err = find_period(&graphs, "2030").unwrap_err();
        assert!(err.to_string().contains("2019"));
    }
}
