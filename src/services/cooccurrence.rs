//! Co-occurrence edge construction.
//!
//! Mentions are grouped by document; every document naming two or more
//! distinct entities contributes each unordered entity pair exactly once.
//! Pairs are then aggregated across documents and filtered by weight.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::CoOccurrenceConfig;
use crate::models::graph::{canonical_pair, CoOccurrenceEdge};
use crate::models::mention::Mention;

/// Split mentions into per-period batches.
///
/// Periods listed in `order` come first, in that order; any remaining periods
/// follow in first-seen order. Listed periods with no mentions still get an
/// (empty) batch so they show up downstream as zero-node periods.
pub fn group_by_period(mentions: &[Mention], order: &[String]) -> Vec<(String, Vec<Mention>)> {
    let mut seen: Vec<String> = order.to_vec();
    for m in mentions {
        if !seen.contains(&m.period_label) {
            seen.push(m.period_label.clone());
        }
    }

    seen.into_iter()
        .map(|period| {
            let batch = mentions
                .iter()
                .filter(|m| m.period_label == period)
                .cloned()
                .collect();
            (period, batch)
        })
        .collect()
}

struct PairTally<'a> {
    weight: u32,
    documents: Vec<&'a str>,
}

/// Build the co-occurrence edges for one period's mentions.
///
/// Returned edges are sorted by `(source, target)` and every edge satisfies
/// `weight >= config.min_weight` and `source < target`.
pub fn build_edges(
    period_label: &str,
    mentions: &[Mention],
    config: &CoOccurrenceConfig,
) -> Vec<CoOccurrenceEdge> {
    let mut documents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for m in mentions {
        documents
            .entry(m.document_id.as_str())
            .or_default()
            .insert(m.entity_name.as_str());
    }

    let mut tallies: BTreeMap<(&str, &str), PairTally<'_>> = BTreeMap::new();

    for (&doc_id, entities) in &documents {
        if entities.len() < 2 {
            continue;
        }
        let entities: Vec<&str> = entities.iter().copied().collect();
        for (i, &a) in entities.iter().enumerate() {
            for &b in &entities[i + 1..] {
                let tally = tallies
                    .entry(canonical_pair(a, b))
                    .or_insert_with(|| PairTally {
                        weight: 0,
                        documents: Vec::new(),
                    });
                tally.weight += 1;
                if tally.documents.len() < config.max_documents_per_edge {
                    tally.documents.push(doc_id);
                }
            }
        }
    }

    let candidate_count = tallies.len();
    let edges: Vec<CoOccurrenceEdge> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.weight >= config.min_weight)
        .map(|((source, target), tally)| CoOccurrenceEdge {
            source: source.to_string(),
            target: target.to_string(),
            weight: tally.weight,
            period_label: period_label.to_string(),
            documents: tally.documents.into_iter().map(String::from).collect(),
        })
        .collect();

    debug!(
        period = period_label,
        documents = documents.len(),
        candidates = candidate_count,
        kept = edges.len(),
        "Built co-occurrence edges"
    );

    edges
}
