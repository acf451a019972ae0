//! Period graph assembly.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::graph::{CoOccurrenceEdge, NodeAttributes, PeriodGraph, PeriodNode};
use crate::models::mention::Mention;

/// Derive per-entity attributes from one period's mentions.
///
/// The first observed type wins; occurrence counts are summed.
pub fn entity_attributes(mentions: &[Mention]) -> BTreeMap<String, NodeAttributes> {
    let mut attributes: BTreeMap<String, NodeAttributes> = BTreeMap::new();
    for m in mentions {
        attributes
            .entry(m.entity_name.clone())
            .and_modify(|attr| attr.total_occurrences += m.occurrence_count)
            .or_insert(NodeAttributes {
                entity_type: m.entity_type,
                total_occurrences: m.occurrence_count,
            });
    }
    attributes
}

/// Build a period graph from surviving edges.
///
/// Only entities touching at least one edge become nodes. Entities without an
/// attribute entry get `NodeAttributes::default()` (Unknown, 0 occurrences).
pub fn assemble_period_graph(
    period_label: &str,
    edges: Vec<CoOccurrenceEdge>,
    attributes: &BTreeMap<String, NodeAttributes>,
) -> PeriodGraph {
    let mut nodes: BTreeMap<String, PeriodNode> = BTreeMap::new();

    for edge in &edges {
        for name in [&edge.source, &edge.target] {
            if nodes.contains_key(name) {
                continue;
            }
            let attr = attributes.get(name).copied().unwrap_or_default();
            nodes.insert(
                name.clone(),
                PeriodNode {
                    name: name.clone(),
                    entity_type: attr.entity_type,
                    total_occurrences: attr.total_occurrences,
                    period_label: period_label.to_string(),
                },
            );
        }
    }

    debug!(
        period = period_label,
        nodes = nodes.len(),
        edges = edges.len(),
        "Assembled period graph"
    );

    PeriodGraph::new(period_label.to_string(), nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mention::EntityType;

    fn edge(a: &str, b: &str) -> CoOccurrenceEdge {
        CoOccurrenceEdge {
            source: a.to_string(),
            target: b.to_string(),
            weight: 2,
            period_label: "p1".to_string(),
            documents: vec![],
        }
    }

    #[test]
    fn test_entity_attributes_first_type_and_sum() {
        let mentions = vec![
            Mention::new("d1", "Paris", EntityType::Location, "p1", 2),
            Mention::new("d2", "Paris", EntityType::Person, "p1", 3),
        ];
        let attrs = entity_attributes(&mentions);
        let paris = attrs.get("Paris").unwrap();
        assert_eq!(paris.entity_type, EntityType::Location);
        assert_eq!(paris.total_occurrences, 5);
    }

    #[test]
    fn test_nodes_only_from_edges() {
        let mentions = vec![
            Mention::new("d1", "A", EntityType::Person, "p1", 1),
            Mention::new("d1", "B", EntityType::Organization, "p1", 1),
            Mention::new("d9", "Lonely", EntityType::Person, "p1", 50),
        ];
        let attrs = entity_attributes(&mentions);
        let graph = assemble_period_graph("p1", vec![edge("A", "B")], &attrs);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("Lonely").is_none());
        assert_eq!(graph.node("B").unwrap().entity_type, EntityType::Organization);
    }

    #[test]
    fn test_missing_attributes_default() {
        let graph = assemble_period_graph("p1", vec![edge("X", "Y")], &BTreeMap::new());
        let x = graph.node("X").unwrap();
        assert_eq!(x.entity_type, EntityType::Unknown);
        assert_eq!(x.total_occurrences, 0);
        assert_eq!(x.period_label, "p1");
    }

    #[test]
    fn test_no_edges_gives_empty_graph() {
        let graph = assemble_period_graph("p1", vec![], &BTreeMap::new());
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }
}
