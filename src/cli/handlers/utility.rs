//! Utility command handlers: validate.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::cli::output::{output_json_list, print_success, print_table, OutputMode};
use crate::models::mention::Mention;
use crate::services::cooccurrence::group_by_period;
use crate::services::AnalysisService;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PeriodCounts {
    pub period_label: String,
    pub mentions: usize,
    pub documents: usize,
    pub entities: usize,
}

/// Mention, document and distinct-entity counts per period, in processing order.
pub fn period_counts(mentions: &[Mention], order: &[String]) -> Vec<PeriodCounts> {
    group_by_period(mentions, order)
        .into_iter()
        .map(|(period_label, batch)| {
            let documents: BTreeSet<&str> = batch.iter().map(|m| m.document_id.as_str()).collect();
            let entities: BTreeSet<&str> = batch.iter().map(|m| m.entity_name.as_str()).collect();
            PeriodCounts {
                period_label,
                mentions: batch.len(),
                documents: documents.len(),
                entities: entities.len(),
            }
        })
        .collect()
}

pub async fn handle_validate(service: &AnalysisService, mode: OutputMode) -> Result<()> {
    let mentions = service
        .load_mentions()
        .await
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    let counts = period_counts(&mentions, &service.config().periods);

    if mode == OutputMode::Json {
        output_json_list(&counts);
        return Ok(());
    }

    let rows = counts
        .iter()
        .map(|c| {
            vec![
                c.period_label.clone(),
                c.mentions.to_string(),
                c.documents.to_string(),
                c.entities.to_string(),
            ]
        })
        .collect();
    print_table(&["Period", "Mentions", "Documents", "Entities"], rows);
    print_success(&format!(
        "{} mentions across {} periods are valid",
        mentions.len(),
        counts.len()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mention::EntityType;

    #[test]
    fn test_period_counts() {
        let mentions = vec![
            Mention::new("d1", "A", EntityType::Person, "2020", 1),
            Mention::new("d1", "B", EntityType::Person, "2020", 1),
            Mention::new("d2", "A", EntityType::Person, "2020", 2),
            Mention::new("d3", "A", EntityType::Person, "2019", 1),
        ];
        let counts = period_counts(&mentions, &["2019".to_string()]);
        assert_eq!(
            counts,
            vec![
                PeriodCounts {
                    period_label: "2019".to_string(),
                    mentions: 1,
                    documents: 1,
                    entities: 1,
                },
                PeriodCounts {
                    period_label: "2020".to_string(),
                    mentions: 3,
                    documents: 2,
                    entities: 2,
                },
            ]
        );
    }
}
