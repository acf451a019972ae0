//! Edge listing.

use anyhow::Result;

use crate::cli::output::{output_json_list, print_hint, print_table, OutputMode};
use crate::services::AnalysisService;

pub async fn handle_edges(
    service: &AnalysisService,
    period: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let mut edges = service
        .edges(period)
        .await
        .map_err(|e| anyhow::anyhow!("Edge construction failed: {}", e))?;

    if mode == OutputMode::Json {
        output_json_list(&edges);
        return Ok(());
    }

    edges.sort_by(|a, b| b.weight.cmp(&a.weight));
    let rows: Vec<Vec<String>> = edges
        .iter()
        .map(|e| {
            vec![
                e.source_entity.clone(),
                e.target_entity.clone(),
                e.weight.to_string(),
                e.period_labels.join(", "),
            ]
        })
        .collect();
    print_table(&["Source", "Target", "Weight", "Periods"], rows);

    if period.is_none() {
        print_hint("Weights are summed across periods. Use --period to see one period.");
    }

    Ok(())
}
