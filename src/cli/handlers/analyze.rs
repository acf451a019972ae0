//! CLI handlers for network analysis commands.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::output::{
    fmt_score, output_json, output_json_list, print_header, print_kv, print_success,
    print_table, print_warning, OutputMode,
};
use crate::io::export_report;
use crate::models::report::PeriodSummary;
use crate::services::community::ConsensusPartition;
use crate::services::{AnalysisService, CentralityScores};

fn summary_row(s: &PeriodSummary) -> Vec<String> {
    vec![
        s.period_label.clone(),
        s.node_count.to_string(),
        s.edge_count.to_string(),
        fmt_score(s.density),
        s.community_count.to_string(),
        fmt_score(s.modularity),
        fmt_score(s.modularity_stability),
    ]
}

const SUMMARY_HEADERS: [&str; 7] = [
    "Period",
    "Nodes",
    "Edges",
    "Density",
    "Communities",
    "Modularity",
    "Std dev",
];

pub async fn handle_analyze(
    service: &AnalysisService,
    output_dir: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let analysis = service
        .analyze()
        .await
        .map_err(|e| anyhow::anyhow!("Analysis failed: {}", e))?;
    let report = analysis.report();

    let exported = match output_dir {
        Some(dir) => Some(export_report(&report, dir)?),
        None => None,
    };

    if mode == OutputMode::Json {
        output_json(&report);
        return Ok(());
    }

    for summary in report.summary.iter().filter(|s| !s.analyzable) {
        print_warning(&format!(
            "Period '{}' produced no co-occurrence edges",
            summary.period_label
        ));
    }

    print_header("Periods");
    let rows = report
        .summary
        .iter()
        .chain(std::iter::once(&report.combined_summary))
        .map(summary_row)
        .collect();
    print_table(&SUMMARY_HEADERS, rows);

    print_header("Combined network");
    print_kv("Entities", &analysis.combined.node_count().to_string());
    print_kv("Edges", &analysis.combined.edge_count().to_string());
    print_kv("Periods", &report.periods.join(", "));

    if let Some(files) = exported {
        print_success(&format!(
            "Wrote {} node rows and {} edge rows to {}",
            report.nodes.len(),
            report.edges.len(),
            files.report.parent().unwrap_or(Path::new(".")).display()
        ));
    }

    Ok(())
}

#[derive(Serialize)]
struct CommunitiesView<'a> {
    summary: &'a PeriodSummary,
    partition: &'a ConsensusPartition,
}

pub async fn handle_communities(
    service: &AnalysisService,
    period: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let (summary, partition) = service
        .communities(period)
        .await
        .map_err(|e| anyhow::anyhow!("Community detection failed: {}", e))?;

    if mode == OutputMode::Json {
        output_json(&CommunitiesView {
            summary: &summary,
            partition: &partition,
        });
        return Ok(());
    }

    print_header(&format!("Communities: {}", summary.period_label));
    print_kv("Communities", &summary.community_count.to_string());
    print_kv("Modularity", &fmt_score(summary.modularity));
    print_kv(
        "Trial modularity",
        &format!(
            "{} (std dev {}, {} trials)",
            fmt_score(summary.mean_trial_modularity),
            fmt_score(summary.modularity_stability),
            partition.trials_run
        ),
    );

    let mut members: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (name, &community) in &partition.assignments {
        members.entry(community).or_default().push(name.as_str());
    }

    let rows = members
        .iter()
        .map(|(id, names)| vec![id.to_string(), names.len().to_string(), names.join(", ")])
        .collect();
    print_table(&["Community", "Size", "Members"], rows);

    Ok(())
}

#[derive(Serialize)]
struct RankedEntity<'a> {
    rank: usize,
    entity_name: &'a str,
    #[serde(flatten)]
    scores: &'a CentralityScores,
}

pub async fn handle_centrality(
    service: &AnalysisService,
    period: &str,
    limit: usize,
    mode: OutputMode,
) -> Result<()> {
    let ranked = service
        .centrality(period, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Centrality computation failed: {}", e))?;

    if mode == OutputMode::Json {
        let items: Vec<RankedEntity> = ranked
            .iter()
            .enumerate()
            .map(|(i, (name, scores))| RankedEntity {
                rank: i + 1,
                entity_name: name,
                scores,
            })
            .collect();
        output_json_list(&items);
    } else {
        let rows: Vec<Vec<String>> = ranked
            .iter()
            .enumerate()
            .map(|(i, (name, s))| {
                vec![
                    format!("{}", i + 1),
                    name.clone(),
                    s.degree.to_string(),
                    fmt_score(s.degree_centrality),
                    fmt_score(s.betweenness_centrality),
                    fmt_score(s.normalized_degree),
                    fmt_score(s.composite_score),
                ]
            })
            .collect();
        print_table(
            &[
                "#",
                "Entity",
                "Degree",
                "Degree C.",
                "Betweenness",
                "Norm. degree",
                "Composite",
            ],
            rows,
        );
    }

    Ok(())
}
