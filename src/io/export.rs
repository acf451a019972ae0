//! Writes analysis tables to disk.
//!
//! Layout of an output directory:
//!
//! ```text
//! nodes.csv            one row per (entity, period)
//! edges.csv            per-period edges
//! combined_edges.csv   merged edges, periods joined with '|'
//! summary.csv          per-period statistics plus a "combined" row
//! report.json          everything above in one document
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::report::{AnalysisReport, EdgeRecord};
use crate::CooccurError;

pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const COMBINED_EDGES_FILE: &str = "combined_edges.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const REPORT_FILE: &str = "report.json";

const PERIOD_SEPARATOR: &str = "|";

#[derive(Serialize)]
struct EdgeRow<'a> {
    source_entity: &'a str,
    target_entity: &'a str,
    weight: u64,
    period_labels: String,
}

impl<'a> From<&'a EdgeRecord> for EdgeRow<'a> {
    fn from(edge: &'a EdgeRecord) -> Self {
        Self {
            source_entity: &edge.source_entity,
            target_entity: &edge.target_entity,
            weight: edge.weight,
            period_labels: edge.period_labels.join(PERIOD_SEPARATOR),
        }
    }
}

/// Files written by `export_report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub combined_edges: PathBuf,
    pub summary: PathBuf,
    pub report: PathBuf,
}

fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), CooccurError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Serialise the report as pretty JSON.
pub fn report_to_json(report: &AnalysisReport) -> Result<String, CooccurError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write every table and the JSON report into `dir`, creating it if needed.
pub fn export_report(report: &AnalysisReport, dir: &Path) -> Result<ExportedFiles, CooccurError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CooccurError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

    let files = ExportedFiles {
        nodes: dir.join(NODES_FILE),
        edges: dir.join(EDGES_FILE),
        combined_edges: dir.join(COMBINED_EDGES_FILE),
        summary: dir.join(SUMMARY_FILE),
        report: dir.join(REPORT_FILE),
    };

    write_csv(&files.nodes, &report.nodes)?;
    write_csv(&files.edges, report.edges.iter().map(EdgeRow::from))?;
    write_csv(
        &files.combined_edges,
        report.combined_edges.iter().map(EdgeRow::from),
    )?;
    write_csv(
        &files.summary,
        report
            .summary
            .iter()
            .chain(std::iter::once(&report.combined_summary)),
    )?;
    std::fs::write(&files.report, report_to_json(report)?)?;

    info!(
        dir = %dir.display(),
        nodes = report.nodes.len(),
        edges = report.edges.len(),
        "Exported analysis"
    );

    Ok(files)
}
