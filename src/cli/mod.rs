//! CLI interface for cooccur.

pub mod handlers;
pub mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::io::FileMentionSource;
use crate::services::AnalysisService;
use output::OutputMode;

/// cooccur - entity co-occurrence networks over time
#[derive(Parser)]
#[command(name = "cooccur", version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (TOML). Falls back to $COOCCUR_CONFIG, then ./cooccur.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the loaded configuration.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PipelineOverrides {
    /// Period processing order (repeatable); unlisted periods follow in first-seen order
    #[arg(long = "period-order")]
    pub period_order: Vec<String>,
    /// Minimum shared documents for an edge
    #[arg(long)]
    pub min_weight: Option<u32>,
    /// Community detection trials
    #[arg(long)]
    pub trials: Option<usize>,
    /// Modularity resolution
    #[arg(long)]
    pub resolution: Option<f64>,
    /// Layout seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PipelineOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if !self.period_order.is_empty() {
            config.periods = self.period_order.clone();
        }
        if let Some(min_weight) = self.min_weight {
            config.cooccurrence.min_weight = min_weight;
        }
        if let Some(trials) = self.trials {
            config.community.trials = trials;
        }
        if let Some(resolution) = self.resolution {
            config.community.resolution = resolution;
        }
        if let Some(seed) = self.seed {
            config.layout.seed = seed;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: edges, communities, centrality, layout
    Analyze {
        /// Mention file (csv, json, jsonl, yaml)
        mentions: PathBuf,
        /// Write nodes/edges/summary CSVs and report.json here
        #[arg(long, short)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        overrides: PipelineOverrides,
    },

    /// List co-occurrence edges
    Edges {
        /// Mention file (csv, json, jsonl, yaml)
        mentions: PathBuf,
        /// Only this period (default: combined graph)
        #[arg(long)]
        period: Option<String>,
        #[command(flatten)]
        overrides: PipelineOverrides,
    },

    /// Consensus communities and their stability
    Communities {
        /// Mention file (csv, json, jsonl, yaml)
        mentions: PathBuf,
        /// Only this period (default: combined graph)
        #[arg(long)]
        period: Option<String>,
        #[command(flatten)]
        overrides: PipelineOverrides,
    },

    /// Rank entities of one period by composite centrality
    Centrality {
        /// Mention file (csv, json, jsonl, yaml)
        mentions: PathBuf,
        /// Period to rank
        #[arg(long)]
        period: String,
        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: usize,
        #[command(flatten)]
        overrides: PipelineOverrides,
    },

    /// Validate a mention file and show per-period counts
    Validate {
        /// Mention file (csv, json, jsonl, yaml)
        mentions: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

fn build_service(
    config: &PipelineConfig,
    mentions: &Path,
    overrides: Option<&PipelineOverrides>,
) -> anyhow::Result<AnalysisService> {
    let mut config = config.clone();
    if let Some(overrides) = overrides {
        overrides.apply(&mut config);
    }
    config.validate()?;
    let source = FileMentionSource::new(mentions)?;
    Ok(AnalysisService::with_source(Arc::new(source), config))
}

/// Execute a CLI command.
pub async fn execute(
    command: &Commands,
    config: &PipelineConfig,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            mentions,
            output_dir,
            overrides,
        } => {
            let service = build_service(config, mentions, Some(overrides))?;
            handlers::analyze::handle_analyze(&service, output_dir.as_deref(), mode).await?
        }

        Commands::Edges {
            mentions,
            period,
            overrides,
        } => {
            let service = build_service(config, mentions, Some(overrides))?;
            handlers::graph::handle_edges(&service, period.as_deref(), mode).await?
        }

        Commands::Communities {
            mentions,
            period,
            overrides,
        } => {
            let service = build_service(config, mentions, Some(overrides))?;
            handlers::analyze::handle_communities(&service, period.as_deref(), mode).await?
        }

        Commands::Centrality {
            mentions,
            period,
            limit,
            overrides,
        } => {
            let service = build_service(config, mentions, Some(overrides))?;
            handlers::analyze::handle_centrality(&service, period, *limit, mode).await?
        }

        Commands::Validate { mentions } => {
            let service = build_service(config, mentions, None)?;
            handlers::utility::handle_validate(&service, mode).await?
        }

        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "cooccur", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_overrides() {
        let cli = Cli::try_parse_from([
            "cooccur",
            "analyze",
            "mentions.csv",
            "--min-weight",
            "3",
            "--trials",
            "5",
            "--period-order",
            "2019",
            "--period-order",
            "2020",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Analyze { overrides, .. } = cli.command else {
            panic!("expected analyze");
        };
        let mut config = PipelineConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config.cooccurrence.min_weight, 3);
        assert_eq!(config.community.trials, 5);
        assert_eq!(config.periods, vec!["2019", "2020"]);
        assert_eq!(config.layout.seed, PipelineConfig::default().layout.seed);
    }

    #[test]
    fn test_centrality_requires_period() {
        assert!(Cli::try_parse_from(["cooccur", "centrality", "m.csv"]).is_err());
    }
}
