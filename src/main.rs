//! cooccur - entity co-occurrence networks over time
//!
//! Usage:
//!   cooccur analyze mentions.csv -o out/     Full pipeline with export
//!   cooccur edges mentions.csv --period 2020 Edges of one period
//!   cooccur communities mentions.csv         Consensus communities (combined)
//!   cooccur centrality mentions.csv --period 2020
//!   cooccur validate mentions.json           Check a mention file
//!   cooccur --help                           Show all commands

use anyhow::Result;
use clap::Parser;

use cooccur::cli::output::OutputMode;
use cooccur::cli::Cli;
use cooccur::config::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cooccur=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);
    let config = PipelineConfig::load(cli.config.as_deref())?;

    cooccur::cli::execute(&cli.command, &config, mode).await?;

    Ok(())
}
