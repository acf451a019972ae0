mod common;

use clap::Parser;
use common::TestHarness;
use cooccur::cli::output::OutputMode;
use cooccur::cli::{execute, Cli};
use cooccur::config::PipelineConfig;

const JSONL: &str = r#"{"doc_id": "d1", "entity": "A", "type": "PER", "period": "2019"}
{"doc_id": "d1", "entity": "B", "type": "PER", "period": "2019"}
{"doc_id": "d2", "entity": "A", "type": "PER", "period": "2019"}
{"doc_id": "d2", "entity": "B", "type": "PER", "period": "2019"}
{"doc_id": "d3", "entity": "A", "type": "PER", "period": "2020"}
"#;

async fn run(args: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(args)?;
    let mode = OutputMode::from_json_flag(cli.json);
    execute(&cli.command, &PipelineConfig::default(), mode).await
}

#[tokio::test]
async fn test_analyze_exports_to_output_dir() {
    let harness = TestHarness::new();
    let input = harness.write_file("mentions.jsonl", JSONL);
    let out = harness.temp_path().join("report");

    run(&[
        "cooccur",
        "analyze",
        input.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--json",
    ])
    .await
    .unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["edges"].as_array().unwrap().len(), 1);
    assert_eq!(report["summary"][1]["analyzable"], false);
}

#[tokio::test]
async fn test_read_only_commands_succeed() {
    let harness = TestHarness::new();
    let input = harness.write_file("mentions.jsonl", JSONL);
    let path = input.to_str().unwrap();

    run(&["cooccur", "validate", path]).await.unwrap();
    run(&["cooccur", "edges", path, "--period", "2019"]).await.unwrap();
    run(&["cooccur", "communities", path, "--json"]).await.unwrap();
    run(&["cooccur", "centrality", path, "--period", "2019", "--limit", "1"])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_override_is_rejected() {
    let harness = TestHarness::new();
    let input = harness.write_file("mentions.jsonl", JSONL);

    let result = run(&[
        "cooccur",
        "analyze",
        input.to_str().unwrap(),
        "--trials",
        "0",
    ])
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_extension_is_rejected() {
    let harness = TestHarness::new();
    let input = harness.write_file("mentions.txt", JSONL);
    assert!(run(&["cooccur", "validate", input.to_str().unwrap()])
        .await
        .is_err());
}
