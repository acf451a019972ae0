//! Where mentions come from.
//!
//! The pipeline only sees `MentionSource`; the CLI uses `FileMentionSource`
//! and tests usually hand in a `StaticMentionSource`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::mention::{validate_mentions, Mention, RawMention};
use crate::CooccurError;

/// Supplies a validated batch of mentions.
#[async_trait]
pub trait MentionSource: Send + Sync {
    async fn load_mentions(&self) -> Result<Vec<Mention>, CooccurError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionFormat {
    Csv,
    Json,
    JsonLines,
    Yaml,
}

impl MentionFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, CooccurError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(MentionFormat::Csv),
            "json" => Ok(MentionFormat::Json),
            "jsonl" | "ndjson" => Ok(MentionFormat::JsonLines),
            "yaml" | "yml" => Ok(MentionFormat::Yaml),
            other => Err(CooccurError::Validation(format!(
                "Unsupported mention file extension '{}' for {} (expected csv, json, jsonl, yaml)",
                other,
                path.display()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MentionFormat::Csv => "csv",
            MentionFormat::Json => "json",
            MentionFormat::JsonLines => "jsonl",
            MentionFormat::Yaml => "yaml",
        }
    }
}

/// Decode raw records from text in the given format.
pub fn parse_raw_mentions(
    contents: &str,
    format: MentionFormat,
) -> Result<Vec<RawMention>, CooccurError> {
    match format {
        MentionFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(contents.as_bytes());
            let mut records = Vec::new();
            for row in reader.deserialize::<RawMention>() {
                records.push(row?);
            }
            Ok(records)
        }
        MentionFormat::Json => {
            let mut value: serde_json::Value = serde_json::from_str(contents)?;
            if let Some(records) = value.as_array_mut() {
                records.iter_mut().for_each(stringify_json_identifiers);
            }
            Ok(serde_json::from_value(value)?)
        }
        MentionFormat::JsonLines => {
            let mut records = Vec::new();
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut value: serde_json::Value = serde_json::from_str(line)?;
                stringify_json_identifiers(&mut value);
                records.push(serde_json::from_value(value)?);
            }
            Ok(records)
        }
        MentionFormat::Yaml => {
            if contents.trim().is_empty() {
                return Ok(Vec::new());
            }
            let mut value: serde_yaml_ng::Value = serde_yaml_ng::from_str(contents)?;
            if let Some(records) = value.as_sequence_mut() {
                records.iter_mut().for_each(stringify_yaml_identifiers);
            }
            Ok(serde_yaml_ng::from_value(value)?)
        }
    }
}

/// Keys (with aliases) of the text fields that taggers often emit as bare
/// numbers: ids like `17`, periods like `2020`.
const IDENTIFIER_KEYS: [&str; 6] = [
    "document_id",
    "doc_id",
    "document",
    "entity_name",
    "period_label",
    "period",
];

fn stringify_json_identifiers(record: &mut serde_json::Value) {
    let Some(map) = record.as_object_mut() else {
        return;
    };
    for key in IDENTIFIER_KEYS {
        if let Some(value) = map.get_mut(key) {
            if value.is_number() {
                *value = serde_json::Value::String(value.to_string());
            }
        }
    }
}

fn stringify_yaml_identifiers(record: &mut serde_yaml_ng::Value) {
    let Some(map) = record.as_mapping_mut() else {
        return;
    };
    for key in IDENTIFIER_KEYS {
        let Some(value) = map.get_mut(key) else {
            continue;
        };
        let text = match value {
            serde_yaml_ng::Value::Number(n) => n.to_string(),
            _ => continue,
        };
        *value = serde_yaml_ng::Value::String(text);
    }
}

/// Decode and validate in one step.
pub fn parse_mentions(contents: &str, format: MentionFormat) -> Result<Vec<Mention>, CooccurError> {
    validate_mentions(parse_raw_mentions(contents, format)?)
}

/// Reads mentions from a CSV, JSON, JSON Lines or YAML file.
pub struct FileMentionSource {
    path: PathBuf,
    format: MentionFormat,
}

impl FileMentionSource {
    /// Infer the format from the file extension.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CooccurError> {
        let path = path.into();
        let format = MentionFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn with_format(path: impl Into<PathBuf>, format: MentionFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> MentionFormat {
        self.format
    }
}

#[async_trait]
impl MentionSource for FileMentionSource {
    async fn load_mentions(&self) -> Result<Vec<Mention>, CooccurError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CooccurError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        debug!(
            path = %self.path.display(),
            format = self.format.as_str(),
            bytes = contents.len(),
            "Read mention file"
        );
        parse_mentions(&contents, self.format)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.format.as_str())
    }
}

/// In-memory mentions.
#[derive(Debug, Clone, Default)]
pub struct StaticMentionSource {
    mentions: Vec<Mention>,
}

impl StaticMentionSource {
    pub fn new(mentions: Vec<Mention>) -> Self {
        Self { mentions }
    }
}

#[async_trait]
impl MentionSource for StaticMentionSource {
    async fn load_mentions(&self) -> Result<Vec<Mention>, CooccurError> {
        Ok(self.mentions.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} mentions)", self.mentions.len())
    }
}
