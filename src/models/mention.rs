//! Entity mention records produced by an upstream tagger.
//!
//! `RawMention` mirrors what arrives from a file or another process, with every
//! field optional. `validate_mentions` turns a batch of raw records into typed
//! `Mention`s, failing on the first malformed record so nothing half-valid ever
//! reaches graph construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CooccurError;

/// Entity category assigned by the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    #[default]
    Unknown,
}

impl EntityType {
    /// Parse a tagger label leniently. Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "person" | "per" | "people" => EntityType::Person,
            "organization" | "organisation" | "org" => EntityType::Organization,
            "location" | "loc" | "gpe" | "place" => EntityType::Location,
            _ => EntityType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "Person",
            EntityType::Organization => "Organization",
            EntityType::Location => "Location",
            EntityType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated mention of one entity in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub document_id: String,
    pub entity_name: String,
    pub entity_type: EntityType,
    pub period_label: String,
    pub occurrence_count: u64,
}

impl Mention {
    pub fn new(
        document_id: impl Into<String>,
        entity_name: impl Into<String>,
        entity_type: EntityType,
        period_label: impl Into<String>,
        occurrence_count: u64,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            entity_name: entity_name.into(),
            entity_type,
            period_label: period_label.into(),
            occurrence_count,
        }
    }
}

/// An unvalidated mention as decoded from CSV, JSON, or YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMention {
    #[serde(default, alias = "doc_id", alias = "document")]
    pub document_id: Option<String>,
    #[serde(default, alias = "entity", alias = "name")]
    pub entity_name: Option<String>,
    #[serde(default, alias = "type", alias = "label")]
    pub entity_type: Option<String>,
    #[serde(default, alias = "period")]
    pub period_label: Option<String>,
    #[serde(
        default,
        alias = "total_occurrences",
        alias = "occurrences",
        alias = "count"
    )]
    pub occurrence_count: Option<i64>,
}

fn required(value: Option<String>, field: &str, index: usize) -> Result<String, CooccurError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CooccurError::MalformedMention {
            index,
            reason: format!("missing {}", field),
        }),
    }
}

impl RawMention {
    /// Validate a single record. `index` is the record position, used in errors.
    pub fn validate(self, index: usize) -> Result<Mention, CooccurError> {
        let document_id = required(self.document_id, "document_id", index)?;
        let entity_name = required(self.entity_name, "entity_name", index)?;
        let period_label = required(self.period_label, "period_label", index)?;

        let occurrence_count = match self.occurrence_count {
            None => 1,
            Some(n) if n < 0 => {
                return Err(CooccurError::MalformedMention {
                    index,
                    reason: format!("negative occurrence count {}", n),
                })
            }
            Some(n) => n as u64,
        };

        let entity_type = self
            .entity_type
            .as_deref()
            .map(EntityType::from_label)
            .unwrap_or_default();

        Ok(Mention {
            document_id,
            entity_name,
            entity_type,
            period_label,
            occurrence_count,
        })
    }
}

/// Validate a batch of raw records, stopping at the first malformed one.
pub fn validate_mentions(raw: Vec<RawMention>) -> Result<Vec<Mention>, CooccurError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}
