//! Test data builders for mention construction.
//!
//! Provides a fluent API for creating mentions with sensible defaults.

use cooccur::models::{EntityType, Mention};

/// Builder for a single mention.
pub struct MentionBuilder {
    document_id: String,
    entity_name: String,
    entity_type: EntityType,
    period_label: String,
    occurrence_count: u64,
}

impl MentionBuilder {
    /// Create a mention of `entity_name` in `document_id`, period "p1".
    pub fn new(document_id: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            entity_name: entity_name.into(),
            entity_type: EntityType::Person,
            period_label: "p1".to_string(),
            occurrence_count: 1,
        }
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period_label = period.into();
        self
    }

    pub fn entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = entity_type;
        self
    }

    pub fn occurrences(mut self, count: u64) -> Self {
        self.occurrence_count = count;
        self
    }

    pub fn build(self) -> Mention {
        Mention::new(
            self.document_id,
            self.entity_name,
            self.entity_type,
            self.period_label,
            self.occurrence_count,
        )
    }
}

/// One mention per (document, entity) pair, all in `period`.
pub fn mentions_from_docs(period: &str, docs: &[(&str, &[&str])]) -> Vec<Mention> {
    docs.iter()
        .flat_map(|(doc, names)| {
            names
                .iter()
                .map(move |name| MentionBuilder::new(*doc, *name).period(period).build())
        })
        .collect()
}
