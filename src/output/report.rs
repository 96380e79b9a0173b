//! Report wrapping an analysis outcome with run metadata

use crate::processing::matcher::AnalysisOutcome;
use crate::processing::text_processor::DocumentStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillReport {
    pub outcome: AnalysisOutcome,

    /// Only present when statistics were requested
    pub stats: Option<DocumentStats>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub extractor_version: String,
    pub source_file: String,
    pub embedding_model: String,
    pub catalog_size: usize,
    pub processing_time_ms: u64,
}

impl SkillReport {
    pub fn new(outcome: AnalysisOutcome, metadata: ReportMetadata) -> Self {
        Self {
            outcome,
            stats: None,
            metadata,
        }
    }

    pub fn with_stats(mut self, stats: DocumentStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

impl ReportMetadata {
    pub fn new(source_file: impl Into<String>, embedding_model: impl Into<String>, catalog_size: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            extractor_version: env!("CARGO_PKG_VERSION").to_string(),
            source_file: source_file.into(),
            embedding_model: embedding_model.into(),
            catalog_size,
            processing_time_ms: 0,
        }
    }
}
