//! Skill extractor library

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use catalog::{Catalog, CatalogProvider, SkillCatalogEntry};
pub use config::Config;
pub use error::{Result, SkillExtractorError};
pub use processing::embeddings::Embedder;
pub use processing::labels::Language;
pub use processing::matcher::{match_skills, AnalysisOutcome, OutcomeStatus, SimilarityMatcher, SkillMatch};
