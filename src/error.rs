//! Error handling for the skill extractor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillExtractorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("Catalog build error: {0}")]
    CatalogBuild(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SkillExtractorError>;

/// model2vec-rs reports failures through anyhow
impl From<anyhow::Error> for SkillExtractorError {
    fn from(err: anyhow::Error) -> Self {
        SkillExtractorError::Embedding(err.to_string())
    }
}

impl From<safetensors::SafeTensorError> for SkillExtractorError {
    fn from(err: safetensors::SafeTensorError) -> Self {
        SkillExtractorError::CatalogLoad(format!("invalid embedding artifact: {}", err))
    }
}
