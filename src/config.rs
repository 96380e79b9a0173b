//! Configuration management for the skill extractor

use crate::error::{Result, SkillExtractorError};
use crate::processing::labels::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Similarity threshold used when nothing else is configured
pub const DEFAULT_THRESHOLD: f32 = 0.70;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub catalog: CatalogConfig,
    pub matching: MatchingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

/// Locations of the taxonomy files and the reference-embedding artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Bilingual rows: `[{"en": "...", "ar": "..."}]`
    pub skills_master: PathBuf,
    /// Canonical English names, one per embedding row
    pub skills_list: PathBuf,
    /// `.safetensors` or `.json` embedding matrix
    pub embeddings: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub threshold: f32,
    pub language: Language,
    pub top_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub max_tokens: usize,
    pub enable_caching: bool,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skill-extractor")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                default_embedding_model: "potion-base-8M".to_string(),
            },
            catalog: CatalogConfig {
                skills_master: PathBuf::from("skills_master.json"),
                skills_list: PathBuf::from("skills_cleaned.json"),
                embeddings: PathBuf::from("skills_embeddings.safetensors"),
            },
            matching: MatchingConfig {
                threshold: DEFAULT_THRESHOLD,
                language: Language::English,
                top_keys: 3,
            },
            processing: ProcessingConfig {
                max_tokens: 512,
                enable_caching: true,
                batch_size: 32,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                pretty_json: true,
            },
        }
    }
}

impl Config {
    /// Load the default config file, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SkillExtractorError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillExtractorError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-extractor")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SkillExtractorError::Configuration(format!(
                "matching.threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.processing.batch_size == 0 {
            return Err(SkillExtractorError::Configuration(
                "processing.batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
