//! Input manager: routes a resume file to the right extractor and caches results

use crate::error::{Result, SkillExtractorError};
use crate::input::text_extractor::{
    DocumentKind, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(SkillExtractorError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let kind = DocumentKind::from_path(path)?;
        info!("Extracting {:?} text from: {}", kind, path.display());

        let text = match kind {
            DocumentKind::Pdf => PdfExtractor.extract(path).await?,
            DocumentKind::Text => PlainTextExtractor.extract(path).await?,
            DocumentKind::Markdown => MarkdownExtractor.extract(path).await?,
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }
        Ok(text)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
