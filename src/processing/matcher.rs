//! Similarity matcher: scores resume lines against the skill catalog

use crate::catalog::Catalog;
use crate::config::DEFAULT_THRESHOLD;
use crate::error::{Result, SkillExtractorError};
use crate::processing::embeddings::{cosine_similarity_matrix, to_matrix, Embedder};
use crate::processing::labels::{self, Language};
use crate::processing::text_processor::split_candidate_sentences;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Why an outcome has the matches it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Detected,
    EmptyInput,
    CatalogMismatch,
}

/// A catalog skill whose best line scored at or above the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub name_en: String,
    pub name_ar: Option<String>,
    /// Bilingual display string, ordered by the requested language
    pub label: String,
    /// Best cosine similarity across all candidate lines
    pub score: f32,
    pub catalog_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Descending by score, ties in catalog order
    pub matches: Vec<SkillMatch>,
    /// Lowercase English names, deduplicated, in rank order
    pub english_keys: Vec<String>,
    pub note: String,
    pub status: OutcomeStatus,
    pub threshold: f32,
    pub language: Language,
    pub sentence_count: usize,
}

impl AnalysisOutcome {
    fn empty(status: OutcomeStatus, note: String, threshold: f32, language: Language) -> Self {
        Self {
            matches: Vec::new(),
            english_keys: Vec::new(),
            note,
            status,
            threshold,
            language,
            sentence_count: 0,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.label.as_str()).collect()
    }

    /// The strongest `n` English keys, as handed to job and course lookups
    pub fn top_keys(&self, n: usize) -> &[String] {
        &self.english_keys[..n.min(self.english_keys.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Threshold and display language for a series of matching calls
#[derive(Debug, Clone, Copy)]
pub struct SimilarityMatcher {
    threshold: f32,
    language: Language,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            language: Language::English,
        }
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: f32, language: Language) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            threshold,
            language,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn analyze(&self, text: &str, catalog: &Catalog, embedder: &dyn Embedder) -> Result<AnalysisOutcome> {
        match_skills(text, catalog, embedder, self.threshold, self.language)
    }
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SkillExtractorError::InvalidParameter(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

/// Match resume text against the catalog.
///
/// Empty text and a catalog whose embedding rows do not line up with its names
/// both produce an empty outcome with an explanatory note. The embedder is
/// called once with every candidate line; its failures are returned as
/// `Embedding` errors.
pub fn match_skills(
    text: &str,
    catalog: &Catalog,
    embedder: &dyn Embedder,
    threshold: f32,
    language: Language,
) -> Result<AnalysisOutcome> {
    validate_threshold(threshold)?;

    let sentences = split_candidate_sentences(text);
    if sentences.is_empty() {
        return Ok(AnalysisOutcome::empty(
            OutcomeStatus::EmptyInput,
            labels::empty_input_note(language),
            threshold,
            language,
        ));
    }

    if !catalog.is_consistent() {
        warn!(
            "Skill catalog lists {} names but has {} embedding rows",
            catalog.len(),
            catalog.embeddings().nrows()
        );
        return Ok(AnalysisOutcome::empty(
            OutcomeStatus::CatalogMismatch,
            labels::catalog_mismatch_note(language),
            threshold,
            language,
        ));
    }

    if catalog.is_empty() {
        return Ok(AnalysisOutcome {
            sentence_count: sentences.len(),
            ..AnalysisOutcome::empty(
                OutcomeStatus::Detected,
                labels::detected_note(0, threshold, language),
                threshold,
                language,
            )
        });
    }

    let start_time = Instant::now();
    let batch: Vec<String> = sentences.iter().map(|s| s.to_string()).collect();
    let vectors = embedder
        .embed(&batch)
        .map_err(|e| match e {
            SkillExtractorError::Embedding(_) => e,
            other => SkillExtractorError::Embedding(other.to_string()),
        })?;

    if vectors.len() != batch.len() {
        return Err(SkillExtractorError::Embedding(format!(
            "embedder returned {} vectors for {} sentences",
            vectors.len(),
            batch.len()
        )));
    }

    let sentence_matrix = to_matrix(&vectors, catalog.dimension())?;
    let scores = cosine_similarity_matrix(sentence_matrix.view(), catalog.embeddings().view())?;

    // Best score per skill name; a repeated name keeps its first position
    let mut matches: Vec<SkillMatch> = Vec::new();
    let mut position_by_name: HashMap<&str, usize> = HashMap::new();

    for (index, (name, column)) in catalog
        .names()
        .iter()
        .zip(scores.columns())
        .enumerate()
    {
        let best = column.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if best.is_nan() || best < threshold {
            continue;
        }

        match position_by_name.get(name.as_str()) {
            Some(&position) => {
                if best > matches[position].score {
                    matches[position].score = best;
                }
            }
            None => {
                position_by_name.insert(name.as_str(), matches.len());
                let name_ar = catalog.translation(name).map(str::to_string);
                matches.push(SkillMatch {
                    label: labels::format_label(name, name_ar.as_deref(), language),
                    name_en: name.clone(),
                    name_ar,
                    score: best,
                    catalog_index: index,
                });
            }
        }
    }

    // Stable: equal scores keep catalog order
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    let english_keys: Vec<String> = matches
        .iter()
        .map(|m| m.name_en.to_lowercase())
        .filter(|key| seen.insert(key.clone()))
        .collect();

    debug!(
        "Scored {} lines against {} skills in {:.2?}: {} matches at threshold {}",
        batch.len(),
        catalog.len(),
        start_time.elapsed(),
        matches.len(),
        threshold
    );

    Ok(AnalysisOutcome {
        note: labels::detected_note(matches.len(), threshold, language),
        matches,
        english_keys,
        status: OutcomeStatus::Detected,
        threshold,
        language,
        sentence_count: batch.len(),
    })
}
