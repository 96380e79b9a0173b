//! Embedding seam and Model2Vec-backed embedder

use crate::config::Config;
use crate::error::{Result, SkillExtractorError};
use model2vec_rs::model::StaticModel;
use ndarray::{Array2, ArrayView2};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Turns a batch of texts into one fixed-width vector per text.
///
/// The matcher calls `embed` exactly once per request, so implementations are
/// free to batch, cache or schedule the work however they like.
pub trait Embedder: Send + Sync {
    fn embed(&self, batch: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str {
        "custom"
    }
}

/// Adapts a plain function or closure into an [`Embedder`]
pub struct FnEmbedder<F> {
    name: String,
    func: F,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>> + Send + Sync,
{
    fn embed(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        (self.func)(batch)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Upper bound on memoised vectors; the cache is emptied when a batch would overflow it
pub const EMBEDDING_CACHE_CAPACITY: usize = 10_000;

/// Text to vector memo shared between concurrent requests.
///
/// The lock is only held while reading or inserting, never while the model runs.
struct EmbeddingCache {
    entries: Mutex<HashMap<String, Vec<f32>>>,
    capacity: usize,
}

impl EmbeddingCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<f32>>>> {
        self.entries
            .lock()
            .map_err(|_| SkillExtractorError::Embedding("embedding cache poisoned".to_string()))
    }

    fn get_or_encode<F>(&self, batch: &[String], encode: F) -> Result<Vec<Vec<f32>>>
    where
        F: FnOnce(&[String]) -> Vec<Vec<f32>>,
    {
        let cached: Vec<Option<Vec<f32>>> = {
            let entries = self.lock()?;
            batch.iter().map(|text| entries.get(text).cloned()).collect()
        };

        let missing: Vec<String> = batch
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(text, _)| text.clone())
            .collect();

        if missing.is_empty() {
            return Ok(cached.into_iter().flatten().collect());
        }

        let start_time = Instant::now();
        let fresh = encode(&missing);
        if fresh.len() != missing.len() {
            return Err(SkillExtractorError::Embedding(format!(
                "model produced {} vectors for {} texts",
                fresh.len(),
                missing.len()
            )));
        }
        log::debug!(
            "Encoded {} texts in {:.2?} ({} cache hits)",
            missing.len(),
            start_time.elapsed(),
            batch.len() - missing.len()
        );

        {
            let mut entries = self.lock()?;
            if entries.len() + fresh.len() > self.capacity {
                log::debug!("Embedding cache full, dropping {} entries", entries.len());
                entries.clear();
            }
            for (text, vector) in missing.into_iter().zip(&fresh) {
                if entries.len() >= self.capacity {
                    break;
                }
                entries.insert(text, vector.clone());
            }
        }

        let mut fresh = fresh.into_iter();
        cached
            .into_iter()
            .map(|hit| {
                hit.or_else(|| fresh.next()).ok_or_else(|| {
                    SkillExtractorError::Embedding("model produced too few vectors".to_string())
                })
            })
            .collect()
    }
}

pub struct EmbeddingEngine {
    model: StaticModel,
    batch_size: usize,
    max_tokens: usize,
    cache: Option<EmbeddingCache>,
    model_name: String,
}

impl EmbeddingEngine {
    pub fn new(model_path: &Path, config: &Config) -> Result<Self> {
        let start_time = Instant::now();

        log::info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .map_err(|e| SkillExtractorError::Embedding(format!("Failed to load model: {}", e)))?;

        log::info!("Model loaded in {:.2?}", start_time.elapsed());

        let model_name = model_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| config.models.default_embedding_model.clone());

        Ok(Self {
            model,
            batch_size: config.processing.batch_size.max(1),
            max_tokens: config.processing.max_tokens,
            cache: config
                .processing
                .enable_caching
                .then(|| EmbeddingCache::new(EMBEDDING_CACHE_CAPACITY)),
            model_name,
        })
    }

    fn encode(&self, texts: &[String]) -> Vec<Vec<f32>> {
        self.model
            .encode_with_args(texts, Some(self.max_tokens), self.batch_size)
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        match &self.cache {
            Some(cache) => cache.get_or_encode(batch, |texts| self.encode(texts)),
            None => Ok(self.encode(batch)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Stack equally sized vectors into a `[rows × dim]` matrix
pub fn to_matrix(vectors: &[Vec<f32>], dim: usize) -> Result<Array2<f32>> {
    let mut flat = Vec::with_capacity(vectors.len() * dim);
    for (row, vector) in vectors.iter().enumerate() {
        if vector.len() != dim {
            return Err(SkillExtractorError::Embedding(format!(
                "vector {} has dimension {}, expected {}",
                row,
                vector.len(),
                dim
            )));
        }
        flat.extend_from_slice(vector);
    }

    Array2::from_shape_vec((vectors.len(), dim), flat)
        .map_err(|e| SkillExtractorError::Embedding(format!("Failed to build matrix: {}", e)))
}

/// Scale every row to unit length; all-zero rows stay zero
pub fn l2_normalized(matrix: ArrayView2<f32>) -> Array2<f32> {
    let mut normalized = matrix.to_owned();
    for mut row in normalized.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|x| x / norm);
        }
    }
    normalized
}

/// Dense cosine similarity between every row of `a` and every row of `b`,
/// shaped `[a.nrows() × b.nrows()]`
pub fn cosine_similarity_matrix(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<Array2<f32>> {
    if a.ncols() != b.ncols() {
        return Err(SkillExtractorError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.ncols(),
            b.ncols()
        )));
    }

    let a = l2_normalized(a);
    let b = l2_normalized(b);
    Ok(a.dot(&b.t()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_matches_hand_computed_cosines() {
        let sentences = array![[1.0_f32, 2.0, 0.0], [0.0, 0.0, 3.0]];
        let skills = array![[2.0_f32, 4.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 0.0]];

        let scores = cosine_similarity_matrix(sentences.view(), skills.view()).unwrap();
        assert_eq!(scores.dim(), (2, 3));

        let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        let expected = array![
            [1.0_f32, 1.0 / (5.0_f32.sqrt() * 2.0_f32.sqrt()), 0.0],
            [0.0, inv_sqrt2, 0.0]
        ];
        for (got, want) in scores.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_matrix_rejects_dimension_mismatch() {
        let a = array![[1.0_f32, 0.0]];
        let b = array![[1.0_f32, 0.0, 0.0]];
        assert!(cosine_similarity_matrix(a.view(), b.view()).is_err());
    }

    #[test]
    fn test_to_matrix_checks_width() {
        let ok = to_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]], 2).unwrap();
        assert_eq!(ok.dim(), (2, 2));
        assert!(to_matrix(&[vec![1.0, 2.0], vec![3.0]], 2).is_err());
    }

    #[test]
    fn test_fn_embedder() {
        let embedder = FnEmbedder::new("stub", |batch: &[String]| {
            Ok(batch.iter().map(|t| vec![t.len() as f32]).collect())
        });
        let vectors = embedder.embed(&["ab".to_string(), "abc".to_string()]).unwrap();
        assert_eq!(vectors, vec![vec![2.0], vec![3.0]]);
        assert_eq!(embedder.model_name(), "stub");
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn length_vectors(batch: &[String]) -> Vec<Vec<f32>> {
        batch.iter().map(|t| vec![t.len() as f32]).collect()
    }

    #[test]
    fn test_cache_encodes_only_unseen_texts() {
        let cache = EmbeddingCache::new(16);
        cache
            .get_or_encode(&texts(&["python", "sql"]), length_vectors)
            .unwrap();

        let mut encoded = Vec::new();
        let vectors = cache
            .get_or_encode(&texts(&["sql", "docker", "python"]), |batch| {
                encoded.extend_from_slice(batch);
                length_vectors(batch)
            })
            .unwrap();

        assert_eq!(encoded, texts(&["docker"]));
        assert_eq!(vectors, vec![vec![3.0], vec![6.0], vec![6.0]]);
    }

    #[test]
    fn test_cache_is_unlocked_while_encoding() {
        let cache = EmbeddingCache::new(16);
        cache
            .get_or_encode(&texts(&["python"]), |batch| {
                assert!(cache.entries.try_lock().is_ok());
                length_vectors(batch)
            })
            .unwrap();
    }

    #[test]
    fn test_cache_stays_within_capacity() {
        let cache = EmbeddingCache::new(2);
        for round in [&["a", "bb"][..], &["ccc", "dddd", "eeeee"][..], &["ff"][..]] {
            let vectors = cache.get_or_encode(&texts(round), length_vectors).unwrap();
            assert_eq!(vectors, length_vectors(&texts(round)));
            assert!(cache.lock().unwrap().len() <= 2);
        }
    }

    #[test]
    fn test_cache_rejects_short_model_output() {
        let cache = EmbeddingCache::new(16);
        let result = cache.get_or_encode(&texts(&["a", "b"]), |_| vec![vec![1.0]]);
        assert!(matches!(result, Err(SkillExtractorError::Embedding(_))));
        assert!(cache.lock().unwrap().is_empty());
    }
}
