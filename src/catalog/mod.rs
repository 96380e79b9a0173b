//! Skill catalog: canonical English names, Arabic translations and the
//! precomputed reference embedding for every skill.
//!
//! A [`Catalog`] is loaded once and shared read-only between requests.

pub mod artifact;

use crate::config::CatalogConfig;
use crate::error::{Result, SkillExtractorError};
use crate::processing::embeddings::{to_matrix, Embedder};
use crate::processing::labels::{title_case, MISSING_TRANSLATION};
use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One row of the taxonomy, `id` indexes the embedding matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCatalogEntry {
    pub id: usize,
    pub name_en: String,
    pub name_ar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    names: Vec<String>,
    embeddings: Array2<f32>,
    translations: HashMap<String, String>,
}

impl Catalog {
    /// Assemble a catalog without checking that `embeddings` has one row per name.
    ///
    /// Translation keys are title-cased; blank translations are dropped. When
    /// two pairs share a key the later one wins.
    pub fn from_parts(
        names: Vec<String>,
        embeddings: Array2<f32>,
        translations: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut table = HashMap::new();
        for (en, ar) in translations {
            let ar = ar.trim();
            if !ar.is_empty() {
                table.insert(title_case(en.trim()), ar.to_string());
            }
        }

        Self {
            names,
            embeddings,
            translations: table,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    pub fn translation_count(&self) -> usize {
        self.translations.len()
    }

    /// One embedding row per name
    pub fn is_consistent(&self) -> bool {
        self.names.len() == self.embeddings.nrows()
    }

    pub fn translation(&self, name_en: &str) -> Option<&str> {
        self.translations
            .get(&title_case(name_en.trim()))
            .map(String::as_str)
    }

    pub fn translation_or_sentinel(&self, name_en: &str) -> &str {
        self.translation(name_en).unwrap_or(MISSING_TRANSLATION)
    }

    pub fn entries(&self) -> impl Iterator<Item = SkillCatalogEntry> + '_ {
        self.names.iter().enumerate().map(|(id, name)| SkillCatalogEntry {
            id,
            name_en: name.clone(),
            name_ar: self.translation(name).map(str::to_string),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BilingualRow {
    en: String,
    #[serde(default)]
    ar: Option<String>,
}

/// Reads the taxonomy files named in [`CatalogConfig`]
pub struct CatalogProvider {
    config: CatalogConfig,
}

impl CatalogProvider {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Load names, translations and reference embeddings as one unit.
    ///
    /// Fails with `CatalogLoad` if any file is missing or malformed, a name
    /// repeats, or the matrix row count differs from the number of names.
    pub fn load(&self) -> Result<Catalog> {
        let master = self.read_master()?;
        let names = self.read_names(&master)?;
        let embeddings = artifact::read_embeddings(&self.config.embeddings)?;

        if embeddings.nrows() != names.len() {
            return Err(SkillExtractorError::CatalogLoad(format!(
                "{} has {} embedding rows but the catalog lists {} skills",
                self.config.embeddings.display(),
                embeddings.nrows(),
                names.len()
            )));
        }

        // file order, so a repeated name takes its last translation
        let translations: Vec<(String, String)> = master
            .into_iter()
            .filter_map(|row| row.ar.map(|ar| (row.en, ar)))
            .collect();

        let catalog = Catalog::from_parts(names, embeddings, translations);
        info!(
            "Loaded skill catalog: {} skills, {} translations, {}-dimensional embeddings",
            catalog.len(),
            catalog.translation_count(),
            catalog.dimension()
        );
        Ok(catalog)
    }

    /// Embed every catalog name in one batch and write the reference artifact
    pub fn build_reference_embeddings(&self, embedder: &dyn Embedder) -> Result<PathBuf> {
        let master = self.read_master()?;
        let names = self.read_names(&master)?;
        if names.is_empty() {
            return Err(SkillExtractorError::CatalogBuild(
                "catalog has no skills to embed".to_string(),
            ));
        }

        info!(
            "Embedding {} catalog skills with {}",
            names.len(),
            embedder.model_name()
        );
        let vectors = embedder.embed(&names)?;
        if vectors.len() != names.len() {
            return Err(SkillExtractorError::Embedding(format!(
                "embedder returned {} vectors for {} skills",
                vectors.len(),
                names.len()
            )));
        }

        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        let matrix = to_matrix(&vectors, dim)?;
        artifact::write_embeddings(&self.config.embeddings, &matrix)?;

        info!(
            "Wrote {}x{} reference embeddings to {}",
            matrix.nrows(),
            matrix.ncols(),
            self.config.embeddings.display()
        );
        Ok(self.config.embeddings.clone())
    }

    fn read_master(&self) -> Result<Vec<BilingualRow>> {
        let rows: Vec<BilingualRow> = read_json(&self.config.skills_master)?;
        debug!("Read {} bilingual rows", rows.len());
        Ok(rows)
    }

    /// Canonical names come from the skills list; without one the bilingual
    /// rows define both the names and their order.
    fn read_names(&self, master: &[BilingualRow]) -> Result<Vec<String>> {
        let raw: Vec<String> = if self.config.skills_list.exists() {
            read_json(&self.config.skills_list)?
        } else {
            debug!(
                "{} not found, taking skill names from {}",
                self.config.skills_list.display(),
                self.config.skills_master.display()
            );
            master.iter().map(|row| row.en.clone()).collect()
        };

        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(raw.len());
        for name in raw {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(SkillExtractorError::CatalogLoad(
                    "catalog contains an empty skill name".to_string(),
                ));
            }
            if !seen.insert(name.clone()) {
                return Err(SkillExtractorError::CatalogLoad(format!(
                    "duplicate skill name in catalog: {}",
                    name
                )));
            }
            names.push(name);
        }
        Ok(names)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SkillExtractorError::CatalogLoad(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        SkillExtractorError::CatalogLoad(format!("malformed {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::FnEmbedder;
    use ndarray::array;
    use tempfile::TempDir;

    fn write_fixture(dir: &Path, names: &str, embeddings: &str) -> CatalogConfig {
        let config = CatalogConfig {
            skills_master: dir.join("skills_master.json"),
            skills_list: dir.join("skills_cleaned.json"),
            embeddings: dir.join("skills_embeddings.json"),
        };
        std::fs::write(
            &config.skills_master,
            r#"[{"en": "python", "ar": "بايثون"}, {"en": "machine learning", "ar": "تعلم الآلة"}, {"en": "Leadership"}]"#,
        )
        .unwrap();
        std::fs::write(&config.skills_list, names).unwrap();
        std::fs::write(&config.embeddings, embeddings).unwrap();
        config
    }

    #[test]
    fn test_load_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(
            temp_dir.path(),
            r#"["Python", "Machine Learning", "Leadership"]"#,
            "[[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]]",
        );

        let catalog = CatalogProvider::new(config).load().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.dimension(), 2);
        assert!(catalog.is_consistent());
        assert_eq!(catalog.translation("Python"), Some("بايثون"));
        assert_eq!(catalog.translation("machine LEARNING"), Some("تعلم الآلة"));
        assert_eq!(catalog.translation_or_sentinel("Leadership"), "—");
    }

    #[test]
    fn test_entries_follow_catalog_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(
            temp_dir.path(),
            r#"["Python", "Leadership"]"#,
            "[[1.0, 0.0], [0.0, 1.0]]",
        );

        let entries: Vec<_> = CatalogProvider::new(config).load().unwrap().entries().collect();
        assert_eq!(entries[0].id, 0);
        assert_eq!(entries[0].name_ar.as_deref(), Some("بايثون"));
        assert_eq!(entries[1].name_en, "Leadership");
        assert_eq!(entries[1].name_ar, None);
    }

    #[test]
    fn test_row_count_mismatch_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(
            temp_dir.path(),
            r#"["Python", "Leadership"]"#,
            "[[1.0, 0.0]]",
        );

        assert!(matches!(
            CatalogProvider::new(config).load(),
            Err(SkillExtractorError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_duplicate_names_fail_load() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(
            temp_dir.path(),
            r#"["Python", "Python"]"#,
            "[[1.0, 0.0], [1.0, 0.0]]",
        );

        assert!(matches!(
            CatalogProvider::new(config).load(),
            Err(SkillExtractorError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_malformed_master_fails_load() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(temp_dir.path(), r#"["Python"]"#, "[[1.0]]");
        std::fs::write(&config.skills_master, "{ not json").unwrap();

        assert!(matches!(
            CatalogProvider::new(config).load(),
            Err(SkillExtractorError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_names_fall_back_to_master_rows() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(temp_dir.path(), "[]", "[[1.0], [2.0], [3.0]]");
        std::fs::remove_file(&config.skills_list).unwrap();

        let catalog = CatalogProvider::new(config).load().unwrap();
        assert_eq!(catalog.names(), &["python", "machine learning", "Leadership"]);
        assert_eq!(catalog.translation("python"), Some("بايثون"));
    }

    #[test]
    fn test_build_reference_embeddings_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = write_fixture(
            temp_dir.path(),
            r#"["Python", "Leadership"]"#,
            "[]",
        );
        config.embeddings = temp_dir.path().join("skills_embeddings.safetensors");

        let embedder = FnEmbedder::new("stub", |batch: &[String]| {
            Ok(batch.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        });

        let provider = CatalogProvider::new(config);
        provider.build_reference_embeddings(&embedder).unwrap();

        let catalog = provider.load().unwrap();
        assert_eq!(catalog.embeddings(), &array![[6.0_f32, 1.0], [10.0, 1.0]]);
    }

    #[test]
    fn test_from_parts_does_not_validate() {
        let catalog = Catalog::from_parts(
            vec!["Python".to_string(), "Leadership".to_string()],
            array![[1.0_f32, 0.0]],
            Vec::new(),
        );
        assert!(!catalog.is_consistent());
    }

    #[test]
    fn test_colliding_translations_take_last_row() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_fixture(temp_dir.path(), r#"["Python"]"#, "[[1.0, 0.0]]");
        std::fs::write(
            &config.skills_master,
            r#"[{"en": "python", "ar": "A"}, {"en": "PYTHON", "ar": "B"}, {"en": "Python", "ar": "  "}]"#,
        )
        .unwrap();

        let provider = CatalogProvider::new(config);
        for _ in 0..50 {
            let catalog = provider.load().unwrap();
            assert_eq!(catalog.translation("Python"), Some("B"));
            assert_eq!(catalog.translation_count(), 1);
        }
    }
}
