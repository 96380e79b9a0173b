//! Integration tests for the skill extractor

use skill_extractor::catalog::CatalogProvider;
use skill_extractor::config::CatalogConfig;
use skill_extractor::input::InputManager;
use skill_extractor::processing::embeddings::FnEmbedder;
use skill_extractor::{match_skills, Catalog, Embedder, Language, OutcomeStatus, Result, SkillExtractorError};
use std::path::Path;
use tempfile::TempDir;

const DIM: usize = 256;

/// Bag-of-words embedding: every lowercase word adds 1.0 to a hashed bucket
fn hashed_bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hash: u32 = 2166136261;
        for byte in word.to_lowercase().bytes() {
            hash ^= byte as u32;
            hash = hash.wrapping_mul(16777619);
        }
        vector[hash as usize % DIM] += 1.0;
    }
    vector
}

fn stub_embedder() -> impl Embedder {
    FnEmbedder::new("hashed-bow", |batch: &[String]| -> Result<Vec<Vec<f32>>> {
        Ok(batch.iter().map(|text| hashed_bag_of_words(text)).collect())
    })
}

fn write_catalog(dir: &Path) -> CatalogConfig {
    let config = CatalogConfig {
        skills_master: dir.join("skills_master.json"),
        skills_list: dir.join("skills_cleaned.json"),
        embeddings: dir.join("skills_embeddings.safetensors"),
    };
    std::fs::write(
        &config.skills_master,
        r#"[
            {"en": "python", "ar": "بايثون"},
            {"en": "project management", "ar": "إدارة المشاريع"},
            {"en": "sql", "ar": "إس كيو إل"},
            {"en": "leadership", "ar": "القيادة"},
            {"en": "docker"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        &config.skills_list,
        r#"["Python", "Project Management", "SQL", "Leadership", "Docker"]"#,
    )
    .unwrap();

    CatalogProvider::new(config.clone())
        .build_reference_embeddings(&stub_embedder())
        .unwrap();
    config
}

fn load_catalog(dir: &Path) -> Catalog {
    CatalogProvider::new(write_catalog(dir)).load().unwrap()
}

const RESUME: &str = "Jane Doe\n\
    Python\n\
    SQL reporting for finance\n\
    Project management of migrations\n\
    \n\
    Leadership\n";

#[test]
fn test_end_to_end_matching() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());
    let embedder = stub_embedder();

    let outcome = match_skills(RESUME, &catalog, &embedder, 0.7, Language::English).unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Detected);
    assert_eq!(outcome.sentence_count, 5);
    assert!(outcome.english_keys.contains(&"python".to_string()));
    assert!(outcome.english_keys.contains(&"leadership".to_string()));
    assert!(!outcome.english_keys.contains(&"docker".to_string()));
    assert!(outcome.labels().contains(&"Python / بايثون"));

    for pair in outcome.matches.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_arabic_labels_put_translation_first() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());

    let outcome = match_skills("Python", &catalog, &stub_embedder(), 0.9, Language::Arabic).unwrap();
    assert_eq!(outcome.labels(), vec!["بايثون / Python"]);
    assert!(outcome.note.starts_with("✔️ تم التعرف على 1 مهارة"));
}

#[test]
fn test_missing_translation_renders_dash() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());

    let outcome = match_skills("docker", &catalog, &stub_embedder(), 0.9, Language::English).unwrap();
    assert_eq!(outcome.labels(), vec!["Docker / —"]);
}

#[test]
fn test_raising_threshold_never_adds_matches() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());
    let embedder = stub_embedder();

    let mut previous: Option<Vec<String>> = None;
    for step in 0..=20 {
        let threshold = step as f32 / 20.0;
        let keys = match_skills(RESUME, &catalog, &embedder, threshold, Language::English)
            .unwrap()
            .english_keys;

        if let Some(lower) = &previous {
            assert!(keys.iter().all(|k| lower.contains(k)), "threshold {} added matches", threshold);
        }
        previous = Some(keys);
    }
}

#[test]
fn test_repeated_calls_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());
    let embedder = stub_embedder();

    let first = match_skills(RESUME, &catalog, &embedder, 0.5, Language::Arabic).unwrap();
    for _ in 0..5 {
        let again = match_skills(RESUME, &catalog, &embedder, 0.5, Language::Arabic).unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_line_order_does_not_change_results() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());
    let embedder = stub_embedder();

    let reversed: String = RESUME.lines().rev().collect::<Vec<_>>().join("\n");
    let a = match_skills(RESUME, &catalog, &embedder, 0.5, Language::English).unwrap();
    let b = match_skills(&reversed, &catalog, &embedder, 0.5, Language::English).unwrap();
    assert_eq!(a.matches, b.matches);
    assert_eq!(a.english_keys, b.english_keys);
}

#[test]
fn test_shared_catalog_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = std::sync::Arc::new(load_catalog(temp_dir.path()));
    let expected = match_skills(RESUME, &catalog, &stub_embedder(), 0.7, Language::English).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let catalog = std::sync::Arc::clone(&catalog);
            std::thread::spawn(move || {
                match_skills(RESUME, &catalog, &stub_embedder(), 0.7, Language::English).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_invalid_threshold_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = load_catalog(temp_dir.path());

    assert!(matches!(
        match_skills(RESUME, &catalog, &stub_embedder(), 1.5, Language::English),
        Err(SkillExtractorError::InvalidParameter(_))
    ));
}

#[test]
fn test_inconsistent_artifact_fails_catalog_load() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_catalog(temp_dir.path());
    std::fs::write(
        &config.skills_list,
        r#"["Python", "Project Management", "SQL", "Leadership", "Docker", "Rust"]"#,
    )
    .unwrap();

    assert!(matches!(
        CatalogProvider::new(config).load(),
        Err(SkillExtractorError::CatalogLoad(_))
    ));
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.txt");
    std::fs::write(&path, RESUME).unwrap();

    let mut manager = InputManager::new();
    let text = manager.extract_text(&path).await.unwrap();
    assert!(text.contains("Jane Doe"));
    assert!(text.contains("SQL reporting"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.md");
    std::fs::write(&path, "# Jane Doe\n\n## Skills\n\n- **Python**\n- SQL reporting\n").unwrap();

    let mut manager = InputManager::new();
    let text = manager.extract_text(&path).await.unwrap();
    assert_eq!(text, "Jane Doe\nSkills\nPython\nSQL reporting");
    assert!(!text.contains("**"));
    assert!(!text.contains('#'));
}

#[tokio::test]
async fn test_caching_functionality() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.txt");
    std::fs::write(&path, RESUME).unwrap();

    let mut manager = InputManager::new();
    let first = manager.extract_text(&path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let second = manager.extract_text(&path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.cache_size(), 1);
}

#[tokio::test]
async fn test_caching_can_be_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.txt");
    std::fs::write(&path, "Python").unwrap();

    let mut manager = InputManager::new().with_cache(false);
    assert_eq!(manager.extract_text(&path).await.unwrap(), "Python");
    assert_eq!(manager.cache_size(), 0);

    std::fs::write(&path, "Rust").unwrap();
    assert_eq!(manager.extract_text(&path).await.unwrap(), "Rust");
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.xyz");
    std::fs::write(&path, "whatever").unwrap();

    let mut manager = InputManager::new();
    assert!(matches!(
        manager.extract_text(&path).await,
        Err(SkillExtractorError::UnsupportedFormat(_))
    ));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("does/not/exist.txt")).await;
    assert!(matches!(result, Err(SkillExtractorError::InvalidInput(_))));
}
