//! Skill extractor: bilingual resume skill extraction

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use skill_extractor::catalog::CatalogProvider;
use skill_extractor::cli::{self, CatalogAction, Cli, Commands, ConfigAction, ModelAction};
use skill_extractor::config::Config;
use skill_extractor::error::{Result, SkillExtractorError};
use skill_extractor::input::InputManager;
use skill_extractor::output::{save_report_to_file, ReportGenerator, ReportMetadata, SkillReport};
use skill_extractor::processing::embedding_manager::EmbeddingModelManager;
use skill_extractor::processing::embeddings::{Embedder, EmbeddingEngine};
use skill_extractor::processing::matcher::SimilarityMatcher;
use skill_extractor::processing::text_processor::DocumentStats;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(message.to_string());
    bar
}

/// Resolve, download if needed, and load the embedding model
async fn load_embedder(config: &Config, requested: Option<String>) -> Result<EmbeddingEngine> {
    let requested = requested.unwrap_or_else(|| config.models.default_embedding_model.clone());
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
    let model_id = manager
        .resolve_model_id(&requested)
        .ok_or_else(|| SkillExtractorError::ModelNotFound(requested.clone()))?;

    let bar = spinner(&format!("Preparing embedding model {}", model_id));
    let model_path = manager.ensure_model_available(&model_id).await;
    bar.finish_and_clear();
    let model_path = model_path?;

    let config = config.clone();
    tokio::task::spawn_blocking(move || EmbeddingEngine::new(&model_path, &config))
        .await
        .map_err(|e| SkillExtractorError::ModelError(format!("model loading task failed: {}", e)))?
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            lang,
            threshold,
            embedding,
            output,
            save,
            stats,
        } => {
            cli::validate_file_extension(&resume, &["pdf", "txt", "md"])
                .map_err(|e| SkillExtractorError::InvalidInput(format!("Resume file: {}", e)))?;

            let language = match lang {
                Some(lang) => cli::parse_language(&lang).map_err(SkillExtractorError::InvalidInput)?,
                None => config.matching.language,
            };
            let output_format = match output {
                Some(output) => cli::parse_output_format(&output).map_err(SkillExtractorError::InvalidInput)?,
                None => config.output.format.clone(),
            };
            let matcher = SimilarityMatcher::new(threshold.unwrap_or(config.matching.threshold), language)?;

            let catalog = Arc::new(CatalogProvider::new(config.catalog.clone()).load()?);
            let embedder = Arc::new(load_embedder(&config, embedding).await?);

            let mut input_manager = InputManager::new().with_cache(config.processing.enable_caching);
            let text = input_manager.extract_text(&resume).await?;
            info!("Extracted {} characters from {}", text.len(), resume.display());

            let start_time = Instant::now();
            let document_stats = stats.then(|| DocumentStats::from_text(&text));
            let outcome = {
                let catalog = Arc::clone(&catalog);
                let embedder = Arc::clone(&embedder);
                tokio::task::spawn_blocking(move || matcher.analyze(&text, &catalog, embedder.as_ref()))
                    .await
                    .map_err(|e| SkillExtractorError::Embedding(format!("matching task failed: {}", e)))??
            };

            let mut metadata = ReportMetadata::new(
                resume.to_string_lossy(),
                embedder.model_name(),
                catalog.len(),
            );
            metadata.processing_time_ms = start_time.elapsed().as_millis() as u64;

            let mut report = SkillReport::new(outcome, metadata);
            if let Some(document_stats) = document_stats {
                report = report.with_stats(document_stats);
            }

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                config.matching.top_keys,
                config.output.pretty_json,
                true,
            );
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    save_report_to_file(&rendered, &path)?;
                    println!("✅ Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Catalog { action } => match action {
            CatalogAction::Build { embedding } => {
                let embedder = load_embedder(&config, embedding).await?;
                let provider = CatalogProvider::new(config.catalog.clone());

                let bar = spinner("Embedding catalog skills");
                let written = tokio::task::spawn_blocking(move || provider.build_reference_embeddings(&embedder))
                    .await
                    .map_err(|e| SkillExtractorError::CatalogBuild(format!("build task failed: {}", e)))?;
                bar.finish_and_clear();

                println!("✅ Reference embeddings written to {}", written?.display());
            }

            CatalogAction::Info => {
                let catalog = CatalogProvider::new(config.catalog.clone()).load()?;
                let translated = catalog.entries().filter(|e| e.name_ar.is_some()).count();

                println!("📚 Skill Catalog\n");
                println!("Skills: {}", catalog.len());
                println!("Embedding dimensions: {}", catalog.dimension());
                println!(
                    "Arabic translations: {} of {} ({:.1}%)",
                    translated,
                    catalog.len(),
                    if catalog.is_empty() { 0.0 } else { translated as f64 * 100.0 / catalog.len() as f64 }
                );
                println!("Names: {}", config.catalog.skills_list.display());
                println!("Translations: {}", config.catalog.skills_master.display());
                println!("Embeddings: {}", config.catalog.embeddings.display());
            }
        },

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("🧠 Embedding Models\n");
                    for (id, info) in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(id) { "✅ Downloaded" } else { "⬇️  Available" };
                        println!("  • {} ({}) - {} MB [{}]", id, info.repo_id, info.size_mb, status);
                        println!("    {}", info.description);
                    }
                    println!("\nDefault: {}", config.models.default_embedding_model);
                }

                ModelAction::Download { model, force } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| SkillExtractorError::ModelNotFound(model.clone()))?;

                    if !force && manager.is_model_downloaded(&model_id) {
                        println!("✅ Model '{}' is already downloaded! Use --force to re-download", model_id);
                        return Ok(());
                    }

                    let bar = spinner(&format!("Downloading {}", model_id));
                    let path = manager.download_model(&model_id, force).await;
                    bar.finish_and_clear();
                    println!("✅ Model '{}' downloaded to {}", model_id, path?.display());
                }

                ModelAction::Info { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| SkillExtractorError::ModelNotFound(model.clone()))?;
                    let info = manager
                        .get_model_info(&model_id)
                        .ok_or_else(|| SkillExtractorError::ModelNotFound(model.clone()))?;

                    println!("📋 Model Information for '{}'\n", model_id);
                    println!("Name: {}", info.name);
                    println!("Repository: {}", info.repo_id);
                    println!("Size: {} MB", info.size_mb);
                    println!("Dimensions: {}", info.dimensions);
                    println!("Multilingual: {}", if info.multilingual { "yes" } else { "no" });
                    println!("Description: {}", info.description);
                    match manager.get_model_path(&model_id) {
                        Some(path) => println!("Status: ✅ Downloaded ({})", path.display()),
                        None => println!("Status: ⬇️  Run `skill-extractor models download {}`", model_id),
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Models Directory: {}", config.models_dir().display());
                println!("Embedding Model: {}", config.models.default_embedding_model);
                println!("Threshold: {}", config.matching.threshold);
                println!("Language: {}", config.matching.language);
                println!("Skills List: {}", config.catalog.skills_list.display());
                println!("Skills Master: {}", config.catalog.skills_master.display());
                println!("Reference Embeddings: {}", config.catalog.embeddings.display());
            }

            Some(ConfigAction::Reset) => {
                let defaults = Config::default();
                match &config_path {
                    Some(path) => defaults.save_to(path)?,
                    None => defaults.save()?,
                }
                println!("✅ Configuration reset to defaults");
            }
        },
    }

    Ok(())
}
