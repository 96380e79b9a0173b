//! Output formatters for skill reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::SkillReport;
use crate::processing::labels::Language;
use crate::processing::matcher::OutcomeStatus;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &SkillReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    top_keys: usize,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

struct Headings {
    title: &'static str,
    skills: &'static str,
    keys: &'static str,
    none: &'static str,
    stats: &'static str,
}

fn headings(language: Language) -> Headings {
    match language {
        Language::Arabic => Headings {
            title: "🧠 المهارات المكتشفة",
            skills: "المهارات",
            keys: "الكلمات المفتاحية للتوصيات",
            none: "لم يتم العثور على مهارات.",
            stats: "إحصائيات أساسية",
        },
        Language::English => Headings {
            title: "🧠 Detected Skills",
            skills: "Skills",
            keys: "Keys for recommendations",
            none: "No skills detected.",
            stats: "Basic Statistics",
        },
    }
}

fn percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, top_keys: usize) -> Self {
        Self { use_colors, top_keys }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn score_color(score: f32) -> Color {
        if score >= 0.85 {
            Color::Green
        } else if score >= 0.75 {
            Color::Cyan
        } else {
            Color::Yellow
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &SkillReport) -> Result<String> {
        let outcome = &report.outcome;
        let h = headings(outcome.language);
        let mut output = String::new();

        let title = if self.use_colors {
            h.title.bold().to_string()
        } else {
            h.title.to_string()
        };
        output.push_str(&format!("{}\n{}\n", title, "=".repeat(40)));

        let note_color = match outcome.status {
            OutcomeStatus::Detected if !outcome.is_empty() => Color::Green,
            OutcomeStatus::Detected => Color::Yellow,
            OutcomeStatus::EmptyInput | OutcomeStatus::CatalogMismatch => Color::Red,
        };
        output.push_str(&format!("{}\n\n", self.colorize(&outcome.note, note_color)));

        if outcome.is_empty() {
            output.push_str(&format!("{}\n", self.colorize(h.none, Color::Yellow)));
        } else {
            output.push_str(&format!("{}:\n", h.skills));
            for (i, skill) in outcome.matches.iter().enumerate() {
                output.push_str(&format!(
                    "  {:>2}. {} ({})\n",
                    i + 1,
                    skill.label,
                    self.colorize(&percent(skill.score), Self::score_color(skill.score))
                ));
            }

            output.push_str(&format!(
                "\n{}: {}\n",
                h.keys,
                outcome.top_keys(self.top_keys).join(", ")
            ));
        }

        if let Some(stats) = &report.stats {
            output.push_str(&format!("\n{}:\n", h.stats));
            output.push_str(&format!("  • Characters: {}\n", stats.character_count));
            output.push_str(&format!("  • Words: {}\n", stats.word_count));
            output.push_str(&format!("  • Lines: {}\n", stats.line_count));
        }

        let meta = &report.metadata;
        output.push_str(&format!(
            "\n{}\n",
            self.colorize(
                &format!(
                    "{} | {} lines | {} catalog skills | {} | {}ms",
                    meta.source_file,
                    outcome.sentence_count,
                    meta.catalog_size,
                    meta.embedding_model,
                    meta.processing_time_ms
                ),
                Color::BrightBlack
            )
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &SkillReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &SkillReport) -> Result<String> {
        let outcome = &report.outcome;
        let h = headings(outcome.language);
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", h.title));
        md.push_str(&format!("> {}\n\n", outcome.note));

        if outcome.is_empty() {
            md.push_str(&format!("_{}_\n", h.none));
        } else {
            md.push_str(&format!("## {}\n\n", h.skills));
            md.push_str("| # | Skill | Score |\n|---|---|---|\n");
            for (i, skill) in outcome.matches.iter().enumerate() {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    i + 1,
                    Self::escape_cell(&skill.label),
                    percent(skill.score)
                ));
            }

            md.push_str(&format!("\n## {}\n\n", h.keys));
            for key in &outcome.english_keys {
                md.push_str(&format!("- `{}`\n", key));
            }
        }

        if let Some(stats) = &report.stats {
            md.push_str(&format!("\n## {}\n\n", h.stats));
            md.push_str(&format!("- **Characters**: {}\n", stats.character_count));
            md.push_str(&format!("- **Words**: {}\n", stats.word_count));
            md.push_str(&format!("- **Lines**: {}\n", stats.line_count));
        }

        if self.include_metadata {
            let meta = &report.metadata;
            md.push_str("\n---\n\n");
            md.push_str(&format!(
                "*Generated {} by skill-extractor v{} from `{}` using `{}` ({} catalog skills, threshold {})*\n",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                meta.extractor_version,
                meta.source_file,
                meta.embedding_model,
                meta.catalog_size,
                outcome.threshold
            ));
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, 3, true, true)
    }

    pub fn with_options(use_colors: bool, top_keys: usize, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, top_keys),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &SkillReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_skills{}.{}", base_name, timestamp_suffix, extension)
}
