//! Rendering of skill reports for the terminal, JSON consumers and Markdown

pub mod formatter;
pub mod report;

pub use formatter::{save_report_to_file, suggest_filename, ReportGenerator};
pub use report::{ReportMetadata, SkillReport};
