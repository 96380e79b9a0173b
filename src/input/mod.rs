//! Document text extraction: turns PDF, plain-text and Markdown resumes into
//! the plain text the matcher consumes

pub mod text_extractor;
pub mod manager;

pub use manager::InputManager;
pub use text_extractor::DocumentKind;
