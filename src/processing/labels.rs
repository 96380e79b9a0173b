//! Bilingual label formatting and localized summary notes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered in place of a translation that the catalog does not have
pub const MISSING_TRANSLATION: &str = "—";

/// Display language; affects label order and notes, never matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Arabic,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ar" | "arabic" | "العربية" => Ok(Language::Arabic),
            _ => Err(format!("Invalid language: {}. Supported: en, ar", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Arabic => write!(f, "العربية"),
        }
    }
}

/// Combine the English and Arabic names, native language first
pub fn format_label(name_en: &str, name_ar: Option<&str>, language: Language) -> String {
    let ar = name_ar
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_TRANSLATION);

    match language {
        Language::Arabic => format!("{} / {}", ar, name_en),
        Language::English => format!("{} / {}", name_en, ar),
    }
}

pub fn detected_note(count: usize, threshold: f32, language: Language) -> String {
    match language {
        Language::Arabic => format!("✔️ تم التعرف على {} مهارة بدقة ≥ {}", count, threshold),
        Language::English => format!("✔️ Detected {} skills with similarity ≥ {}", count, threshold),
    }
}

pub fn empty_input_note(language: Language) -> String {
    match language {
        Language::Arabic => "⚠️ نص السيرة الذاتية فارغ.".to_string(),
        Language::English => "⚠️ Empty CV text.".to_string(),
    }
}

pub fn catalog_mismatch_note(language: Language) -> String {
    match language {
        Language::Arabic => "⚠️ عدم تطابق بين قائمة المهارات والتضمينات.".to_string(),
        Language::English => "⚠️ Mismatch between skills list and embeddings.".to_string(),
    }
}

/// Title-case a skill name the way the taxonomy keys are normalized:
/// a letter is uppercased unless it follows a cased letter. Uncased scripts
/// such as Arabic do not start a new word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_cased = false;

    for c in text.chars() {
        if previous_is_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_cased = c.is_lowercase() || c.is_uppercase();
    }

    out
}
