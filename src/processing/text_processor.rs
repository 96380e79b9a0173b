//! Candidate-sentence segmentation and basic document statistics

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub character_count: usize,
    pub word_count: usize,
    pub line_count: usize,
}

/// Line boundaries as produced by PDF and word-processor exports,
/// including form feeds between pages and the Unicode line/paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lines between breaks; `\r\n` is one break and a trailing break adds no line
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest.filter(|r| !r.is_empty())?;
        match current.char_indices().find(|&(_, c)| is_line_break(c)) {
            Some((i, c)) => {
                let mut next = i + c.len_utf8();
                if c == '\r' && current[next..].starts_with('\n') {
                    next += 1;
                }
                rest = Some(&current[next..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Split text into candidate sentences: one per non-empty trimmed line.
///
/// Resumes present one bullet or fact per line, so lines are the matching unit
/// rather than grammatical sentences.
pub fn split_candidate_sentences(text: &str) -> Vec<&str> {
    split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

impl DocumentStats {
    pub fn from_text(text: &str) -> Self {
        Self {
            character_count: text.chars().count(),
            word_count: text.unicode_words().count(),
            line_count: split_lines(text).count(),
        }
    }
}
