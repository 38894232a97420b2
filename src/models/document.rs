//! Generated document and its statistics.

use serde::{Deserialize, Serialize};

use super::SourceLink;
use crate::utils::{char_count, estimate_pages, word_count};

/// Text statistics reported alongside a generated document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Whitespace-delimited tokens
    pub words: usize,

    /// Unicode scalar values, not bytes
    pub chars: usize,

    /// `chars / 1800` rounded to one decimal; a heuristic, not real pagination
    pub pages: f64,
}

impl DocumentStats {
    /// Compute statistics for a piece of text
    pub fn of(text: &str) -> Self {
        let chars = char_count(text);
        Self {
            words: word_count(text),
            chars,
            pages: estimate_pages(chars),
        }
    }
}

/// Result of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Final text, including the cover page when one was prepended
    pub text: String,

    pub stats: DocumentStats,

    /// References actually embedded into the prompt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_used: Vec<SourceLink>,
}

impl GenerationResult {
    /// Build a result, deriving stats from the text
    pub fn new(text: String, sources_used: Vec<SourceLink>) -> Self {
        let stats = DocumentStats::of(&text);
        Self {
            text,
            stats,
            sources_used,
        }
    }
}
