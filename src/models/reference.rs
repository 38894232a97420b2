//! Reference material fetched from Wikipedia.

use serde::{Deserialize, Serialize};

/// A search hit from the reference source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,

    /// Plain-text snippet with HTML markup removed
    pub snippet: String,

    #[serde(default)]
    pub wordcount: u64,

    #[serde(default)]
    pub pageid: u64,
}

impl SearchHit {
    /// Create a hit with only a title and snippet
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            wordcount: 0,
            pageid: 0,
        }
    }
}

/// Article text used as grounding context for generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMaterial {
    pub title: String,

    /// Plain-text content, bounded to the budget it was fetched with
    pub content: String,

    pub url: String,
}

impl ReferenceMaterial {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            url: url.into(),
        }
    }

    /// Title and URL, for reporting which sources were used
    pub fn link(&self) -> SourceLink {
        SourceLink {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// Title/URL pair of a reference that was embedded into a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    pub url: String,
}

/// Join several articles into one block of reference text
pub fn combine_references(materials: &[ReferenceMaterial]) -> String {
    materials
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| format!("=== {} ===\n{}", m.title, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_references_skips_empty() {
        let materials = vec![
            ReferenceMaterial::new("Photosynthesis", "Plants convert light.", "u1"),
            ReferenceMaterial::new("Empty", "   ", "u2"),
            ReferenceMaterial::new("Chlorophyll", "A green pigment.", "u3"),
        ];

        let combined = combine_references(&materials);
        assert_eq!(
            combined,
            "=== Photosynthesis ===\nPlants convert light.\n\n=== Chlorophyll ===\nA green pigment."
        );
    }

    #[test]
    fn test_combine_references_empty() {
        assert!(combine_references(&[]).is_empty());
    }
}
