//! Prompt templates, one per [`Mode`].

use crate::models::{Mode, StyleTier, VolumeTier};
use crate::utils::truncate_at_sentence;

/// Upper bound on reference text embedded into a prompt, in characters
pub const MAX_REFERENCE_CHARS: usize = 12_000;

/// Language the documents are written in unless configured otherwise
pub const DEFAULT_LANGUAGE: &str = "Russian";

/// Builds generation prompts
#[derive(Debug, Clone)]
pub struct PromptComposer {
    language: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

/// Section layout and wording for one mode
struct Template {
    task: String,
    requirements: Vec<&'static str>,
    structure: String,
    closing: Option<&'static str>,
}

impl PromptComposer {
    /// Create a composer that asks for documents in `language`
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Output language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Build the prompt for one document.
    ///
    /// A non-empty `reference_text` is embedded (capped at
    /// [`MAX_REFERENCE_CHARS`]) with instructions to paraphrase it and not
    /// to cite it; otherwise the model is told to write from its own
    /// knowledge of the topic.
    pub fn compose_prompt(
        &self,
        mode: Mode,
        topic: &str,
        volume: VolumeTier,
        style: StyleTier,
        reference_text: Option<&str>,
    ) -> String {
        let topic = topic.trim();
        let reference = reference_text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| truncate_at_sentence(text, MAX_REFERENCE_CHARS));

        let template = template(mode, topic, reference.is_some());
        let mut prompt = String::new();

        match reference {
            Some(text) => {
                prompt.push_str(
                    "Use the reference material below as the factual basis of the text.\n\
                     Retell it in your own words: do not quote it verbatim, \
                     and do not cite or mention the source.\n\n",
                );
                prompt.push_str("--- REFERENCE MATERIAL ---\n");
                prompt.push_str(text);
                prompt.push_str("\n--- END OF REFERENCE MATERIAL ---\n\n");
            }
            None => {
                prompt.push_str("Compose the text freely from your own knowledge of the topic.\n\n");
            }
        }

        prompt.push_str(&template.task);
        prompt.push_str("\n\nRequirements:\n");
        prompt.push_str(&format!("- Volume: {}\n", volume.phrase()));
        prompt.push_str(&format!("- Style: {}\n", style.phrase()));
        prompt.push_str(&format!("- Language: {}\n", self.language));
        for requirement in &template.requirements {
            prompt.push_str(&format!("- {}\n", requirement));
        }

        prompt.push_str("\nStructure:\n");
        prompt.push_str(&template.structure);

        if let Some(closing) = template.closing {
            prompt.push('\n');
            prompt.push_str(closing);
            prompt.push('\n');
        }

        prompt
    }
}

fn template(mode: Mode, topic: &str, has_reference: bool) -> Template {
    match mode {
        Mode::Referat => {
            let mut structure = format!(
                "# REFERAT\n\
                 ## Topic: {topic}\n\n\
                 ## INTRODUCTION\n\
                 - Relevance of the topic\n\
                 - Aim and objectives\n\n\
                 ## MAIN PART\n\
                 ### Chapter 1. [Title]\n\
                 [Content with facts]\n\n\
                 ### Chapter 2. [Title]\n\
                 [Content with facts]\n\n\
                 ## CONCLUSION\n\
                 - Findings\n"
            );
            // grounded texts must not cite their source
            if !has_reference {
                structure.push_str("\n## REFERENCES\n1. [Source]\n2. [Source]\n");
            }
            Template {
                task: format!("Write a report (referat) on the topic: \"{topic}\""),
                requirements: vec!["Real facts, dates and names"],
                structure,
                closing: Some("Write with substance, so the work can be shown to a teacher."),
            }
        }
        Mode::Conspect => Template {
            task: format!("Write study notes (conspect) on the topic: \"{topic}\""),
            requirements: Vec::new(),
            structure: format!(
                "# CONSPECT: {topic}\n\n\
                 ## Key terms\n\
                 **Term** - definition\n\n\
                 ## Content\n\
                 ### 1. [Section]\n\
                 - Fact\n\
                 - Fact\n\n\
                 ### 2. [Section]\n\
                 - Fact\n\n\
                 ## Conclusions\n\
                 1. Conclusion\n\
                 2. Conclusion\n"
            ),
            closing: Some("Write real information on the topic."),
        },
        Mode::Doklad => Template {
            task: format!("Write a talk (doklad) on the topic: \"{topic}\""),
            requirements: vec!["Meant to be read aloud in front of a class"],
            structure: format!(
                "# DOKLAD: {topic}\n\n\
                 ## Opening\n\
                 Hello! The topic of my talk is...\n\n\
                 ## Main part\n\
                 [A detailed account with facts]\n\n\
                 ## Closing\n\
                 Thank you for your attention!\n"
            ),
            closing: Some("Make it engaging and informative."),
        },
        Mode::Question => Template {
            task: format!("Answer the question: \"{topic}\""),
            requirements: Vec::new(),
            structure: format!(
                "# Question: {topic}\n\n\
                 ## Short answer\n\
                 [2-3 sentences]\n\n\
                 ## Detailed answer\n\
                 [A thorough explanation]\n\n\
                 ## Examples\n\
                 1. Example\n\
                 2. Example\n\n\
                 ## Conclusion\n\
                 [Summary]\n"
            ),
            closing: None,
        },
        Mode::Retell => Template {
            task: format!("Retell the text: \"{topic}\""),
            requirements: Vec::new(),
            structure: "# RETELLING\n\n\
                        ## In brief\n\
                        [What the text is about]\n\n\
                        ## Detailed retelling\n\
                        [The content in your own words]\n\n\
                        ## Main idea\n\
                        [What the author wanted to say]\n"
                .to_string(),
            closing: None,
        },
        Mode::Essay => Template {
            task: format!("Write an essay on the topic: \"{topic}\""),
            requirements: vec!["Personal reflections"],
            structure: format!(
                "# ESSAY: {topic}\n\n\
                 *\"Epigraph\"*\n\n\
                 ## Introduction\n\
                 [Lead-in to the topic]\n\n\
                 ## Reflections\n\
                 [Thoughts backed by arguments and examples]\n\n\
                 ## Conclusion\n\
                 [Personal conclusions]\n"
            ),
            closing: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::char_count;

    fn compose(mode: Mode, reference: Option<&str>) -> String {
        PromptComposer::default().compose_prompt(
            mode,
            "Photosynthesis",
            VolumeTier::Medium,
            StyleTier::Scientific,
            reference,
        )
    }

    #[test]
    fn test_unknown_mode_matches_referat() {
        let explicit = compose(Mode::Referat, None);
        let fallback = compose(Mode::from_name("limerick"), None);
        assert_eq!(explicit, fallback);
    }

    #[test]
    fn test_prompt_contains_tier_phrases_and_language() {
        let prompt = compose(Mode::Referat, None);
        assert!(prompt.contains("3-5 pages"));
        assert!(prompt.contains("scientific academic style"));
        assert!(prompt.contains("Language: Russian"));
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("## INTRODUCTION"));
        assert!(prompt.contains("## REFERENCES"));
        assert!(prompt.starts_with("Compose the text freely"));
    }

    #[test]
    fn test_each_mode_has_its_own_structure() {
        let markers = [
            (Mode::Referat, "# REFERAT"),
            (Mode::Conspect, "## Key terms"),
            (Mode::Doklad, "Thank you for your attention!"),
            (Mode::Question, "## Short answer"),
            (Mode::Retell, "## Main idea"),
            (Mode::Essay, "Epigraph"),
        ];

        for (mode, marker) in markers {
            let prompt = compose(mode, None);
            assert!(prompt.contains(marker), "{} prompt lacks {:?}", mode, marker);
        }
    }

    #[test]
    fn test_reference_block_embedded() {
        let prompt = compose(Mode::Conspect, Some("Chlorophyll absorbs light."));
        assert!(prompt.starts_with("Use the reference material below"));
        assert!(prompt.contains("do not quote it verbatim"));
        assert!(prompt.contains("do not cite or mention the source"));
        assert!(prompt.contains("Chlorophyll absorbs light."));
        assert!(!prompt.contains("Compose the text freely"));
    }

    #[test]
    fn test_blank_reference_treated_as_absent() {
        assert_eq!(compose(Mode::Essay, Some("  \n ")), compose(Mode::Essay, None));
    }

    #[test]
    fn test_referat_drops_reference_list_when_grounded() {
        let prompt = compose(Mode::Referat, Some("Some grounding text."));
        assert!(!prompt.contains("## REFERENCES"));
    }

    #[test]
    fn test_reference_text_is_capped() {
        let huge = "Лист поглощает свет. ".repeat(5_000);
        let prompt = compose(Mode::Referat, Some(&huge));

        let marker = "--- REFERENCE MATERIAL ---\n";
        let start = prompt.find(marker).unwrap() + marker.len();
        let end = prompt.find("\n--- END OF REFERENCE MATERIAL ---").unwrap();
        let embedded = &prompt[start..end];

        assert!(char_count(embedded) <= MAX_REFERENCE_CHARS);
        assert!(embedded.ends_with('.'));
    }

    #[test]
    fn test_custom_language() {
        let prompt = PromptComposer::new("English").compose_prompt(
            Mode::Question,
            "Why is the sky blue?",
            VolumeTier::Short,
            StyleTier::Simple,
            None,
        );
        assert!(prompt.contains("Language: English"));
        assert!(prompt.contains("1-2 pages"));
        assert!(prompt.contains("simple, plain language"));
    }
}
