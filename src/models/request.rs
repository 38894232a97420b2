//! Generation request models.
//!
//! Every selector enum here is lenient on input: an absent, `null` or
//! unrecognised value deserializes to the documented default instead of
//! failing the request.

use serde::{Deserialize, Deserializer, Serialize};

/// Document genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Mode {
    /// School/university report with chapters
    #[default]
    Referat,
    /// Structured study notes
    Conspect,
    /// Text for a spoken presentation
    Doklad,
    /// Answer to a question
    Question,
    /// Retelling of a text
    Retell,
    /// Personal essay
    Essay,
}

impl Mode {
    /// All modes, in menu order
    pub const ALL: [Mode; 6] = [
        Mode::Referat,
        Mode::Conspect,
        Mode::Doklad,
        Mode::Question,
        Mode::Retell,
        Mode::Essay,
    ];

    /// Parse a mode name, falling back to [`Mode::Referat`]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "referat" => Mode::Referat,
            "conspect" => Mode::Conspect,
            "doklad" => Mode::Doklad,
            "question" => Mode::Question,
            "retell" => Mode::Retell,
            "essay" => Mode::Essay,
            _ => Mode::default(),
        }
    }

    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Referat => "referat",
            Mode::Conspect => "conspect",
            Mode::Doklad => "doklad",
            Mode::Question => "question",
            Mode::Retell => "retell",
            Mode::Essay => "essay",
        }
    }

    /// Whether a cover page may be prepended to documents of this mode
    pub fn supports_cover_page(&self) -> bool {
        matches!(self, Mode::Referat | Mode::Doklad | Mode::Essay)
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        Mode::from_name(&value)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse target length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VolumeTier {
    Short,
    #[default]
    Medium,
    Long,
    VeryLong,
}

impl VolumeTier {
    /// Parse a tier name, falling back to [`VolumeTier::Medium`]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "short" => VolumeTier::Short,
            "medium" => VolumeTier::Medium,
            "long" => VolumeTier::Long,
            "very_long" | "very-long" => VolumeTier::VeryLong,
            _ => VolumeTier::default(),
        }
    }

    /// Descriptive length phrase handed to the model
    pub fn phrase(&self) -> &'static str {
        match self {
            VolumeTier::Short => "1-2 pages",
            VolumeTier::Medium => "3-5 pages",
            VolumeTier::Long => "6-10 pages",
            VolumeTier::VeryLong => "10-15 pages",
        }
    }
}

impl From<String> for VolumeTier {
    fn from(value: String) -> Self {
        VolumeTier::from_name(&value)
    }
}

/// Register / audience of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum StyleTier {
    #[default]
    Scientific,
    Simple,
    School,
    University,
}

impl StyleTier {
    /// Parse a style name, falling back to [`StyleTier::Scientific`]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "scientific" => StyleTier::Scientific,
            "simple" => StyleTier::Simple,
            "school" => StyleTier::School,
            "university" => StyleTier::University,
            _ => StyleTier::default(),
        }
    }

    /// Descriptive style phrase handed to the model
    pub fn phrase(&self) -> &'static str {
        match self {
            StyleTier::Scientific => "scientific academic style",
            StyleTier::Simple => "simple, plain language",
            StyleTier::School => "language suited to a school pupil",
            StyleTier::University => "language suited to a university student",
        }
    }
}

impl From<String> for StyleTier {
    fn from(value: String) -> Self {
        StyleTier::from_name(&value)
    }
}

/// Wikipedia language edition used for reference material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum WikiLang {
    #[default]
    Ru,
    En,
    Uk,
    De,
    Fr,
    Es,
}

impl WikiLang {
    /// Parse a language code, falling back to [`WikiLang::Ru`]
    pub fn from_code(code: &str) -> Self {
        Self::parse(code).unwrap_or_default()
    }

    /// Parse a language code strictly
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ru" => Some(WikiLang::Ru),
            "en" => Some(WikiLang::En),
            "uk" => Some(WikiLang::Uk),
            "de" => Some(WikiLang::De),
            "fr" => Some(WikiLang::Fr),
            "es" => Some(WikiLang::Es),
            _ => None,
        }
    }

    /// Subdomain code of the language edition
    pub fn code(&self) -> &'static str {
        match self {
            WikiLang::Ru => "ru",
            WikiLang::En => "en",
            WikiLang::Uk => "uk",
            WikiLang::De => "de",
            WikiLang::Fr => "fr",
            WikiLang::Es => "es",
        }
    }
}

impl From<String> for WikiLang {
    fn from(value: String) -> Self {
        WikiLang::from_code(&value)
    }
}

impl std::fmt::Display for WikiLang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Education type of the author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum EduType {
    /// University or college student
    #[default]
    Student,
    /// School pupil
    Pupil,
}

impl EduType {
    /// Parse an education type; the Russian labels of the original front end are accepted too
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pupil" | "ученик" | "ученица" => EduType::Pupil,
            _ => EduType::Student,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EduType::Student => "Student",
            EduType::Pupil => "Pupil",
        }
    }

    /// Grade/course phrase: pupils are in a grade, students in a year
    pub fn grade_phrase(&self, grade: &str) -> String {
        match self {
            EduType::Pupil => format!("grade {}", grade),
            EduType::Student => format!("year {}", grade),
        }
    }
}

impl From<String> for EduType {
    fn from(value: String) -> Self {
        EduType::from_name(&value)
    }
}

/// Author metadata for the cover page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub edu_type: EduType,

    /// Grade (pupils) or course year (students)
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub group: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub teacher: String,

    /// Prepend a cover page to the generated document
    #[serde(default, rename = "include_title", alias = "include_title_page")]
    pub include_title_page: bool,
}

/// A request to generate one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Mode,

    #[serde(default, deserialize_with = "lenient_string")]
    pub topic: String,

    #[serde(default, rename = "volume", deserialize_with = "lenient")]
    pub volume_tier: VolumeTier,

    #[serde(default, rename = "style", deserialize_with = "lenient")]
    pub style_tier: StyleTier,

    #[serde(default, deserialize_with = "lenient")]
    pub author_info: AuthorInfo,

    /// Wikipedia article titles to ground the text in
    #[serde(default, rename = "wiki_titles", deserialize_with = "lenient")]
    pub reference_titles: Vec<String>,

    #[serde(default, rename = "wiki_lang", deserialize_with = "lenient")]
    pub reference_lang: WikiLang,
}

impl GenerationRequest {
    /// Create a request for a topic with default settings
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    /// Set the mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the volume tier
    pub fn volume(mut self, volume: VolumeTier) -> Self {
        self.volume_tier = volume;
        self
    }

    /// Set the style tier
    pub fn style(mut self, style: StyleTier) -> Self {
        self.style_tier = style;
        self
    }

    /// Set author metadata
    pub fn author(mut self, author: AuthorInfo) -> Self {
        self.author_info = author;
        self
    }

    /// Add a Wikipedia reference title
    pub fn reference(mut self, title: impl Into<String>) -> Self {
        self.reference_titles.push(title.into());
        self
    }

    /// Set the Wikipedia language edition
    pub fn reference_lang(mut self, lang: WikiLang) -> Self {
        self.reference_lang = lang;
        self
    }

    /// Topic with surrounding whitespace removed
    pub fn trimmed_topic(&self) -> &str {
        self.topic.trim()
    }
}

/// Deserialize `null` as the type's default
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize strings, numbers and `null` into a `String`
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_selectors_fall_back() {
        assert_eq!(Mode::from_name("poem"), Mode::Referat);
        assert_eq!(VolumeTier::from_name("huge"), VolumeTier::Medium);
        assert_eq!(StyleTier::from_name(""), StyleTier::Scientific);
        assert_eq!(WikiLang::from_code("xx"), WikiLang::Ru);
    }

    #[test]
    fn test_request_deserialize_full() {
        let json = r#"{
            "mode": "essay",
            "topic": "Photosynthesis",
            "volume": "very_long",
            "style": "school",
            "author_info": {"edu_type": "Pupil", "grade": 9, "include_title": true},
            "wiki_titles": ["Photosynthesis"],
            "wiki_lang": "en"
        }"#;

        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.mode, Mode::Essay);
        assert_eq!(request.volume_tier, VolumeTier::VeryLong);
        assert_eq!(request.style_tier, StyleTier::School);
        assert_eq!(request.author_info.edu_type, EduType::Pupil);
        assert_eq!(request.author_info.grade, "9");
        assert!(request.author_info.include_title_page);
        assert_eq!(request.reference_titles, vec!["Photosynthesis".to_string()]);
        assert_eq!(request.reference_lang, WikiLang::En);
    }

    #[test]
    fn test_request_deserialize_lenient() {
        let json = r#"{"mode": null, "topic": "Volcanoes", "volume": "enormous", "style": 5}"#;
        let request: Result<GenerationRequest, _> = serde_json::from_str(json);
        // a numeric style is a type error, not an unknown value
        assert!(request.is_err());

        let json = r#"{"mode": null, "topic": "Volcanoes", "volume": "enormous", "author_info": null}"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.mode, Mode::Referat);
        assert_eq!(request.volume_tier, VolumeTier::Medium);
        assert_eq!(request.style_tier, StyleTier::Scientific);
        assert_eq!(request.author_info, AuthorInfo::default());
        assert!(request.reference_titles.is_empty());
    }

    #[test]
    fn test_russian_edu_type_labels() {
        assert_eq!(EduType::from_name("Ученик"), EduType::Pupil);
        assert_eq!(EduType::from_name("Студент"), EduType::Student);
        assert_eq!(EduType::Pupil.grade_phrase("9"), "grade 9");
        assert_eq!(EduType::Student.grade_phrase("2"), "year 2");
    }

    #[test]
    fn test_cover_page_modes() {
        let with_cover: Vec<Mode> = Mode::ALL
            .into_iter()
            .filter(Mode::supports_cover_page)
            .collect();
        assert_eq!(with_cover, vec![Mode::Referat, Mode::Doklad, Mode::Essay]);
    }
}
