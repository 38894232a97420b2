//! Configuration management.
//!
//! Settings come from an optional TOML file layered under environment
//! variables prefixed with `AUTOCONSPECT_` (nested keys use `__`, e.g.
//! `AUTOCONSPECT_SERVER__PORT=8080`). The Gemini key additionally defaults
//! from `GEMINI_API_KEY`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! gemini = "your-gemini-key"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! static_dir = "./static"
//!
//! [generation]
//! candidate_models = ["gemini-2.0-flash", "gemini-1.5-flash"]
//! request_timeout_secs = 90
//! output_language = "Russian"
//!
//! [wikipedia]
//! default_lang = "ru"
//! search_limit = 8
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::GEMINI_API_BASE;
use crate::composer::DEFAULT_LANGUAGE;
use crate::connector::DEFAULT_CANDIDATE_MODELS;
use crate::models::WikiLang;
use crate::utils::DEFAULT_USER_AGENT;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "autoconspect.toml";

const ENV_PREFIX: &str = "AUTOCONSPECT";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_keys: ApiKeys,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Google Gemini API key
    #[serde(default = "gemini_key_from_env")]
    pub gemini: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            gemini: gemini_key_from_env(),
        }
    }
}

fn gemini_key_from_env() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the browser front end, served for unmatched paths
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Model selection and generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Models tried at startup, best first
    #[serde(default = "default_candidate_models")]
    pub candidate_models: Vec<String>,

    /// Total time allowed for one generation call. Long documents arrive in a
    /// single response, so this is well above the Wikipedia timeouts.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Language the documents are written in
    #[serde(default = "default_output_language")]
    pub output_language: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            candidate_models: default_candidate_models(),
            request_timeout_secs: default_request_timeout(),
            output_language: default_output_language(),
            api_base: default_api_base(),
        }
    }
}

fn default_candidate_models() -> Vec<String> {
    DEFAULT_CANDIDATE_MODELS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_request_timeout() -> u64 {
    90
}

fn default_output_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_api_base() -> String {
    GEMINI_API_BASE.to_string()
}

/// Wikipedia client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    #[serde(default)]
    pub default_lang: WikiLang,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl WikipediaConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            default_lang: WikiLang::default(),
            search_limit: default_search_limit(),
            search_timeout_secs: default_search_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_search_limit() -> usize {
    8
}

fn default_search_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// The Gemini key, or an empty string when none is configured
    pub fn gemini_key(&self) -> &str {
        self.api_keys.gemini.as_deref().unwrap_or("")
    }

    /// Render the configuration as TOML with the API key masked
    pub fn to_toml_redacted(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        redacted.api_keys.gemini = self
            .api_keys
            .gemini
            .as_deref()
            .map(|key| format!("<redacted, {} characters>", key.chars().count()));
        toml::to_string_pretty(&redacted)
    }
}

/// Load configuration from an optional file, overridden by the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("generation.candidate_models"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Locate a configuration file: `./autoconspect.toml`, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("autoconspect").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.generation.candidate_models[0], "gemini-2.0-flash");
        assert_eq!(config.generation.request_timeout(), Duration::from_secs(90));
        assert!(config.wikipedia.search_timeout() <= Duration::from_secs(15));
        assert!(config.wikipedia.fetch_timeout() <= Duration::from_secs(15));
        assert_eq!(config.generation.output_language, "Russian");
        assert_eq!(config.wikipedia.default_lang, WikiLang::Ru);
        assert_eq!(config.wikipedia.search_limit, 8);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("autoconspect.toml");
        std::fs::write(
            &path,
            r#"
[api_keys]
gemini = "file-key-1234567890"

[server]
port = 8080
static_dir = "./static"

[generation]
candidate_models = ["gemini-1.5-pro"]
output_language = "English"

[wikipedia]
default_lang = "en"
fetch_timeout_secs = 30

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.gemini_key(), "file-key-1234567890");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.static_dir, Some(PathBuf::from("./static")));
        assert_eq!(config.generation.candidate_models, vec!["gemini-1.5-pro"]);
        assert_eq!(config.generation.output_language, "English");
        assert_eq!(config.generation.request_timeout_secs, 90);
        assert_eq!(config.wikipedia.default_lang, WikiLang::En);
        assert_eq!(config.wikipedia.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.wikipedia.search_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_config_nonexistent() {
        let path = PathBuf::from("/nonexistent/autoconspect.toml");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_redacted_toml_hides_key() {
        let mut config = Config::default();
        config.api_keys.gemini = Some("super-secret-key-value".to_string());

        let rendered = config.to_toml_redacted().unwrap();
        assert!(!rendered.contains("super-secret-key-value"));
        assert!(rendered.contains("<redacted, 22 characters>"));
        assert!(rendered.contains("port = 5000"));
    }
}
