use anyhow::{Context, Result};
use autoconspect::assembler::DocumentAssembler;
use autoconspect::backend::GeminiBackend;
use autoconspect::composer::PromptComposer;
use autoconspect::config::{find_config_file, load_config, Config, LogFormat};
use autoconspect::connector::ModelConnector;
use autoconspect::models::{
    AuthorInfo, EduType, GenerationRequest, Mode, StyleTier, VolumeTier, WikiLang,
};
use autoconspect::server::{run_server, AppState};
use autoconspect::wiki::{ReferenceSource, WikipediaClient};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AutoConspect - generate essays, reports and study notes with a Gemini model
#[derive(Parser, Debug)]
#[command(name = "autoconspect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate academic texts grounded in Wikipedia with a Gemini model", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Kind of document to generate
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Referat,
    Conspect,
    Doklad,
    Question,
    Retell,
    Essay,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Referat => Mode::Referat,
            ModeArg::Conspect => Mode::Conspect,
            ModeArg::Doklad => Mode::Doklad,
            ModeArg::Question => Mode::Question,
            ModeArg::Retell => Mode::Retell,
            ModeArg::Essay => Mode::Essay,
        }
    }
}

/// Target length
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum VolumeArg {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl From<VolumeArg> for VolumeTier {
    fn from(value: VolumeArg) -> Self {
        match value {
            VolumeArg::Short => VolumeTier::Short,
            VolumeArg::Medium => VolumeTier::Medium,
            VolumeArg::Long => VolumeTier::Long,
            VolumeArg::VeryLong => VolumeTier::VeryLong,
        }
    }
}

/// Writing register
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StyleArg {
    Scientific,
    Simple,
    School,
    University,
}

impl From<StyleArg> for StyleTier {
    fn from(value: StyleArg) -> Self {
        match value {
            StyleArg::Scientific => StyleTier::Scientific,
            StyleArg::Simple => StyleTier::Simple,
            StyleArg::School => StyleTier::School,
            StyleArg::University => StyleTier::University,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EduTypeArg {
    Student,
    Pupil,
}

impl From<EduTypeArg> for EduType {
    fn from(value: EduTypeArg) -> Self {
        match value {
            EduTypeArg::Student => EduType::Student,
            EduTypeArg::Pupil => EduType::Pupil,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long, short)]
        port: Option<u16>,

        /// Directory with the web front end (overrides config)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Generate one document and print it
    #[command(alias = "g")]
    Generate {
        /// Topic of the document
        topic: String,

        #[arg(long, short, value_enum, default_value_t = ModeArg::Referat)]
        mode: ModeArg,

        #[arg(long, value_enum, default_value_t = VolumeArg::Medium)]
        volume: VolumeArg,

        #[arg(long, short, value_enum, default_value_t = StyleArg::Scientific)]
        style: StyleArg,

        /// Wikipedia article to ground the text in (repeatable, at most 5 are used)
        #[arg(long = "wiki", value_name = "TITLE")]
        wiki: Vec<String>,

        /// Wikipedia language edition (ru, en, uk, de, fr, es)
        #[arg(long)]
        wiki_lang: Option<String>,

        /// Prepend a cover page (referat, doklad and essay only)
        #[arg(long)]
        title_page: bool,

        #[arg(long, value_enum, default_value_t = EduTypeArg::Student)]
        edu_type: EduTypeArg,

        /// Grade (pupils) or year (students)
        #[arg(long)]
        grade: Option<String>,

        /// Author name
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        institution: Option<String>,

        #[arg(long)]
        group: Option<String>,

        #[arg(long)]
        teacher: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search Wikipedia for reference articles
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Wikipedia language edition (ru, en, uk, de, fr, es)
        #[arg(long, short)]
        lang: Option<String>,

        /// Maximum number of results
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect to the model backend and report its state
    Status,

    /// Print the effective configuration
    Config,
}

struct Services {
    assembler: Arc<DocumentAssembler>,
    references: Arc<WikipediaClient>,
}

fn build_services(config: &Config) -> Result<Services> {
    let backend = GeminiBackend::with_base_url(
        config.generation.api_base.clone(),
        config.generation.request_timeout(),
    )
    .context("failed to create the Gemini client")?;

    let connector = Arc::new(ModelConnector::new(
        Arc::new(backend),
        config.generation.candidate_models.clone(),
    ));

    let references = Arc::new(
        WikipediaClient::new(
            Some(&config.wikipedia.user_agent),
            config.wikipedia.search_timeout(),
            config.wikipedia.fetch_timeout(),
        )
        .context("failed to create the Wikipedia client")?,
    );

    let assembler = DocumentAssembler::new(connector, references.clone())
        .with_composer(PromptComposer::new(config.generation.output_language.clone()));

    Ok(Services {
        assembler: Arc::new(assembler),
        references,
    })
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("autoconspect={},tower_http={}", level, level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration from the environment".to_string(),
    })?;

    init_tracing(&cli, &config);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let api_key = config.gemini_key().to_string();
    tracing::info!(
        key_exists = !api_key.is_empty(),
        key_length = api_key.chars().count(),
        "Gemini API key"
    );

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        static_dir: None,
    }) {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            let services = build_services(&config)?;
            let connector = services.assembler.connector().clone();
            let state = connector.initialize(&api_key).await;
            match &state.active_model {
                Some(model) => tracing::info!(model = %model, "Gemini is ready"),
                None => tracing::warn!(
                    error = state.last_error.as_deref().unwrap_or_default(),
                    "Gemini is not available; /generate will fail until restart"
                ),
            }

            let mut server_config = config.server.clone();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if static_dir.is_some() {
                server_config.static_dir = static_dir;
            }

            let app_state = AppState::new(services.assembler, services.references)
                .with_default_lang(config.wikipedia.default_lang)
                .with_search_limit(config.wikipedia.search_limit)
                .with_api_key(&api_key);

            run_server(&server_config, app_state).await?;
        }

        Commands::Generate {
            topic,
            mode,
            volume,
            style,
            wiki,
            wiki_lang,
            title_page,
            edu_type,
            grade,
            name,
            institution,
            group,
            teacher,
            json,
        } => {
            let services = build_services(&config)?;
            let state = services.assembler.connector().initialize(&api_key).await;
            if !state.is_ready {
                anyhow::bail!(
                    "Gemini is not available: {}",
                    state.last_error.unwrap_or_default()
                );
            }

            let author = AuthorInfo {
                edu_type: edu_type.into(),
                grade: grade.unwrap_or_default(),
                name: name.unwrap_or_default(),
                institution: institution.unwrap_or_default(),
                group: group.unwrap_or_default(),
                teacher: teacher.unwrap_or_default(),
                include_title_page: title_page,
            };

            let mut request = GenerationRequest::new(topic)
                .mode(mode.into())
                .volume(volume.into())
                .style(style.into())
                .author(author)
                .reference_lang(
                    wiki_lang
                        .as_deref()
                        .map(WikiLang::from_code)
                        .unwrap_or(config.wikipedia.default_lang),
                );
            request.reference_titles = wiki;

            let result = services.assembler.generate(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.text);
                if !cli.quiet {
                    eprintln!();
                    eprintln!(
                        "{} words, {} characters, ~{} pages",
                        result.stats.words, result.stats.chars, result.stats.pages
                    );
                    for source in &result.sources_used {
                        eprintln!("Source: {} <{}>", source.title, source.url);
                    }
                }
            }
        }

        Commands::Search {
            query,
            lang,
            limit,
            json,
        } => {
            let services = build_services(&config)?;
            let lang = lang
                .as_deref()
                .map(WikiLang::from_code)
                .unwrap_or(config.wikipedia.default_lang);
            let limit = limit.unwrap_or(config.wikipedia.search_limit);

            let hits = services.references.search(&query, lang, limit).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No articles found for '{}' on {}.wikipedia.org", query, lang);
            } else {
                for (i, hit) in hits.iter().enumerate() {
                    println!("{}. {} ({} words)", i + 1, hit.title, hit.wordcount);
                    if !hit.snippet.is_empty() {
                        println!("   {}", hit.snippet);
                    }
                }
            }
        }

        Commands::Status => {
            let services = build_services(&config)?;
            let state = services.assembler.connector().initialize(&api_key).await;
            let report = serde_json::json!({
                "api_ready": state.is_ready,
                "model": state.active_model,
                "last_error": state.last_error,
                "key_exists": !api_key.is_empty(),
                "key_length": api_key.chars().count(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Config => {
            print!("{}", config.to_toml_redacted()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["autoconspect"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["autoconspect", "-vv"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["autoconspect", "status", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::parse_from(["autoconspect", "--config", "/etc/autoconspect.toml", "config"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/autoconspect.toml")));
        assert!(matches!(cli.command, Some(Commands::Config)));
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["autoconspect", "serve", "--port", "8080"]);
        match cli.command {
            Some(Commands::Serve { host, port, .. }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_generate_defaults() {
        let cli = Cli::parse_from(["autoconspect", "generate", "Photosynthesis"]);
        match cli.command {
            Some(Commands::Generate {
                topic,
                mode,
                volume,
                style,
                wiki,
                title_page,
                json,
                ..
            }) => {
                assert_eq!(topic, "Photosynthesis");
                assert_eq!(Mode::from(mode), Mode::Referat);
                assert_eq!(VolumeTier::from(volume), VolumeTier::Medium);
                assert_eq!(StyleTier::from(style), StyleTier::Scientific);
                assert!(wiki.is_empty());
                assert!(!title_page);
                assert!(!json);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_with_options() {
        let cli = Cli::parse_from([
            "autoconspect",
            "generate",
            "Solar System",
            "--mode",
            "essay",
            "--volume",
            "very-long",
            "--style",
            "school",
            "--wiki",
            "Sun",
            "--wiki",
            "Jupiter",
            "--wiki-lang",
            "en",
            "--title-page",
            "--edu-type",
            "pupil",
            "--grade",
            "9",
        ]);
        match cli.command {
            Some(Commands::Generate {
                mode,
                volume,
                style,
                wiki,
                wiki_lang,
                title_page,
                edu_type,
                grade,
                ..
            }) => {
                assert_eq!(mode, ModeArg::Essay);
                assert_eq!(volume, VolumeArg::VeryLong);
                assert_eq!(style, StyleArg::School);
                assert_eq!(wiki, vec!["Sun", "Jupiter"]);
                assert_eq!(wiki_lang.as_deref(), Some("en"));
                assert!(title_page);
                assert_eq!(EduType::from(edu_type), EduType::Pupil);
                assert_eq!(grade.as_deref(), Some("9"));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::parse_from(["autoconspect", "s", "Фотосинтез", "-n", "3", "--lang", "ru"]);
        match cli.command {
            Some(Commands::Search {
                query, lang, limit, ..
            }) => {
                assert_eq!(query, "Фотосинтез");
                assert_eq!(lang.as_deref(), Some("ru"));
                assert_eq!(limit, Some(3));
            }
            _ => panic!("Expected Search command"),
        }
    }
}
