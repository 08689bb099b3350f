//! Collector configuration.
//!
//! Settings are layered: explicit CLI flags (and their environment
//! variables) win over an optional YAML settings file, which wins over the
//! built-in defaults. The API key has no default; running without one is a
//! fatal startup error.

use crate::cli::CollectArgs;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OUTPUT: &str = "data.json";
/// Bodies at or below this many characters are not summarized.
pub const DEFAULT_MIN_BODY_CHARS: usize = 50;
/// Extracted bodies are cut to this many characters before prompting.
pub const DEFAULT_MAX_BODY_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingCredential,

    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Optional overrides read from a YAML settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub output: Option<String>,
    pub articles: Option<String>,
    pub min_body_chars: Option<usize>,
    pub max_body_chars: Option<usize>,
}

impl Settings {
    #[instrument(level = "debug")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(Path::new(path))
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })
    }
}

/// Fully resolved configuration for one collector run.
#[derive(Clone)]
pub struct CollectorConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub output: String,
    pub articles: Option<String>,
    pub min_body_chars: usize,
    pub max_body_chars: usize,
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("output", &self.output)
            .field("articles", &self.articles)
            .field("min_body_chars", &self.min_body_chars)
            .field("max_body_chars", &self.max_body_chars)
            .finish()
    }
}

impl CollectorConfig {
    /// Merge CLI arguments over settings and defaults.
    ///
    /// The credential is checked first so a missing key fails before any
    /// file is read.
    pub async fn from_args(args: &CollectArgs) -> Result<Self, ConfigError> {
        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential)?
            .to_string();

        let settings = match args.config.as_deref() {
            Some(path) => Settings::load(path).await?,
            None => Settings::default(),
        };
        debug!(?settings, "Loaded settings");

        Ok(Self::resolve(api_key, args, settings))
    }

    fn resolve(api_key: String, args: &CollectArgs, settings: Settings) -> Self {
        Self {
            api_key,
            model: args
                .model
                .clone()
                .or(settings.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: args
                .api_base
                .clone()
                .or(settings.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            output: args
                .output
                .clone()
                .or(settings.output)
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            articles: args.articles.clone().or(settings.articles),
            min_body_chars: settings.min_body_chars.unwrap_or(DEFAULT_MIN_BODY_CHARS),
            max_body_chars: settings.max_body_chars.unwrap_or(DEFAULT_MAX_BODY_CHARS),
        }
    }
}
