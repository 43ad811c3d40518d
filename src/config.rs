//! Configuration loading.
//!
//! Settings come from `./persona-relay.toml` (or `$PERSONA_RELAY_CONFIG`),
//! then environment variables. A `.env` file in the working directory is
//! loaded into the environment first.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_TIMEOUT_SECS};

/// Config file used when `$PERSONA_RELAY_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "persona-relay.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Who the assistant speaks as and where their documents live.
    pub persona: PersonaConfig,
    /// Generation model settings.
    pub model: ModelConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

/// Persona identity and document locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Display name.
    pub name: String,
    /// Directory holding the persona documents.
    pub dir: PathBuf,
    /// Résumé PDF file name inside `dir`.
    pub resume_file: String,
    /// Summary text file name inside `dir`.
    pub summary_file: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "N Harshit".to_owned(),
            dir: PathBuf::from("me"),
            resume_file: "resume.pdf".to_owned(),
            summary_file: "summary.txt".to_owned(),
        }
    }
}

impl PersonaConfig {
    /// Full path of the résumé PDF.
    pub fn resume_path(&self) -> PathBuf {
        self.dir.join(&self.resume_file)
    }

    /// Full path of the summary file.
    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(&self.summary_file)
    }
}

/// Generation model settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier, e.g. `gemini-1.5-flash`.
    pub id: String,
    /// API base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: DEFAULT_GEMINI_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Directory for rotated JSON logs.
    pub logs_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_owned(),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom env resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = config_path_with(&env);
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(env);
        Ok(config)
    }

    /// Load from a TOML file only. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Apply environment variable overrides.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PERSONA_NAME") {
            self.persona.name = v;
        }
        if let Some(v) = env("PERSONA_DIR") {
            self.persona.dir = PathBuf::from(v);
        }
        if let Some(v) = env("PERSONA_MODEL") {
            self.model.id = v;
        }
        if let Some(v) = env("GEMINI_BASE_URL") {
            self.model.base_url = v;
        }
        if let Some(v) = env("PERSONA_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.model.timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "PERSONA_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("PERSONA_BIND") {
            self.server.bind = v;
        }
    }
}

/// Resolve the config file path using a custom env resolver.
pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env("PERSONA_RELAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load `./.env` into the process environment, overriding existing values.
///
/// A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv_override() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Credentials read from the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    google_api_key: Option<String>,
    pushover_user: Option<String>,
    pushover_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Secrets")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("pushover_user", &redact(&self.pushover_user))
            .field("pushover_token", &redact(&self.pushover_token))
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read secrets using a custom env resolver.
    ///
    /// `GOOGLE_API_KEY` wins over `GEMINI_API_KEY`. Blank values count as unset.
    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Self {
            google_api_key: non_blank("GOOGLE_API_KEY").or_else(|| non_blank("GEMINI_API_KEY")),
            pushover_user: non_blank("PUSHOVER_USER"),
            pushover_token: non_blank("PUSHOVER_TOKEN"),
        }
    }

    /// Gemini API key, if configured.
    pub fn google_api_key(&self) -> Option<&str> {
        self.google_api_key.as_deref()
    }

    /// Pushover user and token, when both are configured.
    pub fn pushover(&self) -> Option<(&str, &str)> {
        match (&self.pushover_user, &self.pushover_token) {
            (Some(user), Some(token)) => Some((user.as_str(), token.as_str())),
            _ => None,
        }
    }

    /// Log which secrets are present, showing only their first character.
    pub fn log_presence(&self) {
        for (name, value) in [
            ("GOOGLE_API_KEY", &self.google_api_key),
            ("PUSHOVER_USER", &self.pushover_user),
            ("PUSHOVER_TOKEN", &self.pushover_token),
        ] {
            match value.as_deref().and_then(|v| v.chars().next()) {
                Some(first) => tracing::info!(secret = name, starts_with = %first, "secret found"),
                None => tracing::warn!(secret = name, "secret not set"),
            }
        }
    }
}
