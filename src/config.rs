//! Configuration management for melody
//!
//! Settings are read from environment variables (a `.env` file in the working
//! directory is loaded first by the binary) with sensible defaults.
//!
//! # Environment Variables
//!
//! - `MELODY_PROVIDER`: genai provider (gemini|openai|anthropic|ollama|groq|xai|...) - default: "gemini"
//! - `MELODY_MODEL`: model name - default: "gemini-2.5-flash"
//! - `MELODY_STATE_FILE`: registry state file - default: "server_state.json"
//! - `MELODY_MODEL_DIR`: per-model files - default: "saved_models"
//! - `MELODY_PLOTS_DIR`: plot images - default: "static/plots"
//! - `MELODY_PLOTS_URL`: URL prefix for plot images - default: "/static/plots"
//! - `MELODY_REQUEST_TIMEOUT`: LLM request timeout in seconds - default: "120"
//! - `MELODY_MAX_TOOL_ROUNDS`: tool round trips per user turn - default: "8"
//! - `MELODY_LOG_LEVEL`: logging level - default: "info"
//!
//! Provider credentials are read by genai itself, e.g. `GEMINI_API_KEY` or `OPENAI_API_KEY`.
//! `MELODY_API_BASE_URL` overrides the provider endpoint.

use genai::adapter::AdapterKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::llm::{BackendError, GenAIClient, LLMClient};
use crate::plot::PlotSettings;
use crate::registry::{Registry, RegistryError, RegistryPaths};
use crate::session::SessionOptions;
use crate::tools::{ToolCatalog, ToolSystem};
use crate::util::logging::try_parse_level;

const DEFAULT_PROVIDER: AdapterKind = AdapterKind::Gemini;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_STATE_FILE: &str = "server_state.json";
const DEFAULT_MODEL_DIR: &str = "saved_models";
const DEFAULT_PLOTS_DIR: &str = "static/plots";
const DEFAULT_PLOTS_URL: &str = "/static/plots";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
const DEFAULT_LOG_LEVEL: &str = "info";

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_TOOL_ROUNDS_LIMIT: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: gemini, openai, anthropic, ollama, groq, xai, deepseek, cohere")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Backend initialization failed: {0}")]
    BackendInitError(#[from] BackendError),

    #[error("Failed to open registry: {0}")]
    RegistryError(#[from] RegistryError),
}

/// Parses a provider name such as `gemini` or `OpenAI`
pub fn parse_provider(s: &str) -> Result<AdapterKind, ConfigError> {
    AdapterKind::from_lower_str(&s.trim().to_lowercase())
        .ok_or_else(|| ConfigError::InvalidProvider(s.to_string()))
}

#[derive(Debug, Clone)]
pub struct MelodyConfig {
    pub provider: AdapterKind,

    /// Model name to use for inference (provider-specific)
    pub model: String,

    pub state_file: PathBuf,

    pub model_dir: PathBuf,

    pub plots_dir: PathBuf,

    /// Prefix of the URLs returned for plot images
    pub plots_url: String,

    pub request_timeout_secs: u64,

    pub max_tool_rounds: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for MelodyConfig {
    /// Loads from environment variables; unparseable values fall back to defaults
    /// (use [`MelodyConfig::from_env`] to surface them as errors)
    fn default() -> Self {
        let provider = env::var("MELODY_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(DEFAULT_PROVIDER);

        let model = env_string("MELODY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let request_timeout_secs = env::var("MELODY_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let max_tool_rounds = env::var("MELODY_MAX_TOOL_ROUNDS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_TOOL_ROUNDS);

        let log_level = env::var("MELODY_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            state_file: env_path("MELODY_STATE_FILE", DEFAULT_STATE_FILE),
            model_dir: env_path("MELODY_MODEL_DIR", DEFAULT_MODEL_DIR),
            plots_dir: env_path("MELODY_PLOTS_DIR", DEFAULT_PLOTS_DIR),
            plots_url: env_string("MELODY_PLOTS_URL").unwrap_or_else(|| DEFAULT_PLOTS_URL.to_string()),
            request_timeout_secs,
            max_tool_rounds,
            log_level,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env_string(key).unwrap_or_else(|| default.to_string()))
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        None => Ok(None),
    }
}

impl MelodyConfig {
    /// Like `default()`, but malformed values are errors instead of being ignored
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(provider) = env_string("MELODY_PROVIDER") {
            config.provider = parse_provider(&provider)?;
        }
        if let Some(timeout) = parse_env::<u64>("MELODY_REQUEST_TIMEOUT")? {
            config.request_timeout_secs = timeout;
        }
        if let Some(rounds) = parse_env::<usize>("MELODY_MAX_TOOL_ROUNDS")? {
            config.max_tool_rounds = rounds;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_tool_rounds == 0 || self.max_tool_rounds > MAX_TOOL_ROUNDS_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max tool rounds must be between 1 and {}",
                MAX_TOOL_ROUNDS_LIMIT
            )));
        }

        if try_parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn registry_paths(&self) -> RegistryPaths {
        RegistryPaths::new(&self.state_file, &self.model_dir)
    }

    pub fn plot_settings(&self) -> PlotSettings {
        PlotSettings::new(&self.plots_dir, &self.plots_url)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_tool_rounds: self.max_tool_rounds,
            ..SessionOptions::default()
        }
    }

    /// Creates the genai-backed client for the configured provider and model
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>, ConfigError> {
        let client = GenAIClient::new(self.provider, self.model.clone(), self.request_timeout())?;
        Ok(Arc::new(client))
    }

    /// Opens the persistent registry and wires it to the tool catalog
    pub fn open_tool_system(&self) -> Result<ToolSystem, ConfigError> {
        let registry = Registry::open(self.registry_paths())?;
        Ok(ToolSystem::new(ToolCatalog::new(self.plot_settings()), registry))
    }
}

impl fmt::Display for MelodyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Melody Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  State File: {}", self.state_file.display())?;
        writeln!(f, "  Model Dir: {}", self.model_dir.display())?;
        writeln!(f, "  Plots Dir: {}", self.plots_dir.display())?;
        writeln!(f, "  Plots URL: {}", self.plots_url)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Tool Rounds: {}", self.max_tool_rounds)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
