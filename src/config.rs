//! # Configuration Module
//!
//! Application settings read from environment variables (a `.env` file is
//! loaded by the binary before this runs), plus the recovery settings used
//! by the backend client.
//!
//! ## Variables
//!
//! - `MEAL_PLANNER_API_URL` (required): base URL of the backend API
//! - `MEAL_PLANNER_API_TOKEN`: bearer token passed through to every request
//! - `MEAL_PLANNER_LOCALE`: `en` (default) or `fr`
//! - `MEAL_PLANNER_LOG_FORMAT`: `plain` (default) or `json`
//! - `MEAL_PLANNER_LOG_LEVEL`: default log filter when `RUST_LOG` is unset
//! - `MEAL_PLANNER_QUICK_FILTERS`: path to a JSON file of quick filter definitions
//! - `MEAL_PLANNER_TIMEOUT_SECS`: request timeout

use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::filter::{default_quick_filters, QuickFilterDefinition};

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Recovery configuration for backend requests
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts after the first request
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Consecutive failures before the circuit breaker opens
    pub circuit_breaker_threshold: u32,
    /// Seconds the circuit stays open before a request is let through again
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 250,
            max_retry_delay_ms: 4000,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 30,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines via env_logger
    #[default]
    Plain,
    /// Structured JSON via tracing-subscriber
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("Unsupported log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Plain,
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub recovery: RecoveryConfig,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            recovery: RecoveryConfig::default(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub locale: String,
    pub logging: LoggingConfig,
    pub quick_filters: Vec<QuickFilterDefinition>,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = get("MEAL_PLANNER_API_URL").context("MEAL_PLANNER_API_URL must be set")?;
        reqwest::Url::parse(&base_url)
            .with_context(|| format!("MEAL_PLANNER_API_URL is not a valid URL: {base_url}"))?;

        let timeout_secs = match get("MEAL_PLANNER_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("MEAL_PLANNER_TIMEOUT_SECS must be a number of seconds, got {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let format = match get("MEAL_PLANNER_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let quick_filters = match get("MEAL_PLANNER_QUICK_FILTERS") {
            Some(path) => load_quick_filters(Path::new(&path))?,
            None => default_quick_filters(),
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                token: get("MEAL_PLANNER_API_TOKEN"),
                timeout_secs,
                recovery: RecoveryConfig::default(),
            },
            locale: get("MEAL_PLANNER_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            logging: LoggingConfig {
                format,
                level: get("MEAL_PLANNER_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            quick_filters,
        })
    }
}

/// Load quick filter definitions from a JSON array file.
///
/// Duplicate ids are rejected since the active pill set is keyed by id.
pub fn load_quick_filters(path: &Path) -> Result<Vec<QuickFilterDefinition>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read quick filters from {}", path.display()))?;
    let definitions: Vec<QuickFilterDefinition> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse quick filters in {}", path.display()))?;

    let mut seen = std::collections::HashSet::new();
    for definition in &definitions {
        if !seen.insert(definition.id.as_str()) {
            return Err(anyhow!("Duplicate quick filter id: {}", definition.id));
        }
    }

    info!("Loaded {} quick filters from {}", definitions.len(), path.display());
    Ok(definitions)
}
