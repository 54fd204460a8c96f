//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve data file, logging and lookup settings from `BOOKSHELF_*`
//!   environment variables.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Set but unparsable variables are errors, never silently defaulted.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DATA_FILE: &str = "BOOKSHELF_DATA_FILE";
pub const ENV_LOG_LEVEL: &str = "BOOKSHELF_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BOOKSHELF_LOG_DIR";
pub const ENV_LOOKUP_ENABLED: &str = "BOOKSHELF_LOOKUP_ENABLED";
pub const ENV_LOOKUP_BASE_URL: &str = "BOOKSHELF_LOOKUP_BASE_URL";
pub const ENV_LOOKUP_TIMEOUT_MS: &str = "BOOKSHELF_LOOKUP_TIMEOUT_MS";
pub const ENV_LOOKUP_MAX_ATTEMPTS: &str = "BOOKSHELF_LOOKUP_MAX_ATTEMPTS";
pub const ENV_LOOKUP_BACKOFF_MS: &str = "BOOKSHELF_LOOKUP_BACKOFF_MS";

const DEFAULT_DATA_FILE: &str = "library.json";
const DEFAULT_LOG_DIR_NAME: &str = "logs";
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://openlibrary.org";
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LOOKUP_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_LOOKUP_BACKOFF_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    CurrentDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "invalid {name}=`{value}`; expected {expected}"),
            Self::CurrentDir(message) => {
                write!(f, "cannot resolve current directory: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Bounded retry with linear backoff (`base_backoff_ms * attempt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LOOKUP_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_LOOKUP_BACKOFF_MS,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Settings for the external ISBN catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Process-wide settings shared by the server and the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub lookup: LookupConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps variable names to
    /// values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_file = get(ENV_DATA_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        let log_level = get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = match get(ENV_LOG_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .map_err(|err| ConfigError::CurrentDir(err.to_string()))?
                .join(DEFAULT_LOG_DIR_NAME),
        };

        let defaults = LookupConfig::default();
        let max_attempts = parse_or(
            ENV_LOOKUP_MAX_ATTEMPTS,
            get(ENV_LOOKUP_MAX_ATTEMPTS),
            defaults.retry.max_attempts,
            "a positive integer",
        )?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_LOOKUP_MAX_ATTEMPTS,
                value: "0".to_string(),
                expected: "a positive integer",
            });
        }

        let lookup = LookupConfig {
            enabled: parse_bool(ENV_LOOKUP_ENABLED, get(ENV_LOOKUP_ENABLED), defaults.enabled)?,
            base_url: get(ENV_LOOKUP_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_millis(parse_or(
                ENV_LOOKUP_TIMEOUT_MS,
                get(ENV_LOOKUP_TIMEOUT_MS),
                DEFAULT_LOOKUP_TIMEOUT_MS,
                "milliseconds as an integer",
            )?),
            retry: RetryPolicy {
                max_attempts,
                base_backoff_ms: parse_or(
                    ENV_LOOKUP_BACKOFF_MS,
                    get(ENV_LOOKUP_BACKOFF_MS),
                    defaults.retry.base_backoff_ms,
                    "milliseconds as an integer",
                )?,
            },
        };

        Ok(Self {
            data_file,
            log_level,
            log_dir,
            lookup,
        })
    }
}

/// Parses an optional variable value, falling back to `default` when unset.
pub fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
            expected,
        }),
    }
}

fn parse_bool(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref() {
        None => Ok(default),
        Some("1" | "true" | "TRUE" | "yes" | "YES") => Ok(true),
        Some("0" | "false" | "FALSE" | "no" | "NO") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue {
            name,
            value: other.to_string(),
            expected: "true|false",
        }),
    }
}
