use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::upstream::safety::SafetyThreshold;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BODY_LIMIT_MB: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("unknown safety threshold: {0:?}")]
    UnknownThreshold(String),

    #[error("failed to read default schema from {path}: {source}")]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("default schema in {path} is not a valid schema: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-wide settings, read once at startup.
///
/// Every value comes from the environment (or a `.env` file picked up by
/// `dotenvy`). Only malformed values are errors; a missing `GEMINI_API_KEY`
/// is allowed and surfaces later as failing upstream calls.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub safety_threshold: Option<SafetyThreshold>,
    pub require_schema: bool,
    pub expose_raw_output: bool,
    pub upstream_timeout: Duration,
    pub body_limit_bytes: usize,
    pub default_schema_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            var("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_TIMEOUT_SECS",
                value: "0".into(),
            });
        }
        let body_limit_mb = parse_or(
            var("REQUEST_BODY_LIMIT_MB"),
            "REQUEST_BODY_LIMIT_MB",
            DEFAULT_BODY_LIMIT_MB,
        )?;

        let safety_threshold = var("GEMINI_SAFETY_THRESHOLD")
            .map(|raw| {
                raw.parse::<SafetyThreshold>()
                    .map_err(|_| ConfigError::UnknownThreshold(raw))
            })
            .transpose()?;

        Ok(Self {
            port,
            api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            safety_threshold,
            require_schema: parse_flag(var("REQUIRE_SCHEMA"), "REQUIRE_SCHEMA")?,
            expose_raw_output: parse_flag(var("EXPOSE_RAW_OUTPUT"), "EXPOSE_RAW_OUTPUT")?,
            upstream_timeout: Duration::from_secs(timeout_secs),
            body_limit_bytes: body_limit_mb.saturating_mul(1024 * 1024),
            default_schema_path: var("DEFAULT_SCHEMA_PATH").map(PathBuf::from),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_flag(raw: Option<String>, name: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
