use std::{sync::Arc, time::Duration};

use axum::{routing::post, Router};
use serde_json::Value;

use crate::config::{Config, ConfigError};
use crate::upstream::{schema::Schema, GenerativeModel};

pub mod handlers;
pub mod types;

/// Per-process settings the gateway consults on every request.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub require_schema: bool,
    pub expose_raw_output: bool,
    pub upstream_timeout: Duration,
    pub body_limit_bytes: usize,
    /// Used when the client sends no schema.
    pub default_schema: Value,
}

impl GatewaySettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let default_schema = match &config.default_schema_path {
            Some(path) => Schema::from_file(path)?,
            None => Schema::name_suggestions(),
        };

        Ok(Self {
            require_schema: config.require_schema,
            expose_raw_output: config.expose_raw_output,
            upstream_timeout: config.upstream_timeout,
            body_limit_bytes: config.body_limit_bytes,
            default_schema: default_schema.to_json(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn GenerativeModel>,
    pub settings: Arc<GatewaySettings>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(handlers::generate))
}
