use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::upstream::AdapterError;

pub const PROMPT_MISSING: &str = "Prompt mangler";
pub const SCHEMA_MISSING: &str = "Schema mangler i anmodningen.";
pub const INVALID_BODY: &str = "Ugyldig JSON i anmodningen.";
pub const BODY_TOO_LARGE: &str = "Anmodningen er for stor.";
pub const UPSTREAM_FAILED: &str = "Der opstod en fejl på serveren ved kald til AI.";
pub const UPSTREAM_TIMEOUT: &str = "Kaldet til AI tog for lang tid.";
pub const MALFORMED_OUTPUT: &str = "Svar fra AI var ikke i det forventede format.";

/// Everything `POST /api/generate` can fail with, mapped onto an HTTP
/// status and a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("prompt missing from request")]
    MissingPrompt,

    #[error("schema missing from request")]
    MissingSchema,

    #[error("request body rejected: {0}")]
    InvalidBody(String),

    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Malformed model output, with the raw text echoed back to the caller.
    #[error("model output is not valid JSON")]
    MalformedOutputExposed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingPrompt | ApiError::MissingSchema | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Adapter(AdapterError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Adapter(_) | ApiError::MalformedOutputExposed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::MissingPrompt => PROMPT_MISSING,
            ApiError::MissingSchema => SCHEMA_MISSING,
            ApiError::InvalidBody(_) => INVALID_BODY,
            ApiError::BodyTooLarge => BODY_TOO_LARGE,
            ApiError::Adapter(AdapterError::Upstream(_)) => UPSTREAM_FAILED,
            ApiError::Adapter(AdapterError::Timeout(_)) => UPSTREAM_TIMEOUT,
            ApiError::Adapter(AdapterError::MalformedOutput { .. })
            | ApiError::MalformedOutputExposed(_) => MALFORMED_OUTPUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "generate request failed");
        } else {
            warn!(error = %self, %status, "generate request rejected");
        }

        let body = match &self {
            ApiError::MalformedOutputExposed(text) => json!({
                "error": self.message(),
                "originalResponse": text,
            }),
            _ => json!({ "error": self.message() }),
        };

        (status, Json(body)).into_response()
    }
}
