use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    api::{types::GenerateRequest, AppState},
    error::ApiError,
    upstream::{call_model, AdapterError},
};

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    })?;

    let prompt = req.prompt().ok_or(ApiError::MissingPrompt)?;
    let schema = match &req.schema {
        Some(schema) => schema,
        None if state.settings.require_schema => return Err(ApiError::MissingSchema),
        None => &state.settings.default_schema,
    };

    info!(
        prompt_chars = prompt.chars().count(),
        client_schema = req.schema.is_some(),
        "forwarding prompt to model"
    );

    let settings = &state.settings;
    match call_model(state.model.as_ref(), prompt, schema, settings.upstream_timeout).await {
        Ok(value) => Ok(Json(value)),
        Err(AdapterError::MalformedOutput { text, .. }) if settings.expose_raw_output => {
            Err(ApiError::MalformedOutputExposed(text))
        }
        Err(err) => Err(err.into()),
    }
}
