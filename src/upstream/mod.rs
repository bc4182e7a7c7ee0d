pub mod gemini;
pub mod safety;
pub mod schema;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

pub use gemini::GeminiClient;

/// Failure of the upstream call itself. The gateway does not distinguish
/// between these; they all become the same generic 500.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("prompt was blocked by Gemini: {0}")]
    Blocked(String),

    #[error("Gemini returned no text (finish reason: {finish_reason:?})")]
    EmptyResponse { finish_reason: Option<String> },
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("upstream call did not finish within {0:?}")]
    Timeout(Duration),

    #[error("model output is not valid JSON: {source}")]
    MalformedOutput {
        text: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A model that turns a prompt plus response schema into raw text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_text(&self, prompt: &str, schema: &Value) -> Result<String, UpstreamError>;
}

/// One upstream call under a deadline, then a strict JSON decode of the
/// returned text.
pub async fn call_model(
    model: &dyn GenerativeModel,
    prompt: &str,
    schema: &Value,
    deadline: Duration,
) -> Result<Value, AdapterError> {
    let text = match tokio::time::timeout(deadline, model.generate_text(prompt, schema)).await {
        Ok(result) => result?,
        Err(_) => return Err(AdapterError::Timeout(deadline)),
    };
    debug!(bytes = text.len(), "model returned text");

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(source) => {
            error!(output = %text, "model output was not valid JSON");
            Err(AdapterError::MalformedOutput { text, source })
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Reply, StubModel};
    use super::*;
    use serde_json::json;

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn decodes_json_text() {
        let model = StubModel::text(r#"{"svar": ["a", "b"]}"#);
        let value = call_model(&model, "hej", &json!({}), DEADLINE)
            .await
            .unwrap();
        assert_eq!(value, json!({ "svar": ["a", "b"] }));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn forwards_schema_to_model() {
        let model = StubModel::text("{}");
        let schema = json!({ "type": "STRING" });
        call_model(&model, "hej", &schema, DEADLINE).await.unwrap();
        assert_eq!(model.last_schema(), Some(schema));
    }

    #[tokio::test]
    async fn malformed_output_keeps_raw_text() {
        let model = StubModel::text("not json");
        let err = call_model(&model, "hej", &json!({}), DEADLINE)
            .await
            .unwrap_err();
        match err {
            AdapterError::MalformedOutput { text, .. } => assert_eq!(text, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_passed_through() {
        let model = StubModel::new(Reply::Fail);
        let err = call_model(&model, "hej", &json!({}), DEADLINE)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Upstream(UpstreamError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn slow_model_hits_deadline() {
        let model = StubModel::new(Reply::Hang);
        let deadline = Duration::from_millis(20);
        let err = call_model(&model, "hej", &json!({}), deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Timeout(d) if d == deadline));
    }
}
