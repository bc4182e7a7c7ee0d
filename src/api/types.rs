use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/generate`.
///
/// Both fields are optional at the serde level so that a missing prompt or
/// schema is reported with its own message instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
}

impl GenerateRequest {
    /// The prompt, unless absent or empty.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }
}
