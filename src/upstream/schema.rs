//! Response schema the model is asked to conform to.
//!
//! Client-supplied schemas are forwarded untouched as JSON. The typed
//! [`Schema`] here is only used for the process-wide fallback, which is either
//! built in or loaded from a file at startup.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    #[serde(alias = "object")]
    Object,
    #[serde(alias = "array")]
    Array,
    #[serde(alias = "string")]
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    pub fn string() -> Self {
        Self {
            kind: SchemaType::String,
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            kind: SchemaType::Array,
            properties: BTreeMap::new(),
            items: Some(Box::new(items)),
            required: Vec::new(),
        }
    }

    pub fn object<I, R>(properties: I, required: R) -> Self
    where
        I: IntoIterator<Item = (&'static str, Schema)>,
        R: IntoIterator<Item = &'static str>,
    {
        Self {
            kind: SchemaType::Object,
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            items: None,
            required: required.into_iter().map(str::to_string).collect(),
        }
    }

    /// Name suggestions: a list of first names with origin and a personal
    /// reason for each.
    pub fn name_suggestions() -> Self {
        let suggestion = Schema::object(
            [
                ("navn", Schema::string()),
                ("mellemnavn", Schema::string()),
                ("efternavn", Schema::string()),
                ("oprindelse_betydning", Schema::string()),
                ("personlig_begrundelse", Schema::string()),
            ],
            ["navn", "oprindelse_betydning", "personlig_begrundelse"],
        );

        Schema::object(
            [("navneforslag", Schema::array(suggestion))],
            ["navneforslag"],
        )
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SchemaFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::SchemaParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        // A tree of strings, maps and vectors always serializes.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_suggestion_schema_matches_gemini_shape() {
        assert_eq!(
            Schema::name_suggestions().to_json(),
            json!({
                "type": "OBJECT",
                "properties": {
                    "navneforslag": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "navn": { "type": "STRING" },
                                "mellemnavn": { "type": "STRING" },
                                "efternavn": { "type": "STRING" },
                                "oprindelse_betydning": { "type": "STRING" },
                                "personlig_begrundelse": { "type": "STRING" }
                            },
                            "required": ["navn", "oprindelse_betydning", "personlig_begrundelse"]
                        }
                    }
                },
                "required": ["navneforslag"]
            })
        );
    }

    #[test]
    fn accepts_lowercase_type_names() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "array",
            "items": { "type": "string" }
        }))
        .unwrap();
        assert_eq!(schema, Schema::array(Schema::string()));
    }

    #[test]
    fn rejects_types_outside_the_grammar() {
        let parsed = serde_json::from_value::<Schema>(json!({ "type": "NUMBER" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn loads_schema_from_file() {
        let path = std::env::temp_dir().join(format!(
            "gemini-relay-schema-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, r#"{"type":"OBJECT","properties":{"svar":{"type":"STRING"}},"required":["svar"]}"#)
            .unwrap();

        let schema = Schema::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(schema, Schema::object([("svar", Schema::string())], ["svar"]));
    }

    #[test]
    fn missing_schema_file_is_a_config_error() {
        let err = Schema::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaFile { .. }));
    }
}
