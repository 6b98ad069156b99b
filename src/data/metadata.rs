//! OpenFDA drug-event field metadata.
//!
//! The metadata YAML describes every searchable field. It is kept as a plain
//! nested `serde_yaml::Value` and browsed with explicit key paths such as
//! `["patient", "properties", "patientagegroup", "possible_values", "value"]`.

use serde_yaml::Value;
use tracing::info;

use crate::{data::openfda::OpenFdaClient, error::FetchError};

/// Parsed field metadata rooted at the document's `properties` key.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    root: Value,
}

impl FieldMetadata {
    /// Parse the raw YAML document. Documents without a top-level
    /// `properties` key are used as-is.
    pub fn from_yaml_str(text: &str) -> Result<Self, FetchError> {
        let doc: Value = serde_yaml::from_str(text)?;
        let root = match doc.get("properties") {
            Some(properties) => properties.clone(),
            None => doc,
        };
        Ok(Self { root })
    }

    /// Download and parse the metadata document.
    pub async fn fetch(client: &OpenFdaClient, url: &str) -> Result<Self, FetchError> {
        let text = client.fetch_text(url).await?;
        info!(%url, bytes = text.len(), "fetched field metadata");
        Self::from_yaml_str(&text)
    }

    /// Follow `path` key by key; `None` as soon as a key is missing.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.root, |node, key| node.get(key.as_ref()))
    }

    /// Same as [`lookup`](Self::lookup) with a dot separated path.
    pub fn lookup_dotted(&self, path: &str) -> Option<&Value> {
        let keys: Vec<&str> = path.split('.').filter(|k| !k.is_empty()).collect();
        self.lookup(&keys)
    }

    /// Top-level field names.
    pub fn field_names(&self) -> Vec<String> {
        mapping_keys(&self.root)
    }

    /// Code -> description pairs under `<field>.possible_values.value`.
    pub fn possible_values(&self, field_path: &str) -> Option<Vec<(String, String)>> {
        let field = self.lookup_dotted(field_path)?;
        let values = field.get("possible_values")?.get("value")?.as_mapping()?;
        Some(
            values
                .iter()
                .filter_map(|(code, description)| {
                    Some((scalar_to_string(code)?, scalar_to_string(description)?))
                })
                .collect(),
        )
    }
}

/// Keys of a mapping node as strings, empty for anything else.
pub fn mapping_keys(value: &Value) -> Vec<String> {
    value
        .as_mapping()
        .map(|map| map.keys().filter_map(scalar_to_string).collect())
        .unwrap_or_default()
}

/// Render a scalar YAML node; `None` for sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
