//! Photo metadata rows as stored in the backing table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// A row of the backing table, kept exactly as the backend returned it.
///
/// Only `url` is written by this service. The identifier, the insertion
/// timestamp and any other column belong to the backend, so nothing about
/// their shape is assumed: a row with a null `url` still lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(Map<String, Value>);

impl Photo {
    pub fn from_row(row: Map<String, Value>) -> Self {
        Self(row)
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|v| !v.is_null())
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(Value::as_str)
    }

    pub fn created_at(&self) -> Option<&Value> {
        self.0.get("created_at").filter(|v| !v.is_null())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }
}

/// Insert payload for the backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub url: String,
}

impl NewPhoto {
    pub fn new(url: impl Into<String>) -> Result<Self, ModelError> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self { url })
    }
}

/// Photo urls must be absolute http(s) addresses.
pub fn validate_url(url: &str) -> Result<(), ModelError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("url must not be empty".into()));
    }
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ModelError::Validation(format!("url is not absolute http(s): {trimmed}")));
    }
    Ok(())
}
