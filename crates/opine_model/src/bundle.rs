//! Bundle container: load, append, serialize, save.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ModelError, Result};
use crate::types::{Identity, Object, Opinion};

/// The versioned container of all typed records exchanged between parties.
///
/// Loaded once at startup; the object collection only grows by append.
/// Serialization writes the whole collection back, never incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bundle {
    /// Parse a bundle from a JSON string.
    ///
    /// Anything that parses but is not a top-level `bundle` object is a
    /// fatal startup error, reported before any UI is shown.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let object_type = value.get("type").and_then(Value::as_str).unwrap_or("");
        if object_type != "bundle" {
            return Err(ModelError::NotABundle {
                found: object_type.to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Load a bundle from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Append a freshly created identity. Existing identities selected from
    /// the bundle are already present and are never re-appended.
    pub fn append_identity(&mut self, identity: Identity) {
        self.objects.push(Object::Identity(identity));
    }

    /// Append a completed opinion.
    pub fn append_opinion(&mut self, opinion: Opinion) {
        self.objects.push(Object::Opinion(opinion));
    }

    /// Pretty-print the full bundle with deterministic field ordering:
    /// struct fields in declaration order, passthrough fields sorted.
    pub fn serialize_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the file at `path` with the serialized bundle.
    ///
    /// Truncate-then-write semantics: the target is fully replaced, never
    /// partially overwritten. A failed write is reported to the caller;
    /// the in-memory bundle is deliberately not rolled back.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = self.serialize_pretty()?;
        fs::write(path, content)?;
        info!(
            target: "opine::bundle",
            objects = self.objects.len(),
            path = %path.display(),
            "bundle saved"
        );
        Ok(())
    }
}
