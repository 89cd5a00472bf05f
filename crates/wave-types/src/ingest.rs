//! Notices pushed in by external agents through the ingestion endpoints.
//!
//! The file watcher sends loosely-typed JSON: ids may be strings or
//! numbers and every field is optional. Both notices are built from a raw
//! JSON object and fall back to placeholders instead of rejecting the body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tuned::ConfigDocument;

/// Placeholder for absent identifiers and paths.
const NOT_AVAILABLE: &str = "N/A";

/// A file-change event reported by the watcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNotice {
    /// Caller-assigned event identifier.
    pub event_id: String,
    /// Path of the file that changed.
    pub file_path: String,
    /// Caller timestamp, passed through verbatim.
    pub timestamp: Option<String>,
    /// Suggestions produced for the change, if any.
    pub suggestions: Option<String>,
    /// Free-form extra data.
    pub additional_data: Option<Value>,
}

impl EventNotice {
    /// Build a notice from a raw JSON object.
    pub fn from_document(doc: &ConfigDocument) -> Self {
        Self {
            event_id: text_field(doc, "event_id").unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            file_path: text_field(doc, "file_path").unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            timestamp: text_field(doc, "timestamp"),
            suggestions: text_field(doc, "suggestions"),
            additional_data: doc.get("additional_data").cloned(),
        }
    }
}

/// An error reported by the watcher or the model tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Caller-assigned error identifier.
    pub error_id: String,
    /// Human-readable description.
    pub description: String,
    /// Machine-readable error code, if any.
    pub error_code: Option<String>,
    /// Caller timestamp, passed through verbatim.
    pub timestamp: Option<String>,
    /// Free-form extra data.
    pub additional_data: Option<Value>,
}

impl ErrorReport {
    /// Build a report from a raw JSON object.
    pub fn from_document(doc: &ConfigDocument) -> Self {
        Self {
            error_id: text_field(doc, "error_id").unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            description: text_field(doc, "description")
                .unwrap_or_else(|| "no description".to_owned()),
            error_code: text_field(doc, "error_code"),
            timestamp: text_field(doc, "timestamp"),
            additional_data: doc.get("additional_data").cloned(),
        }
    }
}

/// Read a field as text: strings verbatim, other scalars via their JSON
/// rendering, `null` and missing as `None`.
fn text_field(doc: &ConfigDocument, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
