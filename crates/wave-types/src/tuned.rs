//! Tuned runtime parameters derived from recent error volume.
//!
//! The mapping from `error_count` to parameters is a fixed heuristic that
//! downstream consumers (the local model runner) depend on numerically.
//! It must not be changed without coordinating with them.

use serde::{Deserialize, Serialize};

/// A persisted configuration document: a JSON object of arbitrary keys.
///
/// Before the first tuning pass the document is empty (`{}`); afterwards
/// it carries the [`TunedConfig`] fields.
pub type ConfigDocument = serde_json::Map<String, serde_json::Value>;

/// Parameters handed to the model runner after a burst of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunedConfig {
    /// Number of layers offloaded to the GPU.
    pub ngl: u32,
    /// Prompt context window in tokens.
    pub context_size: u32,
    /// Retry budget for a single model invocation.
    pub retries: u32,
}

impl TunedConfig {
    /// Derive the tuned parameters for the given number of recent errors.
    ///
    /// - `ngl = max(1, 50 - error_count)`
    /// - `context_size = max(512, 2048 - 50 * error_count)`
    /// - `retries = 3 + error_count / 2`
    pub const fn from_error_count(error_count: u32) -> Self {
        let ngl = 50_u32.saturating_sub(error_count);
        let context_size = 2048_u32.saturating_sub(error_count.saturating_mul(50));
        Self {
            ngl: if ngl < 1 { 1 } else { ngl },
            context_size: if context_size < 512 { 512 } else { context_size },
            retries: 3_u32.saturating_add(error_count / 2),
        }
    }

    /// Convert into the generic document shape stored by a config store.
    pub fn to_document(self) -> ConfigDocument {
        let mut doc = ConfigDocument::new();
        doc.insert("ngl".to_owned(), self.ngl.into());
        doc.insert("context_size".to_owned(), self.context_size.into());
        doc.insert("retries".to_owned(), self.retries.into());
        doc
    }
}
