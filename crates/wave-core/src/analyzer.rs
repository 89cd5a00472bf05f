//! Error-log analysis and tuned-config derivation.
//!
//! Every tick the analyzer reads the tail of the error log, counts lines
//! mentioning the marker (case-insensitive) and, above the threshold,
//! replaces the tuned-config document with values derived from the count.
//! Bytes that are not valid UTF-8 are replaced before matching. An
//! unreadable log counts as zero errors.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, warn};
use wave_types::TunedConfig;

use crate::config::AnalyzerConfig;
use crate::schedule::{Shutdown, run_periodic};
use crate::store::ConfigStore;

/// Result of a single analyzer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The error count did not exceed the threshold.
    BelowThreshold {
        /// Matching lines in the tail.
        errors: u32,
    },
    /// A tuned config was derived and written.
    Tuned {
        /// Matching lines in the tail.
        errors: u32,
        /// The values written.
        config: TunedConfig,
    },
    /// A tuned config was derived but the write failed.
    WriteFailed {
        /// Matching lines in the tail.
        errors: u32,
    },
}

/// Count lines among the last `tail_lines` of `text` that contain `marker`,
/// ignoring case.
pub fn count_recent_errors(text: &str, tail_lines: usize, marker: &str) -> u32 {
    let marker = marker.to_lowercase();
    let count = text
        .lines()
        .rev()
        .take(tail_lines)
        .filter(|line| line.to_lowercase().contains(&marker))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Periodic reader of the error log that tunes the config store.
pub struct ErrorAnalyzer {
    log_path: PathBuf,
    config: AnalyzerConfig,
    store: Arc<dyn ConfigStore>,
}

impl ErrorAnalyzer {
    /// Create an analyzer over `log_path` writing into `store`.
    pub fn new(
        log_path: impl Into<PathBuf>,
        config: AnalyzerConfig,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            log_path: log_path.into(),
            config,
            store,
        }
    }

    /// Run one analysis pass.
    pub fn tick(&self) -> AnalysisOutcome {
        let errors = match std::fs::read(&self.log_path) {
            Ok(bytes) => count_recent_errors(
                &String::from_utf8_lossy(&bytes),
                self.config.tail_lines,
                &self.config.marker,
            ),
            Err(e) => {
                warn!(
                    path = %self.log_path.display(),
                    error = %e,
                    "Error log unreadable, counting zero errors"
                );
                0
            }
        };

        if errors <= self.config.error_threshold {
            debug!(errors, threshold = self.config.error_threshold, "Error count nominal");
            return AnalysisOutcome::BelowThreshold { errors };
        }

        let tuned = TunedConfig::from_error_count(errors);
        warn!(
            errors,
            ngl = tuned.ngl,
            context_size = tuned.context_size,
            retries = tuned.retries,
            "Error count above threshold, writing tuned config"
        );

        match self.store.write(&tuned.to_document()) {
            Ok(()) => AnalysisOutcome::Tuned {
                errors,
                config: tuned,
            },
            Err(e) => {
                error!(error = %e, "Failed to write tuned config");
                AnalysisOutcome::WriteFailed { errors }
            }
        }
    }

    /// Tick every `analyzer.interval_secs` until shutdown.
    pub async fn run(&self, shutdown: &Shutdown) {
        run_periodic("error-analyzer", self.config.interval(), shutdown, || async move {
            self.tick();
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::fmt::Write as _;
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn log_with(errors: usize, other: usize) -> String {
        let mut text = String::new();
        for i in 0..other {
            writeln!(text, "INFO line {i}").unwrap();
        }
        for i in 0..errors {
            writeln!(text, "ERROR failure {i}").unwrap();
        }
        text
    }

    fn analyzer(text: &str) -> (tempfile::TempDir, Arc<MemoryStore>, ErrorAnalyzer) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        fs::write(&path, text).unwrap();
        let store = Arc::new(MemoryStore::new());
        let analyzer = ErrorAnalyzer::new(&path, AnalyzerConfig::default(), store.clone());
        (dir, store, analyzer)
    }

    #[test]
    fn counts_only_the_tail() {
        let mut text = log_with(10, 0);
        text.push_str(&log_with(0, 20));
        assert_eq!(count_recent_errors(&text, 20, "error"), 0);
    }

    #[test]
    fn match_is_case_insensitive() {
        let text = "Error one\nERROR two\nerror three\nwarn four\n";
        assert_eq!(count_recent_errors(text, 20, "error"), 3);
        assert_eq!(count_recent_errors(text, 20, "ERROR"), 3);
    }

    #[test]
    fn six_errors_write_tuned_config() {
        let (_dir, store, analyzer) = analyzer(&log_with(6, 4));

        let outcome = analyzer.tick();

        assert!(matches!(outcome, AnalysisOutcome::Tuned { errors: 6, .. }));
        let doc = store.read().unwrap();
        assert_eq!(
            serde_json::Value::Object(doc),
            json!({"ngl": 44, "context_size": 1748, "retries": 6})
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let (_dir, store, analyzer) = analyzer(&log_with(5, 10));

        let outcome = analyzer.tick();

        assert_eq!(outcome, AnalysisOutcome::BelowThreshold { errors: 5 });
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn missing_log_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let analyzer = ErrorAnalyzer::new(
            dir.path().join("absent.log"),
            AnalyzerConfig::default(),
            store.clone(),
        );

        assert_eq!(analyzer.tick(), AnalysisOutcome::BelowThreshold { errors: 0 });
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn invalid_utf8_does_not_hide_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        let mut bytes = b"garbage \xff\xfe line\n".to_vec();
        bytes.extend_from_slice(log_with(10, 0).as_bytes());
        fs::write(&path, bytes).unwrap();
        let store = Arc::new(MemoryStore::new());
        let analyzer = ErrorAnalyzer::new(&path, AnalyzerConfig::default(), store.clone());

        let outcome = analyzer.tick();

        assert!(matches!(outcome, AnalysisOutcome::Tuned { errors: 10, .. }));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn previous_document_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        fs::write(&path, log_with(8, 0)).unwrap();
        let seeded = json!({"stale": true}).as_object().cloned().unwrap();
        let store = Arc::new(MemoryStore::with_document(seeded));
        let analyzer = ErrorAnalyzer::new(&path, AnalyzerConfig::default(), store.clone());

        analyzer.tick();

        let doc = store.read().unwrap();
        assert!(!doc.contains_key("stale"));
        assert_eq!(doc.get("retries"), Some(&json!(7)));
    }
}
