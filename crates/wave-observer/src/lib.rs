//! HTTP API server for watchers-wave.
//!
//! Exposes event and error ingestion for the file watcher, the tuned
//! config merged with live hardware figures, and the mesh payload the
//! poller consumes. Built on Axum with permissive CORS and request
//! tracing.

pub mod error;
pub mod handlers;
pub mod hardware;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
