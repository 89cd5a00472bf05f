//! Error types for the mesh poller.

/// Errors from a single poll of the mesh endpoint.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The request could not be sent or timed out.
    #[error("mesh request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("mesh endpoint returned status {0}")]
    Status(u16),

    /// The body was not a mesh payload.
    #[error("mesh response decode failed: {0}")]
    Decode(String),
}
