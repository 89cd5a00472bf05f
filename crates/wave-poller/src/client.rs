//! HTTP client for the `/api/malla` endpoint.

use std::time::Duration;

use tracing::debug;
use wave_types::MeshState;

use crate::error::PollError;

/// Fetches mesh state with a bounded per-request timeout.
///
/// Each call is a single attempt; there are no retries.
#[derive(Debug, Clone)]
pub struct MeshClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl MeshClient {
    /// Create a client for `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// Endpoint this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the mesh state.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Request`] on connection failure or timeout,
    /// [`PollError::Status`] on a non-2xx answer, and
    /// [`PollError::Decode`] if the body is not a mesh payload.
    pub async fn fetch(&self) -> Result<MeshState, PollError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PollError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Request(e.to_string()))?;

        let state: MeshState =
            serde_json::from_slice(&body).map_err(|e| PollError::Decode(e.to_string()))?;

        debug!(url = %self.url, rows = state.grid_a.len(), "Mesh state fetched");
        Ok(state)
    }
}
