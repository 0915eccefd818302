use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use tradesheet_core::gateway::envelope::{ActionEnvelope, ResultEnvelope};
use tradesheet_core::gateway::error::GatewayError;
use tradesheet_core::gateway::port::Transport;

use crate::http::{build_client, classify};

/// Path of the relay endpoint on the local backend.
pub const RELAY_PATH: &str = "/api/google-sheets";

/// # Summary
/// Backend relay: forwards each envelope to the trusted local backend, which
/// performs the remote call with its own stored configuration.
///
/// # Invariants
/// - The request body always carries `sheetId`, both at top level and inside `data`.
/// - Calls are bounded by the client timeout (same bound as the cross-origin channel).
pub struct RelayTransport {
    endpoint: String,
    client: Client,
}

impl RelayTransport {
    /// # Summary
    /// Creates a relay client for the backend at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Backend origin, e.g. `http://127.0.0.1:5000`.
    /// * `timeout` - Per-call upper bound.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RELAY_PATH),
            client: build_client(timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for RelayTransport {
    /// # Summary
    /// POSTs the envelope to the relay endpoint.
    ///
    /// # Logic
    /// 1. Send `{action, data: {...data, sheetId}, sheetId}` as JSON.
    /// 2. A non-success status rejects with the status and the raw body text.
    /// 3. Otherwise the body is read as a Result Envelope.
    async fn send(&self, envelope: ActionEnvelope) -> Result<Value, GatewayError> {
        debug!(action = %envelope.action, endpoint = %self.endpoint, "relaying action");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&envelope.relay_body())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|e| e.to_string());
            return Err(GatewayError::Transport(format!(
                "HTTP error! status: {}, message: {}",
                status.as_u16(),
                message
            )));
        }

        let body: Value = response.json().await.map_err(classify)?;
        ResultEnvelope::into_result(body)
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}
