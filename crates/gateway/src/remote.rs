use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use tradesheet_core::gateway::envelope::ActionEnvelope;
use tradesheet_core::gateway::error::GatewayError;

use crate::http::{build_client, classify};

/// # Summary
/// Server-side outbound client for the Apps Script Web App.
///
/// # Invariants
/// - Sends the same query shape as the cross-origin channel, without `callback`,
///   so the script answers with plain JSON.
/// - Returns the response body untouched; interpreting it is the caller's job.
#[derive(Clone)]
pub struct ScriptClient {
    client: Client,
}

impl ScriptClient {
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// # Summary
    /// Performs one GET round trip against `script_url`.
    ///
    /// # Logic
    /// 1. Encode `action`, `data`, `sheetId` as query parameters.
    /// 2. Follow redirects (Apps Script answers through a redirect to googleusercontent).
    /// 3. Reject non-success statuses, then parse the body as JSON.
    ///
    /// # Arguments
    /// * `script_url` - Target script endpoint.
    /// * `envelope` - Action to forward.
    ///
    /// # Returns
    /// * `Ok(Value)` - The raw JSON body.
    /// * `Err(GatewayError)` - `Transport`, `Timeout` or `Decode`.
    pub async fn call(&self, script_url: &str, envelope: &ActionEnvelope) -> Result<Value, GatewayError> {
        debug!(action = %envelope.action, sheet_id = %envelope.sheet_id, "calling Google Apps Script");
        let response = self
            .client
            .get(script_url)
            .query(&envelope.query_pairs(None))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "Google Apps Script responded with status {}: {}",
                status.as_u16(),
                text
            )));
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
