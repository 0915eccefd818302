use std::time::Duration;

use reqwest::Client;
use tradesheet_core::common::ensure_crypto_provider;
use tradesheet_core::gateway::error::GatewayError;

/// Builds the shared HTTP client with a hard per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, GatewayError> {
    ensure_crypto_provider();
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {}", e)))
}

/// Maps a reqwest failure onto the gateway taxonomy.
pub(crate) fn classify(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}
