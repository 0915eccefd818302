use super::envelope::ActionEnvelope;
use super::error::GatewayError;
use async_trait::async_trait;
use serde_json::Value;

/// # Summary
/// Delivers one Action Envelope to the remote script and returns the unwrapped
/// `data` of its Result Envelope.
///
/// # Invariants
/// - Implementations must be `Send + Sync`; one instance serves many concurrent calls.
/// - A remote `error` always surfaces as `GatewayError::Remote`, never as a default value.
/// - Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Summary
    /// Sends the envelope and waits for its outcome.
    ///
    /// # Arguments
    /// * `envelope` - The action, payload and target sheet.
    ///
    /// # Returns
    /// * `Ok(Value)` - The remote `data`, or the whole body when `data` is absent.
    /// * `Err(GatewayError)` - Transport, timeout, remote or decode failure.
    async fn send(&self, envelope: ActionEnvelope) -> Result<Value, GatewayError>;

    /// Short transport identifier used in logs.
    fn name(&self) -> &'static str;
}
