//! Test doubles shared by the workspace's test suites (`test-utils` feature).

use crate::gateway::envelope::{ActionEnvelope, ActionName};
use crate::gateway::error::GatewayError;
use crate::gateway::port::Transport;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

/// # Summary
/// A `Transport` that answers from a script of canned responses and records
/// every envelope it receives.
///
/// # Invariants
/// - Actions without a scripted response resolve to `Value::Null`.
#[derive(Default)]
pub struct MockTransport {
    responses: DashMap<ActionName, Result<Value, GatewayError>>,
    calls: Mutex<Vec<ActionEnvelope>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the outcome returned for `action`.
    pub fn respond(&self, action: ActionName, outcome: Result<Value, GatewayError>) {
        self.responses.insert(action, outcome);
    }

    /// Every envelope sent so far, in arrival order.
    pub async fn calls(&self) -> Vec<ActionEnvelope> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, envelope: ActionEnvelope) -> Result<Value, GatewayError> {
        let action = envelope.action;
        self.calls.lock().await.push(envelope);
        self.responses
            .get(&action)
            .map(|r| r.value().clone())
            .unwrap_or(Ok(Value::Null))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
