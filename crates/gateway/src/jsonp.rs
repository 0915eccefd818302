use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};
use tradesheet_core::gateway::envelope::ActionEnvelope;
use tradesheet_core::gateway::error::GatewayError;
use tradesheet_core::gateway::port::Transport;

use crate::http::build_client;
use crate::registry::CallbackRegistry;

const LOAD_FAILED: &str = "JSONP request failed";

/// # Summary
/// Cross-origin channel: calls the script directly and receives the result as
/// a callback script (`<callback>(<envelope>)`).
///
/// # Invariants
/// - Every call owns an independent registration in the shared `CallbackRegistry`.
/// - A call settles exactly once: callback, load failure or timeout, whichever
///   comes first; the registration is gone afterwards.
pub struct CrossOriginTransport {
    script_url: String,
    client: Client,
    registry: Arc<CallbackRegistry>,
    timeout: Duration,
}

impl CrossOriginTransport {
    /// # Summary
    /// Creates a channel to `script_url` with its own registry.
    ///
    /// # Arguments
    /// * `script_url` - The deployed Apps Script Web App URL.
    /// * `timeout` - How long a call waits for its callback (30 s in production).
    pub fn new(script_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        Ok(Self {
            script_url: script_url.into(),
            client: build_client(timeout)?,
            registry: Arc::new(CallbackRegistry::new()),
            timeout,
        })
    }

    /// Shares `registry` with other channels instead of owning one.
    pub fn with_registry(mut self, registry: Arc<CallbackRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    fn request_url(&self, envelope: &ActionEnvelope, token: &str) -> Result<Url, GatewayError> {
        Url::parse_with_params(self.script_url.trim(), envelope.query_pairs(Some(token)))
            .map_err(|e| GatewayError::Transport(format!("Invalid script URL: {}", e)))
    }
}

#[async_trait]
impl Transport for CrossOriginTransport {
    /// # Summary
    /// Sends the envelope through an injected callback script.
    ///
    /// # Logic
    /// 1. Register a fresh callback token.
    /// 2. Build the script URL carrying `action`, `data`, `sheetId`, `callback`.
    /// 3. Spawn the loader (fetch + execute the script) and the timeout timer.
    /// 4. Attach both to the registration and wait for the single outcome.
    async fn send(&self, envelope: ActionEnvelope) -> Result<Value, GatewayError> {
        let (token, receiver) = self.registry.register();
        let url = match self.request_url(&envelope, &token) {
            Ok(url) => url,
            Err(e) => {
                self.registry.deregister(&token);
                return Err(e);
            }
        };
        debug!(action = %envelope.action, callback = %token, "injecting callback script");

        let loader = tokio::spawn(load_script(
            self.client.clone(),
            url,
            token.clone(),
            self.registry.clone(),
        ));
        let timer = tokio::spawn(expire(self.timeout, token.clone(), self.registry.clone()));
        self.registry
            .attach(&token, loader.abort_handle(), timer.abort_handle());

        receiver
            .await
            .unwrap_or_else(|_| Err(GatewayError::Transport(LOAD_FAILED.to_string())))
    }

    fn name(&self) -> &'static str {
        "cross-origin"
    }
}

/// Fetches the callback script and executes it against the registry.
async fn load_script(client: Client, url: Url, token: String, registry: Arc<CallbackRegistry>) {
    match fetch(&client, url).await {
        Ok(script) => execute(&registry, &token, &script),
        Err(e) => {
            warn!(callback = %token, error = %e, "callback script failed to load");
            registry.resolve(&token, Err(GatewayError::Transport(LOAD_FAILED.to_string())));
        }
    }
}

async fn fetch(client: &Client, url: Url) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

fn execute(registry: &CallbackRegistry, token: &str, script: &str) {
    match parse_callback(script) {
        // Only the call's own registration is settled here.
        Some((callback, argument)) if callback == token => {
            registry.invoke(token, argument);
        }
        Some((callback, _)) => {
            warn!(expected = token, got = callback, "script targets another callback, ignored");
        }
        None => {
            warn!(callback = token, "response is not a callback invocation");
            registry.resolve(
                token,
                Err(GatewayError::Transport(format!("{}: malformed script", LOAD_FAILED))),
            );
        }
    }
}

async fn expire(after: Duration, token: String, registry: Arc<CallbackRegistry>) {
    tokio::time::sleep(after).await;
    if registry.resolve(&token, Err(GatewayError::Timeout)) {
        warn!(callback = %token, "cross-origin call timed out");
    }
}

/// # Summary
/// Parses a script of the form `name(<json>);`.
///
/// # Logic
/// Accepts surrounding whitespace, a leading `/**/` and a trailing `;`. The
/// callee must be a plain identifier and the single argument valid JSON.
///
/// # Returns
/// The callee name and its argument, or `None` for anything else.
pub fn parse_callback(script: &str) -> Option<(&str, Value)> {
    let script = script.trim();
    let script = script.strip_prefix("/**/").unwrap_or(script).trim();
    let script = script.trim_end_matches(';').trim_end();

    let (callee, rest) = script.split_once('(')?;
    let callee = callee.trim();
    let is_identifier = !callee.is_empty()
        && callee
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !is_identifier {
        return None;
    }

    let argument = rest.strip_suffix(')')?;
    let argument = serde_json::from_str(argument.trim()).ok()?;
    Some((callee, argument))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tradesheet_core::gateway::envelope::ActionName;

    #[test]
    fn test_parse_callback_forms() {
        let (name, arg) = parse_callback("jsonp_callback_1_abc({\"success\":true,\"data\":[]});").unwrap();
        assert_eq!(name, "jsonp_callback_1_abc");
        assert_eq!(arg, json!({"success": true, "data": []}));

        let (name, arg) = parse_callback("/**/ cb_2 ( {\"error\":\"X\"} ) ;\n").unwrap();
        assert_eq!(name, "cb_2");
        assert_eq!(arg, json!({"error": "X"}));

        let (_, arg) = parse_callback("cb({\"note\":\"a (nested) paren\"})").unwrap();
        assert_eq!(arg, json!({"note": "a (nested) paren"}));
    }

    #[test]
    fn test_parse_callback_rejects_other_scripts() {
        assert!(parse_callback("<!DOCTYPE html><html></html>").is_none());
        assert!(parse_callback("alert(1); cb({})").is_none());
        assert!(parse_callback("cb()").is_none());
        assert!(parse_callback("window.cb({})").is_none());
        assert!(parse_callback("").is_none());
    }

    #[tokio::test]
    async fn test_script_for_another_callback_leaves_both_pending() {
        let registry = CallbackRegistry::new();
        let (a, mut a_rx) = registry.register();
        let (b, mut b_rx) = registry.register();

        execute(&registry, &a, &format!("{}({{\"data\":[\"from-a\"]}});", b));

        assert!(registry.contains(&a));
        assert!(registry.contains(&b));
        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_err());

        execute(&registry, &b, &format!("{}({{\"data\":[\"from-b\"]}});", b));
        assert!(!registry.contains(&b));
        assert!(registry.contains(&a));
        assert_eq!(b_rx.await.unwrap().unwrap(), json!(["from-b"]));
    }

    #[test]
    fn test_request_url_carries_envelope() {
        let transport =
            CrossOriginTransport::new("https://script.google.com/macros/s/abc/exec", Duration::from_secs(30))
                .unwrap();
        let envelope = ActionEnvelope::new(ActionName::GetTradesByDate, Some(json!({"date": "2024-05-01"})), "S1");
        let url = transport.request_url(&envelope, "jsonp_callback_1_x").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("action".to_string(), "getTradesByDate".to_string()),
                ("data".to_string(), r#"{"date":"2024-05-01"}"#.to_string()),
                ("sheetId".to_string(), "S1".to_string()),
                ("callback".to_string(), "jsonp_callback_1_x".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_url_leaves_no_registration() {
        let transport = CrossOriginTransport::new("not a url", Duration::from_secs(1)).unwrap();
        let result = transport
            .send(ActionEnvelope::new(ActionName::GetTrades, None, "S1"))
            .await;
        assert!(matches!(result, Err(GatewayError::Transport(_))));
        assert!(transport.registry().is_empty());
    }
}
