use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use tradesheet_core::common::is_blank;
use tradesheet_core::config::{DeploymentMode, GatewayConfig};
use tradesheet_core::gateway::envelope::{ActionEnvelope, ActionName};
use tradesheet_core::gateway::error::GatewayError;
use tradesheet_core::gateway::port::Transport;
use tradesheet_core::journal::entity::{
    NewPsychologyEntry, NewStrategy, NewTrade, PsychologyEntry, PsychologyEntryPatch, Strategy,
    StrategyPatch, Trade, TradePatch,
};

use crate::jsonp::CrossOriginTransport;
use crate::normalize;
use crate::relay::RelayTransport;

/// # Summary
/// Remote Gateway Client: one typed async method per sheet action.
///
/// # Invariants
/// - The transport is chosen once, at construction, from the deployment mode.
/// - List methods always return a `Vec`; a non-array payload yields an empty one.
/// - Failures are returned as they come: no retries, no caching.
#[derive(Clone)]
pub struct SheetsClient {
    script_url: String,
    sheet_id: String,
    mode: DeploymentMode,
    transport: Arc<dyn Transport>,
}

impl SheetsClient {
    /// # Summary
    /// Builds a client for the given endpoint and sheet.
    ///
    /// # Logic
    /// `cross-origin` talks to `script_url` directly; `relay` goes through the
    /// backend at `config.relay_base_url`, which holds its own endpoint settings.
    /// Both may be empty, meaning "not configured".
    ///
    /// # Arguments
    /// * `script_url` - Apps Script Web App URL.
    /// * `sheet_id` - Target spreadsheet identifier.
    /// * `config` - Deployment mode, relay origin and timeout.
    pub fn new(
        script_url: impl Into<String>,
        sheet_id: impl Into<String>,
        config: &GatewayConfig,
    ) -> Result<Self, GatewayError> {
        let script_url = script_url.into();
        let transport: Arc<dyn Transport> = match config.mode {
            DeploymentMode::CrossOrigin => Arc::new(CrossOriginTransport::new(
                script_url.clone(),
                config.timeout(),
            )?),
            DeploymentMode::Relay => Arc::new(RelayTransport::new(
                &config.relay_base_url,
                config.timeout(),
            )?),
        };
        Ok(Self::with_transport(script_url, sheet_id, config.mode, transport))
    }

    /// Builds a client around an existing transport.
    pub fn with_transport(
        script_url: impl Into<String>,
        sheet_id: impl Into<String>,
        mode: DeploymentMode,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            script_url: script_url.into(),
            sheet_id: sheet_id.into(),
            mode,
            transport,
        }
    }

    /// Whether a call can be attempted. In relay mode the backend decides.
    pub fn is_configured(&self) -> bool {
        match self.mode {
            DeploymentMode::CrossOrigin => !is_blank(Some(&self.script_url)),
            DeploymentMode::Relay => true,
        }
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    // ============================================================
    //  Trades
    // ============================================================

    pub async fn get_trades(&self) -> Result<Vec<Trade>, GatewayError> {
        self.list(ActionName::GetTrades, None, normalize::trade).await
    }

    pub async fn add_trade(&self, trade: &NewTrade) -> Result<Trade, GatewayError> {
        let payload = to_payload(trade)?;
        self.single(ActionName::AddTrade, Some(payload), normalize::trade)
            .await
    }

    pub async fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<Trade, GatewayError> {
        let payload = with_id(id, patch)?;
        self.single(ActionName::UpdateTrade, Some(payload), normalize::trade)
            .await
    }

    pub async fn delete_trade(&self, id: i64) -> Result<(), GatewayError> {
        self.delete(ActionName::DeleteTrade, id).await
    }

    /// Trades recorded on `date` (`YYYY-MM-DD`, as stored in the sheet).
    pub async fn get_trades_by_date(&self, date: &str) -> Result<Vec<Trade>, GatewayError> {
        let payload = serde_json::json!({ "date": date });
        self.list(ActionName::GetTradesByDate, Some(payload), normalize::trade)
            .await
    }

    // ============================================================
    //  Strategies
    // ============================================================

    pub async fn get_strategies(&self) -> Result<Vec<Strategy>, GatewayError> {
        self.list(ActionName::GetStrategies, None, normalize::strategy)
            .await
    }

    pub async fn add_strategy(&self, strategy: &NewStrategy) -> Result<Strategy, GatewayError> {
        let payload = to_payload(strategy)?;
        self.single(ActionName::AddStrategy, Some(payload), normalize::strategy)
            .await
    }

    pub async fn update_strategy(
        &self,
        id: i64,
        patch: &StrategyPatch,
    ) -> Result<Strategy, GatewayError> {
        let payload = with_id(id, patch)?;
        self.single(ActionName::UpdateStrategy, Some(payload), normalize::strategy)
            .await
    }

    pub async fn delete_strategy(&self, id: i64) -> Result<(), GatewayError> {
        self.delete(ActionName::DeleteStrategy, id).await
    }

    // ============================================================
    //  Psychology entries
    // ============================================================

    pub async fn get_psychology_entries(&self) -> Result<Vec<PsychologyEntry>, GatewayError> {
        self.list(
            ActionName::GetPsychologyEntries,
            None,
            normalize::psychology_entry,
        )
        .await
    }

    pub async fn add_psychology_entry(
        &self,
        entry: &NewPsychologyEntry,
    ) -> Result<PsychologyEntry, GatewayError> {
        let payload = to_payload(entry)?;
        self.single(
            ActionName::AddPsychologyEntry,
            Some(payload),
            normalize::psychology_entry,
        )
        .await
    }

    pub async fn update_psychology_entry(
        &self,
        id: i64,
        patch: &PsychologyEntryPatch,
    ) -> Result<PsychologyEntry, GatewayError> {
        let payload = with_id(id, patch)?;
        self.single(
            ActionName::UpdatePsychologyEntry,
            Some(payload),
            normalize::psychology_entry,
        )
        .await
    }

    pub async fn delete_psychology_entry(&self, id: i64) -> Result<(), GatewayError> {
        self.delete(ActionName::DeletePsychologyEntry, id).await
    }

    // ============================================================
    //  Plumbing
    // ============================================================

    /// # Summary
    /// Sends one action through the active transport.
    ///
    /// # Logic
    /// 1. Re-check configuration; an unconfigured cross-origin client fails
    ///    without touching the network.
    /// 2. Build the envelope and delegate to the transport.
    /// 3. Unwrap a nested `data` left by scripts that double-wrap their reply.
    async fn request(&self, action: ActionName, data: Option<Value>) -> Result<Value, GatewayError> {
        if !self.is_configured() {
            warn!(action = %action, "Google Sheets not configured");
            return Err(GatewayError::NotConfigured);
        }

        let envelope = ActionEnvelope::new(action, data, self.sheet_id.clone());
        debug!(action = %action, transport = self.transport.name(), "sending action");
        self.transport
            .send(envelope)
            .await
            .map(unwrap_nested)
            .inspect_err(|e| error!(action = %action, error = %e, "Google Sheets API error"))
    }

    async fn list<T>(
        &self,
        action: ActionName,
        data: Option<Value>,
        normalize: fn(&Value) -> T,
    ) -> Result<Vec<T>, GatewayError> {
        match self.request(action, data).await? {
            Value::Array(rows) => Ok(rows.iter().map(normalize).collect()),
            other => {
                warn!(action = %action, got = kind(&other), "expected array, returning empty list");
                Ok(Vec::new())
            }
        }
    }

    async fn single<T>(
        &self,
        action: ActionName,
        data: Option<Value>,
        normalize: fn(&Value) -> T,
    ) -> Result<T, GatewayError> {
        match self.request(action, data).await? {
            record @ Value::Object(_) => Ok(normalize(&record)),
            other => Err(GatewayError::Decode(format!(
                "expected a record for {}, got {}",
                action,
                kind(&other)
            ))),
        }
    }

    async fn delete(&self, action: ActionName, id: i64) -> Result<(), GatewayError> {
        self.request(action, Some(serde_json::json!({ "id": id })))
            .await
            .map(|_| ())
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// `{ id, ...fields }`
fn with_id<T: Serialize>(id: i64, fields: &T) -> Result<Value, GatewayError> {
    let mut payload = match to_payload(fields)? {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    payload.insert("id".to_string(), Value::from(id));
    Ok(Value::Object(payload))
}

fn unwrap_nested(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) if !inner.is_null() => inner,
            Some(inner) => {
                map.insert("data".to_string(), inner);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
