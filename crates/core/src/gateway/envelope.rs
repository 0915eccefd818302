use super::error::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// # Summary
/// The fixed set of operations understood by the remote script.
///
/// # Invariants
/// - The serialized form is the exact camelCase name the script dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ActionName {
    GetTrades,
    AddTrade,
    UpdateTrade,
    DeleteTrade,
    GetTradesByDate,
    GetStrategies,
    AddStrategy,
    UpdateStrategy,
    DeleteStrategy,
    GetPsychologyEntries,
    AddPsychologyEntry,
    UpdatePsychologyEntry,
    DeletePsychologyEntry,
}

impl ActionName {
    pub const ALL: [ActionName; 13] = [
        ActionName::GetTrades,
        ActionName::AddTrade,
        ActionName::UpdateTrade,
        ActionName::DeleteTrade,
        ActionName::GetTradesByDate,
        ActionName::GetStrategies,
        ActionName::AddStrategy,
        ActionName::UpdateStrategy,
        ActionName::DeleteStrategy,
        ActionName::GetPsychologyEntries,
        ActionName::AddPsychologyEntry,
        ActionName::UpdatePsychologyEntry,
        ActionName::DeletePsychologyEntry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::GetTrades => "getTrades",
            ActionName::AddTrade => "addTrade",
            ActionName::UpdateTrade => "updateTrade",
            ActionName::DeleteTrade => "deleteTrade",
            ActionName::GetTradesByDate => "getTradesByDate",
            ActionName::GetStrategies => "getStrategies",
            ActionName::AddStrategy => "addStrategy",
            ActionName::UpdateStrategy => "updateStrategy",
            ActionName::DeleteStrategy => "deleteStrategy",
            ActionName::GetPsychologyEntries => "getPsychologyEntries",
            ActionName::AddPsychologyEntry => "addPsychologyEntry",
            ActionName::UpdatePsychologyEntry => "updatePsychologyEntry",
            ActionName::DeletePsychologyEntry => "deletePsychologyEntry",
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionName::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown action: {}", s))
    }
}

/// # Summary
/// One unit of work sent through either transport.
///
/// # Invariants
/// - Created per call and consumed once; never persisted.
/// - Wire shape is `{ action, data, sheetId }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEnvelope {
    pub action: ActionName,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub sheet_id: String,
}

impl ActionEnvelope {
    pub fn new(action: ActionName, data: Option<Value>, sheet_id: impl Into<String>) -> Self {
        Self {
            action,
            data,
            sheet_id: sheet_id.into(),
        }
    }

    /// # Summary
    /// URL query parameters for a GET-style call to the script.
    ///
    /// # Logic
    /// 1. `data` is serialized as JSON text; a missing payload is sent as `null`.
    /// 2. `callback` is appended only for the cross-origin channel.
    ///
    /// # Arguments
    /// * `callback` - Name of the registered callback, if any.
    ///
    /// # Returns
    /// Ordered `(name, value)` pairs, ready for URL encoding.
    pub fn query_pairs(&self, callback: Option<&str>) -> Vec<(&'static str, String)> {
        let data = self
            .data
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| Value::Null.to_string());
        let mut pairs = vec![
            ("action", self.action.to_string()),
            ("data", data),
            ("sheetId", self.sheet_id.clone()),
        ];
        if let Some(cb) = callback {
            pairs.push(("callback", cb.to_string()));
        }
        pairs
    }

    /// # Summary
    /// Request body for the backend relay.
    ///
    /// # Logic
    /// The payload object is merged with `sheetId` so that relays which only look
    /// inside `data` still see the target sheet. Non-object payloads are dropped.
    pub fn relay_body(&self) -> Value {
        let mut data = match &self.data {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        data.insert("sheetId".to_string(), Value::String(self.sheet_id.clone()));

        serde_json::json!({
            "action": self.action,
            "data": Value::Object(data),
            "sheetId": self.sheet_id,
        })
    }
}

/// # Summary
/// The loosely-typed response of the remote script.
///
/// # Invariants
/// - `error` presence is authoritative failure regardless of `success`.
/// - With neither `data` nor `error`, the whole body stands in for `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResultEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            data: None,
            error: Some(Value::String(message.into())),
        }
    }

    /// Reads the envelope fields out of an arbitrary body; non-objects carry none.
    pub fn from_body(body: &Value) -> Self {
        match body {
            Value::Object(map) => Self {
                success: map.get("success").and_then(Value::as_bool),
                data: map.get("data").cloned(),
                error: map.get("error").cloned(),
            },
            _ => Self::default(),
        }
    }

    /// The remote error message, if the envelope reports one.
    ///
    /// Empty strings and `null` do not count as errors; any other non-string
    /// value is rendered as JSON text.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// # Summary
    /// Interprets a raw response body as a call outcome.
    ///
    /// # Logic
    /// 1. A reported `error` rejects with that message verbatim.
    /// 2. An explicit `success: false` without message rejects with a generic message.
    /// 3. A non-null `data` resolves with it.
    /// 4. Otherwise the whole body resolves, tolerating scripts that reply unwrapped.
    ///
    /// # Arguments
    /// * `body` - The parsed response body.
    ///
    /// # Returns
    /// The unwrapped payload or `GatewayError::Remote`.
    pub fn into_result(body: Value) -> Result<Value, GatewayError> {
        let envelope = Self::from_body(&body);
        if let Some(message) = envelope.error_message() {
            return Err(GatewayError::Remote(message));
        }
        if envelope.success == Some(false) {
            return Err(GatewayError::Remote("Remote request failed".to_string()));
        }
        match envelope.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_name_round_trip() {
        for action in ActionName::ALL {
            let parsed: ActionName = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                Value::String(action.as_str().to_string())
            );
        }
        assert!("dropTables".parse::<ActionName>().is_err());
    }

    #[test]
    fn test_query_pairs() {
        let env = ActionEnvelope::new(ActionName::DeleteTrade, Some(json!({"id": 7})), "S1");
        let pairs = env.query_pairs(Some("jsonp_callback_1_abc"));
        assert_eq!(
            pairs,
            vec![
                ("action", "deleteTrade".to_string()),
                ("data", r#"{"id":7}"#.to_string()),
                ("sheetId", "S1".to_string()),
                ("callback", "jsonp_callback_1_abc".to_string()),
            ]
        );

        let bare = ActionEnvelope::new(ActionName::GetTrades, None, "S1");
        let pairs = bare.query_pairs(None);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], ("data", "null".to_string()));
    }

    #[test]
    fn test_relay_body_merges_sheet_id() {
        let env = ActionEnvelope::new(ActionName::AddStrategy, Some(json!({"name": "ORB"})), "S1");
        assert_eq!(
            env.relay_body(),
            json!({
                "action": "addStrategy",
                "data": {"name": "ORB", "sheetId": "S1"},
                "sheetId": "S1"
            })
        );

        let bare = ActionEnvelope::new(ActionName::GetStrategies, None, "S2");
        assert_eq!(bare.relay_body()["data"], json!({"sheetId": "S2"}));
    }

    #[test]
    fn test_envelope_deserializes_wire_shape() {
        let env: ActionEnvelope =
            serde_json::from_value(json!({"action": "getTradesByDate", "data": {"date": "2024-05-01"}, "sheetId": "S1"}))
                .unwrap();
        assert_eq!(env.action, ActionName::GetTradesByDate);
        assert_eq!(env.sheet_id, "S1");

        let minimal: ActionEnvelope = serde_json::from_value(json!({"action": "getTrades"})).unwrap();
        assert!(minimal.data.is_none());
        assert!(minimal.sheet_id.is_empty());
    }

    #[test]
    fn test_into_result_error_is_authoritative() {
        let err = ResultEnvelope::into_result(json!({"success": true, "error": "Sheet not found", "data": []}));
        assert_eq!(err, Err(GatewayError::Remote("Sheet not found".to_string())));
    }

    #[test]
    fn test_into_result_unwraps_data() {
        let ok = ResultEnvelope::into_result(json!({"success": true, "data": [1, 2]}));
        assert_eq!(ok, Ok(json!([1, 2])));
    }

    #[test]
    fn test_into_result_tolerates_unwrapped_body() {
        assert_eq!(ResultEnvelope::into_result(json!([{"id": 1}])), Ok(json!([{"id": 1}])));
        assert_eq!(
            ResultEnvelope::into_result(json!({"id": 3, "name": "ORB"})),
            Ok(json!({"id": 3, "name": "ORB"}))
        );
        assert_eq!(
            ResultEnvelope::into_result(json!({"success": true, "data": null})),
            Ok(json!({"success": true, "data": null}))
        );
    }

    #[test]
    fn test_into_result_empty_error_is_not_failure() {
        assert_eq!(
            ResultEnvelope::into_result(json!({"error": "", "data": {"id": 1}})),
            Ok(json!({"id": 1}))
        );
    }

    #[test]
    fn test_into_result_explicit_failure_without_message() {
        assert_eq!(
            ResultEnvelope::into_result(json!({"success": false})),
            Err(GatewayError::Remote("Remote request failed".to_string()))
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let body = serde_json::to_value(ResultEnvelope::failure("boom")).unwrap();
        assert_eq!(body, json!({"success": false, "error": "boom"}));
    }
}
