use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================
//  Trade
// ============================================================

/// # Summary
/// A single journaled trade as stored in the remote sheet.
///
/// # Invariants
/// - `id` and `created_at` are assigned by the remote store.
/// - Monetary fields keep their textual form to avoid floating-point drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub date: String,
    pub stock_name: String,
    pub trade_type: String,
    pub quantity: i64,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub stop_loss: Option<String>,
    pub target_price: Option<String>,
    pub profit_loss: String,
    pub which_setup: Option<String>,
    pub is_trade_taken: bool,
    pub setup_followed: bool,
    pub emotion: Option<String>,
    pub notes: Option<String>,
    pub psychology_reflections: Option<String>,
    pub screenshot_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `addTrade`: a trade without its remote-assigned fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub date: String,
    pub stock_name: String,
    pub trade_type: String,
    pub quantity: i64,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub stop_loss: Option<String>,
    pub target_price: Option<String>,
    pub profit_loss: String,
    pub which_setup: Option<String>,
    pub is_trade_taken: bool,
    pub setup_followed: bool,
    pub emotion: Option<String>,
    pub notes: Option<String>,
    pub psychology_reflections: Option<String>,
    pub screenshot_link: Option<String>,
}

/// Partial update for `updateTrade`; absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub which_setup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_trade_taken: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_followed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psychology_reflections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_link: Option<String>,
}

// ============================================================
//  Strategy
// ============================================================

/// # Summary
/// A named trading setup that trades can refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Free-form status; the sheet uses `active` unless told otherwise.
    pub status: String,
    pub tags: Vec<String>,
    pub screenshot_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStrategy {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub screenshot_url: Option<String>,
}

impl Default for NewStrategy {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            status: "active".to_string(),
            tags: Vec::new(),
            screenshot_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
}

// ============================================================
//  Psychology
// ============================================================

/// # Summary
/// A daily reflection on trading mindset.
///
/// # Invariants
/// - `best_trade_id` / `worst_trade_id` refer to `Trade::id` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologyEntry {
    pub id: i64,
    pub date: String,
    #[serde(rename = "dailyPnL")]
    pub daily_pnl: Option<String>,
    pub best_trade_id: Option<i64>,
    pub worst_trade_id: Option<i64>,
    pub mental_reflections: Option<String>,
    pub improvement_areas: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPsychologyEntry {
    pub date: String,
    #[serde(rename = "dailyPnL")]
    pub daily_pnl: Option<String>,
    pub best_trade_id: Option<i64>,
    pub worst_trade_id: Option<i64>,
    pub mental_reflections: Option<String>,
    pub improvement_areas: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologyEntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "dailyPnL", skip_serializing_if = "Option::is_none")]
    pub daily_pnl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_trade_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_trade_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mental_reflections: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_areas: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_trade_wire_names() {
        let trade = NewTrade {
            date: "2024-05-01".into(),
            stock_name: "RELIANCE".into(),
            trade_type: "Buy".into(),
            quantity: 10,
            entry_price: "2890.50".into(),
            profit_loss: "0".into(),
            is_trade_taken: true,
            ..Default::default()
        };
        let v = serde_json::to_value(&trade).unwrap();
        assert_eq!(v["stockName"], "RELIANCE");
        assert_eq!(v["entryPrice"], "2890.50");
        assert_eq!(v["isTradeTaken"], true);
        assert_eq!(v["exitPrice"], serde_json::Value::Null);
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = TradePatch {
            exit_price: Some("2910".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"exitPrice": "2910"}));

        let patch = PsychologyEntryPatch {
            daily_pnl: Some("-120".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"dailyPnL": "-120"}));
    }

    #[test]
    fn test_new_strategy_defaults_active() {
        let s = NewStrategy::default();
        assert_eq!(s.status, "active");
        assert!(s.tags.is_empty());
    }
}
