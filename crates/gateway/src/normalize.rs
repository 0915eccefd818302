//! # Response normalization
//!
//! The sheet has no enforced schema: numbers arrive as text, booleans as
//! `"Yes"`/`"No"`, optional cells as empty strings. Every function here treats
//! each field as untrusted and applies an explicit coercion rule.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tradesheet_core::journal::entity::{PsychologyEntry, Strategy, Trade};

const DEFAULT_MONEY: &str = "0";
const DEFAULT_STATUS: &str = "active";

/// # Summary
/// Coerces one raw trade row into a `Trade`.
///
/// # Logic
/// 1. `quantity` and `id` become integers (text is parsed by leading digits).
/// 2. `isTradeTaken` / `setupFollowed` accept `true`, `"Yes"`, `"true"`, `1`.
/// 3. `entryPrice` / `profitLoss` default to `"0"`; the other prices to `None`.
/// 4. Empty optional text becomes `None`.
///
/// # Arguments
/// * `raw` - The row as received; non-objects yield an all-default trade.
pub fn trade(raw: &Value) -> Trade {
    let row = fields(raw);
    Trade {
        id: integer(row.get("id")).unwrap_or(0),
        date: text(row.get("date")).unwrap_or_default(),
        stock_name: text(row.get("stockName")).unwrap_or_default(),
        trade_type: text(row.get("tradeType")).unwrap_or_default(),
        quantity: integer(row.get("quantity")).unwrap_or(0),
        entry_price: text(row.get("entryPrice")).unwrap_or_else(|| DEFAULT_MONEY.to_string()),
        exit_price: text(row.get("exitPrice")),
        stop_loss: text(row.get("stopLoss")),
        target_price: text(row.get("targetPrice")),
        profit_loss: text(row.get("profitLoss")).unwrap_or_else(|| DEFAULT_MONEY.to_string()),
        which_setup: text(row.get("whichSetup")),
        is_trade_taken: flag(row.get("isTradeTaken")),
        setup_followed: flag(row.get("setupFollowed")),
        emotion: text(row.get("emotion")),
        notes: text(row.get("notes")),
        psychology_reflections: text(row.get("psychologyReflections")),
        screenshot_link: text(row.get("screenshotLink")),
        created_at: timestamp(row.get("createdAt")),
    }
}

/// # Summary
/// Coerces one raw strategy row into a `Strategy`.
///
/// # Logic
/// `tags` may be a comma-joined cell (`"a, b"`) or a real array; both become a
/// trimmed list without empty entries. `status` defaults to `active`.
pub fn strategy(raw: &Value) -> Strategy {
    let row = fields(raw);
    Strategy {
        id: integer(row.get("id")).unwrap_or(0),
        name: text(row.get("name")).unwrap_or_default(),
        description: text(row.get("description")),
        status: text(row.get("status")).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        tags: tags(row.get("tags")),
        screenshot_url: text(row.get("screenshotUrl")),
        created_at: timestamp(row.get("createdAt")),
    }
}

/// # Summary
/// Coerces one raw psychology row into a `PsychologyEntry`.
///
/// # Logic
/// Trade references that are missing, zero or unparseable become `None`.
pub fn psychology_entry(raw: &Value) -> PsychologyEntry {
    let row = fields(raw);
    PsychologyEntry {
        id: integer(row.get("id")).unwrap_or(0),
        date: text(row.get("date")).unwrap_or_default(),
        daily_pnl: text(row.get("dailyPnL")),
        best_trade_id: reference(row.get("bestTradeId")),
        worst_trade_id: reference(row.get("worstTradeId")),
        mental_reflections: text(row.get("mentalReflections")),
        improvement_areas: text(row.get("improvementAreas")),
        created_at: timestamp(row.get("createdAt")),
    }
}

fn fields(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Non-empty text; numbers and booleans are rendered as text.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

/// A trade reference: zero is "no trade".
fn reference(value: Option<&Value>) -> Option<i64> {
    integer(value).filter(|id| *id != 0)
}

fn truncate(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    f.trunc().to_string().parse().ok()
}

/// Parses the leading integer of `s`, ignoring any trailing text (`"12 shares"` → 12).
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let number = digits.get(..end)?;
    if number.is_empty() {
        return None;
    }
    format!("{}{}", sign, number).parse().ok()
}

fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| text(Some(item)))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, a bare date, or epoch milliseconds.
fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(naive.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
            }
            s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
        }
        _ => None,
    }
}
