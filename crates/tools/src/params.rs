//! Parameter parsing shared by the tools
//!
//! Parsing is separated from validation: malformed numbers in a quote become
//! NaN or `None` here so the validator can report them field by field.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use partner_commission_core::{parse_volume, QuoteInput};

use crate::mcp::ToolError;

/// First present key, so snake_case and camelCase inputs both work
pub fn field<'a>(input: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| input.get(*key))
        .filter(|v| !v.is_null())
}

pub fn optional_str<'a>(input: &'a Value, keys: &[&str]) -> Option<&'a str> {
    field(input, keys).and_then(Value::as_str)
}

/// Participant volume from a number or a user-typed string ("2,500")
pub fn volume(input: &Value, keys: &[&str]) -> Result<u64, ToolError> {
    optional_volume(input, keys)?
        .ok_or_else(|| ToolError::invalid_params(format!("{} is required", keys[0])))
}

pub fn optional_volume(input: &Value, keys: &[&str]) -> Result<Option<u64>, ToolError> {
    let Some(value) = field(input, keys) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => parse_volume(&n.to_string()),
        Value::String(s) => parse_volume(s),
        _ => {
            return Err(ToolError::invalid_params(format!(
                "{} must be a number",
                keys[0]
            )))
        }
    };

    parsed
        .map(Some)
        .map_err(|e| ToolError::invalid_params(format!("{}: {}", keys[0], e)))
}

/// Non-negative whole number with a default
pub fn count(input: &Value, keys: &[&str], default: u32) -> Result<u32, ToolError> {
    match field(input, keys) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                ToolError::invalid_params(format!("{} must be a whole number", keys[0]))
            }),
    }
}

pub fn number(input: &Value, keys: &[&str]) -> Result<f64, ToolError> {
    field(input, keys)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid_params(format!("{} must be a number", keys[0])))
}

/// RFC 3339 timestamp, naive `YYYY-MM-DDTHH:MM:SS` (UTC) or `YYYY-MM-DD`
/// (midnight UTC)
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|d| d.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

/// Evaluation time: `as_of` when given, otherwise now
pub fn as_of(input: &Value) -> Result<DateTime<Utc>, ToolError> {
    match optional_str(input, &["as_of", "asOf"]) {
        None => Ok(Utc::now()),
        Some(raw) => parse_date(raw)
            .ok_or_else(|| ToolError::invalid_params("as_of must be an ISO 8601 date or timestamp")),
    }
}

fn loose_number(value: Option<&Value>) -> Option<f64> {
    value.map(|v| match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// Raw quote request from a JSON form submission
pub fn quote_input(input: &Value) -> Result<QuoteInput, ToolError> {
    if !input.is_object() {
        return Err(ToolError::invalid_params("quote must be a JSON object"));
    }

    let text = |keys: &[&str]| optional_str(input, keys).map(str::to_string);

    Ok(QuoteInput {
        event_type: text(&["event_type", "eventType"]).unwrap_or_default(),
        coverage_type: text(&["coverage_type", "coverageType"]).unwrap_or_default(),
        participants: loose_number(field(input, &["participants"])).unwrap_or(f64::NAN),
        event_date: optional_str(input, &["event_date", "eventDate"]).and_then(parse_date),
        duration_hours: loose_number(field(input, &["duration_hours", "duration"])),
        location: text(&["location"]),
        customer_email: text(&["customer_email", "customerEmail"]),
        customer_name: text(&["customer_name", "customerName"]),
        event_details: field(input, &["event_details", "eventDetails"])
            .and_then(Value::as_object)
            .cloned(),
        partner_volume: optional_volume(input, &["partner_volume", "partnerVolume"])?,
    })
}
