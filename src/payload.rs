//! Tolerant decoding of provider payloads
//!
//! The data API omits fields, sends `null`, or sends numbers as strings
//! depending on the account. Nothing here fails: every field is decoded into
//! a [`Field`] that records whether it was absent, null, mistyped or present,
//! and the derivation rules in [`crate::reading`] decide what to do with it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Success code of the embedded `status` object
pub const SUCCESS_CODE: i64 = 200;

/// Per-field presence of a decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Mistyped,
    Value(T),
}

impl<T> Field<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Mistyped => Field::Mistyped,
            Field::Value(v) => Field::Value(v),
        }
    }
}

fn lookup<'a>(obj: &'a Value, key: &str) -> Field<&'a Value> {
    match obj.get(key) {
        None => Field::Absent,
        Some(Value::Null) => Field::Null,
        Some(v) => Field::Value(v),
    }
}

/// Finite number, or a string holding one
pub fn number(obj: &Value, key: &str) -> Field<f64> {
    match lookup(obj, key) {
        Field::Value(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Field::Value(v),
            _ => Field::Mistyped,
        },
        Field::Value(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Field::Value(v),
            _ => Field::Mistyped,
        },
        Field::Value(_) => Field::Mistyped,
        Field::Absent => Field::Absent,
        Field::Null | Field::Mistyped => Field::Null,
    }
}

pub fn text(obj: &Value, key: &str) -> Field<String> {
    match lookup(obj, key) {
        Field::Value(Value::String(s)) => Field::Value(s.clone()),
        Field::Value(_) => Field::Mistyped,
        Field::Absent => Field::Absent,
        Field::Null | Field::Mistyped => Field::Null,
    }
}

pub fn list<'a>(obj: &'a Value, key: &str) -> Field<&'a Vec<Value>> {
    match lookup(obj, key) {
        Field::Value(Value::Array(items)) => Field::Value(items),
        Field::Value(_) => Field::Mistyped,
        Field::Absent => Field::Absent,
        Field::Null | Field::Mistyped => Field::Null,
    }
}

/// First present number among alias keys
fn number_any(obj: &Value, keys: &[&str]) -> Field<f64> {
    let mut seen = Field::Absent;
    for key in keys {
        match number(obj, key) {
            Field::Value(v) => return Field::Value(v),
            Field::Absent => {}
            other => seen = other,
        }
    }
    seen
}

fn text_any(obj: &Value, keys: &[&str]) -> Field<String> {
    let mut seen = Field::Absent;
    for key in keys {
        match text(obj, key) {
            Field::Value(v) => return Field::Value(v),
            Field::Absent => {}
            other => seen = other,
        }
    }
    seen
}

/// Parse an ISO-8601 timestamp; a trailing `Z` means `+00:00`, naive values
/// and bare dates are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_local_timezone(utc).single();
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0)?.and_local_timezone(utc).single();
    }
    None
}

/// `{status: {code, message}, data: {...}}`
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: Field<i64>,
    pub message: Option<String>,
    pub data: Value,
}

impl Envelope {
    pub fn from_body(body: &Value) -> Self {
        let status = body.get("status").cloned().unwrap_or(Value::Null);
        let code = match lookup(&status, "code") {
            Field::Value(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map_or(Field::Mistyped, Field::Value),
            Field::Value(Value::String(s)) if s.trim().is_empty() => Field::Null,
            Field::Value(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_or(Field::Mistyped, Field::Value),
            Field::Value(_) => Field::Mistyped,
            Field::Absent => Field::Absent,
            Field::Null | Field::Mistyped => Field::Null,
        };
        let message = text(&status, "message").value();
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        Self {
            code,
            message,
            data,
        }
    }

    /// Embedded non-success status, if any
    pub fn embedded_error(&self) -> Option<String> {
        let failed = match self.code {
            Field::Value(code) => code != SUCCESS_CODE,
            Field::Mistyped => true,
            Field::Absent | Field::Null => false,
        };
        failed.then(|| {
            self.message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string())
        })
    }
}

/// Decoded `bill/billForecast` data
#[derive(Debug, Clone, PartialEq)]
pub struct BillForecast {
    pub current_usage_kwh: Field<f64>,
    pub current_bill_amount: Field<f64>,
    pub projected_bill_amount: Field<f64>,
    pub billing_period_start: Field<String>,
    pub billing_period_end: Field<String>,
    pub net_metering_export_kwh: Field<f64>,
    pub grid_return_kwh: Field<f64>,
}

impl BillForecast {
    pub fn from_data(data: &Value) -> Self {
        Self {
            current_usage_kwh: number(data, "currentUsageKwh"),
            current_bill_amount: number(data, "currentBillAmount"),
            projected_bill_amount: number(data, "projectedBillAmount"),
            billing_period_start: text(data, "billingPeriodStartDate"),
            billing_period_end: text(data, "billingPeriodEndDate"),
            net_metering_export_kwh: number(data, "netMeteringExportKwh"),
            grid_return_kwh: number(data, "gridReturnKwh"),
        }
    }
}

/// One decoded per-day entry
#[derive(Debug, Clone, PartialEq)]
pub struct DailyEntry {
    pub date: Field<String>,
    pub kwh: Field<f64>,
    pub raw: Value,
}

impl DailyEntry {
    pub fn from_value(entry: &Value) -> Self {
        Self {
            date: text_any(entry, &["date", "usageDate", "readDate"]),
            kwh: number_any(entry, &["kwh", "usageKwh", "value"]),
            raw: entry.clone(),
        }
    }
}

/// Decoded `usage/usageHistory` data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageHistory {
    pub daily_usage: Vec<DailyEntry>,
    pub daily_return: Vec<DailyEntry>,
}

impl UsageHistory {
    pub fn from_data(data: &Value) -> Self {
        let entries = |key: &str| {
            list(data, key)
                .value()
                .map(|items| items.iter().map(DailyEntry::from_value).collect())
                .unwrap_or_default()
        };
        Self {
            daily_usage: entries("dailyUsage"),
            daily_return: entries("dailyReturn"),
        }
    }
}

/// One decoded bill of `bill/billHistory`
#[derive(Debug, Clone, PartialEq)]
pub struct BillEntry {
    pub total_amount: Field<f64>,
    pub total_usage_kwh: Field<f64>,
}

/// Decoded `bill/billHistory` data; the provider lists the newest bill first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillHistory {
    pub latest: Option<BillEntry>,
}

impl BillHistory {
    pub fn from_data(data: &Value) -> Self {
        let latest = list(data, "bills")
            .value()
            .and_then(|bills| bills.first())
            .map(|bill| BillEntry {
                total_amount: number(bill, "totalAmount"),
                total_usage_kwh: number(bill, "totalUsageKwh"),
            });
        Self { latest }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_presence() {
        let obj = json!({"a": 1.5, "b": null, "c": "2.25", "d": "n/a", "e": [1]});
        assert_eq!(number(&obj, "a"), Field::Value(1.5));
        assert_eq!(number(&obj, "b"), Field::Null);
        assert_eq!(number(&obj, "c"), Field::Value(2.25));
        assert_eq!(number(&obj, "d"), Field::Mistyped);
        assert_eq!(number(&obj, "e"), Field::Mistyped);
        assert_eq!(number(&obj, "missing"), Field::Absent);
        assert_eq!(number(&json!("not an object"), "a"), Field::Absent);
    }

    #[test]
    fn timestamps_accept_z_suffix_and_bare_dates() {
        let dt = parse_timestamp("2024-01-15T00:00:00Z").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let dt = parse_timestamp("2024-01-15T08:30:00-05:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);

        assert!(parse_timestamp("2024-01-15T08:30:00").is_some());
        assert!(parse_timestamp("2024-01-15").is_some());
        assert!(parse_timestamp("15/01/2024").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn envelope_status_codes() {
        let ok = Envelope::from_body(&json!({"status": {"code": 200}, "data": {"x": 1}}));
        assert_eq!(ok.embedded_error(), None);
        assert_eq!(ok.data, json!({"x": 1}));

        let ok_str = Envelope::from_body(&json!({"status": {"code": "200"}}));
        assert_eq!(ok_str.embedded_error(), None);

        let failed = Envelope::from_body(
            &json!({"status": {"code": 500, "message": "Account locked"}, "data": null}),
        );
        assert_eq!(failed.embedded_error().as_deref(), Some("Account locked"));

        let no_message = Envelope::from_body(&json!({"status": {"code": "E42"}}));
        assert_eq!(no_message.embedded_error().as_deref(), Some("Unknown error"));

        let no_status = Envelope::from_body(&json!({"data": {}}));
        assert_eq!(no_status.embedded_error(), None);
    }

    #[test]
    fn usage_history_aliases() {
        let data = json!({
            "dailyUsage": [
                {"date": "2024-01-01", "kwh": 10.5},
                {"usageDate": "2024-01-02T00:00:00Z", "usageKwh": "11"}
            ],
            "dailyReturn": null
        });
        let history = UsageHistory::from_data(&data);
        assert_eq!(history.daily_usage.len(), 2);
        assert_eq!(history.daily_usage[1].kwh, Field::Value(11.0));
        assert!(history.daily_return.is_empty());
    }

    #[test]
    fn bill_history_takes_first_entry() {
        let data = json!({"bills": [
            {"totalAmount": 100, "totalUsageKwh": 1000},
            {"totalAmount": 1, "totalUsageKwh": 1}
        ]});
        let latest = BillHistory::from_data(&data).latest.unwrap();
        assert_eq!(latest.total_amount, Field::Value(100.0));
        assert_eq!(BillHistory::from_data(&json!({"bills": []})).latest, None);
        assert_eq!(BillHistory::from_data(&Value::Null).latest, None);
    }
}
