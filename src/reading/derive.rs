//! Derivation rules from decoded payloads to [`Reading`] fields

use super::{Reading, UsagePoint};
use crate::logging::StructuredLogger;
use crate::payload::{BillForecast, BillHistory, DailyEntry, Field, UsageHistory, parse_timestamp};
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// Energy quantities are never negative; anything else is dropped
fn energy(field: Field<f64>, name: &str, logger: &StructuredLogger) -> Option<f64> {
    match field {
        Field::Value(v) if v < 0.0 => {
            logger.warn(&format!("Ignoring negative {}: {}", name, v));
            None
        }
        Field::Value(v) => Some(v),
        Field::Mistyped => {
            logger.warn(&format!("Ignoring non-numeric {}", name));
            None
        }
        Field::Absent | Field::Null => None,
    }
}

fn timestamp(
    field: &Field<String>,
    name: &str,
    logger: &StructuredLogger,
) -> Option<DateTime<FixedOffset>> {
    match field {
        Field::Value(raw) if raw.trim().is_empty() => None,
        Field::Value(raw) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                logger.warn(&format!("Could not parse {}: {}", name, raw));
            }
            parsed
        }
        Field::Mistyped => {
            logger.warn(&format!("Could not parse {}: not a string", name));
            None
        }
        Field::Absent | Field::Null => None,
    }
}

/// Populate usage, bill, billing period, grid return, rate and daily cost
pub fn apply_forecast(
    reading: &mut Reading,
    forecast: &BillForecast,
    today: NaiveDate,
    logger: &StructuredLogger,
) {
    let usage = energy(forecast.current_usage_kwh.clone(), "current usage", logger);
    reading.monthly_usage = usage;
    reading.grid_consumption = usage;

    reading.current_bill = forecast
        .current_bill_amount
        .clone()
        .value()
        .or_else(|| forecast.projected_bill_amount.clone().value());

    reading.billing_period_start =
        timestamp(&forecast.billing_period_start, "billing start date", logger);
    reading.billing_period_end = timestamp(&forecast.billing_period_end, "billing end date", logger);
    if let (Some(start), Some(end)) = (reading.billing_period_start, reading.billing_period_end) {
        if end < start {
            logger.warn(&format!(
                "Billing period ends ({}) before it starts ({}); dropping end date",
                end, start
            ));
            reading.billing_period_end = None;
        }
    }

    // Net-metering export first, then the generic field; zero export is the
    // common case for accounts without solar
    reading.grid_return = Some(
        energy(forecast.net_metering_export_kwh.clone(), "net metering export", logger)
            .or_else(|| energy(forecast.grid_return_kwh.clone(), "grid return", logger))
            .unwrap_or(0.0),
    );

    reading.current_rate = match (reading.current_bill, reading.monthly_usage) {
        (Some(bill), Some(usage)) if usage > 0.0 => Some(round_to(bill / usage, 4)),
        _ => None,
    };

    reading.daily_cost = match (reading.billing_period_start, reading.current_bill) {
        (Some(start), Some(bill)) => {
            let days_elapsed = (today - start.date_naive()).num_days();
            (days_elapsed > 0).then(|| round_to(bill / days_elapsed as f64, 2))
        }
        _ => None,
    };
}

// Every entry is kept; unknown shapes only lose their typed fields
fn usage_points(entries: &[DailyEntry], name: &str, logger: &StructuredLogger) -> Vec<UsagePoint> {
    let mut unmapped = 0usize;
    let points: Vec<UsagePoint> = entries
        .iter()
        .map(|entry| {
            let date = entry
                .date
                .as_ref()
                .value()
                .and_then(|raw| parse_timestamp(raw))
                .map(|dt| dt.date_naive());
            let kwh = entry.kwh.clone().value().filter(|v| *v >= 0.0);
            if date.is_none() || kwh.is_none() {
                unmapped += 1;
            }
            UsagePoint {
                date,
                kwh,
                raw: entry.raw.clone(),
            }
        })
        .collect();
    if unmapped > 0 {
        logger.warn(&format!(
            "{} of {} {} entries have no recognizable date or kWh; kept as raw",
            unmapped,
            points.len(),
            name
        ));
    }
    points
}

/// Populate the per-day sequences; an empty list leaves the field unset
pub fn apply_usage_history(reading: &mut Reading, history: &UsageHistory, logger: &StructuredLogger) {
    let usage = usage_points(&history.daily_usage, "daily usage", logger);
    if !usage.is_empty() {
        reading.daily_usage = Some(usage);
    }
    let returned = usage_points(&history.daily_return, "daily return", logger);
    if !returned.is_empty() {
        reading.daily_return = Some(returned);
    }
}

/// Back-fill the rate from the latest bill when the forecast gave none
pub fn apply_bill_history(reading: &mut Reading, history: &BillHistory) {
    if reading.current_rate.is_some() {
        return;
    }
    let Some(latest) = &history.latest else {
        return;
    };
    let amount = latest.total_amount.clone().value();
    let usage = latest.total_usage_kwh.clone().value();
    if let (Some(amount), Some(usage)) = (amount, usage) {
        if usage > 0.0 {
            reading.current_rate = Some(round_to(amount / usage, 4));
        }
    }
}
