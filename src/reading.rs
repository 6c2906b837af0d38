//! Normalized reading produced by one fetch cycle

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use serde_json::Value;

pub mod derive;

pub use derive::{apply_bill_history, apply_forecast, apply_usage_history, round_to};

/// One per-day entry. `date` and `kwh` are filled when the entry uses a
/// known key; `raw` always holds the entry as the provider sent it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePoint {
    pub date: Option<NaiveDate>,
    pub kwh: Option<f64>,
    pub raw: Value,
}

/// Snapshot of usage and billing; every field may be missing because the
/// upstream data is unreliable
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    /// kWh drawn from the grid this billing period
    pub grid_consumption: Option<f64>,
    /// kWh returned to the grid (net metering)
    pub grid_return: Option<f64>,
    /// kWh used this billing period
    pub monthly_usage: Option<f64>,

    pub current_bill: Option<f64>,
    pub billing_period_start: Option<DateTime<FixedOffset>>,
    pub billing_period_end: Option<DateTime<FixedOffset>>,

    /// Currency per kWh
    pub current_rate: Option<f64>,
    /// Currency per elapsed day of the billing period
    pub daily_cost: Option<f64>,

    pub daily_usage: Option<Vec<UsagePoint>>,
    pub daily_return: Option<Vec<UsagePoint>>,
}

impl Reading {
    /// Whether any endpoint contributed data
    pub fn is_empty(&self) -> bool {
        *self == Reading::default()
    }
}
