//! Measurement points exposed to the home-automation platform
//!
//! Each [`SensorDescription`] names one value of a [`Reading`] together with
//! its unit and classification. A sensor is available only while its value
//! is present.

use crate::reading::Reading;
use chrono::NaiveDate;
use serde::Serialize;

pub const ATTRIBUTION: &str = "Data provided by Dominion Energy";

pub const SENSOR_GRID_CONSUMPTION: &str = "grid_consumption";
pub const SENSOR_GRID_RETURN: &str = "grid_return";
pub const SENSOR_MONTHLY_USAGE: &str = "monthly_usage";
pub const SENSOR_CURRENT_BILL: &str = "current_bill";
pub const SENSOR_DAILY_COST: &str = "daily_cost";
pub const SENSOR_CURRENT_RATE: &str = "current_rate";
pub const SENSOR_BILLING_PERIOD_START: &str = "billing_period_start";
pub const SENSOR_BILLING_PERIOD_END: &str = "billing_period_end";

const KWH: &str = "kWh";
const USD: &str = "USD";
const USD_PER_KWH: &str = "USD/kWh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Energy,
    Monetary,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    Total,
    TotalIncreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Date(NaiveDate),
}

pub struct SensorDescription {
    pub key: &'static str,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub display_precision: Option<u8>,
    pub value: fn(&Reading) -> Option<SensorValue>,
}

impl std::fmt::Debug for SensorDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorDescription")
            .field("key", &self.key)
            .field("unit", &self.unit)
            .field("device_class", &self.device_class)
            .field("state_class", &self.state_class)
            .finish_non_exhaustive()
    }
}

fn number(v: Option<f64>) -> Option<SensorValue> {
    v.map(SensorValue::Number)
}

pub static SENSOR_DESCRIPTIONS: [SensorDescription; 8] = [
    SensorDescription {
        key: SENSOR_GRID_CONSUMPTION,
        unit: Some(KWH),
        device_class: Some(DeviceClass::Energy),
        state_class: Some(StateClass::TotalIncreasing),
        display_precision: Some(1),
        value: |r| number(r.grid_consumption),
    },
    SensorDescription {
        key: SENSOR_GRID_RETURN,
        unit: Some(KWH),
        device_class: Some(DeviceClass::Energy),
        state_class: Some(StateClass::TotalIncreasing),
        display_precision: Some(1),
        value: |r| number(r.grid_return),
    },
    SensorDescription {
        key: SENSOR_MONTHLY_USAGE,
        unit: Some(KWH),
        device_class: Some(DeviceClass::Energy),
        state_class: Some(StateClass::Total),
        display_precision: Some(1),
        value: |r| number(r.monthly_usage),
    },
    SensorDescription {
        key: SENSOR_CURRENT_BILL,
        unit: Some(USD),
        device_class: Some(DeviceClass::Monetary),
        state_class: Some(StateClass::Total),
        display_precision: Some(2),
        value: |r| number(r.current_bill),
    },
    SensorDescription {
        key: SENSOR_DAILY_COST,
        unit: Some(USD),
        device_class: Some(DeviceClass::Monetary),
        state_class: Some(StateClass::Measurement),
        display_precision: Some(2),
        value: |r| number(r.daily_cost),
    },
    SensorDescription {
        key: SENSOR_CURRENT_RATE,
        unit: Some(USD_PER_KWH),
        device_class: None,
        state_class: Some(StateClass::Measurement),
        display_precision: Some(4),
        value: |r| number(r.current_rate),
    },
    SensorDescription {
        key: SENSOR_BILLING_PERIOD_START,
        unit: None,
        device_class: Some(DeviceClass::Date),
        state_class: None,
        display_precision: None,
        value: |r| r.billing_period_start.map(|dt| SensorValue::Date(dt.date_naive())),
    },
    SensorDescription {
        key: SENSOR_BILLING_PERIOD_END,
        unit: None,
        device_class: Some(DeviceClass::Date),
        state_class: None,
        display_precision: None,
        value: |r| r.billing_period_end.map(|dt| SensorValue::Date(dt.date_naive())),
    },
];

/// Current state of one sensor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub key: &'static str,
    pub unit: Option<&'static str>,
    pub value: Option<SensorValue>,
    pub available: bool,
}

pub fn unique_id(account_number: &str, key: &str) -> String {
    format!("{}_{}", account_number, key)
}

pub fn sensor_states(reading: &Reading, account_number: &str) -> Vec<SensorState> {
    SENSOR_DESCRIPTIONS
        .iter()
        .map(|desc| {
            let value = (desc.value)(reading);
            SensorState {
                unique_id: unique_id(account_number, desc.key),
                key: desc.key,
                unit: desc.unit,
                value,
                available: value.is_some(),
            }
        })
        .collect()
}
