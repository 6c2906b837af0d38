//! Request shaping and response interpretation for the data endpoints

use crate::auth::AuthToken;
use crate::config::HttpConfig;
use crate::error::{DominionError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::payload::Envelope;
use serde_json::Value;

pub const BILL_FORECAST_ENDPOINT: &str = "/bill/billForecast";
pub const USAGE_HISTORY_ENDPOINT: &str = "/usage/usageHistory";
pub const BILL_HISTORY_ENDPOINT: &str = "/bill/billHistory";
pub const ACTION_CODE: &str = "4";

const FIXED_KEYS: [&str; 2] = ["accountNumber", "actionCode"];

/// Fixed `accountNumber`/`actionCode` first, then caller keys that do not
/// collide with them; a repeated caller key keeps its last value
pub fn merge_query(account_number: &str, extra: &[(String, String)]) -> Vec<(String, String)> {
    let mut query = vec![
        ("accountNumber".to_string(), account_number.to_string()),
        ("actionCode".to_string(), ACTION_CODE.to_string()),
    ];
    for (key, value) in extra {
        if FIXED_KEYS.contains(&key.as_str()) {
            continue;
        }
        match query.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.clone(),
            None => query.push((key.clone(), value.clone())),
        }
    }
    query
}

/// GET request for a data endpoint with the fixed header set
pub fn build_data_request(
    api_base: &str,
    endpoint: &str,
    query: Vec<(String, String)>,
    token: &AuthToken,
    http: &HttpConfig,
) -> HttpRequest {
    HttpRequest::get(format!("{}{}", api_base.trim_end_matches('/'), endpoint))
        .with_query(query)
        .with_header("uid", "1")
        .with_header("pt", "1")
        .with_header("channel", "WEB")
        .with_header("Origin", http.origin.clone())
        .with_header("Accept", "application/json")
        .with_header("User-Agent", http.user_agent.clone())
        .with_header("Authorization", token.as_header())
}

/// Map a data endpoint response to its JSON body or an error
pub fn interpret_response(response: &HttpResponse) -> Result<Value> {
    if response.status == 401 {
        return Err(DominionError::auth("token expired"));
    }
    if response.status != 200 {
        return Err(DominionError::api_status(
            response.status,
            format!("API request failed with status {}", response.status),
        ));
    }
    let body = response
        .json()
        .map_err(|e| DominionError::api(format!("Invalid JSON from API: {}", e)))?;
    if let Some(message) = Envelope::from_body(&body).embedded_error() {
        return Err(DominionError::api(format!("API error: {}", message)));
    }
    Ok(body)
}
