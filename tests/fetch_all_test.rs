mod common;

use chrono::NaiveDate;
use common::{Reply, ScriptedTransport, envelope, test_config};
use dominion_energy::DominionClient;
use dominion_energy::clock::FixedClock;
use dominion_energy::http::Session;
use serde_json::json;
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
}

fn authed_client(transport: Arc<ScriptedTransport>) -> DominionClient {
    let config = test_config();
    let mut client =
        DominionClient::with_session(config.credentials(), &config, Session::borrowed(transport))
            .unwrap()
            .with_clock(Arc::new(FixedClock(today())));
    client.set_token("data-token").unwrap();
    client
}

fn forecast() -> Reply {
    Reply::ok(envelope(json!({
        "currentUsageKwh": 500.0,
        "currentBillAmount": 75.0,
        "billingPeriodStartDate": "2024-01-15T00:00:00Z",
        "billingPeriodEndDate": "2024-02-14T00:00:00Z",
    })))
}

#[tokio::test]
async fn full_reading_from_all_endpoints() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/bill/billForecast", forecast())
            .route(
                "/usage/usageHistory",
                Reply::ok(envelope(json!({
                    "dailyUsage": [
                        {"date": "2024-01-23", "kwh": 15.5},
                        {"usageDate": "2024-01-24T00:00:00", "usageKwh": "16.25"},
                        {"date": "garbage", "kwh": 1.0},
                    ],
                    "dailyReturn": [],
                }))),
            )
            .route(
                "/bill/billHistory",
                Reply::ok(envelope(json!({"bills": [{"totalAmount": 90.0, "totalUsageKwh": 600.0}]}))),
            ),
    );
    let mut client = authed_client(transport.clone());

    let reading = client.fetch_all().await.unwrap();
    assert_eq!(reading.grid_consumption, Some(500.0));
    assert_eq!(reading.monthly_usage, Some(500.0));
    assert_eq!(reading.current_bill, Some(75.0));
    assert_eq!(reading.current_rate, Some(0.15));
    assert_eq!(reading.daily_cost, Some(7.5));
    assert_eq!(reading.grid_return, Some(0.0));
    assert_eq!(
        reading.billing_period_start.unwrap().date_naive(),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
    let usage = reading.daily_usage.unwrap();
    assert_eq!(usage.len(), 3);
    assert_eq!(usage[0].date, NaiveDate::from_ymd_opt(2024, 1, 23));
    assert_eq!(usage[0].kwh, Some(15.5));
    assert_eq!(usage[1].date, NaiveDate::from_ymd_opt(2024, 1, 24));
    assert_eq!(usage[1].kwh, Some(16.25));
    assert_eq!(usage[2].date, None);
    assert_eq!(usage[2].raw, json!({"date": "garbage", "kwh": 1.0}));
    assert_eq!(reading.daily_return, None);

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    for req in &requests {
        assert_eq!(req.query_value("accountNumber"), Some("1234567890"));
        assert_eq!(req.query_value("actionCode"), Some("4"));
        assert_eq!(req.header("Authorization"), Some("Bearer data-token"));
        assert_eq!(req.header("channel"), Some("WEB"));
        assert_eq!(req.header("uid"), Some("1"));
        assert_eq!(req.header("pt"), Some("1"));
        assert_eq!(req.header("Origin"), Some("https://myaccount.dominionenergy.com"));
    }
}

#[tokio::test]
async fn failing_usage_history_leaves_daily_fields_unset() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/bill/billForecast", forecast())
            .route("/usage/usageHistory", Reply::status(500, "oops"))
            .route("/bill/billHistory", Reply::ok(envelope(json!({"bills": []})))),
    );
    let mut client = authed_client(transport);

    let reading = client.fetch_all().await.unwrap();
    assert_eq!(reading.current_rate, Some(0.15));
    assert_eq!(reading.daily_usage, None);
    assert_eq!(reading.daily_return, None);
}

#[tokio::test]
async fn bill_history_backfills_missing_rate() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(
                "/bill/billForecast",
                Reply::ok(envelope(json!({"currentUsageKwh": null, "projectedBillAmount": 80.0}))),
            )
            .route("/usage/usageHistory", Reply::ok(envelope(json!({}))))
            .route(
                "/bill/billHistory",
                Reply::ok(envelope(json!({"bills": [
                    {"totalAmount": 60.0, "totalUsageKwh": 600.0},
                    {"totalAmount": 999.0, "totalUsageKwh": 1.0},
                ]}))),
            ),
    );
    let mut client = authed_client(transport);

    let reading = client.fetch_all().await.unwrap();
    assert_eq!(reading.current_bill, Some(80.0));
    assert_eq!(reading.grid_consumption, None);
    assert_eq!(reading.current_rate, Some(0.1));
    assert_eq!(reading.daily_cost, None);
}

#[tokio::test]
async fn embedded_error_status_is_isolated_to_its_endpoint() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(
                "/bill/billForecast",
                Reply::ok(json!({"status": {"code": 500, "message": "Backend down"}, "data": null})),
            )
            .route(
                "/usage/usageHistory",
                Reply::ok(envelope(json!({"dailyReturn": [{"date": "2024-01-20", "value": 3.0}]}))),
            )
            .route("/bill/billHistory", Reply::Fail("timed out".to_string())),
    );
    let mut client = authed_client(transport);

    let reading = client.fetch_all().await.unwrap();
    assert_eq!(reading.current_bill, None);
    assert_eq!(reading.grid_return, None);
    assert_eq!(reading.daily_return.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn expired_token_surfaces_as_auth_error() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("/bill/billForecast", forecast())
            .route("/usage/usageHistory", Reply::status(401, ""))
            .route("/bill/billHistory", Reply::ok(envelope(json!({})))),
    );
    let mut client = authed_client(transport);

    let err = client.fetch_all().await.unwrap_err();
    assert!(err.is_auth());
    assert!(err.to_string().contains("token expired"));
}

#[tokio::test]
async fn everything_failing_yields_an_empty_reading() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut client = authed_client(transport);

    let reading = client.fetch_all().await.unwrap();
    assert!(reading.is_empty());
}

#[tokio::test]
async fn usage_history_forwards_date_filters() {
    let transport = Arc::new(
        ScriptedTransport::new().route("/usage/usageHistory", Reply::ok(envelope(json!({})))),
    );
    let mut client = authed_client(transport.clone());

    client
        .get_usage_history(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        )
        .await
        .unwrap();

    let req = &transport.requests_to("/usage/usageHistory")[0];
    assert_eq!(req.query_value("startDate"), Some("2024-01-01"));
    assert_eq!(req.query_value("endDate"), Some("2024-01-31"));
    assert_eq!(req.query_value("accountNumber"), Some("1234567890"));
}

#[tokio::test]
async fn caller_cannot_override_fixed_query_keys() {
    let transport = Arc::new(
        ScriptedTransport::new().route("/custom/endpoint", Reply::ok(envelope(json!({})))),
    );
    let mut client = authed_client(transport.clone());

    client
        .request(
            "/custom/endpoint",
            &[
                ("accountNumber".to_string(), "other".to_string()),
                ("page".to_string(), "2".to_string()),
            ],
        )
        .await
        .unwrap();

    let req = &transport.requests()[0];
    assert_eq!(req.query_value("accountNumber"), Some("1234567890"));
    assert_eq!(req.query_value("page"), Some("2"));
}

#[tokio::test]
async fn malformed_billing_start_degrades_only_dependent_fields() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(
                "/bill/billForecast",
                Reply::ok(envelope(json!({
                    "currentUsageKwh": 500.0,
                    "currentBillAmount": 75.0,
                    "billingPeriodStartDate": "not-a-date",
                    "billingPeriodEndDate": "2024-02-14T00:00:00Z",
                }))),
            )
            .route("/usage/usageHistory", Reply::ok(envelope(json!({}))))
            .route("/bill/billHistory", Reply::ok(envelope(json!({})))),
    );
    let mut client = authed_client(transport);

    let reading = client.fetch_all().await.unwrap();
    assert_eq!(reading.billing_period_start, None);
    assert_eq!(reading.daily_cost, None);
    assert!(reading.billing_period_end.is_some());
    assert_eq!(reading.current_bill, Some(75.0));
    assert_eq!(reading.current_rate, Some(0.15));
}

#[tokio::test]
async fn bill_history_request_carries_fixed_query_pair() {
    let transport = Arc::new(
        ScriptedTransport::new().route(
            "/bill/billHistory",
            Reply::ok(envelope(json!({"bills": [{"totalAmount": 10.0}]}))),
        ),
    );
    let mut client = authed_client(transport.clone());

    let body = client.get_bill_history().await.unwrap();
    assert_eq!(body["data"]["bills"][0]["totalAmount"], 10.0);

    let requests = transport.requests_to("/bill/billHistory");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("accountNumber"), Some("1234567890"));
    assert_eq!(requests[0].query_value("actionCode"), Some("4"));
    assert_eq!(requests[0].query.len(), 2);
}
