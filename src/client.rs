//! Data client and normalizer
//!
//! [`DominionClient`] owns the credentials, the auth state and (lazily) the
//! HTTP session. A caller authenticates once (or injects a long-lived token)
//! and then calls [`DominionClient::fetch_all`] per poll to get a fresh
//! [`Reading`].

pub mod request;

use crate::auth::{AuthState, AuthToken, LoginEndpoints, run_login};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, Credentials, EndpointsConfig, HttpConfig};
use crate::error::{DominionError, Result};
use crate::http::{Session, Transport};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::payload::{BillForecast, BillHistory, Envelope, UsageHistory};
use crate::reading::{Reading, apply_bill_history, apply_forecast, apply_usage_history};
use chrono::NaiveDate;
use request::{
    BILL_FORECAST_ENDPOINT, BILL_HISTORY_ENDPOINT, USAGE_HISTORY_ENDPOINT, build_data_request,
    interpret_response, merge_query,
};
use serde_json::Value;
use std::sync::Arc;

/// Client for the Dominion Energy customer API
pub struct DominionClient {
    credentials: Credentials,
    endpoints: EndpointsConfig,
    http: HttpConfig,
    session: Option<Session>,
    auth: AuthState,
    clock: Arc<dyn Clock>,
    logger: StructuredLogger,
}

impl DominionClient {
    /// Client that creates and owns its HTTP session on first use
    pub fn new(credentials: Credentials, config: &Config) -> Result<Self> {
        let clock = Arc::new(SystemClock::new(config.tz()?));
        let logger = get_logger_with_context(
            LogContext::new("client").with_account(&credentials.account_number),
        );
        Ok(Self {
            credentials,
            endpoints: config.endpoints.clone(),
            http: config.http.clone(),
            session: None,
            auth: AuthState::Unauthenticated,
            clock,
            logger,
        })
    }

    /// Client using a caller-supplied session
    pub fn with_session(credentials: Credentials, config: &Config, session: Session) -> Result<Self> {
        let mut client = Self::new(credentials, config)?;
        client.session = Some(session);
        Ok(client)
    }

    /// Replace the clock used for daily cost
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.auth.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn ensure_session(&mut self) -> Result<Arc<dyn Transport>> {
        if let Some(session) = &self.session {
            return Ok(Arc::clone(session.transport()));
        }
        let session = Session::create(&self.http)?;
        self.logger.debug("Created owned HTTP session");
        let transport = Arc::clone(session.transport());
        self.session = Some(session);
        Ok(transport)
    }

    /// Run the login chain and store the resulting bearer token
    pub async fn authenticate(&mut self) -> Result<()> {
        let transport = self
            .ensure_session()
            .map_err(|e| DominionError::auth(format!("Network error during authentication: {}", e)))?;
        let endpoints = LoginEndpoints {
            login_base: self.endpoints.login_base.clone(),
            user_agent: self.http.user_agent.clone(),
        };
        let logger = get_logger_with_context(
            LogContext::new("auth").with_account(&self.credentials.account_number),
        );
        let token = run_login(transport.as_ref(), &self.credentials, &endpoints, &logger).await?;
        self.auth = AuthState::Authenticated(token);
        Ok(())
    }

    /// Inject a pre-obtained token, bypassing the login chain
    pub fn set_token(&mut self, raw: &str) -> Result<()> {
        self.auth = AuthState::Authenticated(AuthToken::from_raw(raw)?);
        Ok(())
    }

    /// Forget the current token
    pub fn reset_token(&mut self) {
        self.auth = AuthState::Unauthenticated;
    }

    fn require_token(&self) -> Result<AuthToken> {
        self.auth
            .token()
            .cloned()
            .ok_or_else(|| DominionError::api("not authenticated"))
    }

    async fn send_request(
        &self,
        transport: &dyn Transport,
        token: &AuthToken,
        endpoint: &str,
        extra: &[(String, String)],
    ) -> Result<Value> {
        let query = merge_query(&self.credentials.account_number, extra);
        let req = build_data_request(&self.endpoints.api_base, endpoint, query, token, &self.http);
        let response = transport
            .send(req)
            .await
            .map_err(|e| DominionError::api(format!("Request to {} failed: {}", endpoint, e)))?;
        interpret_response(&response)
    }

    /// Authenticated GET against a data endpoint
    pub async fn request(&mut self, endpoint: &str, extra: &[(String, String)]) -> Result<Value> {
        let token = self.require_token()?;
        let transport = self
            .ensure_session()
            .map_err(|e| DominionError::api(e.to_string()))?;
        self.send_request(transport.as_ref(), &token, endpoint, extra)
            .await
    }

    /// Bill forecast, including current-period usage
    pub async fn get_bill_forecast(&mut self) -> Result<Value> {
        self.request(BILL_FORECAST_ENDPOINT, &[]).await
    }

    /// Usage history, optionally bounded by dates
    pub async fn get_usage_history(
        &mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Value> {
        self.request(USAGE_HISTORY_ENDPOINT, &usage_history_params(start_date, end_date))
            .await
    }

    /// Billing history, newest bill first
    pub async fn get_bill_history(&mut self) -> Result<Value> {
        self.request(BILL_HISTORY_ENDPOINT, &[]).await
    }

    /// Fetch all three endpoints and normalize them into one reading.
    ///
    /// The sub-fetches run concurrently and fail independently: an API
    /// error only leaves that endpoint's fields unset. A 401 from any of
    /// them is returned so the caller can re-authenticate.
    pub async fn fetch_all(&mut self) -> Result<Reading> {
        let token = self.require_token()?;
        let transport = self
            .ensure_session()
            .map_err(|e| DominionError::api(e.to_string()))?;
        let logger = get_logger_with_context(
            LogContext::new("client")
                .with_cycle_id(uuid::Uuid::new_v4().to_string())
                .with_account(&self.credentials.account_number),
        );

        let this = &*self;
        let (forecast, usage, bills) = tokio::join!(
            this.send_request(transport.as_ref(), &token, BILL_FORECAST_ENDPOINT, &[]),
            this.send_request(transport.as_ref(), &token, USAGE_HISTORY_ENDPOINT, &[]),
            this.send_request(transport.as_ref(), &token, BILL_HISTORY_ENDPOINT, &[]),
        );

        for result in [&forecast, &usage, &bills] {
            if let Err(err) = result {
                if err.is_auth() {
                    logger.warn(&format!("Data request rejected: {}", err));
                }
            }
        }
        let forecast = surface_auth(forecast)?;
        let usage = surface_auth(usage)?;
        let bills = surface_auth(bills)?;

        let mut reading = Reading::default();

        match forecast {
            Ok(body) => {
                let data = Envelope::from_body(&body).data;
                apply_forecast(
                    &mut reading,
                    &BillForecast::from_data(&data),
                    self.clock.today(),
                    &logger,
                );
            }
            Err(err) => logger.error(&format!("Error fetching bill forecast: {}", err)),
        }

        match usage {
            Ok(body) => {
                let data = Envelope::from_body(&body).data;
                apply_usage_history(&mut reading, &UsageHistory::from_data(&data), &logger);
            }
            Err(err) => logger.debug(&format!("Error fetching usage history: {}", err)),
        }

        match bills {
            Ok(body) => {
                let data = Envelope::from_body(&body).data;
                apply_bill_history(&mut reading, &BillHistory::from_data(&data));
            }
            Err(err) => logger.debug(&format!("Error fetching bill history: {}", err)),
        }

        logger.debug(&format!(
            "Fetched reading: consumption={:?} kWh, return={:?} kWh, bill={:?}",
            reading.grid_consumption, reading.grid_return, reading.current_bill
        ));
        Ok(reading)
    }

    /// Authenticate and make one lightweight read.
    ///
    /// Only an auth failure invalidates the credentials; a data error after a
    /// successful login still counts as valid.
    pub async fn validate_credentials(&mut self) -> bool {
        if let Err(err) = self.authenticate().await {
            self.logger.warn(&format!("Credential validation failed: {}", err));
            return !err.is_auth();
        }
        match self.get_bill_forecast().await {
            Ok(_) => true,
            Err(err) if err.is_auth() => {
                self.logger.warn(&format!("Token rejected during validation: {}", err));
                false
            }
            Err(err) => {
                self.logger
                    .debug(&format!("Validation read failed after login: {}", err));
                true
            }
        }
    }

    /// Release the session if the client created it; a caller-supplied
    /// session is left open and kept
    pub async fn close(&mut self) {
        if self.session.as_ref().is_some_and(Session::is_owned) {
            if let Some(session) = self.session.take() {
                session.close().await;
                self.logger.debug("Closed owned HTTP session");
            }
        }
    }
}

/// Optional `startDate`/`endDate` filters in `YYYY-MM-DD`
pub fn usage_history_params(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(start) = start_date {
        params.push(("startDate".to_string(), start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = end_date {
        params.push(("endDate".to_string(), end.format("%Y-%m-%d").to_string()));
    }
    params
}

// Auth errors escape fetch_all; every other outcome stays with its endpoint
fn surface_auth(result: Result<Value>) -> Result<Result<Value>> {
    match result {
        Err(err) if err.is_auth() => Err(err),
        other => Ok(other),
    }
}
