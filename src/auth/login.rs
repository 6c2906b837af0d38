//! Multi-strategy login chain
//!
//! 1. GET the common-login page (establishes cookies; must return 200)
//! 2. Password-grant token exchange; `access_token` wins
//! 3. Session-token login; `sessionToken` is used directly as the bearer
//!
//! Step 3 is a best-effort approximation: a full OAuth flow would trade the
//! session token for a bearer token through a separate exchange call, which
//! the provider does not document. It is kept as a fallback, not a verified
//! contract.

use super::token::AuthToken;
use crate::config::Credentials;
use crate::error::{DominionError, Result};
use crate::http::{HttpRequest, HttpResponse, RequestBody, Transport};
use crate::logging::StructuredLogger;
use serde_json::json;

const LOGIN_PAGE_PATH: &str = "/CommonLogin";
const TOKEN_PATH: &str = "/oauth2/token";
const AUTHN_PATH: &str = "/api/v1/authn";
const SELECTED_APP: &str = "Electric";
const CLIENT_ID: &str = "CustomerPortal";
const GRANT_TYPE: &str = "password";
const SCOPE: &str = "openid profile email";

/// Where the login chain talks to
#[derive(Debug, Clone)]
pub struct LoginEndpoints {
    pub login_base: String,
    pub user_agent: String,
}

/// Ordered steps of the login chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    LoginPage,
    PasswordGrant,
    SessionToken,
}

impl LoginStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStep::LoginPage => "login_page",
            LoginStep::PasswordGrant => "password_grant",
            LoginStep::SessionToken => "session_token",
        }
    }
}

/// Result of feeding one step's response into the machine
#[derive(Debug)]
pub enum StepOutcome {
    Next(LoginStep),
    Done(AuthToken),
    Failed(DominionError),
}

/// Build the plain request for a step
pub fn build_request(
    step: LoginStep,
    credentials: &Credentials,
    endpoints: &LoginEndpoints,
) -> HttpRequest {
    let base = endpoints.login_base.trim_end_matches('/');
    match step {
        LoginStep::LoginPage => HttpRequest::get(format!("{}{}", base, LOGIN_PAGE_PATH))
            .with_query(vec![(
                "SelectedAppName".to_string(),
                SELECTED_APP.to_string(),
            )])
            .with_header("User-Agent", endpoints.user_agent.clone()),
        LoginStep::PasswordGrant => HttpRequest::post(
            format!("{}{}", base, TOKEN_PATH),
            RequestBody::Form(vec![
                ("username".to_string(), credentials.username.clone()),
                ("password".to_string(), credentials.password.clone()),
                ("client_id".to_string(), CLIENT_ID.to_string()),
                ("grant_type".to_string(), GRANT_TYPE.to_string()),
                ("scope".to_string(), SCOPE.to_string()),
            ]),
        )
        .with_header("Accept", "application/json")
        .with_header("User-Agent", endpoints.user_agent.clone()),
        LoginStep::SessionToken => HttpRequest::post(
            format!("{}{}", base, AUTHN_PATH),
            RequestBody::Json(json!({
                "Email": credentials.username,
                "Password": credentials.password,
            })),
        )
        .with_header("Accept", "application/json")
        .with_header("User-Agent", endpoints.user_agent.clone()),
    }
}

/// Pure transition function of the login chain
pub fn advance(step: LoginStep, response: &HttpResponse) -> StepOutcome {
    match step {
        LoginStep::LoginPage => {
            if response.status == 200 {
                StepOutcome::Next(LoginStep::PasswordGrant)
            } else {
                StepOutcome::Failed(DominionError::auth(format!(
                    "Failed to access login page: {}",
                    response.status
                )))
            }
        }
        LoginStep::PasswordGrant => match token_from(response, "access_token") {
            Some(token) => StepOutcome::Done(token),
            None => StepOutcome::Next(LoginStep::SessionToken),
        },
        LoginStep::SessionToken => match token_from(response, "sessionToken") {
            Some(token) => StepOutcome::Done(token),
            None => StepOutcome::Failed(DominionError::auth(
                "invalid credentials or unreachable",
            )),
        },
    }
}

// Non-200, non-JSON and token-less bodies all mean "no token from this step"
fn token_from(response: &HttpResponse, field: &str) -> Option<AuthToken> {
    if response.status != 200 {
        return None;
    }
    let body = response.json().ok()?;
    let raw = body.get(field)?.as_str()?;
    AuthToken::from_raw(raw).ok()
}

/// Drive the chain over a transport until a token or a failure
pub async fn run_login(
    transport: &dyn Transport,
    credentials: &Credentials,
    endpoints: &LoginEndpoints,
    logger: &StructuredLogger,
) -> Result<AuthToken> {
    let mut step = LoginStep::LoginPage;
    loop {
        let request = build_request(step, credentials, endpoints);
        let response = transport.send(request).await.map_err(|e| {
            DominionError::auth(format!("Network error during authentication: {}", e))
        })?;
        logger.debug(&format!(
            "Login step {} returned HTTP {}",
            step.as_str(),
            response.status
        ));

        match advance(step, &response) {
            StepOutcome::Next(next) => step = next,
            StepOutcome::Done(token) => {
                logger.info(&format!(
                    "Authenticated with Dominion Energy via {}",
                    step.as_str()
                ));
                return Ok(token);
            }
            StepOutcome::Failed(err) => {
                logger.warn(&format!("Login failed at {}: {}", step.as_str(), err));
                return Err(err);
            }
        }
    }
}
