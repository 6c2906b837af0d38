use crate::error::{DominionError, Result};

const BEARER_SCHEME: &str = "Bearer";
const BEARER_PREFIX: &str = "Bearer ";

/// Bearer credential injected into the `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Accepts `abc` or `Bearer abc`; both store `Bearer abc`
    pub fn from_raw(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        // The scheme alone, or followed only by whitespace, carries no token
        let value = match trimmed.strip_prefix(BEARER_SCHEME) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
            _ => trimmed,
        };
        if value.is_empty() {
            return Err(DominionError::auth("token is empty"));
        }
        Ok(Self(format!("{}{}", BEARER_PREFIX, value)))
    }

    /// Full header value, including the `Bearer ` prefix
    pub fn as_header(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(Bearer <redacted>)")
    }
}

/// Token state held by the client. Expiry is not tracked: a 401 on a later
/// request surfaces as an auth error and the state is left as is until the
/// caller authenticates again or resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(AuthToken),
}

impl AuthState {
    pub fn token(&self) -> Option<&AuthToken> {
        match self {
            AuthState::Authenticated(token) => Some(token),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}
