//! HTTP transport seam
//!
//! Requests and responses are plain data so the login chain and the data
//! client can be driven by canned responses. [`ReqwestTransport`] is the
//! production implementation.

use crate::config::HttpConfig;
use crate::error::{DominionError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body variants used by the provider endpoints
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    /// `application/json`
    Json(serde_json::Value),
}

/// An HTTP request described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// First header value with the given name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First query value with the given key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Executes plain-data requests against the network
#[async_trait]
pub trait Transport: Send + Sync {
    /// Only transport-level failures are errors; any HTTP status is a response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Release pooled resources; only called for sessions the client owns
    async fn close(&self) {}
}

/// reqwest-backed transport with a cookie store
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client, e.g. one shared by the host
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Json(value) => builder.json(&value),
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// The client's transport handle and who owns it
#[derive(Clone)]
pub enum Session {
    /// Supplied by the caller; never closed by the client
    Borrowed(Arc<dyn Transport>),
    /// Created by the client; closed on teardown
    Owned(Arc<dyn Transport>),
}

impl Session {
    pub fn borrowed(transport: Arc<dyn Transport>) -> Self {
        Session::Borrowed(transport)
    }

    pub fn owned(transport: Arc<dyn Transport>) -> Self {
        Session::Owned(transport)
    }

    /// Build a self-owned reqwest session
    pub fn create(config: &HttpConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)
            .map_err(|e| DominionError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Session::Owned(Arc::new(transport)))
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Session::Owned(_))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        match self {
            Session::Borrowed(t) | Session::Owned(t) => t,
        }
    }

    /// Close the transport if owned; borrowed sessions are left untouched
    pub async fn close(self) {
        if let Session::Owned(transport) = self {
            transport.close().await;
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::Borrowed(_) => f.write_str("Session::Borrowed"),
            Session::Owned(_) => f.write_str("Session::Owned"),
        }
    }
}
