//! # Dominion Energy - customer API client
//!
//! An async client for the Dominion Energy customer portal. It signs in
//! through the provider's login chain, polls the billing and usage endpoints
//! and normalizes the responses into a flat [`Reading`] that a
//! home-automation host can publish as sensors.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration, environment overrides and validation
//! - `logging`: Structured logging and tracing
//! - `http`: Transport seam and session ownership
//! - `auth`: Login chain state machine and bearer tokens
//! - `client`: Authenticated data requests and the per-poll fetch
//! - `payload`: Tolerant decoding of provider JSON
//! - `reading`: Normalized reading and the derivation rules
//! - `sensors`: Sensor catalog built on top of a reading
//! - `clock`: Source of "today" for daily cost

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod payload;
pub mod reading;
pub mod sensors;

// Re-export commonly used types
pub use auth::AuthToken;
pub use client::DominionClient;
pub use config::{Config, Credentials};
pub use error::{DominionError, Result};
pub use http::{Session, Transport};
pub use reading::Reading;
