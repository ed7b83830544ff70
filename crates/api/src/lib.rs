//! Workflow server client utilities.
//!
//! This crate provides a lightweight client for the workflow server that
//! hosts the legacy and current workflow engines. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Discovering the base URL and token from `FLOWPANEL_API_BASE` and
//!   `FLOWPANEL_API_TOKEN`
//! - Validating the base URL for safety
//! - Exposing each engine generation as a [`WorkflowSource`]
//!
//! The primary entry point is [`PanelClient`]. Wrap it with
//! [`WorkflowSources::from_client`] to obtain both sources.
//!
//! # Example
//!
//! ```ignore
//! use flowpanel_api::{PanelClient, WorkflowSources};
//! use flowpanel_types::WorkflowMode;
//!
//! async fn show() -> anyhow::Result<()> {
//!     let client = PanelClient::new_from_env()?;
//!     let sources = WorkflowSources::from_client(client);
//!     let definition = sources.for_mode(WorkflowMode::Current).fetch_definition("weather").await?;
//!     println!("{} has {} steps", definition.name, definition.step_count());
//!     Ok(())
//! }
//! ```

pub mod endpoints;
pub mod logs;
pub mod sources;

use std::env;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url, header};
use thiserror::Error;
use tracing::debug;

pub use endpoints::workflow_endpoints;
pub use logs::{HttpRunLogSource, LOG_TRANSPORT_ENV, RunLogSource};
pub use sources::{CurrentWorkflowSource, LegacyWorkflowSource, SourceError, WorkflowSource, WorkflowSources};

/// Environment variable holding the workflow server base URL.
pub const API_BASE_ENV: &str = "FLOWPANEL_API_BASE";
/// Environment variable holding an optional bearer token.
pub const API_TOKEN_ENV: &str = "FLOWPANEL_API_TOKEN";
/// Base URL used when nothing is configured; the local dev server.
pub const DEFAULT_API_BASE: &str = "http://localhost:4111";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Errors raised while building a [`PanelClient`].
#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("invalid FLOWPANEL_API_BASE URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("FLOWPANEL_API_BASE must include a host")]
    MissingHost,

    #[error("FLOWPANEL_API_BASE must use https for non-localhost hosts; got '{scheme}://'")]
    InsecureScheme { scheme: String },

    #[error("API token contains characters that are not valid in a header")]
    InvalidToken,

    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for workflow server access.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL.
pub struct PanelClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl PanelClient {
    /// Construct a [`PanelClient`] from `FLOWPANEL_API_BASE` and
    /// `FLOWPANEL_API_TOKEN`, falling back to [`DEFAULT_API_BASE`].
    pub fn new_from_env() -> Result<Self, ClientConfigError> {
        let base_url = env::var(API_BASE_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_token = env::var(API_TOKEN_ENV).ok().filter(|value| !value.trim().is_empty());
        Self::new(&base_url, api_token.as_deref())
    }

    /// Construct a client for an explicit base URL and optional bearer token.
    pub fn new(base_url: &str, api_token: Option<&str>) -> Result<Self, ClientConfigError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(api_token) = api_token {
            let authorization = header::HeaderValue::from_str(&format!("Bearer {}", api_token.trim()))
                .map_err(|_| ClientConfigError::InvalidToken)?;
            default_headers.insert(header::AUTHORIZATION, authorization);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("flowpanel/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Absolute URL for an API-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = self.url_for(path);
        debug!(%url, %method, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost`, `127.0.0.1`, `[::1]`: http or https
/// - otherwise: scheme must be https
fn validate_base_url(base: &str) -> Result<(), ClientConfigError> {
    let parsed_base_url = Url::parse(base).map_err(|error| ClientConfigError::InvalidBaseUrl {
        url: base.to_string(),
        reason: error.to_string(),
    })?;

    let host_name = parsed_base_url.host_str().ok_or(ClientConfigError::MissingHost)?;
    let scheme = parsed_base_url.scheme();

    let is_local = LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed));
    if is_local && matches!(scheme, "http" | "https") {
        return Ok(());
    }

    if scheme != "https" {
        return Err(ClientConfigError::InsecureScheme { scheme: scheme.to_string() });
    }

    Ok(())
}
