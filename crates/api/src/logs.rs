//! Run log retrieval.
//!
//! Logs are keyed by run id only; both engine generations write to the same
//! log transport, so the log source is not mode-aware.

use std::env;

use async_trait::async_trait;
use flowpanel_types::RunLogEntry;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use crate::PanelClient;
use crate::sources::{SourceError, encode_segment, send_for_json};

/// Environment variable naming the log transport to query.
pub const LOG_TRANSPORT_ENV: &str = "FLOWPANEL_LOG_TRANSPORT";

/// Fetches the log lines recorded for a run.
#[async_trait]
pub trait RunLogSource: Send + Sync {
    async fn fetch_run_logs(&self, run_id: &str) -> Result<Vec<RunLogEntry>, SourceError>;
}

/// Older servers answer with a bare array, newer ones with a page object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RunLogsPayload {
    List(Vec<RunLogEntry>),
    Page {
        #[serde(default)]
        logs: Vec<RunLogEntry>,
    },
}

impl RunLogsPayload {
    fn into_entries(self) -> Vec<RunLogEntry> {
        match self {
            Self::List(entries) | Self::Page { logs: entries } => entries,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRunLogSource {
    client: PanelClient,
    transport_id: Option<String>,
}

impl HttpRunLogSource {
    pub fn new(client: PanelClient, transport_id: Option<String>) -> Self {
        Self {
            client,
            transport_id: transport_id.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Reads the transport id from `FLOWPANEL_LOG_TRANSPORT`.
    pub fn from_env(client: PanelClient) -> Self {
        Self::new(client, env::var(LOG_TRANSPORT_ENV).ok())
    }

    pub fn transport_id(&self) -> Option<&str> {
        self.transport_id.as_deref()
    }
}

#[async_trait]
impl RunLogSource for HttpRunLogSource {
    #[instrument(skip(self))]
    async fn fetch_run_logs(&self, run_id: &str) -> Result<Vec<RunLogEntry>, SourceError> {
        let request = self
            .client
            .request(Method::GET, &format!("/api/logs/{}", encode_segment(run_id)))
            .query(&[("transportId", self.transport_id.as_deref().unwrap_or_default())]);
        let payload: RunLogsPayload = send_for_json(request).await?;
        Ok(payload.into_entries())
    }
}
