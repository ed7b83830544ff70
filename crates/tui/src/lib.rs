//! # Flowpanel TUI Library
//!
//! Terminal panel for a single workflow on the workflow server. The panel is
//! bound to one `(id, mode)` pair and shows:
//!
//! - a header with the workflow name and step count
//! - a **Run** tab that triggers the workflow with optional JSON input
//! - an **Endpoints** tab listing the HTTP endpoints for the workflow
//! - a **Log Drains** tab scoped to the run the panel last started
//!
//! ## Architecture
//!
//! Components translate input into [`Effect`](flowpanel_types::Effect)s,
//! the command layer runs them against the source selected by the workflow
//! mode, and completions come back as tagged
//! [`Msg`](flowpanel_types::Msg)s that the app applies only while still
//! current.

mod app;
mod cmd;
pub mod log_persistence;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use flowpanel_api::{RunLogSource, WorkflowSources};
use flowpanel_types::WorkflowRef;

pub use cmd::CommandContext;

/// Runs the panel until the user quits.
///
/// # Errors
///
/// Returns an error when the terminal cannot be set up, drawn to, or
/// restored.
pub async fn run(
    workflow: WorkflowRef,
    base_url: String,
    sources: WorkflowSources,
    run_logs: Arc<dyn RunLogSource>,
) -> Result<()> {
    ui::runtime::run_app(workflow, base_url, CommandContext { sources, run_logs }).await
}
