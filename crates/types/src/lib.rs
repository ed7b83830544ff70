//! Shared message, effect, and workflow types for Flowpanel.
//!
//! The TUI follows a message/effect loop: components translate input into
//! [`Effect`]s, the command layer runs them against the workflow server, and
//! completions come back as [`Msg`]s that carry the [`RequestTag`] they were
//! issued with.

pub mod workflow;

use serde_json::Value;

pub use workflow::{
    RunHandle, RunLogEntry, ViewSelection, WorkflowDefinition, WorkflowEndpoint, WorkflowMode, WorkflowRef,
    WorkflowStepDescriptor, step_count_label,
};

/// Identity attached to an outstanding request.
///
/// A completion is applied only while its tag still matches the state that
/// issued it. `request_id` separates two requests for the same workflow
/// (for example a manual refresh).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub workflow: WorkflowRef,
    pub request_id: u64,
}

impl RequestTag {
    pub fn new(workflow: WorkflowRef, request_id: u64) -> Self {
        Self { workflow, request_id }
    }
}

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbbers)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Bind the panel to another workflow
    OpenWorkflow(WorkflowRef),
    /// A definition fetch settled
    WorkflowLoaded {
        tag: RequestTag,
        result: Result<WorkflowDefinition, String>,
    },
    /// A trigger settled
    TriggerCompleted {
        tag: RequestTag,
        result: Result<RunHandle, String>,
    },
    /// A run log fetch settled
    RunLogsLoaded {
        run_id: String,
        request_id: u64,
        result: Result<Vec<RunLogEntry>, String>,
    },
    /// Short status line shown in the footer
    Notice(String),
}

/// Side effects requested by state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the definition for the tagged workflow from its mode's source
    FetchWorkflow(RequestTag),
    /// Trigger the tagged workflow through its mode's source
    TriggerWorkflow { tag: RequestTag, input: Option<Value> },
    /// Fetch log lines for a run
    FetchRunLogs { run_id: String, request_id: u64 },
    /// Copy text to the system clipboard
    CopyToClipboardRequested(String),
    /// Leave the TUI
    Quit,
}
