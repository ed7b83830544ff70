//! Workflow identity and definition types shared by the API client, the TUI,
//! and the CLI.
//!
//! A workflow is always addressed by the pair `(id, mode)`. The same id under
//! the legacy and the current engine names two unrelated workflows, so
//! [`WorkflowRef`] compares both fields and nothing here converts one mode into
//! the other.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Engine generation serving a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    /// Older engine with its own fetch and trigger endpoints.
    Legacy,
    /// Current engine.
    #[default]
    Current,
}

impl WorkflowMode {
    /// Maps the `isLegacy` style flag used by callers onto a mode.
    pub fn from_legacy_flag(is_legacy: bool) -> Self {
        if is_legacy { Self::Legacy } else { Self::Current }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for WorkflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a workflow: its id together with the engine generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowRef {
    pub id: String,
    pub mode: WorkflowMode,
}

impl WorkflowRef {
    pub fn new(id: impl Into<String>, mode: WorkflowMode) -> Self {
        Self { id: id.into(), mode }
    }

    pub fn current(id: impl Into<String>) -> Self {
        Self::new(id, WorkflowMode::Current)
    }

    pub fn legacy(id: impl Into<String>) -> Self {
        Self::new(id, WorkflowMode::Legacy)
    }

    /// Returns `true` when the id is blank and no definition can exist for it.
    pub fn is_blank(&self) -> bool {
        self.id.trim().is_empty()
    }
}

impl fmt::Display for WorkflowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.mode)
    }
}

/// Descriptor for a single workflow step as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStepDescriptor {
    /// Step identifier; usually equal to the map key.
    #[serde(default)]
    pub id: String,
    /// Optional copy surfaced next to the step.
    #[serde(default)]
    pub description: Option<String>,
    /// Input schema, when the engine exposes one.
    #[serde(default)]
    pub input_schema: Option<JsonValue>,
    /// Output schema, when the engine exposes one.
    #[serde(default)]
    pub output_schema: Option<JsonValue>,
}

/// Workflow definition normalized from either engine generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Steps keyed by step key. Keys are unique; order follows the payload.
    #[serde(default)]
    pub steps: IndexMap<String, WorkflowStepDescriptor>,
}

impl WorkflowDefinition {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Reference to a run started by a successful trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunHandle {
    #[serde(rename = "runId")]
    pub run_id: String,
}

impl RunHandle {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self { run_id: run_id.into() }
    }
}

/// A log line recorded for a workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default, alias = "message")]
    pub msg: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, rename = "runId")]
    pub run_id: Option<String>,
}

/// Tab shown in the panel body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewSelection {
    #[default]
    Run,
    Endpoints,
    Logs,
}

impl ViewSelection {
    pub const ALL: [ViewSelection; 3] = [ViewSelection::Run, ViewSelection::Endpoints, ViewSelection::Logs];

    pub fn label(self) -> &'static str {
        match self {
            Self::Run => "Run",
            Self::Endpoints => "Endpoints",
            Self::Logs => "Log Drains",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Run => 0,
            Self::Endpoints => 1,
            Self::Logs => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// An HTTP endpoint a developer can call for a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowEndpoint {
    pub method: &'static str,
    pub path: String,
    pub description: &'static str,
}

/// Formats a step count for display, e.g. `1 step` or `3 steps`.
pub fn step_count_label(count: usize) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} step{suffix}")
}
