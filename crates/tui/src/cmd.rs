//! # Command Execution Layer
//!
//! This module translates application effects ([`Effect`]) into imperative
//! commands ([`Cmd`]) and executes them. It is the boundary where the pure
//! state updates of [`App`](crate::app::App) meet the outside world:
//! - fetching definitions and triggering runs through the workflow source
//!   selected by the request's mode
//! - fetching run logs
//! - writing to the system clipboard
//!
//! Network commands are spawned as tokio tasks that resolve to the [`Msg`]
//! carrying their result and request tag. The runtime polls them and feeds
//! the messages back into the app, which decides whether they are still
//! current.

use std::sync::Arc;

use flowpanel_api::{RunLogSource, WorkflowSources};
use flowpanel_types::{Effect, Msg, RequestTag};
use serde_json::Value;
use tokio::task::{JoinHandle, spawn};
use tracing::debug;

/// Side-effectful commands executed outside of pure state updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Write text into the system clipboard.
    ClipboardSet(String),
    /// Fetch a definition from the tagged workflow's source.
    FetchWorkflow(RequestTag),
    /// Create and start a run through the tagged workflow's source.
    TriggerWorkflow { tag: RequestTag, input: Option<Value> },
    /// Fetch the log lines of a run.
    FetchRunLogs { run_id: String, request_id: u64 },
}

/// Collaborators the command layer talks to.
#[derive(Clone)]
pub struct CommandContext {
    pub sources: WorkflowSources,
    pub run_logs: Arc<dyn RunLogSource>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext").field("sources", &self.sources).finish_non_exhaustive()
    }
}

/// Results of one batch: messages available right away and tasks to poll.
#[derive(Debug, Default)]
pub struct CommandBatch {
    pub immediate: Vec<Msg>,
    pub pending: Vec<JoinHandle<Msg>>,
}

/// Convert effects into commands. [`Effect::Quit`] is handled by the runtime
/// and produces no command.
pub fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::FetchWorkflow(tag) => Some(Cmd::FetchWorkflow(tag)),
            Effect::TriggerWorkflow { tag, input } => Some(Cmd::TriggerWorkflow { tag, input }),
            Effect::FetchRunLogs { run_id, request_id } => Some(Cmd::FetchRunLogs { run_id, request_id }),
            Effect::CopyToClipboardRequested(text) => Some(Cmd::ClipboardSet(text)),
            Effect::Quit => None,
        })
        .collect()
}

/// Execute commands, spawning network work onto the tokio runtime.
pub fn run_cmds(context: &CommandContext, commands: Vec<Cmd>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in commands {
        match command {
            Cmd::ClipboardSet(text) => batch.immediate.push(execute_clipboard_set(&text)),
            Cmd::FetchWorkflow(tag) => batch.pending.push(spawn_fetch_workflow(context, tag)),
            Cmd::TriggerWorkflow { tag, input } => batch.pending.push(spawn_trigger_workflow(context, tag, input)),
            Cmd::FetchRunLogs { run_id, request_id } => batch.pending.push(spawn_fetch_run_logs(context, run_id, request_id)),
        }
    }
    batch
}

/// Translate and execute effects in one step.
pub fn run_from_effects(context: &CommandContext, effects: Vec<Effect>) -> CommandBatch {
    run_cmds(context, from_effects(effects))
}

fn execute_clipboard_set(text: &str) -> Msg {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => Msg::Notice(format!("Copied {text}")),
        Err(error) => Msg::Notice(format!("Clipboard error: {error}")),
    }
}

fn spawn_fetch_workflow(context: &CommandContext, tag: RequestTag) -> JoinHandle<Msg> {
    let source = context.sources.for_mode(tag.workflow.mode);
    spawn(async move {
        debug!(workflow = %tag.workflow, request_id = tag.request_id, "fetching definition");
        let result = source
            .fetch_definition(&tag.workflow.id)
            .await
            .map_err(|error| error.to_string());
        Msg::WorkflowLoaded { tag, result }
    })
}

fn spawn_trigger_workflow(context: &CommandContext, tag: RequestTag, input: Option<Value>) -> JoinHandle<Msg> {
    let source = context.sources.for_mode(tag.workflow.mode);
    spawn(async move {
        debug!(workflow = %tag.workflow, request_id = tag.request_id, "triggering workflow");
        let result = source.trigger(&tag.workflow.id, input).await.map_err(|error| error.to_string());
        Msg::TriggerCompleted { tag, result }
    })
}

fn spawn_fetch_run_logs(context: &CommandContext, run_id: String, request_id: u64) -> JoinHandle<Msg> {
    let run_logs = Arc::clone(&context.run_logs);
    spawn(async move {
        let result = run_logs.fetch_run_logs(&run_id).await.map_err(|error| error.to_string());
        Msg::RunLogsLoaded {
            run_id,
            request_id,
            result,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use flowpanel_api::{SourceError, WorkflowSource};
    use flowpanel_types::{RunHandle, RunLogEntry, WorkflowDefinition, WorkflowMode, WorkflowRef};

    #[derive(Debug, Default)]
    struct RecordingSource {
        mode: Option<WorkflowMode>,
        calls: Mutex<Vec<String>>,
        fail_trigger: bool,
    }

    impl RecordingSource {
        fn new(mode: WorkflowMode) -> Self {
            Self {
                mode: Some(mode),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl WorkflowSource for RecordingSource {
        fn mode(&self) -> WorkflowMode {
            self.mode.unwrap_or_default()
        }

        async fn fetch_definition(&self, workflow_id: &str) -> Result<WorkflowDefinition, SourceError> {
            self.calls.lock().expect("calls lock").push(format!("fetch:{workflow_id}"));
            Ok(WorkflowDefinition {
                name: format!("{} {workflow_id}", self.mode()),
                ..WorkflowDefinition::default()
            })
        }

        async fn trigger(&self, workflow_id: &str, _input: Option<Value>) -> Result<RunHandle, SourceError> {
            self.calls.lock().expect("calls lock").push(format!("trigger:{workflow_id}"));
            if self.fail_trigger {
                return Err(SourceError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(RunHandle::new(format!("{}-run", self.mode())))
        }
    }

    struct StaticLogs;

    #[async_trait]
    impl RunLogSource for StaticLogs {
        async fn fetch_run_logs(&self, run_id: &str) -> Result<Vec<RunLogEntry>, SourceError> {
            Ok(vec![RunLogEntry {
                msg: format!("hello from {run_id}"),
                ..RunLogEntry::default()
            }])
        }
    }

    fn context(legacy: Arc<RecordingSource>, current: Arc<RecordingSource>) -> CommandContext {
        CommandContext {
            sources: WorkflowSources::new(legacy, current),
            run_logs: Arc::new(StaticLogs),
        }
    }

    async fn single_message(batch: CommandBatch) -> Msg {
        assert!(batch.immediate.is_empty());
        let mut pending = batch.pending;
        assert_eq!(pending.len(), 1);
        pending.remove(0).await.expect("task joined")
    }

    #[test]
    fn quit_produces_no_command() {
        let tag = RequestTag::new(WorkflowRef::current("wf-1"), 1);
        let commands = from_effects(vec![Effect::Quit, Effect::FetchWorkflow(tag.clone())]);
        assert_eq!(commands, vec![Cmd::FetchWorkflow(tag)]);
    }

    #[tokio::test]
    async fn legacy_fetch_only_calls_legacy_source() {
        let legacy = Arc::new(RecordingSource::new(WorkflowMode::Legacy));
        let current = Arc::new(RecordingSource::new(WorkflowMode::Current));
        let context = context(legacy.clone(), current.clone());
        let tag = RequestTag::new(WorkflowRef::legacy("wf-1"), 3);

        let msg = single_message(run_from_effects(&context, vec![Effect::FetchWorkflow(tag.clone())])).await;
        match msg {
            Msg::WorkflowLoaded { tag: loaded, result } => {
                assert_eq!(loaded, tag);
                assert_eq!(result.expect("definition").name, "legacy wf-1");
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert_eq!(legacy.calls(), vec!["fetch:wf-1".to_string()]);
        assert!(current.calls().is_empty());
    }

    #[tokio::test]
    async fn current_trigger_only_calls_current_source() {
        let legacy = Arc::new(RecordingSource::new(WorkflowMode::Legacy));
        let current = Arc::new(RecordingSource::new(WorkflowMode::Current));
        let context = context(legacy.clone(), current.clone());
        let tag = RequestTag::new(WorkflowRef::current("wf-1"), 1);

        let msg = single_message(run_from_effects(&context, vec![Effect::TriggerWorkflow {
            tag: tag.clone(),
            input: None,
        }]))
        .await;
        assert!(matches!(msg, Msg::TriggerCompleted { result: Ok(ref handle), .. } if handle.run_id == "current-run"));
        assert_eq!(current.calls(), vec!["trigger:wf-1".to_string()]);
        assert!(legacy.calls().is_empty());
    }

    #[tokio::test]
    async fn trigger_failure_is_reported_as_message() {
        let legacy = Arc::new(RecordingSource {
            fail_trigger: true,
            ..RecordingSource::new(WorkflowMode::Legacy)
        });
        let current = Arc::new(RecordingSource::new(WorkflowMode::Current));
        let context = context(legacy, current);
        let tag = RequestTag::new(WorkflowRef::legacy("wf-1"), 1);

        let msg = single_message(run_from_effects(&context, vec![Effect::TriggerWorkflow { tag, input: None }])).await;
        assert!(matches!(msg, Msg::TriggerCompleted { result: Err(ref error), .. } if error == "HTTP 500: boom"));
    }

    #[tokio::test]
    async fn run_logs_carry_run_and_request_id() {
        let context = context(
            Arc::new(RecordingSource::new(WorkflowMode::Legacy)),
            Arc::new(RecordingSource::new(WorkflowMode::Current)),
        );
        let msg = single_message(run_from_effects(&context, vec![Effect::FetchRunLogs {
            run_id: "run-42".to_string(),
            request_id: 4,
        }]))
        .await;
        match msg {
            Msg::RunLogsLoaded {
                run_id,
                request_id,
                result,
            } => {
                assert_eq!(run_id, "run-42");
                assert_eq!(request_id, 4);
                assert_eq!(result.expect("logs")[0].msg, "hello from run-42");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
