//! State for the "Log Drains" tab.
//!
//! The view is scoped to the run published by the run coordinator. It holds a
//! read-only subscription to that cell; whenever the published run changes the
//! entries are cleared and a fetch for the new run is requested. Responses for
//! any other run, or for a superseded request, are discarded.

use flowpanel_types::{Effect, RunHandle, RunLogEntry};
use flowpanel_util::redact_sensitive;
use tracing::debug;

use crate::ui::components::workflow_info::RunReceiver;

/// Copy shown when no run is held.
pub const NO_RUN_MESSAGE: &str = "No run yet";

#[derive(Debug)]
pub struct LogsState {
    run_receiver: RunReceiver,
    run: Option<RunHandle>,
    entries: Vec<RunLogEntry>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<u64>,
    next_request_id: u64,
    /// Index of the first visible line.
    pub offset: usize,
}

impl LogsState {
    pub fn new(run_receiver: RunReceiver) -> Self {
        Self {
            run_receiver,
            run: None,
            entries: Vec::new(),
            loading: false,
            error: None,
            in_flight: None,
            next_request_id: 0,
            offset: 0,
        }
    }

    /// Pick up a newly published run. Returns the fetch for it, if any.
    pub fn sync_run(&mut self) -> Vec<Effect> {
        if !matches!(self.run_receiver.has_changed(), Ok(true)) {
            return Vec::new();
        }
        let published = self.run_receiver.borrow_and_update().clone();
        if published == self.run {
            return Vec::new();
        }

        self.run = published;
        self.entries.clear();
        self.error = None;
        self.offset = 0;
        match self.run.as_ref().map(|run| run.run_id.clone()) {
            Some(run_id) => self.request(run_id),
            None => {
                self.loading = false;
                self.in_flight = None;
                Vec::new()
            }
        }
    }

    /// Re-fetch the logs of the scoped run. Skipped while a fetch is
    /// outstanding.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.in_flight.is_some() {
            return Vec::new();
        }
        match self.run.as_ref().map(|run| run.run_id.clone()) {
            Some(run_id) => self.request(run_id),
            None => Vec::new(),
        }
    }

    fn request(&mut self, run_id: String) -> Vec<Effect> {
        self.next_request_id += 1;
        self.in_flight = Some(self.next_request_id);
        self.loading = true;
        vec![Effect::FetchRunLogs {
            run_id,
            request_id: self.next_request_id,
        }]
    }

    /// Apply a settled fetch. Returns `false` when it belonged to another run
    /// or a superseded request.
    pub fn apply(&mut self, run_id: &str, request_id: u64, result: Result<Vec<RunLogEntry>, String>) -> bool {
        let scoped = self.run.as_ref().is_some_and(|run| run.run_id == run_id);
        if !scoped || self.in_flight != Some(request_id) {
            debug!(run_id, request_id, "dropping stale run log response");
            return false;
        }

        self.in_flight = None;
        self.loading = false;
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        true
    }

    pub fn run(&self) -> Option<&RunHandle> {
        self.run.as_ref()
    }

    pub fn entries(&self) -> &[RunLogEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Display lines with secrets redacted.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(format_entry).collect()
    }

    pub fn scroll_down(&mut self) {
        if self.offset + 1 < self.entries.len() {
            self.offset += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }
}

fn format_entry(entry: &RunLogEntry) -> String {
    let mut line = String::new();
    if let Some(time) = entry.time.as_deref() {
        line.push_str(time);
        line.push(' ');
    }
    if let Some(level) = entry.level.as_deref() {
        line.push_str(&format!("[{}] ", level.to_ascii_uppercase()));
    }
    line.push_str(&entry.msg);
    redact_sensitive(&line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::workflow_info::RunCoordinator;
    use flowpanel_types::WorkflowRef;

    fn started(coordinator: &mut RunCoordinator, run_id: &str) {
        let effects = coordinator.trigger(None).expect("trigger");
        let Some(Effect::TriggerWorkflow { tag, .. }) = effects.into_iter().next() else {
            panic!("expected trigger effect");
        };
        coordinator.apply_trigger(&tag, Ok(RunHandle::new(run_id)));
    }

    fn entry(msg: &str) -> RunLogEntry {
        RunLogEntry {
            msg: msg.to_string(),
            ..RunLogEntry::default()
        }
    }

    #[test]
    fn shows_empty_state_without_run() {
        let coordinator = RunCoordinator::new();
        let mut logs = LogsState::new(coordinator.subscribe());
        assert!(logs.sync_run().is_empty());
        assert!(logs.run().is_none());
        assert!(logs.entries().is_empty());
    }

    #[test]
    fn new_run_triggers_scoped_fetch() {
        let mut coordinator = RunCoordinator::new();
        coordinator.bind_workflow(WorkflowRef::current("wf-1"));
        let mut logs = LogsState::new(coordinator.subscribe());

        started(&mut coordinator, "run-42");
        let effects = logs.sync_run();
        assert_eq!(effects, vec![Effect::FetchRunLogs {
            run_id: "run-42".to_string(),
            request_id: 1,
        }]);
        assert_eq!(logs.run(), Some(&RunHandle::new("run-42")));
        assert!(logs.is_loading());
        assert!(logs.sync_run().is_empty());
    }

    #[test]
    fn responses_for_other_runs_are_dropped() {
        let mut coordinator = RunCoordinator::new();
        coordinator.bind_workflow(WorkflowRef::current("wf-1"));
        let mut logs = LogsState::new(coordinator.subscribe());

        started(&mut coordinator, "run-1");
        logs.sync_run();
        started(&mut coordinator, "run-2");
        logs.sync_run();

        assert!(!logs.apply("run-1", 1, Ok(vec![entry("old")])));
        assert!(logs.entries().is_empty());
        assert!(logs.apply("run-2", 2, Ok(vec![entry("new")])));
        assert_eq!(logs.lines(), vec!["new".to_string()]);
    }

    #[test]
    fn refresh_waits_for_outstanding_fetch() {
        let mut coordinator = RunCoordinator::new();
        coordinator.bind_workflow(WorkflowRef::current("wf-1"));
        let mut logs = LogsState::new(coordinator.subscribe());
        started(&mut coordinator, "run-1");
        logs.sync_run();

        assert!(logs.refresh().is_empty());
        assert!(logs.apply("run-1", 1, Ok(vec![entry("first")])));

        let refreshed = logs.refresh();
        assert_eq!(refreshed, vec![Effect::FetchRunLogs {
            run_id: "run-1".to_string(),
            request_id: 2,
        }]);
        assert!(!logs.apply("run-1", 1, Ok(vec![entry("stale")])));
        assert!(logs.apply("run-1", 2, Err("HTTP 502: bad gateway".to_string())));
        assert_eq!(logs.error(), Some("HTTP 502: bad gateway"));
        assert!(!logs.is_loading());
    }

    #[test]
    fn identity_change_returns_to_empty_state() {
        let mut coordinator = RunCoordinator::new();
        coordinator.bind_workflow(WorkflowRef::current("wf-1"));
        let mut logs = LogsState::new(coordinator.subscribe());
        started(&mut coordinator, "run-1");
        logs.sync_run();
        logs.apply("run-1", 1, Ok(vec![entry("hello")]));

        coordinator.bind_workflow(WorkflowRef::current("wf-2"));
        assert!(logs.sync_run().is_empty());
        assert!(logs.run().is_none());
        assert!(logs.entries().is_empty());
    }

    #[test]
    fn lines_are_formatted_and_redacted() {
        let coordinator = RunCoordinator::new();
        let mut logs = LogsState::new(coordinator.subscribe());
        logs.entries = vec![RunLogEntry {
            level: Some("info".to_string()),
            msg: "calling with Authorization: Bearer abc.def".to_string(),
            time: Some("2026-01-01T00:00:00Z".to_string()),
            run_id: None,
        }];
        let line = &logs.lines()[0];
        assert!(line.starts_with("2026-01-01T00:00:00Z [INFO] "));
        assert!(!line.contains("abc.def"));
        assert!(line.contains("[REDACTED]"));
    }
}
