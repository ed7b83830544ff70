//! Trigger dispatch and ownership of the active run.
//!
//! The coordinator is the only writer of the run cell. It publishes the
//! active [`RunHandle`] through a `watch` channel; views subscribe and only
//! ever read. A successful trigger replaces the published run in a single
//! `send_replace`, so a reader sees either the old run or the new one.

use flowpanel_types::{Effect, RequestTag, RunHandle, ViewSelection, WorkflowRef};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Reader side of the run cell.
pub type RunReceiver = watch::Receiver<Option<RunHandle>>;

/// Coarse run slot state, for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NoRun,
    Triggering,
    HasRun,
}

#[derive(Debug)]
enum RunSlot {
    NoRun,
    /// A trigger is outstanding; `previous` stays the visible run until it settles.
    Triggering {
        previous: Option<RunHandle>,
        tag: RequestTag,
    },
    HasRun(RunHandle),
}

/// Reasons a trigger request is refused before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerRejected {
    #[error("No workflow selected")]
    NoWorkflow,
    #[error("A trigger is already in progress")]
    AlreadyTriggering,
}

#[derive(Debug)]
pub struct RunCoordinator {
    workflow: Option<WorkflowRef>,
    slot: RunSlot,
    run_sender: watch::Sender<Option<RunHandle>>,
    view: ViewSelection,
    last_error: Option<String>,
    next_request_id: u64,
}

impl Default for RunCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCoordinator {
    pub fn new() -> Self {
        let (run_sender, _) = watch::channel(None);
        Self {
            workflow: None,
            slot: RunSlot::NoRun,
            run_sender,
            view: ViewSelection::default(),
            last_error: None,
            next_request_id: 0,
        }
    }

    /// Read-only subscription to the active run.
    pub fn subscribe(&self) -> RunReceiver {
        self.run_sender.subscribe()
    }

    /// Bind to `workflow`. A different pair clears the held run; an
    /// outstanding trigger for the old pair is abandoned and its completion
    /// will be dropped. Returns `true` when the binding changed.
    pub fn bind_workflow(&mut self, workflow: WorkflowRef) -> bool {
        if self.workflow.as_ref() == Some(&workflow) {
            return false;
        }
        debug!(%workflow, "binding run coordinator");
        self.workflow = Some(workflow);
        self.slot = RunSlot::NoRun;
        self.last_error = None;
        self.run_sender.send_if_modified(|run| run.take().is_some());
        true
    }

    /// Start a run of the bound workflow.
    ///
    /// Only one trigger may be outstanding; a second request is rejected and
    /// dispatches nothing.
    pub fn trigger(&mut self, input: Option<Value>) -> Result<Vec<Effect>, TriggerRejected> {
        let workflow = match &self.workflow {
            Some(workflow) if !workflow.is_blank() => workflow.clone(),
            _ => return Err(TriggerRejected::NoWorkflow),
        };
        let previous = match std::mem::replace(&mut self.slot, RunSlot::NoRun) {
            RunSlot::NoRun => None,
            RunSlot::HasRun(handle) => Some(handle),
            triggering @ RunSlot::Triggering { .. } => {
                self.slot = triggering;
                return Err(TriggerRejected::AlreadyTriggering);
            }
        };

        self.next_request_id += 1;
        let tag = RequestTag::new(workflow, self.next_request_id);
        self.slot = RunSlot::Triggering {
            previous,
            tag: tag.clone(),
        };
        self.last_error = None;
        Ok(vec![Effect::TriggerWorkflow { tag, input }])
    }

    /// Apply a settled trigger. Returns `false` when the completion was stale.
    pub fn apply_trigger(&mut self, tag: &RequestTag, result: Result<RunHandle, String>) -> bool {
        let is_current = matches!(&self.slot, RunSlot::Triggering { tag: pending, .. } if pending == tag);
        if !is_current {
            debug!(workflow = %tag.workflow, request_id = tag.request_id, "dropping stale trigger response");
            return false;
        }
        let RunSlot::Triggering { previous, .. } = std::mem::replace(&mut self.slot, RunSlot::NoRun) else {
            return false;
        };

        match result {
            Ok(handle) => {
                info!(workflow = %tag.workflow, run_id = %handle.run_id, "run started");
                self.run_sender.send_replace(Some(handle.clone()));
                self.slot = RunSlot::HasRun(handle);
            }
            Err(error) => {
                warn!(workflow = %tag.workflow, %error, "trigger failed");
                self.slot = previous.map_or(RunSlot::NoRun, RunSlot::HasRun);
                self.last_error = Some(error);
            }
        }
        true
    }

    /// The run views should show. While a trigger is outstanding this is the
    /// run held before it.
    pub fn current_run(&self) -> Option<&RunHandle> {
        match &self.slot {
            RunSlot::NoRun => None,
            RunSlot::Triggering { previous, .. } => previous.as_ref(),
            RunSlot::HasRun(handle) => Some(handle),
        }
    }

    pub fn run_state(&self) -> RunState {
        match self.slot {
            RunSlot::NoRun => RunState::NoRun,
            RunSlot::Triggering { .. } => RunState::Triggering,
            RunSlot::HasRun(_) => RunState::HasRun,
        }
    }

    pub fn is_triggering(&self) -> bool {
        matches!(self.slot, RunSlot::Triggering { .. })
    }

    /// Record the selected tab. Nothing is fetched.
    pub fn select_view(&mut self, view: ViewSelection) {
        self.view = view;
    }

    pub fn view(&self) -> ViewSelection {
        self.view
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowpanel_types::WorkflowMode;
    use serde_json::json;

    fn bound(workflow: WorkflowRef) -> RunCoordinator {
        let mut coordinator = RunCoordinator::new();
        coordinator.bind_workflow(workflow);
        coordinator
    }

    fn trigger_tag(effects: Vec<Effect>) -> RequestTag {
        match effects.as_slice() {
            [Effect::TriggerWorkflow { tag, .. }] => tag.clone(),
            other => panic!("expected a single trigger, got {other:?}"),
        }
    }

    #[test]
    fn initial_state_has_no_run() {
        let coordinator = RunCoordinator::new();
        assert_eq!(coordinator.run_state(), RunState::NoRun);
        assert!(coordinator.current_run().is_none());
        assert!(coordinator.subscribe().borrow().is_none());
        assert_eq!(coordinator.view(), ViewSelection::Run);
    }

    #[test]
    fn successful_trigger_publishes_run() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let mut receiver = coordinator.subscribe();
        let effects = coordinator.trigger(Some(json!({ "city": "Oslo" }))).expect("trigger");
        match effects.as_slice() {
            [Effect::TriggerWorkflow { tag, input }] => {
                assert_eq!(tag.workflow.mode, WorkflowMode::Current);
                assert_eq!(input.as_ref(), Some(&json!({ "city": "Oslo" })));
            }
            other => panic!("unexpected effects {other:?}"),
        }
        let tag = trigger_tag(effects);
        assert_eq!(coordinator.run_state(), RunState::Triggering);

        assert!(coordinator.apply_trigger(&tag, Ok(RunHandle::new("run-42"))));
        assert_eq!(coordinator.run_state(), RunState::HasRun);
        assert_eq!(coordinator.current_run(), Some(&RunHandle::new("run-42")));
        assert!(receiver.has_changed().expect("sender alive"));
        assert_eq!(*receiver.borrow_and_update(), Some(RunHandle::new("run-42")));
    }

    #[test]
    fn failed_trigger_keeps_previous_run() {
        let mut coordinator = bound(WorkflowRef::legacy("wf-1"));
        let first = trigger_tag(coordinator.trigger(None).expect("trigger"));
        coordinator.apply_trigger(&first, Ok(RunHandle::new("run-7")));
        let mut receiver = coordinator.subscribe();

        let second = trigger_tag(coordinator.trigger(None).expect("trigger"));
        assert_eq!(coordinator.current_run(), Some(&RunHandle::new("run-7")));

        assert!(coordinator.apply_trigger(&second, Err("HTTP 500: boom".to_string())));
        assert_eq!(coordinator.run_state(), RunState::HasRun);
        assert_eq!(coordinator.current_run(), Some(&RunHandle::new("run-7")));
        assert_eq!(coordinator.last_error(), Some("HTTP 500: boom"));
        assert!(!receiver.has_changed().expect("sender alive"));
    }

    #[test]
    fn failed_first_trigger_returns_to_no_run() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let tag = trigger_tag(coordinator.trigger(None).expect("trigger"));
        coordinator.apply_trigger(&tag, Err("network error".to_string()));
        assert_eq!(coordinator.run_state(), RunState::NoRun);
        assert!(coordinator.current_run().is_none());
    }

    #[test]
    fn second_trigger_while_outstanding_is_rejected() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let tag = trigger_tag(coordinator.trigger(None).expect("trigger"));

        assert_eq!(coordinator.trigger(None), Err(TriggerRejected::AlreadyTriggering));
        assert!(coordinator.apply_trigger(&tag, Ok(RunHandle::new("run-1"))));
        assert!(coordinator.trigger(None).is_ok());
    }

    #[test]
    fn trigger_without_workflow_is_rejected() {
        let mut coordinator = RunCoordinator::new();
        assert_eq!(coordinator.trigger(None), Err(TriggerRejected::NoWorkflow));
        coordinator.bind_workflow(WorkflowRef::current(""));
        assert_eq!(coordinator.trigger(None), Err(TriggerRejected::NoWorkflow));
    }

    #[test]
    fn identity_change_clears_run_and_drops_pending_trigger() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let first = trigger_tag(coordinator.trigger(None).expect("trigger"));
        coordinator.apply_trigger(&first, Ok(RunHandle::new("run-1")));
        let pending = trigger_tag(coordinator.trigger(None).expect("trigger"));
        let receiver = coordinator.subscribe();

        assert!(coordinator.bind_workflow(WorkflowRef::legacy("wf-1")));
        assert_eq!(coordinator.run_state(), RunState::NoRun);
        assert!(receiver.borrow().is_none());

        assert!(!coordinator.apply_trigger(&pending, Ok(RunHandle::new("run-2"))));
        assert!(coordinator.current_run().is_none());
    }

    #[test]
    fn rebinding_same_pair_keeps_run() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let tag = trigger_tag(coordinator.trigger(None).expect("trigger"));
        coordinator.apply_trigger(&tag, Ok(RunHandle::new("run-1")));

        assert!(!coordinator.bind_workflow(WorkflowRef::current("wf-1")));
        assert_eq!(coordinator.current_run(), Some(&RunHandle::new("run-1")));
    }

    #[test]
    fn select_view_only_records_selection() {
        let mut coordinator = bound(WorkflowRef::current("wf-1"));
        let receiver = coordinator.subscribe();
        coordinator.select_view(ViewSelection::Logs);
        assert_eq!(coordinator.view(), ViewSelection::Logs);
        assert!(!receiver.has_changed().expect("sender alive"));
    }
}
