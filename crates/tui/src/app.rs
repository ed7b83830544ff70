//! Application state for the panel.
//!
//! [`App`] wires the resolver, the run coordinator, and the per-tab states
//! together. It is the single place where [`Msg`]s are applied; components call
//! into it and the runtime routes completions through [`App::update`].

use flowpanel_types::{Effect, Msg, ViewSelection, WorkflowRef};
use tracing::debug;

use crate::ui::components::endpoints::EndpointsState;
use crate::ui::components::logs::LogsState;
use crate::ui::components::workflow_info::{RunCoordinator, RunInputState, WorkflowResolver};
use crate::ui::theme::{DraculaTheme, Theme};

/// Spinner frames shown while something is loading.
pub const THROBBER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug)]
pub struct App {
    /// Pair the panel is bound to.
    pub workflow: WorkflowRef,
    /// Base URL of the workflow server, used for copyable endpoint URLs.
    pub base_url: String,
    pub resolver: WorkflowResolver,
    pub coordinator: RunCoordinator,
    pub logs: LogsState,
    pub endpoints: EndpointsState,
    pub run_input: RunInputState,
    /// One-line status shown in the footer.
    pub notice: Option<String>,
    pub theme: Box<dyn Theme>,
    pub throbber_idx: usize,
}

impl App {
    /// Build the state for `workflow`. Call [`App::open_workflow`] (or send
    /// [`Msg::OpenWorkflow`]) to issue the first fetch.
    pub fn new(workflow: WorkflowRef, base_url: impl Into<String>) -> Self {
        let coordinator = RunCoordinator::new();
        let logs = LogsState::new(coordinator.subscribe());
        Self {
            workflow,
            base_url: base_url.into(),
            resolver: WorkflowResolver::new(),
            coordinator,
            logs,
            endpoints: EndpointsState::default(),
            run_input: RunInputState::new(),
            notice: None,
            theme: Box::new(DraculaTheme::new()),
            throbber_idx: 0,
        }
    }

    /// Bind every part of the panel to `workflow`.
    pub fn open_workflow(&mut self, workflow: WorkflowRef) -> Vec<Effect> {
        if self.coordinator.bind_workflow(workflow.clone()) {
            self.run_input.clear();
            self.notice = None;
        }
        self.endpoints.bind(&workflow);
        self.workflow = workflow.clone();

        let mut effects = self.resolver.resolve(workflow);
        effects.extend(self.logs.sync_run());
        effects
    }

    /// Apply a message and return follow-up effects.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_busy() {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
                Vec::new()
            }
            Msg::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                Vec::new()
            }
            Msg::OpenWorkflow(workflow) => self.open_workflow(workflow),
            Msg::WorkflowLoaded { tag, result } => {
                self.resolver.apply(&tag, result);
                Vec::new()
            }
            Msg::TriggerCompleted { tag, result } => {
                let notice = match &result {
                    Ok(handle) => format!("Run {} started", handle.run_id),
                    Err(error) => format!("Trigger failed: {error}"),
                };
                if self.coordinator.apply_trigger(&tag, result) {
                    self.notice = Some(notice);
                }
                self.logs.sync_run()
            }
            Msg::RunLogsLoaded {
                run_id,
                request_id,
                result,
            } => {
                self.logs.apply(&run_id, request_id, result);
                Vec::new()
            }
            Msg::Notice(text) => {
                self.notice = Some(text);
                Vec::new()
            }
        }
    }

    /// Trigger the bound workflow with the current input.
    pub fn trigger(&mut self) -> Vec<Effect> {
        let input = match self.run_input.parsed() {
            Ok(input) => input,
            Err(message) => {
                self.notice = Some(message);
                return Vec::new();
            }
        };
        match self.coordinator.trigger(input) {
            Ok(effects) => {
                self.notice = Some(format!("Triggering {}…", self.workflow.id));
                effects
            }
            Err(rejected) => {
                self.notice = Some(rejected.to_string());
                Vec::new()
            }
        }
    }

    /// Switch tabs. Never fetches.
    pub fn select_view(&mut self, view: ViewSelection) {
        self.coordinator.select_view(view);
    }

    pub fn view(&self) -> ViewSelection {
        self.coordinator.view()
    }

    /// Refresh whatever the active tab shows.
    pub fn refresh(&mut self) -> Vec<Effect> {
        match self.view() {
            ViewSelection::Run => self.resolver.refresh(),
            ViewSelection::Endpoints => Vec::new(),
            ViewSelection::Logs => self.logs.refresh(),
        }
    }

    pub fn copy_workflow_id(&mut self) -> Vec<Effect> {
        if self.workflow.is_blank() {
            self.notice = Some("No workflow selected".to_string());
            return Vec::new();
        }
        vec![Effect::CopyToClipboardRequested(self.workflow.id.clone())]
    }

    pub fn copy_selected_endpoint(&mut self) -> Vec<Effect> {
        match self.endpoints.selected_url(&self.base_url) {
            Some(url) => vec![Effect::CopyToClipboardRequested(url)],
            None => Vec::new(),
        }
    }

    /// Whether any request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.resolver.is_loading() || self.coordinator.is_triggering() || self.logs.is_loading()
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }
}
