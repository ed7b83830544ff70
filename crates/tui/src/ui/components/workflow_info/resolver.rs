//! Definition lookup for the bound workflow.
//!
//! The resolver keeps at most one outstanding fetch. Every fetch carries a
//! [`RequestTag`]; a completion is applied only when its tag equals the tag of
//! the fetch the resolver is still waiting for, so a slow answer for a
//! previous workflow (or a previous refresh) can never overwrite newer state.

use flowpanel_types::{Effect, RequestTag, WorkflowDefinition, WorkflowRef};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct WorkflowResolver {
    requested: Option<WorkflowRef>,
    definition: Option<WorkflowDefinition>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<RequestTag>,
    next_request_id: u64,
}

impl WorkflowResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the resolver at `workflow`.
    ///
    /// Asking again for the pair that is already outstanding or settled is a
    /// no-op. A blank id settles immediately without a request.
    pub fn resolve(&mut self, workflow: WorkflowRef) -> Vec<Effect> {
        if self.requested.as_ref() == Some(&workflow) {
            return Vec::new();
        }

        self.definition = None;
        self.error = None;
        self.requested = Some(workflow.clone());

        if workflow.is_blank() {
            self.loading = false;
            self.in_flight = None;
            return Vec::new();
        }
        self.issue(workflow)
    }

    /// Re-fetch the current pair once its previous fetch has settled.
    ///
    /// Nothing is issued while a fetch for the pair is still outstanding.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if self.in_flight.is_some() {
            debug!("definition fetch already outstanding; refresh skipped");
            return Vec::new();
        }
        let Some(workflow) = self.requested.clone() else {
            return Vec::new();
        };
        if workflow.is_blank() {
            return Vec::new();
        }
        self.definition = None;
        self.error = None;
        self.issue(workflow)
    }

    fn issue(&mut self, workflow: WorkflowRef) -> Vec<Effect> {
        self.next_request_id += 1;
        let tag = RequestTag::new(workflow, self.next_request_id);
        self.in_flight = Some(tag.clone());
        self.loading = true;
        vec![Effect::FetchWorkflow(tag)]
    }

    /// Apply a settled fetch. Returns `false` when the completion was stale
    /// and has been dropped.
    pub fn apply(&mut self, tag: &RequestTag, result: Result<WorkflowDefinition, String>) -> bool {
        if self.in_flight.as_ref() != Some(tag) {
            debug!(workflow = %tag.workflow, request_id = tag.request_id, "dropping stale definition response");
            return false;
        }

        self.in_flight = None;
        self.loading = false;
        match result {
            Ok(definition) => {
                self.definition = Some(definition);
                self.error = None;
            }
            Err(error) => {
                warn!(workflow = %tag.workflow, %error, "definition fetch failed");
                self.definition = None;
                self.error = Some(error);
            }
        }
        true
    }

    pub fn definition(&self) -> Option<&WorkflowDefinition> {
        self.definition.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch for the current pair.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn step_count(&self) -> usize {
        self.definition.as_ref().map_or(0, WorkflowDefinition::step_count)
    }
}
