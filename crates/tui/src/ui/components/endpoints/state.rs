use flowpanel_api::workflow_endpoints;
use flowpanel_types::{WorkflowEndpoint, WorkflowRef};

/// Endpoint listing for the bound workflow with a single selection.
#[derive(Debug, Default)]
pub struct EndpointsState {
    endpoints: Vec<WorkflowEndpoint>,
    selected: usize,
}

impl EndpointsState {
    pub fn bind(&mut self, workflow: &WorkflowRef) {
        self.endpoints = if workflow.is_blank() { Vec::new() } else { workflow_endpoints(workflow) };
        self.selected = 0;
    }

    pub fn endpoints(&self) -> &[WorkflowEndpoint] {
        &self.endpoints
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.endpoints.is_empty() {
            self.selected = (self.selected + 1) % self.endpoints.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.endpoints.is_empty() {
            self.selected = (self.selected + self.endpoints.len() - 1) % self.endpoints.len();
        }
    }

    /// Full URL of the selected endpoint.
    pub fn selected_url(&self, base_url: &str) -> Option<String> {
        let endpoint = self.endpoints.get(self.selected)?;
        Some(format!("{}{}", base_url.trim_end_matches('/'), endpoint.path))
    }
}
