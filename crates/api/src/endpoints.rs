//! HTTP endpoints a developer can call for a workflow.

use flowpanel_types::{WorkflowEndpoint, WorkflowRef};

use crate::sources::encode_segment;

/// Lists the server endpoints for `workflow`, using the prefix of its engine
/// generation.
pub fn workflow_endpoints(workflow: &WorkflowRef) -> Vec<WorkflowEndpoint> {
    let collection = if workflow.mode.is_legacy() {
        "/api/workflows/legacy"
    } else {
        "/api/workflows"
    };
    let base = format!("{collection}/{}", encode_segment(workflow.id.trim()));

    vec![
        WorkflowEndpoint {
            method: "GET",
            path: collection.to_string(),
            description: "List all workflows",
        },
        WorkflowEndpoint {
            method: "GET",
            path: base.clone(),
            description: "Get workflow by ID",
        },
        WorkflowEndpoint {
            method: "POST",
            path: format!("{base}/create-run"),
            description: "Create a new workflow run",
        },
        WorkflowEndpoint {
            method: "POST",
            path: format!("{base}/start?runId=:runId"),
            description: "Start a workflow run",
        },
        WorkflowEndpoint {
            method: "POST",
            path: format!("{base}/start-async"),
            description: "Execute workflow and wait for the result",
        },
        WorkflowEndpoint {
            method: "GET",
            path: format!("{base}/watch"),
            description: "Watch workflow transitions in real-time",
        },
        WorkflowEndpoint {
            method: "POST",
            path: format!("{base}/resume?runId=:runId"),
            description: "Resume a suspended workflow step",
        },
        WorkflowEndpoint {
            method: "POST",
            path: format!("{base}/resume-async?runId=:runId"),
            description: "Resume a suspended step and wait for the result",
        },
    ]
}
