//! Source for the current workflow engine (`/api/workflows/{id}`).

use async_trait::async_trait;
use flowpanel_types::{RunHandle, WorkflowDefinition, WorkflowMode, WorkflowStepDescriptor};
use indexmap::IndexMap;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{CreateRunPayload, SourceError, WorkflowSource, encode_segment, send_for_json, send_for_text};
use crate::PanelClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowPayload {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    steps: IndexMap<String, StepPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_schema: Option<Value>,
    #[serde(default)]
    output_schema: Option<Value>,
}

impl From<WorkflowPayload> for WorkflowDefinition {
    fn from(payload: WorkflowPayload) -> Self {
        let steps = payload
            .steps
            .into_iter()
            .map(|(key, step)| {
                let descriptor = WorkflowStepDescriptor {
                    id: step.id.unwrap_or_else(|| key.clone()),
                    description: step.description,
                    input_schema: step.input_schema,
                    output_schema: step.output_schema,
                };
                (key, descriptor)
            })
            .collect();
        WorkflowDefinition {
            name: payload.name,
            description: payload.description,
            steps,
        }
    }
}

/// HTTP source for workflows served by the current engine.
#[derive(Debug, Clone)]
pub struct CurrentWorkflowSource {
    client: PanelClient,
}

impl CurrentWorkflowSource {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    fn workflow_path(workflow_id: &str) -> String {
        format!("/api/workflows/{}", encode_segment(workflow_id))
    }
}

#[async_trait]
impl WorkflowSource for CurrentWorkflowSource {
    fn mode(&self) -> WorkflowMode {
        WorkflowMode::Current
    }

    #[instrument(skip(self), fields(mode = "current"))]
    async fn fetch_definition(&self, workflow_id: &str) -> Result<WorkflowDefinition, SourceError> {
        let request = self.client.request(Method::GET, &Self::workflow_path(workflow_id));
        let payload: WorkflowPayload = send_for_json(request).await?;
        Ok(payload.into())
    }

    #[instrument(skip(self, input), fields(mode = "current"))]
    async fn trigger(&self, workflow_id: &str, input: Option<Value>) -> Result<RunHandle, SourceError> {
        let base_path = Self::workflow_path(workflow_id);
        let create_request = self.client.request(Method::POST, &format!("{base_path}/create-run"));
        let handle = send_for_json::<CreateRunPayload>(create_request).await?.into_handle()?;
        debug!(run_id = %handle.run_id, "run created");

        let start_request = self
            .client
            .request(Method::POST, &format!("{base_path}/start"))
            .query(&[("runId", handle.run_id.as_str())])
            .json(&json!({ "inputData": input.unwrap_or_else(|| json!({})) }));
        send_for_text(start_request).await?;
        Ok(handle)
    }
}
