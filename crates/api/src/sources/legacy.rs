//! Source for the legacy workflow engine (`/api/workflows/legacy/{id}`).
//!
//! The legacy engine starts runs from `triggerData` rather than `inputData`.
//! Its workflow-level `triggerSchema` has no per-step meaning and is not
//! decoded.

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
struct LegacyWorkflowPayload {
    name: String,
    #[serde(default)]
    steps: IndexMap<String, LegacyStepPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyStepPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_schema: Option<Value>,
    #[serde(default)]
    output_schema: Option<Value>,
}

impl From<LegacyWorkflowPayload> for WorkflowDefinition {
    fn from(payload: LegacyWorkflowPayload) -> Self {
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
            description: None,
            steps,
        }
    }
}

/// HTTP source for workflows served by the legacy engine.
#[derive(Debug, Clone)]
pub struct LegacyWorkflowSource {
    client: PanelClient,
}

impl LegacyWorkflowSource {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    fn workflow_path(workflow_id: &str) -> String {
        format!("/api/workflows/legacy/{}", encode_segment(workflow_id))
    }
}

#[async_trait]
impl WorkflowSource for LegacyWorkflowSource {
    fn mode(&self) -> WorkflowMode {
        WorkflowMode::Legacy
    }

    #[instrument(skip(self), fields(mode = "legacy"))]
    async fn fetch_definition(&self, workflow_id: &str) -> Result<WorkflowDefinition, SourceError> {
        let request = self.client.request(Method::GET, &Self::workflow_path(workflow_id));
        let payload: LegacyWorkflowPayload = send_for_json(request).await?;
        Ok(payload.into())
    }

    #[instrument(skip(self, input), fields(mode = "legacy"))]
    async fn trigger(&self, workflow_id: &str, input: Option<Value>) -> Result<RunHandle, SourceError> {
        let base_path = Self::workflow_path(workflow_id);
        let create_request = self.client.request(Method::POST, &format!("{base_path}/create-run"));
        let handle = send_for_json::<CreateRunPayload>(create_request).await?.into_handle()?;
        debug!(run_id = %handle.run_id, "legacy run created");

        let start_request = self
            .client
            .request(Method::POST, &format!("{base_path}/start"))
            .query(&[("runId", handle.run_id.as_str())])
            .json(&json!({ "triggerData": input.unwrap_or_else(|| json!({})) }));
        send_for_text(start_request).await?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, body_json, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(server: &MockServer) -> LegacyWorkflowSource {
        LegacyWorkflowSource::new(PanelClient::new(&server.uri(), None).expect("client"))
    }

    /// Fails the test if anything outside the legacy prefix is requested.
    async fn forbid_current_engine(server: &MockServer) {
        Mock::given(any())
            .and(path_regex(r"^/api/workflows/[^l][^/]*"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetch_definition_uses_legacy_endpoint_only() {
        let server = MockServer::start().await;
        forbid_current_engine(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/workflows/legacy/wf-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Onboarding",
                "triggerSchema": "{\"type\":\"object\"}",
                "steps": {
                    "welcome": { "id": "welcome", "description": "Send welcome mail" }
                },
                "stepGraph": { "initial": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let definition = source_for(&server).await.fetch_definition("wf-1").await.expect("definition");
        assert_eq!(definition.name, "Onboarding");
        assert_eq!(definition.step_count(), 1);
        assert_eq!(definition.steps["welcome"].description.as_deref(), Some("Send welcome mail"));
        assert!(definition.steps["welcome"].input_schema.is_none());
    }

    #[tokio::test]
    async fn trigger_sends_trigger_data() {
        let server = MockServer::start().await;
        forbid_current_engine(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/workflows/legacy/wf-1/create-run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "runId": "run-7" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/workflows/legacy/wf-1/start"))
            .and(query_param("runId", "run-7"))
            .and(body_json(json!({ "triggerData": {} })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Workflow run started" })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = source_for(&server).await.trigger("wf-1", None).await.expect("trigger");
        assert_eq!(handle.run_id, "run-7");
    }

    #[tokio::test]
    async fn missing_run_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/workflows/legacy/wf-1/create-run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/workflows/legacy/wf-1/start"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let error = source_for(&server).await.trigger("wf-1", None).await.expect_err("no run id");
        assert!(matches!(error, SourceError::MissingRunId));
    }
}
