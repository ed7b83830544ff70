use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use flowpanel_api::{
    API_BASE_ENV, API_TOKEN_ENV, DEFAULT_API_BASE, HttpRunLogSource, LOG_TRANSPORT_ENV, PanelClient, RunLogSource, WorkflowSources,
};
use flowpanel_types::{WorkflowMode, WorkflowRef};
use flowpanel_util::{UserPreferences, redact_json, redact_sensitive};
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Inspect and trigger workflows on a workflow server.
///
/// Without a subcommand the interactive panel opens for `--workflow`, or for
/// the workflow opened last time.
#[derive(Debug, Parser)]
#[command(name = "flowpanel", version, about)]
struct Cli {
    #[command(flatten)]
    target: WorkflowArgs,

    /// Base URL of the workflow server.
    #[arg(long, global = true, env = API_BASE_ENV, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = API_TOKEN_ENV, hide_env_values = true)]
    api_token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Workflow selection, accepted before or after the subcommand.
#[derive(Debug, Clone, Args)]
struct WorkflowArgs {
    /// Workflow id.
    #[arg(long, short = 'w', global = true)]
    workflow: Option<String>,

    /// Address the workflow on the legacy engine.
    #[arg(long, global = true)]
    legacy: bool,
}

impl WorkflowArgs {
    fn workflow_ref(&self) -> Option<WorkflowRef> {
        let id = self.workflow.as_deref()?.trim();
        (!id.is_empty()).then(|| WorkflowRef::new(id, WorkflowMode::from_legacy_flag(self.legacy)))
    }

    fn require(&self) -> Result<WorkflowRef> {
        self.workflow_ref().context("--workflow is required")
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a workflow's name, step count, and step keys as JSON.
    Show,
    /// Create and start a run, printing its run id.
    Trigger {
        /// JSON input for the run.
        #[arg(long)]
        input: Option<String>,
    },
    /// Print the log lines of a run.
    Logs {
        #[arg(long)]
        run_id: String,

        /// Log transport to query.
        #[arg(long, env = LOG_TRANSPORT_ENV)]
        transport: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.is_none());

    let client = PanelClient::new(&cli.api_base, cli.api_token.as_deref())?;
    match cli.command {
        None => run_panel(&cli.target, client).await,
        Some(Command::Show) => show(&cli.target, client).await,
        Some(Command::Trigger { input }) => trigger(&cli.target, input.as_deref(), client).await,
        Some(Command::Logs { run_id, transport }) => logs(&run_id, transport, client).await,
    }
}

fn init_tracing(tui_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tui_mode {
        match flowpanel_tui::log_persistence::open_tui_log_file() {
            Ok((_, file)) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(error) => eprintln!("warning: TUI logging disabled: {error:#}"),
        }
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_preferences() -> UserPreferences {
    UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "failed to load preferences; using in-memory defaults");
        UserPreferences::ephemeral()
    })
}

/// Workflow to open: the explicit flag wins, otherwise the last one opened.
fn panel_workflow(target: &WorkflowArgs, preferences: &UserPreferences) -> Result<WorkflowRef> {
    if let Some(workflow) = target.workflow_ref() {
        return Ok(workflow);
    }
    match preferences.last_workflow() {
        Some(workflow) if !workflow.is_blank() => Ok(workflow),
        _ => bail!("no workflow to open; pass --workflow <ID>"),
    }
}

async fn run_panel(target: &WorkflowArgs, client: PanelClient) -> Result<()> {
    let preferences = load_preferences();
    let workflow = panel_workflow(target, &preferences)?;
    if let Err(error) = preferences.set_last_workflow(Some(workflow.clone())) {
        warn!(%error, "failed to remember last workflow");
    }

    let base_url = client.base_url.clone();
    let run_logs: Arc<dyn RunLogSource> = Arc::new(HttpRunLogSource::from_env(client.clone()));
    let sources = WorkflowSources::from_client(client);
    flowpanel_tui::run(workflow, base_url, sources, run_logs).await
}

async fn show(target: &WorkflowArgs, client: PanelClient) -> Result<()> {
    let workflow = target.require()?;
    let definition = WorkflowSources::from_client(client)
        .for_mode(workflow.mode)
        .fetch_definition(&workflow.id)
        .await
        .with_context(|| format!("failed to fetch workflow {workflow}"))?;

    let summary = json!({
        "id": workflow.id,
        "mode": workflow.mode,
        "name": definition.name,
        "stepCount": definition.step_count(),
        "steps": definition.steps.keys().collect::<Vec<_>>(),
    });
    println!("{}", render_json(&summary)?);
    Ok(())
}

/// Pretty JSON for stdout with secret-looking strings redacted.
fn render_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&redact_json(value))?)
}

fn parse_input(input: Option<&str>) -> Result<Option<Value>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => serde_json::from_str(raw).map(Some).context("--input must be valid JSON"),
    }
}

async fn trigger(target: &WorkflowArgs, input: Option<&str>, client: PanelClient) -> Result<()> {
    let workflow = target.require()?;
    let input = parse_input(input)?;
    let handle = WorkflowSources::from_client(client)
        .for_mode(workflow.mode)
        .trigger(&workflow.id, input)
        .await
        .with_context(|| format!("failed to trigger workflow {workflow}"))?;
    info!(%workflow, run_id = %handle.run_id, "run started");
    println!("{}", render_json(&serde_json::to_value(&handle)?)?);
    Ok(())
}

async fn logs(run_id: &str, transport: Option<String>, client: PanelClient) -> Result<()> {
    let entries = HttpRunLogSource::new(client, transport)
        .fetch_run_logs(run_id)
        .await
        .with_context(|| format!("failed to fetch logs for run {run_id}"))?;
    for entry in entries {
        let level = entry.level.as_deref().unwrap_or("info").to_ascii_uppercase();
        println!("{}", redact_sensitive(&format!("[{level}] {}", entry.msg)));
    }
    Ok(())
}
