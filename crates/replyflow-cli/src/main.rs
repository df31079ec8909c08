use anyhow::{Context, Result};
use clap::Parser;
use replyflow_core::{FlowConfig, FlowController, RequestContext};
use replyflow_monitoring::{LogExt, MonitoringConfig};
use replyflow_state_inmemory::{DirectoryData, InMemoryBackendProvider};
use std::io;
use std::path::{Path, PathBuf};

mod runner;
mod script;

use script::Script;

/// Replay a flow builder script against an in-memory backend
#[derive(Debug, Parser)]
#[command(name = "replyflow", version, about)]
struct Cli {
    /// Script to replay (.json, .yaml or .yml)
    script: PathBuf,

    /// Engine configuration file (YAML)
    #[arg(long, env = "REPLYFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Directory data served by the backend (.json or .yaml); seeded data when absent
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Auth token passed to every backend call
    #[arg(long, env = "REPLYFLOW_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn load_directory(path: &Path) -> Result<DirectoryData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read directory data {}", path.display()))?;
    let data = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&raw).context("Invalid directory JSON")?,
        _ => serde_yaml::from_str(&raw).context("Invalid directory YAML")?,
    };
    Ok(data)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file or environment variables
    let config = match &cli.config {
        Some(path) => FlowConfig::from_yaml_file(path),
        None => FlowConfig::load(),
    }
    .context("Failed to load configuration")?;

    let monitoring_config = MonitoringConfig::new("replyflow-cli")
        .with_filter(config.log_filter.clone())
        .with_json(cli.json_logs);
    replyflow_monitoring::init_logging(&monitoring_config).context("Failed to initialize logging")?;

    let directory = match &cli.directory {
        Some(path) => load_directory(path).log_err("Directory data unusable")?,
        None => DirectoryData::seeded(),
    };
    let provider = match &cli.auth_token {
        Some(token) => InMemoryBackendProvider::new(directory).with_required_token(token.clone()),
        None => InMemoryBackendProvider::new(directory),
    };
    let (directory_service, automation_service) = provider.create_services();

    let mut context = RequestContext::new();
    if let Some(token) = &cli.auth_token {
        context = context.with_auth_token(token.clone());
    }

    let script = Script::from_path(&cli.script).log_err("Script unusable")?;
    let mut controller =
        FlowController::new(&config, directory_service, automation_service).with_context(context);
    controller.start();

    let mut out = io::stdout();
    let summary = runner::replay(&mut controller, &script, &mut out).await?;

    eprintln!(
        "replayed {} actions, progress {}%, created: {}",
        summary.actions,
        summary.progress,
        summary.created.as_deref().unwrap_or("none")
    );
    if !summary.rejected.is_empty() {
        eprintln!("last submission rejected: {}", summary.rejected.join("; "));
    }

    Ok(())
}
