use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, DEFAULT_SETTINGS_FILE},
    launch, media,
    validator::validate,
    DragGesture, HealthMonitor, HttpRemoteService, RawFile, RemoteService, Settings,
    WorkflowEvent,
};
use shared::domain::{HealthStatus, WorkflowState};

mod console_view;

use console_view::ConsoleView;

#[derive(Parser, Debug)]
#[command(name = "upscaler", about = "Upload an image to the upscaling service")]
struct Cli {
    /// Settings file; values are overridden by environment variables and flags.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upscale an image. Several paths act like one drop: only the first is used.
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    Health,
    Info,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.settings);
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    match cli.command {
        Command::Process { files, output } => process(&settings, &files, output.as_deref()).await,
        Command::Health => health(&settings).await,
        Command::Info => info(&settings).await,
    }
}

async fn read_raw_file(path: &Path) -> Result<RawFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(RawFile::new(name, media_type, bytes))
}

async fn process(settings: &Settings, paths: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_raw_file(path).await?);
    }
    if files.len() > 1 {
        tracing::info!(ignored = files.len() - 1, "only the first file is processed");
    }
    let first = files
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("no input file given"))?;
    validate(first).context("image rejected")?;

    let view = ConsoleView::default();
    let result_slot = view.result_slot();
    let mut session = launch(settings, view)?;

    session.app.dispatch(WorkflowEvent::Drag(DragGesture::Enter))?;
    session.app.dispatch(WorkflowEvent::Drag(DragGesture::Drop(files)))?;
    session
        .state
        .wait_for(|state| *state == WorkflowState::Ready)
        .await?;

    session.app.dispatch(WorkflowEvent::ProcessRequested)?;
    let settled = *session.state.wait_for(|state| state.is_settled()).await?;
    session.app.dispatch(WorkflowEvent::Shutdown)?;
    session.event_loop.await?;

    if settled != WorkflowState::Result {
        bail!("upscaling failed");
    }

    if let Some(output) = output {
        let image = result_slot
            .lock()
            .map_err(|_| anyhow!("result view state poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("backend returned no image"))?;
        let bytes = media::decode_data_url(&image).context("result is not an inline image")?;
        tokio::fs::write(output, &bytes)
            .await
            .with_context(|| format!("failed to write '{}'", output.display()))?;
        println!("Saved result to {}", output.display());
    }

    Ok(())
}

async fn health(settings: &Settings) -> Result<()> {
    let remote: Arc<dyn RemoteService> = Arc::new(HttpRemoteService::new(settings)?);
    match HealthMonitor::new(remote).check().await {
        HealthStatus::Healthy => println!("Backend at {} is healthy", settings.server_url),
        HealthStatus::Unreachable => println!("Backend at {} is unreachable", settings.server_url),
    }
    Ok(())
}

async fn info(settings: &Settings) -> Result<()> {
    let remote = HttpRemoteService::new(settings)?;
    let info = remote.fetch_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
