use std::sync::Arc;

use shared::domain::{HealthStatus, WorkflowState};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::info;

pub mod app_handle;
pub mod config;
pub mod controller;
pub mod drop_target;
pub mod events;
pub mod health;
pub mod media;
pub mod remote;
pub mod validator;
pub mod view;

pub use app_handle::{app, notify_visibility, AppHandle, AppHandleError};
pub use config::{ConfigError, Settings};
pub use controller::WorkflowController;
pub use drop_target::{DragGesture, DropOutcome, DropTarget};
pub use events::{WorkflowError, WorkflowEvent};
pub use health::HealthMonitor;
pub use remote::{HealthCheckFailure, HttpRemoteService, RemoteFailure, RemoteService};
pub use validator::{CandidateFile, RawFile, ValidationError};
pub use view::{ImageSlot, TextSlot, View};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    AppHandle(#[from] AppHandleError),
}

/// A running client: the installed handle plus the controller's event loop.
pub struct Session {
    pub app: &'static AppHandle,
    pub state: watch::Receiver<WorkflowState>,
    pub event_loop: JoinHandle<()>,
    pub startup_health: JoinHandle<HealthStatus>,
}

/// Builds the HTTP backend from `settings` and starts the client. Call once per process.
pub fn launch<V: View + 'static>(settings: &Settings, view: V) -> Result<Session, LaunchError> {
    let remote: Arc<dyn RemoteService> = Arc::new(HttpRemoteService::new(settings)?);
    info!(server_url = %settings.server_url, "starting upscaler client");
    launch_with(remote, view)
}

pub fn launch_with<V: View + 'static>(
    remote: Arc<dyn RemoteService>,
    view: V,
) -> Result<Session, LaunchError> {
    let (controller, events_rx) = WorkflowController::new(view, remote.clone());
    let handle = AppHandle::new(controller.sender(), HealthMonitor::new(remote));
    let app = app_handle::install(handle)?;

    let state = controller.subscribe();
    let event_loop = tokio::spawn(controller.run(events_rx));
    let startup_health = app.check_health();

    Ok(Session {
        app,
        state,
        event_loop,
        startup_health,
    })
}
