//! Process-wide handle to the running client.
//!
//! Installed exactly once at startup by [`crate::launch`]. Platform callbacks that
//! have no other route to the client (visibility changes, late file drops) go
//! through [`app`]. Nothing else in the crate is global.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    OnceLock,
};

use shared::domain::HealthStatus;
use thiserror::Error;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::debug;

use crate::{
    events::{dispatch, EventLoopClosed, WorkflowEvent},
    health::HealthMonitor,
};

static APP: OnceLock<AppHandle> = OnceLock::new();

#[derive(Debug, Error)]
pub enum AppHandleError {
    #[error("the application handle is already installed")]
    AlreadyInstalled,
}

pub struct AppHandle {
    events: UnboundedSender<WorkflowEvent>,
    health: HealthMonitor,
    hidden: AtomicBool,
}

impl AppHandle {
    pub fn new(events: UnboundedSender<WorkflowEvent>, health: HealthMonitor) -> Self {
        Self {
            events,
            health,
            hidden: AtomicBool::new(false),
        }
    }

    pub fn dispatch(&self, event: WorkflowEvent) -> Result<(), EventLoopClosed> {
        dispatch(&self.events, event)
    }

    pub fn check_health(&self) -> JoinHandle<HealthStatus> {
        self.health.spawn_check()
    }

    /// Starts a health check when the surface becomes visible after being hidden.
    pub fn visibility_changed(&self, hidden: bool) -> Option<JoinHandle<HealthStatus>> {
        let was_hidden = self.hidden.swap(hidden, Ordering::SeqCst);
        if was_hidden && !hidden {
            debug!("visibility regained; checking backend health");
            Some(self.check_health())
        } else {
            None
        }
    }
}

pub fn install(handle: AppHandle) -> Result<&'static AppHandle, AppHandleError> {
    APP.set(handle)
        .map_err(|_| AppHandleError::AlreadyInstalled)?;
    APP.get().ok_or(AppHandleError::AlreadyInstalled)
}

pub fn app() -> Option<&'static AppHandle> {
    APP.get()
}

/// No-op until the handle is installed.
pub fn notify_visibility(hidden: bool) -> Option<JoinHandle<HealthStatus>> {
    app()?.visibility_changed(hidden)
}
