//! Events consumed by the workflow event loop, and the errors its operations report.

use shared::{
    domain::{ImageDimensions, WorkflowState},
    protocol::UpscaledImage,
};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    drop_target::DragGesture, remote::RemoteFailure, validator::RawFile,
    validator::ValidationError, view::ImageSlot,
};

#[derive(Debug)]
pub enum WorkflowEvent {
    /// Manual pick. `None` mirrors a picker closed without a choice.
    FileSelected(Option<RawFile>),
    ProcessRequested,
    Drag(DragGesture),
    UploadFinished(Result<UpscaledImage, RemoteFailure>),
    DimensionsDecoded {
        slot: ImageSlot,
        epoch: u64,
        dimensions: ImageDimensions,
    },
    MessageExpired {
        generation: u64,
    },
    Shutdown,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileSelected(_) => "file_selected",
            Self::ProcessRequested => "process_requested",
            Self::Drag(_) => "drag",
            Self::UploadFinished(_) => "upload_finished",
            Self::DimensionsDecoded { .. } => "dimensions_decoded",
            Self::MessageExpired { .. } => "message_expired",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),
    #[error("no image selected")]
    NoSelection,
    #[error("an upload is already in progress")]
    Busy,
    #[error("processing cannot start from the {0} state")]
    NotReady(WorkflowState),
}

#[derive(Debug, Error)]
#[error("workflow event loop has stopped")]
pub struct EventLoopClosed;

pub fn dispatch(
    events: &UnboundedSender<WorkflowEvent>,
    event: WorkflowEvent,
) -> Result<(), EventLoopClosed> {
    let name = event.name();
    match events.send(event) {
        Ok(()) => {
            tracing::debug!(event = name, "queued workflow event");
            Ok(())
        }
        Err(_) => {
            tracing::warn!(event = name, "workflow event loop is gone; dropping event");
            Err(EventLoopClosed)
        }
    }
}
