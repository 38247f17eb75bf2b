//! Workflow controller: the selection → upload → result state machine.
//!
//! All mutation happens on the task that owns the controller. Uploads, dimension
//! probes and message timers run as spawned tasks that report back through
//! [`WorkflowEvent`]s, so transitions are applied strictly in arrival order.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{ImageDimensions, MessageKind, WorkflowState, MESSAGE_TTL_SECS},
    protocol::UpscaledImage,
};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};
use tracing::{debug, error, info, warn};

use crate::{
    drop_target::{DragGesture, DropOutcome, DropTarget},
    events::{dispatch, WorkflowError, WorkflowEvent},
    media::{self, ProbeError},
    remote::{RemoteFailure, RemoteService},
    validator::{validate, CandidateFile, RawFile, ValidationError},
    view::{ImageSlot, TextSlot, View},
};

pub const FILE_INFO_HINT: &str = "Supports JPG, PNG (max 5MB)";
pub const SUBMIT_LABEL_IDLE: &str = "✨ Start upscaling";
pub const SUBMIT_LABEL_BUSY: &str = "⏳ Processing...";

const INVALID_TYPE_TEXT: &str = "Please choose a valid image file (JPG, PNG)";
const TOO_LARGE_TEXT: &str = "Images must not exceed 5MB";
const NO_SELECTION_TEXT: &str = "Please select an image first";
const RESELECT_TEXT: &str = "Select an image again to start a new upscale";

fn success_text(processing_time: Option<f64>) -> String {
    match processing_time {
        Some(secs) if secs > 0.0 => format!("✅ Upscaling complete! Took {secs} seconds"),
        _ => "✅ Upscaling complete!".to_string(),
    }
}

fn failure_text(err: &RemoteFailure) -> String {
    format!("❌ Processing failed: {err}")
}

pub struct WorkflowController<V: View> {
    view: V,
    remote: Arc<dyn RemoteService>,
    events: UnboundedSender<WorkflowEvent>,
    state: WorkflowState,
    state_tx: watch::Sender<WorkflowState>,
    candidate: Option<CandidateFile>,
    result: Option<UpscaledImage>,
    submit_enabled: bool,
    drop_target: DropTarget,
    message: Option<(String, MessageKind)>,
    message_generation: u64,
    message_ttl: Duration,
    selection_epoch: u64,
    result_epoch: u64,
}

impl<V: View + 'static> WorkflowController<V> {
    pub fn new(view: V, remote: Arc<dyn RemoteService>) -> (Self, UnboundedReceiver<WorkflowEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(WorkflowState::Empty);
        let mut controller = Self {
            view,
            remote,
            events,
            state: WorkflowState::Empty,
            state_tx,
            candidate: None,
            result: None,
            submit_enabled: false,
            drop_target: DropTarget::default(),
            message: None,
            message_generation: 0,
            message_ttl: Duration::from_secs(MESSAGE_TTL_SECS),
            selection_epoch: 0,
            result_epoch: 0,
        };
        controller.render_initial();
        (controller, events_rx)
    }

    pub fn sender(&self) -> UnboundedSender<WorkflowEvent> {
        self.events.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn candidate(&self) -> Option<&CandidateFile> {
        self.candidate.as_ref()
    }

    pub fn result(&self) -> Option<&UpscaledImage> {
        self.result.as_ref()
    }

    pub fn message(&self) -> Option<(&str, MessageKind)> {
        self.message.as_ref().map(|(text, kind)| (text.as_str(), *kind))
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub async fn run(mut self, mut events: UnboundedReceiver<WorkflowEvent>) {
        info!("workflow event loop started");
        while let Some(event) = events.recv().await {
            if matches!(event, WorkflowEvent::Shutdown) {
                break;
            }
            self.handle(event);
        }
        info!("workflow event loop stopped");
    }

    pub fn handle(&mut self, event: WorkflowEvent) {
        debug!(event = event.name(), state = %self.state, "handling workflow event");
        match event {
            WorkflowEvent::FileSelected(Some(file)) => {
                if let Err(err) = self.select_file(file) {
                    debug!("selection not accepted: {err}");
                }
            }
            WorkflowEvent::FileSelected(None) => {}
            WorkflowEvent::ProcessRequested => {
                if let Err(err) = self.request_processing() {
                    debug!("processing request refused: {err}");
                }
            }
            WorkflowEvent::Drag(gesture) => {
                self.handle_drag(gesture);
            }
            WorkflowEvent::UploadFinished(outcome) => self.complete_upload(outcome),
            WorkflowEvent::DimensionsDecoded {
                slot,
                epoch,
                dimensions,
            } => self.apply_dimensions(slot, epoch, dimensions),
            WorkflowEvent::MessageExpired { generation } => {
                if generation == self.message_generation {
                    self.clear_message();
                }
            }
            WorkflowEvent::Shutdown => {}
        }
    }

    /// Shared acceptance path for the file picker and the drop target.
    pub fn select_file(&mut self, file: RawFile) -> Result<(), WorkflowError> {
        if self.state == WorkflowState::Busy {
            warn!(file = %file.name, "selection blocked while an upload is in flight");
            return Err(WorkflowError::Busy);
        }

        match validate(file) {
            Ok(candidate) => {
                self.accept(candidate);
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err.into())
            }
        }
    }

    pub fn request_processing(&mut self) -> Result<(), WorkflowError> {
        let Some(candidate) = self.candidate.clone() else {
            self.show_message(NO_SELECTION_TEXT, MessageKind::Error);
            return Err(WorkflowError::NoSelection);
        };
        // The disabled submit control is the only re-entry guard.
        if !self.submit_enabled {
            return Err(WorkflowError::Busy);
        }
        // A failed upload keeps its candidate, so the submit control retries it.
        if !matches!(self.state, WorkflowState::Ready | WorkflowState::ErrorState) {
            self.show_message(RESELECT_TEXT, MessageKind::Error);
            return Err(WorkflowError::NotReady(self.state));
        }

        self.view.set_busy_visible(true);
        self.set_submit_enabled(false);
        self.view.set_submit_label(SUBMIT_LABEL_BUSY);
        self.result_epoch += 1;
        self.set_state(WorkflowState::Busy);

        info!(
            file = candidate.name(),
            size = candidate.size(),
            "uploading image for upscaling"
        );
        let remote = self.remote.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = remote.upscale(&candidate).await;
            let _ = dispatch(&events, WorkflowEvent::UploadFinished(outcome));
        });
        Ok(())
    }

    pub fn handle_drag(&mut self, gesture: DragGesture) -> DropOutcome {
        let outcome = self.drop_target.handle(gesture);
        if let Some(highlighted) = outcome.highlight {
            self.view.set_drop_highlight(highlighted);
        }
        if let Some(file) = outcome.file.clone() {
            if let Err(err) = self.select_file(file) {
                debug!("dropped file not accepted: {err}");
            }
        }
        outcome
    }

    pub fn complete_upload(&mut self, outcome: Result<UpscaledImage, RemoteFailure>) {
        if self.state != WorkflowState::Busy {
            warn!(state = %self.state, "ignoring upload completion outside the busy state");
            return;
        }

        match outcome {
            Ok(result) => {
                info!(processing_time = ?result.processing_time, "upscale succeeded");
                self.view.show_image(ImageSlot::Result, &result.image);
                self.view.set_placeholder_visible(ImageSlot::Result, false);
                self.show_message(&success_text(result.processing_time), MessageKind::Success);

                let epoch = self.result_epoch;
                let image = result.image.clone();
                self.spawn_dimension_probe(ImageSlot::Result, epoch, move || {
                    let bytes = media::decode_data_url(&image)?;
                    media::probe_dimensions(&bytes)
                });

                self.result = Some(result);
                self.candidate = None;
                self.set_state(WorkflowState::Result);
            }
            Err(err) => {
                error!("upscale failed: {err}");
                self.show_message(&failure_text(&err), MessageKind::Error);
                self.set_state(WorkflowState::ErrorState);
            }
        }

        self.release_busy();
    }

    pub fn show_message(&mut self, text: &str, kind: MessageKind) {
        self.message_generation += 1;
        self.view.set_message_kind(Some(kind));
        self.view.set_text(TextSlot::Message, text);
        self.message = Some((text.to_string(), kind));

        let generation = self.message_generation;
        let ttl = self.message_ttl;
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = dispatch(&events, WorkflowEvent::MessageExpired { generation });
        });
    }

    pub fn clear_message(&mut self) {
        self.message_generation += 1;
        self.view.set_text(TextSlot::Message, "");
        self.view.set_message_kind(None);
        self.message = None;
    }

    fn accept(&mut self, candidate: CandidateFile) {
        info!(file = candidate.name(), size = candidate.size(), "image accepted");
        self.selection_epoch += 1;
        self.result_epoch += 1;

        self.view.set_text(TextSlot::FileInfo, &candidate.summary());
        self.view.set_text(TextSlot::OriginalSize, "");
        let preview = media::to_data_url(candidate.media_type(), candidate.bytes());
        self.view.show_image(ImageSlot::Original, &preview);
        self.view.set_placeholder_visible(ImageSlot::Original, false);
        self.clear_result();
        self.clear_message();
        self.set_submit_enabled(true);

        let epoch = self.selection_epoch;
        let bytes = candidate.bytes().clone();
        self.spawn_dimension_probe(ImageSlot::Original, epoch, move || {
            media::probe_dimensions(&bytes)
        });

        self.candidate = Some(candidate);
        self.set_state(WorkflowState::Ready);
    }

    fn reject(&mut self, err: &ValidationError) {
        warn!("image rejected: {err}");
        let text = match err {
            ValidationError::InvalidType { .. } => INVALID_TYPE_TEXT,
            ValidationError::TooLarge { .. } => TOO_LARGE_TEXT,
        };
        self.show_message(text, MessageKind::Error);

        self.selection_epoch += 1;
        self.result_epoch += 1;
        self.candidate = None;
        self.view.set_text(TextSlot::FileInfo, FILE_INFO_HINT);
        self.view.set_text(TextSlot::OriginalSize, "");
        self.view.hide_image(ImageSlot::Original);
        self.view.set_placeholder_visible(ImageSlot::Original, true);
        self.clear_result();
        self.set_submit_enabled(false);
        self.set_state(WorkflowState::Empty);
    }

    fn clear_result(&mut self) {
        self.result = None;
        self.view.hide_image(ImageSlot::Result);
        self.view.set_placeholder_visible(ImageSlot::Result, true);
        self.view.set_text(TextSlot::ResultSize, "");
    }

    /// Runs after every upload, whatever the outcome.
    fn release_busy(&mut self) {
        self.view.set_busy_visible(false);
        self.set_submit_enabled(true);
        self.view.set_submit_label(SUBMIT_LABEL_IDLE);
    }

    fn apply_dimensions(&mut self, slot: ImageSlot, epoch: u64, dimensions: ImageDimensions) {
        let (current, text_slot) = match slot {
            ImageSlot::Original => (self.selection_epoch, TextSlot::OriginalSize),
            ImageSlot::Result => (self.result_epoch, TextSlot::ResultSize),
        };
        if epoch != current {
            debug!(?slot, epoch, current, "discarding stale dimensions");
            return;
        }
        self.view.set_text(text_slot, &dimensions.to_string());
    }

    fn spawn_dimension_probe<F>(&self, slot: ImageSlot, epoch: u64, probe: F)
    where
        F: FnOnce() -> Result<ImageDimensions, ProbeError> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            match tokio::task::spawn_blocking(probe).await {
                Ok(Ok(dimensions)) => {
                    let _ = dispatch(
                        &events,
                        WorkflowEvent::DimensionsDecoded {
                            slot,
                            epoch,
                            dimensions,
                        },
                    );
                }
                Ok(Err(err)) => debug!(?slot, "dimensions unavailable: {err}"),
                Err(err) => debug!(?slot, "dimension probe aborted: {err}"),
            }
        });
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
        self.view.set_submit_enabled(enabled);
    }

    fn set_state(&mut self, next: WorkflowState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "workflow transition");
        }
        self.state = next;
        self.state_tx.send_replace(next);
    }

    fn render_initial(&mut self) {
        self.view.hide_image(ImageSlot::Original);
        self.view.hide_image(ImageSlot::Result);
        self.view.set_placeholder_visible(ImageSlot::Original, true);
        self.view.set_placeholder_visible(ImageSlot::Result, true);
        self.view.set_busy_visible(false);
        self.view.set_submit_label(SUBMIT_LABEL_IDLE);
        self.view.set_text(TextSlot::FileInfo, FILE_INFO_HINT);
        self.set_submit_enabled(false);
    }
}
