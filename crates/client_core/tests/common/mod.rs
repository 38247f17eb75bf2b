#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    io::Cursor,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use client_core::{
    media, CandidateFile, HealthCheckFailure, ImageSlot, RawFile, RemoteFailure, RemoteService,
    TextSlot, View, WorkflowController, WorkflowEvent,
};
use shared::{
    domain::MessageKind,
    protocol::{AppInfo, HealthResponse, UpscaledImage},
};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub images: HashMap<ImageSlot, String>,
    pub placeholders: HashMap<ImageSlot, bool>,
    pub texts: HashMap<TextSlot, String>,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub busy_visible: bool,
    pub message_kind: Option<MessageKind>,
    pub drop_highlight: bool,
}

impl ViewSnapshot {
    pub fn text(&self, slot: TextSlot) -> &str {
        self.texts.get(&slot).map(String::as_str).unwrap_or_default()
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        self.images.get(&slot).map(String::as_str)
    }
}

#[derive(Clone, Default)]
pub struct RecordingView {
    inner: Arc<Mutex<ViewSnapshot>>,
}

impl RecordingView {
    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.lock().expect("view lock").clone()
    }

    fn update(&self, apply: impl FnOnce(&mut ViewSnapshot)) {
        let mut guard = self.inner.lock().expect("view lock");
        apply(&mut *guard);
    }
}

impl View for RecordingView {
    fn show_image(&mut self, slot: ImageSlot, source: &str) {
        self.update(|v| {
            v.images.insert(slot, source.to_string());
        });
    }

    fn hide_image(&mut self, slot: ImageSlot) {
        self.update(|v| {
            v.images.remove(&slot);
        });
    }

    fn set_placeholder_visible(&mut self, slot: ImageSlot, visible: bool) {
        self.update(|v| {
            v.placeholders.insert(slot, visible);
        });
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.update(|v| v.submit_enabled = enabled);
    }

    fn set_submit_label(&mut self, label: &str) {
        self.update(|v| v.submit_label = label.to_string());
    }

    fn set_busy_visible(&mut self, visible: bool) {
        self.update(|v| v.busy_visible = visible);
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        self.update(|v| {
            v.texts.insert(slot, text.to_string());
        });
    }

    fn set_message_kind(&mut self, kind: Option<MessageKind>) {
        self.update(|v| v.message_kind = kind);
    }

    fn set_drop_highlight(&mut self, highlighted: bool) {
        self.update(|v| v.drop_highlight = highlighted);
    }
}

/// Backend double that replays queued upload outcomes in order.
#[derive(Default)]
pub struct ScriptedRemote {
    uploads: Mutex<VecDeque<Result<UpscaledImage, RemoteFailure>>>,
    pub uploaded: Mutex<Vec<String>>,
    pub health_calls: AtomicUsize,
    pub unhealthy: bool,
}

impl ScriptedRemote {
    pub fn with_upload(outcome: Result<UpscaledImage, RemoteFailure>) -> Self {
        let remote = Self::default();
        remote.push_upload(outcome);
        remote
    }

    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }

    pub fn push_upload(&self, outcome: Result<UpscaledImage, RemoteFailure>) {
        self.uploads.lock().expect("uploads lock").push_back(outcome);
    }

    pub fn upload_count(&self) -> usize {
        self.uploaded.lock().expect("uploaded lock").len()
    }

    pub fn health_count(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn upscale(&self, file: &CandidateFile) -> Result<UpscaledImage, RemoteFailure> {
        self.uploaded
            .lock()
            .expect("uploaded lock")
            .push(file.name().to_string());
        self.uploads
            .lock()
            .expect("uploads lock")
            .pop_front()
            .unwrap_or_else(|| Err(RemoteFailure::Declared("no scripted response".into())))
    }

    async fn health(&self) -> Result<HealthResponse, HealthCheckFailure> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.unhealthy {
            return Err(HealthCheckFailure::Unhealthy("starting".into()));
        }
        Ok(HealthResponse {
            status: "healthy".into(),
            timestamp: None,
            hf_token_configured: Some(true),
        })
    }

    async fn fetch_info(&self) -> Result<AppInfo, RemoteFailure> {
        Err(RemoteFailure::Declared("info unavailable".into()))
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

pub fn png_file(name: &str, width: u32, height: u32) -> RawFile {
    RawFile::new(name, "image/png", png_bytes(width, height))
}

/// A real PNG whose declared size is overridden, as a file source may report.
pub fn png_file_declared(name: &str, declared_size: u64) -> RawFile {
    RawFile {
        size: declared_size,
        ..png_file(name, 4, 3)
    }
}

pub fn upscaled(width: u32, height: u32, processing_time: Option<f64>) -> UpscaledImage {
    UpscaledImage {
        image: media::to_data_url("image/png", &png_bytes(width, height)),
        processing_time,
        original_size: None,
        result_size: None,
    }
}

pub fn controller_with(
    remote: Arc<ScriptedRemote>,
) -> (
    WorkflowController<RecordingView>,
    UnboundedReceiver<WorkflowEvent>,
    RecordingView,
) {
    let view = RecordingView::default();
    let (controller, events) = WorkflowController::new(view.clone(), remote);
    (controller, events, view)
}

/// Feeds queued completions back into the controller until `done` holds.
pub async fn pump_until<F>(
    controller: &mut WorkflowController<RecordingView>,
    events: &mut UnboundedReceiver<WorkflowEvent>,
    done: F,
) where
    F: Fn(&WorkflowController<RecordingView>) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(controller) {
            let event = events.recv().await.expect("controller keeps a sender");
            controller.handle(event);
        }
    })
    .await
    .expect("condition reached before timeout");
}

/// Handles whatever is already queued or arrives within `quiet`.
pub async fn drain(
    controller: &mut WorkflowController<RecordingView>,
    events: &mut UnboundedReceiver<WorkflowEvent>,
    quiet: Duration,
) {
    while let Ok(Some(event)) = tokio::time::timeout(quiet, events.recv()).await {
        if matches!(event, WorkflowEvent::MessageExpired { .. }) {
            continue;
        }
        controller.handle(event);
    }
}
