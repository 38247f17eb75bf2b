//! Terminal rendering of the workflow view.

use std::sync::{Arc, Mutex};

use client_core::{ImageSlot, TextSlot, View};
use shared::domain::MessageKind;

/// Last result image reference, read back after the workflow settles.
pub type ResultSlot = Arc<Mutex<Option<String>>>;

#[derive(Default)]
pub struct ConsoleView {
    result: ResultSlot,
    message_kind: Option<MessageKind>,
}

impl ConsoleView {
    pub fn result_slot(&self) -> ResultSlot {
        self.result.clone()
    }
}

impl View for ConsoleView {
    fn show_image(&mut self, slot: ImageSlot, source: &str) {
        tracing::debug!(?slot, bytes = source.len(), "image shown");
        if slot == ImageSlot::Result {
            if let Ok(mut result) = self.result.lock() {
                *result = Some(source.to_string());
            }
        }
    }

    fn hide_image(&mut self, slot: ImageSlot) {
        tracing::debug!(?slot, "image hidden");
        if slot == ImageSlot::Result {
            if let Ok(mut result) = self.result.lock() {
                *result = None;
            }
        }
    }

    fn set_placeholder_visible(&mut self, slot: ImageSlot, visible: bool) {
        tracing::trace!(?slot, visible, "placeholder");
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        tracing::trace!(enabled, "submit control");
    }

    fn set_submit_label(&mut self, label: &str) {
        tracing::trace!(label, "submit label");
    }

    fn set_busy_visible(&mut self, visible: bool) {
        if visible {
            println!("Uploading and waiting for the backend...");
        }
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        if text.is_empty() {
            return;
        }
        match slot {
            TextSlot::Message => match self.message_kind {
                Some(MessageKind::Error) => eprintln!("{text}"),
                _ => println!("{text}"),
            },
            TextSlot::FileInfo => println!("File: {text}"),
            TextSlot::OriginalSize => println!("Original size: {text}"),
            TextSlot::ResultSize => println!("Result size: {text}"),
        }
    }

    fn set_message_kind(&mut self, kind: Option<MessageKind>) {
        self.message_kind = kind;
    }

    fn set_drop_highlight(&mut self, highlighted: bool) {
        tracing::trace!(highlighted, "drop highlight");
    }
}
