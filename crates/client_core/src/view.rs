//! Rendering capability the workflow drives. Each front-end supplies its own implementation.

use shared::domain::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Original,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    Message,
    FileInfo,
    OriginalSize,
    ResultSize,
}

pub trait View: Send {
    /// `source` is an embeddable reference, typically a data URL.
    fn show_image(&mut self, slot: ImageSlot, source: &str);
    fn hide_image(&mut self, slot: ImageSlot);
    fn set_placeholder_visible(&mut self, slot: ImageSlot, visible: bool);
    fn set_submit_enabled(&mut self, enabled: bool);
    fn set_submit_label(&mut self, label: &str);
    fn set_busy_visible(&mut self, visible: bool);
    fn set_text(&mut self, slot: TextSlot, text: &str);
    /// `None` resets the message styling.
    fn set_message_kind(&mut self, kind: Option<MessageKind>);

    /// Cosmetic drop-target highlight.
    fn set_drop_highlight(&mut self, _highlighted: bool) {}
}
