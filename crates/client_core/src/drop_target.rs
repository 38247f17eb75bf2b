//! Drag-and-drop adapter for the upload area.

use crate::validator::RawFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragGesture {
    Enter,
    Over,
    Leave,
    Drop(Vec<RawFile>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    /// The platform must suppress its own handling of the gesture.
    pub prevent_default: bool,
    /// `Some` when the highlight changed.
    pub highlight: Option<bool>,
    /// First dropped file, to be fed into the selection path.
    pub file: Option<RawFile>,
}

#[derive(Debug, Default)]
pub struct DropTarget {
    highlighted: bool,
}

impl DropTarget {
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn handle(&mut self, gesture: DragGesture) -> DropOutcome {
        let (highlight, file) = match gesture {
            DragGesture::Enter | DragGesture::Over => (true, None),
            DragGesture::Leave => (false, None),
            DragGesture::Drop(files) => (false, files.into_iter().next()),
        };

        let changed = highlight != self.highlighted;
        self.highlighted = highlight;

        DropOutcome {
            prevent_default: true,
            highlight: changed.then_some(highlight),
            file,
        }
    }
}
