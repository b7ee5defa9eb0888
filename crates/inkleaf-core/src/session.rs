//! Per-document editing session state.

use crate::import::{ImportTracker, PageCursor};
use crate::scene::Hit;
use crate::shapes::{SerializableColor, ShapeId};
use crate::storage::DocumentId;
use crate::tools::{PALETTE, ToolMachine};
use crate::viewport::Viewport;

/// Everything about the editor that is not the scene itself.
///
/// Owned by the controller and reset whenever a document is opened, created
/// or closed.
#[derive(Debug, Clone)]
pub struct Session {
    /// Document being edited.
    pub document: Option<DocumentId>,
    /// Current tool and in-flight gesture.
    pub tools: ToolMachine,
    /// Index into [`PALETTE`].
    pub color_index: usize,
    pub viewport: Viewport,
    /// Locked backgrounds cannot be selected, moved or deleted.
    pub background_locked: bool,
    pub selection: Option<Hit>,
    /// Text object in edit mode.
    pub editing_text: Option<ShapeId>,
    /// Edited text still shows its placeholder; the first keystroke replaces it.
    pub placeholder_selected: bool,
    /// Open paged document, if the background came from one.
    pub pages: Option<PageCursor>,
    pub imports: ImportTracker,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            document: None,
            tools: ToolMachine::new(),
            color_index: 0,
            viewport: Viewport::new(),
            background_locked: true,
            selection: None,
            editing_text: None,
            placeholder_selected: false,
            pages: None,
            imports: ImportTracker::default(),
        }
    }
}

impl Session {
    /// Fresh session for `document`.
    ///
    /// Outstanding imports are invalidated so a late completion cannot land
    /// in the wrong document.
    pub fn reset(&mut self, document: Option<DocumentId>) {
        let mut imports = std::mem::take(&mut self.imports);
        imports.invalidate();
        *self = Self {
            document,
            imports,
            ..Self::default()
        };
    }

    pub fn current_color(&self) -> SerializableColor {
        PALETTE[self.color_index % PALETTE.len()]
    }

    /// Advance to the next palette color, wrapping.
    pub fn cycle_color(&mut self) -> SerializableColor {
        self.color_index = (self.color_index + 1) % PALETTE.len();
        self.current_color()
    }
}
