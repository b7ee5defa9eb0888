//! Session and library controller.
//!
//! The controller owns the scene, the editing [`Session`], the undo
//! [`History`] and the [`AutoSaveManager`]. Every committed scene mutation is
//! serialized once and handed to both listeners. Restoring a snapshot for
//! undo/redo bypasses the listeners so it can never be recorded again.

use crate::autosave::{AutoSaveManager, SaveReport};
use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::events::{SceneChange, SceneListener, notify};
use crate::history::History;
use crate::identity::DeviceIdentity;
use crate::import::{ImportError, ImportTicket, PageCursor, PageRenderer};
use crate::raster::{RasterError, Rasterizer};
use crate::scene::{Hit, Scene, SceneError};
use crate::session::Session;
use crate::shapes::{BackgroundImage, Shape, ShapeId, Text};
use crate::storage::{DocumentId, DocumentStore, KeyValueStore, NameError, StorageError};
use crate::tools::{ToolEffect, ToolKind};
use kurbo::{Affine, Point, Vec2};
use thiserror::Error;

/// Controller errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid document name: {0}")]
    Name(#[from] NameError),
    #[error("Document already exists: {0}")]
    AlreadyExists(String),
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("No document is open")]
    NoDocument,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
}

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Library,
    Editor,
}

/// One document in the library listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub name: String,
    /// Thumbnail as a PNG data URL, if one has been rendered.
    pub thumbnail: Option<String>,
}

/// Non-fatal conditions surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Stored content could not be parsed; the document opened empty.
    MalformedDocument(String),
    /// An image or page could not be imported; the background is unchanged.
    ImportFailed(String),
    /// A save did not reach storage.
    SaveFailed(String),
}

/// Keyboard input relevant to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Escape,
}

/// Orchestrates the library, the editor and persistence.
pub struct Controller<S: KeyValueStore, R: Rasterizer> {
    store: DocumentStore<S>,
    rasterizer: R,
    clock: Box<dyn Clock>,
    config: EditorConfig,
    identity: DeviceIdentity,
    view: View,
    scene: Scene,
    session: Session,
    history: History,
    autosave: AutoSaveManager,
    page_renderer: Option<Box<dyn PageRenderer>>,
    notices: Vec<Notice>,
}

impl<S: KeyValueStore, R: Rasterizer> Controller<S, R> {
    /// Ensure a device identity exists and open on the library view.
    pub fn startup(
        backend: S,
        rasterizer: R,
        clock: Box<dyn Clock>,
        config: EditorConfig,
    ) -> Result<Self, SessionError> {
        let identity = DeviceIdentity::ensure(&backend)?;
        log::info!("Starting session for {}", identity);
        Ok(Self {
            store: DocumentStore::new(backend),
            rasterizer,
            clock,
            scene: Scene::new(config.surface_size()),
            history: History::new(config.history_limit),
            autosave: AutoSaveManager::new(config.autosave_delay()),
            config,
            identity,
            view: View::Library,
            session: Session::default(),
            page_renderer: None,
            notices: Vec::new(),
        })
    }

    pub fn owner(&self) -> &str {
        self.identity.as_str()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autosave(&self) -> &AutoSaveManager {
        &self.autosave
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Active document, if any.
    pub fn active_document(&self) -> Option<&DocumentId> {
        self.session.document.as_ref()
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- Library ---

    /// Documents of this device, sorted by name, with their thumbnails.
    pub fn library(&self) -> Result<Vec<LibraryEntry>, SessionError> {
        let names = self.store.list(self.owner())?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let id = match DocumentId::new(self.owner(), &name) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("Skipping stored document {:?}: {}", name, e);
                    continue;
                }
            };
            entries.push(LibraryEntry {
                thumbnail: self.store.load_thumbnail(&id)?,
                name,
            });
        }
        Ok(entries)
    }

    /// Create an empty document, persist it and open it in the editor.
    pub fn create_new_doc(&mut self, name: &str) -> Result<(), SessionError> {
        let id = DocumentId::new(self.owner(), name)?;
        if self.store.exists(&id)? {
            return Err(SessionError::AlreadyExists(id.name().to_string()));
        }
        self.flush();

        let scene = Scene::new(self.config.surface_size());
        let snapshot = scene.to_json()?;
        let now = self.clock.now();
        self.autosave.save(
            &self.store,
            &self.rasterizer,
            &id,
            &snapshot,
            self.config.thumbnail_size(),
            now,
        )?;
        log::info!("Created {}", id);
        self.open(id, scene, snapshot);
        Ok(())
    }

    /// Open a stored document in the editor.
    ///
    /// Content that does not parse opens as an empty scene and queues a
    /// [`Notice::MalformedDocument`].
    pub fn load_doc(&mut self, name: &str) -> Result<(), SessionError> {
        let id = DocumentId::new(self.owner(), name)?;
        self.flush();

        let content = self
            .store
            .load(&id)?
            .ok_or_else(|| SessionError::NotFound(id.name().to_string()))?;
        let scene = match Scene::from_json(&content) {
            Ok(scene) => scene,
            Err(e) => {
                log::warn!("Document {} is malformed, opening empty: {}", id, e);
                self.notices.push(Notice::MalformedDocument(id.name().to_string()));
                Scene::new(self.config.surface_size())
            }
        };
        let snapshot = scene.to_json()?;
        log::info!("Opened {}", id);
        self.open(id, scene, snapshot);
        Ok(())
    }

    /// Remove a document and its thumbnail. Closes it if it is active.
    pub fn delete_doc(&mut self, name: &str) -> Result<(), SessionError> {
        let id = DocumentId::new(self.owner(), name)?;
        if self.session.document.as_ref() == Some(&id) {
            self.autosave.cancel();
            self.close();
        }
        self.store.delete(&id)?;
        log::info!("Deleted {}", id);
        Ok(())
    }

    /// Leave the editor for the library, saving pending changes first.
    pub fn show_library(&mut self) {
        self.flush();
        self.close();
    }

    fn open(&mut self, id: DocumentId, scene: Scene, snapshot: String) {
        self.autosave.cancel();
        self.scene = scene;
        self.history.reset(snapshot);
        self.session.reset(Some(id));
        self.page_renderer = None;
        self.view = View::Editor;
    }

    fn close(&mut self) {
        self.scene = Scene::new(self.config.surface_size());
        self.history.clear();
        self.session.reset(None);
        self.page_renderer = None;
        self.view = View::Library;
    }

    // --- Tools and input ---

    /// Switch tools. Ends text editing and any in-flight gesture.
    pub fn select_tool(&mut self, tool: ToolKind) {
        self.end_text_editing();
        self.session.tools.select(tool);
    }

    /// Advance the palette color and apply it to the brush and to the text
    /// being edited or selected.
    pub fn cycle_color(&mut self) {
        let color = self.session.cycle_color();
        self.session.tools.recolor_preview(color);

        let target = self.session.editing_text.or(match self.session.selection {
            Some(Hit::Object(id)) => Some(id),
            _ => None,
        });
        let Some(id) = target else {
            return;
        };
        if let Some(shape) = self.scene.get_mut(id).filter(|s| s.as_text().is_some()) {
            shape.style_mut().stroke_color = color;
            self.commit(SceneChange::Modified(id));
        }
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, screen: Point) {
        if self.session.document.is_none() {
            return;
        }
        self.end_text_editing();
        let point = self.session.viewport.screen_to_scene(screen);
        let color = self.session.current_color();
        let effect =
            self.session
                .tools
                .pointer_down(point, &self.scene, color, self.session.background_locked);
        self.apply(effect);
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, screen: Point) {
        if self.session.document.is_none() {
            return;
        }
        let point = self.session.viewport.screen_to_scene(screen);
        let effect = self.session.tools.pointer_move(point);
        self.apply(effect);
    }

    /// Pointer released at a screen position.
    pub fn pointer_up(&mut self, screen: Point) {
        if self.session.document.is_none() {
            return;
        }
        let point = self.session.viewport.screen_to_scene(screen);
        let effect = self.session.tools.pointer_up(point);
        self.apply(effect);
    }

    /// Keyboard input: edits the active text, or deletes the selection.
    pub fn key(&mut self, key: Key) {
        if self.session.document.is_none() {
            return;
        }
        match self.session.editing_text {
            Some(id) => self.edit_text(id, key),
            None => match key {
                Key::Delete | Key::Backspace => self.delete_selection(),
                Key::Escape => {
                    self.session.tools.cancel();
                    self.session.selection = None;
                }
                Key::Char(_) | Key::Enter => {}
            },
        }
    }

    fn apply(&mut self, effect: ToolEffect) {
        match effect {
            ToolEffect::None | ToolEffect::EraseRefused => {}
            ToolEffect::PlaceText(point) => {
                let mut text = Text::new(point, Text::PLACEHOLDER.to_string());
                text.style.stroke_color = self.session.current_color();
                let id = self.scene.add(Shape::Text(text));
                self.session.selection = Some(Hit::Object(id));
                self.session.editing_text = Some(id);
                self.session.placeholder_selected = true;
                self.commit(SceneChange::Added(id));
            }
            ToolEffect::Erase(id) => {
                if self.scene.remove(id).is_some() {
                    if self.session.selection == Some(Hit::Object(id)) {
                        self.session.selection = None;
                    }
                    self.commit(SceneChange::Removed(id));
                }
            }
            ToolEffect::Select(hit) => self.session.selection = hit,
            ToolEffect::Drag { target, delta } => self.translate(target, delta),
            ToolEffect::FinishStroke(stroke) => {
                let id = self.scene.add(Shape::Freehand(stroke));
                self.commit(SceneChange::Added(id));
            }
            ToolEffect::FinishDrag { target, delta } => {
                self.translate(target, delta);
                let change = match target {
                    Hit::Object(id) => SceneChange::Modified(id),
                    Hit::Background => SceneChange::Background,
                };
                self.commit(change);
            }
        }
    }

    fn translate(&mut self, target: Hit, delta: Vec2) {
        match target {
            Hit::Object(id) => {
                if let Some(shape) = self.scene.get_mut(id) {
                    shape.transform(Affine::translate(delta));
                }
            }
            Hit::Background => {
                if let Some(background) = &mut self.scene.background {
                    background.translate(delta);
                }
            }
        }
    }

    fn edit_text(&mut self, id: ShapeId, key: Key) {
        if matches!(key, Key::Enter | Key::Escape) {
            self.end_text_editing();
            return;
        }
        let placeholder = std::mem::take(&mut self.session.placeholder_selected);
        let Some(text) = self.scene.get_mut(id).and_then(Shape::as_text_mut) else {
            self.session.editing_text = None;
            return;
        };
        let changed = match key {
            Key::Char(c) => {
                if placeholder {
                    text.content.clear();
                }
                text.push_char(c);
                true
            }
            _ if placeholder => {
                let had_content = !text.content.is_empty();
                text.content.clear();
                had_content
            }
            _ => text.pop_char(),
        };
        if changed {
            self.commit(SceneChange::Modified(id));
        }
    }

    fn end_text_editing(&mut self) {
        if self.session.editing_text.take().is_some() {
            self.session.placeholder_selected = false;
        }
    }

    fn delete_selection(&mut self) {
        match self.session.selection {
            Some(Hit::Object(id)) => {
                self.session.selection = None;
                if self.scene.remove(id).is_some() {
                    self.commit(SceneChange::Removed(id));
                }
            }
            Some(Hit::Background) => {
                if self.session.background_locked {
                    log::info!("Background is locked");
                    return;
                }
                self.session.selection = None;
                if self.scene.background.take().is_some() {
                    self.commit(SceneChange::Background);
                }
            }
            None => {}
        }
    }

    /// Toggle the background lock. Returns the new state.
    pub fn toggle_background_lock(&mut self) -> bool {
        self.session.background_locked = !self.session.background_locked;
        if self.session.background_locked && self.session.selection == Some(Hit::Background) {
            self.session.selection = None;
        }
        self.session.background_locked
    }

    pub fn zoom_in(&mut self) {
        self.session.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.session.viewport.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.session.viewport.reset();
    }

    // --- History ---

    /// Step back one snapshot. No-op at the start of history.
    pub fn undo(&mut self) {
        if self.session.document.is_none() {
            return;
        }
        if let Some(snapshot) = self.history.undo().map(str::to_owned) {
            self.restore(&snapshot);
        }
    }

    /// Step forward one snapshot. No-op at the end of history.
    pub fn redo(&mut self) {
        if self.session.document.is_none() {
            return;
        }
        if let Some(snapshot) = self.history.redo().map(str::to_owned) {
            self.restore(&snapshot);
        }
    }

    /// Reload the surface from a snapshot without notifying listeners.
    fn restore(&mut self, snapshot: &str) {
        match Scene::from_json(snapshot) {
            Ok(scene) => {
                self.scene = scene;
                self.session.tools.cancel();
                self.session.selection = None;
                self.end_text_editing();
                self.autosave.schedule(self.clock.now());
            }
            Err(e) => log::error!("Failed to restore snapshot: {}", e),
        }
    }

    /// Serialize once and notify every listener.
    fn commit(&mut self, change: SceneChange) {
        let snapshot = match self.scene.to_json() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to serialize scene: {}", e);
                return;
            }
        };
        let now = self.clock.now();
        let mut listeners: [&mut dyn SceneListener; 2] = [&mut self.history, &mut self.autosave];
        notify(&mut listeners, change, &snapshot, now);
    }

    // --- Persistence ---

    /// Fire the autosave if its quiet period has elapsed.
    pub fn tick(&mut self) -> Option<SaveReport> {
        if self.autosave.is_due(self.clock.now()) {
            self.save_active()
        } else {
            None
        }
    }

    /// Save now if a save is pending.
    pub fn flush(&mut self) -> Option<SaveReport> {
        if self.autosave.is_pending() {
            self.save_active()
        } else {
            None
        }
    }

    /// Save the active document immediately.
    pub fn save_now(&mut self) -> Option<SaveReport> {
        self.save_active()
    }

    fn save_active(&mut self) -> Option<SaveReport> {
        let Some(id) = self.session.document.clone() else {
            self.autosave.cancel();
            log::debug!("No active document, save skipped");
            return None;
        };
        let result = self
            .scene
            .to_json()
            .map_err(SessionError::from)
            .and_then(|snapshot| {
                let now = self.clock.now();
                self.autosave
                    .save(
                        &self.store,
                        &self.rasterizer,
                        &id,
                        &snapshot,
                        self.config.thumbnail_size(),
                        now,
                    )
                    .map_err(SessionError::from)
            });
        match result {
            Ok(report) => Some(report),
            Err(e) => {
                log::error!("Failed to save {}: {}", id, e);
                self.autosave.cancel();
                self.notices.push(Notice::SaveFailed(e.to_string()));
                None
            }
        }
    }

    /// Flatten the current scene to PNG at surface size.
    pub fn export_png(&self) -> Result<Vec<u8>, SessionError> {
        if self.session.document.is_none() {
            return Err(SessionError::NoDocument);
        }
        let width = self.scene.size.width.round().max(1.0) as u32;
        let height = self.scene.size.height.round().max(1.0) as u32;
        Ok(self.rasterizer.render_png(&self.scene, width, height)?)
    }

    // --- Background import ---

    /// Start a background import. Any earlier request is superseded.
    ///
    /// With `replaces_scene` the completed import starts a new worksheet on
    /// the current document (annotations are cleared).
    pub fn begin_background_import(&mut self, replaces_scene: bool) -> ImportTicket {
        self.session.imports.begin(replaces_scene)
    }

    /// Install the result of an import.
    ///
    /// Stale tickets are discarded. A failed decode leaves the background
    /// unchanged and queues [`Notice::ImportFailed`]. Returns whether the
    /// background was replaced.
    pub fn finish_background_import(
        &mut self,
        ticket: ImportTicket,
        result: Result<Vec<u8>, ImportError>,
    ) -> bool {
        if !self.session.imports.is_current(&ticket) {
            log::debug!("Discarding stale import");
            return false;
        }
        if self.session.document.is_none() {
            return false;
        }
        let decoded = result.and_then(|bytes| {
            let info = self.rasterizer.probe(&bytes)?;
            Ok(BackgroundImage::new(&bytes, info.width, info.height, info.format)
                .fit_to_surface(self.scene.size))
        });
        let background = match decoded {
            Ok(background) => background,
            Err(e) => {
                log::warn!("Import failed: {}", e);
                self.notices.push(Notice::ImportFailed(e.to_string()));
                return false;
            }
        };

        self.session.selection = None;
        let change = if ticket.replaces_scene {
            self.end_text_editing();
            self.session.tools.cancel();
            self.scene.clear_objects();
            SceneChange::Replaced
        } else {
            SceneChange::Background
        };
        self.scene.background = Some(background);
        self.commit(change);
        true
    }

    /// Import raster image bytes as a new worksheet.
    ///
    /// An open paged document is closed once the image is installed.
    pub fn import_image(&mut self, bytes: Vec<u8>) -> bool {
        let ticket = self.begin_background_import(true);
        let installed = self.finish_background_import(ticket, Ok(bytes));
        if installed {
            self.page_renderer = None;
            self.session.pages = None;
        }
        installed
    }

    /// Open a paged document and show its first page as a new worksheet.
    ///
    /// Page navigation switches to the new document only once its first page
    /// is installed.
    pub fn open_paged_document(&mut self, renderer: Box<dyn PageRenderer>) -> bool {
        if self.session.document.is_none() {
            return false;
        }
        let cursor = match PageCursor::new(renderer.page_count()) {
            Ok(cursor) => cursor,
            Err(e) => {
                log::warn!("Cannot open paged document: {}", e);
                self.notices.push(Notice::ImportFailed(e.to_string()));
                return false;
            }
        };
        let rendered = renderer.render_page(cursor.page());
        let ticket = self.begin_background_import(true);
        if !self.finish_background_import(ticket, rendered) {
            return false;
        }
        self.page_renderer = Some(renderer);
        self.session.pages = Some(cursor);
        true
    }

    /// Show the next page. Clamped at the last page.
    pub fn next_page(&mut self) -> bool {
        match self.session.pages {
            Some(cursor) if cursor.next() != cursor.page() => self.show_page(cursor.next()),
            _ => false,
        }
    }

    /// Show the previous page. Clamped at the first page.
    pub fn prev_page(&mut self) -> bool {
        match self.session.pages {
            Some(cursor) if cursor.prev() != cursor.page() => self.show_page(cursor.prev()),
            _ => false,
        }
    }

    fn show_page(&mut self, page: u32) -> bool {
        let Some(renderer) = self.page_renderer.as_ref() else {
            return false;
        };
        let rendered = renderer.render_page(page);
        let ticket = self.begin_background_import(false);
        let installed = self.finish_background_import(ticket, rendered);
        if installed {
            if let Some(cursor) = &mut self.session.pages {
                if let Err(e) = cursor.set(page) {
                    log::warn!("{}", e);
                }
            }
        }
        installed
    }
}
