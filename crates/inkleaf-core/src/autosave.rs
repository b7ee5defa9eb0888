//! Debounced auto-save of the active document.
//!
//! Every committed mutation re-arms a single deadline. When the editor polls
//! [`AutoSaveManager::is_due`] after the quiet period, the scene is written
//! once together with a freshly rendered thumbnail.

use crate::clock::{Duration, Instant};
use crate::events::{SceneChange, SceneListener};
use crate::raster::{png_data_url, Rasterizer};
use crate::scene::Scene;
use crate::storage::{DocumentId, DocumentStore, KeyValueStore, StorageResult};

/// Default debounce delay in milliseconds.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 500;

/// Thumbnail surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

/// What a save wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    /// Whether a new thumbnail replaced the previous one.
    pub thumbnail_written: bool,
}

/// Debounce timer plus the persisted write.
#[derive(Debug)]
pub struct AutoSaveManager {
    /// Quiet period before a scheduled save fires.
    delay: Duration,
    /// Pending deadline, at most one.
    deadline: Option<Instant>,
    /// Last save timestamp.
    last_save: Option<Instant>,
    /// Number of document writes performed.
    writes: u64,
    /// Number of thumbnail writes performed.
    thumbnails: u64,
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS))
    }
}

impl AutoSaveManager {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            last_save: None,
            writes: 0,
            thumbnails: 0,
        }
    }

    /// Get the debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Cancel a pending save.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Check if a save is scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Check if the pending save's quiet period has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn thumbnails(&self) -> u64 {
        self.thumbnails
    }

    /// Write `snapshot` under `id` and regenerate its thumbnail.
    ///
    /// The thumbnail is rendered from the same serialized string. If the
    /// scene cannot be fully rendered the previous thumbnail is kept.
    /// Clears the pending deadline.
    pub fn save<S: KeyValueStore, R: Rasterizer + ?Sized>(
        &mut self,
        store: &DocumentStore<S>,
        rasterizer: &R,
        id: &DocumentId,
        snapshot: &str,
        thumbnail: ThumbnailSize,
        now: Instant,
    ) -> StorageResult<SaveReport> {
        self.deadline = None;
        store.save(id, snapshot)?;
        self.writes += 1;
        self.last_save = Some(now);

        let rendered = Scene::from_json(snapshot)
            .map_err(|e| e.to_string())
            .and_then(|scene| {
                rasterizer
                    .render_png(&scene, thumbnail.width, thumbnail.height)
                    .map_err(|e| e.to_string())
            });

        let thumbnail_written = match rendered {
            Ok(png) => {
                store.save_thumbnail(id, &png_data_url(&png))?;
                self.thumbnails += 1;
                true
            }
            Err(e) => {
                log::warn!("Thumbnail for {} not updated: {}", id, e);
                false
            }
        };

        log::debug!("Saved {} ({} bytes)", id, snapshot.len());
        Ok(SaveReport { thumbnail_written })
    }
}

impl SceneListener for AutoSaveManager {
    fn scene_changed(&mut self, _change: SceneChange, _snapshot: &str, now: Instant) {
        self.schedule(now);
    }
}
