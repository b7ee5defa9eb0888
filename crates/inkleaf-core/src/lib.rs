//! Inkleaf Core Library
//!
//! Platform-agnostic document session model for the Inkleaf worksheet
//! annotator: tools, undo history, autosave and the document library.

pub mod autosave;
pub mod clock;
pub mod config;
pub mod controller;
pub mod events;
pub mod history;
pub mod identity;
pub mod import;
pub mod raster;
pub mod scene;
pub mod session;
pub mod shapes;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use autosave::{AutoSaveManager, SaveReport, ThumbnailSize};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EditorConfig, CONFIG_FILE_NAME};
pub use controller::{Controller, Key, LibraryEntry, Notice, SessionError, View};
pub use events::{SceneChange, SceneListener};
pub use history::History;
pub use identity::DeviceIdentity;
pub use import::{ImportError, ImportTicket, PageCursor, PageRenderer};
pub use raster::{ImageInfo, RasterError, Rasterizer};
pub use scene::{Hit, Scene, SceneError};
pub use session::Session;
pub use tools::{ToolKind, ToolMachine, ToolState};
pub use viewport::Viewport;
