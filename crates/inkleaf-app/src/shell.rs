//! Command-driven editor shell.

use crate::command::{Command, CommandError, Zoom, help_text, joined, points};
use crate::pages::DirectoryPages;
use inkleaf_core::clock::Duration;
use inkleaf_core::storage::{FileStore, KeyValueStore, StorageError, default_data_dir};
use inkleaf_core::{
    CONFIG_FILE_NAME, ConfigError, Controller, EditorConfig, Key, Notice, Rasterizer,
    SessionError, SystemClock, View,
};
use inkleaf_render::CpuRasterizer;
use kurbo::Point;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shell errors.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Shell configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub data_dir: PathBuf,
    pub editor: EditorConfig,
}

impl ShellConfig {
    /// Resolve the data directory and load `inkleaf.json` from it.
    ///
    /// `data_dir` overrides the platform default. A `data_dir` set in the
    /// configuration file moves the document store.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self, ShellError> {
        let base = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Self::load_from(&base)
    }

    /// Load the configuration from `base`.
    pub fn load_from(base: &Path) -> Result<Self, ShellError> {
        let editor = EditorConfig::load_from_path(&base.join(CONFIG_FILE_NAME))?;
        let data_dir = editor.data_dir.clone().unwrap_or_else(|| base.to_path_buf());
        Ok(Self { data_dir, editor })
    }

    /// Directory holding the key-value entries.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

/// Interactive shell over a [`Controller`].
pub struct Shell<S: KeyValueStore, R: Rasterizer> {
    controller: Controller<S, R>,
    sleep: Box<dyn Fn(Duration)>,
}

impl Shell<FileStore, CpuRasterizer> {
    /// Shell on file storage with the wall clock.
    pub fn open(config: ShellConfig) -> Result<Self, ShellError> {
        let store = FileStore::new(config.store_dir())?;
        log::info!("Using storage at {:?}", store.base_path());
        let controller = Controller::startup(
            store,
            CpuRasterizer::new(),
            Box::new(SystemClock),
            config.editor,
        )?;
        Ok(Self::new(controller, Box::new(std::thread::sleep)))
    }
}

impl<S: KeyValueStore, R: Rasterizer> Shell<S, R> {
    /// Wrap a controller. `sleep` lets time pass for `wait`.
    pub fn new(controller: Controller<S, R>, sleep: Box<dyn Fn(Duration)>) -> Self {
        Self { controller, sleep }
    }

    pub fn controller(&self) -> &Controller<S, R> {
        &self.controller
    }

    /// Read commands until `quit` or end of input. Pending changes are saved
    /// before returning.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<(), ShellError> {
        writeln!(out, "Inkleaf ({}). Type `help` for commands.", self.controller.owner())?;
        for line in input.lines() {
            let line = line?;
            self.controller.tick();
            let flow = match Command::from_line(&line) {
                Ok(Some(command)) => match self.execute(command, out) {
                    Ok(flow) => flow,
                    Err(e) => {
                        writeln!(out, "error: {}", e)?;
                        Flow::Continue
                    }
                },
                Ok(None) => Flow::Continue,
                // Includes clap's own `error:` prefix, or the help for `-h`
                Err(CommandError::Parse(e)) => {
                    write!(out, "{}", e)?;
                    Flow::Continue
                }
                Err(e) => {
                    writeln!(out, "error: {}", e)?;
                    Flow::Continue
                }
            };
            self.report_notices(out)?;
            if flow == Flow::Quit {
                break;
            }
        }
        self.controller.flush();
        self.report_notices(out)?;
        Ok(())
    }

    /// Execute one command.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, ShellError> {
        let c = &mut self.controller;
        match command {
            Command::List => {
                let entries = c.library()?;
                if entries.is_empty() {
                    writeln!(out, "(no documents)")?;
                }
                for entry in entries {
                    let thumb = if entry.thumbnail.is_some() { "thumbnail" } else { "no thumbnail" };
                    writeln!(out, "{} ({})", entry.name, thumb)?;
                }
            }
            Command::New { name } => {
                let name = joined(&name);
                c.create_new_doc(&name)?;
                writeln!(out, "Created {}", name)?;
            }
            Command::Open { name } => {
                let name = joined(&name);
                c.load_doc(&name)?;
                writeln!(out, "Opened {} ({} objects)", name, c.scene().len())?;
            }
            Command::Delete { name } => {
                let name = joined(&name);
                c.delete_doc(&name)?;
                writeln!(out, "Deleted {}", name)?;
            }
            Command::Library => c.show_library(),
            Command::Tool { tool } => c.select_tool(tool),
            Command::Color => {
                c.cycle_color();
                writeln!(out, "Color {}", c.session().current_color().to_css())?;
            }
            Command::Down { x, y } => c.pointer_down(Point::new(x, y)),
            Command::Move { x, y } => c.pointer_move(Point::new(x, y)),
            Command::Up { x, y } => c.pointer_up(Point::new(x, y)),
            Command::Stroke { coords } => {
                let points = points(&coords);
                if let Some((first, rest)) = points.split_first() {
                    c.pointer_down(*first);
                    for point in rest {
                        c.pointer_move(*point);
                    }
                    c.pointer_up(*rest.last().unwrap_or(first));
                }
            }
            Command::Type { text } => {
                for ch in joined(&text).chars() {
                    c.key(Key::Char(ch));
                }
            }
            Command::Key { key } => c.key(key),
            Command::Undo => c.undo(),
            Command::Redo => c.redo(),
            Command::Import { path } => {
                let bytes = std::fs::read(&path)?;
                if c.import_image(bytes) {
                    writeln!(out, "Imported {:?}", path)?;
                }
            }
            Command::Pages { dir } => {
                let pages = DirectoryPages::open(&dir).map_err(SessionError::from)?;
                if c.open_paged_document(Box::new(pages)) {
                    write_page(c, out)?;
                }
            }
            Command::Next => {
                c.next_page();
                write_page(c, out)?;
            }
            Command::Prev => {
                c.prev_page();
                write_page(c, out)?;
            }
            Command::Lock => {
                let locked = c.toggle_background_lock();
                writeln!(out, "Background {}", if locked { "locked" } else { "unlocked" })?;
            }
            Command::Zoom { zoom } => {
                match zoom {
                    Zoom::In => c.zoom_in(),
                    Zoom::Out => c.zoom_out(),
                    Zoom::Reset => c.reset_zoom(),
                }
                writeln!(out, "Zoom {}%", c.session().viewport.zoom_percent())?;
            }
            Command::Export { path } => {
                let png = c.export_png()?;
                std::fs::write(&path, &png)?;
                writeln!(out, "Exported {:?} ({} bytes)", path, png.len())?;
            }
            Command::Save => {
                if c.save_now().is_some() {
                    writeln!(out, "Saved")?;
                }
            }
            Command::Wait { ms } => {
                (self.sleep)(Duration::from_millis(ms));
                if c.tick().is_some() {
                    writeln!(out, "Autosaved")?;
                }
            }
            Command::Status => self.write_status(out)?,
            Command::Help => write!(out, "{}", help_text())?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn write_status(&self, out: &mut impl Write) -> Result<(), ShellError> {
        let c = &self.controller;
        match (c.view(), c.active_document()) {
            (View::Editor, Some(id)) => {
                let session = c.session();
                writeln!(
                    out,
                    "Editing {}: {} objects, background {}, tool {:?}, color {}, zoom {}%, undo {}/{}",
                    id.name(),
                    c.scene().len(),
                    match (&c.scene().background, session.background_locked) {
                        (None, _) => "none",
                        (Some(_), true) => "locked",
                        (Some(_), false) => "unlocked",
                    },
                    session.tools.kind(),
                    session.current_color().to_css(),
                    session.viewport.zoom_percent(),
                    c.history().cursor(),
                    c.history().len().saturating_sub(1),
                )?;
            }
            _ => writeln!(out, "Library")?,
        }
        Ok(())
    }

    fn report_notices(&mut self, out: &mut impl Write) -> Result<(), ShellError> {
        for notice in self.controller.take_notices() {
            match notice {
                Notice::MalformedDocument(name) => {
                    writeln!(out, "warning: {} could not be read and was opened empty", name)?
                }
                Notice::ImportFailed(reason) => writeln!(out, "warning: import failed: {}", reason)?,
                Notice::SaveFailed(reason) => writeln!(out, "warning: save failed: {}", reason)?,
            }
        }
        Ok(())
    }
}

fn write_page<S: KeyValueStore, R: Rasterizer>(
    c: &Controller<S, R>,
    out: &mut impl Write,
) -> Result<(), ShellError> {
    if let Some(pages) = c.session().pages {
        writeln!(out, "Page {}/{}", pages.page(), pages.count())?;
    }
    Ok(())
}
