//! Inkleaf Application
//!
//! Command-driven shell wiring file storage, the CPU rasterizer and the wall
//! clock around the document session controller.

mod command;
mod pages;
mod shell;

pub use command::{Command, CommandError, Zoom, help_text};
pub use pages::DirectoryPages;
pub use shell::{Flow, Shell, ShellConfig, ShellError};
