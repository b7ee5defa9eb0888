//! Shell command parsing and help.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use inkleaf_core::{Key, ToolKind};
use kurbo::Point;
use std::path::PathBuf;
use thiserror::Error;

/// Command parse errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Rejected by the argument parser. Renders its own `error:` prefix and usage.
    #[error("{0}")]
    Parse(#[from] clap::Error),
    #[error("Coordinates must come in x y pairs")]
    UnpairedCoordinates,
}

/// Zoom direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Zoom {
    In,
    Out,
    Reset,
}

/// One line of shell input. The first word names the command.
#[derive(Debug, Parser)]
#[command(name = "inkleaf", multicall = true, disable_help_subcommand = true)]
#[command(help_template = "Commands:\n{subcommands}")]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// Shell commands.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List documents with thumbnail status
    #[command(alias = "ls")]
    List,
    /// Create a document and open it
    New {
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Open a document
    Open {
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Delete a document and its thumbnail
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Save and return to the library
    #[command(alias = "close")]
    Library,
    /// Select a tool (none, pencil, highlight, erase, text)
    Tool {
        #[arg(value_parser = parse_tool)]
        tool: ToolKind,
    },
    /// Cycle the palette color
    Color,
    /// Pointer press at screen coordinates
    Down {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Pointer move to screen coordinates
    Move {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Pointer release at screen coordinates
    Up {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Pointer down, moves and up along `x y` or `x,y` points
    Stroke {
        #[arg(required = true, value_delimiter = ',', allow_negative_numbers = true)]
        coords: Vec<f64>,
    },
    /// Type into the text being edited
    Type {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Single key press (backspace, delete, enter, escape or one character)
    Key {
        #[arg(value_parser = parse_key, allow_hyphen_values = true)]
        key: Key,
    },
    /// Step back through history
    Undo,
    /// Step forward through history
    Redo,
    /// Import an image as a new worksheet
    Import { path: PathBuf },
    /// Open a directory of page images
    Pages { dir: PathBuf },
    /// Show the next page
    Next,
    /// Show the previous page
    Prev,
    /// Toggle the background lock
    Lock,
    /// Change zoom
    Zoom {
        #[arg(value_enum, ignore_case = true)]
        zoom: Zoom,
    },
    /// Export the worksheet as PNG
    Export { path: PathBuf },
    /// Save now
    Save,
    /// Let time pass, then run pending autosaves
    Wait { ms: u64 },
    /// Show the editor state
    Status,
    /// Show this list
    #[command(alias = "?")]
    Help,
    /// Save and exit
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn from_line(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let command = Line::try_parse_from(line.split_whitespace())?.command;
        if let Command::Stroke { coords } = &command {
            if coords.len() % 2 != 0 {
                return Err(CommandError::UnpairedCoordinates);
            }
        }
        Ok(Some(command))
    }
}

/// Join the words of a multi-word argument.
pub fn joined(words: &[String]) -> String {
    words.join(" ")
}

/// Pair up stroke coordinates.
pub fn points(coords: &[f64]) -> Vec<Point> {
    coords.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1])).collect()
}

fn parse_tool(name: &str) -> Result<ToolKind, String> {
    ToolKind::from_name(name).ok_or_else(|| format!("unknown tool `{}`", name))
}

fn parse_key(name: &str) -> Result<Key, String> {
    match name.to_lowercase().as_str() {
        "backspace" => Ok(Key::Backspace),
        "delete" | "del" => Ok(Key::Delete),
        "enter" | "return" => Ok(Key::Enter),
        "escape" | "esc" => Ok(Key::Escape),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Key::Char(c)),
                _ => Err(format!("unknown key `{}`", name)),
            }
        }
    }
}

/// Format the command list for display.
pub fn help_text() -> String {
    Line::command().render_help().to_string()
}
