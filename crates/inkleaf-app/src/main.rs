//! Main application entry point (native).

use clap::Parser;
use inkleaf_app::{Shell, ShellConfig};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "inkleaf")]
#[command(about = "Inkleaf - worksheet annotator shell")]
#[command(version)]
struct Cli {
    /// Directory holding `inkleaf.json` and the document store
    #[arg(long, env = "INKLEAF_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Inkleaf");

    let result = ShellConfig::load(cli.data_dir)
        .and_then(Shell::open)
        .and_then(|mut shell| shell.run(io::stdin().lock(), &mut io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("inkleaf: {}", e);
            ExitCode::FAILURE
        }
    }
}
