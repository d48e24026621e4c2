use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::PreflightError;

/// How much the stderr layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Spinners own the terminal; no log output.
    Silent,
    /// `RUST_LOG`, defaulting to warnings.
    Normal,
    Verbose,
}

pub fn terminal_filter(verbosity: Verbosity) -> EnvFilter {
    match verbosity {
        Verbosity::Silent => EnvFilter::new("off"),
        Verbosity::Normal => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pvecheck=warn"))
        }
        Verbosity::Verbose => EnvFilter::new("pvecheck=debug"),
    }
}

/// Install the global subscriber: stderr, plus an optional debug log file.
pub fn init(verbosity: Verbosity, log_file: Option<&Path>) -> Result<(), PreflightError> {
    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter(verbosity));

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log(path).map_err(|source| PreflightError::LogFile {
                path: path.display().to_string(),
                source,
            })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("pvecheck=debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn open_log(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
