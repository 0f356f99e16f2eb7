//! Public surface for the bug tracker.
//!
//! This crate re-exports the building blocks and provides a small logging
//! helper so the `serve` and `tui` commands set up output the same way.

/// Re-export for convenience.
pub use bugtracker_rs_config as config;
/// Re-export for convenience.
pub use bugtracker_rs_protocol as protocol;
pub use bugtracker_rs_server as server;
/// Re-export for convenience.
pub use bugtracker_rs_store as store;
pub use bugtracker_rs_tui as tui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

/// Env var naming a file the TUI writes its log to.
pub const ENV_LOG_FILE: &str = "BUGTRACKER_LOG_FILE";

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File(PathBuf),
    /// Nothing is logged; used when the terminal belongs to the TUI.
    Disabled,
}

impl LogOutput {
    /// Pick the output for a command. The TUI owns the terminal, so it only
    /// logs when a file is given.
    pub fn for_command(interactive: bool, log_file: Option<PathBuf>) -> Self {
        match (log_file, interactive) {
            (Some(path), _) => LogOutput::File(path),
            (None, true) => LogOutput::Disabled,
            (None, false) => LogOutput::Stderr,
        }
    }
}

/// Initialize `env_logger` with millisecond timestamps and `RUST_LOG` parsing.
///
/// Calling this twice is harmless; the second call keeps the first logger.
pub fn init_logging(output: LogOutput) -> io::Result<()> {
    let mut builder = env_logger::builder();
    builder.format_timestamp_millis().parse_default_env();
    match output {
        LogOutput::Stderr => {}
        LogOutput::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        LogOutput::Disabled => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
    Ok(())
}
