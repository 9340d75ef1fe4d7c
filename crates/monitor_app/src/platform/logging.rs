//! Where the monitor's log records go.
//!
//! The dashboard redraws the whole terminal, so the default sink is a file
//! next to the working directory; `--log terminal` is meant for debugging.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogDestination {
    /// Only the log file.
    File,
    /// Only the terminal; warnings and errors go to stderr.
    Terminal,
    /// Log file and terminal.
    Both,
}

impl LogDestination {
    fn to_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Installs the global logger. The log file, if used, is truncated.
///
/// A log file that cannot be created is reported on stderr and skipped.
pub fn initialize(destination: LogDestination, log_path: &Path) {
    let level = LevelFilter::Info;
    let config = record_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);
    if destination.to_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if destination.to_file() {
        match open_log_file(log_path) {
            Some(file) => loggers.push(WriteLogger::new(level, config, file)),
            None => eprintln!("Warning: logging to {} is disabled", log_path.display()),
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

/// RFC 3339 timestamps; module targets only on errors.
fn record_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn open_log_file(log_path: &Path) -> Option<File> {
    File::create(log_path)
        .map_err(|err| eprintln!("Warning: cannot create {}: {err}", log_path.display()))
        .ok()
}
