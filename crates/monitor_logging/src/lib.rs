#![deny(missing_docs)]
//! Logging front door for the monitor crates.
//!
//! Every crate logs through the `monitor_*` macros, which forward to the
//! `log` facade; the binary decides where records end up. Tests call
//! [`initialize_for_tests`] to see core and engine output on the terminal.

use std::sync::Once;

use log::LevelFilter;

/// Forwards to [`log::trace!`].
#[macro_export]
macro_rules! monitor_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Forwards to [`log::debug!`]. Used for per-poll chatter.
#[macro_export]
macro_rules! monitor_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Forwards to [`log::info!`]. Lifecycle transitions log at this level.
#[macro_export]
macro_rules! monitor_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Forwards to [`log::warn!`].
#[macro_export]
macro_rules! monitor_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Forwards to [`log::error!`].
#[macro_export]
macro_rules! monitor_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Installs a terminal logger the first time it is called.
///
/// Later calls return immediately. If some other logger is already
/// installed it stays in place.
pub fn initialize_for_tests() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

        let _ = TermLogger::init(
            test_level(),
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        );
    });
}

fn test_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
