#![deny(missing_docs)]
//! Shared logging utilities for the dashboard workspace.
//!
//! This crate provides the `dash_*` logging macros used across the codebase,
//! a run-scoped log prefix and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Run id that log lines on this thread belong to; 0 when outside a run.
    static CURRENT_RUN: Cell<u64> = const { Cell::new(0) };
}

/// Marks the current thread as executing a pipeline run until dropped.
///
/// Scopes nest: dropping restores whatever run was current before.
pub struct RunScope {
    previous: u64,
}

impl RunScope {
    /// Enters the scope of `run_id` on the current thread.
    pub fn enter(run_id: u64) -> Self {
        let previous = CURRENT_RUN.with(|v| v.replace(run_id));
        Self { previous }
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        CURRENT_RUN.with(|v| v.set(self.previous));
    }
}

/// Retrieves the run id of the current thread, if inside a [`RunScope`].
pub fn current_run() -> Option<u64> {
    CURRENT_RUN.with(|v| match v.get() {
        0 => None,
        run_id => Some(run_id),
    })
}

/// Prefix prepended by the `dash_*` macros: `"[run N] "` inside a run, empty otherwise.
pub fn run_prefix() -> String {
    current_run()
        .map(|run_id| format!("[run {run_id}] "))
        .unwrap_or_default()
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dash_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dash_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dash_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dash_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dash_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
