#![deny(missing_docs)]
//! Shared logging utilities for the ranker workspace.
//!
//! This crate provides the `ranker_*` logging macros used across the codebase,
//! a poll tick counter that is stamped on every line, and a minimal test
//! initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log;

/// Log target shared by every `ranker_*` macro.
pub const TARGET: &str = "ranker";

static POLL_TICK: AtomicU64 = AtomicU64::new(0);

/// Records the most recent poll tick number.
/// Called by the poll scheduler each time it fires.
pub fn set_poll_tick(tick: u64) {
    POLL_TICK.store(tick, Ordering::Relaxed);
}

/// Returns the most recent poll tick number, 0 before the first tick.
pub fn poll_tick() -> u64 {
    POLL_TICK.load(Ordering::Relaxed)
}

/// Logs a trace-level message tagged with the current poll tick.
#[macro_export]
macro_rules! ranker_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!(target: $crate::TARGET, "[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current poll tick.
#[macro_export]
macro_rules! ranker_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!(target: $crate::TARGET, "[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current poll tick.
#[macro_export]
macro_rules! ranker_info {
    ($($arg:tt)*) => {{
        $crate::log::info!(target: $crate::TARGET, "[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current poll tick.
#[macro_export]
macro_rules! ranker_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!(target: $crate::TARGET, "[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current poll tick.
#[macro_export]
macro_rules! ranker_error {
    ($($arg:tt)*) => {{
        $crate::log::error!(target: $crate::TARGET, "[tick {}] {}", $crate::poll_tick(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
