//! Internal logging system for gl41mark
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for detailed ERROR logs
//! - One-shot flags for warnings that must not repeat every frame

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to capture benchmark diagnostics somewhere other than
/// stdout (a results file, a test buffer, ...).
///
/// # Example
///
/// ```no_run
/// use gl41mark_engine::gl41mark::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "gl41mark::scene::mrt", "gl41mark::glow")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Very verbose debug information
    Trace,

    /// Development/debugging information
    Debug,

    /// Informational messages (scene skipped, one-shot fallbacks)
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (load/setup failures with file:line details)
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used in formatted output
    pub fn tag(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Default logger implementation using colored console output
///
/// Colors:
/// - Trace: bright_black
/// - Debug: cyan
/// - Info: green
/// - Warn: yellow
/// - Error: red + bold
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Format an entry without color codes
    pub fn format_plain(entry: &LogEntry) -> String {
        let timestamp = Self::format_timestamp(entry.timestamp);
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                entry.severity.tag(),
                entry.source,
                entry.message,
                file,
                line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp,
                entry.severity.tag(),
                entry.source,
                entry.message
            ),
        }
    }

    fn format_timestamp(timestamp: SystemTime) -> String {
        // YYYY-MM-DD HH:MM:SS.mmm
        let datetime: DateTime<Local> = timestamp.into();
        datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let timestamp = Self::format_timestamp(entry.timestamp);

        let severity_str = match entry.severity {
            LogSeverity::Trace => entry.severity.tag().bright_black(),
            LogSeverity::Debug => entry.severity.tag().cyan(),
            LogSeverity::Info => entry.severity.tag().green(),
            LogSeverity::Warn => entry.severity.tag().yellow(),
            LogSeverity::Error => entry.severity.tag().red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

// ===== ONE-SHOT WARNINGS =====

/// Latch for diagnostics that must be emitted at most once
///
/// Per-frame fallbacks (map failure, sync timeout) would otherwise flood the
/// log for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnceFlag {
    fired: bool,
}

impl OnceFlag {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    /// Returns true the first time only
    pub fn first(&mut self) -> bool {
        let first = !self.fired;
        self.fired = true;
        first
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```ignore
/// engine_trace!("gl41mark::streaming", "slot {} acquired", idx);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::gl41mark::Engine::log(
            $crate::gl41mark::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```ignore
/// engine_debug!("gl41mark::scene::mrt", "recreating {} targets", count);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::gl41mark::Engine::log(
            $crate::gl41mark::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
///
/// # Example
///
/// ```ignore
/// engine_info!("gl41mark::scene::instancing", "disabled in legacy profile");
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::gl41mark::Engine::log(
            $crate::gl41mark::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
///
/// # Example
///
/// ```ignore
/// engine_warn!("gl41mark::streaming", "sync wait exceeded, forcing glFinish");
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::gl41mark::Engine::log(
            $crate::gl41mark::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```ignore
/// engine_error!("gl41mark::scene::mrt", "link: {}", log);
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::gl41mark::Engine::log_detailed(
            $crate::gl41mark::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
