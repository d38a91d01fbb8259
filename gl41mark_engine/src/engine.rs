/// gl41mark Engine - process-wide logging hub
///
/// Scenes and the streaming synchronizer report diagnostics through this
/// singleton. The logger is stored in thread-safe static storage and can be
/// swapped at runtime (tests install a capturing logger).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entries below this severity are dropped before reaching the logger
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(0);

fn severity_rank(severity: LogSeverity) -> u8 {
    match severity {
        LogSeverity::Trace => 0,
        LogSeverity::Debug => 1,
        LogSeverity::Info => 2,
        LogSeverity::Warn => 3,
        LogSeverity::Error => 4,
    }
}

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== PUBLIC API =====

/// Engine logging singleton
///
/// # Example
///
/// ```no_run
/// use gl41mark_engine::gl41mark::Engine;
/// use gl41mark_engine::gl41mark::log::LogSeverity;
///
/// Engine::set_min_severity(LogSeverity::Info);
/// Engine::log(LogSeverity::Info, "gl41mark::driver", "starting".to_string());
/// ```
pub struct Engine;

impl Engine {
    /// Set a custom logger
    ///
    /// Replaces the current logger. The previous logger is dropped.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gl41mark_engine::gl41mark::Engine;
    /// use gl41mark_engine::gl41mark::log::{Logger, LogEntry};
    ///
    /// struct QuietLogger;
    /// impl Logger for QuietLogger {
    ///     fn log(&self, _entry: &LogEntry) {}
    /// }
    ///
    /// Engine::set_logger(QuietLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger) and clear the severity filter
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
        MIN_SEVERITY.store(0, Ordering::Relaxed);
    }

    /// Drop every entry below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity_rank(severity), Ordering::Relaxed);
    }

    /// Whether an entry of this severity would reach the logger
    pub fn is_enabled(severity: LogSeverity) -> bool {
        severity_rank(severity) >= MIN_SEVERITY.load(Ordering::Relaxed)
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "gl41mark::scene::mrt")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level (typically Error)
    /// * `source` - Source module
    /// * `message` - Log message
    /// * `file` - Source file path
    /// * `line` - Source line number
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if !Self::is_enabled(entry.severity) {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
