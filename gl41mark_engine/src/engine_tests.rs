//! Unit tests for the Engine logging hub
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::gl41mark::Engine;
use crate::gl41mark::log::{LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures entries from the "gl41mark::test" source only
///
/// Other unit tests log concurrently through the same global logger.
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "gl41mark::test" {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.push(format!("{:?}: {}", entry.severity, entry.message));
    }
}

// ============================================================================
// LOGGER ROUTING TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_routes_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Info, "gl41mark::test", "hello".to_string());
    crate::engine_warn!("gl41mark::test", "warned {}", 3);

    Engine::reset_logger();

    let captured = entries.lock().unwrap();
    assert_eq!(captured.as_slice(), ["Info: hello", "Warn: warned 3"]);
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::log(LogSeverity::Info, "gl41mark::test", "one".to_string());
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "gl41mark::test", "two".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
#[serial]
fn test_engine_error_macro_carries_location() {
    struct LocationLogger {
        seen: Arc<Mutex<Option<(Option<&'static str>, Option<u32>)>>>,
    }
    impl Logger for LocationLogger {
        fn log(&self, entry: &LogEntry) {
            if entry.source == "gl41mark::test::location" {
                *self.seen.lock().unwrap() = Some((entry.file, entry.line));
            }
        }
    }

    let seen = Arc::new(Mutex::new(None));
    Engine::set_logger(LocationLogger { seen: seen.clone() });
    crate::engine_error!("gl41mark::test::location", "boom");
    Engine::reset_logger();

    let (file, line) = seen.lock().unwrap().unwrap();
    assert!(file.unwrap().ends_with("engine_tests.rs"));
    assert!(line.unwrap() > 0);
}

// ============================================================================
// SEVERITY FILTER TESTS
// ============================================================================

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);

    assert!(!Engine::is_enabled(LogSeverity::Info));
    assert!(Engine::is_enabled(LogSeverity::Error));

    Engine::log(LogSeverity::Debug, "gl41mark::test", "dropped".to_string());
    Engine::log(LogSeverity::Info, "gl41mark::test", "dropped".to_string());
    Engine::log(LogSeverity::Warn, "gl41mark::test", "kept".to_string());
    Engine::log(LogSeverity::Error, "gl41mark::test", "kept".to_string());

    Engine::reset_logger();

    assert_eq!(entries.lock().unwrap().len(), 2);
    assert!(Engine::is_enabled(LogSeverity::Trace));
}
