use super::*;
use std::sync::{Arc, Mutex};

/// Test logger that captures entries instead of printing them
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// Severity tests
// ============================================================================

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5, "label {:?}", severity);
    }
}

// ============================================================================
// Logger trait tests
// ============================================================================

#[test]
fn test_custom_logger_receives_entries() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let logger = CaptureLogger {
        entries: entries.clone(),
    };

    logger.log(&LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "hello".to_string(),
        file: None,
        line: None,
    });

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].source, "nova3d::test");
    assert_eq!(captured[0].message, "hello");
    assert_eq!(captured[0].severity, LogSeverity::Info);
}

#[test]
fn test_error_entry_carries_file_and_line() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    let logger = CaptureLogger {
        entries: entries.clone(),
    };

    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "boom".to_string(),
        file: Some("frame_graph.rs"),
        line: Some(17),
    });

    let captured = entries.lock().unwrap();
    assert_eq!(captured[0].file, Some("frame_graph.rs"));
    assert_eq!(captured[0].line, Some(17));
}

#[test]
fn test_default_logger_does_not_panic() {
    // Smoke test: DefaultLogger prints to stdout without panicking
    DefaultLogger.log(&LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "nova3d::test".to_string(),
        message: "warning message".to_string(),
        file: None,
        line: None,
    });
}
