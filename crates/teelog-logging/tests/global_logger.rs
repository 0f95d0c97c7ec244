//! The process-wide logger: init, level functions, tracing capture, panics.
//!
//! The global can only be installed once per process, so the whole
//! lifecycle runs as a single test.

use std::fs;
use std::panic;

use assert_matches::assert_matches;
use teelog_logging::test_utils::CapturedConsole;
use teelog_logging::{Field, LogLevel, Logger, LoggerSettings, LoggingError};

#[test]
fn global_lifecycle() {
    assert_matches!(teelog_logging::sync(), Err(LoggingError::NotInitialized));
    teelog_logging::info("before init is dropped");

    let tmp = tempfile::tempdir().unwrap();
    let settings = LoggerSettings::in_dir(tmp.path(), "global");
    let console = CapturedConsole::new();
    let logger = Logger::with_console(&settings, console.clone()).unwrap();
    teelog_logging::init_with_logger(logger, true).unwrap();
    teelog_logging::install_panic_hook();

    assert_matches!(
        teelog_logging::init(&settings),
        Err(LoggingError::AlreadyInitialized)
    );
    let spare = Logger::with_console(&settings, CapturedConsole::new()).unwrap();
    assert_matches!(
        teelog_logging::init_with_logger(spare, false),
        Err(LoggingError::AlreadyInitialized)
    );

    teelog_logging::trace("below threshold");
    teelog_logging::info_with_trace_id("req-1", "handled");
    teelog_logging::log_with_fields(
        LogLevel::Warn,
        "slow",
        [Field::new("ms", 250), Field::trace_id("req-2")],
    );
    tracing::info!(user = "bob", "from tracing");

    let raised = panic::catch_unwind(|| {
        teelog_logging::panic_with_trace_id("req-3", "explicit panic");
    });
    assert!(raised.is_err());
    let raised = panic::catch_unwind(|| {
        let empty: Vec<u8> = Vec::new();
        let _ = empty[usize::MAX / 2];
    });
    assert!(raised.is_err());

    teelog_logging::sync().unwrap();
    let path = teelog_logging::logger().unwrap().file_path();
    let file = fs::read_to_string(&path).unwrap();

    assert!(!file.contains("before init"));
    assert!(!file.contains("below threshold"));
    assert!(
        file.contains("| INFO | tests/global_logger.rs:"),
        "call site missing:\n{file}"
    );
    assert!(file.contains("| TRACE : req-1 | handled\n"));
    assert!(file.contains("| WARN | tests/global_logger.rs:"));
    assert!(file.contains("| TRACE : req-2 | slow ms=250\n"));
    assert!(file.contains("| from tracing user=\"bob\"\n"));

    let explicit: Vec<_> = file.lines().filter(|l| l.contains("explicit panic")).collect();
    assert_eq!(explicit.len(), 1, "{file}");
    assert!(explicit[0].contains("| PANIC | tests/global_logger.rs:"));
    assert!(explicit[0].contains("TRACE : req-3"));

    let uncaught: Vec<_> = file
        .lines()
        .filter(|l| l.contains("| PANIC |") && l.contains("index out of bounds"))
        .collect();
    assert_eq!(uncaught.len(), 1, "{file}");
    assert!(file.matches("\nSTACK : \n").count() >= 2);

    assert!(console.has_line("explicit panic"));
    assert!(!console.has_line("handled"));

    teelog_logging::close().unwrap();
    teelog_logging::error("after close");
    teelog_logging::close().unwrap();
    assert!(!fs::read_to_string(&path).unwrap().contains("after close"));
    assert!(console.has_line("after close"));
}
