//! An explicit `panic` before the hook is installed must not hide the next
//! uncaught panic on the same thread.

use std::fs;
use std::panic;

use teelog_logging::test_utils::CapturedConsole;
use teelog_logging::{Logger, LoggerSettings};

#[test]
fn explicit_panic_before_hook_does_not_swallow_next_panic() {
    let tmp = tempfile::tempdir().unwrap();
    let settings = LoggerSettings::in_dir(tmp.path(), "hook");
    let logger = Logger::with_console(&settings, CapturedConsole::new()).unwrap();
    teelog_logging::init_with_logger(logger, false).unwrap();

    let raised = panic::catch_unwind(|| {
        teelog_logging::panic("early");
    });
    assert!(raised.is_err());

    teelog_logging::install_panic_hook();
    let raised = panic::catch_unwind(|| {
        let v: Vec<u8> = vec![1, 2, 3];
        let idx = v.len() + 4;
        let _ = v[idx];
    });
    assert!(raised.is_err());

    let raised = panic::catch_unwind(|| {
        teelog_logging::panic("late");
    });
    assert!(raised.is_err());

    teelog_logging::sync().unwrap();
    let file = fs::read_to_string(teelog_logging::logger().unwrap().file_path()).unwrap();
    let panics: Vec<_> = file.lines().filter(|l| l.contains("| PANIC |")).collect();

    assert_eq!(panics.len(), 3, "{file}");
    assert!(panics[0].ends_with("| early"));
    assert!(panics[1].contains("index out of bounds"), "{file}");
    assert!(panics[2].ends_with("| late"));
}
