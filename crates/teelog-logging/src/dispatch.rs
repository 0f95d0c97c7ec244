//! Console/file tee.
//!
//! A [`Logger`] owns one [`BufferedFileSink`] and one console writer. Each
//! record is encoded once and handed to every sink whose minimum level it
//! meets. The console gets the line synchronously; the file sink buffers it.

use std::io::{self, Write};
use std::path::PathBuf;

use teelog_core::{LogLevel, LogRecord, encode};
use teelog_settings::LoggerSettings;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::errors::Result;
use crate::sink::{BufferedFileSink, SinkConfig};

/// Process logger: an encoder feeding a console writer and a file sink.
pub struct Logger {
    sink: BufferedFileSink,
    console: BoxMakeWriter,
    file_min_level: LogLevel,
    console_min_level: LogLevel,
}

impl Logger {
    /// Build a logger that writes console output to stdout.
    pub fn new(settings: &LoggerSettings) -> Result<Self> {
        Self::with_console(settings, io::stdout)
    }

    /// Build a logger with a custom console writer.
    ///
    /// Validates `settings` and creates the log file before returning.
    pub fn with_console<W>(settings: &LoggerSettings, console: W) -> Result<Self>
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        settings.validate()?;
        let sink = BufferedFileSink::open(SinkConfig::from_settings(settings))?;
        tracing::debug!(path = %sink.path().display(), "log file opened");
        Ok(Self {
            sink,
            console: BoxMakeWriter::new(console),
            file_min_level: settings.file_min_level,
            console_min_level: settings.console_min_level,
        })
    }

    /// Whether a record at `level` reaches at least one sink.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level()
    }

    /// The least severe level either sink accepts.
    pub fn min_level(&self) -> LogLevel {
        self.file_min_level.min(self.console_min_level)
    }

    /// Encode `record` and route it to the sinks that accept its level.
    ///
    /// Console write failures go to stderr. File write failures (only
    /// possible after [`close`](Self::close)) are dropped.
    pub fn log(&self, record: &LogRecord) {
        let to_console = record.level >= self.console_min_level;
        let to_file = record.level >= self.file_min_level;
        if !to_console && !to_file {
            return;
        }

        let line = encode(record);
        if to_console {
            let mut out = self.console.make_writer();
            if let Err(e) = out.write_all(&line).and_then(|()| out.flush()) {
                eprintln!("teelog: failed to write to console: {e}");
            }
        }
        if to_file {
            let _ = self.sink.write(&line);
        }
    }

    /// Flush buffered file output and persist it.
    pub fn sync(&self) -> Result<()> {
        self.sink.sync()?;
        Ok(())
    }

    /// Sync and release the file sink. Later file writes are dropped.
    pub fn close(&self) -> Result<()> {
        self.sink.close()?;
        Ok(())
    }

    /// Path of the current log file.
    pub fn file_path(&self) -> PathBuf {
        self.sink.path()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("sink", &self.sink)
            .field("file_min_level", &self.file_min_level)
            .field("console_min_level", &self.console_min_level)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use assert_matches::assert_matches;
    use teelog_core::CallSite;
    use teelog_settings::SettingsError;

    use super::*;
    use crate::errors::LoggingError;
    use crate::test_utils::CapturedConsole;

    fn settings(dir: &std::path::Path) -> LoggerSettings {
        let mut s = LoggerSettings::in_dir(dir, "svc");
        s.flush_interval_ms = 60_000;
        s
    }

    #[test]
    fn default_thresholds_split_by_level() {
        let tmp = tempfile::tempdir().unwrap();
        let console = CapturedConsole::new();
        let logger = Logger::with_console(&settings(tmp.path()), console.clone()).unwrap();

        logger.log(&LogRecord::new(LogLevel::Trace, "dropped"));
        logger.log(&LogRecord::new(LogLevel::Info, "file only"));
        logger.log(&LogRecord::new(LogLevel::Error, "both"));
        logger.sync().unwrap();

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("| ERROR | unknown | both"), "{}", lines[0]);

        let file = fs::read_to_string(logger.file_path()).unwrap();
        assert!(!file.contains("dropped"));
        assert!(file.contains("| INFO | unknown | file only\n"));
        assert!(file.contains("| ERROR | unknown | both\n"));
    }

    #[test]
    fn console_and_file_get_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = settings(tmp.path());
        s.console_min_level = LogLevel::Trace;
        let console = CapturedConsole::new();
        let logger = Logger::with_console(&s, console.clone()).unwrap();

        let record = LogRecord::new(LogLevel::Warn, "same")
            .with_call_site(CallSite::new("src/lib.rs", 3))
            .with_trace_id("t1")
            .with_field("k", 1);
        logger.log(&record);
        logger.sync().unwrap();

        assert_eq!(console.contents(), fs::read_to_string(logger.file_path()).unwrap());
    }

    #[test]
    fn enabled_uses_least_severe_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = settings(tmp.path());
        s.file_min_level = LogLevel::Warn;
        s.console_min_level = LogLevel::Fatal;
        let logger = Logger::with_console(&s, CapturedConsole::new()).unwrap();

        assert_eq!(logger.min_level(), LogLevel::Warn);
        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Panic));
    }

    #[test]
    fn fatal_reaches_console_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let console = CapturedConsole::new();
        let logger = Logger::with_console(&settings(tmp.path()), console.clone()).unwrap();
        logger.log(&LogRecord::new(LogLevel::Fatal, "down"));
        assert!(console.contents().contains("| FATAL | unknown | down\n"));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = settings(tmp.path());
        s.filename = String::new();
        let err = Logger::with_console(&s, CapturedConsole::new()).unwrap_err();
        assert_matches!(err, LoggingError::Settings(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn unwritable_dir_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let err = Logger::with_console(&settings(&blocker), CapturedConsole::new()).unwrap_err();
        assert_matches!(err, LoggingError::Io(_));
    }

    #[test]
    fn log_after_close_still_reaches_console() {
        let tmp = tempfile::tempdir().unwrap();
        let console = CapturedConsole::new();
        let logger = Logger::with_console(&settings(tmp.path()), console.clone()).unwrap();

        logger.log(&LogRecord::new(LogLevel::Error, "before"));
        logger.close().unwrap();
        logger.log(&LogRecord::new(LogLevel::Error, "after"));

        assert_eq!(console.lines().len(), 2);
        let file = fs::read_to_string(logger.file_path()).unwrap();
        assert!(file.contains("before"));
        assert!(!file.contains("after"));
        logger.close().unwrap();
    }
}
