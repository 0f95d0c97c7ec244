//! Process-wide logger.
//!
//! [`init`] installs one [`Logger`] for the whole process. The level
//! functions below log through it and record their caller's location. Before
//! `init` they do nothing.
//!
//! ```no_run
//! let settings = teelog_settings::LoggerSettings::in_dir("/tmp/logs", "svc");
//! teelog_logging::init(&settings)?;
//! teelog_logging::install_panic_hook();
//!
//! teelog_logging::info("service started");
//! teelog_logging::warn_with_trace_id("req-42", "slow upstream");
//! tracing::info!(port = 8080, "listening");
//!
//! teelog_logging::sync()?;
//! # Ok::<(), teelog_logging::LoggingError>(())
//! ```

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fmt::Display;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use teelog_core::{CallSite, Field, LogLevel, LogRecord};
use teelog_settings::LoggerSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::dispatch::Logger;
use crate::errors::{LoggingError, Result};
use crate::layer::TeeLayer;

static LOGGER: OnceLock<Arc<Logger>> = OnceLock::new();

/// Whether [`install_panic_hook`] has run.
static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    /// Set by [`panic`] so the panic hook skips the panic it already logged.
    /// Only set while the hook is installed, since the hook is what clears it.
    static PANIC_LOGGED: Cell<bool> = const { Cell::new(false) };
}

/// Build the process logger from `settings` and install it.
///
/// With `settings.capture_tracing`, `tracing` events are routed through the
/// logger too (unless another global subscriber is already set).
pub fn init(settings: &LoggerSettings) -> Result<()> {
    if LOGGER.get().is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }
    let logger = Logger::new(settings)?;
    init_with_logger(logger, settings.capture_tracing)
}

/// Install an already built logger.
pub fn init_with_logger(logger: Logger, capture_tracing: bool) -> Result<()> {
    let logger = Arc::new(logger);
    LOGGER
        .set(Arc::clone(&logger))
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    if capture_tracing {
        if let Err(e) = tracing_subscriber::registry()
            .with(TeeLayer::new(logger))
            .try_init()
        {
            eprintln!("teelog: tracing events not captured: {e}");
        }
    }
    Ok(())
}

/// Load settings (file + `LOGGER_*` environment) and [`init`].
pub fn init_from_env() -> Result<()> {
    let settings = teelog_settings::load_settings()?;
    init(&settings)
}

/// The installed logger, if any.
pub fn logger() -> Option<&'static Arc<Logger>> {
    LOGGER.get()
}

/// Flush and persist buffered file output.
pub fn sync() -> Result<()> {
    LOGGER.get().ok_or(LoggingError::NotInitialized)?.sync()
}

/// Sync and release the log file. Later file writes are dropped.
pub fn close() -> Result<()> {
    LOGGER.get().ok_or(LoggingError::NotInitialized)?.close()
}

fn emit(level: LogLevel, build: impl FnOnce() -> LogRecord) {
    if let Some(logger) = LOGGER.get() {
        if logger.enabled(level) {
            logger.log(&build());
        }
    }
}

fn emit_message(level: LogLevel, site: CallSite, trace_id: Option<&str>, message: &dyn Display) {
    emit(level, || {
        let record = LogRecord::new(level, message.to_string()).with_call_site(site);
        match trace_id {
            Some(id) => record.with_trace_id(id),
            None => record,
        }
    });
}

/// Log at `Trace`.
#[track_caller]
pub fn trace(message: impl Display) {
    emit_message(LogLevel::Trace, CallSite::caller(), None, &message);
}

/// Log at `Debug`.
#[track_caller]
pub fn debug(message: impl Display) {
    emit_message(LogLevel::Debug, CallSite::caller(), None, &message);
}

/// Log at `Info`.
#[track_caller]
pub fn info(message: impl Display) {
    emit_message(LogLevel::Info, CallSite::caller(), None, &message);
}

/// Log at `Warn`.
#[track_caller]
pub fn warn(message: impl Display) {
    emit_message(LogLevel::Warn, CallSite::caller(), None, &message);
}

/// Log at `Error`.
#[track_caller]
pub fn error(message: impl Display) {
    emit_message(LogLevel::Error, CallSite::caller(), None, &message);
}

/// Log at `Trace` with a trace id.
#[track_caller]
pub fn trace_with_trace_id(trace_id: &str, message: impl Display) {
    emit_message(LogLevel::Trace, CallSite::caller(), Some(trace_id), &message);
}

/// Log at `Debug` with a trace id.
#[track_caller]
pub fn debug_with_trace_id(trace_id: &str, message: impl Display) {
    emit_message(LogLevel::Debug, CallSite::caller(), Some(trace_id), &message);
}

/// Log at `Info` with a trace id.
#[track_caller]
pub fn info_with_trace_id(trace_id: &str, message: impl Display) {
    emit_message(LogLevel::Info, CallSite::caller(), Some(trace_id), &message);
}

/// Log at `Warn` with a trace id.
#[track_caller]
pub fn warn_with_trace_id(trace_id: &str, message: impl Display) {
    emit_message(LogLevel::Warn, CallSite::caller(), Some(trace_id), &message);
}

/// Log at `Error` with a trace id.
#[track_caller]
pub fn error_with_trace_id(trace_id: &str, message: impl Display) {
    emit_message(LogLevel::Error, CallSite::caller(), Some(trace_id), &message);
}

/// Log at any level with structured fields, in the given order.
#[track_caller]
pub fn log_with_fields(
    level: LogLevel,
    message: impl Display,
    fields: impl IntoIterator<Item = Field>,
) {
    let site = CallSite::caller();
    emit(level, || {
        let mut record = LogRecord::new(level, message.to_string()).with_call_site(site);
        record.fields.extend(fields);
        record
    });
}

/// Log at `Panic` with a backtrace, sync, then panic with `message`.
#[track_caller]
pub fn panic(message: impl Display) -> ! {
    log_and_panic(CallSite::caller(), None, message.to_string())
}

/// [`panic`] with a trace id.
#[track_caller]
pub fn panic_with_trace_id(trace_id: &str, message: impl Display) -> ! {
    log_and_panic(CallSite::caller(), Some(trace_id), message.to_string())
}

/// Log at `Fatal` with a backtrace, sync, then exit with status 1.
#[track_caller]
pub fn fatal(message: impl Display) -> ! {
    log_and_exit(CallSite::caller(), None, &message.to_string())
}

/// [`fatal`] with a trace id.
#[track_caller]
pub fn fatal_with_trace_id(trace_id: &str, message: impl Display) -> ! {
    log_and_exit(CallSite::caller(), Some(trace_id), &message.to_string())
}

/// Log a terminal record with a backtrace and sync. Returns whether a logger
/// took it.
fn log_terminal(
    level: LogLevel,
    site: Option<CallSite>,
    trace_id: Option<&str>,
    message: &str,
) -> bool {
    let Some(logger) = LOGGER.get() else {
        return false;
    };
    let mut record =
        LogRecord::new(level, message).with_stack(Backtrace::force_capture().to_string());
    record.call_site = site;
    if let Some(id) = trace_id {
        record = record.with_trace_id(id);
    }
    logger.log(&record);
    if let Err(e) = logger.sync() {
        eprintln!("teelog: failed to sync log file: {e}");
    }
    true
}

#[track_caller]
fn log_and_panic(site: CallSite, trace_id: Option<&str>, message: String) -> ! {
    let logged = log_terminal(LogLevel::Panic, Some(site), trace_id, &message);
    if logged && HOOK_INSTALLED.load(Ordering::Acquire) {
        PANIC_LOGGED.with(|logged| logged.set(true));
    }
    std::panic::panic_any(message)
}

fn log_and_exit(site: CallSite, trace_id: Option<&str>, message: &str) -> ! {
    let _ = log_terminal(LogLevel::Fatal, Some(site), trace_id, message);
    std::process::exit(1)
}

/// Log uncaught panics at `Panic` level, then run the previous hook.
///
/// Panics raised through [`panic`] were logged already and are passed
/// straight to the previous hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let already_logged = PANIC_LOGGED.with(|logged| logged.replace(false));
        if !already_logged {
            log_uncaught_panic(info);
        }
        previous(info);
    }));
    HOOK_INSTALLED.store(true, Ordering::Release);
}

fn log_uncaught_panic(info: &PanicHookInfo<'_>) {
    let site = info
        .location()
        .map(|loc| CallSite::new(loc.file().to_owned(), loc.line()));
    let _ = log_terminal(LogLevel::Panic, site, None, &panic_message(info));
}

/// The panic payload as text, for `&str` and `String` payloads.
fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
