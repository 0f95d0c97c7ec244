//! # teelog-logging
//!
//! Console/file tee logger with a buffered, self-healing file sink.
//!
//! - [`BufferedFileSink`]: in-memory buffer drained by a background thread
//!   on a timer or when the buffer passes its high-water mark
//! - [`Logger`]: encodes each record once and routes it to the console and
//!   the file by per-sink minimum level
//! - [`TeeLayer`]: `tracing` layer feeding events into a [`Logger`]
//! - [`init`] and the level functions: one process-wide logger
//!
//! Log lines look like:
//!
//! ```text
//! 26/08/2025 15:04:05.123 | ERROR | api/handler.rs:42 | TRACE : req-7 | upstream failed status=502
//! ```

#![deny(unsafe_code)]

pub mod dispatch;
pub mod errors;
pub mod global;
pub mod layer;
pub mod sink;
pub mod test_utils;

pub use dispatch::Logger;
pub use errors::{LoggingError, Result};
pub use global::{
    close, debug, debug_with_trace_id, error, error_with_trace_id, fatal, fatal_with_trace_id,
    info, info_with_trace_id, init, init_from_env, init_with_logger, install_panic_hook,
    log_with_fields, logger, panic, panic_with_trace_id, sync, trace, trace_with_trace_id, warn,
    warn_with_trace_id,
};
pub use layer::TeeLayer;
pub use sink::{BufferedFileSink, FlushSignal, SinkConfig};
pub use teelog_core::{CallSite, Field, FieldValue, LogLevel, LogRecord};
pub use teelog_settings::LoggerSettings;
