//! # teelog-core
//!
//! Record types and the line encoder for teelog.
//!
//! - **Levels**: [`LogLevel`], `Trace` through `Fatal`, totally ordered
//! - **Records**: [`LogRecord`] with ordered [`Field`]s and an optional stack
//! - **Encoder**: [`encode`] renders a record as one pipe-delimited line
//!
//! Nothing here performs I/O; the sinks live in `teelog-logging`.

#![deny(unsafe_code)]

pub mod encoder;
pub mod types;

pub use encoder::{encode, encode_into};
pub use types::{CallSite, Field, FieldValue, LogLevel, LogRecord, TRACE_ID_KEY};
