//! Log record types shared across the workspace.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Field key reserved for trace correlation.
pub const TRACE_ID_KEY: &str = "traceid";

/// Severity of a log record, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finer than debug. Has no counterpart in most level scales.
    Trace,
    /// Intermediate values, decisions.
    Debug,
    /// Outcomes, summaries.
    Info,
    /// Non-fatal issues.
    Warn,
    /// Errors.
    Error,
    /// Logged right before the calling thread panics.
    Panic,
    /// Logged right before the process exits.
    Fatal,
}

impl LogLevel {
    /// All levels, least severe first.
    pub const ALL: [Self; 7] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Panic,
        Self::Fatal,
    ];

    /// Upper-case name used in encoded lines.
    #[must_use]
    pub const fn as_upper(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Panic => "PANIC",
            Self::Fatal => "FATAL",
        }
    }

    /// Convert from tracing level.
    #[must_use]
    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            _ => Self::Error,
        }
    }

    /// Most verbose tracing level that can still produce this level.
    ///
    /// `Panic` and `Fatal` never come from `tracing`, so they map to `ERROR`.
    #[must_use]
    pub fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error | Self::Panic | Self::Fatal => tracing::Level::ERROR,
        }
    }

    /// Convert from string (case-insensitive), falling back to `Info`.
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            "panic" => Self::Panic,
            "fatal" => Self::Fatal,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_upper().to_lowercase())
    }
}

/// Source location of a log call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    /// Source file as reported by the compiler.
    pub file: Cow<'static, str>,
    /// 1-based line number.
    pub line: u32,
}

impl CallSite {
    /// Create a call site.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the caller, through any `#[track_caller]` frames.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self::new(loc.file(), loc.line())
    }

    /// The file path cut down to its last two components.
    #[must_use]
    pub fn trimmed_file(&self) -> &str {
        let file = self.file.as_ref();
        let Some(last) = file.rfind(['/', '\\']) else {
            return file;
        };
        match file[..last].rfind(['/', '\\']) {
            Some(prev) => &file[prev + 1..],
            None => file,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trimmed_file(), self.line)
    }
}

/// Typed value of a structured field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Rendered in double quotes.
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Anything else, already rendered to text.
    Other(String),
}

impl FieldValue {
    /// The string payload, if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Other(value.to_string()), Self::Integer)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A key/value pair attached to a record.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: FieldValue,
}

impl Field {
    /// Create a field.
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The reserved trace-correlation field.
    pub fn trace_id(id: impl Into<String>) -> Self {
        Self::new(TRACE_ID_KEY, FieldValue::String(id.into()))
    }
}

/// One log entry, ready to be encoded.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Wall-clock time the record was created.
    pub timestamp: DateTime<Local>,
    /// Severity.
    pub level: LogLevel,
    /// Where the log call happened, if known.
    pub call_site: Option<CallSite>,
    /// Pre-formatted message.
    pub message: String,
    /// Structured fields in attachment order.
    pub fields: Vec<Field>,
    /// Stack trace text, if captured.
    pub stack: Option<String>,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            call_site: None,
            message: message.into(),
            fields: Vec::new(),
            stack: None,
        }
    }

    /// Set the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the call site.
    #[must_use]
    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Append a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push(Field::new(key, value));
        self
    }

    /// Append the trace-correlation field.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.fields.push(Field::trace_id(trace_id));
        self
    }

    /// Attach a stack trace.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// The first string-valued trace ID, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == TRACE_ID_KEY && f.value.as_str().is_some())
            .and_then(|f| f.value.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
