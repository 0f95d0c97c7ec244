//! `tracing` bridge.
//!
//! [`TeeLayer`] turns `tracing` events into [`LogRecord`]s and hands them to
//! a shared [`Logger`], so `tracing::info!` and the direct level functions
//! end up in the same file with the same format.
//!
//! Field mapping:
//! - `message` becomes the record message
//! - `stack`, `error_stack` and `error.stack` become the stack block
//! - a `traceid` recorded as a string or with `%` becomes the `TRACE` segment
//! - everything else trails the message in recording order

use std::fmt;
use std::sync::Arc;

use teelog_core::{CallSite, Field, FieldValue, LogLevel, LogRecord, TRACE_ID_KEY};
use tracing::field::{Field as TracingField, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::dispatch::Logger;

/// Layer forwarding `tracing` events to a [`Logger`].
#[derive(Clone, Debug)]
pub struct TeeLayer {
    logger: Arc<Logger>,
}

impl TeeLayer {
    /// Forward events to `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for TeeLayer
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.logger.enabled(LogLevel::from_tracing(metadata.level()))
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = LogLevel::from_tracing(meta.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::new(level, visitor.message.unwrap_or_default());
        record.fields = visitor.fields;
        record.stack = visitor.stack;
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            record.call_site = Some(CallSite::new(file, line));
        }

        self.logger.log(&record);
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::from_level(self.logger.min_level().to_tracing()))
    }
}

/// Visitor that collects the message, stack and fields of an event.
#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    stack: Option<String>,
    fields: Vec<Field>,
}

impl RecordVisitor {
    fn push(&mut self, field: &TracingField, value: FieldValue) {
        self.fields.push(Field::new(field.name(), value));
    }
}

fn is_stack_field(name: &str) -> bool {
    matches!(name, "stack" | "error_stack" | "error.stack")
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            name if is_stack_field(name) => self.stack = Some(value.to_string()),
            _ => self.push(field, FieldValue::from(value)),
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, FieldValue::Integer(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, FieldValue::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, FieldValue::Float(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, FieldValue::Bool(value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            name if is_stack_field(name) => self.stack = Some(format!("{value:?}")),
            TRACE_ID_KEY => self.push(field, FieldValue::String(format!("{value:?}"))),
            _ => self.push(field, FieldValue::Other(format!("{value:?}"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
