//! Pipe-delimited line encoder.
//!
//! Every record becomes exactly one line (plus an optional stack block):
//!
//! ```text
//! 02/01/2025 15:04:05.123 | INFO | src/main.rs:12 | TRACE : abc123 | hello count=5 user="bob"
//! ```
//!
//! Segments are joined by `" | "`; the `TRACE : ...` segment only appears
//! when the record carries a string `traceid` field. Remaining fields trail
//! the message as ` key=value` in attachment order. Nothing is escaped.

use std::fmt::Write as _;

use crate::types::{LogRecord, TRACE_ID_KEY};

/// Timestamp layout of the first segment. `%.3f` truncates to milliseconds.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.3f";

/// Segment delimiter.
pub const DELIMITER: &str = " | ";

/// Encode one record into a newline-terminated line.
#[must_use]
pub fn encode(record: &LogRecord) -> Vec<u8> {
    let mut line = String::with_capacity(96 + record.message.len());
    encode_into(record, &mut line);
    line.into_bytes()
}

/// Append the encoded form of `record` to `out`.
pub fn encode_into(record: &LogRecord, out: &mut String) {
    let _ = write!(out, "{}", record.timestamp.format(TIMESTAMP_FORMAT));
    out.push_str(DELIMITER);

    out.push_str(record.level.as_upper());
    out.push_str(DELIMITER);

    match &record.call_site {
        Some(site) => {
            let _ = write!(out, "{site}");
        }
        None => out.push_str("unknown"),
    }
    out.push_str(DELIMITER);

    let trace_idx = record
        .fields
        .iter()
        .position(|f| f.key == TRACE_ID_KEY && f.value.as_str().is_some());
    if let Some(trace_id) = trace_idx.and_then(|i| record.fields[i].value.as_str()) {
        out.push_str("TRACE : ");
        out.push_str(trace_id);
        out.push_str(DELIMITER);
    }

    out.push_str(&record.message);

    for (i, field) in record.fields.iter().enumerate() {
        if Some(i) == trace_idx {
            continue;
        }
        let _ = write!(out, " {}={}", field.key, field.value);
    }

    if let Some(stack) = record.stack.as_deref().filter(|s| !s.is_empty()) {
        out.push_str("\nSTACK : \n");
        out.push_str(stack);
    }

    out.push('\n');
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
