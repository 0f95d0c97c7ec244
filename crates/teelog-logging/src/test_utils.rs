//! Test utilities for capturing console output.
//!
//! [`CapturedConsole`] is a [`MakeWriter`] backed by a shared in-memory
//! buffer. Hand a clone to [`Logger::with_console`](crate::Logger::with_console)
//! and assert on what the logger printed.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Shared in-memory console.
#[derive(Clone, Debug, Default)]
pub struct CapturedConsole {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedConsole {
    /// Create an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written output split into lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Check if any line contains the given substring.
    pub fn has_line(&self, needle: &str) -> bool {
        self.contents().lines().any(|l| l.contains(needle))
    }

    /// Discard captured output.
    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

/// Writer handed out by [`CapturedConsole`].
#[derive(Debug)]
pub struct CapturedWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedConsole {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn clones_share_the_buffer() {
        let console = CapturedConsole::new();
        let other = console.clone();
        writeln!(other.make_writer(), "one").unwrap();
        console.make_writer().write_all(b"two\n").unwrap();

        assert_eq!(console.lines(), vec!["one", "two"]);
        assert!(other.has_line("two"));
    }

    #[test]
    fn clear_empties() {
        let console = CapturedConsole::new();
        writeln!(console.make_writer(), "x").unwrap();
        console.clear();
        assert!(console.contents().is_empty());
        assert!(console.lines().is_empty());
    }
}
