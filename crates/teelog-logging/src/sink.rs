//! Buffered file sink with a background flush thread.
//!
//! [`BufferedFileSink`] accepts encoded log lines from any number of threads
//! and moves them to disk without making the caller wait on file I/O.
//!
//! # Flushing
//!
//! - Writes append to an in-memory buffer under the sink lock.
//! - **Threshold flush**: once the buffer exceeds the high-water mark
//!   (default 64 KiB) a flush is requested through a capacity-1 signal.
//!   Requests coalesce; a writer never blocks on a pending request.
//! - **Periodic flush**: the flush thread also wakes on a fixed tick
//!   (default 50 ms).
//! - Each flush writes the whole buffer in one call and clears it, even when
//!   the write fails. Failures are reported on stderr and the batch is lost.
//!
//! # Self-healing
//!
//! Before writing, the flush probes the recorded path. If the file was
//! removed externally, a fresh `<base>-<DD-MM-YYYY-HH-MM-SS>.log` is created
//! in the same directory (re-creating the directory if needed).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use teelog_settings::LoggerSettings;
use teelog_settings::types::{DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_HIGH_WATER_MARK};

/// Timestamp layout embedded in log file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y-%H-%M-%S";

/// Configuration for a [`BufferedFileSink`].
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Directory holding the log files.
    pub dir: PathBuf,
    /// File name prefix.
    pub base_name: String,
    /// Buffered bytes that trigger a flush request. Default: 64 KiB.
    pub high_water_mark: usize,
    /// Periodic flush interval. Default: 50 ms.
    pub flush_interval: Duration,
}

impl SinkConfig {
    /// Config for `dir`/`base_name` with default thresholds.
    pub fn new(dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_name: base_name.into(),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }

    /// Config derived from logger settings.
    #[must_use]
    pub fn from_settings(settings: &LoggerSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            base_name: settings.filename.clone(),
            high_water_mark: settings.high_water_mark,
            flush_interval: settings.flush_interval(),
        }
    }

    /// Set the high-water mark.
    #[must_use]
    pub fn with_high_water_mark(mut self, bytes: usize) -> Self {
        self.high_water_mark = bytes;
        self
    }

    /// Set the flush interval.
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }
}

/// Capacity-1 flush request channel.
///
/// At most one request is pending at a time; further requests are dropped
/// until the flush thread takes the pending one.
#[derive(Clone, Debug)]
pub struct FlushSignal {
    tx: SyncSender<()>,
}

impl FlushSignal {
    /// Create a signal and the receiving end for the flush thread.
    pub fn channel() -> (Self, Receiver<()>) {
        let (tx, rx) = mpsc::sync_channel(1);
        (Self { tx }, rx)
    }

    /// Request a flush without blocking.
    ///
    /// Returns `true` if this call queued the request, `false` if one was
    /// already pending (or the flush thread is gone).
    pub fn request(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

/// Mutable state guarded by the sink lock.
struct SinkState {
    file: Option<File>,
    path: PathBuf,
    buf: Vec<u8>,
    closed: bool,
}

/// State shared between the sink handle and the flush thread.
struct Shared {
    state: Mutex<SinkState>,
    dir: PathBuf,
    base_name: String,
    high_water_mark: usize,
}

impl Shared {
    /// Flush under the lock. Returns `false` once the sink is closed.
    fn flush(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        self.flush_locked(&mut state);
        true
    }

    fn flush_locked(&self, state: &mut SinkState) {
        if state.buf.is_empty() {
            return;
        }

        if !state.path.exists() {
            state.file = None;
            match create_log_file(&self.dir, &self.base_name) {
                Ok((file, path)) => {
                    state.file = Some(file);
                    state.path = path;
                }
                Err(e) => eprintln!(
                    "teelog: failed to recreate log file in {}: {e}",
                    self.dir.display()
                ),
            }
        }

        if let Some(file) = state.file.as_mut() {
            if let Err(e) = file.write_all(&state.buf) {
                eprintln!(
                    "teelog: failed to write to log file {}: {e}",
                    state.path.display()
                );
            }
        }

        state.buf.clear();
        // Give back memory left over from a burst.
        if state.buf.capacity() > self.high_water_mark.saturating_mul(4) {
            state.buf.shrink_to(self.high_water_mark);
        }
    }
}

/// File sink that buffers in memory and flushes on a background thread.
///
/// `write` never touches the disk; `flush_buffer`, `sync` and `close` do.
pub struct BufferedFileSink {
    shared: Arc<Shared>,
    signal: FlushSignal,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BufferedFileSink {
    /// Create the log file and start the flush thread.
    ///
    /// Fails if the directory or file cannot be created.
    pub fn open(config: SinkConfig) -> io::Result<Self> {
        let (file, path) = create_log_file(&config.dir, &config.base_name)?;
        let high_water_mark = config.high_water_mark.max(1);

        let shared = Arc::new(Shared {
            state: Mutex::new(SinkState {
                file: Some(file),
                path,
                buf: Vec::with_capacity(high_water_mark.min(DEFAULT_HIGH_WATER_MARK)),
                closed: false,
            }),
            dir: config.dir,
            base_name: config.base_name,
            high_water_mark,
        });

        let (signal, rx) = FlushSignal::channel();
        let worker_shared = Arc::clone(&shared);
        let interval = config.flush_interval.max(Duration::from_millis(1));
        let worker = thread::Builder::new()
            .name("teelog-flush".into())
            .spawn(move || flush_loop(&worker_shared, &rx, interval))?;

        Ok(Self {
            shared,
            signal,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Append `bytes` to the buffer.
    ///
    /// Returns `bytes.len()`; the outcome of the eventual flush is not
    /// reported here. Fails only if the sink was closed.
    pub fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let over_threshold = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "log sink is closed",
                ));
            }
            let over = state.buf.len() + bytes.len() > self.shared.high_water_mark;
            state.buf.extend_from_slice(bytes);
            over
        };

        if over_threshold {
            let _ = self.signal.request();
        }
        Ok(bytes.len())
    }

    /// Write the buffer to the file now (re-creating the file if it vanished).
    pub fn flush_buffer(&self) {
        let _ = self.shared.flush();
    }

    /// Flush, then ask the OS to persist the file.
    pub fn sync(&self) -> io::Result<()> {
        let mut state = self.shared.state.lock();
        self.shared.flush_locked(&mut state);
        state.file.as_ref().map_or(Ok(()), File::sync_all)
    }

    /// Sync, stop the flush thread and release the file handle.
    ///
    /// Later writes fail with [`io::ErrorKind::BrokenPipe`]. Closing twice is
    /// a no-op.
    pub fn close(&self) -> io::Result<()> {
        let result = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Ok(());
            }
            self.shared.flush_locked(&mut state);
            let result = state.file.as_ref().map_or(Ok(()), File::sync_all);
            state.closed = true;
            state.file = None;
            result
        };

        let _ = self.signal.request();
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
        result
    }

    /// Path of the file currently written to.
    pub fn path(&self) -> PathBuf {
        self.shared.state.lock().path.clone()
    }

    /// Bytes waiting for the next flush.
    pub fn buffered_len(&self) -> usize {
        self.shared.state.lock().buf.len()
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

impl Drop for BufferedFileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl Write for &BufferedFileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BufferedFileSink::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer();
        Ok(())
    }
}

impl std::fmt::Debug for BufferedFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedFileSink")
            .field("path", &self.path())
            .field("high_water_mark", &self.shared.high_water_mark)
            .finish_non_exhaustive()
    }
}

/// Flush thread body: wake on a request or a tick, flush, repeat until closed.
fn flush_loop(shared: &Shared, rx: &Receiver<()>, interval: Duration) {
    let mut next_tick = Instant::now() + interval;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => {
                next_tick += interval;
                let now = Instant::now();
                if next_tick <= now {
                    next_tick = now + interval;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = shared.flush();
                return;
            }
        }
        if !shared.flush() {
            return;
        }
    }
}

/// File name for a log created at `at`.
pub fn log_file_name(base_name: &str, at: DateTime<Local>) -> String {
    format!("{base_name}-{}.log", at.format(FILE_TIMESTAMP_FORMAT))
}

/// Create `dir` if needed and open a new timestamped log file for appending.
fn create_log_file(dir: &Path, base_name: &str) -> io::Result<(File, PathBuf)> {
    let mut dirs = fs::DirBuilder::new();
    let _ = dirs.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        let _ = dirs.mode(0o755);
    }
    dirs.create(dir)?;

    let path = dir.join(log_file_name(base_name, Local::now()));
    let mut opts = OpenOptions::new();
    let _ = opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let _ = opts.mode(0o644);
    }
    let file = opts.open(&path)?;
    Ok((file, path))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
