//! Structured logging and the in-memory log buffer.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (stdout + log buffer)
//! - Keep the most recent output lines for `GET /api/logs`
//!
//! # Design Decisions
//! - The buffer has its own lock, never shared with the update path
//! - Bounded: the oldest lines are dropped once capacity is reached
//! - Service events reach the buffer through a second `fmt` layer

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "joymap=info,tower_http=info";

/// Shared, bounded buffer of captured output lines.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<RwLock<VecDeque<String>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(4096)))),
            capacity: capacity.max(1),
        }
    }

    /// Append one line, evicting the oldest when full.
    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Copy of the buffered lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        let lines = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writer handed to the `fmt` layer; splits formatted events into lines.
pub struct BufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl BufferWriter {
    fn flush_lines(&mut self) {
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            let line = std::mem::replace(&mut self.pending, rest);
            let text = String::from_utf8_lossy(&line);
            self.buffer.push(text.trim_end_matches(['\n', '\r']));
        }
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_lines();
        Ok(())
    }
}

impl Drop for BufferWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let text = String::from_utf8_lossy(&self.pending).into_owned();
            self.buffer.push(text);
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// Install the global subscriber: stdout plus a copy into `buffer`.
pub fn init_logging(buffer: LogBuffer) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(buffer)
                .with_filter(filter()),
        )
        .init();
}
