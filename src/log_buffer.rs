//! Bounded in-memory log sink.
//!
//! While the terminal is in raw mode stderr output would tear the screen,
//! so the tracing subscriber writes here instead and the host renders the
//! tail of the buffer.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

pub const DEFAULT_MAX_LINES: usize = 500;

static GLOBAL_LOG: OnceLock<LogBuffer> = OnceLock::new();

/// Install the process-wide buffer. Returns false if one is already set.
pub fn set_global_log_buffer(buffer: LogBuffer) -> bool {
    GLOBAL_LOG.set(buffer).is_ok()
}

pub fn global_log_buffer() -> Option<LogBuffer> {
    GLOBAL_LOG.get().cloned()
}

#[derive(Debug)]
struct Lines {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl Lines {
    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.inner.lock() {
            lines.push_line(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|l| l.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(lines) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = lines.lines.len().saturating_sub(count);
        lines.lines.iter().skip(skip).cloned().collect()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            buffer: self.clone(),
            pending: Vec::new(),
        }
    }
}

/// `io::Write` adapter splitting output into lines.
#[derive(Debug)]
pub struct LogWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
}

impl LogWriter {
    fn flush_pending(&mut self, force: bool) {
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n').filter(|l| !l.is_empty()) {
            self.buffer.push(line.to_string());
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}
