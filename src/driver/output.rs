//! Draining driver output into the log buffer.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

use crate::observability::logging::LogBuffer;

/// Which driver stream a pump is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// Spawn a task copying `stream` line by line into `buffer` and onto the
/// service's own stdout/stderr. Ends when the stream closes.
///
/// Bytes that are not UTF-8 are replaced, never treated as an error: the pipe
/// must stay open for as long as the driver writes to it.
pub fn spawn_output_pump<R>(stream: R, kind: StreamKind, buffer: LogBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&raw);
                    let line = text.trim_end_matches(['\n', '\r']);
                    echo(kind, line);
                    buffer.push(line);
                }
                Err(e) => {
                    tracing::warn!(stream = kind.as_str(), error = %e, "Driver output read failed");
                    break;
                }
            }
        }
        tracing::debug!(stream = kind.as_str(), "Driver output closed");
    })
}

fn echo(kind: StreamKind, line: &str) {
    // A closed terminal must not stop the capture.
    let _ = match kind {
        StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
        StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
    };
}
