//! Subprocess helpers.
//!
//! [`stream_command`] runs the engine and forwards every line it prints as
//! soon as it arrives. [`run_captured`] runs a short-lived helper to
//! completion under a timeout and returns its output.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::log_sink::{publish, LogSink};

/// Maximum stdout or stderr size captured per stream by [`run_captured`] (1 MiB).
const MAX_CAPTURE_BYTES: u64 = 1024 * 1024;

/// Output of a command run to completion.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
}

/// Spawn `cmd`, forward each non-blank stdout/stderr line to `sink`, and
/// wait for it to exit.
///
/// Lines from the two streams are interleaved in arrival order. Invalid
/// UTF-8 is replaced rather than rejected.
pub async fn stream_command(cmd: &mut Command, sink: &dyn LogSink) -> Result<ExitStatus, CoreError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| CoreError::Engine(format!("failed to start engine: {e}")))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let stdout_task = child
        .stdout
        .take()
        .map(|out| tokio::spawn(forward_lines(out, tx.clone())));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| tokio::spawn(forward_lines(err, tx.clone())));
    // Only the reader tasks hold senders now, so `recv` ends with them.
    drop(tx);

    while let Some(line) = rx.recv().await {
        publish(sink, line).await;
    }

    for task in [stdout_task, stderr_task].into_iter().flatten() {
        let _ = task.await;
    }

    Ok(child.wait().await?)
}

/// Read `stream` line by line and push each line into `tx`.
async fn forward_lines<R: AsyncRead + Unpin>(stream: R, tx: mpsc::UnboundedSender<String>) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                for line in text.split('\r') {
                    let line = line.trim_end_matches('\n');
                    if !line.trim().is_empty() && tx.send(line.to_string()).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Subprocess stream read failed");
                break;
            }
        }
    }
}

/// Spawn `cmd`, capture stdout/stderr, and enforce `timeout`.
///
/// The child is killed if the timeout expires.
pub async fn run_captured(cmd: &mut Command, timeout: Duration) -> Result<CapturedOutput, CoreError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;

    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(CapturedOutput {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code: status.code().unwrap_or(-1),
            })
        }
        Ok(Err(e)) => Err(e.into()),
        Err(_elapsed) => {
            // Dropping `child` kills it (`kill_on_drop`).
            stdout_task.abort();
            stderr_task.abort();
            Err(CoreError::Internal(format!(
                "command timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

/// Read an entire output stream, capped at [`MAX_CAPTURE_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.take(MAX_CAPTURE_BYTES).read_to_end(&mut buf).await;
    }
    buf
}
