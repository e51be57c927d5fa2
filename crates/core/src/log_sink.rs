//! Destination for run log lines.
//!
//! The runner narrates a job and forwards engine output through a
//! [`LogSink`]. The API crate implements it on its WebSocket manager so each
//! line fans out to every connected listener.

use async_trait::async_trait;

#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver one line to every listener. Delivery is best-effort.
    async fn emit(&self, line: String);
}

/// Emit `line` unless it is blank.
pub async fn publish(sink: &dyn LogSink, line: impl Into<String>) {
    let line = line.into();
    if line.trim().is_empty() {
        return;
    }
    sink.emit(line).await;
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use tokio::sync::Mutex;

    use super::*;

    /// Sink that records every line it receives.
    #[derive(Default)]
    pub struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        pub async fn lines(&self) -> Vec<String> {
            self.lines.lock().await.clone()
        }
    }

    #[async_trait]
    impl LogSink for MemorySink {
        async fn emit(&self, line: String) {
            self.lines.lock().await.push(line);
        }
    }
}
