//! Per-poll progress reporting

use crate::status::StackSnapshot;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Receives one call per status poll
pub trait ProgressSink: Send + Sync {
    fn on_status(&self, stack_name: &str, attempt: u32, snapshot: &StackSnapshot);
}

/// Emits a structured `info` event per poll
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_status(&self, stack_name: &str, attempt: u32, snapshot: &StackSnapshot) {
        info!(
            stack_name,
            attempt,
            status = %snapshot.status,
            reason = snapshot.status_reason.as_deref().unwrap_or(""),
            "Stack status"
        );
    }
}

/// Writes `Stack status: <STATUS>` per poll, to stdout unless given a writer
pub struct ConsoleProgress<W = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleProgress {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> ProgressSink for ConsoleProgress<W> {
    fn on_status(&self, stack_name: &str, attempt: u32, snapshot: &StackSnapshot) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "Stack status: {}", snapshot.status) {
            warn!(stack_name, error = %err, "Failed to write stack status");
        }
        debug!(stack_name, attempt, status = %snapshot.status, "Polled stack");
    }
}
