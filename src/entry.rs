//! Queued work items: log entries and flush commands.
//!
//! Mirrors the union the original source pushes through its backend queue
//! (`log_entry`, optionally carrying a `flush_backend_cmd`). Here the two
//! are separate variants of [`WorkItem`] rather than an optional field,
//! since Rust enums make the "this is a flush, not a log line" branch
//! explicit at the match site in the backend worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use crate::context::Context;
use crate::pool::ArgHandle;
use crate::sink::SinkHandle;

/// Per-entry logging context, propagated from the channel that produced it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogContext {
    pub value: u32,
    pub enabled: bool,
}

/// Everything about an entry besides its payload (template + args or a
/// context dump), matching the original's `log_entry_metadata`.
#[derive(Debug, Clone)]
pub struct LogEntryMetadata {
    pub timestamp: SystemTime,
    pub context: LogContext,
    pub channel_name: Arc<str>,
    pub channel_tag: char,
}

/// The payload carried by a queued log entry: either a template to render
/// against a pooled argument store, a pre-rendered hex dump, or a structured
/// context snapshot — optionally itself carrying a template to render
/// alongside the dump, matching the original's `emit(context, template,
/// args…)` overload.
#[derive(Debug)]
pub enum Payload {
    Template { template: &'static str, args: ArgHandle },
    HexDump { message: String, bytes: Vec<u8> },
    ContextDump { context: Box<Context>, template: Option<&'static str>, args: Option<ArgHandle> },
}

/// A single queued log entry.
#[derive(Debug)]
pub struct LogEntry {
    pub sink: SinkHandle,
    pub metadata: LogEntryMetadata,
    pub payload: Payload,
}

/// A synchronous flush request. `flush()` on the façade spin-polls
/// `completed` (100µs sleeps, matching the original's completion-flag wait)
/// until the backend worker has drained the queue ahead of this command and
/// flushed every named sink.
pub struct FlushCommand {
    pub sinks: Vec<SinkHandle>,
    pub completed: Arc<AtomicBool>,
}

impl FlushCommand {
    pub fn new(sinks: Vec<SinkHandle>) -> Self {
        FlushCommand { sinks, completed: Arc::new(AtomicBool::new(false)) }
    }

    /// Marks the command as complete.
    pub fn signal_done(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }

    pub fn is_done(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

/// A unit of work pushed onto the backend queue.
pub enum WorkItem {
    Entry(LogEntry),
    Flush(FlushCommand),
}
