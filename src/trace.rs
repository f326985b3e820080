//! Event-trace helper built atop a single log channel.
//!
//! Mirrors `event_trace.cpp`: `duration_begin`/`duration_end` log
//! human-readable "Entering"/"Leaving" markers tagged with the calling
//! thread's id, and [`ScopedCompleteEvent`] is an RAII guard that logs the
//! elapsed time of a scope, but only once it clears a minimum threshold —
//! sub-threshold scopes produce no output at all.
//!
//! Besides the explicit-channel API above, `event_trace.cpp` also exposes a
//! one-shot global trace channel with three initialization modes: an
//! explicit caller-supplied channel, a default buffered file sink, or a
//! fixed default filename. [`init_with_channel`], [`init_with_file`], and
//! [`init_default`] mirror those three, each a silent no-op once any of
//! them has already run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

use crate::args::ArgValue;
use crate::channel::LogChannel;
use crate::format::TextFormatter;
use crate::sink::{BufferedFileSink, SinkHandle};

/// Default rotation-free buffered file the source falls back to when no
/// channel or path is given at all.
const DEFAULT_EVENT_TRACE_FILENAME: &str = "event_trace.log";
/// Matches the source's default buffer size for the event-trace sink.
const DEFAULT_EVENT_TRACE_BUFFER_CAPACITY: usize = 1024 * 1024;

static GLOBAL_CHANNEL: OnceCell<Arc<LogChannel>> = OnceCell::new();

/// Initializes the global event-trace channel with a caller-supplied
/// channel. No-op if the global trace channel was already initialized by
/// any of the three init functions.
pub fn init_with_channel(channel: Arc<LogChannel>) {
    let _ = GLOBAL_CHANNEL.set(channel);
}

/// Initializes the global event-trace channel with a buffered file sink at
/// `path`, sized to `buffer_capacity` bytes. No-op if already initialized.
pub fn init_with_file(path: &str, buffer_capacity: usize) {
    if GLOBAL_CHANNEL.get().is_some() {
        return;
    }
    let sink: SinkHandle = Arc::new(parking_lot::Mutex::new(BufferedFileSink::new(
        "event_trace#",
        path,
        buffer_capacity,
        Arc::new(TextFormatter),
    )));
    let channel = crate::facade().fetch_log_channel_with_sink("event_trace#", sink);
    let _ = GLOBAL_CHANNEL.set(channel);
}

/// Initializes the global event-trace channel against the fixed default
/// filename (`"event_trace.log"`) with the source's default buffer size.
/// No-op if already initialized.
pub fn init_default() {
    init_with_file(DEFAULT_EVENT_TRACE_FILENAME, DEFAULT_EVENT_TRACE_BUFFER_CAPACITY);
}

/// The global event-trace channel, if one of the `init_*` functions has run.
pub fn global_channel() -> Option<&'static Arc<LogChannel>> {
    GLOBAL_CHANNEL.get()
}

/// Logs an "Entering" marker on the global event-trace channel. A silent
/// no-op if no `init_*` function has run yet.
pub fn duration_begin_global(category: &str, name: &str) {
    if let Some(channel) = global_channel() {
        duration_begin(channel, category, name);
    }
}

/// Logs a "Leaving" marker on the global event-trace channel. A silent
/// no-op if no `init_*` function has run yet.
pub fn duration_end_global(category: &str, name: &str) {
    if let Some(channel) = global_channel() {
        duration_end(channel, category, name);
    }
}

fn thread_id_str() -> String {
    format!("{:?}", std::thread::current().id())
}

/// Logs an "Entering" marker for `name` within `category`.
pub fn duration_begin(channel: &LogChannel, category: &str, name: &str) {
    channel.log(
        "[%s] [TID:%s] Entering \"%s\": %s",
        &[
            ArgValue::Str(category.to_string()),
            ArgValue::Str(thread_id_str()),
            ArgValue::Str(name.to_string()),
            ArgValue::Str(String::new()),
        ],
    );
}

/// Logs a "Leaving" marker for `name` within `category`.
pub fn duration_end(channel: &LogChannel, category: &str, name: &str) {
    channel.log(
        "[%s] [TID:%s] Leaving \"%s\": %s",
        &[
            ArgValue::Str(category.to_string()),
            ArgValue::Str(thread_id_str()),
            ArgValue::Str(name.to_string()),
            ArgValue::Str(String::new()),
        ],
    );
}

/// RAII guard that logs the elapsed microseconds of its own scope when
/// dropped, provided the scope ran at least `threshold`.
pub struct ScopedCompleteEvent<'a> {
    channel: &'a LogChannel,
    category: String,
    name: String,
    threshold: Duration,
    start: Instant,
}

impl<'a> ScopedCompleteEvent<'a> {
    pub fn new(channel: &'a LogChannel, category: impl Into<String>, name: impl Into<String>, threshold: Duration) -> Self {
        ScopedCompleteEvent { channel, category: category.into(), name: name.into(), threshold, start: Instant::now() }
    }
}

impl Drop for ScopedCompleteEvent<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if elapsed < self.threshold {
            return;
        }
        self.channel.log(
            "%s %s, %u",
            &[
                ArgValue::Str(self.category.clone()),
                ArgValue::Str(self.name.clone()),
                ArgValue::U64(elapsed.as_micros() as u64),
            ],
        );
    }
}
