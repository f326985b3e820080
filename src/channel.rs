//! A single named log channel: the per-producer-thread entry point that
//! allocates an argument store, builds a [`LogEntry`], and pushes it onto
//! the backend queue.
//!
//! Mirrors `log_channel`: an immutable identity (name, tag), a sink
//! reference, and three small atomically-updated cells (`is_enabled`,
//! `ctx_value`, `hex_dump_max_size`) any producer thread can flip without
//! taking a lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::time::SystemTime;

use crate::args::ArgValue;
use crate::context::Context;
use crate::entry::{LogContext, LogEntry, LogEntryMetadata, Payload, WorkItem};
use crate::pool::ArgStorePool;
use crate::queue::WorkQueue;
use crate::sink::SinkHandle;

pub struct LogChannelConfig {
    pub name: Arc<str>,
    pub tag: char,
    pub should_print_context: bool,
}

impl LogChannelConfig {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        LogChannelConfig { name: name.into(), tag: '\0', should_print_context: false }
    }
}

/// A named logging channel bound to one sink.
pub struct LogChannel {
    name: Arc<str>,
    tag: char,
    should_print_context: bool,
    sink: SinkHandle,
    queue: Arc<WorkQueue<WorkItem>>,
    pool: Arc<ArgStorePool>,
    enabled: AtomicBool,
    context_value: AtomicU32,
    /// Negative means unlimited, matching the source's `int` sentinel.
    hex_dump_max_size: AtomicI64,
}

impl LogChannel {
    pub fn new(config: LogChannelConfig, sink: SinkHandle, queue: Arc<WorkQueue<WorkItem>>, pool: Arc<ArgStorePool>) -> Self {
        LogChannel {
            name: config.name,
            tag: config.tag,
            should_print_context: config.should_print_context,
            sink,
            queue,
            pool,
            enabled: AtomicBool::new(true),
            context_value: AtomicU32::new(0),
            hex_dump_max_size: AtomicI64::new(-1),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_context(&self, value: u32) {
        self.context_value.store(value, Ordering::Relaxed);
    }

    pub fn set_hex_dump_max_size(&self, max_size: Option<usize>) {
        let raw = max_size.map(|v| v as i64).unwrap_or(-1);
        self.hex_dump_max_size.store(raw, Ordering::Relaxed);
    }

    fn metadata(&self) -> LogEntryMetadata {
        LogEntryMetadata {
            timestamp: SystemTime::now(),
            context: LogContext { value: self.context_value.load(Ordering::Relaxed), enabled: self.should_print_context },
            channel_name: self.name.clone(),
            channel_tag: self.tag,
        }
    }

    /// Renders `template` against `args` at drain time. No-op if the
    /// channel is disabled or the backend queue is full.
    pub fn log(&self, template: &'static str, args: &[ArgValue]) {
        if !self.is_enabled() {
            return;
        }
        let Some(handle) = self.pool.alloc() else { return };
        self.pool.with_mut(handle, |store| {
            for a in args {
                store.push(a.clone());
            }
        });

        let entry = LogEntry { sink: self.sink.clone(), metadata: self.metadata(), payload: Payload::Template { template, args: handle } };
        if !self.queue.push(WorkItem::Entry(entry)) {
            self.pool.dealloc(handle);
        }
    }

    /// Logs a message with a trailing hex dump, truncated to the channel's
    /// `hex_dump_max_size` if one is set.
    pub fn log_hex(&self, message: impl Into<String>, bytes: &[u8]) {
        if !self.is_enabled() {
            return;
        }
        let max = self.hex_dump_max_size.load(Ordering::Relaxed);
        let len = if max >= 0 { bytes.len().min(max as usize) } else { bytes.len() };
        let entry = LogEntry {
            sink: self.sink.clone(),
            metadata: self.metadata(),
            payload: Payload::HexDump { message: message.into(), bytes: bytes[..len].to_vec() },
        };
        let _ = self.queue.push(WorkItem::Entry(entry));
    }

    /// Pushes a structured context dump with no accompanying template.
    pub fn log_context(&self, context: Context) {
        self.log_context_fmt(context, None, &[]);
    }

    /// Pushes a structured context dump alongside a template rendered
    /// against `args`, matching the original's `emit(context, template,
    /// args…)` overload — `template` may be empty/absent for a bare dump.
    pub fn log_context_fmt(&self, context: Context, template: Option<&'static str>, args: &[ArgValue]) {
        if !self.is_enabled() {
            return;
        }
        let handle = match template {
            Some(_) => {
                let Some(handle) = self.pool.alloc() else { return };
                self.pool.with_mut(handle, |store| {
                    for a in args {
                        store.push(a.clone());
                    }
                });
                Some(handle)
            }
            None => None,
        };

        let entry = LogEntry { sink: self.sink.clone(), metadata: self.metadata(), payload: Payload::ContextDump { context: Box::new(context), template, args: handle } };
        if !self.queue.push(WorkItem::Entry(entry)) {
            if let Some(handle) = handle {
                self.pool.dealloc(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextFormatter;
    use crate::sink::{StreamSink, StreamTarget};
    use parking_lot::Mutex;

    fn test_channel() -> LogChannel {
        let queue = Arc::new(WorkQueue::new(16));
        let pool = Arc::new(ArgStorePool::new(16));
        let sink: SinkHandle = Arc::new(Mutex::new(StreamSink::new("stdout#", StreamTarget::Stdout, Arc::new(TextFormatter))));
        LogChannel::new(LogChannelConfig::new("demo"), sink, queue, pool)
    }

    #[test]
    fn log_context_fmt_pushes_an_entry_carrying_the_rendered_template() {
        let channel = test_channel();
        channel.log_context_fmt(Context::new("scheduler"), Some("Text %d"), &[ArgValue::I64(88)]);
        let item = channel.queue.try_pop().unwrap();
        let WorkItem::Entry(entry) = item else { panic!("expected an entry") };
        match entry.payload {
            Payload::ContextDump { template, args, .. } => {
                assert_eq!(template, Some("Text %d"));
                assert!(args.is_some());
            }
            _ => panic!("expected a context dump"),
        }
    }

    #[test]
    fn log_context_without_template_carries_none() {
        let channel = test_channel();
        channel.log_context(Context::new("scheduler"));
        let item = channel.queue.try_pop().unwrap();
        let WorkItem::Entry(entry) = item else { panic!("expected an entry") };
        match entry.payload {
            Payload::ContextDump { template, args, .. } => {
                assert!(template.is_none());
                assert!(args.is_none());
            }
            _ => panic!("expected a context dump"),
        }
    }

    #[test]
    fn disabled_channel_drops_context_dump_without_reaching_queue() {
        let channel = test_channel();
        channel.set_enabled(false);
        channel.log_context(Context::new("scheduler"));
        assert!(channel.queue.try_pop().is_none());
    }
}
