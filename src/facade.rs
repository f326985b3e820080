//! Public global façade: one process-wide instance that owns the backend
//! thread plus the sink/channel/logger repositories.
//!
//! Mirrors `srslog.cpp`: `init`/`flush` manage the backend lifecycle,
//! `fetch_*` functions get-or-create repository entries, and any
//! caller-supplied id has its `#` characters stripped since that character
//! is reserved for synthetic per-logger channel ids like `"app#E"`.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::backend::{Backend, Priority};
use crate::channel::{LogChannel, LogChannelConfig};
use crate::entry::WorkItem;
use crate::error::SinkResult;
use crate::format::TextFormatter;
use crate::formatter::Formatter;
use crate::logger::BasicLogger;
use crate::pool::ArgStorePool;
use crate::queue::{DEFAULT_QUEUE_CAPACITY, WorkQueue};
use crate::repository::Repository;
use crate::sink::{FileSink, Sink, SinkHandle, StreamSink, StreamTarget};

/// Strips the reserved `#` character from a caller-supplied id.
fn remove_sharp_chars(id: &str) -> String {
    id.chars().filter(|c| *c != '#').collect()
}

pub struct Facade {
    sinks: Repository<String, SinkHandle>,
    channels: Repository<String, Arc<LogChannel>>,
    loggers: Repository<String, Arc<BasicLogger>>,
    queue: Arc<WorkQueue<WorkItem>>,
    pool: Arc<ArgStorePool>,
    backend: Backend,
    default_sink: Mutex<SinkHandle>,
    default_formatter: Mutex<Arc<dyn Formatter>>,
}

impl Facade {
    fn new() -> Self {
        let queue = Arc::new(WorkQueue::new(DEFAULT_QUEUE_CAPACITY));
        let pool = Arc::new(ArgStorePool::new(DEFAULT_QUEUE_CAPACITY));
        let formatter: Arc<dyn Formatter> = Arc::new(TextFormatter);

        let sinks: Repository<String, SinkHandle> = Repository::new();
        let stdout_sink: SinkHandle = Arc::new(Mutex::new(StreamSink::new("stdout#", StreamTarget::Stdout, formatter.clone())));
        let stderr_sink: SinkHandle = Arc::new(Mutex::new(StreamSink::new("stderr#", StreamTarget::Stderr, formatter.clone())));
        sinks.get_or_insert_with("stdout#".to_string(), || stdout_sink.clone());
        sinks.get_or_insert_with("stderr#".to_string(), || stderr_sink.clone());

        let backend = Backend::new(queue.clone(), pool.clone());

        Facade {
            sinks,
            channels: Repository::new(),
            loggers: Repository::new(),
            queue,
            pool,
            backend,
            default_sink: Mutex::new(stdout_sink),
            default_formatter: Mutex::new(formatter),
        }
    }

    pub fn init(&self, priority: Priority) {
        self.backend.start(priority);
    }

    pub fn stop(&self) {
        self.backend.stop();
    }

    /// Blocks until every entry queued ahead of this call has drained and
    /// every known sink has flushed. No-op if the backend isn't running.
    pub fn flush(&self) {
        if !self.backend.is_running() {
            return;
        }
        let sinks = self.sinks.contents();
        let cmd = crate::entry::FlushCommand::new(sinks);
        let completed = cmd.completed.clone();
        self.queue.push(WorkItem::Flush(cmd));
        while !completed.load(std::sync::atomic::Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_micros(100));
        }
    }

    pub fn set_error_handler(&self, handler: Box<dyn Fn(&str) + Send + Sync>) {
        self.backend.set_error_handler(handler);
    }

    pub fn set_default_sink(&self, sink: SinkHandle) {
        *self.default_sink.lock() = sink;
    }

    pub fn default_sink(&self) -> SinkHandle {
        self.default_sink.lock().clone()
    }

    pub fn default_formatter(&self) -> Arc<dyn Formatter> {
        self.default_formatter.lock().clone()
    }

    /// Changes the formatter new sinks/channels pick up by default. Existing
    /// sinks already constructed against the old formatter keep it —
    /// matches [`Self::set_default_sink`]'s swap-by-reference contract.
    pub fn set_default_formatter(&self, formatter: Arc<dyn Formatter>) {
        *self.default_formatter.lock() = formatter;
    }

    pub fn fetch_stdout_sink(&self) -> SinkHandle {
        self.sinks.find(&"stdout#".to_string()).expect("stdout sink always present")
    }

    pub fn fetch_stderr_sink(&self) -> SinkHandle {
        self.sinks.find(&"stderr#".to_string()).expect("stderr sink always present")
    }

    /// Gets or creates a rotating file sink at `path`. `#` is stripped from
    /// `id`, matching every other user-facing fetch function here.
    pub fn fetch_file_sink(&self, id: &str, path: &str, max_size_bytes: u64) -> SinkHandle {
        let id = remove_sharp_chars(id);
        let formatter = self.default_formatter();
        self.sinks.get_or_insert_with(id.clone(), || Arc::new(Mutex::new(FileSink::new(id.clone(), path, max_size_bytes, formatter))))
    }

    /// Same as [`Self::fetch_file_sink`] but accepts a human-readable size
    /// string (`"10MB"`) for the rotation threshold.
    pub fn fetch_file_sink_with_size_str(&self, id: &str, path: &str, max_size: &str) -> SinkResult<SinkHandle> {
        let bytes = crate::error::parse_size_str(max_size).ok_or_else(|| crate::error::SinkError::InvalidSizeString(max_size.to_string()))?;
        Ok(self.fetch_file_sink(id, path, bytes))
    }

    pub fn find_sink(&self, id: &str) -> Option<SinkHandle> {
        self.sinks.find(&remove_sharp_chars(id))
    }

    /// Registers a caller-built sink under `id`. Returns `false` without
    /// replacing anything if `id` is already taken — callers should
    /// `find_sink` to recover the existing one in that case.
    pub fn install_custom_sink(&self, id: &str, sink: SinkHandle) -> bool {
        self.sinks.try_insert(remove_sharp_chars(id), sink)
    }

    /// Gets or creates a log channel writing to the default sink.
    pub fn fetch_log_channel(&self, id: &str) -> Arc<LogChannel> {
        let id = remove_sharp_chars(id);
        let sink = self.default_sink();
        let queue = self.queue.clone();
        let pool = self.pool.clone();
        self.channels.get_or_insert_with(id.clone(), move || Arc::new(LogChannel::new(LogChannelConfig::new(id.clone()), sink, queue, pool)))
    }

    /// Gets or creates a channel writing to a specific sink.
    pub fn fetch_log_channel_with_sink(&self, id: &str, sink: SinkHandle) -> Arc<LogChannel> {
        let id = remove_sharp_chars(id);
        let queue = self.queue.clone();
        let pool = self.pool.clone();
        self.channels.get_or_insert_with(id.clone(), move || Arc::new(LogChannel::new(LogChannelConfig::new(id.clone()), sink, queue, pool)))
    }

    pub fn find_log_channel(&self, id: &str) -> Option<Arc<LogChannel>> {
        self.channels.find(&remove_sharp_chars(id))
    }

    /// Gets or creates a four-channel basic logger (error/warning/info/debug),
    /// each channel addressed internally as `"{id}#E"` etc — the `#` here is
    /// deliberate and bypasses the public stripping rule.
    pub fn fetch_basic_logger(&self, id: &str) -> Arc<BasicLogger> {
        let id = remove_sharp_chars(id);
        let sink = self.default_sink();
        let queue = self.queue.clone();
        let pool = self.pool.clone();
        self.loggers.get_or_insert_with(id.clone(), move || {
            let make_channel = |suffix: char| {
                let mut cfg = LogChannelConfig::new(format!("{id}#{suffix}"));
                cfg.tag = suffix;
                Arc::new(LogChannel::new(cfg, sink.clone(), queue.clone(), pool.clone()))
            };
            Arc::new(BasicLogger::new(make_channel('E'), make_channel('W'), make_channel('I'), make_channel('D')))
        })
    }

    pub fn find_logger(&self, id: &str) -> Option<Arc<BasicLogger>> {
        self.loggers.find(&remove_sharp_chars(id))
    }
}

static FACADE: Lazy<Facade> = Lazy::new(Facade::new);

pub fn facade() -> &'static Facade {
    &FACADE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sharp_chars_are_stripped_from_user_ids() {
        assert_eq!(remove_sharp_chars("app#weird"), "appweird");
        assert_eq!(remove_sharp_chars("plain"), "plain");
    }

    #[test]
    fn stdout_and_stderr_sinks_exist_before_any_fetch() {
        let f = Facade::new();
        assert!(f.sinks.contains(&"stdout#".to_string()));
        assert!(f.sinks.contains(&"stderr#".to_string()));
    }

    #[test]
    fn fetching_channel_twice_returns_same_instance() {
        let f = Facade::new();
        let a = f.fetch_log_channel("demo");
        let b = f.fetch_log_channel("demo");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn set_default_formatter_is_visible_to_later_default_formatter_calls() {
        let f = Facade::new();
        let json: Arc<dyn Formatter> = Arc::new(crate::format::JsonFormatter);
        f.set_default_formatter(json.clone());
        assert!(Arc::ptr_eq(&f.default_formatter(), &json));
    }

    #[test]
    fn installing_a_sink_twice_keeps_the_first_and_reports_failure() {
        let f = Facade::new();
        let formatter = f.default_formatter();
        let first: SinkHandle = Arc::new(Mutex::new(StreamSink::new("first", StreamTarget::Stdout, formatter.clone())));
        let second: SinkHandle = Arc::new(Mutex::new(StreamSink::new("second", StreamTarget::Stdout, formatter)));

        assert!(f.install_custom_sink("custom", first.clone()));
        assert!(!f.install_custom_sink("custom", second));

        let resolved = f.find_sink("custom").unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));
    }
}
