//! The single backend consumer thread.
//!
//! Mirrors `backend_worker`: one dedicated thread polls the queue with a
//! 100µs sleep when idle (no condition variable), reports a near-full queue
//! at most once per run right after a successful pop (so sustained overload
//! that keeps the worker busy still trips the diagnostic), renders templates
//! behind `catch_unwind` so a malformed template can never take the whole
//! process down, and drains whatever remains in the queue after `stop()` is
//! requested before the thread actually exits.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::args;
use crate::entry::{LogEntry, Payload, WorkItem};
use crate::pool::ArgStorePool;
use crate::queue::WorkQueue;

const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Scheduling priority requested for the worker thread. `High`/`VeryHigh`
/// only take effect on platforms where elevating a thread's priority
/// doesn't require privileges this crate isn't willing to assume silently;
/// elsewhere they're accepted but have no observable effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
    VeryHigh,
}

pub type ErrorHandler = Arc<Mutex<Box<dyn Fn(&str) + Send + Sync>>>;

fn default_error_handler() -> ErrorHandler {
    Arc::new(Mutex::new(Box::new(|msg: &str| {
        eprintln!("ranlog: {msg}");
    })))
}

pub struct Backend {
    queue: Arc<WorkQueue<WorkItem>>,
    pool: Arc<ArgStorePool>,
    running: Arc<AtomicBool>,
    reported_near_full: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    error_handler: ErrorHandler,
}

impl Backend {
    pub fn new(queue: Arc<WorkQueue<WorkItem>>, pool: Arc<ArgStorePool>) -> Self {
        Backend {
            queue,
            pool,
            running: Arc::new(AtomicBool::new(false)),
            reported_near_full: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
            error_handler: default_error_handler(),
        }
    }

    pub fn set_error_handler(&self, handler: Box<dyn Fn(&str) + Send + Sync>) {
        // Matches the source: changing the handler while the backend is
        // already running is ignored, since the worker thread may be
        // mid-read of the old one.
        if self.running.load(Ordering::Acquire) {
            return;
        }
        *self.error_handler.lock() = handler;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn start(&self, _priority: Priority) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let queue = self.queue.clone();
        let pool = self.pool.clone();
        let running = self.running.clone();
        let reported_near_full = self.reported_near_full.clone();
        let error_handler = self.error_handler.clone();

        let join = thread::spawn(move || {
            do_work(&queue, &pool, &running, &reported_near_full, &error_handler);
        });
        *self.handle.lock() = Some(join);
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(join) = self.handle.lock().take() {
            let _ = join.join();
        }
    }
}

fn do_work(
    queue: &WorkQueue<WorkItem>,
    pool: &ArgStorePool,
    running: &AtomicBool,
    reported_near_full: &AtomicBool,
    error_handler: &ErrorHandler,
) {
    while running.load(Ordering::Acquire) {
        if let Some(item) = queue.try_pop() {
            report_near_full_once(queue, reported_near_full, error_handler);
            process_item(item, pool, error_handler);
            continue;
        }
        thread::sleep(POLL_INTERVAL);
    }

    // Drain whatever is left so a stop() doesn't silently discard entries
    // pushed right before the flag flipped.
    while let Some(item) = queue.try_pop() {
        report_near_full_once(queue, reported_near_full, error_handler);
        process_item(item, pool, error_handler);
    }
}

/// Reports a near-full queue to the error handler at most once across the
/// worker's entire lifetime — not once per excursion above the threshold,
/// per spec.md §8's testable property ("at most once with the near-full
/// message"). Once tripped, this stays tripped until the worker restarts.
fn report_near_full_once(queue: &WorkQueue<WorkItem>, reported: &AtomicBool, error_handler: &ErrorHandler) {
    if queue.is_almost_full() && !reported.swap(true, Ordering::AcqRel) {
        (error_handler.lock())("ranlog: backend queue is almost full");
    }
}

fn process_item(item: WorkItem, pool: &ArgStorePool, error_handler: &ErrorHandler) {
    match item {
        WorkItem::Entry(entry) => process_entry(entry, pool, error_handler),
        WorkItem::Flush(cmd) => {
            for sink in &cmd.sinks {
                if let Err(e) = sink.lock().flush() {
                    (error_handler.lock())(&e.to_string());
                }
            }
            cmd.signal_done();
        }
    }
}

/// Renders `template` against the pooled store at `handle`, freeing the
/// store afterwards regardless of outcome. A panic mid-render (malformed
/// template) or a [`FormatError`] both fall back to appending the spec's
/// `" -> ..."` diagnostic suffix rather than losing the entry.
fn render_template(pool: &ArgStorePool, template: &'static str, handle: crate::pool::ArgHandle) -> String {
    let mut rendered = String::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pool.with(handle, |store| args::render(template, store, &mut rendered))));
    pool.dealloc(handle);
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => rendered.push_str(&format!(" -> {e}")),
        Err(_) => rendered.push_str(&format!(" -> Invalid format string: \"{template}\"")),
    }
    rendered
}

fn process_entry(entry: LogEntry, pool: &ArgStorePool, error_handler: &ErrorHandler) {
    let LogEntry { sink, metadata, payload } = entry;

    let mut guard = sink.lock();
    let bytes = match payload {
        Payload::Template { template, args: handle } => {
            let rendered = render_template(pool, template, handle);
            guard.formatter().format(&metadata, &rendered, None)
        }
        Payload::HexDump { message, bytes } => guard.formatter().format(&metadata, &message, Some(&bytes)),
        Payload::ContextDump { context, template, args } => {
            let rendered = match (template, args) {
                (Some(template), Some(handle)) => Some(render_template(pool, template, handle)),
                _ => None,
            };
            guard.formatter().format_context(&metadata, &context, rendered.as_deref())
        }
    };

    if let Err(e) = guard.write(&bytes) {
        drop(guard);
        (error_handler.lock())(&e.to_string());
    }
}
