//! Asynchronous, multi-sink, structured logging runtime.
//!
//! Producer threads fetch a [`channel::LogChannel`] or [`logger::BasicLogger`]
//! from the global façade and call into it; the call only renders an
//! argument store and pushes a queue entry, it never performs I/O itself.
//! A single background thread ([`backend::Backend`]) drains the queue,
//! renders each entry's printf-style template, and writes the result to
//! whichever [`sink::Sink`] the entry was addressed to.
//!
//! ```no_run
//! use ranlog::facade;
//! use ranlog::backend::Priority;
//! use ranlog::args::ArgValue;
//!
//! facade().init(Priority::Normal);
//! let channel = facade().fetch_log_channel("app");
//! channel.log("starting up, pid=%d", &[ArgValue::I64(std::process::id() as i64)]);
//! facade().flush();
//! ```

pub mod args;
pub mod backend;
pub mod channel;
pub mod context;
pub mod entry;
pub mod error;
pub mod facade;
pub mod format;
pub mod formatter;
pub mod logger;
pub mod pool;
pub mod queue;
pub mod repository;
pub mod sink;
pub mod trace;

pub use facade::facade;
