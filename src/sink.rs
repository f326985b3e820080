//! Sink trait and the handle type entries carry to address one.

pub mod buffered_file;
pub mod file;
pub mod single_write_file;
pub mod stream;
pub mod syslog;

pub use buffered_file::BufferedFileSink;
pub use file::FileSink;
pub use single_write_file::SingleWriteFileSink;
pub use stream::{StreamSink, StreamTarget};
pub use syslog::{Facility, SyslogSink};

use std::sync::Arc;

use crate::formatter::Formatter;

/// A destination for rendered log bytes.
///
/// All methods run on the single backend worker thread, so implementations
/// need no internal synchronization for their own state — only for state
/// shared with other threads (none, in this crate's built-in sinks).
pub trait Sink: Send {
    /// Writes one already-formatted entry.
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Flushes any buffered bytes to the underlying resource.
    fn flush(&mut self) -> std::io::Result<()>;

    /// The formatter this sink renders entries with.
    fn formatter(&self) -> &dyn Formatter;

    /// A stable identifier used for sink repository lookups and for
    /// targeting this sink from a [`crate::entry::FlushCommand`].
    fn id(&self) -> &str;
}

/// Reference-counted, interior-mutable handle to a sink, shared between the
/// repository, channels, and the backend worker.
pub type SinkHandle = Arc<parking_lot::Mutex<dyn Sink>>;
