//! stdout/stderr sink.
//!
//! Grounded in `stream_sink.h`: every write is immediately followed by a
//! flush, since these streams are meant for interactive visibility rather
//! than throughput.

use std::io::{self, Write};
use std::sync::Arc;

use crate::formatter::Formatter;
use crate::sink::Sink;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
}

pub struct StreamSink {
    target: StreamTarget,
    formatter: Arc<dyn Formatter>,
    id: String,
}

impl StreamSink {
    pub fn new(id: impl Into<String>, target: StreamTarget, formatter: Arc<dyn Formatter>) -> Self {
        StreamSink { target, formatter, id: id.into() }
    }
}

impl Sink for StreamSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => {
                let mut handle = io::stdout();
                handle.write_all(bytes)?;
                handle.flush()
            }
            StreamTarget::Stderr => {
                let mut handle = io::stderr();
                handle.write_all(bytes)?;
                handle.flush()
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.target {
            StreamTarget::Stdout => io::stdout().flush(),
            StreamTarget::Stderr => io::stderr().flush(),
        }
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    fn id(&self) -> &str {
        &self.id
    }
}
