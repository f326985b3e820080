//! Buffered file sink: amortizes writes across a fixed-capacity buffer.
//!
//! Grounded in `buffered_file_sink.h`. `has_room_for` uses a strict `<`
//! comparison (`s + buffer.len() < capacity`), resolving the Open Question
//! about the boundary case; see `DESIGN.md`. When a write doesn't fit, the
//! existing buffer is flushed to the file first; if the new write still
//! doesn't fit the now-empty buffer it bypasses buffering and goes straight
//! to the file, rather than being silently dropped.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

use crate::formatter::Formatter;
use crate::sink::Sink;

pub struct BufferedFileSink {
    id: String,
    path: String,
    file: Option<File>,
    buffer: Vec<u8>,
    capacity: usize,
    formatter: Arc<dyn Formatter>,
}

impl BufferedFileSink {
    pub fn new(id: impl Into<String>, path: impl Into<String>, capacity: usize, formatter: Arc<dyn Formatter>) -> Self {
        BufferedFileSink {
            id: id.into(),
            path: path.into(),
            file: None,
            buffer: Vec::with_capacity(capacity),
            capacity,
            formatter,
        }
    }

    fn has_room_for(&self, size: usize) -> bool {
        size + self.buffer.len() < self.capacity
    }

    fn ensure_file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            self.file = Some(File::create(&self.path)?);
        }
        Ok(self.file.as_mut().unwrap())
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let file = self.ensure_file()?;
        file.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }
}

impl Sink for BufferedFileSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.has_room_for(bytes.len()) {
            self.buffer.extend_from_slice(bytes);
            return Ok(());
        }

        self.flush_buffer()?;

        if self.has_room_for(bytes.len()) {
            self.buffer.extend_from_slice(bytes);
            Ok(())
        } else {
            let file = self.ensure_file()?;
            file.write_all(bytes)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for BufferedFileSink {
    fn drop(&mut self) {
        let _ = self.flush_buffer();
    }
}
