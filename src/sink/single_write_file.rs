//! Single-write file sink: buffers everything and performs exactly one
//! write, either when the buffer overflows or when the sink is dropped.
//!
//! Grounded in `single_write_file_sink.h`. Useful for short-lived
//! diagnostics files the caller wants written atomically in one syscall.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

use crate::formatter::Formatter;
use crate::sink::Sink;

pub struct SingleWriteFileSink {
    id: String,
    path: String,
    buffer: Vec<u8>,
    capacity: usize,
    written: bool,
    formatter: Arc<dyn Formatter>,
}

impl SingleWriteFileSink {
    pub fn new(id: impl Into<String>, path: impl Into<String>, capacity: usize, formatter: Arc<dyn Formatter>) -> Self {
        SingleWriteFileSink {
            id: id.into(),
            path: path.into(),
            buffer: Vec::with_capacity(capacity),
            capacity,
            written: false,
            formatter,
        }
    }

    fn has_room_for(&self, size: usize) -> bool {
        size + self.buffer.len() < self.capacity
    }

    fn write_contents(&mut self) -> io::Result<()> {
        if self.written {
            return Ok(());
        }
        self.written = true;
        let mut file = File::create(&self.path)?;
        file.write_all(&self.buffer)
    }
}

impl Sink for SingleWriteFileSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.written {
            return Ok(());
        }
        if self.has_room_for(bytes.len()) {
            self.buffer.extend_from_slice(bytes);
            Ok(())
        } else {
            self.write_contents()
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SingleWriteFileSink {
    fn drop(&mut self) {
        let _ = self.write_contents();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn nothing_written_until_overflow_or_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.log");
        {
            let mut sink = SingleWriteFileSink::new("s", path.to_str().unwrap(), 64, Arc::new(crate::format::TextFormatter));
            sink.write(b"small").unwrap();
            assert!(!path.exists());
        }
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"small");
    }

    #[test]
    fn overflow_triggers_immediate_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.log");
        let mut sink = SingleWriteFileSink::new("s", path.to_str().unwrap(), 4, Arc::new(crate::format::TextFormatter));
        sink.write(b"toolong").unwrap();
        assert!(path.exists());
    }
}
