//! Size-rotating file sink.
//!
//! Grounded in `file_sink.h` / `file_utils.h`: rotation is clamped to a
//! 4KiB minimum unless disabled (`max_size == 0`), and rotated filenames are
//! built by inserting `.<index>` before the extension, with leading-dot,
//! trailing-dot, and directory-dot filenames treated as having no
//! extension to split on.

use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

use crate::error::{SinkError, SinkResult, parse_size_str};
use crate::formatter::Formatter;
use crate::sink::Sink;

/// Minimum rotation threshold; smaller requests are clamped up to this.
pub const MIN_ROTATION_SIZE: u64 = 4 * 1024;

/// Splits `path` into `(stem, ext)` where `ext` includes the leading dot.
///
/// Returns `(path, "")` when there is no splittable extension: no dot at
/// all, a dot at the very start of the filename (a hidden file like
/// `.bashrc`), a dot at the very end (`"name."`), or a dot that belongs to a
/// directory component rather than the filename itself.
pub fn split_filename_extension(path: &str) -> (String, String) {
    let sep_pos = path.rfind('/');
    let filename_start = sep_pos.map(|p| p + 1).unwrap_or(0);

    let dot_pos = path.rfind('.');

    match dot_pos {
        None => (path.to_string(), String::new()),
        Some(pos) if pos == path.len() - 1 => (path.to_string(), String::new()),
        Some(pos) if pos <= filename_start => (path.to_string(), String::new()),
        Some(pos) => (path[..pos].to_string(), path[pos..].to_string()),
    }
}

/// Builds the filename for rotation index `index`: the bare `stem+ext` for
/// index 0, otherwise `stem.<index>ext`.
pub fn build_filename_with_index(stem: &str, ext: &str, index: u64) -> String {
    if index == 0 {
        format!("{stem}{ext}")
    } else {
        format!("{stem}.{index}{ext}")
    }
}

pub struct FileSink {
    id: String,
    stem: String,
    ext: String,
    max_size: u64,
    current_size: u64,
    index: u64,
    file: Option<File>,
    failed: bool,
    formatter: Arc<dyn Formatter>,
}

impl FileSink {
    /// `max_size` of `0` disables rotation entirely; any other value is
    /// clamped up to [`MIN_ROTATION_SIZE`].
    pub fn new(id: impl Into<String>, path: &str, max_size: u64, formatter: Arc<dyn Formatter>) -> Self {
        let (stem, ext) = split_filename_extension(path);
        let max_size = if max_size == 0 { 0 } else { max_size.max(MIN_ROTATION_SIZE) };
        FileSink {
            id: id.into(),
            stem,
            ext,
            max_size,
            current_size: 0,
            index: 0,
            file: None,
            failed: false,
            formatter,
        }
    }

    /// Convenience constructor accepting a human-readable size string such
    /// as `"10MB"`.
    pub fn with_size_str(id: impl Into<String>, path: &str, max_size: &str, formatter: Arc<dyn Formatter>) -> SinkResult<Self> {
        let bytes = parse_size_str(max_size).ok_or_else(|| SinkError::InvalidSizeString(max_size.to_string()))?;
        Ok(Self::new(id, path, bytes, formatter))
    }

    fn create_file(&mut self) -> io::Result<()> {
        let name = build_filename_with_index(&self.stem, &self.ext, self.index);
        self.index += 1;
        self.file = Some(File::create(name)?);
        Ok(())
    }

    fn handle_rotation(&mut self, size: u64) -> io::Result<()> {
        self.current_size += size;
        if self.max_size != 0 && self.current_size >= self.max_size {
            self.current_size = size;
            self.create_file()?;
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.failed {
            return Ok(());
        }
        if self.file.is_none() {
            if let Err(e) = self.create_file() {
                self.failed = true;
                return Err(e);
            }
        }
        if let Err(e) = self.handle_rotation(bytes.len() as u64) {
            self.failed = true;
            return Err(e);
        }
        match self.file.as_mut().unwrap().write_all(bytes) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    fn id(&self) -> &str {
        &self.id
    }
}
