//! Error types surfaced at sink-construction call sites.
//!
//! Everything past construction — write failures, flush failures, invalid
//! format templates — is funneled through the installed error handler as a
//! rendered string (see [`crate::backend`]), never as one of these enums;
//! producers on other threads never see them.

use std::fmt;

/// Errors raised while building or validating a sink.
#[derive(Debug)]
pub enum SinkError {
    /// The requested rotation/buffer size was below the allowed minimum.
    SizeTooSmall { requested: u64, minimum: u64 },
    /// A size string such as `"10MB"` could not be parsed.
    InvalidSizeString(String),
    /// The underlying file could not be created or opened.
    Io(std::io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::SizeTooSmall { requested, minimum } => write!(
                f,
                "requested size {requested} bytes is below the minimum of {minimum} bytes"
            ),
            SinkError::InvalidSizeString(s) => write!(f, "invalid size string: '{s}'"),
            SinkError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

/// Errors raised by the printf-style template renderer.
#[derive(Debug)]
pub enum FormatError {
    /// The template referenced more arguments than the store held, or used
    /// an unsupported conversion.
    InvalidTemplate(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidTemplate(t) => write!(f, "Invalid format string: \"{t}\""),
        }
    }
}

impl std::error::Error for FormatError {}

/// Convenience alias for fallible sink construction.
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Parses a human-readable size string (`"500B"`, `"5KB"`, `"10MB"`,
/// `"1GB"`) into a byte count.
///
/// Mirrors the teacher crate's `backend::file::parse_size_limit` helper.
pub fn parse_size_str(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut num_end = s.len();
    for (i, c) in s.char_indices() {
        if !c.is_ascii_digit() {
            num_end = i;
            break;
        }
    }
    if num_end == 0 {
        return None;
    }

    let num_str = &s[..num_end];
    let unit = s[num_end..].trim().to_uppercase();
    let multiplier: u64 = match unit.as_str() {
        "B" | "" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        _ => return None,
    };

    num_str.parse::<u64>().ok().map(|n| n * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_bytes() {
        assert_eq!(parse_size_str("500B"), Some(500));
        assert_eq!(parse_size_str("500"), Some(500));
    }

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!(parse_size_str("5kb"), Some(5 * 1024));
        assert_eq!(parse_size_str("10Mb"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size_str("1gb"), Some(1024 * 1024 * 1024));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_size_str("banana"), None);
        assert_eq!(parse_size_str(""), None);
        assert_eq!(parse_size_str("MB"), None);
    }
}
