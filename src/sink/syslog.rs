//! syslog sink.
//!
//! Grounded in `syslog_sink.h`: opens the connection once via `openlog`,
//! classifies severity by scanning the rendered text for `"[E]"`, `"[W]"`,
//! `"[I]"`, `"[D]"` substrings (first match wins, defaulting to `LOG_ERR`
//! when none match — a quirk of the original carried forward deliberately,
//! see `DESIGN.md`), and calls `syslog(3)` directly through `libc` rather
//! than a higher-level crate, matching the raw-FFI style other examples in
//! this domain use for the same facility.

use std::ffi::CString;
use std::io;
use std::sync::Arc;

use crate::formatter::Formatter;
use crate::sink::Sink;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Facility {
    User,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl Facility {
    fn to_raw(self) -> libc::c_int {
        match self {
            Facility::User => libc::LOG_USER,
            Facility::Local0 => libc::LOG_LOCAL0,
            Facility::Local1 => libc::LOG_LOCAL1,
            Facility::Local2 => libc::LOG_LOCAL2,
            Facility::Local3 => libc::LOG_LOCAL3,
            Facility::Local4 => libc::LOG_LOCAL4,
            Facility::Local5 => libc::LOG_LOCAL5,
            Facility::Local6 => libc::LOG_LOCAL6,
            Facility::Local7 => libc::LOG_LOCAL7,
        }
    }
}

/// Picks a syslog priority by scanning for the first matching level tag.
fn classify_priority(rendered: &str) -> libc::c_int {
    if rendered.contains("[E]") {
        libc::LOG_ERR
    } else if rendered.contains("[W]") {
        libc::LOG_WARNING
    } else if rendered.contains("[I]") {
        libc::LOG_INFO
    } else if rendered.contains("[D]") {
        libc::LOG_DEBUG
    } else {
        libc::LOG_ERR
    }
}

pub struct SyslogSink {
    id: String,
    formatter: Arc<dyn Formatter>,
    // Held for the lifetime of the sink: `openlog` keeps a reference to the
    // ident string rather than copying it.
    _ident: Option<CString>,
}

impl SyslogSink {
    pub fn new(id: impl Into<String>, preamble: &str, facility: Facility, formatter: Arc<dyn Formatter>) -> Self {
        let ident = if preamble.is_empty() { None } else { CString::new(preamble).ok() };
        let ident_ptr = ident.as_ref().map(|c| c.as_ptr()).unwrap_or(std::ptr::null());

        unsafe {
            libc::openlog(ident_ptr, libc::LOG_CONS | libc::LOG_PID | libc::LOG_NDELAY, facility.to_raw());
        }

        SyslogSink { id: id.into(), formatter, _ident: ident }
    }
}

impl Sink for SyslogSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let rendered = String::from_utf8_lossy(bytes);
        let priority = classify_priority(&rendered);
        let message = match CString::new(rendered.as_bytes()) {
            Ok(c) => c,
            Err(_) => CString::new(rendered.replace('\0', "")).unwrap_or_default(),
        };
        unsafe {
            libc::syslog(priority, c"%s".as_ptr(), message.as_ptr());
        }
        Ok(())
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

impl Drop for SyslogSink {
    fn drop(&mut self) {
        unsafe {
            libc::closelog();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_tag_wins() {
        assert_eq!(classify_priority("[E] boom"), libc::LOG_ERR);
        assert_eq!(classify_priority("[W] careful"), libc::LOG_WARNING);
        assert_eq!(classify_priority("[I] fyi"), libc::LOG_INFO);
        assert_eq!(classify_priority("[D] trace"), libc::LOG_DEBUG);
    }

    #[test]
    fn no_tag_defaults_to_error() {
        assert_eq!(classify_priority("plain message"), libc::LOG_ERR);
    }

    #[test]
    fn earliest_tag_in_chain_wins_when_multiple_present() {
        // [E] is checked before [W], even if [W] also appears.
        assert_eq!(classify_priority("[W] then [E] later"), libc::LOG_ERR);
    }
}
