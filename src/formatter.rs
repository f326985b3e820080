//! Pluggable rendering of a drained entry into bytes for a sink.
//!
//! Mirrors the original's `log_formatter` interface (`format`,
//! `format_context_begin/end`, `format_metric_set_begin/end`, `format_metric`,
//! `format_list_begin/end`) — a visitor walked over the context tree by
//! [`crate::backend`] when an entry carries a [`crate::entry::Payload::ContextDump`].

use crate::context::{Context, MetricValue};
use crate::entry::LogEntryMetadata;

/// Produces formatted byte buffers for both plain log lines and structured
/// context dumps. Implementations must not allocate more than necessary on
/// the backend worker's hot path; `Text` and `Json` both reuse a single
/// `String` buffer per call.
pub trait Formatter: Send + Sync {
    /// Renders a single already-expanded log line with its metadata prefix.
    /// `hex_dump`, when present, is the raw trailing byte dump so each
    /// formatter can render it its own way (inline text vs. a separate JSON
    /// field) rather than receiving it pre-folded into `message`.
    fn format(&self, metadata: &LogEntryMetadata, message: &str, hex_dump: Option<&[u8]>) -> Vec<u8>;

    /// Renders a full structured-context dump. `message`, when present, is
    /// the rendered template from the `emit(context, template, args…)`
    /// overload accompanying the dump.
    fn format_context(&self, metadata: &LogEntryMetadata, context: &Context, message: Option<&str>) -> Vec<u8>;
}

/// Renders `bytes` as space-separated lowercase hex pairs, e.g. `"48 65
/// 6c"`, the shape a JSON `hex_dump` field carries.
pub(crate) fn hex_bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

pub(crate) fn metric_value_to_string(value: &MetricValue) -> String {
    match value {
        MetricValue::Int(v) => v.to_string(),
        MetricValue::Float(v) => v.to_string(),
        MetricValue::Str(v) => v.clone(),
    }
}
