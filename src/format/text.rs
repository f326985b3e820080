//! Human-readable text formatter.
//!
//! Grounded in the original's `text_formatter.cpp`: a metadata prefix
//! (`timestamp [name   ] [tag] [context] `), the rendered message, and an
//! optional hex dump appended on its own indented lines.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::context::{Context, Node};
use crate::entry::LogEntryMetadata;
use crate::formatter::{self, Formatter};

pub struct TextFormatter;

fn format_timestamp(ts: SystemTime) -> String {
    let datetime: DateTime<Utc> = ts.into();
    let micros = datetime.timestamp_subsec_micros();
    format!("{}.{:06}", datetime.format("%Y-%m-%dT%H:%M:%S"), micros)
}

fn format_metadata(md: &LogEntryMetadata) -> String {
    let mut out = format!("{} ", format_timestamp(md.timestamp));
    if !md.channel_name.is_empty() {
        out.push_str(&format!("[{:<7}] ", md.channel_name));
    }
    if md.channel_tag != '\0' {
        out.push_str(&format!("[{}] ", md.channel_tag));
    }
    if md.context.enabled {
        out.push_str(&format!("[{:5}] ", md.context.value));
    }
    out
}

/// `level*2` spaces, matching the source's `get_indents`.
fn indent(level: usize) -> String {
    " ".repeat(level * 2)
}

/// Block style renders one header line per set/list (`> Set: name` /
/// `> List: name`) followed by its children indented one level deeper, and
/// a plain `name: value units` line per metric — matching the source's
/// recursive `format_metric_set`/`format_list` text-formatter branches.
fn format_context_block(ctx: &Context) -> String {
    let mut out = format!("Context dump for \"{}\"\n", ctx.name);
    write_block_children(&ctx.children, 1, &mut out);
    out
}

fn write_block_children(children: &[Node], level: usize, out: &mut String) {
    for child in children {
        match child {
            Node::Metric(metric) => {
                let value = formatter::metric_value_to_string(&metric.value);
                let units = if metric.units.is_empty() { String::new() } else { format!(" {}", metric.units) };
                out.push_str(&format!("{}{}: {}{}\n", indent(level), metric.name, value, units));
            }
            Node::Set(set) => {
                out.push_str(&format!("{}> Set: {}\n", indent(level), set.name));
                write_block_children(&set.children, level + 1, out);
            }
            Node::List(list) => {
                out.push_str(&format!("{}> List: {}\n", indent(level), list.name));
                for item in &list.items {
                    out.push_str(&format!("{}> Set: {}\n", indent(level + 1), item.name));
                    write_block_children(&item.children, level + 2, out);
                }
            }
        }
    }
}

fn format_metric_part(metric: &crate::context::Metric, set_name: Option<&str>) -> String {
    let full_name = match set_name {
        Some(s) if !s.is_empty() => format!("{s}_{}", metric.name),
        _ => metric.name.to_string(),
    };
    let value = formatter::metric_value_to_string(&metric.value);
    let units = if metric.units.is_empty() { String::new() } else { format!(" {}", metric.units) };
    format!("{full_name}: {value}{units}")
}

fn collect_set_parts(set: &crate::context::MetricSet, parts: &mut Vec<String>) {
    for child in &set.children {
        match child {
            Node::Metric(m) => parts.push(format_metric_part(m, Some(set.name))),
            Node::Set(nested) => collect_set_parts(nested, parts),
            Node::List(list) => {
                for item in &list.items {
                    collect_set_parts(item, parts);
                }
            }
        }
    }
}

/// Inline style wraps each top-level set as its own bracket group (`[k1:
/// v1 units, k2: v2 units, ...]`), prefixing each metric name with its
/// enclosing set's name — matching `text_formatter::format_metric_set_begin/
/// end`'s per-set bracketing, not one bracket around the whole dump. Bare
/// top-level metrics (outside any set) share a single trailing bracket.
fn format_context_inline(ctx: &Context) -> String {
    let mut out = String::new();
    let mut bare_parts: Vec<String> = Vec::new();

    for child in &ctx.children {
        match child {
            Node::Metric(m) => bare_parts.push(format_metric_part(m, None)),
            Node::Set(set) => {
                let mut parts = Vec::new();
                collect_set_parts(set, &mut parts);
                out.push_str(&format!("[{}]", parts.join(", ")));
            }
            Node::List(list) => {
                for item in &list.items {
                    let mut parts = Vec::new();
                    collect_set_parts(item, &mut parts);
                    out.push_str(&format!("[{}]", parts.join(", ")));
                }
            }
        }
    }

    if !bare_parts.is_empty() {
        out.push_str(&format!("[{}]", bare_parts.join(", ")));
    }

    out
}

fn format_hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        out.push_str(&format!("    {:04x}: {}\n", i * 16, hex.join(" ")));
    }
    out
}

impl Formatter for TextFormatter {
    fn format(&self, metadata: &LogEntryMetadata, message: &str, hex_dump: Option<&[u8]>) -> Vec<u8> {
        let mut out = format_metadata(metadata);
        out.push_str(message);
        if let Some(bytes) = hex_dump {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&format_hex_dump(bytes));
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.into_bytes()
    }

    fn format_context(&self, metadata: &LogEntryMetadata, context: &Context, message: Option<&str>) -> Vec<u8> {
        let mut out = format_metadata(metadata);
        if context.oneline {
            out.push_str(&format_context_inline(context));
            if let Some(msg) = message {
                out.push_str(": ");
                out.push_str(msg);
            }
            out.push('\n');
        } else {
            if let Some(msg) = message {
                out.push_str(msg);
            }
            out.push('\n');
            out.push_str(&format_context_block(context));
        }
        out.into_bytes()
    }
}
