//! JSON formatter.
//!
//! Grounded in the original's `json_formatter.cpp`, including its
//! list-of-sets double-nesting idiom: a `metric_set` nested directly inside
//! a `metric_list` gets wrapped in an extra anonymous object so each list
//! element is `{ "<set name>": { ...fields... } }` rather than a bare set
//! body, and the nesting level is bumped for the wrapper independently of
//! the set's own body.

use serde_json::{Map, Value};

use crate::context::{Context, MetricValue, Node};
use crate::entry::LogEntryMetadata;
use crate::formatter::{self, Formatter};

pub struct JsonFormatter;

fn metric_value_to_json(value: &MetricValue) -> Value {
    match value {
        MetricValue::Int(v) => Value::from(*v),
        MetricValue::Float(v) => Value::from(*v),
        MetricValue::Str(v) => Value::from(v.clone()),
    }
}

fn node_to_json(node: &Node) -> Value {
    match node {
        Node::Metric(_) => unreachable!("metrics are folded into their enclosing object"),
        Node::Set(set) => {
            let mut obj = Map::new();
            for child in &set.children {
                match child {
                    Node::Metric(m) => {
                        obj.insert(m.name.to_string(), metric_value_to_json(&m.value));
                    }
                    Node::Set(_) | Node::List(_) => {
                        let (name, value) = named_node_to_json(child);
                        obj.insert(name, value);
                    }
                }
            }
            Value::Object(obj)
        }
        Node::List(list) => {
            // Each element gets the double-nesting wrapper: `{ "<set>": {...} }`.
            let items: Vec<Value> = list
                .items
                .iter()
                .map(|set| {
                    let mut wrapper = Map::new();
                    wrapper.insert(set.name.to_string(), node_to_json(&Node::Set(set.clone())));
                    Value::Object(wrapper)
                })
                .collect();
            Value::Array(items)
        }
    }
}

fn named_node_to_json(node: &Node) -> (String, Value) {
    match node {
        Node::Metric(m) => (m.name.to_string(), metric_value_to_json(&m.value)),
        Node::Set(set) => (set.name.to_string(), node_to_json(&Node::Set(set.clone()))),
        Node::List(list) => (list.name.to_string(), node_to_json(&Node::List(list.clone()))),
    }
}

fn context_to_json(ctx: &Context) -> Value {
    let mut root = Map::new();
    for child in &ctx.children {
        let (name, value) = named_node_to_json(child);
        root.insert(name, value);
    }
    Value::Object(root)
}

impl Formatter for JsonFormatter {
    /// A plain entry's JSON body carries its rendered message under
    /// `"log_entry"` — metadata (timestamp, tag, context) is the text
    /// formatter's concern, not this one's. A non-empty `hex_dump` gets its
    /// own `"hex_dump"` field of space-separated hex byte pairs; an empty or
    /// absent dump omits the field entirely.
    fn format(&self, _metadata: &LogEntryMetadata, message: &str, hex_dump: Option<&[u8]>) -> Vec<u8> {
        let mut obj = Map::new();
        obj.insert("log_entry".to_string(), Value::from(message.to_string()));
        if let Some(bytes) = hex_dump {
            if !bytes.is_empty() {
                obj.insert("hex_dump".to_string(), Value::from(formatter::hex_bytes_to_string(bytes)));
            }
        }
        let mut out = serde_json::to_vec_pretty(&Value::Object(obj)).unwrap_or_default();
        out.push(b'\n');
        out
    }

    /// A context dump's root object *is* the context's own fields; the
    /// context's name does not add an extra wrapping key, matching the
    /// source's `format_context_begin` which opens `"{\n"` directly. An
    /// accompanying template, if any, is folded in under `"log_entry"`
    /// alongside the context fields.
    fn format_context(&self, _metadata: &LogEntryMetadata, context: &Context, message: Option<&str>) -> Vec<u8> {
        let Value::Object(mut root) = context_to_json(context) else {
            unreachable!("context_to_json always builds an object")
        };
        if let Some(msg) = message {
            root.insert("log_entry".to_string(), Value::from(msg.to_string()));
        }
        let mut out = serde_json::to_vec_pretty(&Value::Object(root)).unwrap_or_default();
        out.push(b'\n');
        out
    }
}
