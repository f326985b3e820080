//! Dynamic structured-context tree.
//!
//! The original source builds this tree at compile time out of nested
//! `std::tuple`s (`metric<Ty,Name,Units>`, `metric_set<Name,Ts...>`,
//! `context<Ts...>`, assembled via the `DECLARE_METRIC*` macros and walked
//! with `get<T>()`/`at<T>()`). Rust has no ergonomic equivalent without
//! fighting const generics, so this is a deliberate redesign into a dynamic
//! tree of trait-free enums, built with plain builder methods and walked by
//! insertion order — see `DESIGN.md`.

/// A leaf value: either numeric or a string, matching the source's
/// `metric_kind_selector` (numeric for arithmetic types, string otherwise).
#[derive(Debug, Clone)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// A single named measurement with a unit label (may be empty).
#[derive(Debug, Clone)]
pub struct Metric {
    pub name: &'static str,
    pub units: &'static str,
    pub value: MetricValue,
}

impl Metric {
    pub fn numeric(name: &'static str, units: &'static str, value: impl Into<MetricValue>) -> Self {
        Metric { name, units, value: value.into() }
    }

    pub fn string(name: &'static str, value: impl Into<String>) -> Self {
        Metric { name, units: "", value: MetricValue::Str(value.into()) }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}
impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// A named grouping of metrics and/or nested sets/lists, insertion-ordered.
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    pub name: &'static str,
    pub children: Vec<Node>,
}

impl MetricSet {
    pub fn new(name: &'static str) -> Self {
        MetricSet { name, children: Vec::new() }
    }

    pub fn push(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }
}

/// A named, homogeneous list of metric sets (the source's `metric_list`).
#[derive(Debug, Clone, Default)]
pub struct MetricList {
    pub name: &'static str,
    pub items: Vec<MetricSet>,
}

impl MetricList {
    pub fn new(name: &'static str) -> Self {
        MetricList { name, items: Vec::new() }
    }

    pub fn push(&mut self, set: MetricSet) -> &mut Self {
        self.items.push(set);
        self
    }
}

/// A node in the context tree: one of a leaf metric, a nested set, or a
/// nested list of sets.
#[derive(Debug, Clone)]
pub enum Node {
    Metric(Metric),
    Set(MetricSet),
    List(MetricList),
}

impl From<Metric> for Node {
    fn from(m: Metric) -> Self {
        Node::Metric(m)
    }
}
impl From<MetricSet> for Node {
    fn from(s: MetricSet) -> Self {
        Node::Set(s)
    }
}
impl From<MetricList> for Node {
    fn from(l: MetricList) -> Self {
        Node::List(l)
    }
}

/// The root of a structured-context dump, named after the logical
/// subsystem it describes (e.g. "scheduler_ul").
///
/// `oneline` selects the text formatter's compact `[k: v, ...]` rendering
/// (the source's `do_one_line_ctx_format`, driven there by whether the
/// entry also carried a format string); the JSON formatter ignores it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub name: String,
    pub children: Vec<Node>,
    pub oneline: bool,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context { name: name.into(), children: Vec::new(), oneline: false }
    }

    pub fn oneline(mut self, oneline: bool) -> Self {
        self.oneline = oneline;
        self
    }

    pub fn push(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }
}
