//! End-to-end scenarios run against the backend worker and a custom
//! in-memory sink, bypassing the global façade so tests stay isolated from
//! each other and from stdout/stderr.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use parking_lot::Mutex;

use ranlog::args::ArgValue;
use ranlog::backend::{Backend, Priority};
use ranlog::channel::{LogChannel, LogChannelConfig};
use ranlog::context::{Context, Metric, MetricList, MetricSet};
use ranlog::entry::{FlushCommand, WorkItem};
use ranlog::format::{JsonFormatter, TextFormatter};
use ranlog::formatter::Formatter;
use ranlog::pool::ArgStorePool;
use ranlog::queue::WorkQueue;
use ranlog::sink::{Sink, SinkHandle};

struct CapturingSink {
    id: String,
    formatter: Arc<dyn Formatter>,
    writes: Arc<StdMutex<Vec<Vec<u8>>>>,
}

impl Sink for CapturingSink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writes.lock().unwrap().push(bytes.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    fn id(&self) -> &str {
        &self.id
    }
}

struct Harness {
    backend: Backend,
    queue: Arc<WorkQueue<WorkItem>>,
    pool: Arc<ArgStorePool>,
    writes: Arc<StdMutex<Vec<Vec<u8>>>>,
    sink: SinkHandle,
}

impl Harness {
    fn new(formatter: Arc<dyn Formatter>) -> Self {
        let queue = Arc::new(WorkQueue::new(64));
        let pool = Arc::new(ArgStorePool::new(64));
        let writes = Arc::new(StdMutex::new(Vec::new()));
        let sink: SinkHandle = Arc::new(Mutex::new(CapturingSink { id: "capture".into(), formatter, writes: writes.clone() }));
        let backend = Backend::new(queue.clone(), pool.clone());
        backend.start(Priority::Normal);
        Harness { backend, queue, pool, writes, sink }
    }

    fn channel(&self, config: LogChannelConfig) -> Arc<LogChannel> {
        Arc::new(LogChannel::new(config, self.sink.clone(), self.queue.clone(), self.pool.clone()))
    }

    fn flush(&self) {
        let cmd = FlushCommand::new(vec![self.sink.clone()]);
        let completed = cmd.completed.clone();
        self.queue.push(WorkItem::Flush(cmd));
        let mut waited = Duration::ZERO;
        while !completed.load(std::sync::atomic::Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
            waited += Duration::from_millis(1);
            assert!(waited < Duration::from_secs(5), "flush never completed");
        }
    }

    fn captured(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.backend.stop();
    }
}

#[test]
fn s1_plain_entry_full_metadata_text() {
    let h = Harness::new(Arc::new(TextFormatter));
    let mut cfg = LogChannelConfig::new("ABC");
    cfg.tag = 'Z';
    cfg.should_print_context = true;
    let channel = h.channel(cfg);
    channel.set_context(10);

    channel.log("Text %d", &[ArgValue::I64(88)]);
    h.flush();

    let writes = h.captured();
    assert_eq!(writes.len(), 1);
    let text = String::from_utf8(writes[0].clone()).unwrap();
    assert!(text.starts_with("20") || text.starts_with("19"), "begins with a calendar date: {text}");
    assert!(text.ends_with(" [ABC    ] [Z] [   10] Text 88\n"), "got: {text}");
}

#[test]
fn s2_empty_channel_name_omits_name_bracket() {
    let h = Harness::new(Arc::new(TextFormatter));
    let mut cfg = LogChannelConfig::new("");
    cfg.tag = 'Z';
    cfg.should_print_context = true;
    let channel = h.channel(cfg);
    channel.set_context(10);

    channel.log("Text %d", &[ArgValue::I64(88)]);
    h.flush();

    let text = String::from_utf8(h.captured()[0].clone()).unwrap();
    assert!(text.ends_with(" [Z] [   10] Text 88\n"), "got: {text}");
    assert!(!text.contains("[ABC"));
}

#[test]
fn s3_hex_dump_of_twenty_bytes_wraps_at_sixteen() {
    let h = Harness::new(Arc::new(TextFormatter));
    let channel = h.channel(LogChannelConfig::new("HEX"));

    let bytes: Vec<u8> = (0..20u8).collect();
    channel.log_hex("dump", &bytes);
    h.flush();

    let text = String::from_utf8(h.captured()[0].clone()).unwrap();
    assert!(text.contains("    0000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f\n"));
    assert!(text.contains("    0010: 10 11 12 13\n"));
}

#[test]
fn s4_structured_context_json_has_no_trailing_commas_and_nested_list() {
    let h = Harness::new(Arc::new(JsonFormatter));
    let channel = h.channel(LogChannelConfig::new("CTX"));

    let mut ctx = Context::new("sector");
    let mut sector_list = MetricList::new("sector_list");
    let mut sector_metrics = MetricSet::new("sector_metrics");
    sector_metrics.push(Metric::string("type", "event"));
    sector_metrics.push(Metric::numeric("sector_id", "", 1i64));

    let mut ue_list = MetricList::new("ue_list");
    for i in 0..2 {
        let mut ue = MetricSet::new("ue_container");
        ue.push(Metric::numeric("rnti", "", i as i64));
        let mut bearer_list = MetricList::new("bearer_list");
        bearer_list.push(MetricSet::new("bearer0"));
        bearer_list.push(MetricSet::new("bearer1"));
        ue.push(bearer_list);
        ue_list.push(ue);
    }
    sector_metrics.push(ue_list);
    sector_list.push(sector_metrics);
    ctx.push(sector_list);

    channel.log_context(ctx);
    h.flush();

    let bytes = h.captured()[0].clone();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(!text.contains(",\n}"), "no trailing commas before a closing brace: {text}");
    assert!(!text.contains(",\n]"), "no trailing commas before a closing bracket: {text}");

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["sector_list"][0]["sector_metrics"]["type"], "event");
    assert_eq!(value["sector_list"][0]["sector_metrics"]["sector_id"], 1);
    assert_eq!(value["sector_list"][0]["sector_metrics"]["ue_list"][0]["ue_container"]["rnti"], 0);
    assert_eq!(value["sector_list"][0]["sector_metrics"]["ue_list"][1]["ue_container"]["bearer_list"][1]["bearer1"], serde_json::json!({}));
}

#[test]
fn s5_inline_context_wraps_sets_in_brackets_with_set_prefixed_metric_names() {
    let h = Harness::new(Arc::new(TextFormatter));
    let channel = h.channel(LogChannelConfig::new("CTX"));

    let mut ctx = Context::new("sector").oneline(true);
    let mut set = MetricSet::new("radio");
    set.push(Metric::numeric("throughput", "Mbps", 88i64));
    ctx.push(set);

    channel.log_context(ctx);
    h.flush();

    let text = String::from_utf8(h.captured()[0].clone()).unwrap();
    assert!(text.contains("[radio_throughput: 88 Mbps]"), "got: {text}");
}

#[test]
fn s5b_inline_context_with_template_appends_rendered_suffix() {
    let h = Harness::new(Arc::new(TextFormatter));
    let channel = h.channel(LogChannelConfig::new("CTX"));

    let mut ctx = Context::new("sector").oneline(true);
    let mut set = MetricSet::new("radio");
    set.push(Metric::numeric("throughput", "Mbps", 88i64));
    ctx.push(set);

    channel.log_context_fmt(ctx, Some("Text %d"), &[ArgValue::I64(88)]);
    h.flush();

    let text = String::from_utf8(h.captured()[0].clone()).unwrap();
    assert!(text.ends_with("[radio_throughput: 88 Mbps]: Text 88\n"), "got: {text}");
}

#[test]
fn s6_flush_drains_all_three_entries_in_push_order() {
    let h = Harness::new(Arc::new(TextFormatter));
    let channel = h.channel(LogChannelConfig::new("ORD"));

    channel.log("one %d", &[ArgValue::I64(1)]);
    channel.log("two %d", &[ArgValue::I64(2)]);
    channel.log("three %d", &[ArgValue::I64(3)]);
    h.flush();

    let writes = h.captured();
    assert_eq!(writes.len(), 3);
    assert!(String::from_utf8(writes[0].clone()).unwrap().ends_with("one 1\n"));
    assert!(String::from_utf8(writes[1].clone()).unwrap().ends_with("two 2\n"));
    assert!(String::from_utf8(writes[2].clone()).unwrap().ends_with("three 3\n"));
}
