//! Multi-level logger: a fixed, ordered list of channels gated by a single
//! level threshold.
//!
//! Mirrors `logger_impl<T, Enum>` / `basic_logger`: the channel at ordinal
//! `i` is enabled iff `i <= set_level()`'s ordinal, so raising the level
//! enables strictly more channels rather than replacing which one is live.

use std::sync::Arc;

use crate::channel::LogChannel;

/// The four standard severities, ordered from most to least critical —
/// matches the source's `basic_levels` (`error, warning, info, debug`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    fn ordinal(self) -> usize {
        match self {
            Level::Error => 0,
            Level::Warning => 1,
            Level::Info => 2,
            Level::Debug => 3,
        }
    }
}

/// A logger exposing one channel per severity level, all routed to the
/// same sink under the hood (channels differ only in name/tag/threshold).
pub struct BasicLogger {
    channels: [Arc<LogChannel>; 4],
}

impl BasicLogger {
    pub fn new(error: Arc<LogChannel>, warning: Arc<LogChannel>, info: Arc<LogChannel>, debug: Arc<LogChannel>) -> Self {
        BasicLogger { channels: [error, warning, info, debug] }
    }

    pub fn error(&self) -> &LogChannel {
        &self.channels[0]
    }
    pub fn warning(&self) -> &LogChannel {
        &self.channels[1]
    }
    pub fn info(&self) -> &LogChannel {
        &self.channels[2]
    }
    pub fn debug(&self) -> &LogChannel {
        &self.channels[3]
    }

    /// Enables every channel at or above `level`'s severity (lower ordinal)
    /// and disables the rest.
    pub fn set_level(&self, level: Level) {
        let threshold = level.ordinal();
        for (i, channel) in self.channels.iter().enumerate() {
            channel.set_enabled(i <= threshold);
        }
    }

    pub fn set_context(&self, value: u32) {
        for channel in &self.channels {
            channel.set_context(value);
        }
    }

    pub fn set_hex_dump_max_size(&self, max_size: Option<usize>) {
        for channel in &self.channels {
            channel.set_hex_dump_max_size(max_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgValue;
    use crate::format::TextFormatter;
    use crate::pool::ArgStorePool;
    use crate::queue::WorkQueue;
    use crate::sink::{StreamSink, StreamTarget};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn test_logger() -> BasicLogger {
        let queue = Arc::new(WorkQueue::new(16));
        let pool = Arc::new(ArgStorePool::new(16));
        let sink: crate::sink::SinkHandle = Arc::new(Mutex::new(StreamSink::new("stdout#", StreamTarget::Stdout, Arc::new(TextFormatter))));

        let make = |name: &str| {
            Arc::new(LogChannel::new(
                crate::channel::LogChannelConfig::new(name.to_string()),
                sink.clone(),
                queue.clone(),
                pool.clone(),
            ))
        };
        BasicLogger::new(make("E"), make("W"), make("I"), make("D"))
    }

    #[test]
    fn set_level_enables_channels_up_to_and_including_threshold() {
        let logger = test_logger();
        logger.set_level(Level::Warning);
        assert!(logger.error().is_enabled());
        assert!(logger.warning().is_enabled());
        assert!(!logger.info().is_enabled());
        assert!(!logger.debug().is_enabled());
    }

    #[test]
    fn debug_level_enables_everything() {
        let logger = test_logger();
        logger.set_level(Level::Debug);
        assert!(logger.error().is_enabled());
        assert!(logger.debug().is_enabled());
    }

    #[test]
    fn disabled_channel_drops_log_call_without_reaching_queue() {
        let logger = test_logger();
        logger.set_level(Level::Error);
        logger.debug().log("unused %d", &[ArgValue::I64(1)]);
    }
}
