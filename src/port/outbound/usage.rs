//! Usage sink port.
//!
//! The executor reports the priced usage of every successful upstream call
//! here, once per document. Sinks must not block and cannot fail.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::UsageRecord;

/// Receiver of per-call cost records.
pub trait UsageSink: Send + Sync {
    fn record(&self, record: UsageRecord);
}

/// Sink that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl UsageSink for NoopSink {
    fn record(&self, _record: UsageRecord) {}
}

/// Sink forwarding records to an unbounded channel the caller drains.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UsageRecord>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UsageRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UsageSink for ChannelSink {
    fn record(&self, record: UsageRecord) {
        if self.tx.send(record).is_err() {
            debug!("Usage receiver dropped");
        }
    }
}
