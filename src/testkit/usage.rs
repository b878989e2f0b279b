//! Recording usage sink.

use parking_lot::Mutex;

use crate::domain::UsageRecord;
use crate::port::UsageSink;

/// Sink that keeps every record for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<UsageRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().clone()
    }
}

impl UsageSink for RecordingSink {
    fn record(&self, record: UsageRecord) {
        self.records.lock().push(record);
    }
}
