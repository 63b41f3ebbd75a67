use groove_types::Channel;
use serde::{Deserialize, Serialize};

/// A single raw strike as relayed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeRecord {
    /// Driver timestamp in milliseconds.
    pub time_ms: f64,
    pub channel: Channel,
    /// false when the debouncer filtered the strike.
    pub accepted: bool,
}

/// Recorder for raw strikes, kept for practice-history collaborators.
#[derive(Debug)]
pub struct StrikeLog {
    records: Vec<StrikeRecord>,
}

impl StrikeLog {
    /// Create a new log with pre-allocated capacity.
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(4096),
        }
    }

    pub fn record(&mut self, time_ms: f64, channel: Channel, accepted: bool) {
        self.records.push(StrikeRecord {
            time_ms,
            channel,
            accepted,
        });
    }

    pub fn records(&self) -> &[StrikeRecord] {
        &self.records
    }

    /// Number of strikes that passed the debouncer.
    pub fn accepted_count(&self) -> usize {
        self.records.iter().filter(|r| r.accepted).count()
    }

    /// Take ownership of the records (consumes the log).
    pub fn into_records(self) -> Vec<StrikeRecord> {
        self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for StrikeLog {
    fn default() -> Self {
        Self::new()
    }
}
