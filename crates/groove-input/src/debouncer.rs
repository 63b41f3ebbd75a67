use std::collections::HashMap;

use groove_types::{Channel, ConfigError};
use log::trace;

/// Default duplicate-trigger window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: f64 = 30.0;

/// Diagnostic counters for the debouncer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebounceStats {
    pub total: u64,
    pub filtered: u64,
}

impl DebounceStats {
    /// Filtered share of all events, in percent.
    pub fn filter_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.filtered as f64 / self.total as f64 * 100.0
    }
}

/// Filters duplicate triggers per channel.
///
/// The window anchors to the last *accepted* event on a channel; rejected
/// events never move it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: f64,
    last_accepted: HashMap<Channel, f64>,
    stats: DebounceStats,
}

impl Debouncer {
    pub fn new(window_ms: f64) -> Result<Self, ConfigError> {
        let mut debouncer = Self::default();
        debouncer.set_window(window_ms)?;
        Ok(debouncer)
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    /// Change the window. Negative values are rejected and the old window kept.
    pub fn set_window(&mut self, window_ms: f64) -> Result<(), ConfigError> {
        if window_ms.is_nan() || window_ms < 0.0 {
            return Err(ConfigError::NegativeDebounceWindow(window_ms));
        }
        self.window_ms = window_ms;
        Ok(())
    }

    /// Decide whether an event on `channel` at `timestamp_ms` passes.
    pub fn should_allow(&mut self, channel: Channel, timestamp_ms: f64) -> bool {
        self.stats.total += 1;

        if self.window_ms > 0.0 {
            if let Some(&last) = self.last_accepted.get(&channel) {
                if timestamp_ms - last < self.window_ms {
                    self.stats.filtered += 1;
                    trace!(
                        "filtered {channel} at {timestamp_ms:.1}ms ({:.1}ms after accepted)",
                        timestamp_ms - last
                    );
                    return false;
                }
            }
        }

        self.last_accepted.insert(channel, timestamp_ms);
        true
    }

    pub fn stats(&self) -> DebounceStats {
        self.stats
    }

    /// Forget all channels and zero the counters. The window is kept.
    pub fn reset(&mut self) {
        self.last_accepted.clear();
        self.stats = DebounceStats::default();
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_DEBOUNCE_MS,
            last_accepted: HashMap::new(),
            stats: DebounceStats::default(),
        }
    }
}
