//! Input-side filtering and recording.
//!
//! This module provides:
//! - [`Debouncer`]: per-channel duplicate-trigger filter for noisy pads
//! - [`StrikeLog`]: record of every raw strike relayed by the driver

mod debouncer;
mod strike_log;

pub use debouncer::{DEFAULT_DEBOUNCE_MS, DebounceStats, Debouncer};
pub use strike_log::{StrikeLog, StrikeRecord};
