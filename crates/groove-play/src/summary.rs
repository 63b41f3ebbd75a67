use groove_input::DebounceStats;
use groove_rule::{Grade, ScoreSnapshot, TimingStats};
use groove_timing::AveragedNote;
use groove_types::Judgment;
use serde::{Deserialize, Serialize};

/// End-of-session result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: i64,
    pub accuracy: f64,
    pub grade: Grade,
    pub max_combo: u32,
    /// Per-tier counters, indexed by [`Judgment::index`].
    pub counts: [u32; groove_types::JUDGMENT_COUNT],
    /// Non-Perfect quality hits that landed early.
    pub rushing: u32,
    /// Non-Perfect quality hits that landed late.
    pub dragging: u32,
    pub strikes_total: u64,
    pub strikes_filtered: u64,
    pub loops: u32,
    /// One record per loop slot, collapsed across loops.
    pub averaged: Vec<AveragedNote>,
}

impl SessionSummary {
    pub(crate) fn new(
        snapshot: &ScoreSnapshot,
        timing: TimingStats,
        debounce: DebounceStats,
        loops: u32,
        averaged: Vec<AveragedNote>,
    ) -> Self {
        Self {
            score: snapshot.score,
            accuracy: snapshot.accuracy,
            grade: snapshot.grade,
            max_combo: snapshot.max_combo,
            counts: snapshot.counts,
            rushing: timing.rushing,
            dragging: timing.dragging,
            strikes_total: debounce.total,
            strikes_filtered: debounce.filtered,
            loops,
            averaged,
        }
    }

    pub fn count(&self, judgment: Judgment) -> u32 {
        self.counts[judgment.index()]
    }

    /// Filtered share of all strikes, in percent.
    pub fn filter_rate(&self) -> f64 {
        DebounceStats {
            total: self.strikes_total,
            filtered: self.strikes_filtered,
        }
        .filter_rate()
    }
}
