use groove_rule::ScoreSnapshot;
use groove_types::{AccuracyRecord, Note};

/// Observer for session notifications.
///
/// Every method is invoked synchronously on the call that produced the event
/// (a tick, a strike, or a reset). All methods default to no-ops.
pub trait SessionListener {
    /// Virtual time moved.
    fn on_update(&mut self, _virtual_time_ms: f64) {}

    /// Remaining lead-in beats; `0` marks the end of the countdown.
    fn on_countdown(&mut self, _beats: u32) {}

    /// A struck note was judged.
    fn on_judgment(&mut self, _note: &Note, _record: &AccuracyRecord) {}

    fn on_miss(&mut self, _note: &Note) {}

    fn on_pattern_complete(&mut self) {}

    /// Sequence mode progress after every strike on a gated note.
    fn on_sequence_progress(&mut self, _index: usize, _correct: u32, _wrong: u32) {}

    fn on_score_update(&mut self, _snapshot: &ScoreSnapshot) {}
}
