use std::collections::HashMap;

use groove_types::{Channel, ConfigError, Judgment, Note, NoteId, NoteState};
use log::debug;

use crate::judge_window::JudgeWindow;

/// A channel that matched a note within this many ms cannot claim another.
pub const DEFAULT_DOUBLE_HIT_GUARD_MS: f64 = 50.0;

/// Result of trying to claim a pending note for a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(NoteId),
    /// The channel already claimed a note within the double-hit guard.
    DoubleHit,
    NoCandidate,
}

impl MatchOutcome {
    pub fn matched(self) -> Option<NoteId> {
        match self {
            Self::Matched(id) => Some(id),
            _ => None,
        }
    }
}

/// Matches strikes to pending notes and classifies their timing.
///
/// Holds no score state; `reset` only forgets the double-hit memory.
#[derive(Debug, Clone)]
pub struct TimingJudge {
    window: JudgeWindow,
    double_hit_guard_ms: f64,
    last_match: HashMap<Channel, f64>,
}

impl TimingJudge {
    pub fn new(window: JudgeWindow) -> Self {
        Self {
            window,
            double_hit_guard_ms: DEFAULT_DOUBLE_HIT_GUARD_MS,
            last_match: HashMap::new(),
        }
    }

    pub fn with_double_hit_guard(mut self, guard_ms: f64) -> Self {
        self.double_hit_guard_ms = guard_ms.max(0.0);
        self
    }

    pub fn window(&self) -> &JudgeWindow {
        &self.window
    }

    pub fn set_window(&mut self, window: JudgeWindow) -> Result<(), ConfigError> {
        window.validate()?;
        self.window = window;
        Ok(())
    }

    /// Claim the best pending note on `channel` for a strike at `hit_time_ms`.
    ///
    /// Candidates are unjudged Active notes on the channel within the miss
    /// boundary. The smallest absolute offset wins; ties go to the earliest
    /// scheduled note.
    pub fn match_strike<'a, I>(&mut self, channel: Channel, hit_time_ms: f64, active: I) -> MatchOutcome
    where
        I: IntoIterator<Item = &'a Note>,
    {
        if let Some(&last) = self.last_match.get(&channel) {
            if (hit_time_ms - last).abs() < self.double_hit_guard_ms {
                debug!("double hit on {channel} at {hit_time_ms:.1}ms");
                return MatchOutcome::DoubleHit;
            }
        }

        let best = nearest(active, hit_time_ms, self.window.miss_ms, |note| {
            note.channel() == channel
        });

        match best {
            Some(id) => {
                self.last_match.insert(channel, hit_time_ms);
                MatchOutcome::Matched(id)
            }
            None => MatchOutcome::NoCandidate,
        }
    }

    /// `match_strike` collapsed to the matched note, if any.
    pub fn find_matching_note<'a, I>(&mut self, channel: Channel, hit_time_ms: f64, active: I) -> Option<NoteId>
    where
        I: IntoIterator<Item = &'a Note>,
    {
        self.match_strike(channel, hit_time_ms, active).matched()
    }

    /// Nearest unjudged Active note on a *different* channel within the Ok
    /// threshold: the note the performer most likely meant to strike.
    pub fn find_wrong_channel_note<'a, I>(&self, channel: Channel, hit_time_ms: f64, active: I) -> Option<NoteId>
    where
        I: IntoIterator<Item = &'a Note>,
    {
        nearest(active, hit_time_ms, self.window.ok_ms, |note| {
            note.channel() != channel
        })
    }

    /// Pure classification of a strike against a note time.
    pub fn judge_hit(&self, note_time_ms: f64, hit_time_ms: f64, is_correct_channel: bool) -> Judgment {
        if !is_correct_channel {
            return Judgment::WrongChannel;
        }
        self.window.classify(hit_time_ms - note_time_ms)
    }

    pub fn reset(&mut self) {
        self.last_match.clear();
    }
}

impl Default for TimingJudge {
    fn default() -> Self {
        Self::new(JudgeWindow::normal())
    }
}

fn nearest<'a, I, F>(notes: I, hit_time_ms: f64, limit_ms: f64, accept: F) -> Option<NoteId>
where
    I: IntoIterator<Item = &'a Note>,
    F: Fn(&Note) -> bool,
{
    notes
        .into_iter()
        .filter(|note| note.state() == NoteState::Active && !note.is_judged())
        .filter(|note| accept(*note))
        .map(|note| ((hit_time_ms - note.time_ms()).abs(), note))
        .filter(|(offset, _)| *offset <= limit_ms)
        .min_by(|(a, na), (b, nb)| {
            a.total_cmp(b)
                .then(na.time_ms().total_cmp(&nb.time_ms()))
                .then(na.id().cmp(&nb.id()))
        })
        .map(|(_, note)| note.id())
}
