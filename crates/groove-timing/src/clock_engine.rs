use std::collections::VecDeque;

use groove_types::{
    AccuracyRecord, Channel, ConfigError, Judgment, Note, NoteId, NoteState, Pattern,
};
use log::{debug, warn};

use crate::config::{ClockConfig, ClockMode};
use crate::loop_average::{AveragedNote, average_across_loops};
use crate::time::TimeProvider;

/// In sequence mode virtual time waits this far before the gated note.
const SEQUENCE_HOLD_MS: f64 = 1.0;

/// Clock lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Ready,
    CountingDown,
    Playing,
    Paused,
    Complete,
}

impl ClockState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::CountingDown | Self::Playing)
    }
}

/// Events generated by `ClockEngine::update`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    /// Virtual time moved.
    Update { virtual_time_ms: f64 },
    /// Remaining lead-in beats; `0` when the countdown ends.
    Countdown(u32),
    /// A note left the miss window unhit.
    Miss(NoteId),
    PatternComplete,
}

/// Result of a strike in sequence mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// The gated note was struck and the clock released.
    Advanced {
        note: NoteId,
        index: usize,
        correct: u32,
        wrong: u32,
    },
    /// Wrong channel: nothing advances, no note is marked.
    WrongAttempt {
        expected: Channel,
        index: usize,
        correct: u32,
        wrong: u32,
    },
    /// No gated note is waiting (not running, not yet visible, or finished).
    Idle,
}

#[derive(Debug, Clone, Copy, Default)]
struct SequenceCounters {
    correct: u32,
    wrong: u32,
}

/// Authoritative virtual clock and note lifecycle.
///
/// Driven by `update`, called by the host at frame cadence. Virtual time is
/// always recomputed as `now - wall_reference`, so irregular tick spacing never
/// accumulates drift. Every note sits in exactly one of the Upcoming, Active,
/// Hit and Missed buckets.
pub struct ClockEngine<T: TimeProvider> {
    time: T,
    pattern: Pattern,
    config: ClockConfig,
    state: ClockState,
    /// State to return to from Paused.
    resume_state: ClockState,
    virtual_time_ms: f64,
    wall_reference_ms: f64,
    /// Note arena indexed by `NoteId`.
    notes: Vec<Note>,
    upcoming: VecDeque<NoteId>,
    /// Kept in schedule order.
    active: Vec<NoteId>,
    hit: Vec<NoteId>,
    missed: Vec<NoteId>,
    duration_ms: f64,
    loops: u32,
    last_countdown: Option<u32>,
    sequence: SequenceCounters,
}

impl<T: TimeProvider> ClockEngine<T> {
    pub fn new(pattern: Pattern, config: ClockConfig, time: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            time,
            duration_ms: pattern.duration_ms(),
            pattern,
            config,
            state: ClockState::Ready,
            resume_state: ClockState::Playing,
            virtual_time_ms: 0.0,
            wall_reference_ms: 0.0,
            notes: Vec::new(),
            upcoming: VecDeque::new(),
            active: Vec::new(),
            hit: Vec::new(),
            missed: Vec::new(),
            loops: 0,
            last_countdown: None,
            sequence: SequenceCounters::default(),
        };
        engine.loops = engine.pattern.loop_count();
        engine.rebuild_notes();
        Ok(engine)
    }

    fn rebuild_notes(&mut self) {
        self.notes = self
            .pattern
            .notes()
            .iter()
            .enumerate()
            .map(|(i, schedule)| Note::new(NoteId(i), *schedule))
            .collect();
        self.upcoming = self.notes.iter().map(Note::id).collect();
        self.active.clear();
        self.hit.clear();
        self.missed.clear();
    }

    fn anchor(&mut self) {
        self.wall_reference_ms = self.time.now_ms() - self.virtual_time_ms;
    }

    /// Begin playback, or continue from stored time.
    ///
    /// From the initial zero, virtual time starts at minus the lead-in and the
    /// clock counts down.
    pub fn start(&mut self) {
        match self.state {
            ClockState::Ready => {
                if self.virtual_time_ms == 0.0 {
                    self.virtual_time_ms = -self.config.lead_in_ms();
                }
                self.state = if self.virtual_time_ms < 0.0 {
                    ClockState::CountingDown
                } else {
                    ClockState::Playing
                };
                self.last_countdown = None;
                self.anchor();
                debug!(
                    "clock started at {:.1}ms ({:?})",
                    self.virtual_time_ms, self.state
                );
            }
            ClockState::Paused => self.resume(),
            ClockState::CountingDown | ClockState::Playing => {}
            ClockState::Complete => warn!("start ignored: pattern already complete"),
        }
    }

    /// Freeze virtual time at the pause instant. Ticks are no-ops until
    /// `resume`.
    pub fn pause(&mut self) {
        if self.state.is_running() {
            let mut frozen = self.time.now_ms() - self.wall_reference_ms;
            if let Some(hold) = self.sequence_hold() {
                frozen = frozen.min(hold);
            }
            self.virtual_time_ms = frozen.max(self.virtual_time_ms);
            self.resume_state = self.state;
            self.state = ClockState::Paused;
            debug!("clock paused at {:.1}ms", self.virtual_time_ms);
        }
    }

    /// Re-anchor to wall time so the paused span is excised.
    pub fn resume(&mut self) {
        if self.state == ClockState::Paused {
            self.state = self.resume_state;
            self.anchor();
            debug!("clock resumed at {:.1}ms", self.virtual_time_ms);
        }
    }

    /// Stop and restore the original pattern with all lifecycle fields cleared.
    pub fn reset(&mut self) {
        self.state = ClockState::Ready;
        self.resume_state = ClockState::Playing;
        self.virtual_time_ms = 0.0;
        self.wall_reference_ms = 0.0;
        self.duration_ms = self.pattern.duration_ms();
        self.loops = self.pattern.loop_count();
        self.last_countdown = None;
        self.sequence = SequenceCounters::default();
        self.rebuild_notes();
        debug!("clock reset ({} notes)", self.notes.len());
    }

    /// Advance the clock to wall time and move notes between buckets.
    pub fn update(&mut self) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if !self.state.is_running() {
            return events;
        }

        let now = self.time.now_ms();
        let previous = self.virtual_time_ms;
        let mut target = now - self.wall_reference_ms;
        let mut held = false;

        if let Some(hold) = self.sequence_hold() {
            if target >= hold {
                target = hold.max(previous);
                held = true;
                self.wall_reference_ms = now - target;
            }
        }

        self.virtual_time_ms = target;
        if target != previous {
            events.push(ClockEvent::Update {
                virtual_time_ms: target,
            });
        }

        if self.state == ClockState::CountingDown {
            self.phase_countdown(target, held, &mut events);
        }
        self.phase_promote(target, held);
        if self.state == ClockState::Playing && self.config.mode == ClockMode::Timed {
            self.phase_miss(target, &mut events);
        }

        if self.state == ClockState::Playing && self.upcoming.is_empty() && self.active.is_empty() {
            self.state = ClockState::Complete;
            debug!("pattern complete at {:.1}ms", target);
            events.push(ClockEvent::PatternComplete);
        }

        events
    }

    fn phase_countdown(&mut self, target: f64, held: bool, events: &mut Vec<ClockEvent>) {
        if target < 0.0 && !held {
            let beats = (-target / self.config.beat_ms()).ceil() as u32;
            if self.last_countdown != Some(beats) {
                self.last_countdown = Some(beats);
                events.push(ClockEvent::Countdown(beats));
            }
        } else {
            self.state = ClockState::Playing;
            self.last_countdown = Some(0);
            debug!("countdown finished at {:.1}ms", target);
            events.push(ClockEvent::Countdown(0));
        }
    }

    /// Upcoming -> Active for notes inside the lookahead horizon. Runs during
    /// the countdown too, so early notes are visible in time. A held clock
    /// always reaches its gated note, whatever the lookahead.
    fn phase_promote(&mut self, target: f64, held: bool) {
        let mut horizon = target + self.config.lookahead_ms;
        if held {
            horizon = horizon.max(target + SEQUENCE_HOLD_MS);
        }
        while let Some(&id) = self.upcoming.front() {
            if self.notes[id.0].time_ms() > horizon {
                break;
            }
            self.upcoming.pop_front();
            self.notes[id.0].activate();
            self.active.push(id);
        }
    }

    fn phase_miss(&mut self, target: f64, events: &mut Vec<ClockEvent>) {
        let cutoff = target - self.config.miss_window_ms;
        let notes = &self.notes;
        let mut expired = Vec::new();
        self.active.retain(|&id| {
            let note = &notes[id.0];
            if note.time_ms() < cutoff && !note.is_judged() {
                expired.push(id);
                false
            } else {
                true
            }
        });

        for id in expired {
            self.notes[id.0].resolve_miss();
            self.missed.push(id);
            events.push(ClockEvent::Miss(id));
        }
    }

    /// Move an Active note to Hit with its accuracy record.
    ///
    /// # Panics
    /// If the note is not in the Active bucket.
    pub fn record_hit(&mut self, id: NoteId, judgment: Judgment, hit_time_ms: f64) -> AccuracyRecord {
        let Some(pos) = self.active.iter().position(|&a| a == id) else {
            panic!(
                "record_hit: note {:?} is not active (state {:?})",
                id,
                self.notes.get(id.0).map(Note::state)
            );
        };
        self.active.remove(pos);

        let note = &mut self.notes[id.0];
        let time_diff_ms = hit_time_ms - note.time_ms();
        note.resolve_hit(time_diff_ms, judgment);
        self.hit.push(id);

        AccuracyRecord::struck(time_diff_ms, judgment)
    }

    /// Strike in sequence mode: a correct channel marks the gated note Perfect
    /// and releases the clock; anything else counts as a wrong attempt.
    pub fn sequence_strike(&mut self, channel: Channel) -> SequenceOutcome {
        if self.config.mode != ClockMode::Sequence || !self.state.is_running() {
            return SequenceOutcome::Idle;
        }
        let Some(gate) = self.gate_note() else {
            return SequenceOutcome::Idle;
        };
        let note = &self.notes[gate.0];
        if note.state() != NoteState::Active {
            return SequenceOutcome::Idle;
        }

        let index = self.hit.len();
        if note.channel() == channel {
            let time_ms = note.time_ms();
            self.record_hit(gate, Judgment::Perfect, time_ms);
            self.sequence.correct += 1;
            SequenceOutcome::Advanced {
                note: gate,
                index,
                correct: self.sequence.correct,
                wrong: self.sequence.wrong,
            }
        } else {
            self.sequence.wrong += 1;
            SequenceOutcome::WrongAttempt {
                expected: note.channel(),
                index,
                correct: self.sequence.correct,
                wrong: self.sequence.wrong,
            }
        }
    }

    /// Earliest unresolved note: the one sequence mode waits on.
    fn gate_note(&self) -> Option<NoteId> {
        self.active.first().or_else(|| self.upcoming.front()).copied()
    }

    /// Virtual time sequence mode must not pass while the gate is unstruck.
    fn sequence_hold(&self) -> Option<f64> {
        if self.config.mode != ClockMode::Sequence {
            return None;
        }
        self.gate_note()
            .map(|gate| self.notes[gate.0].time_ms() - SEQUENCE_HOLD_MS)
    }

    /// Append one more loop after the current end: the first loop's notes,
    /// shifted by the current duration.
    ///
    /// Existing Active, Hit and Missed notes are untouched. Returns false when
    /// the clock is not running or paused.
    pub fn append_loop(&mut self) -> bool {
        if !matches!(
            self.state,
            ClockState::CountingDown | ClockState::Playing | ClockState::Paused
        ) {
            warn!("append_loop ignored in {:?}", self.state);
            return false;
        }

        let offset = self.duration_ms;
        for schedule in self.pattern.single_loop() {
            let id = NoteId(self.notes.len());
            self.notes.push(Note::new(id, schedule.shifted(offset)));
            self.upcoming.push_back(id);
        }
        let notes = &self.notes;
        self.upcoming
            .make_contiguous()
            .sort_by(|a, b| notes[a.0].time_ms().total_cmp(&notes[b.0].time_ms()).then(a.cmp(b)));

        self.duration_ms += self.pattern.loop_duration_ms();
        self.loops += 1;
        debug!(
            "appended loop {} at {:.1}ms, duration now {:.1}ms",
            self.loops, offset, self.duration_ms
        );
        true
    }

    /// Change tempo. Takes effect on the next lead-in.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ConfigError> {
        let config = ClockConfig { bpm, ..self.config };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Virtual time at wall time `wall_ms`, for timestamping strikes between
    /// ticks. Outside playback this is the frozen virtual time.
    pub fn virtual_time_at(&self, wall_ms: f64) -> f64 {
        if self.state.is_running() {
            wall_ms - self.wall_reference_ms
        } else {
            self.virtual_time_ms
        }
    }

    /// Collapse repeated loops onto one synthetic record per slot.
    pub fn averaged_accuracy(&self, tolerance_ms: f64) -> Vec<AveragedNote> {
        average_across_loops(&self.notes, self.pattern.loop_duration_ms(), tolerance_ms)
    }

    pub fn now_ms(&self) -> f64 {
        self.time.now_ms()
    }

    pub fn virtual_time_ms(&self) -> f64 {
        self.virtual_time_ms
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn mode(&self) -> ClockMode {
        self.config.mode
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.0)
    }

    /// Every note, in arena order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &Note> + '_ {
        self.upcoming.iter().map(|id| &self.notes[id.0])
    }

    pub fn active(&self) -> impl Iterator<Item = &Note> + '_ {
        self.active.iter().map(|id| &self.notes[id.0])
    }

    pub fn hit(&self) -> impl Iterator<Item = &Note> + '_ {
        self.hit.iter().map(|id| &self.notes[id.0])
    }

    pub fn missed(&self) -> impl Iterator<Item = &Note> + '_ {
        self.missed.iter().map(|id| &self.notes[id.0])
    }

    /// Bucket sizes as (upcoming, active, hit, missed).
    pub fn bucket_sizes(&self) -> (usize, usize, usize, usize) {
        (
            self.upcoming.len(),
            self.active.len(),
            self.hit.len(),
            self.missed.len(),
        )
    }

    pub fn sequence_counts(&self) -> (u32, u32) {
        (self.sequence.correct, self.sequence.wrong)
    }
}
