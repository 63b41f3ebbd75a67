use groove_input::{DebounceStats, Debouncer, StrikeLog};
use groove_rule::{MatchOutcome, ScoreManager, ScoreSnapshot, TimingJudge, TimingStats};
use groove_timing::{ClockEngine, ClockEvent, ClockMode, ClockState, SequenceOutcome, TimeProvider};
use groove_types::{AccuracyRecord, Channel, ConfigError, Judgment, NoteId, Pattern};
use log::{debug, trace};

use crate::config::SessionConfig;
use crate::listener::SessionListener;
use crate::summary::SessionSummary;

/// What happened to a single strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeOutcome {
    /// Dropped by the debouncer as a duplicate trigger.
    Filtered,
    /// The clock is not running.
    Ignored,
    /// The channel already claimed a note within the double-hit guard.
    DoubleHit,
    /// No pending note on any channel near the strike.
    Unmatched,
    Judged {
        note: NoteId,
        record: AccuracyRecord,
    },
    Sequence(SequenceOutcome),
}

fn dispatch(listeners: &mut [Box<dyn SessionListener>], mut f: impl FnMut(&mut dyn SessionListener)) {
    for listener in listeners.iter_mut() {
        f(listener.as_mut());
    }
}

/// Wires the debouncer, judge, score manager and clock into one practice run.
///
/// The host drives it from a single thread: `tick` at frame cadence and
/// `strike` for every raw pad event. Notifications go out synchronously to
/// registered listeners on the same call.
pub struct PracticeSession<T: TimeProvider> {
    config: SessionConfig,
    clock: ClockEngine<T>,
    debouncer: Debouncer,
    judge: TimingJudge,
    score: ScoreManager,
    timing: TimingStats,
    strike_log: StrikeLog,
    listeners: Vec<Box<dyn SessionListener>>,
}

impl<T: TimeProvider> PracticeSession<T> {
    pub fn new(pattern: Pattern, config: SessionConfig, time: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = ClockEngine::new(pattern, config.clock_config(), time)?;
        let judge = TimingJudge::new(config.judge_window()).with_double_hit_guard(config.double_hit_guard_ms);
        Ok(Self {
            clock,
            debouncer: Debouncer::new(config.debounce_ms)?,
            judge,
            score: ScoreManager::with_combo_rate(config.combo_rate)?,
            timing: TimingStats::default(),
            strike_log: StrikeLog::new(),
            listeners: Vec::new(),
            config,
        })
    }

    pub fn add_listener(&mut self, listener: Box<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Rewind to the original pattern and zero every counter.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.judge.reset();
        self.debouncer.reset();
        self.timing.reset();
        self.strike_log.clear();
        let snapshot = self.score.reset();
        debug!("session reset");
        dispatch(&mut self.listeners, |l| l.on_score_update(&snapshot));
    }

    /// Advance the clock and relay its events. Expired notes are scored as
    /// misses here.
    pub fn tick(&mut self) -> Vec<ClockEvent> {
        let events = self.clock.update();
        for event in &events {
            match *event {
                ClockEvent::Update { virtual_time_ms } => {
                    dispatch(&mut self.listeners, |l| l.on_update(virtual_time_ms));
                }
                ClockEvent::Countdown(beats) => {
                    dispatch(&mut self.listeners, |l| l.on_countdown(beats));
                }
                ClockEvent::Miss(id) => {
                    let snapshot = self.score.record_miss();
                    if let Some(note) = self.clock.note(id) {
                        dispatch(&mut self.listeners, |l| l.on_miss(note));
                    }
                    dispatch(&mut self.listeners, |l| l.on_score_update(&snapshot));
                }
                ClockEvent::PatternComplete => {
                    dispatch(&mut self.listeners, |l| l.on_pattern_complete());
                }
            }
        }
        events
    }

    /// Strike stamped with the current wall time.
    pub fn strike_now(&mut self, channel: Channel) -> StrikeOutcome {
        let now = self.clock.now_ms();
        self.strike(channel, now)
    }

    /// Relay a raw strike. `timestamp_ms` is on the time provider's clock.
    pub fn strike(&mut self, channel: Channel, timestamp_ms: f64) -> StrikeOutcome {
        let accepted = self.debouncer.should_allow(channel, timestamp_ms);
        self.strike_log.record(timestamp_ms, channel, accepted);
        if !accepted {
            return StrikeOutcome::Filtered;
        }
        if !self.clock.state().is_running() {
            trace!("strike on {channel} ignored in {:?}", self.clock.state());
            return StrikeOutcome::Ignored;
        }

        match self.clock.mode() {
            ClockMode::Sequence => self.sequence_strike(channel),
            ClockMode::Timed => self.timed_strike(channel, timestamp_ms),
        }
    }

    fn timed_strike(&mut self, channel: Channel, timestamp_ms: f64) -> StrikeOutcome {
        let hit_time_ms = self.clock.virtual_time_at(timestamp_ms) - self.config.input_offset_ms;

        let (id, judgment) = match self.judge.match_strike(channel, hit_time_ms, self.clock.active()) {
            MatchOutcome::Matched(id) => {
                let Some(note) = self.clock.note(id) else {
                    return StrikeOutcome::Unmatched;
                };
                (id, self.judge.judge_hit(note.time_ms(), hit_time_ms, true))
            }
            MatchOutcome::DoubleHit => return StrikeOutcome::DoubleHit,
            MatchOutcome::NoCandidate => {
                match self.judge.find_wrong_channel_note(channel, hit_time_ms, self.clock.active()) {
                    Some(id) => (id, Judgment::WrongChannel),
                    None => {
                        trace!("strike on {channel} at {hit_time_ms:.1}ms matched nothing");
                        return StrikeOutcome::Unmatched;
                    }
                }
            }
        };

        let record = self.clock.record_hit(id, judgment, hit_time_ms);
        if let Some(diff) = record.time_diff_ms {
            self.timing.record(judgment, diff);
        }
        self.apply_judgment(id, &record);
        StrikeOutcome::Judged { note: id, record }
    }

    fn sequence_strike(&mut self, channel: Channel) -> StrikeOutcome {
        let outcome = self.clock.sequence_strike(channel);
        match outcome {
            SequenceOutcome::Advanced {
                note,
                index,
                correct,
                wrong,
            } => {
                if let Some(record) = self.clock.note(note).and_then(|n| n.accuracy()).copied() {
                    self.apply_judgment(note, &record);
                }
                dispatch(&mut self.listeners, |l| l.on_sequence_progress(index, correct, wrong));
            }
            SequenceOutcome::WrongAttempt {
                index, correct, wrong, ..
            } => {
                debug!("wrong attempt on {channel} at step {index}");
                dispatch(&mut self.listeners, |l| l.on_sequence_progress(index, correct, wrong));
            }
            SequenceOutcome::Idle => {}
        }
        StrikeOutcome::Sequence(outcome)
    }

    fn apply_judgment(&mut self, id: NoteId, record: &AccuracyRecord) {
        let snapshot = self.score.record_judgment(record.judgment);
        if let Some(note) = self.clock.note(id) {
            dispatch(&mut self.listeners, |l| l.on_judgment(note, record));
        }
        dispatch(&mut self.listeners, |l| l.on_score_update(&snapshot));
    }

    /// Queue another loop of the pattern for open-ended practice.
    pub fn append_loop(&mut self) -> bool {
        self.clock.append_loop()
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ConfigError> {
        self.clock.set_bpm(bpm)?;
        self.config.bpm = bpm;
        Ok(())
    }

    pub fn set_debounce_window(&mut self, window_ms: f64) -> Result<(), ConfigError> {
        self.debouncer.set_window(window_ms)?;
        self.config.debounce_ms = window_ms;
        Ok(())
    }

    pub fn set_combo_rate(&mut self, combo_rate: f64) -> Result<(), ConfigError> {
        self.score.set_combo_rate(combo_rate)?;
        self.config.combo_rate = combo_rate;
        Ok(())
    }

    pub fn set_input_offset(&mut self, offset_ms: f64) {
        self.config.input_offset_ms = offset_ms;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &ClockEngine<T> {
        &self.clock
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn virtual_time_ms(&self) -> f64 {
        self.clock.virtual_time_ms()
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.score.snapshot()
    }

    pub fn debounce_stats(&self) -> DebounceStats {
        self.debouncer.stats()
    }

    pub fn timing_stats(&self) -> TimingStats {
        self.timing
    }

    pub fn strike_log(&self) -> &StrikeLog {
        &self.strike_log
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(
            &self.score.snapshot(),
            self.timing,
            self.debouncer.stats(),
            self.clock.loops(),
            self.clock.averaged_accuracy(self.config.loop_tolerance_ms),
        )
    }
}
