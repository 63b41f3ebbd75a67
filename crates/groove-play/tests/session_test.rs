use std::cell::RefCell;
use std::rc::Rc;

use groove_input::StrikeRecord;
use groove_play::{PracticeSession, SessionConfig, SessionListener, StrikeOutcome};
use groove_rule::{Grade, ScoreSnapshot};
use groove_timing::{ClockMode, ClockState, MockTimeProvider, SequenceOutcome};
use groove_types::{AccuracyRecord, Channel, Judgment, Note, NoteId, NoteSchedule, Pattern};
use proptest::prelude::*;
use tempfile::tempdir;

const KICK: Channel = Channel(36);
const SNARE: Channel = Channel(38);

type Session = PracticeSession<Rc<MockTimeProvider>>;

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Update(f64),
    Countdown(u32),
    Judged(NoteId, Judgment),
    Miss(NoteId),
    Complete,
    Progress(usize, u32, u32),
    Score(i64, u32),
}

struct Recorder(Rc<RefCell<Vec<Seen>>>);

impl SessionListener for Recorder {
    fn on_update(&mut self, virtual_time_ms: f64) {
        self.0.borrow_mut().push(Seen::Update(virtual_time_ms));
    }

    fn on_countdown(&mut self, beats: u32) {
        self.0.borrow_mut().push(Seen::Countdown(beats));
    }

    fn on_judgment(&mut self, note: &Note, record: &AccuracyRecord) {
        self.0.borrow_mut().push(Seen::Judged(note.id(), record.judgment));
    }

    fn on_miss(&mut self, note: &Note) {
        self.0.borrow_mut().push(Seen::Miss(note.id()));
    }

    fn on_pattern_complete(&mut self) {
        self.0.borrow_mut().push(Seen::Complete);
    }

    fn on_sequence_progress(&mut self, index: usize, correct: u32, wrong: u32) {
        self.0.borrow_mut().push(Seen::Progress(index, correct, wrong));
    }

    fn on_score_update(&mut self, snapshot: &ScoreSnapshot) {
        self.0.borrow_mut().push(Seen::Score(snapshot.score, snapshot.combo));
    }
}

fn no_lead_in() -> SessionConfig {
    SessionConfig {
        lead_in_beats: 0,
        ..SessionConfig::default()
    }
}

fn session(notes: Vec<NoteSchedule>, config: SessionConfig) -> (Rc<MockTimeProvider>, Session) {
    let time = Rc::new(MockTimeProvider::new());
    let pattern = Pattern::new(notes, 2000.0).unwrap();
    let session = PracticeSession::new(pattern, config, Rc::clone(&time)).unwrap();
    (time, session)
}

fn recorded(session: &mut Session) -> Rc<RefCell<Vec<Seen>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    session.add_listener(Box::new(Recorder(Rc::clone(&seen))));
    seen
}

fn judged(outcome: StrikeOutcome) -> AccuracyRecord {
    match outcome {
        StrikeOutcome::Judged { record, .. } => record,
        other => panic!("expected a judgment, got {other:?}"),
    }
}

#[test]
fn test_perfect_dragging_hit() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    let seen = recorded(&mut session);
    session.start();
    time.advance_ms(1040);
    session.tick();

    let record = judged(session.strike_now(KICK));
    assert_eq!(record.judgment, Judgment::Perfect);
    assert_eq!(record.time_diff_ms, Some(40.0));
    assert!(record.is_dragging());
    assert_eq!(session.snapshot().score, 110);

    let seen = seen.borrow();
    assert!(seen.contains(&Seen::Judged(NoteId(0), Judgment::Perfect)));
    assert!(seen.contains(&Seen::Score(110, 1)));
}

#[test]
fn test_good_rushing_hit() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    session.start();
    time.advance_ms(920);
    session.tick();

    let record = judged(session.strike_now(KICK));
    assert_eq!(record.judgment, Judgment::Good);
    assert_eq!(record.time_diff_ms, Some(-80.0));
    assert!(record.is_rushing());
    assert_eq!(session.timing_stats().rushing, 1);
}

#[test]
fn test_strike_between_ticks_uses_its_own_timestamp() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    session.start();
    time.advance_ms(900);
    session.tick();

    // stamped 1030 while the last tick saw 900
    let record = judged(session.strike(KICK, 1030.0));
    assert_eq!(record.time_diff_ms, Some(30.0));
}

#[test]
fn test_unhit_note_scored_as_miss() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    let seen = recorded(&mut session);
    session.start();
    time.advance_ms(1201);
    session.tick();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.count(Judgment::Miss), 1);
    assert_eq!(snapshot.score, 0);
    assert_eq!(session.state(), ClockState::Complete);

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            Seen::Update(1201.0),
            Seen::Miss(NoteId(0)),
            Seen::Score(0, 0),
            Seen::Complete,
        ]
    );
}

#[test]
fn test_countdown_notifications() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], SessionConfig::default());
    let seen = recorded(&mut session);
    session.start();
    for _ in 0..4 {
        session.tick();
        time.advance_ms(500);
    }
    session.tick();

    let countdowns: Vec<Seen> = seen
        .borrow()
        .iter()
        .filter(|s| matches!(s, Seen::Countdown(_)))
        .cloned()
        .collect();
    assert_eq!(
        countdowns,
        vec![
            Seen::Countdown(4),
            Seen::Countdown(3),
            Seen::Countdown(2),
            Seen::Countdown(1),
            Seen::Countdown(0),
        ]
    );
}

#[test]
fn test_zero_elapsed_tick_is_silent() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    let seen = recorded(&mut session);
    session.start();
    time.advance_ms(100);
    session.tick();
    let count = seen.borrow().len();
    assert!(session.tick().is_empty());
    assert_eq!(seen.borrow().len(), count);
}

#[test]
fn test_debounced_strike_filtered_and_logged() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    session.start();
    time.advance_ms(1000);
    session.tick();

    assert!(matches!(session.strike(KICK, 1000.0), StrikeOutcome::Judged { .. }));
    assert_eq!(session.strike(KICK, 1020.0), StrikeOutcome::Filtered);

    let stats = session.debounce_stats();
    assert_eq!((stats.total, stats.filtered), (2, 1));
    assert_eq!(session.strike_log().len(), 2);
    assert_eq!(session.strike_log().accepted_count(), 1);

    let json = serde_json::to_string(session.strike_log().records()).unwrap();
    let back: Vec<StrikeRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session.strike_log().records());
}

#[test]
fn test_double_hit_guard() {
    let notes = vec![NoteSchedule::new(1000.0, KICK), NoteSchedule::new(1060.0, KICK)];
    let (time, mut session) = session(notes, no_lead_in());
    session.set_debounce_window(0.0).unwrap();
    session.start();
    time.advance_ms(1000);
    session.tick();

    assert!(matches!(
        session.strike(KICK, 1000.0),
        StrikeOutcome::Judged { note: NoteId(0), .. }
    ));
    assert_eq!(session.strike(KICK, 1040.0), StrikeOutcome::DoubleHit);
    assert!(matches!(
        session.strike(KICK, 1060.0),
        StrikeOutcome::Judged { note: NoteId(1), .. }
    ));
}

#[test]
fn test_wrong_channel_strike() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    session.start();
    time.advance_ms(1010);
    session.tick();

    let record = judged(session.strike_now(SNARE));
    assert_eq!(record.judgment, Judgment::WrongChannel);
    assert!(record.wrong_channel);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.count(Judgment::WrongChannel), 1);
    assert_eq!(session.clock().hit().count(), 1);
}

#[test]
fn test_unmatched_and_ignored_strikes() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    assert_eq!(session.strike(KICK, 0.0), StrikeOutcome::Ignored);

    session.start();
    time.advance_ms(300);
    session.tick();
    assert_eq!(session.strike_now(KICK), StrikeOutcome::Unmatched);
    assert_eq!(session.snapshot().total_judged(), 0);

    session.pause();
    time.advance_ms(700);
    assert_eq!(session.strike_now(KICK), StrikeOutcome::Ignored);
}

#[test]
fn test_input_offset_compensates_latency() {
    let config = SessionConfig {
        input_offset_ms: 30.0,
        ..no_lead_in()
    };
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], config);
    session.start();
    time.advance_ms(1070);
    session.tick();

    let record = judged(session.strike_now(KICK));
    assert_eq!(record.time_diff_ms, Some(40.0));
    assert_eq!(record.judgment, Judgment::Perfect);
}

#[test]
fn test_sequence_mode_progress() {
    let config = SessionConfig {
        mode: ClockMode::Sequence,
        ..no_lead_in()
    };
    let notes = vec![NoteSchedule::new(1000.0, KICK), NoteSchedule::new(1500.0, SNARE)];
    let (time, mut session) = session(notes, config);
    let seen = recorded(&mut session);
    session.start();
    time.advance_ms(3000);
    session.tick();
    assert_eq!(session.virtual_time_ms(), 999.0);

    assert!(matches!(
        session.strike_now(SNARE),
        StrikeOutcome::Sequence(SequenceOutcome::WrongAttempt { expected: KICK, .. })
    ));
    assert_eq!(session.snapshot().score, 0);
    assert!(matches!(
        session.strike_now(KICK),
        StrikeOutcome::Sequence(SequenceOutcome::Advanced { note: NoteId(0), .. })
    ));
    assert_eq!(session.snapshot().count(Judgment::Perfect), 1);
    assert_eq!(session.snapshot().score, 110);

    let progress: Vec<Seen> = seen
        .borrow()
        .iter()
        .filter(|s| matches!(s, Seen::Progress(..)))
        .cloned()
        .collect();
    assert_eq!(progress, vec![Seen::Progress(0, 0, 1), Seen::Progress(0, 1, 1)]);
}

#[test]
fn test_summary_over_three_loops() {
    let pattern = Pattern::looped(&[NoteSchedule::new(500.0, KICK)], 2000.0, 3).unwrap();
    let time = Rc::new(MockTimeProvider::new());
    let mut session = PracticeSession::new(pattern, no_lead_in(), Rc::clone(&time)).unwrap();
    session.start();

    time.advance_ms(510);
    session.tick();
    session.strike_now(KICK);
    time.advance_ms(1920);
    session.tick();
    session.strike_now(KICK);
    time.advance_ms(3000);
    session.tick();
    assert_eq!(session.state(), ClockState::Complete);

    let summary = session.summary();
    assert_eq!(summary.score, 194);
    assert_eq!(summary.max_combo, 2);
    assert_eq!(summary.count(Judgment::Perfect), 1);
    assert_eq!(summary.count(Judgment::Good), 1);
    assert_eq!(summary.count(Judgment::Miss), 1);
    assert_eq!(summary.grade, Grade::C);
    assert_eq!((summary.rushing, summary.dragging), (1, 0));
    assert_eq!(summary.strikes_total, 2);
    assert_eq!(summary.loops, 3);
    assert_eq!(summary.filter_rate(), 0.0);

    assert_eq!(summary.averaged.len(), 1);
    let slot = &summary.averaged[0];
    assert_eq!(slot.samples, 3);
    assert_eq!(slot.record.judgment, Judgment::Good);
    assert_eq!(slot.record.time_diff_ms, Some(-30.0));
}

#[test]
fn test_reset_clears_session() {
    let (time, mut session) = session(vec![NoteSchedule::new(1000.0, KICK)], no_lead_in());
    let seen = recorded(&mut session);
    session.start();
    time.advance_ms(1000);
    session.tick();
    session.strike_now(KICK);

    session.reset();
    assert_eq!(session.state(), ClockState::Ready);
    assert_eq!(session.snapshot().total_judged(), 0);
    assert!(session.strike_log().is_empty());
    assert_eq!(session.debounce_stats().total, 0);
    assert_eq!(seen.borrow().last(), Some(&Seen::Score(0, 0)));
}

#[test]
fn test_runtime_setters_keep_old_values_on_error() {
    let (_time, mut session) = session(vec![], SessionConfig::default());
    assert!(session.set_bpm(0.0).is_err());
    assert!(session.set_debounce_window(-5.0).is_err());
    assert!(session.set_combo_rate(-1.0).is_err());
    assert_eq!(session.config().bpm, 120.0);
    assert_eq!(session.config().debounce_ms, 30.0);
    assert_eq!(session.config().combo_rate, 0.1);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let missing = SessionConfig::load(&path).unwrap();
    assert_eq!(missing, SessionConfig::default());

    let config = SessionConfig {
        bpm: 96.0,
        mode: ClockMode::Sequence,
        input_offset_ms: -12.0,
        ..SessionConfig::default()
    };
    config.save(&path).unwrap();
    assert_eq!(SessionConfig::load(&path).unwrap(), config);
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"perfect_ms": 120, "good_ms": 100}"#).unwrap();
    let err = SessionConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("judge windows"));
}

proptest! {
    #[test]
    fn accuracy_bounded_and_max_combo_monotonic(
        strikes in prop::collection::vec((0u8..2, 0i64..300), 0..60),
    ) {
        let notes = (0..12)
            .map(|i| NoteSchedule::new(250.0 * i as f64, if i % 2 == 0 { KICK } else { SNARE }))
            .collect();
        let (time, mut session) = session(notes, no_lead_in());
        session.start();
        let mut max_combo = 0;

        for (pad, gap) in strikes {
            time.advance_ms(gap);
            session.tick();
            let channel = if pad == 0 { KICK } else { SNARE };
            session.strike_now(channel);

            let snapshot = session.snapshot();
            prop_assert!((0.0..=100.0).contains(&snapshot.accuracy));
            prop_assert!(snapshot.max_combo >= max_combo);
            prop_assert!(snapshot.score >= 0);
            max_combo = snapshot.max_combo;

            let (u, a, h, m) = session.clock().bucket_sizes();
            prop_assert_eq!(u + a + h + m, session.clock().notes().len());
        }
    }
}
