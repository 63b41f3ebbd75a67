use groove_rule::{Grade, JudgeWindow, MatchOutcome, ScoreManager, TimingJudge};
use groove_types::{Channel, Judgment, Note, NoteId, NoteSchedule};

const KICK: Channel = Channel(36);

fn active(id: usize, time_ms: f64, channel: Channel) -> Note {
    let mut note = Note::new(NoteId(id), NoteSchedule::new(time_ms, channel));
    note.activate();
    note
}

#[test]
fn test_perfect_window() {
    let judge = TimingJudge::new(JudgeWindow::normal());

    assert_eq!(judge.judge_hit(1000.0, 1000.0, true), Judgment::Perfect);
    assert_eq!(judge.judge_hit(1000.0, 1040.0, true), Judgment::Perfect);
    assert_eq!(judge.judge_hit(1000.0, 950.0, true), Judgment::Perfect);
}

#[test]
fn test_good_window() {
    let judge = TimingJudge::new(JudgeWindow::normal());

    assert_eq!(judge.judge_hit(1000.0, 920.0, true), Judgment::Good);
    assert_eq!(judge.judge_hit(1000.0, 1100.0, true), Judgment::Good);
}

#[test]
fn test_ok_window() {
    let judge = TimingJudge::new(JudgeWindow::normal());

    assert_eq!(judge.judge_hit(1000.0, 1150.0, true), Judgment::Ok);
    assert_eq!(judge.judge_hit(1000.0, 851.0, true), Judgment::Ok);
}

#[test]
fn test_early_late_are_scored() {
    let judge = TimingJudge::new(JudgeWindow::normal());
    let mut score = ScoreManager::new();

    let early = judge.judge_hit(1000.0, 820.0, true);
    let late = judge.judge_hit(1000.0, 1180.0, true);
    assert_eq!(early, Judgment::Early);
    assert_eq!(late, Judgment::Late);

    score.record_judgment(early);
    score.record_judgment(late);
    assert_eq!(score.count(Judgment::Early), 1);
    assert_eq!(score.count(Judgment::Late), 1);
    assert_eq!(score.total_judged(), 2);
}

#[test]
fn test_match_then_judge_flow() {
    let notes = [active(0, 1000.0, KICK), active(1, 1500.0, KICK)];
    let mut judge = TimingJudge::default();
    let mut score = ScoreManager::new();

    let outcome = judge.match_strike(KICK, 1040.0, &notes);
    assert_eq!(outcome, MatchOutcome::Matched(NoteId(0)));

    let note = &notes[0];
    let judgment = judge.judge_hit(note.time_ms(), 1040.0, true);
    let snapshot = score.record_judgment(judgment);
    assert_eq!(snapshot.combo, 1);
    assert_eq!(snapshot.grade, Grade::S);
}
