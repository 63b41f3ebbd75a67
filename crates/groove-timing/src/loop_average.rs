use groove_types::{AccuracyRecord, Channel, Judgment, Note};
use serde::{Deserialize, Serialize};

/// One slot of the loop, collapsed across every repetition that was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedNote {
    /// Loop-relative position of the slot's first sample.
    pub phase_ms: f64,
    pub channel: Channel,
    pub record: AccuracyRecord,
    /// Number of judged notes folded into this slot.
    pub samples: usize,
}

struct Group {
    phase_ms: f64,
    channel: Channel,
    records: Vec<AccuracyRecord>,
}

/// Distance between two phases on a loop of `loop_ms`, accounting for
/// wrap-around (a note at 1999ms and one at 1ms are 2ms apart in a 2000ms loop).
fn phase_distance(a: f64, b: f64, loop_ms: f64) -> f64 {
    let d = (a - b).rem_euclid(loop_ms);
    d.min(loop_ms - d)
}

/// Group judged notes by (phase, channel) and reduce each group by majority.
///
/// Unjudged notes are skipped. Result is ordered by phase, then channel.
pub fn average_across_loops(notes: &[Note], loop_ms: f64, tolerance_ms: f64) -> Vec<AveragedNote> {
    let mut groups: Vec<Group> = Vec::new();

    let mut judged: Vec<&Note> = notes.iter().filter(|n| n.is_judged()).collect();
    judged.sort_by(|a, b| a.time_ms().total_cmp(&b.time_ms()).then(a.id().cmp(&b.id())));

    for note in judged {
        let Some(record) = note.accuracy() else {
            continue;
        };
        let phase = note.time_ms().rem_euclid(loop_ms);
        let slot = groups.iter_mut().find(|g| {
            g.channel == note.channel() && phase_distance(g.phase_ms, phase, loop_ms) <= tolerance_ms
        });
        match slot {
            Some(group) => group.records.push(*record),
            None => groups.push(Group {
                phase_ms: phase,
                channel: note.channel(),
                records: vec![*record],
            }),
        }
    }

    let mut averaged: Vec<AveragedNote> = groups
        .into_iter()
        .map(|g| AveragedNote {
            phase_ms: g.phase_ms,
            channel: g.channel,
            record: collapse(&g.records),
            samples: g.records.len(),
        })
        .collect();
    averaged.sort_by(|a, b| a.phase_ms.total_cmp(&b.phase_ms).then(a.channel.cmp(&b.channel)));
    averaged
}

/// Majority rule: at least half missed gives Miss; otherwise at least half on
/// the wrong channel gives WrongChannel; otherwise the most frequent remaining
/// tier wins, ties going to the worse tier.
fn collapse(records: &[AccuracyRecord]) -> AccuracyRecord {
    let total = records.len();
    let missed = records.iter().filter(|r| r.missed).count();
    let wrong = records.iter().filter(|r| r.wrong_channel).count();

    let offsets: Vec<f64> = records.iter().filter_map(|r| r.time_diff_ms).collect();
    let time_diff_ms = if offsets.is_empty() {
        None
    } else {
        Some(offsets.iter().sum::<f64>() / offsets.len() as f64)
    };

    let (judgment, wrong_channel, is_missed) = if missed * 2 >= total {
        (Judgment::Miss, false, true)
    } else if wrong * 2 >= total {
        (Judgment::WrongChannel, true, false)
    } else {
        (dominant_tier(records), false, false)
    };

    AccuracyRecord {
        time_diff_ms,
        judgment,
        wrong_channel,
        missed: is_missed,
    }
}

fn dominant_tier(records: &[AccuracyRecord]) -> Judgment {
    let mut counts = [0usize; groove_types::JUDGMENT_COUNT];
    for record in records.iter().filter(|r| !r.missed && !r.wrong_channel) {
        counts[record.judgment.index()] += 1;
    }
    Judgment::ALL
        .into_iter()
        .filter(|j| counts[j.index()] > 0)
        .max_by(|a, b| {
            counts[a.index()]
                .cmp(&counts[b.index()])
                .then(a.severity().cmp(&b.severity()))
        })
        .unwrap_or(Judgment::Miss)
}
