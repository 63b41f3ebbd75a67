use std::fmt;

use serde::{Deserialize, Serialize};

use crate::judgment::{AccuracyRecord, Judgment};

/// Abstract input voice a performer strikes (e.g. a drum pad's MIDI note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(pub u8);

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Stable identity of a note within one engine run.
///
/// Collaborators key their own side tables (render state, "already sounded"
/// flags) by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub usize);

/// Immutable schedule of a note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSchedule {
    /// Offset from pattern start in milliseconds.
    pub time_ms: f64,
    pub channel: Channel,
    /// Strike intensity (0-127).
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

fn default_velocity() -> u8 {
    100
}

impl NoteSchedule {
    pub fn new(time_ms: f64, channel: Channel) -> Self {
        Self {
            time_ms,
            channel,
            velocity: default_velocity(),
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    /// Copy of this schedule moved later by `offset_ms`.
    pub fn shifted(&self, offset_ms: f64) -> Self {
        Self {
            time_ms: self.time_ms + offset_ms,
            ..*self
        }
    }
}

/// Lifecycle bucket of a note. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteState {
    Upcoming,
    Active,
    Hit,
    Missed,
}

impl NoteState {
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Hit | Self::Missed)
    }
}

/// A scheduled note plus its lifecycle fields.
///
/// Lifecycle mutators panic on an illegal transition: a note that is judged
/// twice or moved backward indicates a driver bug.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    id: NoteId,
    schedule: NoteSchedule,
    state: NoteState,
    accuracy: Option<AccuracyRecord>,
}

impl Note {
    pub fn new(id: NoteId, schedule: NoteSchedule) -> Self {
        Self {
            id,
            schedule,
            state: NoteState::Upcoming,
            accuracy: None,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn schedule(&self) -> &NoteSchedule {
        &self.schedule
    }

    pub fn time_ms(&self) -> f64 {
        self.schedule.time_ms
    }

    pub fn channel(&self) -> Channel {
        self.schedule.channel
    }

    pub fn velocity(&self) -> u8 {
        self.schedule.velocity
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_judged(&self) -> bool {
        self.accuracy.is_some()
    }

    pub fn is_hit(&self) -> bool {
        self.state == NoteState::Hit
    }

    pub fn accuracy(&self) -> Option<&AccuracyRecord> {
        self.accuracy.as_ref()
    }

    /// Upcoming -> Active.
    pub fn activate(&mut self) {
        assert!(
            self.state == NoteState::Upcoming,
            "note {:?} cannot become active from {:?}",
            self.id,
            self.state
        );
        self.state = NoteState::Active;
    }

    /// Active -> Hit, attaching the accuracy record.
    pub fn resolve_hit(&mut self, time_diff_ms: f64, judgment: Judgment) {
        self.resolve(NoteState::Hit, AccuracyRecord::struck(time_diff_ms, judgment));
    }

    /// Active -> Missed, attaching an expired accuracy record.
    pub fn resolve_miss(&mut self) {
        self.resolve(NoteState::Missed, AccuracyRecord::expired());
    }

    fn resolve(&mut self, to: NoteState, record: AccuracyRecord) {
        assert!(
            self.state == NoteState::Active,
            "note {:?} cannot move to {:?} from {:?}",
            self.id,
            to,
            self.state
        );
        assert!(
            self.accuracy.is_none(),
            "note {:?} already carries an accuracy record",
            self.id
        );
        self.state = to;
        self.accuracy = Some(record);
    }
}
