use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::note::NoteSchedule;

/// Ordered note schedules plus the durations the clock needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    notes: Vec<NoteSchedule>,
    /// Total nominal duration in ms.
    duration_ms: f64,
    /// Length of one loop in ms, used to fold repeated loops onto each other.
    loop_duration_ms: f64,
}

impl Pattern {
    /// Single-loop pattern. Notes are stably sorted by schedule time.
    pub fn new(notes: Vec<NoteSchedule>, duration_ms: f64) -> Result<Self, ConfigError> {
        Self::with_loop_duration(notes, duration_ms, duration_ms)
    }

    pub fn with_loop_duration(
        mut notes: Vec<NoteSchedule>,
        duration_ms: f64,
        loop_duration_ms: f64,
    ) -> Result<Self, ConfigError> {
        for value in [duration_ms, loop_duration_ms] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositiveLoopDuration(value));
            }
        }
        notes.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        Ok(Self {
            notes,
            duration_ms,
            loop_duration_ms,
        })
    }

    /// Repeat one loop `loops` times back to back.
    pub fn looped(
        one_loop: &[NoteSchedule],
        loop_duration_ms: f64,
        loops: u32,
    ) -> Result<Self, ConfigError> {
        let notes = (0..loops)
            .flat_map(|i| {
                let offset = loop_duration_ms * i as f64;
                one_loop.iter().map(move |n| n.shifted(offset))
            })
            .collect();
        Self::with_loop_duration(notes, loop_duration_ms * loops.max(1) as f64, loop_duration_ms)
    }

    pub fn notes(&self) -> &[NoteSchedule] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn loop_duration_ms(&self) -> f64 {
        self.loop_duration_ms
    }

    /// Whole loops in the total duration, at least one.
    pub fn loop_count(&self) -> u32 {
        (self.duration_ms / self.loop_duration_ms).round().max(1.0) as u32
    }

    /// Notes of the first loop only.
    pub fn single_loop(&self) -> impl Iterator<Item = &NoteSchedule> + '_ {
        self.notes
            .iter()
            .filter(move |n| n.time_ms < self.loop_duration_ms)
    }
}
