// Note, pattern and judgment types shared by every groove crate

mod error;
mod judgment;
mod note;
mod pattern;

pub use error::ConfigError;
pub use judgment::{AccuracyRecord, Judgment, TimingDirection};
pub use note::{Channel, Note, NoteId, NoteSchedule, NoteState};
pub use pattern::Pattern;

/// Number of judgment tiers.
pub const JUDGMENT_COUNT: usize = 7;
