pub mod clock_engine;
pub mod config;
pub mod loop_average;
pub mod time;

pub use clock_engine::{ClockEngine, ClockEvent, ClockState, SequenceOutcome};
pub use config::{ClockConfig, ClockMode};
pub use loop_average::{AveragedNote, average_across_loops};
pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
