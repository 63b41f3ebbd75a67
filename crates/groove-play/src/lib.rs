// Practice session: wires input, judging, scoring and the clock together

mod config;
mod listener;
mod session;
mod summary;

pub use config::SessionConfig;
pub use listener::SessionListener;
pub use session::{PracticeSession, StrikeOutcome};
pub use summary::SessionSummary;
