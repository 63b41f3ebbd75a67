// Judge windows, note matching, scoring and grades

mod grade;
mod judge_window;
mod score_manager;
mod timing_judge;
mod timing_stats;

pub use grade::Grade;
pub use judge_window::{JudgeWindow, JudgeWindowBuilder};
pub use score_manager::{DEFAULT_COMBO_RATE, ScoreManager, ScoreSnapshot};
pub use timing_judge::{DEFAULT_DOUBLE_HIT_GUARD_MS, MatchOutcome, TimingJudge};
pub use timing_stats::TimingStats;
