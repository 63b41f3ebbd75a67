use thiserror::Error;

/// Rejected configuration value. The setter that returned it keeps its
/// previous value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tempo must be positive, got {0} bpm")]
    NonPositiveTempo(f64),

    #[error("debounce window must not be negative, got {0} ms")]
    NegativeDebounceWindow(f64),

    #[error("judge windows must be non-decreasing: perfect {perfect} <= good {good} <= ok {ok} <= miss {miss}")]
    UnorderedJudgeWindows {
        perfect: f64,
        good: f64,
        ok: f64,
        miss: f64,
    },

    #[error("combo rate must not be negative, got {0}")]
    NegativeComboRate(f64),

    #[error("loop duration must be positive, got {0} ms")]
    NonPositiveLoopDuration(f64),

    #[error("lookahead must not be negative, got {0} ms")]
    NegativeLookahead(f64),

    #[error("miss window must not be negative, got {0} ms")]
    NegativeMissWindow(f64),

    #[error("tolerance must not be negative, got {0} ms")]
    NegativeTolerance(f64),
}
