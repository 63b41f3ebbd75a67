use groove_types::ConfigError;
use serde::{Deserialize, Serialize};

/// How the clock advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Virtual time follows wall time; unhit notes expire as misses.
    #[default]
    Timed,
    /// Virtual time waits before each note until the correct channel is struck.
    Sequence,
}

/// Clock and lifecycle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    pub bpm: f64,
    /// Beats of countdown before the pattern starts.
    pub lead_in_beats: u32,
    /// Notes within this span ahead of virtual time become Active.
    pub lookahead_ms: f64,
    /// Active notes older than this behind virtual time are Missed.
    pub miss_window_ms: f64,
    pub mode: ClockMode,
}

impl ClockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(ConfigError::NonPositiveTempo(self.bpm));
        }
        if self.lookahead_ms.is_nan() || self.lookahead_ms < 0.0 {
            return Err(ConfigError::NegativeLookahead(self.lookahead_ms));
        }
        if self.miss_window_ms.is_nan() || self.miss_window_ms < 0.0 {
            return Err(ConfigError::NegativeMissWindow(self.miss_window_ms));
        }
        Ok(())
    }

    /// Length of one beat in ms.
    pub fn beat_ms(&self) -> f64 {
        60_000.0 / self.bpm
    }

    pub fn lead_in_ms(&self) -> f64 {
        self.beat_ms() * self.lead_in_beats as f64
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            lead_in_beats: 4,
            lookahead_ms: 2000.0,
            miss_window_ms: 200.0,
            mode: ClockMode::Timed,
        }
    }
}
