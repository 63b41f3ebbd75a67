use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use groove_input::DEFAULT_DEBOUNCE_MS;
use groove_rule::{DEFAULT_COMBO_RATE, DEFAULT_DOUBLE_HIT_GUARD_MS, JudgeWindow};
use groove_timing::{ClockConfig, ClockMode};
use groove_types::ConfigError;
use serde::{Deserialize, Serialize};

/// Practice session settings. Every field falls back to its default when
/// absent from the JSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Countdown beats before the pattern starts.
    #[serde(default = "default_lead_in_beats")]
    pub lead_in_beats: u32,
    #[serde(default = "default_lookahead_ms")]
    pub lookahead_ms: f64,
    #[serde(default = "default_perfect_ms")]
    pub perfect_ms: f64,
    #[serde(default = "default_good_ms")]
    pub good_ms: f64,
    #[serde(default = "default_ok_ms")]
    pub ok_ms: f64,
    /// Miss boundary; also the clock's expiry window.
    #[serde(default = "default_miss_ms")]
    pub miss_ms: f64,
    #[serde(default = "default_double_hit_guard_ms")]
    pub double_hit_guard_ms: f64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: f64,
    #[serde(default = "default_combo_rate")]
    pub combo_rate: f64,
    /// Input latency compensation in ms, subtracted from strike times
    /// (positive = the pad reports late).
    #[serde(default)]
    pub input_offset_ms: f64,
    #[serde(default)]
    pub mode: ClockMode,
    /// Phase tolerance used when collapsing loops in the summary.
    #[serde(default = "default_loop_tolerance_ms")]
    pub loop_tolerance_ms: f64,
}

fn default_bpm() -> f64 {
    120.0
}

fn default_lead_in_beats() -> u32 {
    4
}

fn default_lookahead_ms() -> f64 {
    2000.0
}

fn default_perfect_ms() -> f64 {
    50.0
}

fn default_good_ms() -> f64 {
    100.0
}

fn default_ok_ms() -> f64 {
    150.0
}

fn default_miss_ms() -> f64 {
    200.0
}

fn default_double_hit_guard_ms() -> f64 {
    DEFAULT_DOUBLE_HIT_GUARD_MS
}

fn default_debounce_ms() -> f64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_combo_rate() -> f64 {
    DEFAULT_COMBO_RATE
}

fn default_loop_tolerance_ms() -> f64 {
    20.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            lead_in_beats: default_lead_in_beats(),
            lookahead_ms: default_lookahead_ms(),
            perfect_ms: default_perfect_ms(),
            good_ms: default_good_ms(),
            ok_ms: default_ok_ms(),
            miss_ms: default_miss_ms(),
            double_hit_guard_ms: default_double_hit_guard_ms(),
            debounce_ms: default_debounce_ms(),
            combo_rate: default_combo_rate(),
            input_offset_ms: 0.0,
            mode: ClockMode::Timed,
            loop_tolerance_ms: default_loop_tolerance_ms(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("failed to parse session config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("invalid session config {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("failed to write session config {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clock_config().validate()?;
        self.judge_window().validate()?;
        if self.debounce_ms.is_nan() || self.debounce_ms < 0.0 {
            return Err(ConfigError::NegativeDebounceWindow(self.debounce_ms));
        }
        if self.combo_rate.is_nan() || self.combo_rate < 0.0 {
            return Err(ConfigError::NegativeComboRate(self.combo_rate));
        }
        if self.double_hit_guard_ms.is_nan() || self.double_hit_guard_ms < 0.0 {
            return Err(ConfigError::NegativeTolerance(self.double_hit_guard_ms));
        }
        if self.loop_tolerance_ms.is_nan() || self.loop_tolerance_ms < 0.0 {
            return Err(ConfigError::NegativeTolerance(self.loop_tolerance_ms));
        }
        Ok(())
    }

    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            bpm: self.bpm,
            lead_in_beats: self.lead_in_beats,
            lookahead_ms: self.lookahead_ms,
            miss_window_ms: self.miss_ms,
            mode: self.mode,
        }
    }

    pub fn judge_window(&self) -> JudgeWindow {
        JudgeWindow {
            perfect_ms: self.perfect_ms,
            good_ms: self.good_ms,
            ok_ms: self.ok_ms,
            miss_ms: self.miss_ms,
        }
    }
}
