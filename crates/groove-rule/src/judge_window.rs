use groove_types::{ConfigError, Judgment};
use serde::{Deserialize, Serialize};

/// Timing thresholds in milliseconds, compared against the absolute offset.
///
/// Offsets beyond `ok_ms` but within `miss_ms` classify as Early or Late by
/// sign. With `ok_ms == miss_ms` those tiers are unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgeWindow {
    pub perfect_ms: f64,
    pub good_ms: f64,
    pub ok_ms: f64,
    pub miss_ms: f64,
}

impl JudgeWindow {
    pub fn new(perfect_ms: f64, good_ms: f64, ok_ms: f64, miss_ms: f64) -> Result<Self, ConfigError> {
        let window = Self {
            perfect_ms,
            good_ms,
            ok_ms,
            miss_ms,
        };
        window.validate()?;
        Ok(window)
    }

    /// Default windows: 50 / 100 / 150 / 200.
    pub fn normal() -> Self {
        Self {
            perfect_ms: 50.0,
            good_ms: 100.0,
            ok_ms: 150.0,
            miss_ms: 200.0,
        }
    }

    pub fn builder() -> JudgeWindowBuilder {
        JudgeWindowBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.perfect_ms >= 0.0
            && self.perfect_ms <= self.good_ms
            && self.good_ms <= self.ok_ms
            && self.ok_ms <= self.miss_ms;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::UnorderedJudgeWindows {
                perfect: self.perfect_ms,
                good: self.good_ms,
                ok: self.ok_ms,
                miss: self.miss_ms,
            })
        }
    }

    /// Classify a signed offset (`hit - note`, negative = early).
    pub fn classify(&self, time_diff_ms: f64) -> Judgment {
        let abs_diff = time_diff_ms.abs();

        if abs_diff <= self.perfect_ms {
            Judgment::Perfect
        } else if abs_diff <= self.good_ms {
            Judgment::Good
        } else if abs_diff <= self.ok_ms {
            Judgment::Ok
        } else if abs_diff <= self.miss_ms {
            if time_diff_ms < 0.0 {
                Judgment::Early
            } else {
                Judgment::Late
            }
        } else {
            Judgment::Miss
        }
    }

    pub fn is_in_window(&self, time_diff_ms: f64) -> bool {
        time_diff_ms.abs() <= self.miss_ms
    }
}

impl Default for JudgeWindow {
    fn default() -> Self {
        Self::normal()
    }
}

#[derive(Debug, Default)]
pub struct JudgeWindowBuilder {
    perfect_ms: Option<f64>,
    good_ms: Option<f64>,
    ok_ms: Option<f64>,
    miss_ms: Option<f64>,
}

impl JudgeWindowBuilder {
    pub fn perfect(mut self, ms: f64) -> Self {
        self.perfect_ms = Some(ms);
        self
    }

    pub fn good(mut self, ms: f64) -> Self {
        self.good_ms = Some(ms);
        self
    }

    pub fn ok(mut self, ms: f64) -> Self {
        self.ok_ms = Some(ms);
        self
    }

    pub fn miss(mut self, ms: f64) -> Self {
        self.miss_ms = Some(ms);
        self
    }

    pub fn build(self) -> Result<JudgeWindow, ConfigError> {
        let default = JudgeWindow::normal();
        JudgeWindow::new(
            self.perfect_ms.unwrap_or(default.perfect_ms),
            self.good_ms.unwrap_or(default.good_ms),
            self.ok_ms.unwrap_or(default.ok_ms),
            self.miss_ms.unwrap_or(default.miss_ms),
        )
    }
}
