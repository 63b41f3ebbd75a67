use groove_types::{ConfigError, JUDGMENT_COUNT, Judgment};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Default per-combo-step score bonus.
pub const DEFAULT_COMBO_RATE: f64 = 0.1;

/// Point-in-time copy of the session score, emitted on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub score: i64,
    pub combo: u32,
    pub max_combo: u32,
    /// Per-tier counters, indexed by [`Judgment::index`].
    pub counts: [u32; JUDGMENT_COUNT],
    pub accuracy: f64,
    pub grade: Grade,
}

impl ScoreSnapshot {
    pub fn count(&self, judgment: Judgment) -> u32 {
        self.counts[judgment.index()]
    }

    pub fn total_judged(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// Converts judgments into score with a combo multiplier.
#[derive(Debug, Clone)]
pub struct ScoreManager {
    combo_rate: f64,
    score: i64,
    combo: u32,
    max_combo: u32,
    counts: [u32; JUDGMENT_COUNT],
}

impl ScoreManager {
    pub fn new() -> Self {
        Self {
            combo_rate: DEFAULT_COMBO_RATE,
            score: 0,
            combo: 0,
            max_combo: 0,
            counts: [0; JUDGMENT_COUNT],
        }
    }

    pub fn with_combo_rate(combo_rate: f64) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.set_combo_rate(combo_rate)?;
        Ok(manager)
    }

    pub fn set_combo_rate(&mut self, combo_rate: f64) -> Result<(), ConfigError> {
        if combo_rate.is_nan() || combo_rate < 0.0 {
            return Err(ConfigError::NegativeComboRate(combo_rate));
        }
        self.combo_rate = combo_rate;
        Ok(())
    }

    pub fn combo_rate(&self) -> f64 {
        self.combo_rate
    }

    /// Apply a judgment.
    ///
    /// The combo is updated first; the multiplier uses the updated combo, so
    /// combo-breaking penalties apply at their base value. The running total
    /// never drops below zero.
    pub fn record_judgment(&mut self, judgment: Judgment) -> ScoreSnapshot {
        self.counts[judgment.index()] += 1;

        if judgment.extends_combo() {
            self.combo += 1;
        } else if judgment.breaks_combo() {
            self.combo = 0;
        }
        self.max_combo = self.max_combo.max(self.combo);

        let delta = self.effective_score(judgment);
        self.score = (self.score + delta).max(0);
        debug!(
            "{} -> {:+} (combo {}, score {})",
            judgment.label(),
            delta,
            self.combo,
            self.score
        );

        self.snapshot()
    }

    /// A note expired without being struck: counts a Miss, breaks the combo,
    /// adds no score.
    pub fn record_miss(&mut self) -> ScoreSnapshot {
        self.counts[Judgment::Miss.index()] += 1;
        self.combo = 0;
        self.snapshot()
    }

    fn effective_score(&self, judgment: Judgment) -> i64 {
        let multiplier = 1.0 + self.combo as f64 * self.combo_rate;
        (judgment.base_score() as f64 * multiplier).floor() as i64
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn count(&self, judgment: Judgment) -> u32 {
        self.counts[judgment.index()]
    }

    pub fn total_judged(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Share of judged notes that were Perfect, Good or Ok, in percent.
    /// Zero before anything is judged.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_judged();
        if total == 0 {
            return 0.0;
        }
        let quality: u32 = Judgment::ALL
            .iter()
            .filter(|j| j.is_quality())
            .map(|j| self.count(*j))
            .sum();
        quality as f64 / total as f64 * 100.0
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy())
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            counts: self.counts,
            accuracy: self.accuracy(),
            grade: self.grade(),
        }
    }

    /// Zero every counter. The combo rate is kept.
    pub fn reset(&mut self) -> ScoreSnapshot {
        *self = Self {
            combo_rate: self.combo_rate,
            ..Self::new()
        };
        self.snapshot()
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new()
    }
}
