use serde::{Deserialize, Serialize};

/// Judgment tier for a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    Perfect,
    Good,
    Ok,
    Early,
    Late,
    Miss,
    WrongChannel,
}

impl Judgment {
    /// All tiers in counter order.
    pub const ALL: [Judgment; 7] = [
        Judgment::Perfect,
        Judgment::Good,
        Judgment::Ok,
        Judgment::Early,
        Judgment::Late,
        Judgment::Miss,
        Judgment::WrongChannel,
    ];

    /// Base score contribution before the combo multiplier.
    pub fn base_score(self) -> i64 {
        match self {
            Self::Perfect => 100,
            Self::Good => 70,
            Self::Ok => 40,
            Self::Early | Self::Late => -10,
            Self::Miss => 0,
            Self::WrongChannel => -20,
        }
    }

    /// Index into per-tier counter arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Perfect => 0,
            Self::Good => 1,
            Self::Ok => 2,
            Self::Early => 3,
            Self::Late => 4,
            Self::Miss => 5,
            Self::WrongChannel => 6,
        }
    }

    /// Perfect and Good extend the combo.
    pub fn extends_combo(self) -> bool {
        matches!(self, Self::Perfect | Self::Good)
    }

    /// Ok neither extends nor breaks the combo.
    pub fn breaks_combo(self) -> bool {
        matches!(
            self,
            Self::Early | Self::Late | Self::Miss | Self::WrongChannel
        )
    }

    /// Tiers that count toward accuracy.
    pub fn is_quality(self) -> bool {
        matches!(self, Self::Perfect | Self::Good | Self::Ok)
    }

    /// Ordering from best to worst timing quality; lower is better.
    pub fn severity(self) -> u8 {
        match self {
            Self::Perfect => 0,
            Self::Good => 1,
            Self::Ok => 2,
            Self::Early => 3,
            Self::Late => 4,
            Self::WrongChannel => 5,
            Self::Miss => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Good => "GOOD",
            Self::Ok => "OK",
            Self::Early => "EARLY",
            Self::Late => "LATE",
            Self::Miss => "MISS",
            Self::WrongChannel => "WRONG",
        }
    }
}

/// Rushing/dragging indicator derived from the sign of a timing offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingDirection {
    Rushing,
    OnTime,
    Dragging,
}

impl TimingDirection {
    pub fn from_time_diff(time_diff_ms: f64) -> Self {
        if time_diff_ms < 0.0 {
            TimingDirection::Rushing
        } else if time_diff_ms > 0.0 {
            TimingDirection::Dragging
        } else {
            TimingDirection::OnTime
        }
    }
}

/// Accuracy attached exactly once to a judged note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    /// Hit time minus schedule time in ms. `None` for notes that expired unhit.
    pub time_diff_ms: Option<f64>,
    pub judgment: Judgment,
    pub wrong_channel: bool,
    pub missed: bool,
}

impl AccuracyRecord {
    /// Record for a note that was struck.
    pub fn struck(time_diff_ms: f64, judgment: Judgment) -> Self {
        Self {
            time_diff_ms: Some(time_diff_ms),
            judgment,
            wrong_channel: judgment == Judgment::WrongChannel,
            missed: false,
        }
    }

    /// Record for a note that left the miss window without being struck.
    pub fn expired() -> Self {
        Self {
            time_diff_ms: None,
            judgment: Judgment::Miss,
            wrong_channel: false,
            missed: true,
        }
    }

    pub fn direction(&self) -> Option<TimingDirection> {
        self.time_diff_ms.map(TimingDirection::from_time_diff)
    }

    pub fn is_rushing(&self) -> bool {
        self.direction() == Some(TimingDirection::Rushing)
    }

    pub fn is_dragging(&self) -> bool {
        self.direction() == Some(TimingDirection::Dragging)
    }
}
