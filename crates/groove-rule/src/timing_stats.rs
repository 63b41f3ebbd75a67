use groove_types::{Judgment, TimingDirection};

/// Cumulative rushing/dragging counts for struck notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    pub rushing: u32,
    pub dragging: u32,
}

impl TimingStats {
    pub fn record(&mut self, judgment: Judgment, time_diff_ms: f64) {
        // Perfect is on time by definition; wrong-channel offsets are meaningless
        if matches!(judgment, Judgment::Perfect | Judgment::WrongChannel | Judgment::Miss) {
            return;
        }

        match TimingDirection::from_time_diff(time_diff_ms) {
            TimingDirection::Rushing => self.rushing += 1,
            TimingDirection::Dragging => self.dragging += 1,
            TimingDirection::OnTime => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_sign() {
        let mut stats = TimingStats::default();
        stats.record(Judgment::Good, -80.0);
        stats.record(Judgment::Late, 170.0);
        stats.record(Judgment::Ok, 120.0);
        assert_eq!(stats.rushing, 1);
        assert_eq!(stats.dragging, 2);
    }

    #[test]
    fn perfect_and_wrong_channel_not_counted() {
        let mut stats = TimingStats::default();
        stats.record(Judgment::Perfect, 40.0);
        stats.record(Judgment::WrongChannel, -30.0);
        assert_eq!(stats, TimingStats::default());
    }
}
