/// Oldest reachable snapshot: one year back.
pub const MAX_WEEKS_BACK: u32 = 52;

/// Week-offset cursor for time travel. 0 is the latest snapshot; larger
/// values go further back, bounded at one year.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeTravel {
    week: u32,
}

impl TimeTravel {
    pub fn new() -> Self {
        TimeTravel { week: 0 }
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// One week further back in time. Returns false (no-op) at the bound.
    pub fn previous_week(&mut self) -> bool {
        if self.week >= MAX_WEEKS_BACK {
            return false;
        }
        self.week += 1;
        true
    }

    /// One week toward the present. Returns false (no-op) at week 0.
    pub fn next_week(&mut self) -> bool {
        if self.week == 0 {
            return false;
        }
        self.week -= 1;
        true
    }

    /// Absolute jump, e.g. from a slider. Clamped to the bound; returns
    /// whether the cursor actually moved.
    pub fn set_week(&mut self, week: u32) -> bool {
        let clamped = week.min(MAX_WEEKS_BACK);
        if clamped == self.week {
            return false;
        }
        self.week = clamped;
        true
    }

    pub fn reset(&mut self) {
        self.week = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn going_back_stops_at_one_year() {
        let mut cursor = TimeTravel::new();
        for _ in 0..53 {
            cursor.previous_week();
        }
        assert_eq!(cursor.week(), 52);
        assert!(!cursor.previous_week());
        assert_eq!(cursor.week(), 52);
    }

    #[test]
    fn going_forward_stops_at_the_present() {
        let mut cursor = TimeTravel::new();
        assert!(!cursor.next_week());
        assert_eq!(cursor.week(), 0);

        cursor.previous_week();
        assert!(cursor.next_week());
        assert_eq!(cursor.week(), 0);
    }

    #[test]
    fn set_week_clamps_and_reports_movement() {
        let mut cursor = TimeTravel::new();
        assert!(cursor.set_week(10));
        assert_eq!(cursor.week(), 10);
        assert!(!cursor.set_week(10));
        assert!(cursor.set_week(400));
        assert_eq!(cursor.week(), MAX_WEEKS_BACK);
    }
}
