use serde::{Deserialize, Serialize};

/// Validity window of one logged fact over logical time.
///
/// Facts are never overwritten; deletion only ever sets `time_deleted`
/// (tombstone), and the transition is one-way. Invariant:
/// `time_deleted >= time_inserted` when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub time_inserted: i64,
    pub time_deleted: Option<i64>,
}

impl ValidityWindow {
    pub fn new(time_inserted: i64, time_deleted: Option<i64>) -> Self {
        debug_assert!(time_deleted.map_or(true, |d| d >= time_inserted));
        Self {
            time_inserted,
            time_deleted,
        }
    }

    /// Visible at `t` iff inserted at or before `t` and not yet deleted at
    /// `t`. An instantaneous event (inserted and deleted on the same tick)
    /// is visible exactly at that tick.
    pub fn visible_at(&self, t: i64) -> bool {
        match self.time_deleted {
            Some(d) if d == self.time_inserted => t == d,
            Some(d) => self.time_inserted <= t && t < d,
            None => self.time_inserted <= t,
        }
    }

    pub fn is_tombstoned(&self) -> bool {
        self.time_deleted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_window_visible_from_insertion() {
        let w = ValidityWindow::new(5, None);
        assert!(!w.visible_at(4));
        assert!(w.visible_at(5));
        assert!(w.visible_at(100));
    }

    #[test]
    fn tombstoned_window_hides_at_deletion() {
        let w = ValidityWindow::new(5, Some(9));
        assert!(w.visible_at(5));
        assert!(w.visible_at(8));
        assert!(!w.visible_at(9));
    }

    #[test]
    fn instantaneous_event_visible_only_at_its_tick() {
        let w = ValidityWindow::new(7, Some(7));
        assert!(!w.visible_at(6));
        assert!(w.visible_at(7));
        assert!(!w.visible_at(8));
    }
}
