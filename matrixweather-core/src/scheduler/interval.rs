//! Interval gate
//!
//! Tracks one periodic action. A fresh gate is due immediately. After a
//! success the action is due again one interval later; after a failure it
//! is due again after the retry delay, and the last success is kept.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntervalGate {
    interval_ms: u64,
    retry_ms: u64,
    last_success: Option<u64>,
    next_due: Option<u64>,
}

impl IntervalGate {
    pub const fn new(interval_ms: u64, retry_ms: u64) -> Self {
        Self {
            interval_ms,
            retry_ms,
            last_success: None,
            next_due: None,
        }
    }

    /// Whether the action should run at `now_ms`
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.next_due {
            None => true,
            Some(due) => now_ms >= due,
        }
    }

    pub fn mark_success(&mut self, now_ms: u64) {
        self.last_success = Some(now_ms);
        self.next_due = Some(now_ms.saturating_add(self.interval_ms));
    }

    pub fn mark_failure(&mut self, now_ms: u64) {
        self.next_due = Some(now_ms.saturating_add(self.retry_ms));
    }

    /// Timestamp of the last success, `None` before the first
    pub fn last_success(&self) -> Option<u64> {
        self.last_success
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interval_after_success() {
        let mut gate = IntervalGate::new(600_000, 30_000);
        gate.mark_success(1_000);

        assert!(!gate.is_due(1_000));
        assert!(!gate.is_due(600_999));
        assert!(gate.is_due(601_000));
        assert_eq!(gate.last_success(), Some(1_000));
    }

    #[test]
    fn test_failure_keeps_last_success() {
        let mut gate = IntervalGate::new(600_000, 30_000);
        gate.mark_success(0);
        gate.mark_failure(600_000);

        assert_eq!(gate.last_success(), Some(0));
        assert!(!gate.is_due(629_999));
        assert!(gate.is_due(630_000));
    }

    #[test]
    fn test_failure_before_first_success() {
        let mut gate = IntervalGate::new(3_600_000, 30_000);
        gate.mark_failure(5);

        assert_eq!(gate.last_success(), None);
        assert!(!gate.is_due(6));
        assert!(gate.is_due(30_005));
    }

    proptest! {
        #[test]
        fn prop_fresh_gate_is_always_due(
            interval in any::<u64>(),
            retry in any::<u64>(),
            now in any::<u64>(),
        ) {
            prop_assert!(IntervalGate::new(interval, retry).is_due(now));
        }
    }
}
