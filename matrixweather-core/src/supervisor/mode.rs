//! Operational mode state machine
//!
//! The mode is a pure function of the previous mode and an event. Nothing
//! here touches hardware; the supervisor performs the side effects and
//! then records the transition.

use crate::config::RecoveryMode;

/// Operational modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationalMode {
    /// Power-on, primary not yet invoked
    Starting,
    /// Primary loop running
    Running,
    /// Primary failed; display being blanked
    DegradedEntry,
    /// Blinking forever (terminal)
    DegradedHold,
    /// Blinking until the reset delay elapses
    DegradedCountdown,
    /// Hardware reset issued
    ResetRequested,
}

/// Events that drive mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// The primary loop was invoked
    PrimaryInvoked,
    /// The primary loop returned a failure
    PrimaryFailed,
    /// Degraded display set up; continue in the configured variant
    DegradedReady(RecoveryMode),
    /// The reset delay has elapsed
    DelayElapsed,
}

impl OperationalMode {
    /// Check if this is one of the degraded modes
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            OperationalMode::DegradedEntry
                | OperationalMode::DegradedHold
                | OperationalMode::DegradedCountdown
        )
    }

    /// Process an event and return the next mode
    pub fn transition(self, event: ModeEvent) -> Self {
        use ModeEvent::*;
        use OperationalMode::*;

        match (self, event) {
            (Starting, PrimaryInvoked) => Running,
            (Starting, PrimaryFailed) => DegradedEntry,

            (Running, PrimaryFailed) => DegradedEntry,

            (DegradedEntry, DegradedReady(RecoveryMode::Hold)) => DegradedHold,
            (DegradedEntry, DegradedReady(RecoveryMode::TimedReset)) => DegradedCountdown,

            (DegradedCountdown, DelayElapsed) => ResetRequested,

            // Hold is terminal; everything else stays put
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_to_running() {
        let mode = OperationalMode::Starting.transition(ModeEvent::PrimaryInvoked);
        assert_eq!(mode, OperationalMode::Running);
    }

    #[test]
    fn test_failure_enters_degraded() {
        for mode in [OperationalMode::Starting, OperationalMode::Running] {
            assert_eq!(
                mode.transition(ModeEvent::PrimaryFailed),
                OperationalMode::DegradedEntry
            );
        }
    }

    #[test]
    fn test_degraded_variant_follows_recovery_mode() {
        let entry = OperationalMode::DegradedEntry;
        assert_eq!(
            entry.transition(ModeEvent::DegradedReady(RecoveryMode::Hold)),
            OperationalMode::DegradedHold
        );
        assert_eq!(
            entry.transition(ModeEvent::DegradedReady(RecoveryMode::TimedReset)),
            OperationalMode::DegradedCountdown
        );
    }

    #[test]
    fn test_hold_is_terminal() {
        let events = [
            ModeEvent::PrimaryInvoked,
            ModeEvent::PrimaryFailed,
            ModeEvent::DegradedReady(RecoveryMode::TimedReset),
            ModeEvent::DelayElapsed,
        ];
        for event in events {
            assert_eq!(
                OperationalMode::DegradedHold.transition(event),
                OperationalMode::DegradedHold
            );
        }
    }

    #[test]
    fn test_countdown_ends_in_reset() {
        let mode = OperationalMode::DegradedCountdown;
        assert_eq!(mode.transition(ModeEvent::PrimaryInvoked), mode);
        assert_eq!(
            mode.transition(ModeEvent::DelayElapsed),
            OperationalMode::ResetRequested
        );
    }

    #[test]
    fn test_degraded_never_returns_to_running() {
        let degraded = [
            OperationalMode::DegradedEntry,
            OperationalMode::DegradedHold,
            OperationalMode::DegradedCountdown,
        ];
        for mode in degraded {
            assert!(mode.is_degraded());
            assert_ne!(
                mode.transition(ModeEvent::PrimaryInvoked),
                OperationalMode::Running
            );
        }
    }
}
