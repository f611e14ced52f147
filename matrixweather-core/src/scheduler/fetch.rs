//! Fetch scheduler
//!
//! Two independent gates: a low-frequency time sync and a
//! medium-frequency weather fetch. Failures are resolved against the
//! configured policy in one place so the primary loop only has to `?`.

use crate::config::{FetchFailurePolicy, ScheduleSettings};
use crate::error::FetchError;

use super::interval::IntervalGate;

/// The periodic actions under the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchTarget {
    TimeSync,
    Weather,
}

#[derive(Debug, Clone)]
pub struct FetchScheduler {
    time_sync: IntervalGate,
    weather: IntervalGate,
    policy: FetchFailurePolicy,
}

impl FetchScheduler {
    pub fn new(schedule: &ScheduleSettings) -> Self {
        Self {
            time_sync: IntervalGate::new(schedule.time_sync_ms, schedule.retry_ms),
            weather: IntervalGate::new(schedule.weather_ms, schedule.retry_ms),
            policy: schedule.fetch_failure_policy,
        }
    }

    pub fn policy(&self) -> FetchFailurePolicy {
        self.policy
    }

    pub fn time_sync_due(&self, now_ms: u64) -> bool {
        self.time_sync.is_due(now_ms)
    }

    pub fn weather_due(&self, now_ms: u64) -> bool {
        self.weather.is_due(now_ms)
    }

    pub fn gate(&self, target: FetchTarget) -> &IntervalGate {
        match target {
            FetchTarget::TimeSync => &self.time_sync,
            FetchTarget::Weather => &self.weather,
        }
    }

    pub fn record_success(&mut self, target: FetchTarget, now_ms: u64) {
        self.gate_mut(target).mark_success(now_ms);
    }

    /// Record a failed fetch
    ///
    /// Under `Retry` the failure is logged and absorbed; under `Escalate`
    /// it is returned for the caller to raise.
    pub fn record_failure(
        &mut self,
        target: FetchTarget,
        error: FetchError,
        now_ms: u64,
    ) -> Result<(), FetchError> {
        self.gate_mut(target).mark_failure(now_ms);
        match self.policy {
            FetchFailurePolicy::Retry => {
                warn!("{} failed: {}, retrying", target, error);
                Ok(())
            }
            FetchFailurePolicy::Escalate => Err(error),
        }
    }

    fn gate_mut(&mut self, target: FetchTarget) -> &mut IntervalGate {
        match target {
            FetchTarget::TimeSync => &mut self.time_sync,
            FetchTarget::Weather => &mut self.weather,
        }
    }
}
