//! Failover supervisor
//!
//! `FailoverSupervisor::step` is the whole policy as a step function: it
//! never sleeps, it tells its driver how long to wait through a
//! `Directive`. `supervise` is the production driver and
//! `FailoverSupervisor::run_bounded` a bounded one for tests and bring-up.
//!
//! Degraded entry always runs in this order:
//! 1. panel brightness to the configured floor
//! 2. framebuffer re-initialised blank at the configured bit depth
//! 3. the failure is logged, once
//! 4. indicator on, then toggled every blink period
//!
//! A failure in steps 1 or 2 is returned as `SupervisorError::Degraded`
//! and not handled further.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use matrixweather_display::MatrixBackend;
use matrixweather_hal::SystemReset;

use super::mode::{ModeEvent, OperationalMode};
use super::record::FailureRecord;
use crate::config::{RecoveryMode, SupervisorConfig};
use crate::device::DeviceContext;
use crate::error::{AppError, SupervisorError};
use crate::traits::{Clock, Indicator};

/// What the driver should do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Directive {
    /// Step again immediately
    Continue,
    /// Wait this many milliseconds, then step again
    Sleep(u64),
    /// Issue the hardware reset
    Reset,
}

/// The supervised application
///
/// One call is one iteration of the primary loop. Returning `Err` hands
/// the device over to the supervisor for good.
pub trait Primary<D, I, B, C> {
    fn step(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Result<(), AppError>;
}

impl<F, D, I, B, C> Primary<D, I, B, C> for F
where
    F: FnMut(&mut DeviceContext<D, I, B, C>) -> Result<(), AppError>,
{
    fn step(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Result<(), AppError> {
        self(device)
    }
}

#[derive(Debug, Clone)]
pub struct FailoverSupervisor {
    config: SupervisorConfig,
    mode: OperationalMode,
    failure: Option<FailureRecord>,
    failures_logged: u32,
    indicator_toggles: u32,
    degraded_at_ms: u64,
    next_toggle_ms: u64,
}

impl FailoverSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            mode: OperationalMode::Starting,
            failure: None,
            failures_logged: 0,
            indicator_toggles: 0,
            degraded_at_ms: 0,
            next_toggle_ms: 0,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn mode(&self) -> OperationalMode {
        self.mode
    }

    /// The failure that caused degraded mode, if any
    pub fn failure(&self) -> Option<FailureRecord> {
        self.failure
    }

    pub fn failures_logged(&self) -> u32 {
        self.failures_logged
    }

    /// Indicator toggles since degraded entry (the initial switch-on is
    /// not counted)
    pub fn indicator_toggles(&self) -> u32 {
        self.indicator_toggles
    }

    /// Monotonic time of degraded entry
    pub fn degraded_at_ms(&self) -> Option<u64> {
        match self.mode {
            OperationalMode::Starting | OperationalMode::Running | OperationalMode::DegradedEntry => {
                None
            }
            _ => Some(self.degraded_at_ms),
        }
    }

    /// Advance the supervisor by one step
    pub fn step<D, I, B, C, P>(
        &mut self,
        device: &mut DeviceContext<D, I, B, C>,
        primary: &mut P,
    ) -> Result<Directive, SupervisorError>
    where
        D: MatrixBackend,
        I: Indicator,
        C: Clock,
        P: Primary<D, I, B, C>,
    {
        match self.mode {
            OperationalMode::Starting | OperationalMode::Running => {
                self.run_primary(device, primary)
            }
            OperationalMode::DegradedEntry => self.enter_degraded(device),
            OperationalMode::DegradedHold | OperationalMode::DegradedCountdown => {
                Ok(self.blink(device))
            }
            OperationalMode::ResetRequested => Ok(Directive::Reset),
        }
    }

    /// Step until a reset is requested or `max_steps` have run
    ///
    /// Sleeps are served by `delay`. Returns the last directive, which is
    /// `Directive::Reset` if the run ended on a reset request.
    pub fn run_bounded<D, I, B, C, P, T>(
        &mut self,
        device: &mut DeviceContext<D, I, B, C>,
        primary: &mut P,
        delay: &mut T,
        max_steps: usize,
    ) -> Result<Directive, SupervisorError>
    where
        D: MatrixBackend,
        I: Indicator,
        C: Clock,
        P: Primary<D, I, B, C>,
        T: DelayNs,
    {
        let mut last = Directive::Continue;
        for _ in 0..max_steps {
            last = self.step(device, primary)?;
            match last {
                Directive::Continue => {}
                Directive::Sleep(ms) => sleep_ms(delay, ms),
                Directive::Reset => break,
            }
        }
        Ok(last)
    }

    fn run_primary<D, I, B, C, P>(
        &mut self,
        device: &mut DeviceContext<D, I, B, C>,
        primary: &mut P,
    ) -> Result<Directive, SupervisorError>
    where
        D: MatrixBackend,
        I: Indicator,
        C: Clock,
        P: Primary<D, I, B, C>,
    {
        if self.mode == OperationalMode::Starting {
            info!("supervisor: starting primary loop");
            self.mode = self.mode.transition(ModeEvent::PrimaryInvoked);
        }

        match primary.step(device) {
            Ok(()) => Ok(self.idle_directive()),
            Err(e) if !self.config.enabled => Err(SupervisorError::Unsupervised(e)),
            Err(e) => {
                self.failure = Some(FailureRecord::new(e, device.clock.now_ms()));
                self.mode = self.mode.transition(ModeEvent::PrimaryFailed);
                self.enter_degraded(device)
            }
        }
    }

    fn enter_degraded<D, I, B, C>(
        &mut self,
        device: &mut DeviceContext<D, I, B, C>,
    ) -> Result<Directive, SupervisorError>
    where
        D: MatrixBackend,
        I: Indicator,
        C: Clock,
    {
        device
            .display
            .set_brightness(self.config.display_brightness_floor)
            .map_err(SupervisorError::Degraded)?;
        device
            .display
            .blank(self.config.display_bit_depth)
            .map_err(SupervisorError::Degraded)?;

        if let Some(record) = &self.failure {
            error!(
                "primary loop failed at {} ms: {} ({})",
                record.at_ms,
                record.kind,
                record.message
            );
            self.failures_logged += 1;
        }

        let now = device.clock.now_ms();
        device.indicator.set_on(true);
        self.degraded_at_ms = now;
        self.next_toggle_ms = now.saturating_add(self.config.blink_period_ms());
        self.mode = self
            .mode
            .transition(ModeEvent::DegradedReady(self.config.recovery_mode));

        match self.config.recovery_mode {
            RecoveryMode::Hold => warn!("holding in degraded mode, power cycle to recover"),
            RecoveryMode::TimedReset => {
                warn!("hard reset in {} ms", self.config.reset_delay_ms)
            }
        }

        Ok(self.degraded_sleep(now))
    }

    fn blink<D, I, B, C>(&mut self, device: &mut DeviceContext<D, I, B, C>) -> Directive
    where
        I: Indicator,
        C: Clock,
    {
        let now = device.clock.now_ms();

        if self.mode == OperationalMode::DegradedCountdown
            && now.saturating_sub(self.degraded_at_ms) >= self.config.reset_delay_ms
        {
            self.mode = self.mode.transition(ModeEvent::DelayElapsed);
            warn!("reset delay elapsed, resetting");
            return Directive::Reset;
        }

        if now >= self.next_toggle_ms {
            device.indicator.toggle();
            self.indicator_toggles += 1;

            // Skip any periods missed by a late wake-up
            let period = self.config.blink_period_ms();
            let missed = (now - self.next_toggle_ms) / period;
            self.next_toggle_ms += (missed + 1) * period;
        }

        self.degraded_sleep(now)
    }

    fn degraded_sleep(&self, now: u64) -> Directive {
        let mut wake = self.next_toggle_ms;
        if self.mode == OperationalMode::DegradedCountdown {
            wake = wake.min(self.degraded_at_ms.saturating_add(self.config.reset_delay_ms));
        }
        Directive::Sleep(wake.saturating_sub(now))
    }

    fn idle_directive(&self) -> Directive {
        match self.config.poll_interval_ms {
            0 => Directive::Continue,
            ms => Directive::Sleep(ms),
        }
    }
}

/// Run the primary loop under supervision, forever
///
/// Only returns on a failure the supervisor does not handle: a primary
/// failure while supervision is disabled, or a failure of the degraded
/// display setup. In timed-reset mode the reset primitive ends the run.
pub fn supervise<D, I, B, C, P, T, R>(
    device: &mut DeviceContext<D, I, B, C>,
    primary: &mut P,
    delay: &mut T,
    reset: &mut R,
    config: SupervisorConfig,
) -> Result<Infallible, SupervisorError>
where
    D: MatrixBackend,
    I: Indicator,
    C: Clock,
    P: Primary<D, I, B, C>,
    T: DelayNs,
    R: SystemReset,
{
    let mut supervisor = FailoverSupervisor::new(config);
    loop {
        match supervisor.step(device, primary)? {
            Directive::Continue => {}
            Directive::Sleep(ms) => sleep_ms(delay, ms),
            Directive::Reset => reset.reset(),
        }
    }
}

fn sleep_ms<T: DelayNs>(delay: &mut T, ms: u64) {
    delay.delay_ms(u32::try_from(ms).unwrap_or(u32::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::testing::{Event, Rig, TestDevice};
    use matrixweather_display::DisplayError;
    use proptest::prelude::*;

    const FAILURE: AppError = AppError::Fetch(FetchError::Network);

    fn failing(_: &mut TestDevice<'_>) -> Result<(), AppError> {
        Err(FAILURE)
    }

    fn is_indicator(event: &Event) -> bool {
        matches!(event, Event::Indicator { .. })
    }

    struct NoReset;

    impl SystemReset for NoReset {
        fn reset(&mut self) -> ! {
            panic!("hardware reset");
        }
    }

    #[test]
    fn test_success_keeps_running() {
        let rig = Rig::new();
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::default());
        let mut ok = |_: &mut TestDevice<'_>| -> Result<(), AppError> { Ok(()) };

        let directive = supervisor.step(&mut device, &mut ok).unwrap();
        assert_eq!(directive, Directive::Sleep(10));
        assert_eq!(supervisor.mode(), OperationalMode::Running);
        assert_eq!(supervisor.failure(), None);
    }

    #[test]
    fn test_zero_poll_interval_continues() {
        let rig = Rig::new();
        let mut device = rig.device();
        let config = SupervisorConfig {
            poll_interval_ms: 0,
            ..SupervisorConfig::default()
        };
        let mut supervisor = FailoverSupervisor::new(config);
        let mut ok = |_: &mut TestDevice<'_>| -> Result<(), AppError> { Ok(()) };

        assert_eq!(
            supervisor.step(&mut device, &mut ok).unwrap(),
            Directive::Continue
        );
    }

    #[test]
    fn test_brightness_floor_before_indicator() {
        for config in [SupervisorConfig::hold(), SupervisorConfig::timed_reset(5_000)] {
            let rig = Rig::new();
            let mut device = rig.device();
            let mut supervisor = FailoverSupervisor::new(config);

            supervisor
                .run_bounded(&mut device, &mut failing, &mut rig.delay(), 8)
                .unwrap();

            let dimmed = rig
                .position(|e| *e == Event::Brightness(0.0))
                .expect("brightness never forced to floor");
            let blanked = rig.position(|e| *e == Event::Blank(1)).unwrap();
            let first_indicator = rig.position(is_indicator).unwrap();

            assert!(dimmed < blanked);
            assert!(blanked < first_indicator);
        }
    }

    #[test]
    fn test_blank_keeps_configured_floor() {
        let rig = Rig::new();
        let mut device = rig.device();
        let config = SupervisorConfig {
            display_brightness_floor: 0.25,
            ..SupervisorConfig::hold()
        };
        let mut supervisor = FailoverSupervisor::new(config);

        supervisor.step(&mut device, &mut failing).unwrap();

        let dimmed = rig.position(|e| *e == Event::Brightness(0.25)).unwrap();
        let blanked = rig.position(|e| *e == Event::Blank(1)).unwrap();
        assert!(dimmed < blanked);
        assert_eq!(device.display.brightness(), 0.25);
    }

    #[test]
    fn test_fails_after_three_iterations() {
        let rig = Rig::new();
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::hold());

        let mut iterations = 0;
        let mut primary = |device: &mut TestDevice<'_>| -> Result<(), AppError> {
            iterations += 1;
            if iterations == 1 {
                device.display.set_brightness(0.8)?;
            }
            if iterations > 3 {
                return Err(FAILURE);
            }
            Ok(())
        };

        // Three good iterations, the failing one, then blinking
        supervisor
            .run_bounded(&mut device, &mut primary, &mut rig.delay(), 10)
            .unwrap();

        assert_eq!(supervisor.failures_logged(), 1);
        assert_eq!(device.display.brightness(), 0.0);

        let record = supervisor.failure().unwrap();
        assert_eq!(record.cause, FAILURE);
        assert_eq!(record.at_ms, 30);

        let events = rig.events();
        let before = events
            .iter()
            .position(|e| *e == Event::Brightness(0.8))
            .unwrap();
        let after = events
            .iter()
            .position(|e| *e == Event::Brightness(0.0))
            .unwrap();
        assert!(before < after);

        // First toggle lands within one blink period of the switch-on
        let mut indicator = events.iter().filter_map(|e| match e {
            Event::Indicator { on, at_ms } => Some((*on, *at_ms)),
            _ => None,
        });
        let (on, entered) = indicator.next().unwrap();
        assert!(on);
        let (on, toggled) = indicator.next().unwrap();
        assert!(!on);
        assert!(toggled - entered <= 1000);
    }

    #[test]
    fn test_hold_blinks_forever() {
        let rig = Rig::new();
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::hold());

        let last = supervisor
            .run_bounded(&mut device, &mut failing, &mut rig.delay(), 5_000)
            .unwrap();

        assert_eq!(last, Directive::Sleep(1000));
        assert_eq!(supervisor.mode(), OperationalMode::DegradedHold);
        assert_eq!(supervisor.indicator_toggles(), 4_999);
        assert_eq!(rig.now_ms(), 5_000 * 1000);
    }

    #[test]
    fn test_timed_reset_after_delay() {
        let rig = Rig::new();
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::timed_reset(20_000));

        let last = supervisor
            .run_bounded(&mut device, &mut failing, &mut rig.delay(), 1_000)
            .unwrap();

        assert_eq!(last, Directive::Reset);
        assert_eq!(supervisor.mode(), OperationalMode::ResetRequested);
        assert_eq!(rig.now_ms(), 20_000);
        // 0.5 s blink: toggles at 0.5, 1.0, ... 19.5 s
        assert_eq!(supervisor.indicator_toggles(), 39);

        // Stays requested
        assert_eq!(
            supervisor.step(&mut device, &mut failing).unwrap(),
            Directive::Reset
        );
    }

    #[test]
    fn test_late_wakeup_does_not_double_toggle() {
        let rig = Rig::new();
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::hold());

        supervisor.step(&mut device, &mut failing).unwrap();
        rig.advance_ms(3_500);
        let directive = supervisor.step(&mut device, &mut failing).unwrap();

        assert_eq!(supervisor.indicator_toggles(), 1);
        assert_eq!(directive, Directive::Sleep(500));
    }

    #[test]
    fn test_disabled_passes_failure_through() {
        let rig = Rig::new();
        let mut device = rig.device();
        let config = SupervisorConfig {
            enabled: false,
            ..SupervisorConfig::default()
        };
        let mut supervisor = FailoverSupervisor::new(config);

        assert_eq!(
            supervisor.step(&mut device, &mut failing),
            Err(SupervisorError::Unsupervised(FAILURE))
        );
        assert!(rig.events().is_empty());
    }

    #[test]
    fn test_degraded_display_failure_propagates() {
        let rig = Rig::new();
        rig.fail_blank.set(true);
        let mut device = rig.device();
        let mut supervisor = FailoverSupervisor::new(SupervisorConfig::default());

        assert_eq!(
            supervisor.step(&mut device, &mut failing),
            Err(SupervisorError::Degraded(DisplayError::Communication))
        );
        assert!(rig.position(is_indicator).is_none());
    }

    #[test]
    fn test_supervise_returns_unsupervised_failure() {
        let rig = Rig::new();
        let mut device = rig.device();
        let config = SupervisorConfig {
            enabled: false,
            ..SupervisorConfig::default()
        };

        let result = supervise(
            &mut device,
            &mut failing,
            &mut rig.delay(),
            &mut NoReset,
            config,
        );
        assert_eq!(result.err(), Some(SupervisorError::Unsupervised(FAILURE)));
    }

    #[test]
    #[should_panic(expected = "hardware reset")]
    fn test_supervise_resets_after_delay() {
        let rig = Rig::new();
        let mut device = rig.device();
        let _ = supervise(
            &mut device,
            &mut failing,
            &mut rig.delay(),
            &mut NoReset,
            SupervisorConfig::timed_reset(1_000),
        );
    }

    proptest! {
        #[test]
        fn prop_reset_within_one_period_of_delay(
            delay_ms in 0u64..60_000,
            period_ms in 10u64..2_000,
            late_start in 0u64..10_000,
        ) {
            let rig = Rig::new();
            rig.advance_ms(late_start);
            let mut device = rig.device();
            let config = SupervisorConfig {
                blink_period_ms: Some(period_ms),
                ..SupervisorConfig::timed_reset(delay_ms)
            };
            let mut supervisor = FailoverSupervisor::new(config);

            let last = supervisor
                .run_bounded(&mut device, &mut failing, &mut rig.delay(), 200_000)
                .unwrap();

            prop_assert_eq!(last, Directive::Reset);
            let elapsed = rig.now_ms() - late_start;
            prop_assert!(elapsed >= delay_ms);
            prop_assert!(elapsed <= delay_ms + period_ms);
        }

        #[test]
        fn prop_hold_never_leaves_degraded(
            period_ms in 1u64..5_000,
            steps in 2usize..400,
        ) {
            let rig = Rig::new();
            let mut device = rig.device();
            let config = SupervisorConfig {
                blink_period_ms: Some(period_ms),
                ..SupervisorConfig::hold()
            };
            let mut supervisor = FailoverSupervisor::new(config);

            let last = supervisor
                .run_bounded(&mut device, &mut failing, &mut rig.delay(), steps)
                .unwrap();

            prop_assert_eq!(last, Directive::Sleep(period_ms));
            prop_assert_eq!(supervisor.mode(), OperationalMode::DegradedHold);
            // One sleep per step, the first one before any toggle
            prop_assert_eq!(supervisor.indicator_toggles() as u64 + 1, rig.now_ms() / period_ms);
        }
    }
}
