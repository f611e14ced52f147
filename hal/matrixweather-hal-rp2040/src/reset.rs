//! Reset through the Cortex-M System Control Block

use matrixweather_hal::SystemReset;

/// Requests a system reset via `SCB::sys_reset`
///
/// On the RP2040 this restarts both cores from the boot ROM, which re-runs
/// the firmware from `main` with fresh peripheral state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScbReset;

impl SystemReset for ScbReset {
    fn reset(&mut self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}
