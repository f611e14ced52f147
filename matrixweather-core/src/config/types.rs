//! Configuration type definitions
//!
//! Durations are held in milliseconds; the settings document states them
//! in seconds.

use heapless::String;
use matrixweather_display::{GraphicsConfig, Units};

use crate::error::ConfigError;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum passphrase length (WPA2)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum API token length
pub const MAX_TOKEN_LEN: usize = 64;

/// Maximum location query length
pub const MAX_LOCATION_LEN: usize = 64;

/// Network credentials and the weather API token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Secrets {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    pub openweather_token: String<MAX_TOKEN_LEN>,
}

/// Weather query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherSettings {
    /// City query, e.g. "Seattle, WA, US"
    pub location: String<MAX_LOCATION_LEN>,
    pub units: Units,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        let mut location = String::new();
        let _ = location.push_str("Seattle, WA, US");
        Self {
            location,
            units: Units::Imperial,
        }
    }
}

/// Display and brightness input settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplaySettings {
    /// Initial palette brightness
    pub brightness: f32,
    pub gamma: f32,
    /// Time between description scroll steps (and button samples)
    pub scroll_delay_ms: u64,
    pub brightness_step: f32,
    pub brightness_min: f32,
    pub brightness_max: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            brightness: 0.1,
            gamma: 1.0,
            scroll_delay_ms: 100,
            brightness_step: 0.01,
            brightness_min: 0.06,
            brightness_max: 1.0,
        }
    }
}

impl DisplaySettings {
    pub fn graphics_config(&self) -> GraphicsConfig {
        GraphicsConfig {
            brightness: self.brightness,
            gamma: self.gamma,
            ..GraphicsConfig::default()
        }
    }
}

/// What a failed fetch does to the primary loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchFailurePolicy {
    /// Log, keep the last success, try again after the retry interval
    #[default]
    Retry,
    /// Raise the failure to the supervisor
    Escalate,
}

/// Fetch intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleSettings {
    pub time_sync_ms: u64,
    pub weather_ms: u64,
    /// Delay before re-attempting a failed fetch
    pub retry_ms: u64,
    pub fetch_failure_policy: FetchFailurePolicy,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            time_sync_ms: 3_600_000,
            weather_ms: 600_000,
            retry_ms: 30_000,
            fetch_failure_policy: FetchFailurePolicy::Retry,
        }
    }
}

/// Degraded mode variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryMode {
    /// Blink forever; needs a power cycle
    Hold,
    /// Blink, then reset the microcontroller
    #[default]
    TimedReset,
}

impl RecoveryMode {
    /// Blink period used when none is configured
    pub const fn default_blink_period_ms(self) -> u64 {
        match self {
            RecoveryMode::Hold => 1000,
            RecoveryMode::TimedReset => 500,
        }
    }
}

/// Supervisor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorConfig {
    /// When false, primary failures are passed straight through
    pub enabled: bool,
    pub recovery_mode: RecoveryMode,
    /// Time from degraded entry to the reset request (timed-reset only)
    pub reset_delay_ms: u64,
    /// Indicator toggle interval; `None` picks the mode default
    pub blink_period_ms: Option<u64>,
    pub display_bit_depth: u8,
    pub display_brightness_floor: f32,
    /// Sleep between primary loop steps
    pub poll_interval_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recovery_mode: RecoveryMode::TimedReset,
            reset_delay_ms: 20_000,
            blink_period_ms: None,
            display_bit_depth: 1,
            display_brightness_floor: 0.0,
            poll_interval_ms: 10,
        }
    }
}

impl SupervisorConfig {
    pub fn hold() -> Self {
        Self {
            recovery_mode: RecoveryMode::Hold,
            ..Self::default()
        }
    }

    pub fn timed_reset(reset_delay_ms: u64) -> Self {
        Self {
            recovery_mode: RecoveryMode::TimedReset,
            reset_delay_ms,
            ..Self::default()
        }
    }

    /// Effective blink period, never zero
    pub fn blink_period_ms(&self) -> u64 {
        self.blink_period_ms
            .unwrap_or(self.recovery_mode.default_blink_period_ms())
            .max(1)
    }
}

/// Complete settings
///
/// Credentials are kept as a `Result` so a missing or broken document is
/// reported by the primary loop at startup rather than before the
/// supervisor is running.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub secrets: Result<Secrets, ConfigError>,
    pub weather: WeatherSettings,
    pub display: DisplaySettings,
    pub schedule: ScheduleSettings,
    pub supervisor: SupervisorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secrets: Err(ConfigError::MissingSecret("openweather_token")),
            weather: WeatherSettings::default(),
            display: DisplaySettings::default(),
            schedule: ScheduleSettings::default(),
            supervisor: SupervisorConfig::default(),
        }
    }
}
