//! Settings document parser
//!
//! A minimal TOML subset parser for the weather display settings. It does
//! NOT support all of TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] headers
//! - Comments (# ...), including trailing comments after a value
//!
//! Unknown keys inside a known section are ignored. Unknown sections are
//! rejected.

use heapless::String;
use matrixweather_display::Units;

use super::types::{
    FetchFailurePolicy, RecoveryMode, Secrets, Settings, MAX_PASSWORD_LEN, MAX_SSID_LEN,
    MAX_TOKEN_LEN,
};
use crate::error::ConfigError;

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Secrets,
    Weather,
    Display,
    Schedule,
    Supervisor,
}

/// Secrets as read so far; validated once the document ends
#[derive(Default)]
struct PartialSecrets {
    seen: bool,
    ssid: Option<String<MAX_SSID_LEN>>,
    password: Option<String<MAX_PASSWORD_LEN>>,
    token: Option<String<MAX_TOKEN_LEN>>,
}

impl PartialSecrets {
    fn finish(self) -> Result<Secrets, ConfigError> {
        if !self.seen {
            return Err(ConfigError::MissingSecret("ssid"));
        }
        let ssid = self
            .ssid
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret("ssid"))?;
        let openweather_token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingSecret("openweather_token"))?;

        Ok(Secrets {
            ssid,
            password: self.password.unwrap_or_default(),
            openweather_token,
        })
    }
}

/// Parse a settings document
///
/// Never fails: a broken document yields default settings with the parse
/// error stored in `secrets`, so the primary loop reports it on startup.
pub fn parse_settings(input: &str) -> Settings {
    match parse_document(input) {
        Ok(settings) => settings,
        Err(e) => Settings {
            secrets: Err(e),
            ..Settings::default()
        },
    }
}

/// Parse a settings document, failing on the first syntax or value error
///
/// Missing secrets are not a syntax error; they are reported through the
/// returned `Settings::secrets`.
pub fn parse_document(input: &str) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();
    let mut secrets = PartialSecrets::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ConfigError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            if section == Section::Secrets {
                secrets.seen = true;
            }
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidLine)?;
        apply_value(section, key, value, &mut settings, &mut secrets)?;
    }

    check_brightness_limits(&settings)?;
    settings.secrets = secrets.finish();
    Ok(settings)
}

/// Limits are checked once the whole document is read, so key order does not matter
fn check_brightness_limits(settings: &Settings) -> Result<(), ConfigError> {
    let display = &settings.display;
    if display.brightness_min > display.brightness_max
        || display.brightness < display.brightness_min
        || display.brightness > display.brightness_max
    {
        return Err(ConfigError::InvalidValue);
    }
    Ok(())
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "secrets" => Ok(Section::Secrets),
        "weather" => Ok(Section::Weather),
        "display" => Ok(Section::Display),
        "schedule" => Ok(Section::Schedule),
        "supervisor" => Ok(Section::Supervisor),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    settings: &mut Settings,
    secrets: &mut PartialSecrets,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => {}
        Section::Secrets => match key {
            "ssid" => secrets.ssid = Some(parse_text(value)?),
            "password" => secrets.password = Some(parse_text(value)?),
            "openweather_token" => secrets.token = Some(parse_text(value)?),
            _ => {}
        },
        Section::Weather => match key {
            "location" => settings.weather.location = parse_text(value)?,
            "units" => settings.weather.units = parse_units(parse_string(value))?,
            _ => {}
        },
        Section::Display => {
            let display = &mut settings.display;
            match key {
                "brightness" => display.brightness = parse_fraction(value)?,
                "gamma" => display.gamma = parse_positive(value)?,
                "scroll_delay_seconds" => display.scroll_delay_ms = parse_seconds(value)?,
                "brightness_step" => display.brightness_step = parse_fraction(value)?,
                "brightness_min" => display.brightness_min = parse_fraction(value)?,
                "brightness_max" => display.brightness_max = parse_fraction(value)?,
                _ => {}
            }
        }
        Section::Schedule => {
            let schedule = &mut settings.schedule;
            match key {
                "time_sync_seconds" => schedule.time_sync_ms = parse_seconds(value)?,
                "weather_seconds" => schedule.weather_ms = parse_seconds(value)?,
                "retry_seconds" => schedule.retry_ms = parse_seconds(value)?,
                "fetch_failure_policy" => {
                    schedule.fetch_failure_policy = parse_policy(parse_string(value))?
                }
                _ => {}
            }
        }
        Section::Supervisor => {
            let supervisor = &mut settings.supervisor;
            match key {
                "enabled" => supervisor.enabled = parse_bool(value)?,
                "recovery_mode" => {
                    supervisor.recovery_mode = parse_recovery_mode(parse_string(value))?
                }
                "reset_delay_seconds" => supervisor.reset_delay_ms = parse_seconds(value)?,
                "blink_period_seconds" => {
                    supervisor.blink_period_ms = Some(parse_seconds(value)?)
                }
                "display_bit_depth" => {
                    supervisor.display_bit_depth = match parse_int::<u8>(value)? {
                        depth @ 1..=6 => depth,
                        _ => return Err(ConfigError::InvalidValue),
                    }
                }
                "display_brightness_floor" => {
                    supervisor.display_brightness_floor = parse_fraction(value)?
                }
                "poll_interval_ms" => supervisor.poll_interval_ms = parse_int(value)?,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Split `key = value`, dropping a trailing comment outside quotes
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim(),
            _ => {}
        }
    }
    text
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

fn parse_text<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut text = String::new();
    text.push_str(parse_string(value))
        .map_err(|_| ConfigError::TooLong)?;
    Ok(text)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ConfigError> {
    let v: f32 = value.parse().map_err(|_| ConfigError::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConfigError::InvalidValue)
    }
}

/// A float in `0.0..=1.0`
fn parse_fraction(value: &str) -> Result<f32, ConfigError> {
    match parse_float(value)? {
        v if (0.0..=1.0).contains(&v) => Ok(v),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_positive(value: &str) -> Result<f32, ConfigError> {
    match parse_float(value)? {
        v if v > 0.0 => Ok(v),
        _ => Err(ConfigError::InvalidValue),
    }
}

/// Non-negative seconds (integer or float) as milliseconds
fn parse_seconds(value: &str) -> Result<u64, ConfigError> {
    let seconds = parse_float(value)?;
    if seconds < 0.0 {
        return Err(ConfigError::InvalidValue);
    }
    Ok((seconds * 1000.0 + 0.5) as u64)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_units(value: &str) -> Result<Units, ConfigError> {
    match value {
        "imperial" => Ok(Units::Imperial),
        "metric" => Ok(Units::Metric),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_policy(value: &str) -> Result<FetchFailurePolicy, ConfigError> {
    match value {
        "retry" => Ok(FetchFailurePolicy::Retry),
        "escalate" => Ok(FetchFailurePolicy::Escalate),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_recovery_mode(value: &str) -> Result<RecoveryMode, ConfigError> {
    match value {
        "hold" => Ok(RecoveryMode::Hold),
        "timed-reset" => Ok(RecoveryMode::TimedReset),
        _ => Err(ConfigError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
# Weather display settings
[secrets]
ssid = "attic"
password = "hunter22"
openweather_token = "0123abcd"   # from the account page

[weather]
location = "Portland, OR, US"
units = "metric"

[display]
brightness = 0.25
scroll_delay_seconds = 0.05

[schedule]
weather_seconds = 300
fetch_failure_policy = "escalate"

[supervisor]
recovery_mode = "hold"
blink_period_seconds = 2
display_bit_depth = 2
"#;

    #[test]
    fn test_full_document() {
        let settings = parse_document(FULL).unwrap();

        let secrets = settings.secrets.unwrap();
        assert_eq!(secrets.ssid.as_str(), "attic");
        assert_eq!(secrets.password.as_str(), "hunter22");
        assert_eq!(secrets.openweather_token.as_str(), "0123abcd");

        assert_eq!(settings.weather.location.as_str(), "Portland, OR, US");
        assert_eq!(settings.weather.units, Units::Metric);

        assert_eq!(settings.display.brightness, 0.25);
        assert_eq!(settings.display.scroll_delay_ms, 50);
        assert_eq!(settings.display.brightness_min, 0.06);

        assert_eq!(settings.schedule.weather_ms, 300_000);
        assert_eq!(settings.schedule.time_sync_ms, 3_600_000);
        assert_eq!(
            settings.schedule.fetch_failure_policy,
            FetchFailurePolicy::Escalate
        );

        assert_eq!(settings.supervisor.recovery_mode, RecoveryMode::Hold);
        assert_eq!(settings.supervisor.blink_period_ms, Some(2000));
        assert_eq!(settings.supervisor.display_bit_depth, 2);
        assert!(settings.supervisor.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults_without_secrets() {
        let settings = parse_document("").unwrap();
        assert_eq!(settings.secrets, Err(ConfigError::MissingSecret("ssid")));
        assert_eq!(settings.supervisor.reset_delay_ms, 20_000);
        assert_eq!(settings.schedule.retry_ms, 30_000);
    }

    #[test]
    fn test_missing_token_is_reported() {
        let settings = parse_document("[secrets]\nssid = \"attic\"\n").unwrap();
        assert_eq!(
            settings.secrets,
            Err(ConfigError::MissingSecret("openweather_token"))
        );

        let settings =
            parse_document("[secrets]\nssid = \"attic\"\nopenweather_token = \"\"\n").unwrap();
        assert_eq!(
            settings.secrets,
            Err(ConfigError::MissingSecret("openweather_token"))
        );
    }

    #[test]
    fn test_broken_document_surfaces_through_secrets() {
        let settings = parse_settings("[secrets]\nssid = \"attic\"\nthis is not toml\n");
        assert_eq!(settings.secrets, Err(ConfigError::InvalidLine));
        assert_eq!(settings.display.brightness, 0.1);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_document("[wifi]\nssid = \"x\"\n").err(),
            Some(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert_eq!(
            parse_document("[display]\nbrightness = 1.5\n").err(),
            Some(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_document("[supervisor]\nreset_delay_seconds = -1\n").err(),
            Some(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_document("[supervisor]\nrecovery_mode = \"reboot\"\n").err(),
            Some(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_document("[supervisor]\ndisplay_bit_depth = 0\n").err(),
            Some(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_brightness_limits_accepted_in_either_order() {
        for doc in [
            "[display]\nbrightness = 0.03\nbrightness_min = 0.01\nbrightness_max = 0.05\n",
            "[display]\nbrightness_max = 0.05\nbrightness_min = 0.01\nbrightness = 0.03\n",
        ] {
            let settings = parse_document(doc).unwrap();
            assert_eq!(settings.display.brightness_min, 0.01);
            assert_eq!(settings.display.brightness_max, 0.05);
        }
    }

    #[test]
    fn test_inverted_brightness_limits_rejected_in_either_order() {
        for doc in [
            "[display]\nbrightness_min = 0.5\nbrightness_max = 0.2\n",
            "[display]\nbrightness_max = 0.2\nbrightness_min = 0.5\n",
        ] {
            assert_eq!(parse_document(doc).err(), Some(ConfigError::InvalidValue));
        }
    }

    #[test]
    fn test_brightness_outside_limits_rejected() {
        // Default brightness 0.1 sits above this ceiling
        assert_eq!(
            parse_document("[display]\nbrightness_max = 0.05\n").err(),
            Some(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_document("[display]\nbrightness = 0.02\nbrightness_min = 0.04\n").err(),
            Some(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_hash_inside_string_is_kept() {
        let settings =
            parse_document("[secrets]\nssid = \"lab#2\" # guest\nopenweather_token = \"t\"\n")
                .unwrap();
        assert_eq!(settings.secrets.unwrap().ssid.as_str(), "lab#2");
    }

    #[test]
    fn test_overlong_value_rejected() {
        let mut doc: String<256> = String::new();
        doc.push_str("[secrets]\nssid = \"").unwrap();
        for _ in 0..40 {
            doc.push('x').unwrap();
        }
        doc.push_str("\"\n").unwrap();
        assert_eq!(parse_document(&doc).err(), Some(ConfigError::TooLong));
    }
}
