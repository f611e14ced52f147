//! Build script for matrixweather-firmware
//!
//! - Sets up linker search paths and link scripts for memory.x
//! - Validates weather.toml and stages it in OUT_DIR for embedding

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "weather.toml";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    setup_linker(&out_dir);
    stage_settings(&out_dir);
}

/// Copy memory.x next to the build output and pass the link scripts
fn setup_linker(out_dir: &Path) {
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).expect("write memory.x");
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate weather.toml and copy it to OUT_DIR
///
/// A missing file is not a build error: an empty document is embedded and
/// the device comes up in its failure display until credentials are added.
fn stage_settings(out_dir: &Path) {
    println!("cargo:rerun-if-changed={}", SETTINGS_FILE);

    let path = Path::new(SETTINGS_FILE);
    let content = if path.exists() {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(&format!("Failed to read {}", SETTINGS_FILE), &[e.to_string()]),
        };
        validate(&content);
        println!("cargo:warning={} validated successfully", SETTINGS_FILE);
        content
    } else {
        println!(
            "cargo:warning={} not found, embedding an empty document (see weather.toml.example)",
            SETTINGS_FILE
        );
        String::new()
    };

    fs::write(out_dir.join(SETTINGS_FILE), content).expect("write staged settings");
}

fn validate(content: &str) {
    let doc: toml::Value = match toml::from_str(content) {
        Ok(value) => value,
        Err(e) => fail(
            &format!("Invalid TOML syntax in {}", SETTINGS_FILE),
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    if let Some(table) = doc.as_table() {
        for name in table.keys() {
            if !["secrets", "weather", "display", "schedule", "supervisor"].contains(&name.as_str()) {
                errors.push(format!("unknown section [{}]", name));
            }
        }
    }

    validate_secrets(&doc, &mut errors);
    validate_weather(&doc, &mut errors);
    validate_display(&doc, &mut errors);
    validate_schedule(&doc, &mut errors);
    validate_supervisor(&doc, &mut errors);

    if !errors.is_empty() {
        fail(&format!("Invalid configuration in {}", SETTINGS_FILE), &errors);
    }
}

fn validate_secrets(doc: &toml::Value, errors: &mut Vec<String>) {
    match doc.get("secrets") {
        None => println!("cargo:warning=[secrets] missing, the display will not fetch weather"),
        Some(secrets) => {
            for key in ["ssid", "password", "openweather_token"] {
                match secrets.get(key) {
                    Some(toml::Value::String(s)) if !s.is_empty() => {}
                    Some(toml::Value::String(_)) | None => {
                        println!("cargo:warning=[secrets] {} is empty or missing", key)
                    }
                    Some(_) => errors.push(format!("[secrets] {} must be a string", key)),
                }
            }
        }
    }
}

fn validate_weather(doc: &toml::Value, errors: &mut Vec<String>) {
    let Some(weather) = doc.get("weather") else {
        return;
    };
    check_choice(weather, "weather", "units", &["imperial", "metric"], errors);
}

fn validate_display(doc: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = doc.get("display") else {
        return;
    };
    for key in ["brightness", "brightness_step", "brightness_min", "brightness_max"] {
        check_range(display, "display", key, 0.0, 1.0, errors);
    }
    check_range(display, "display", "gamma", f64::MIN_POSITIVE, f64::MAX, errors);
    check_range(display, "display", "scroll_delay_seconds", 0.0, f64::MAX, errors);

    let min = number(display, "brightness_min").unwrap_or(0.06);
    let max = number(display, "brightness_max").unwrap_or(1.0);
    let brightness = number(display, "brightness").unwrap_or(0.1);
    if min > max {
        errors.push("[display] brightness_min must not exceed brightness_max".to_string());
    } else if brightness < min || brightness > max {
        errors.push("[display] brightness must lie within brightness_min-brightness_max".to_string());
    }
}

fn validate_schedule(doc: &toml::Value, errors: &mut Vec<String>) {
    let Some(schedule) = doc.get("schedule") else {
        return;
    };
    for key in ["time_sync_seconds", "weather_seconds", "retry_seconds"] {
        check_range(schedule, "schedule", key, 0.0, f64::MAX, errors);
    }
    check_choice(
        schedule,
        "schedule",
        "fetch_failure_policy",
        &["retry", "escalate"],
        errors,
    );
}

fn validate_supervisor(doc: &toml::Value, errors: &mut Vec<String>) {
    let Some(supervisor) = doc.get("supervisor") else {
        return;
    };
    if let Some(value) = supervisor.get("enabled") {
        if !value.is_bool() {
            errors.push("[supervisor] enabled must be true or false".to_string());
        }
    }
    check_choice(
        supervisor,
        "supervisor",
        "recovery_mode",
        &["hold", "timed-reset"],
        errors,
    );
    check_range(supervisor, "supervisor", "reset_delay_seconds", 0.0, f64::MAX, errors);
    check_range(supervisor, "supervisor", "blink_period_seconds", 0.001, f64::MAX, errors);
    check_range(supervisor, "supervisor", "display_bit_depth", 1.0, 6.0, errors);
    check_range(supervisor, "supervisor", "display_brightness_floor", 0.0, 1.0, errors);
    check_range(supervisor, "supervisor", "poll_interval_ms", 0.0, f64::MAX, errors);
}

fn number(table: &toml::Value, key: &str) -> Option<f64> {
    match table.get(key)? {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn check_range(
    table: &toml::Value,
    section: &str,
    key: &str,
    min: f64,
    max: f64,
    errors: &mut Vec<String>,
) {
    if table.get(key).is_none() {
        return;
    }
    match number(table, key) {
        Some(v) if v >= min && v <= max => {}
        Some(_) if max == f64::MAX => errors.push(format!("[{}] {} must be at least {}", section, key, min)),
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
        None => errors.push(format!("[{}] {} must be a number", section, key)),
    }
}

fn check_choice(
    table: &toml::Value,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::String(s)) if choices.contains(&s.as_str()) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be one of: {}",
            section,
            key,
            choices.join(", ")
        )),
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let line = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
