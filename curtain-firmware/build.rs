//! Build script for curtain-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates curtain.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys each section may carry, with their expected kind
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "motor",
        &[
            ("total_steps", Kind::Unsigned),
            ("open_clockwise", Kind::Bool),
            ("homing_travel_steps", Kind::Unsigned),
        ],
    ),
    (
        "settings",
        &[("write_delay_ms", Kind::Unsigned), ("default_away", Kind::Unsigned)],
    ),
    ("buttons", &[("debounce_ms", Kind::Unsigned)]),
    (
        "light",
        &[
            ("dark_threshold", Kind::Unsigned),
            ("dusk_gap", Kind::Unsigned),
            ("noise_gap", Kind::Unsigned),
            ("phase_delay_ms", Kind::Unsigned),
        ],
    ),
    (
        "temperature",
        &[("hot_threshold_c", Kind::Signed), ("pullup_ohms", Kind::Unsigned)],
    ),
];

#[derive(Clone, Copy)]
enum Kind {
    Unsigned,
    Signed,
    Bool,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate curtain.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=curtain.toml");

    let config_path = Path::new("curtain.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: curtain.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a curtain.toml configuration file in     ║\n\
            ║  the curtain-firmware directory.                                 ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read curtain.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in curtain.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_schema(&config, &mut errors);
    validate_values(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: curtain.toml validation failed                           ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&errors.join("\n"))
        );
    }

    println!("cargo:warning=curtain.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check sections exist and every known key has the right type
///
/// Unknown keys are reported as warnings only; the firmware ignores them.
fn validate_schema(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for name in root.keys() {
        if !SCHEMA.iter().any(|(section, _)| *section == name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        }
    }

    for (section, keys) in SCHEMA {
        let Some(table) = root.get(*section).and_then(|v| v.as_table()) else {
            continue;
        };

        for (key, value) in table {
            let Some((_, kind)) = keys.iter().find(|(k, _)| *k == key.as_str()) else {
                println!("cargo:warning=curtain.toml: [{}] {} is not used", section, key);
                continue;
            };

            let ok = match kind {
                Kind::Unsigned => value.as_integer().is_some_and(|v| v >= 0),
                Kind::Signed => value.as_integer().is_some(),
                Kind::Bool => value.as_bool().is_some(),
            };
            if !ok {
                errors.push(format!("[{}] {} has the wrong type or sign", section, key));
            }
        }
    }
}

/// Cross-field checks matching what the firmware accepts
fn validate_values(config: &toml::Value, errors: &mut Vec<String>) {
    let int = |section: &str, key: &str| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_integer())
    };

    if let Some(steps) = int("motor", "total_steps") {
        if steps < 4 {
            errors.push(format!("[motor] total_steps must be at least 4, got {}", steps));
        }
    }

    if let Some(travel) = int("motor", "homing_travel_steps") {
        if travel <= 0 || travel > i32::MAX as i64 {
            errors.push(format!("[motor] homing_travel_steps out of range: {}", travel));
        }
    }

    if let Some(away) = int("settings", "default_away") {
        if away > i32::MAX as i64 {
            errors.push(format!("[settings] default_away out of range: {}", away));
        }
    }

    for key in ["dark_threshold", "dusk_gap", "noise_gap"] {
        if let Some(value) = int("light", key) {
            if value > u16::MAX as i64 {
                errors.push(format!("[light] {} must fit 16 bits, got {}", key, value));
            }
        }
    }

    if let Some(hot) = int("temperature", "hot_threshold_c") {
        if !(-40..=85).contains(&hot) {
            errors.push(format!("[temperature] hot_threshold_c out of range: {}", hot));
        }
    }
}
