//! Configuration loading
//!
//! Embedded defaults are layered under an optional user file. Keys missing from
//! the user file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::calendar::{CalendarConfig, MAX_WINDOW_MONTHS};
use crate::detect::DetectionConfig;
use crate::error::{Error, Result};

/// Default configuration (embedded at compile time)
const DEFAULT_CONFIG: &str = include_str!("../../../config/defaults.toml");

/// Detection and calendar settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub detection: DetectionConfig,
    pub calendar: CalendarConfig,
}

impl Default for Settings {
    fn default() -> Self {
        parse_config(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            detection: DetectionConfig::default(),
            calendar: CalendarConfig::default(),
        })
    }
}

impl Settings {
    /// Load settings from an explicit path, else the user config file, else defaults.
    ///
    /// An explicit path that does not exist is an error; a missing user file is not.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            if !path.exists() {
                return Err(Error::NotFound(format!(
                    "Config file {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => parse_config(DEFAULT_CONFIG),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        parse_config(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// User config location: `<config dir>/saldo/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("saldo").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
    calendar: Option<RawCalendar>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    min_occurrences: Option<usize>,
    expenses_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawCalendar {
    months_before: Option<u32>,
    months_after: Option<u32>,
    match_tolerance_ms: Option<i64>,
    amount_tolerance: Option<f64>,
    min_pattern_confidence: Option<f64>,
}

/// Parse TOML content on top of the built-in defaults
fn parse_config(content: &str) -> Result<Settings> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut detection = DetectionConfig::default();
    if let Some(d) = raw.detection {
        if let Some(min) = d.min_occurrences {
            detection.min_occurrences = min;
        }
        if let Some(expenses_only) = d.expenses_only {
            detection.expenses_only = expenses_only;
        }
    }

    let mut calendar = CalendarConfig::default();
    if let Some(c) = raw.calendar {
        if let Some(before) = c.months_before {
            calendar.months_before = check_window("months_before", before)?;
        }
        if let Some(after) = c.months_after {
            calendar.months_after = check_window("months_after", after)?;
        }
        if let Some(tolerance) = c.match_tolerance_ms {
            if tolerance < 0 {
                return Err(Error::Config(
                    "calendar.match_tolerance_ms must not be negative".to_string(),
                ));
            }
            calendar.match_tolerance_ms = tolerance;
        }
        if let Some(tolerance) = c.amount_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(Error::Config(format!(
                    "calendar.amount_tolerance must be a non-negative number, got {}",
                    tolerance
                )));
            }
            calendar.amount_tolerance = tolerance;
        }
        if let Some(confidence) = c.min_pattern_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(Error::Config(format!(
                    "calendar.min_pattern_confidence must be in [0, 1], got {}",
                    confidence
                )));
            }
            calendar.min_pattern_confidence = confidence;
        }
    }

    Ok(Settings {
        detection,
        calendar,
    })
}

fn check_window(key: &str, months: u32) -> Result<u32> {
    if months > MAX_WINDOW_MONTHS {
        return Err(Error::Config(format!(
            "calendar.{} must be at most {}, got {}",
            key, MAX_WINDOW_MONTHS, months
        )));
    }
    Ok(months)
}
