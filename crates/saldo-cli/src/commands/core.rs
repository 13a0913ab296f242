//! Shared command utilities
//!
//! This module contains:
//! - `open_snapshot` - Load the snapshot file
//! - `load_settings` - Load layered configuration
//! - `parse_month` / `parse_day` - Argument parsing
//! - `print_json` - JSON output

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use saldo_core::{Settings, Snapshot};
use serde::Serialize;

/// Load the snapshot at `data_path`
pub fn open_snapshot(data_path: &Path) -> Result<Snapshot> {
    Snapshot::load(data_path)
        .with_context(|| format!("Failed to load snapshot {}", data_path.display()))
}

/// Load settings from `--config`, the user config file, or built-in defaults
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    Settings::load(config_path).context("Failed to load configuration")
}

/// First day of a `YYYY-MM` month
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", month))
}

pub fn parse_day(day: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", day))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
