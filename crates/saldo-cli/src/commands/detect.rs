//! Recurring payment detection command

use std::path::Path;

use anyhow::Result;
use saldo_core::RecurringDetector;

use super::{load_settings, open_snapshot, print_json, truncate};

pub fn cmd_detect(
    data_path: &Path,
    config_path: Option<&Path>,
    expenses_only: bool,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;
    let mut settings = load_settings(config_path)?;
    if expenses_only {
        settings.detection.expenses_only = true;
    }

    let detector = RecurringDetector::with_config(settings.detection);
    let patterns = detector.detect(&snapshot.transactions);

    if json {
        return print_json(&patterns);
    }

    println!("🔍 Scanning {} transactions...", snapshot.transactions.len());

    if patterns.is_empty() {
        println!();
        println!("No recurring payments found. Detection needs at least two transactions");
        println!("with the same description.");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Payments");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for pattern in &patterns {
        let icon = if pattern.confidence >= 0.8 {
            "✅"
        } else if pattern.confidence >= 0.5 {
            "🟡"
        } else {
            "❔"
        };

        println!(
            "   {} {:24} │ {:>14} │ {:<9} │ {:>3.0}% │ last {}",
            icon,
            truncate(&pattern.description, 24),
            pattern.currency.format_amount(pattern.amount),
            pattern.frequency.as_str(),
            pattern.confidence * 100.0,
            pattern.last_seen
        );
    }

    println!();
    println!(
        "   {} patterns from {} occurrences",
        patterns.len(),
        patterns.iter().map(|p| p.occurrences).sum::<usize>()
    );

    Ok(())
}
