//! Calendar command implementations (calendar, upcoming)

use std::path::Path;

use anyhow::Result;
use saldo_core::{
    build_calendar_events, merge_sources, upcoming_events, AccountType, CalendarEvent,
    CalendarFilters, Currency, DisplayKind, RecurringDetector, RecurringSource, Settings, Snapshot,
    MAX_WINDOW_MONTHS,
};
use serde::Serialize;

use super::{load_settings, open_snapshot, parse_day, parse_month, print_json, today, truncate};

/// Calendar options from the command line
#[derive(Debug, Default)]
pub struct CalendarArgs {
    pub month: Option<String>,
    pub before: Option<u32>,
    pub after: Option<u32>,
    pub account: Option<String>,
    pub account_type: Option<String>,
    pub currency: Option<String>,
    pub no_detected: bool,
}

/// Event as printed with `--json`
#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(flatten)]
    event: &'a CalendarEvent,
    display: DisplayKind,
}

/// Declared payments plus (optionally) detected ones
pub fn recurring_sources(
    snapshot: &Snapshot,
    settings: &Settings,
    include_detected: bool,
) -> Vec<RecurringSource> {
    let detected = if include_detected {
        RecurringDetector::with_config(settings.detection.clone()).detect(&snapshot.transactions)
    } else {
        Vec::new()
    };
    merge_sources(&snapshot.recurring_payments, &detected)
}

pub fn cmd_calendar(
    data_path: &Path,
    config_path: Option<&Path>,
    args: &CalendarArgs,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;
    let mut settings = load_settings(config_path)?;

    let reference = match args.month.as_deref() {
        Some(month) => parse_month(month)?,
        None => today(),
    };
    for (flag, months) in [("--before", args.before), ("--after", args.after)] {
        if months.is_some_and(|m| m > MAX_WINDOW_MONTHS) {
            anyhow::bail!("{} must be at most {} months", flag, MAX_WINDOW_MONTHS);
        }
    }
    if let Some(before) = args.before {
        settings.calendar.months_before = before;
    }
    if let Some(after) = args.after {
        settings.calendar.months_after = after;
    }

    let filters = CalendarFilters {
        account_id: args.account.clone(),
        account_type: args
            .account_type
            .as_deref()
            .map(|t| t.parse::<AccountType>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid --type: {}", e))?,
        currency: args
            .currency
            .as_deref()
            .map(|c| c.parse::<Currency>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid --currency: {}", e))?,
    };

    if let Some(id) = &filters.account_id {
        if snapshot.account(id).is_none() {
            anyhow::bail!("Account not found: {}", id);
        }
    }

    let sources = recurring_sources(&snapshot, &settings, !args.no_detected);
    let mut events = build_calendar_events(
        Some(snapshot.accounts.as_slice()),
        Some(snapshot.transactions.as_slice()),
        &sources,
        reference,
        &settings.calendar,
        &filters,
    );
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    if json {
        return print_events_json(&events);
    }

    println!(
        "📅 Calendar around {} ({} months before, {} after)",
        reference.format("%Y-%m"),
        settings.calendar.months_before,
        settings.calendar.months_after
    );
    print_events(&events);

    Ok(())
}

pub fn cmd_upcoming(
    data_path: &Path,
    config_path: Option<&Path>,
    today_arg: Option<&str>,
    days: i64,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    if days < 0 {
        anyhow::bail!("--days must not be negative");
    }

    let snapshot = open_snapshot(data_path)?;
    let settings = load_settings(config_path)?;
    let start = match today_arg {
        Some(day) => parse_day(day)?,
        None => today(),
    };

    let sources = recurring_sources(&snapshot, &settings, true);
    let events = build_calendar_events(
        Some(snapshot.accounts.as_slice()),
        Some(snapshot.transactions.as_slice()),
        &sources,
        start,
        &settings.calendar,
        &CalendarFilters::default(),
    );

    let mut upcoming = upcoming_events(&events, start, days);
    if let Some(limit) = limit {
        upcoming.truncate(limit);
    }

    if json {
        return print_events_json(&upcoming);
    }

    println!("⏰ Next {} days from {}", days, start);
    print_events(&upcoming);

    Ok(())
}

fn print_events_json(events: &[CalendarEvent]) -> Result<()> {
    let rows: Vec<EventRow> = events
        .iter()
        .map(|event| EventRow {
            event,
            display: event.display_kind(),
        })
        .collect();
    print_json(&rows)
}

fn print_events(events: &[CalendarEvent]) {
    if events.is_empty() {
        println!();
        println!("   No events. Add cut days to your accounts or declare recurring payments.");
        return;
    }

    println!("   ─────────────────────────────────────────────────────────────────────");

    for event in events {
        let icon = match event.display_kind() {
            DisplayKind::Cut => "✂️ ",
            DisplayKind::Due => "💳",
            DisplayKind::Recurring => "🔁",
            DisplayKind::Paid => "✅",
        };

        let amount = match (event.amount, event.currency) {
            (Some(amount), Some(currency)) => currency.format_amount(amount),
            _ => String::new(),
        };

        println!(
            "   {} {} │ {:<9} │ {:32} │ {:>14}",
            icon,
            event.date,
            event.display_kind().as_str(),
            truncate(&event.title, 32),
            amount
        );
    }

    let paid = events.iter().filter(|e| e.is_paid).count();
    println!();
    println!("   {} events, {} paid", events.len(), paid);
}
