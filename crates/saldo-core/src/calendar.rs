//! Financial calendar
//!
//! Projects account statement cuts, payment due dates and recurring payments onto
//! a window of months around a reference date, then reconciles each due or
//! recurring event against actual transactions to decide whether it was paid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::models::{
    Account, AccountType, CalendarEvent, CalendarEventKind, Currency, Transaction,
    TransactionType,
};
use crate::recurring::{RecurringItem, RecurringSource, DEFAULT_MIN_PATTERN_CONFIDENCE};

/// One day, the default window for matching a payment to an event
pub const DAY_MS: i64 = 86_400_000;

/// Due days past this roll into the following month
const ROLLOVER_DAY: u32 = 31;

/// Default look-ahead for the upcoming view
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

/// Largest accepted `months_before` / `months_after`
pub const MAX_WINDOW_MONTHS: u32 = 1200;

/// Calendar window and matching tolerances
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarConfig {
    pub months_before: u32,
    pub months_after: u32,
    /// Max distance between a transaction and an event date, in milliseconds (inclusive)
    pub match_tolerance_ms: i64,
    /// Max absolute difference between a transaction and a recurring amount (exclusive)
    pub amount_tolerance: f64,
    /// Detected patterns below this confidence are not scheduled
    pub min_pattern_confidence: f64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            months_before: 3,
            months_after: 3,
            match_tolerance_ms: DAY_MS,
            amount_tolerance: 0.01,
            min_pattern_confidence: DEFAULT_MIN_PATTERN_CONFIDENCE,
        }
    }
}

/// Optional narrowing of the generated events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarFilters {
    /// Only events for this account (cut/due)
    pub account_id: Option<String>,
    /// Only accounts of this type (cut/due)
    pub account_type: Option<AccountType>,
    /// Only due/recurring events in this currency
    pub currency: Option<Currency>,
}

impl CalendarFilters {
    fn accepts_account(&self, account: &Account) -> bool {
        if let Some(id) = &self.account_id {
            if &account.id != id {
                return false;
            }
        }
        if let Some(account_type) = self.account_type {
            if account.account_type != account_type {
                return false;
            }
        }
        true
    }

    fn accepts_currency(&self, currency: Currency) -> bool {
        self.currency.map_or(true, |c| c == currency)
    }
}

/// Build calendar events for every month in the configured window.
///
/// Returns an empty list when either accounts or transactions are absent. Output
/// order is unspecified; use [`upcoming_events`] for a sorted view.
pub fn build_calendar_events(
    accounts: Option<&[Account]>,
    transactions: Option<&[Transaction]>,
    sources: &[RecurringSource],
    reference: NaiveDate,
    config: &CalendarConfig,
    filters: &CalendarFilters,
) -> Vec<CalendarEvent> {
    let (Some(accounts), Some(transactions)) = (accounts, transactions) else {
        debug!("Calendar skipped: accounts or transactions not loaded");
        return Vec::new();
    };

    let items: Vec<RecurringItem> = sources
        .iter()
        .filter_map(|s| s.to_item_with_confidence(config.min_pattern_confidence))
        .collect();

    let mut events = Vec::new();
    let reference_month0 = i64::from(reference.year()) * 12 + i64::from(reference.month0());
    let first = reference_month0 - i64::from(config.months_before.min(MAX_WINDOW_MONTHS));
    let last = reference_month0 + i64::from(config.months_after.min(MAX_WINDOW_MONTHS));

    for absolute_month in first..=last {
        let Ok(year) = i32::try_from(absolute_month.div_euclid(12)) else {
            continue;
        };
        let month0 = absolute_month.rem_euclid(12) as i32;

        for account in accounts.iter().filter(|a| filters.accepts_account(a)) {
            push_account_events(&mut events, account, transactions, year, month0, config, filters);
        }

        for item in &items {
            if !filters.accepts_currency(item.currency) {
                continue;
            }
            if let Some(event) = recurring_event(item, transactions, year, month0, config) {
                events.push(event);
            }
        }
    }

    info!(
        "Calendar: {} events for {} accounts, {} recurring items",
        events.len(),
        accounts.len(),
        items.len()
    );

    events
}

/// Events dated within `[today, today + days]`, sorted by date then id.
///
/// A horizon past the last representable date is clamped to it; a negative
/// `days` yields nothing.
pub fn upcoming_events(events: &[CalendarEvent], today: NaiveDate, days: i64) -> Vec<CalendarEvent> {
    if days < 0 {
        return Vec::new();
    }
    let horizon = Duration::try_days(days)
        .and_then(|d| today.checked_add_signed(d))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| e.date >= today && e.date <= horizon)
        .cloned()
        .collect();

    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    upcoming
}

fn push_account_events(
    events: &mut Vec<CalendarEvent>,
    account: &Account,
    transactions: &[Transaction],
    year: i32,
    month0: i32,
    config: &CalendarConfig,
    filters: &CalendarFilters,
) {
    let cut_day = match account.cut_day {
        Some(day) if day > 0 => day,
        _ => return,
    };

    if let Some(date) = normalize_date(year, month0, i64::from(cut_day)) {
        events.push(CalendarEvent {
            id: event_id(CalendarEventKind::Cut, &account.id, year, month0),
            title: format!("Statement cut: {}", account.name),
            date,
            kind: CalendarEventKind::Cut,
            account_id: Some(account.id.clone()),
            recurring_id: None,
            amount: None,
            currency: None,
            is_paid: false,
        });
    }

    let offset = match account.due_days_offset {
        Some(offset) if offset > 0 => offset,
        _ => return,
    };
    if !filters.accepts_currency(account.currency_primary) {
        return;
    }

    let Some(due_date) = due_date(year, month0, cut_day, offset) else {
        return;
    };

    let is_paid = transactions.iter().any(|t| {
        t.account_id == account.id
            && t.transaction_type == TransactionType::Payment
            && within_tolerance(t.date, due_date, config.match_tolerance_ms)
    });

    if is_paid {
        debug!("Due {} for '{}' matched a payment", due_date, account.name);
    }

    events.push(CalendarEvent {
        id: event_id(CalendarEventKind::Due, &account.id, year, month0),
        title: format!("Payment due: {}", account.name),
        date: due_date,
        kind: CalendarEventKind::Due,
        account_id: Some(account.id.clone()),
        recurring_id: None,
        amount: Some(account.balance_primary),
        currency: Some(account.currency_primary),
        is_paid,
    });
}

fn recurring_event(
    item: &RecurringItem,
    transactions: &[Transaction],
    year: i32,
    month0: i32,
    config: &CalendarConfig,
) -> Option<CalendarEvent> {
    let date = normalize_date(year, month0, i64::from(item.day))?;

    let is_paid = transactions.iter().any(|t| {
        within_tolerance(t.date, date, config.match_tolerance_ms)
            && (t.amount.abs() - item.amount).abs() < config.amount_tolerance
            && t.currency == item.currency
    });

    if is_paid {
        debug!("Recurring '{}' on {} matched a transaction", item.name, date);
    }

    Some(CalendarEvent {
        id: event_id(CalendarEventKind::Recurring, &item.id, year, month0),
        title: item.name.clone(),
        date,
        kind: CalendarEventKind::Recurring,
        account_id: None,
        recurring_id: Some(item.id.clone()),
        amount: Some(item.amount),
        currency: Some(item.currency),
        is_paid,
    })
}

/// Due date for a cut day plus offset in the given month.
///
/// Sums past day 31 move to the following month as `sum - 31`, regardless of the
/// real month length. Out-of-range input gives a best-effort date, or `None`
/// when no such date exists.
pub fn due_date(year: i32, month0: i32, cut_day: u32, offset: u32) -> Option<NaiveDate> {
    let due_day = i64::from(cut_day) + i64::from(offset);
    if due_day > i64::from(ROLLOVER_DAY) {
        normalize_date(year, month0.checked_add(1)?, due_day - i64::from(ROLLOVER_DAY))
    } else {
        normalize_date(year, month0, due_day)
    }
}

/// Build a date from a possibly out-of-range month (0-based) and day, carrying
/// overflow forward: month 12 is January of the next year, Feb 30 is Mar 2 (or
/// Mar 1 in leap years).
pub fn normalize_date(year: i32, month0: i32, day: i64) -> Option<NaiveDate> {
    let absolute = i64::from(year) * 12 + i64::from(month0);
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(absolute.div_euclid(12)).ok()?,
        absolute.rem_euclid(12) as u32 + 1,
        1,
    )?;
    first.checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)
}

fn event_id(kind: CalendarEventKind, source_id: &str, year: i32, month0: i32) -> String {
    format!("{}-{}-{}-{:02}", kind.as_str(), source_id, year, month0 + 1)
}

fn within_tolerance(at: DateTime<Utc>, date: NaiveDate, tolerance_ms: i64) -> bool {
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (at - midnight).num_milliseconds().abs() <= tolerance_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, RecurringPattern, RecurringPayment};
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(id: &str, cut_day: Option<u32>, offset: Option<u32>) -> Account {
        Account {
            id: id.to_string(),
            name: format!("Card {}", id),
            bank: "BHD".to_string(),
            account_type: AccountType::Credit,
            currency_primary: Currency::Usd,
            balance_primary: 450.0,
            currency_secondary: None,
            balance_secondary: None,
            cut_day,
            due_days_offset: offset,
            limit_primary: None,
            notes: None,
        }
    }

    fn tx_at(
        account_id: &str,
        at: DateTime<Utc>,
        amount: f64,
        currency: Currency,
        transaction_type: TransactionType,
    ) -> Transaction {
        Transaction {
            id: format!("tx-{}", at.timestamp()),
            account_id: account_id.to_string(),
            date: at,
            description: "payment".to_string(),
            amount,
            currency,
            transaction_type,
            category_id: None,
            note: None,
        }
    }

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
    }

    fn declared(id: &str, day: u32, amount: f64, currency: Currency) -> RecurringSource {
        RecurringSource::Declared(RecurringPayment {
            id: id.to_string(),
            name: format!("Recurring {}", id),
            day,
            amount,
            currency,
            category_id: None,
            bank: None,
            active: true,
        })
    }

    fn build(
        accounts: &[Account],
        transactions: &[Transaction],
        sources: &[RecurringSource],
        reference: NaiveDate,
    ) -> Vec<CalendarEvent> {
        build_calendar_events(
            Some(accounts),
            Some(transactions),
            sources,
            reference,
            &CalendarConfig::default(),
            &CalendarFilters::default(),
        )
    }

    fn find<'a>(events: &'a [CalendarEvent], id: &str) -> &'a CalendarEvent {
        events
            .iter()
            .find(|e| e.id == id)
            .unwrap_or_else(|| panic!("missing event {}", id))
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(2025, 0, 15), Some(ymd(2025, 1, 15)));
        assert_eq!(normalize_date(2025, 1, 30), Some(ymd(2025, 3, 2)));
        assert_eq!(normalize_date(2024, 1, 30), Some(ymd(2024, 3, 1)));
        assert_eq!(normalize_date(2025, 12, 1), Some(ymd(2026, 1, 1)));
        assert_eq!(normalize_date(2025, -1, 10), Some(ymd(2024, 12, 10)));
    }

    #[test]
    fn test_none_inputs_yield_empty() {
        let accounts = vec![account("a1", Some(15), Some(20))];
        let sources = vec![declared("r1", 5, 10.0, Currency::Dop)];
        let config = CalendarConfig::default();
        let filters = CalendarFilters::default();

        let no_txs: Vec<Transaction> = Vec::new();

        assert!(build_calendar_events(
            None,
            Some(no_txs.as_slice()),
            &sources,
            ymd(2025, 1, 1),
            &config,
            &filters
        )
        .is_empty());
        assert!(build_calendar_events(
            Some(accounts.as_slice()),
            None,
            &sources,
            ymd(2025, 1, 1),
            &config,
            &filters
        )
        .is_empty());
    }

    #[test]
    fn test_window_covers_seven_months() {
        let events = build(&[account("a1", Some(15), None)], &[], &[], ymd(2025, 1, 20));
        assert_eq!(events.len(), 7);
        let mut dates: Vec<_> = events.iter().map(|e| e.date).collect();
        dates.sort();
        assert_eq!(dates.first(), Some(&ymd(2024, 10, 15)));
        assert_eq!(dates.last(), Some(&ymd(2025, 4, 15)));
    }

    #[test]
    fn test_ids_are_stable() {
        let accounts = vec![account("a1", Some(15), Some(20))];
        let sources = vec![declared("r1", 5, 10.0, Currency::Dop)];
        let first = build(&accounts, &[], &sources, ymd(2025, 1, 20));
        let second = build(&accounts, &[], &sources, ymd(2025, 1, 20));

        let ids: Vec<_> = first.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, second.iter().map(|e| e.id.clone()).collect::<Vec<_>>());
        assert!(ids.contains(&"cut-a1-2025-01".to_string()));
        assert!(ids.contains(&"due-a1-2024-10".to_string()));
        assert!(ids.contains(&"recurring-r1-2025-04".to_string()));

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_accounts_without_cut_day_are_skipped() {
        let accounts = vec![account("none", None, Some(10)), account("zero", Some(0), Some(10))];
        assert!(build(&accounts, &[], &[], ymd(2025, 1, 1)).is_empty());
    }

    #[test]
    fn test_zero_offset_has_no_due_event() {
        let events = build(&[account("a1", Some(10), Some(0))], &[], &[], ymd(2025, 1, 1));
        assert!(events.iter().all(|e| e.kind == CalendarEventKind::Cut));
    }

    #[test]
    fn test_due_date_rollover() {
        assert_eq!(due_date(2025, 0, 25, 10), Some(ymd(2025, 2, 4)));
        assert_eq!(due_date(2025, 11, 25, 10), Some(ymd(2026, 1, 4)));
        assert_eq!(due_date(2025, 0, 5, 20), Some(ymd(2025, 1, 25)));

        let events = build(&[account("a1", Some(25), Some(10))], &[], &[], ymd(2025, 1, 10));
        let due = find(&events, "due-a1-2025-01");
        assert_eq!(due.date, ymd(2025, 2, 4));
        assert_eq!(due.amount, Some(450.0));
        assert_eq!(due.currency, Some(Currency::Usd));
    }

    #[test]
    fn test_short_month_overflow() {
        // Feb 2025 has no 30th; the cut lands on Mar 2
        let events = build(&[account("a1", Some(30), None)], &[], &[], ymd(2025, 2, 1));
        assert_eq!(find(&events, "cut-a1-2025-02").date, ymd(2025, 3, 2));
    }

    #[test]
    fn test_due_paid_tolerance() {
        let accounts = vec![account("a1", Some(5), Some(15))];
        let due = ymd(2025, 1, 20);

        let next_day = vec![tx_at(
            "a1",
            midnight(due) + Duration::days(1),
            450.0,
            Currency::Usd,
            TransactionType::Payment,
        )];
        let events = build(&accounts, &next_day, &[], ymd(2025, 1, 1));
        let event = find(&events, "due-a1-2025-01");
        assert!(event.is_paid);
        assert_eq!(event.display_kind(), crate::models::DisplayKind::Paid);

        let three_days = vec![tx_at(
            "a1",
            midnight(due) + Duration::days(3),
            450.0,
            Currency::Usd,
            TransactionType::Payment,
        )];
        let events = build(&accounts, &three_days, &[], ymd(2025, 1, 1));
        assert!(!find(&events, "due-a1-2025-01").is_paid);
    }

    #[test]
    fn test_due_paid_requires_payment_on_same_account() {
        let accounts = vec![account("a1", Some(5), Some(15))];
        let at = midnight(ymd(2025, 1, 20)) + Duration::hours(10);
        let txs = vec![
            tx_at("a1", at, 450.0, Currency::Usd, TransactionType::Charge),
            tx_at("a2", at, 450.0, Currency::Usd, TransactionType::Payment),
        ];
        let events = build(&accounts, &txs, &[], ymd(2025, 1, 1));
        assert!(!find(&events, "due-a1-2025-01").is_paid);
    }

    #[test]
    fn test_recurring_paid_is_strict() {
        let sources = vec![declared("r1", 10, 1500.0, Currency::Dop)];
        let at = midnight(ymd(2025, 1, 10)) + Duration::hours(8);
        let reference = ymd(2025, 1, 1);

        let exact = vec![tx_at("any", at, 1500.0, Currency::Dop, TransactionType::Charge)];
        assert!(find(&build(&[], &exact, &sources, reference), "recurring-r1-2025-01").is_paid);

        let wrong_currency = vec![tx_at("any", at, 1500.0, Currency::Usd, TransactionType::Charge)];
        assert!(!find(&build(&[], &wrong_currency, &sources, reference), "recurring-r1-2025-01").is_paid);

        let wrong_amount = vec![tx_at("any", at, 1501.0, Currency::Dop, TransactionType::Charge)];
        assert!(!find(&build(&[], &wrong_amount, &sources, reference), "recurring-r1-2025-01").is_paid);

        let signed = vec![tx_at("any", at, -1500.0, Currency::Dop, TransactionType::Charge)];
        assert!(find(&build(&[], &signed, &sources, reference), "recurring-r1-2025-01").is_paid);
    }

    #[test]
    fn test_inactive_and_low_confidence_sources_are_skipped() {
        let inactive = RecurringPayment {
            id: "off".to_string(),
            name: "Old gym".to_string(),
            day: 3,
            amount: 900.0,
            currency: Currency::Dop,
            category_id: None,
            bank: None,
            active: false,
        };

        let weak = RecurringPattern {
            description: "maybe".to_string(),
            amount: 100.0,
            frequency: Frequency::Monthly,
            confidence: 0.2,
            last_seen: ymd(2025, 1, 3),
            currency: Currency::Dop,
            occurrences: 2,
            average_interval_days: 31.0,
        };

        let sources = vec![RecurringSource::Declared(inactive), RecurringSource::Detected(weak)];
        assert!(build(&[], &[], &sources, ymd(2025, 1, 1)).is_empty());
    }

    #[test]
    fn test_filters() {
        let mut debit = account("d1", Some(10), Some(5));
        debit.account_type = AccountType::Debit;
        debit.currency_primary = Currency::Dop;
        let accounts = vec![account("a1", Some(15), Some(10)), debit];
        let sources = vec![
            declared("usd", 5, 20.0, Currency::Usd),
            declared("dop", 6, 900.0, Currency::Dop),
        ];
        let no_txs: Vec<Transaction> = Vec::new();
        let reference = ymd(2025, 1, 1);
        let config = CalendarConfig {
            months_before: 0,
            months_after: 0,
            ..Default::default()
        };

        let by_account = build_calendar_events(
            Some(accounts.as_slice()),
            Some(no_txs.as_slice()),
            &sources,
            reference,
            &config,
            &CalendarFilters {
                account_id: Some("a1".to_string()),
                ..Default::default()
            },
        );
        assert!(by_account
            .iter()
            .filter_map(|e| e.account_id.as_deref())
            .all(|id| id == "a1"));
        assert_eq!(by_account.len(), 4);

        let by_type = build_calendar_events(
            Some(accounts.as_slice()),
            Some(no_txs.as_slice()),
            &[],
            reference,
            &config,
            &CalendarFilters {
                account_type: Some(AccountType::Debit),
                ..Default::default()
            },
        );
        assert_eq!(by_type.len(), 2);

        let by_currency = build_calendar_events(
            Some(accounts.as_slice()),
            Some(no_txs.as_slice()),
            &sources,
            reference,
            &config,
            &CalendarFilters {
                currency: Some(Currency::Dop),
                ..Default::default()
            },
        );
        assert!(by_currency
            .iter()
            .filter(|e| e.kind != CalendarEventKind::Cut)
            .all(|e| e.currency == Some(Currency::Dop)));
        assert_eq!(by_currency.iter().filter(|e| e.kind == CalendarEventKind::Cut).count(), 2);
    }

    #[test]
    fn test_upcoming_events() {
        let accounts = vec![account("a1", Some(15), Some(10))];
        let sources = vec![declared("r1", 15, 10.0, Currency::Dop)];
        let events = build(&accounts, &[], &sources, ymd(2025, 1, 1));

        let upcoming = upcoming_events(&events, ymd(2025, 1, 15), DEFAULT_UPCOMING_DAYS);
        let ids: Vec<_> = upcoming.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "cut-a1-2025-01",
                "recurring-r1-2025-01",
                "due-a1-2025-01",
            ]
        );
        assert!(upcoming
            .iter()
            .all(|e| e.date >= ymd(2025, 1, 15) && e.date <= ymd(2025, 2, 14)));
    }

    #[test]
    fn test_extreme_account_days_do_not_panic() {
        assert_eq!(due_date(2025, 0, u32::MAX, 1), None);
        assert_eq!(due_date(2025, 0, u32::MAX, u32::MAX), None);
        assert_eq!(normalize_date(2025, 0, i64::MIN), None);
        assert_eq!(normalize_date(i32::MAX, 11, 1), None);

        let events = build(&[account("a1", Some(u32::MAX), Some(1))], &[], &[], ymd(2025, 1, 1));
        assert!(events.is_empty());
    }

    #[test]
    fn test_upcoming_horizon_is_clamped() {
        let events = build(&[account("a1", Some(15), None)], &[], &[], ymd(2025, 1, 1));

        let upcoming = upcoming_events(&events, ymd(2025, 1, 1), 100_000_000);
        assert_eq!(upcoming.len(), 4);
        assert_eq!(upcoming_events(&events, ymd(2025, 1, 1), i64::MAX).len(), 4);
        assert!(upcoming_events(&events, ymd(2025, 1, 1), -1).is_empty());
    }

    #[test]
    fn test_window_is_bounded() {
        let config = CalendarConfig {
            months_before: u32::MAX,
            months_after: 0,
            ..Default::default()
        };
        let accounts = vec![account("a1", Some(15), None)];
        let no_txs: Vec<Transaction> = Vec::new();
        let events = build_calendar_events(
            Some(accounts.as_slice()),
            Some(no_txs.as_slice()),
            &[],
            ymd(2025, 1, 1),
            &config,
            &CalendarFilters::default(),
        );
        assert_eq!(events.len(), MAX_WINDOW_MONTHS as usize + 1);
    }

    #[test]
    fn test_detected_descriptions_get_distinct_event_ids() {
        let patterns: Vec<RecurringPattern> = ["uber eats", "uber-eats", "***", "---"]
            .iter()
            .map(|d| RecurringPattern {
                description: d.to_string(),
                amount: 350.0,
                frequency: Frequency::Monthly,
                confidence: 0.9,
                last_seen: ymd(2025, 1, 8),
                currency: Currency::Dop,
                occurrences: 5,
                average_interval_days: 30.0,
            })
            .collect();
        let sources = crate::recurring::merge_sources(&[], &patterns);

        let events = build(&[], &[], &sources, ymd(2025, 1, 1));
        assert_eq!(events.len(), 28);
        let unique: std::collections::HashSet<_> = events.iter().map(|e| &e.id).collect();
        assert_eq!(unique.len(), events.len());
    }
}
