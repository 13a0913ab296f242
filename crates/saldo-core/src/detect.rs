//! Recurring payment detection
//!
//! Infers periodic payments from unlabeled transaction history:
//! - Groups transactions by normalized description
//! - Measures the day gaps between consecutive occurrences
//! - Classifies a dominant frequency from the mean gap
//! - Scores confidence from gap consistency and occurrence count
//!
//! Detection is pure: no I/O, no shared state. Callers decide whether to keep
//! the resulting patterns.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::models::{Frequency, RecurringPattern, Transaction};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Occurrences needed before confidence stops growing with count
const FULL_CONFIDENCE_OCCURRENCES: f64 = 5.0;

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Minimum occurrences for a group to be considered (never below 2)
    pub min_occurrences: usize,
    /// Only look at charges, fees and interest (skip payments/income)
    pub expenses_only: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            expenses_only: false,
        }
    }
}

/// Detector that groups transactions and emits recurring patterns
#[derive(Debug, Clone, Default)]
pub struct RecurringDetector {
    config: DetectionConfig,
}

impl RecurringDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect recurring patterns in a collection of transactions.
    ///
    /// Returns one pattern per description group with enough occurrences,
    /// sorted by description. Empty input yields an empty result.
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<RecurringPattern> {
        let min_occurrences = self.config.min_occurrences.max(2);

        let mut groups: HashMap<String, Vec<&Transaction>> = HashMap::new();
        for tx in transactions {
            if self.config.expenses_only && !tx.is_expense() {
                continue;
            }
            groups
                .entry(normalize_description(&tx.description))
                .or_default()
                .push(tx);
        }

        let mut patterns: Vec<RecurringPattern> = groups
            .into_iter()
            .filter(|(_, txs)| txs.len() >= min_occurrences)
            .filter_map(|(description, txs)| analyze_group(description, txs))
            .collect();

        patterns.sort_by(|a, b| a.description.cmp(&b.description));

        info!(
            "Recurring detection: {} patterns from {} transactions",
            patterns.len(),
            transactions.len()
        );

        patterns
    }
}

/// Detect recurring patterns with the default configuration
pub fn detect_recurring_patterns(transactions: &[Transaction]) -> Vec<RecurringPattern> {
    RecurringDetector::new().detect(transactions)
}

/// Grouping key for a description: trimmed and lowercased
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Classify a mean interval (in days) into a frequency. First match wins.
pub fn classify_frequency(avg_interval_days: f64) -> Frequency {
    if avg_interval_days <= 1.5 {
        Frequency::Daily
    } else if avg_interval_days <= 7.5 {
        Frequency::Weekly
    } else if avg_interval_days <= 15.0 {
        Frequency::Biweekly
    } else if avg_interval_days <= 35.0 {
        Frequency::Monthly
    } else if avg_interval_days <= 120.0 {
        Frequency::Quarterly
    } else {
        Frequency::Yearly
    }
}

/// Confidence in [0, 1] from the gaps between occurrences and the occurrence count.
///
/// `consistency = max(0, 1 - std_dev / mean / 2)`, then scaled by `count / 5` and
/// capped at 1. A single gap has zero deviation, so two occurrences always score
/// full consistency.
pub fn confidence_score(intervals: &[f64], occurrences: usize) -> f64 {
    let avg = mean(intervals);
    if intervals.is_empty() || avg <= 0.0 {
        return 0.0;
    }

    let consistency = (1.0 - std_dev(intervals, avg) / avg / 2.0).max(0.0);
    (consistency * (occurrences as f64 / FULL_CONFIDENCE_OCCURRENCES)).min(1.0)
}

/// Build a pattern from one description group (at least two occurrences)
fn analyze_group(description: String, mut txs: Vec<&Transaction>) -> Option<RecurringPattern> {
    txs.sort_by_key(|t| t.date);
    let latest = *txs.last()?;

    let intervals: Vec<f64> = txs
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_milliseconds() as f64 / MS_PER_DAY)
        .collect();

    if intervals.is_empty() {
        return None;
    }

    let avg_interval = mean(&intervals);
    let frequency = classify_frequency(avg_interval);
    let confidence = confidence_score(&intervals, txs.len());

    let amounts: Vec<f64> = txs.iter().map(|t| t.amount.abs()).collect();
    let amount = mean(&amounts).round();

    debug!(
        "Recurring group '{}': {} occurrences, avg {:.1} days -> {} (confidence {:.2})",
        description,
        txs.len(),
        avg_interval,
        frequency,
        confidence
    );

    Some(RecurringPattern {
        description,
        amount,
        frequency,
        confidence,
        last_seen: latest.date.date_naive(),
        currency: latest.currency,
        occurrences: txs.len(),
        average_interval_days: avg_interval,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, TransactionType};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn make_tx(description: &str, amount: f64, date: NaiveDate) -> Transaction {
        Transaction {
            id: format!("{}-{}", description, date),
            account_id: "acct".to_string(),
            date: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
            description: description.to_string(),
            amount,
            currency: Currency::Dop,
            transaction_type: TransactionType::Charge,
            category_id: None,
            note: None,
        }
    }

    fn spaced(description: &str, amount: f64, count: usize, gap_days: i64) -> Vec<Transaction> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| make_tx(description, amount, start + Duration::days(gap_days * i as i64)))
            .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  Netflix "), "netflix");
        assert_eq!(normalize_description("SPOTIFY USA"), "spotify usa");
    }

    #[test]
    fn test_classify_frequency_thresholds() {
        assert_eq!(classify_frequency(1.0), Frequency::Daily);
        assert_eq!(classify_frequency(1.5), Frequency::Daily);
        assert_eq!(classify_frequency(1.6), Frequency::Weekly);
        assert_eq!(classify_frequency(7.5), Frequency::Weekly);
        assert_eq!(classify_frequency(14.0), Frequency::Biweekly);
        assert_eq!(classify_frequency(15.0), Frequency::Biweekly);
        assert_eq!(classify_frequency(30.0), Frequency::Monthly);
        assert_eq!(classify_frequency(35.0), Frequency::Monthly);
        assert_eq!(classify_frequency(91.0), Frequency::Quarterly);
        assert_eq!(classify_frequency(120.0), Frequency::Quarterly);
        assert_eq!(classify_frequency(365.0), Frequency::Yearly);
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_recurring_patterns(&[]).is_empty());
    }

    #[test]
    fn test_singletons_are_discarded() {
        let txs = vec![
            make_tx("Coffee", 150.0, ymd(2024, 1, 1)),
            make_tx("Groceries", 2500.0, ymd(2024, 1, 3)),
            make_tx("Pharmacy", 800.0, ymd(2024, 2, 3)),
        ];
        assert!(detect_recurring_patterns(&txs).is_empty());
    }

    #[test]
    fn test_every_pattern_comes_from_a_group_of_two_or_more() {
        let mut txs = spaced("Gym", 1500.0, 4, 30);
        txs.push(make_tx("One-off", 99.0, ymd(2024, 3, 3)));
        txs.extend(spaced("Bus", 50.0, 2, 1));

        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns.len(), 2);
        for pattern in &patterns {
            let members = txs
                .iter()
                .filter(|t| normalize_description(&t.description) == pattern.description)
                .count();
            assert!(members >= 2, "{} came from {} members", pattern.description, members);
        }
    }

    #[test]
    fn test_grouping_ignores_case_and_whitespace() {
        let txs = vec![
            make_tx("NETFLIX", 299.0, ymd(2024, 1, 5)),
            make_tx(" netflix ", 299.0, ymd(2024, 2, 5)),
            make_tx("Netflix", 299.0, ymd(2024, 3, 5)),
        ];
        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].description, "netflix");
        assert_eq!(patterns[0].occurrences, 3);
    }

    #[test]
    fn test_frequency_from_exact_spacing() {
        let monthly = detect_recurring_patterns(&spaced("rent", 25000.0, 5, 30));
        assert_eq!(monthly[0].frequency, Frequency::Monthly);

        let weekly = detect_recurring_patterns(&spaced("laundry", 300.0, 5, 7));
        assert_eq!(weekly[0].frequency, Frequency::Weekly);

        let daily = detect_recurring_patterns(&spaced("metro", 35.0, 5, 1));
        assert_eq!(daily[0].frequency, Frequency::Daily);

        let biweekly = detect_recurring_patterns(&spaced("payroll fee", 10.0, 4, 14));
        assert_eq!(biweekly[0].frequency, Frequency::Biweekly);

        let quarterly = detect_recurring_patterns(&spaced("insurance", 9000.0, 3, 91));
        assert_eq!(quarterly[0].frequency, Frequency::Quarterly);

        let yearly = detect_recurring_patterns(&spaced("domain", 900.0, 3, 365));
        assert_eq!(yearly[0].frequency, Frequency::Yearly);
    }

    #[test]
    fn test_unsorted_input_is_sorted_per_group() {
        let txs = vec![
            make_tx("water", 600.0, ymd(2024, 3, 1)),
            make_tx("water", 600.0, ymd(2024, 1, 1)),
            make_tx("water", 600.0, ymd(2024, 2, 1)),
        ];
        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns[0].frequency, Frequency::Monthly);
        assert_eq!(patterns[0].last_seen, ymd(2024, 3, 1));
        assert!(patterns[0].average_interval_days > 29.0);
    }

    #[test]
    fn test_confidence_bounds() {
        let mut txs = spaced("steady", 100.0, 12, 30);
        txs.extend(vec![
            make_tx("erratic", 10.0, ymd(2024, 1, 1)),
            make_tx("erratic", 10.0, ymd(2024, 1, 2)),
            make_tx("erratic", 10.0, ymd(2024, 6, 1)),
            make_tx("erratic", 10.0, ymd(2024, 6, 2)),
        ]);
        txs.extend(spaced("pair", 20.0, 2, 45));

        for pattern in detect_recurring_patterns(&txs) {
            assert!(
                (0.0..=1.0).contains(&pattern.confidence),
                "{} confidence {}",
                pattern.description,
                pattern.confidence
            );
        }
    }

    #[test]
    fn test_confidence_capped_at_one() {
        let patterns = detect_recurring_patterns(&spaced("internet", 2100.0, 10, 30));
        assert_eq!(patterns[0].confidence, 1.0);
    }

    #[test]
    fn test_zero_variance_beats_high_variance() {
        let steady = spaced("steady", 100.0, 4, 30);
        let erratic = vec![
            make_tx("erratic", 100.0, ymd(2024, 1, 1)),
            make_tx("erratic", 100.0, ymd(2024, 1, 3)),
            make_tx("erratic", 100.0, ymd(2024, 3, 20)),
            make_tx("erratic", 100.0, ymd(2024, 3, 22)),
        ];
        let all: Vec<_> = steady.into_iter().chain(erratic).collect();
        let patterns = detect_recurring_patterns(&all);

        let steady = patterns.iter().find(|p| p.description == "steady").unwrap();
        let erratic = patterns.iter().find(|p| p.description == "erratic").unwrap();
        assert!(steady.confidence >= erratic.confidence);
        assert!(steady.confidence > 0.0);
    }

    #[test]
    fn test_two_occurrences_have_full_consistency() {
        // A single gap has no spread, so consistency is 1.0 and confidence is 2/5
        let patterns = detect_recurring_patterns(&spaced("pair", 500.0, 2, 200));
        assert!((patterns[0].confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_same_instant_group_scores_zero_confidence() {
        let day = ymd(2024, 5, 5);
        let txs = vec![make_tx("dup", 10.0, day), make_tx("dup", 10.0, day)];
        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns[0].frequency, Frequency::Daily);
        assert_eq!(patterns[0].confidence, 0.0);
    }

    #[test]
    fn test_amount_is_rounded_mean_of_absolute_values() {
        let txs = vec![
            make_tx("power", -1000.0, ymd(2024, 1, 10)),
            make_tx("power", 1201.0, ymd(2024, 2, 10)),
            make_tx("power", -1300.0, ymd(2024, 3, 10)),
        ];
        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns[0].amount, 1167.0);
    }

    #[test]
    fn test_netflix_scenario() {
        let txs = vec![
            make_tx("Netflix", 299.0, ymd(2025, 1, 5)),
            make_tx("Netflix", 299.0, ymd(2025, 2, 5)),
            make_tx("Netflix", 299.0, ymd(2025, 3, 5)),
        ];
        let patterns = detect_recurring_patterns(&txs);
        assert_eq!(patterns.len(), 1);

        let netflix = &patterns[0];
        assert_eq!(netflix.description, "netflix");
        assert_eq!(netflix.amount, 299.0);
        assert_eq!(netflix.frequency, Frequency::Monthly);
        assert!(netflix.confidence > 0.5);
        assert_eq!(netflix.last_seen, ymd(2025, 3, 5));
        assert_eq!(netflix.currency, Currency::Dop);
    }

    #[test]
    fn test_expenses_only_skips_payments() {
        let mut txs = spaced("salary", 50000.0, 4, 15);
        for tx in &mut txs {
            tx.transaction_type = TransactionType::Payment;
        }
        txs.extend(spaced("gym", 1500.0, 3, 30));

        let all = detect_recurring_patterns(&txs);
        assert_eq!(all.len(), 2);

        let detector = RecurringDetector::with_config(DetectionConfig {
            expenses_only: true,
            ..Default::default()
        });
        let expenses = detector.detect(&txs);
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "gym");
    }

    #[test]
    fn test_min_occurrences_never_below_two() {
        let detector = RecurringDetector::with_config(DetectionConfig {
            min_occurrences: 0,
            ..Default::default()
        });
        let txs = vec![make_tx("solo", 10.0, ymd(2024, 1, 1))];
        assert!(detector.detect(&txs).is_empty());

        let strict = RecurringDetector::with_config(DetectionConfig {
            min_occurrences: 4,
            ..Default::default()
        });
        assert!(strict.detect(&spaced("three", 10.0, 3, 30)).is_empty());
        assert_eq!(strict.detect(&spaced("four", 10.0, 4, 30)).len(), 1);
    }
}
