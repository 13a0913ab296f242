//! Monthly spending and trends
//!
//! Pure aggregation over charges; no language model involved.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Month-over-month change needed to call a trend
const TREND_THRESHOLD: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Stable => "stable",
            Self::Decreasing => "decreasing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrend {
    /// `YYYY-MM`
    pub month: String,
    pub amount: f64,
    pub trend: TrendDirection,
}

/// Sum of absolute charge amounts per `YYYY-MM`, in month order.
///
/// Only `charge` transactions count; fees, interest and payments are ignored.
pub fn monthly_spending(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut spending = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Charge)
    {
        let month = format!("{}-{:02}", tx.date.year(), tx.date.month());
        *spending.entry(month).or_insert(0.0) += tx.amount.abs();
    }
    spending
}

/// Month-by-month spending with the direction of change from the previous month.
///
/// More than +10% is increasing, less than -10% decreasing, anything else (and
/// the first month) stable.
pub fn analyze_spending_trends(transactions: &[Transaction]) -> Vec<SpendingTrend> {
    let mut previous: Option<f64> = None;

    monthly_spending(transactions)
        .into_iter()
        .map(|(month, amount)| {
            let trend = match previous {
                Some(prev) => classify_change(prev, amount),
                None => TrendDirection::Stable,
            };
            previous = Some(amount);
            SpendingTrend {
                month,
                amount,
                trend,
            }
        })
        .collect()
}

fn classify_change(previous: f64, current: f64) -> TrendDirection {
    if previous == 0.0 {
        return if current > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Stable
        };
    }

    let change = (current - previous) / previous;
    if change > TREND_THRESHOLD {
        TrendDirection::Increasing
    } else if change < -TREND_THRESHOLD {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}
