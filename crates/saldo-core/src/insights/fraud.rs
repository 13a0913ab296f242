//! Suspicious transaction review
//!
//! Amount statistics and the duplicate check are plain arithmetic. The risk
//! verdict comes from the language model, which sees those figures alongside
//! the transaction.

use serde::{Deserialize, Serialize};

use crate::ai::parsing::parse_json_response;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;
use crate::models::Transaction;

/// Two equal charges closer than this are possible duplicates
pub const DUPLICATE_WINDOW_MS: i64 = 60_000;

/// Statistics over absolute transaction amounts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmountStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation (n - 1); 0 with fewer than two amounts
    pub std_dev: f64,
}

/// Mean, extremes and sample standard deviation of `|amount|`. All zero for
/// an empty slice.
pub fn amount_stats(transactions: &[Transaction]) -> AmountStats {
    if transactions.is_empty() {
        return AmountStats::default();
    }

    let amounts: Vec<f64> = transactions.iter().map(|t| t.amount.abs()).collect();
    let count = amounts.len();
    let mean = amounts.iter().sum::<f64>() / count as f64;
    let max = amounts.iter().copied().fold(f64::MIN, f64::max);
    let min = amounts.iter().copied().fold(f64::MAX, f64::min);
    let std_dev = if count > 1 {
        let sum_sq: f64 = amounts.iter().map(|a| (a - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    } else {
        0.0
    };

    AmountStats {
        count,
        mean,
        max,
        min,
        std_dev,
    }
}

/// Whether another transaction in `recent` has the same description and amount
/// less than a minute away. A transaction never duplicates itself (same id).
pub fn is_possible_duplicate(tx: &Transaction, recent: &[Transaction]) -> bool {
    recent.iter().any(|other| {
        other.id != tx.id
            && other.description == tx.description
            && other.amount == tx.amount
            && (other.date - tx.date).num_milliseconds().abs() < DUPLICATE_WINDOW_MS
    })
}

/// Pairs of possible duplicates, each pair reported once as (earlier id, later id)
pub fn find_duplicates(transactions: &[Transaction]) -> Vec<(String, String)> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.date);

    let mut pairs = Vec::new();
    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            if (second.date - first.date).num_milliseconds() >= DUPLICATE_WINDOW_MS {
                break;
            }
            if first.id != second.id
                && first.description == second.description
                && first.amount == second.amount
            {
                pairs.push((first.id.clone(), second.id.clone()));
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAlert {
    pub transaction_id: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub recommendation: String,
    /// Transactions in the comparison set with the same description
    pub similar_transactions: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    risk_level: RiskLevel,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    recommendation: String,
}

fn fraud_prompt(tx: &Transaction, stats: &AmountStats, duplicate: bool, recent: usize) -> String {
    format!(
        "Assess whether this financial transaction could be fraudulent.\n\n\
         TRANSACTION:\n\
         - Description: {}\n\
         - Amount: {:.2} {}\n\
         - Type: {}\n\
         - Date: {}\n\n\
         USER PATTERNS:\n\
         - Average amount: {:.2}\n\
         - Largest amount: {:.2}\n\
         - Standard deviation: {:.2}\n\
         - Possible duplicate: {}\n\
         - Recent transactions: {}\n\n\
         Consider unusually high or low amounts, vague descriptions, deviation from \
         the usual pattern, duplicates and suspicious merchants.\n\n\
         Respond with JSON in this format:\n\
         {{\"riskLevel\": \"critical|high|medium|low\", \"reasons\": [\"reason\"], \
         \"recommendation\": \"what to do\", \"confidence\": 0.85}}\n\n\
         Respond with the JSON only.",
        tx.description,
        tx.amount,
        tx.currency,
        tx.transaction_type.as_str(),
        tx.date.to_rfc3339(),
        stats.mean,
        stats.max,
        stats.std_dev,
        if duplicate { "yes" } else { "no" },
        recent,
    )
}

/// Ask the model whether `tx` looks fraudulent next to `recent`.
///
/// Returns an alert only for medium risk or above. Without a backend nothing is
/// flagged. Backend and parse errors are returned to the caller.
pub async fn detect_fraud(
    ai: Option<&AIClient>,
    tx: &Transaction,
    recent: &[Transaction],
) -> Result<Option<FraudAlert>> {
    let Some(ai) = ai else {
        tracing::warn!("AI unavailable, fraud review disabled");
        return Ok(None);
    };

    let stats = amount_stats(recent);
    let duplicate = is_possible_duplicate(tx, recent);
    tracing::debug!(description = %tx.description, duplicate, "Reviewing transaction");

    let response = ai
        .complete(&fraud_prompt(tx, &stats, duplicate, recent.len()))
        .await?;
    let verdict: RawVerdict = parse_json_response(&response)?;

    if verdict.risk_level < RiskLevel::Medium {
        return Ok(None);
    }

    tracing::info!(risk = verdict.risk_level.as_str(), description = %tx.description, "Possible fraud");
    Ok(Some(FraudAlert {
        transaction_id: tx.id.clone(),
        description: tx.description.clone(),
        risk_level: verdict.risk_level,
        reasons: verdict.reasons,
        recommendation: verdict.recommendation,
        similar_transactions: recent
            .iter()
            .filter(|t| t.description == tx.description)
            .count(),
    }))
}
