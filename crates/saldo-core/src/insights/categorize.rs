//! Transaction categorization
//!
//! Asks the language model to place a transaction in one of a fixed set of
//! categories. Without a model every transaction lands in `Other` with zero
//! confidence.

use serde::{Deserialize, Serialize};

use crate::ai::parsing::parse_json_response;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;
use crate::models::Transaction;

/// Transactions sent per batch
pub const BATCH_SIZE: usize = 5;

/// Spending categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Food,
    Transport,
    Entertainment,
    Services,
    Health,
    Education,
    Shopping,
    Investment,
    Other,
}

impl TransactionCategory {
    pub fn all() -> &'static [TransactionCategory] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Services,
            Self::Health,
            Self::Education,
            Self::Shopping,
            Self::Investment,
            Self::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Services => "services",
            Self::Health => "health",
            Self::Education => "education",
            Self::Shopping => "shopping",
            Self::Investment => "investment",
            Self::Other => "other",
        }
    }

    /// Lenient lookup; models answer in English or Spanish. Unknown names map to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "food" | "comida" => Self::Food,
            "transport" | "transportation" | "transporte" => Self::Transport,
            "entertainment" | "entretenimiento" => Self::Entertainment,
            "services" | "utilities" | "servicios" => Self::Services,
            "health" | "salud" => Self::Health,
            "education" | "educación" | "educacion" => Self::Education,
            "shopping" | "compras" => Self::Shopping,
            "investment" | "inversión" | "inversion" => Self::Investment,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub description: String,
    pub category: TransactionCategory,
    /// In [0, 1]
    pub confidence: f64,
    pub reasoning: String,
}

impl CategorizationResult {
    fn fallback(description: &str, reasoning: &str) -> Self {
        Self {
            description: description.to_string(),
            category: TransactionCategory::Other,
            confidence: 0.0,
            reasoning: reasoning.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCategorization {
    category: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

fn categorization_prompt(tx: &Transaction) -> String {
    let categories: Vec<&str> = TransactionCategory::all().iter().map(|c| c.as_str()).collect();
    format!(
        "Categorize the following financial transaction into one of these categories: {}\n\n\
         Description: {}\n\
         Amount: {} {}\n\n\
         Respond with JSON in exactly this format:\n\
         {{\"category\": \"category name\", \"confidence\": 0.95, \"reasoning\": \"short explanation\"}}\n\n\
         Respond with the JSON only.",
        categories.join(", "),
        tx.description,
        tx.amount,
        tx.currency
    )
}

/// Categorize one transaction.
///
/// Without a backend the result is `Other` with zero confidence. Backend and
/// parse errors are returned to the caller.
pub async fn categorize_transaction(
    ai: Option<&AIClient>,
    tx: &Transaction,
) -> Result<CategorizationResult> {
    let Some(ai) = ai else {
        tracing::warn!("AI unavailable, categorization disabled");
        return Ok(CategorizationResult::fallback(&tx.description, "AI unavailable"));
    };

    tracing::debug!(description = %tx.description, "Categorizing transaction");
    let response = ai.complete(&categorization_prompt(tx)).await?;
    let raw: RawCategorization = parse_json_response(&response)?;

    let confidence = if raw.confidence.is_finite() {
        raw.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(CategorizationResult {
        description: tx.description.clone(),
        category: TransactionCategory::from_name(&raw.category),
        confidence,
        reasoning: raw.reasoning,
    })
}

/// Categorize many transactions, `BATCH_SIZE` at a time.
///
/// Results keep input order. A transaction whose categorization fails is logged
/// and reported as `Other` with zero confidence.
pub async fn categorize_batch(
    ai: Option<&AIClient>,
    transactions: &[Transaction],
) -> Vec<CategorizationResult> {
    let mut results = Vec::with_capacity(transactions.len());
    let batches = transactions.len().div_ceil(BATCH_SIZE);

    for (i, batch) in transactions.chunks(BATCH_SIZE).enumerate() {
        tracing::debug!(batch = i + 1, total = batches, "Categorizing batch");

        for tx in batch {
            match categorize_transaction(ai, tx).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(
                        description = %tx.description,
                        error = %e,
                        "Failed to categorize transaction"
                    );
                    results.push(CategorizationResult::fallback(
                        &tx.description,
                        "Categorization failed",
                    ));
                }
            }
        }
    }

    tracing::info!(count = results.len(), "Categorization complete");
    results
}
