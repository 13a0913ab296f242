//! Expense forecasting
//!
//! Sends the monthly spending history to the language model and asks for the
//! expected totals of the coming months.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ai::parsing::parse_json_response;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;
use crate::models::Transaction;

use super::trends::monthly_spending;

/// Default number of months to forecast
pub const DEFAULT_FORECAST_MONTHS: u32 = 3;

/// Expected spending for one future month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseForecast {
    /// `YYYY-MM`
    pub month: String,
    pub total_expected: f64,
    #[serde(default)]
    pub by_category: BTreeMap<String, f64>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    forecasts: Vec<ExpenseForecast>,
}

fn forecast_prompt(history: &BTreeMap<String, f64>, transaction_count: usize, months: u32) -> String {
    let lines: Vec<String> = history
        .iter()
        .map(|(month, amount)| format!("{}: {:.2}", month, amount))
        .collect();

    format!(
        "Analyze the spending history and forecast expenses for the next {months} months.\n\n\
         MONTHLY SPENDING HISTORY:\n{history}\n\n\
         TRANSACTIONS ANALYZED: {count}\n\n\
         Consider seasonal trends, recurring payments, historical variability and gradual changes.\n\n\
         Respond with JSON in this format:\n\
         {{\"forecasts\": [{{\"month\": \"2025-11\", \"totalExpected\": 45000, \
         \"byCategory\": {{\"food\": 8000, \"other\": 37000}}, \"confidence\": 0.8, \
         \"reasoning\": \"short explanation\"}}]}}\n\n\
         Respond with the JSON only.",
        months = months,
        history = lines.join("\n"),
        count = transaction_count,
    )
}

/// Forecast spending for the next `months` months.
///
/// Without a backend the forecast is empty. Backend and parse errors are
/// returned to the caller.
pub async fn forecast_expenses(
    ai: Option<&AIClient>,
    transactions: &[Transaction],
    months: u32,
) -> Result<Vec<ExpenseForecast>> {
    let Some(ai) = ai else {
        tracing::warn!("AI unavailable, forecasting disabled");
        return Ok(Vec::new());
    };

    let history = monthly_spending(transactions);
    tracing::debug!(
        months,
        history_months = history.len(),
        "Requesting expense forecast"
    );

    let response = ai
        .complete(&forecast_prompt(&history, transactions.len(), months))
        .await?;
    let parsed: ForecastResponse = parse_json_response(&response)?;

    let forecasts: Vec<ExpenseForecast> = parsed
        .forecasts
        .into_iter()
        .map(|mut f| {
            f.confidence = if f.confidence.is_finite() {
                f.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            f
        })
        .collect();

    tracing::info!(count = forecasts.len(), "Expense forecast generated");
    Ok(forecasts)
}
