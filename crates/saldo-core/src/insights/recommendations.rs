//! Personalized recommendations

use serde::{Deserialize, Serialize};

use crate::ai::parsing::parse_json_response;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;

use super::context::FinancialContext;

/// Spending entries shown to the model
const PROMPT_TOP_SPENDING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub impact: Impact,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecommendationResponse {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
}

fn recommendation_prompt(context: &FinancialContext) -> String {
    let top: Vec<String> = context
        .top_spending
        .iter()
        .take(PROMPT_TOP_SPENDING)
        .map(|s| format!("- {}: {:.2}", s.name, s.amount))
        .collect();

    format!(
        "Review this user's finances and give 3-4 personalized, actionable recommendations.\n\n\
         FINANCES:\n\
         - Monthly income: {:.2}\n\
         - Monthly expenses: {:.2}\n\
         - Savings rate: {:.1}%\n\
         - Recurring payments: {}\n\n\
         TOP SPENDING:\n{}\n\n\
         ACCOUNTS: {}\n\
         TRANSACTIONS: {}\n\n\
         Respond with JSON in this format:\n\
         {{\"recommendations\": [{{\"title\": \"title\", \"description\": \"details\", \
         \"impact\": \"high|medium|low\", \"actionItems\": [\"step\"], \"estimatedSavings\": 5000}}]}}\n\n\
         Respond with the JSON only.",
        context.monthly_income,
        context.monthly_expenses,
        context.savings_rate * 100.0,
        context.recurring.len(),
        top.join("\n"),
        context.accounts_count,
        context.transactions_count,
    )
}

/// Recommendations for the given context.
///
/// Without a backend the list is empty. Backend and parse errors are returned
/// to the caller.
pub async fn generate_recommendations(
    ai: Option<&AIClient>,
    context: &FinancialContext,
) -> Result<Vec<Recommendation>> {
    let Some(ai) = ai else {
        tracing::warn!("AI unavailable, recommendations disabled");
        return Ok(Vec::new());
    };

    let response = ai.complete(&recommendation_prompt(context)).await?;
    let parsed: RecommendationResponse = parse_json_response(&response)?;

    tracing::info!(count = parsed.recommendations.len(), "Recommendations generated");
    Ok(parsed.recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use chrono::NaiveDate;

    fn context() -> FinancialContext {
        FinancialContext::build(&[], &[], Vec::new(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    }

    #[tokio::test]
    async fn test_without_ai_is_empty() {
        assert!(generate_recommendations(None, &context()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parses_recommendations() {
        let ai = AIClient::Mock(MockBackend::with_response(
            r#"{"recommendations": [
                {"title": "Cancel unused subscriptions", "impact": "high",
                 "actionItems": ["Review streaming services"], "estimatedSavings": 600},
                {"title": "Cook at home", "description": "Fewer restaurants", "impact": "medium"}
            ]}"#,
        ));
        let recommendations = generate_recommendations(Some(&ai), &context()).await.unwrap();
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].impact, Impact::High);
        assert_eq!(recommendations[0].estimated_savings, Some(600.0));
        assert_eq!(recommendations[1].estimated_savings, None);
        assert!(recommendations[1].action_items.is_empty());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let ai = AIClient::Mock(MockBackend::failing());
        assert!(generate_recommendations(Some(&ai), &context()).await.is_err());

        let garbage = AIClient::Mock(MockBackend::with_response("no json here"));
        assert!(generate_recommendations(Some(&garbage), &context()).await.is_err());
    }

    #[test]
    fn test_prompt_format() {
        let prompt = recommendation_prompt(&context());
        assert!(prompt.contains("\"recommendations\""));
        assert!(prompt.contains("Savings rate: 0.0%"));
    }
}
