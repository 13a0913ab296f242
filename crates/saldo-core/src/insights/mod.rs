//! Spending insights
//!
//! - **Categorization** - Places transactions in spending categories (needs AI)
//! - **Trends** - Monthly spending and month-over-month direction
//! - **Forecast** - Expected spending for the coming months (needs AI)
//! - **Context** - Balances, monthly income/expenses, top spending, recurring payments
//! - **Chat** - Questions about the user's money, with history (needs AI)
//! - **Recommendations** - Personalized advice from the context (needs AI)
//! - **Fraud** - Amount statistics and duplicate check; risk verdict needs AI
//!
//! AI-backed insights take an `Option<&AIClient>` and degrade when it is `None`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use saldo_core::insights::{analyze_spending_trends, forecast_expenses};
//!
//! let trends = analyze_spending_trends(&snapshot.transactions);
//! let forecast = forecast_expenses(ai.as_ref(), &snapshot.transactions, 3).await?;
//! ```

pub mod categorize;
pub mod chat;
pub mod context;
pub mod forecast;
pub mod fraud;
pub mod recommendations;
pub mod trends;

pub use categorize::{
    categorize_batch, categorize_transaction, CategorizationResult, TransactionCategory,
};
pub use chat::{chat, ChatMessage, ChatResponse, ChatRole, ChatSession};
pub use context::{FinancialContext, FinancialHealth, SpendingEntry};
pub use forecast::{forecast_expenses, ExpenseForecast, DEFAULT_FORECAST_MONTHS};
pub use fraud::{
    amount_stats, detect_fraud, find_duplicates, is_possible_duplicate, AmountStats, FraudAlert,
    RiskLevel,
};
pub use recommendations::{generate_recommendations, Impact, Recommendation};
pub use trends::{analyze_spending_trends, monthly_spending, SpendingTrend, TrendDirection};
