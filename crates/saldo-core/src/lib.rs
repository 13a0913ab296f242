//! Saldo Core Library
//!
//! Shared functionality for the Saldo personal finance tool:
//! - Recurring payment detection from unlabeled transaction history
//! - Financial calendar of statement cuts, due dates and recurring payments,
//!   reconciled against actual transactions
//! - Pluggable language-model backends (OpenAI-compatible, mock)
//! - Spending insights: categorization, trends, forecasting, chat,
//!   recommendations and suspicious transaction review
//! - Layered TOML configuration and JSON snapshots

pub mod ai;
pub mod calendar;
pub mod config;
pub mod detect;
pub mod error;
pub mod insights;
pub mod models;
pub mod recurring;
pub mod snapshot;

/// Test utilities including fixtures and a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OpenAICompatibleBackend};
pub use calendar::{
    build_calendar_events, upcoming_events, CalendarConfig, CalendarFilters, MAX_WINDOW_MONTHS,
};
pub use config::Settings;
pub use detect::{detect_recurring_patterns, DetectionConfig, RecurringDetector};
pub use error::{Error, Result};
pub use insights::{
    amount_stats, analyze_spending_trends, categorize_batch, categorize_transaction, chat,
    detect_fraud, find_duplicates, forecast_expenses, generate_recommendations, monthly_spending,
    AmountStats, CategorizationResult, ChatResponse, ChatSession, ExpenseForecast,
    FinancialContext, FinancialHealth, FraudAlert, Recommendation, RiskLevel, SpendingTrend,
    TransactionCategory, TrendDirection,
};
pub use models::*;
pub use recurring::{detected_id, merge_sources, RecurringItem, RecurringSource};
pub use snapshot::Snapshot;
