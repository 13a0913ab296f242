//! Financial context
//!
//! A compact summary of balances, this month's money in and out, top spending
//! and recurring payments. Chat and recommendations hand it to the language
//! model instead of raw transactions.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Account, Transaction, TransactionType};
use crate::recurring::RecurringItem;

/// Spending entries kept in `top_spending`
pub const TOP_SPENDING_LIMIT: usize = 10;

/// Overall health from the savings rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl FinancialHealth {
    /// 30% savings or more is excellent, 20% good, 10% fair, anything lower poor
    pub fn from_savings_rate(rate: f64) -> Self {
        if rate >= 0.3 {
            Self::Excellent
        } else if rate >= 0.2 {
            Self::Good
        } else if rate >= 0.1 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

/// Total charged for one description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingEntry {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialContext {
    /// `YYYY-MM` the monthly figures refer to
    pub month: String,
    /// Payments received in `month`
    pub monthly_income: f64,
    /// Charges in `month`
    pub monthly_expenses: f64,
    /// `(income - expenses) / income` for `month`, 0 without income
    pub savings_rate: f64,
    pub health: FinancialHealth,
    /// Primary plus secondary balances of every account
    pub total_balance: f64,
    /// Largest all-time charge totals by description, highest first
    pub top_spending: Vec<SpendingEntry>,
    pub recurring: Vec<RecurringItem>,
    pub accounts_count: usize,
    pub transactions_count: usize,
}

impl FinancialContext {
    /// Summarize accounts and transactions for the month containing `month`.
    pub fn build(
        accounts: &[Account],
        transactions: &[Transaction],
        recurring: Vec<RecurringItem>,
        month: NaiveDate,
    ) -> Self {
        let in_month = |t: &&Transaction| {
            t.date.year() == month.year() && t.date.month() == month.month()
        };

        let monthly_expenses: f64 = transactions
            .iter()
            .filter(in_month)
            .filter(|t| t.transaction_type == TransactionType::Charge)
            .map(|t| t.amount.abs())
            .sum();
        let monthly_income: f64 = transactions
            .iter()
            .filter(in_month)
            .filter(|t| t.transaction_type == TransactionType::Payment)
            .map(|t| t.amount)
            .sum();

        let savings_rate = if monthly_income > 0.0 {
            (monthly_income - monthly_expenses) / monthly_income
        } else {
            0.0
        };

        let total_balance = accounts
            .iter()
            .map(|a| a.balance_primary + a.balance_secondary.unwrap_or(0.0))
            .sum();

        Self {
            month: month.format("%Y-%m").to_string(),
            monthly_income,
            monthly_expenses,
            savings_rate,
            health: FinancialHealth::from_savings_rate(savings_rate),
            total_balance,
            top_spending: top_spending(transactions, TOP_SPENDING_LIMIT),
            recurring,
            accounts_count: accounts.len(),
            transactions_count: transactions.len(),
        }
    }

    /// Plain-text summary for prompts
    pub fn summary(&self) -> String {
        let recurring = if self.recurring.is_empty() {
            "none detected".to_string()
        } else {
            self.recurring
                .iter()
                .map(|r| {
                    format!(
                        "{} ({} on day {})",
                        r.name,
                        r.currency.format_amount(r.amount),
                        r.day
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let top = self
            .top_spending
            .iter()
            .map(|s| format!("{} ({:.2})", s.name, s.amount))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "- Month: {}\n\
             - Monthly income: {:.2}\n\
             - Monthly expenses: {:.2}\n\
             - Savings rate: {:.1}%\n\
             - Financial health: {}\n\
             - Total balance: {:.2}\n\
             - Accounts: {}\n\
             - Transactions: {}\n\
             - Recurring payments: {}\n\
             - Top spending: {}",
            self.month,
            self.monthly_income,
            self.monthly_expenses,
            self.savings_rate * 100.0,
            self.health.as_str(),
            self.total_balance,
            self.accounts_count,
            self.transactions_count,
            recurring,
            top,
        )
    }
}

/// Charge totals grouped by description, highest first (ties by name)
pub fn top_spending(transactions: &[Transaction], limit: usize) -> Vec<SpendingEntry> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Charge)
    {
        *totals.entry(tx.description.as_str()).or_insert(0.0) += tx.amount.abs();
    }

    let mut entries: Vec<SpendingEntry> = totals
        .into_iter()
        .map(|(name, amount)| SpendingEntry {
            name: name.to_string(),
            amount,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Currency};
    use chrono::{TimeZone, Utc};

    fn tx(day: (i32, u32, u32), description: &str, amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: format!("{}-{}", description, day.2),
            account_id: "a1".to_string(),
            date: Utc.with_ymd_and_hms(day.0, day.1, day.2, 12, 0, 0).unwrap(),
            description: description.to_string(),
            amount,
            currency: Currency::Dop,
            transaction_type: kind,
            category_id: None,
            note: None,
        }
    }

    fn account(balance: f64, secondary: Option<f64>) -> Account {
        Account {
            id: "a1".to_string(),
            name: "Visa".to_string(),
            bank: "BHD".to_string(),
            account_type: AccountType::Credit,
            currency_primary: Currency::Dop,
            balance_primary: balance,
            currency_secondary: secondary.map(|_| Currency::Usd),
            balance_secondary: secondary,
            cut_day: None,
            due_days_offset: None,
            limit_primary: None,
            notes: None,
        }
    }

    #[test]
    fn test_health_thresholds() {
        assert_eq!(FinancialHealth::from_savings_rate(0.3), FinancialHealth::Excellent);
        assert_eq!(FinancialHealth::from_savings_rate(0.25), FinancialHealth::Good);
        assert_eq!(FinancialHealth::from_savings_rate(0.1), FinancialHealth::Fair);
        assert_eq!(FinancialHealth::from_savings_rate(0.0), FinancialHealth::Poor);
        assert_eq!(FinancialHealth::from_savings_rate(-1.0), FinancialHealth::Poor);
    }

    #[test]
    fn test_build_monthly_figures() {
        let transactions = vec![
            tx((2025, 3, 1), "Salario", 50_000.0, TransactionType::Payment),
            tx((2025, 3, 5), "Supermercado", 20_000.0, TransactionType::Charge),
            tx((2025, 3, 9), "Supermercado", 15_000.0, TransactionType::Charge),
            tx((2025, 2, 5), "Netflix", 299.0, TransactionType::Charge),
            tx((2025, 3, 9), "Interes", 80.0, TransactionType::Interest),
        ];
        let accounts = vec![account(12_000.0, Some(100.0)), account(3_000.0, None)];

        let context = FinancialContext::build(
            &accounts,
            &transactions,
            Vec::new(),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
        );

        assert_eq!(context.month, "2025-03");
        assert_eq!(context.monthly_income, 50_000.0);
        assert_eq!(context.monthly_expenses, 35_000.0);
        assert!((context.savings_rate - 0.3).abs() < 1e-9);
        assert_eq!(context.total_balance, 15_100.0);
        assert_eq!(context.accounts_count, 2);
        assert_eq!(context.transactions_count, 5);
        assert_eq!(context.top_spending[0].name, "Supermercado");
        assert_eq!(context.top_spending[0].amount, 35_000.0);
        assert_eq!(context.top_spending.len(), 2);
    }

    #[test]
    fn test_no_income_means_zero_savings() {
        let transactions = vec![tx((2025, 3, 5), "Uber", 350.0, TransactionType::Charge)];
        let context = FinancialContext::build(
            &[],
            &transactions,
            Vec::new(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        assert_eq!(context.savings_rate, 0.0);
        assert_eq!(context.health, FinancialHealth::Poor);
    }

    #[test]
    fn test_top_spending_order_and_limit() {
        let transactions = vec![
            tx((2025, 3, 1), "B", 100.0, TransactionType::Charge),
            tx((2025, 3, 2), "A", 100.0, TransactionType::Charge),
            tx((2025, 3, 3), "C", 500.0, TransactionType::Charge),
            tx((2025, 3, 4), "D", 900.0, TransactionType::Payment),
        ];
        let top = top_spending(&transactions, 2);
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[test]
    fn test_summary_mentions_recurring() {
        let recurring = vec![RecurringItem {
            id: "gym".to_string(),
            name: "Gimnasio".to_string(),
            day: 10,
            amount: 1500.0,
            currency: Currency::Dop,
            detected: false,
        }];
        let context = FinancialContext::build(
            &[],
            &[],
            recurring,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        let summary = context.summary();
        assert!(summary.contains("Gimnasio (RD$1,500.00 on day 10)"));
        assert!(summary.contains("Financial health: poor"));
    }
}
