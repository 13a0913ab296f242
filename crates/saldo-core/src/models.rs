//! Domain models for Saldo

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Dominican peso
    Dop,
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dop => "DOP",
            Self::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Dop => "RD$",
            Self::Usd => "$",
        }
    }

    /// Format an amount with the currency symbol, two decimals and thousands separators.
    /// Negative amounts keep a leading sign: `-RD$1,500.00`.
    pub fn format_amount(&self, amount: f64) -> String {
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = (cents / 100).to_string();
        let frac = cents % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, self.symbol(), grouped, frac)
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DOP" | "RD$" => Ok(Self::Dop),
            "USD" | "$" => Ok(Self::Usd),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Charge,
    Payment,
    Fee,
    Interest,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Payment => "payment",
            Self::Fee => "fee",
            Self::Interest => "interest",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "charge" => Ok(Self::Charge),
            "payment" => Ok(Self::Payment),
            "fee" => Ok(Self::Fee),
            "interest" => Ok(Self::Interest),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// A transaction as supplied by the transaction store (read-only to the core)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Owning account (lookup only)
    pub account_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    /// Magnitude; direction is carried by `transaction_type`
    pub amount: f64,
    pub currency: Currency,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Charges, fees and interest are money going out; payments are money coming in.
    pub fn is_expense(&self) -> bool {
        !matches!(self.transaction_type, TransactionType::Payment)
    }
}

/// Account kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Credit,
    Debit,
    Loan,
    Service,
    Rent,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Loan => "loan",
            Self::Service => "service",
            Self::Rent => "rent",
        }
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "loan" => Ok(Self::Loan),
            "service" => Ok(Self::Service),
            "rent" => Ok(Self::Rent),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account metadata as supplied by the account store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bank: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub currency_primary: Currency,
    #[serde(default)]
    pub balance_primary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_secondary: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_secondary: Option<f64>,
    /// Day of month the statement closes (1-31, not validated here)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_day: Option<u32>,
    /// Days from the cut day until payment is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_days_offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_primary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A recurring payment declared by the user (as opposed to one detected from history)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub id: String,
    pub name: String,
    /// Day of month (1-31)
    pub day: u32,
    pub amount: f64,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Recurrence frequency inferred from the average interval between occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A periodic payment inferred from transaction history.
///
/// Recomputed on every detection run; it has no identity or persistence of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPattern {
    /// Normalized grouping key (trimmed, lowercased description)
    pub description: String,
    /// Rounded mean of the absolute amounts in the group
    pub amount: f64,
    pub frequency: Frequency,
    /// In [0, 1]
    pub confidence: f64,
    pub last_seen: NaiveDate,
    /// Currency of the most recent occurrence
    pub currency: Currency,
    pub occurrences: usize,
    pub average_interval_days: f64,
}

/// Kind of calendar event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarEventKind {
    /// Statement cut
    Cut,
    /// Payment due
    Due,
    /// Recurring payment expected
    Recurring,
}

impl CalendarEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Due => "due",
            Self::Recurring => "recurring",
        }
    }
}

/// How an event should be labeled for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    Cut,
    Due,
    Recurring,
    Paid,
}

impl DisplayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Due => "due",
            Self::Recurring => "recurring",
            Self::Paid => "paid",
        }
    }
}

/// A calendar-relevant financial event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable id built from (kind, source id, year, month)
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub is_paid: bool,
}

impl CalendarEvent {
    /// Paid due/recurring events are shown as "paid"; the stored kind and date stay as computed.
    pub fn display_kind(&self) -> DisplayKind {
        match (self.kind, self.is_paid) {
            (CalendarEventKind::Cut, _) => DisplayKind::Cut,
            (CalendarEventKind::Due, true) | (CalendarEventKind::Recurring, true) => {
                DisplayKind::Paid
            }
            (CalendarEventKind::Due, false) => DisplayKind::Due,
            (CalendarEventKind::Recurring, false) => DisplayKind::Recurring,
        }
    }
}
