//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Saldo - Recurring payments and financial calendar
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "Detect recurring payments and track card due dates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Snapshot file with accounts, transactions and recurring payments
    #[arg(long, default_value = "saldo.json", global = true)]
    pub data: PathBuf,

    /// Config file (defaults to the user config directory, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring payments in transaction history
    Detect {
        /// Ignore payments (income) when looking for recurring charges
        #[arg(long)]
        expenses_only: bool,
    },

    /// Show statement cuts, due dates and recurring payments around a month
    Calendar {
        /// Reference month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Months before the reference month
        #[arg(long)]
        before: Option<u32>,

        /// Months after the reference month
        #[arg(long)]
        after: Option<u32>,

        /// Only events for this account id
        #[arg(short, long)]
        account: Option<String>,

        /// Only accounts of this type: credit, debit, loan, service, rent
        #[arg(long = "type")]
        account_type: Option<String>,

        /// Only due and recurring events in this currency: DOP, USD
        #[arg(long)]
        currency: Option<String>,

        /// Leave detected recurring payments off the calendar
        #[arg(long)]
        no_detected: bool,
    },

    /// List events coming up in the next days
    Upcoming {
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,

        /// Days to look ahead
        #[arg(short, long, default_value = "30")]
        days: i64,

        /// Maximum number of events to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Categorize transactions with the AI backend
    Categorize {
        /// Only the N most recent transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show monthly spending and its trend
    Trends,

    /// Forecast spending for the coming months (requires AI backend)
    Forecast {
        /// Months to forecast
        #[arg(short, long, default_value = "3")]
        months: u32,
    },

    /// Ask the AI assistant a question about your finances
    Chat {
        /// The question
        question: String,

        /// Month the monthly figures refer to (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Personalized recommendations (requires AI backend)
    Recommend {
        /// Month the monthly figures refer to (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Amount statistics, possible duplicates and AI risk review
    Fraud {
        /// Review the N most recent transactions with the AI backend
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show AI backend configuration and check connectivity
    Ai,
}
