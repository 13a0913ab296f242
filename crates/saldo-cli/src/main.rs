//! Saldo CLI - Recurring payments and financial calendar
//!
//! Usage:
//!   saldo detect                      Detect recurring payments
//!   saldo calendar --month 2025-03    Cuts, due dates and recurring payments
//!   saldo upcoming --days 14          What is due soon
//!   saldo categorize --limit 20       Categorize recent transactions (AI)
//!   saldo trends                      Monthly spending trend
//!   saldo forecast --months 3         Expense forecast (AI)
//!   saldo chat "Can I save more?"     Ask the assistant (AI)
//!   saldo recommend                   Personalized recommendations (AI)
//!   saldo fraud --limit 10            Duplicates and risk review
//!   saldo ai                          Check the AI backend

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use saldo_core::AIClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Detect { expenses_only } => {
            commands::cmd_detect(&cli.data, config, expenses_only, cli.json)
        }
        Commands::Calendar {
            month,
            before,
            after,
            account,
            account_type,
            currency,
            no_detected,
        } => {
            let args = commands::CalendarArgs {
                month,
                before,
                after,
                account,
                account_type,
                currency,
                no_detected,
            };
            commands::cmd_calendar(&cli.data, config, &args, cli.json)
        }
        Commands::Upcoming { today, days, limit } => {
            commands::cmd_upcoming(&cli.data, config, today.as_deref(), days, limit, cli.json)
        }
        Commands::Categorize { limit } => {
            let ai = AIClient::from_env();
            commands::cmd_categorize(&cli.data, ai.as_ref(), limit, cli.json).await
        }
        Commands::Trends => commands::cmd_trends(&cli.data, cli.json),
        Commands::Forecast { months } => {
            let ai = AIClient::from_env();
            commands::cmd_forecast(&cli.data, ai.as_ref(), months, cli.json).await
        }
        Commands::Chat { question, month } => {
            let ai = AIClient::from_env();
            commands::cmd_chat(&cli.data, config, ai.as_ref(), &question, month.as_deref(), cli.json)
                .await
        }
        Commands::Recommend { month } => {
            let ai = AIClient::from_env();
            commands::cmd_recommend(&cli.data, config, ai.as_ref(), month.as_deref(), cli.json).await
        }
        Commands::Fraud { limit } => {
            let ai = AIClient::from_env();
            commands::cmd_fraud(&cli.data, ai.as_ref(), limit, cli.json).await
        }
        Commands::Ai => {
            let ai = AIClient::from_env();
            commands::cmd_ai(ai.as_ref()).await
        }
    }
}
