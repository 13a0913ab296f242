//! Insight command implementations (categorize, trends, forecast, chat, recommend, fraud)

use std::path::Path;

use anyhow::{Context, Result};
use saldo_core::{
    amount_stats, analyze_spending_trends, categorize_batch, chat, detect_fraud, find_duplicates,
    forecast_expenses, generate_recommendations, AIClient, AmountStats, FinancialContext,
    FraudAlert, Snapshot, TrendDirection,
};
use serde::Serialize;

use super::{load_settings, open_snapshot, parse_month, print_json, recurring_sources, today, truncate};

pub async fn cmd_categorize(
    data_path: &Path,
    ai: Option<&AIClient>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;

    let mut transactions = snapshot.transactions;
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }

    if !json {
        match ai {
            Some(client) => println!("🤖 Categorizing {} transactions with {}", transactions.len(), client.backend_name()),
            None => {
                println!("💡 Tip: Set OPENAI_COMPATIBLE_HOST to enable AI categorization");
            }
        }
    }

    let results = categorize_batch(ai, &transactions).await;

    if json {
        return print_json(&results);
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for (tx, result) in transactions.iter().zip(&results) {
        println!(
            "   {} {:28} │ {:<13} │ {:>3.0}%",
            tx.date.date_naive(),
            truncate(&result.description, 28),
            result.category.as_str(),
            result.confidence * 100.0
        );
    }

    Ok(())
}

pub fn cmd_trends(data_path: &Path, json: bool) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;
    let trends = analyze_spending_trends(&snapshot.transactions);

    if json {
        return print_json(&trends);
    }

    if trends.is_empty() {
        println!("No charges to analyze.");
        return Ok(());
    }

    println!();
    println!("📈 Monthly Spending");
    println!("   ─────────────────────────────");
    for trend in &trends {
        let icon = match trend.trend {
            TrendDirection::Increasing => "⬆️ ",
            TrendDirection::Stable => "➡️ ",
            TrendDirection::Decreasing => "⬇️ ",
        };
        println!("   {} │ {:>14.2} │ {} {}", trend.month, trend.amount, icon, trend.trend.as_str());
    }

    Ok(())
}

pub async fn cmd_forecast(
    data_path: &Path,
    ai: Option<&AIClient>,
    months: u32,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;

    if ai.is_none() && !json {
        println!("💡 Tip: Set OPENAI_COMPATIBLE_HOST to enable forecasts");
    }

    let forecasts = forecast_expenses(ai, &snapshot.transactions, months)
        .await
        .context("Forecast failed")?;

    if json {
        return print_json(&forecasts);
    }

    if forecasts.is_empty() {
        println!("No forecast available.");
        return Ok(());
    }

    println!();
    println!("🔮 Expense Forecast");
    println!("   ─────────────────────────────");
    for forecast in &forecasts {
        println!(
            "   {} │ {:>14.2} │ {:>3.0}% │ {}",
            forecast.month,
            forecast.total_expected,
            forecast.confidence * 100.0,
            forecast.reasoning
        );
        for (category, amount) in &forecast.by_category {
            println!("        {:20} {:>12.2}", category, amount);
        }
    }

    Ok(())
}

/// Context for the month `month` (YYYY-MM) or the current one, with declared and
/// detected recurring payments
fn financial_context(
    snapshot: &Snapshot,
    config_path: Option<&Path>,
    month: Option<&str>,
) -> Result<FinancialContext> {
    let settings = load_settings(config_path)?;
    let month = match month {
        Some(month) => parse_month(month)?,
        None => today(),
    };

    let recurring = recurring_sources(snapshot, &settings, true)
        .iter()
        .filter_map(|s| s.to_item_with_confidence(settings.calendar.min_pattern_confidence))
        .collect();

    Ok(FinancialContext::build(
        &snapshot.accounts,
        &snapshot.transactions,
        recurring,
        month,
    ))
}

pub async fn cmd_chat(
    data_path: &Path,
    config_path: Option<&Path>,
    ai: Option<&AIClient>,
    question: &str,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Question must not be empty");
    }

    let snapshot = open_snapshot(data_path)?;
    let context = financial_context(&snapshot, config_path, month)?;

    let response = chat(ai, Some(&context), question)
        .await
        .context("Chat failed")?;

    if json {
        return print_json(&response);
    }

    println!();
    println!("💬 {}", response.message);
    if !response.suggested_follow_ups.is_empty() {
        println!();
        println!("   You could also ask:");
        for follow_up in &response.suggested_follow_ups {
            println!("   • {}", follow_up);
        }
    }

    Ok(())
}

pub async fn cmd_recommend(
    data_path: &Path,
    config_path: Option<&Path>,
    ai: Option<&AIClient>,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;
    let context = financial_context(&snapshot, config_path, month)?;

    if ai.is_none() && !json {
        println!("💡 Tip: Set OPENAI_COMPATIBLE_HOST to enable recommendations");
    }

    let recommendations = generate_recommendations(ai, &context)
        .await
        .context("Recommendations failed")?;

    if json {
        return print_json(&recommendations);
    }

    println!();
    println!(
        "🩺 {} │ savings rate {:.1}% │ health: {}",
        context.month,
        context.savings_rate * 100.0,
        context.health.as_str()
    );

    if recommendations.is_empty() {
        println!("   No recommendations.");
        return Ok(());
    }

    for rec in &recommendations {
        println!();
        println!("   [{}] {}", rec.impact.as_str(), rec.title);
        if !rec.description.is_empty() {
            println!("   {}", rec.description);
        }
        for item in &rec.action_items {
            println!("     - {}", item);
        }
        if let Some(savings) = rec.estimated_savings {
            println!("     Estimated savings: {:.2}", savings);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct FraudReport {
    stats: AmountStats,
    duplicates: Vec<(String, String)>,
    alerts: Vec<FraudAlert>,
}

pub async fn cmd_fraud(
    data_path: &Path,
    ai: Option<&AIClient>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let snapshot = open_snapshot(data_path)?;
    let stats = amount_stats(&snapshot.transactions);
    let duplicates = find_duplicates(&snapshot.transactions);

    let mut recent: Vec<_> = snapshot.transactions.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let mut alerts = Vec::new();
    if ai.is_some() {
        for tx in recent.into_iter().take(limit) {
            if let Some(alert) = detect_fraud(ai, tx, &snapshot.transactions)
                .await
                .context("Fraud review failed")?
            {
                alerts.push(alert);
            }
        }
    } else if !json {
        println!("💡 Tip: Set OPENAI_COMPATIBLE_HOST to enable the AI risk review");
    }

    if json {
        return print_json(&FraudReport {
            stats,
            duplicates,
            alerts,
        });
    }

    println!();
    println!("🔎 Amounts over {} transactions", stats.count);
    println!(
        "   mean {:.2} │ min {:.2} │ max {:.2} │ std dev {:.2}",
        stats.mean, stats.min, stats.max, stats.std_dev
    );

    println!();
    if duplicates.is_empty() {
        println!("✅ No possible duplicates");
    } else {
        println!("⚠️  {} possible duplicates", duplicates.len());
        for (first, second) in &duplicates {
            println!("   {} ↔ {}", first, second);
        }
    }

    for alert in &alerts {
        println!();
        println!(
            "🚨 [{}] {}",
            alert.risk_level.as_str(),
            truncate(&alert.description, 40)
        );
        for reason in &alert.reasons {
            println!("   - {}", reason);
        }
        if !alert.recommendation.is_empty() {
            println!("   → {}", alert.recommendation);
        }
    }

    Ok(())
}
