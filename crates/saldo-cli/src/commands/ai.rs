//! AI backend command

use anyhow::Result;
use chrono::Utc;
use saldo_core::models::{Currency, Transaction, TransactionType};
use saldo_core::{categorize_transaction, AIBackend, AIClient};

/// Show AI configuration, check connectivity and run a sample categorization
pub async fn cmd_ai(ai: Option<&AIClient>) -> Result<()> {
    println!("🔍 Checking AI backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());
    println!("  AI_BACKEND: {}", backend);
    match std::env::var("OPENAI_COMPATIBLE_HOST") {
        Ok(host) => println!("  OPENAI_COMPATIBLE_HOST: {}", host),
        Err(_) => println!("  ⚠️  OPENAI_COMPATIBLE_HOST not set"),
    }
    if std::env::var("OPENAI_COMPATIBLE_API_KEY").is_ok() {
        println!("  OPENAI_COMPATIBLE_API_KEY: ***");
    }

    let Some(client) = ai else {
        println!("\n⚠️  No AI backend configured. Categorization and forecasts are disabled.");
        println!("\nTo enable:");
        println!("  export OPENAI_COMPATIBLE_HOST=https://api.openai.com");
        println!("  export OPENAI_COMPATIBLE_API_KEY=sk-...");
        return Ok(());
    };

    println!("  Model: {}", client.model());
    println!("  Host: {}\n", client.host());

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {}", client.host());
        return Ok(());
    }

    println!("\n📋 Testing categorization...\n");
    for (description, amount) in [("NETFLIX.COM", 299.0), ("UBER TRIP", 350.0), ("FARMACIA CAROL", 845.5)] {
        let tx = Transaction {
            id: "sample".to_string(),
            account_id: "sample".to_string(),
            date: Utc::now(),
            description: description.to_string(),
            amount,
            currency: Currency::Dop,
            transaction_type: TransactionType::Charge,
            category_id: None,
            note: None,
        };

        print!("  \"{}\" → ", description);
        match categorize_transaction(Some(client), &tx).await {
            Ok(result) => println!("{} ({:.0}%)", result.category, result.confidence * 100.0),
            Err(e) => println!("❌ Error: {}", e),
        }
    }

    Ok(())
}
