//! AI backend connectivity test

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use finhabits_core::aggregate::compare_months;
use finhabits_core::ai::{AIBackend, AIClient, InsightPrompt};
use finhabits_core::config::{AiBackendKind, AiConfig};
use finhabits_core::models::{HabitSummary, MonetaryRecord};
use finhabits_core::Money;

use super::today;

pub async fn cmd_ai_test(config: &AiConfig) -> Result<()> {
    println!("🔍 Testing AI backend...\n");
    println!("  Backend: {:?}", config.backend);

    let Some(client) = AIClient::from_config(config) else {
        match config.backend {
            AiBackendKind::None => println!("  ℹ️  AI features are disabled (backend = \"none\")"),
            AiBackendKind::Gemini => {
                println!("  ⚠️  GEMINI_API_KEY not set");
                println!("\nTo enable AI insights:");
                println!("  1. Create a key at https://aistudio.google.com/apikey");
                println!("  2. Set environment variable: export GEMINI_API_KEY=...");
            }
            _ => println!("  ⚠️  AI backend is not fully configured"),
        }
        return Ok(());
    };

    run_ai_test(&client, today()).await
}

/// A month of made-up numbers for exercising the insight prompt
pub fn sample_prompt(today: NaiveDate) -> Result<InsightPrompt> {
    let this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", today))?;
    let last_month = this_month
        .pred_opt()
        .ok_or_else(|| anyhow::anyhow!("No month before {}", this_month))?;

    let expenses = vec![
        MonetaryRecord::new(Money::from_major(1200), "food", this_month),
        MonetaryRecord::new(Money::from_major(450), "transport", this_month),
        MonetaryRecord::new(Money::from_major(800), "entertainment", this_month),
        MonetaryRecord::new(Money::from_major(1500), "food", last_month),
    ];
    let income = vec![
        MonetaryRecord::new(Money::from_major(5000), "Monthly Allowance", this_month),
        MonetaryRecord::new(Money::from_major(5000), "Monthly Allowance", last_month),
    ];

    Ok(InsightPrompt {
        comparison: compare_months(today.year(), today.month(), &expenses, &income)?,
        habits: vec![
            HabitSummary {
                name: "Study".to_string(),
                completed_days: 20,
                tracked_days: 24,
            },
            HabitSummary {
                name: "Exercise".to_string(),
                completed_days: 6,
                tracked_days: 15,
            },
        ],
    })
}

pub async fn run_ai_test(client: &AIClient, today: NaiveDate) -> Result<()> {
    println!("  Host:    {}", client.host());
    println!("  Model:   {}\n", client.model());

    print!("Checking AI availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach the AI backend at {}", client.host());
        return Ok(());
    }

    println!("\n📋 Requesting a sample monthly insight...\n");
    match client.generate_insights(&sample_prompt(today)?).await {
        Ok(narrative) => {
            println!("  Summary:    {}", narrative.summary);
            println!("  Comparison: {}", narrative.comparison);
            for suggestion in &narrative.suggestions {
                println!("  • {}", suggestion);
            }
        }
        Err(e) => {
            println!("  ❌ Error: {}", e);
        }
    }

    println!("\n💬 Asking the advisor a sample question...\n");
    let context = "USER'S FINANCIAL DATA (Last 3 months):\n- Total Income: ₹15000.00\n- Total Expenses: ₹9800.00";
    match client
        .answer_question(context, "How much can I save each month?")
        .await
    {
        Ok(answer) => println!("  {}", answer),
        Err(e) => println!("  ❌ Error: {}", e),
    }

    println!("\n✅ AI test complete");
    Ok(())
}
