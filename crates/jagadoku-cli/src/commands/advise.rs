//! AI advice command

use anyhow::Result;
use jagadoku_core::ai::{AIBackend, AIClient};
use jagadoku_core::AppContext;

use super::print_notifications;

pub async fn cmd_advise(ctx: &mut AppContext, ai: Option<&AIClient>) -> Result<()> {
    let Some(ai) = ai else {
        println!("🤖 No AI backend configured.");
        println!("   💡 Set GEMINI_API_KEY, or AI_BACKEND=ollama with OLLAMA_HOST");
        return Ok(());
    };

    if ctx.transactions().is_empty() {
        println!("   💡 No transactions yet; the advice will be generic");
    }

    println!("🤖 Asking {} ({})...", ai.backend_name(), ai.model());
    let result = ctx.advise(ai).await;
    print_notifications(ctx);
    let insight = result.inspect_err(|e| tracing::warn!("Advice request failed: {}", e))?;

    println!();
    println!("📋 Ringkasan");
    println!("   {}", insight.summary);

    println!();
    println!("💡 Tips Hemat");
    for (i, tip) in insight.saving_tips.iter().enumerate() {
        println!("   {}. {}", i + 1, tip);
    }

    println!();
    println!("📈 Rekomendasi Investasi");
    for advice in &insight.investment_advice {
        println!("   • {} (risiko: {})", advice.instrument, advice.risk_level);
        println!("     {}", advice.description);
    }

    Ok(())
}
