//! Factor listing command implementation.

use anyhow::Result;
use ronda_factors::{FactorCategory, available_factors};

/// List available factors, optionally filtered by category.
pub(crate) fn list_factors(category: Option<String>, verbose: bool, json: bool) -> Result<()> {
    let infos = available_factors();

    if json {
        let filtered: Vec<_> = infos
            .into_iter()
            .filter(|info| matches_category(info.category, category.as_deref()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Available Factors                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Group by category
    let categories = [
        FactorCategory::Volatility,
        FactorCategory::Liquidity,
        FactorCategory::Technical,
    ];

    for cat in categories {
        if !matches_category(cat, category.as_deref()) {
            continue;
        }
        let cat_factors: Vec<_> = infos.iter().filter(|info| info.category == cat).collect();
        if cat_factors.is_empty() {
            continue;
        }

        println!("{} ({}):", cat, cat.description());
        println!("{}", "-".repeat(60));

        for info in cat_factors {
            if verbose {
                println!(
                    "  {:20} - {} (lookback: {} days, aliases: {})",
                    info.name,
                    info.description,
                    info.lookback_days,
                    info.aliases.join(", ")
                );
            } else {
                println!("  {}", info.name);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for detailed factor descriptions.\n");
    }

    Ok(())
}

fn matches_category(cat: FactorCategory, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| cat.to_string().contains(&f.to_lowercase()))
}
