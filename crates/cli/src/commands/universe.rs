//! Universe CLI command: lists the configured assets.

use anyhow::Result;
use clap::Args;
use flowvalue_core::AssetDef;

/// Arguments for the universe command.
#[derive(Args, Debug, Clone)]
pub struct UniverseArgs {
    /// Config file path
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Runs the universe command.
///
/// # Errors
/// Returns an error if configuration cannot be loaded.
pub fn run_universe(args: &UniverseArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    print!("{}", format_universe(&config.universe));
    Ok(())
}

#[must_use]
pub fn format_universe(universe: &[AssetDef]) -> String {
    let mut lines = vec![
        format!(
            "{:<10} {:<30} {:<7} {:<10} {:<4} {:<4}",
            "ID", "NAME", "CLS", "SYMBOL", "CCY", "CONV"
        ),
        "-".repeat(70),
    ];
    for asset in universe {
        let conv = if asset.price_to_usd.is_some() { "JPY" } else { "-" };
        lines.push(format!(
            "{:<10} {:<30} {:<7} {:<10} {:<4} {:<4}",
            asset.id, asset.name, asset.cls, asset.symbol, asset.currency, conv
        ));
    }
    lines.push(format!("{} assets", universe.len()));

    super::join_lines(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowvalue_core::default_universe;

    #[test]
    fn lists_every_asset_with_conversion_flag() {
        let universe = default_universe();
        let text = format_universe(&universe);
        assert!(text.contains("NIKKEI"));
        assert!(text.contains("^GSPC"));
        assert!(text.ends_with(&format!("{} assets\n", universe.len())));

        let nikkei = text.lines().find(|l| l.starts_with("NIKKEI")).unwrap();
        assert!(nikkei.contains("JPY"));
    }
}
