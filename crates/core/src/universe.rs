//! Default cross-asset universe.

use crate::error::ParamsError;
use crate::market::{AssetDef, Currency};
use std::collections::HashSet;

/// Returns the default universe: FX, Treasuries, equity indices, commodities,
/// crypto and REITs. Japanese listings are converted to USD before scoring.
#[must_use]
pub fn default_universe() -> Vec<AssetDef> {
    use Currency::Usd;

    vec![
        AssetDef::new("USD", "US Dollar (UUP)", "FX", "UUP", Usd),
        AssetDef::new("EUR", "Euro (FXE)", "FX", "FXE", Usd),
        AssetDef::new("JPY", "Japanese Yen (FXY)", "FX", "FXY", Usd),
        AssetDef::new("UST_0_3", "US Treas 0-3Y (SHY)", "BOND", "SHY", Usd),
        AssetDef::new("UST_3_7", "US Treas 3-7Y (IEI)", "BOND", "IEI", Usd),
        AssetDef::new("UST_20P", "US Treas 20Y+ (TLT)", "BOND", "TLT", Usd),
        AssetDef::new("SPX", "S&P 500 (^GSPC)", "EQ", "^GSPC", Usd),
        AssetDef::new("NASDAQ", "NASDAQ (^IXIC)", "EQ", "^IXIC", Usd),
        AssetDef::new("RUSSELL", "Russell 2000 (^RUT)", "EQ", "^RUT", Usd),
        AssetDef::new("NIKKEI", "Nikkei 225 (^N225)", "EQ", "^N225", Usd).with_jpy_conversion(),
        AssetDef::new("TOPIX", "TOPIX ETF (1306.T)", "EQ", "1306.T", Usd).with_jpy_conversion(),
        AssetDef::new("GOLD", "Gold (GLD)", "CMD", "GLD", Usd),
        AssetDef::new("OIL", "WTI (USO)", "CMD", "USO", Usd),
        AssetDef::new("BTC", "Bitcoin (BTC-USD)", "CRYPTO", "BTC-USD", Usd),
        AssetDef::new("JP_REIT", "JP REIT (1343.T)", "REIT", "1343.T", Usd).with_jpy_conversion(),
        AssetDef::new("US_REIT", "US REIT (VNQ)", "REIT", "VNQ", Usd),
    ]
}

/// Checks that asset ids are unique.
///
/// # Errors
/// Returns [`ParamsError::DuplicateAssetId`] for the first repeated id.
pub fn validate_universe(universe: &[AssetDef]) -> Result<(), ParamsError> {
    let mut seen = HashSet::with_capacity(universe.len());
    for asset in universe {
        if !seen.insert(asset.id.as_str()) {
            return Err(ParamsError::DuplicateAssetId(asset.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceConversion;

    #[test]
    fn default_universe_has_unique_ids() {
        let universe = default_universe();
        assert_eq!(universe.len(), 16);
        assert!(validate_universe(&universe).is_ok());
    }

    #[test]
    fn japanese_listings_convert_to_usd() {
        let converted: Vec<_> = default_universe()
            .into_iter()
            .filter(|a| a.price_to_usd == Some(PriceConversion::Jpy))
            .map(|a| a.id)
            .collect();
        assert_eq!(converted, vec!["NIKKEI", "TOPIX", "JP_REIT"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut universe = default_universe();
        universe.push(universe[0].clone());
        assert_eq!(
            validate_universe(&universe),
            Err(ParamsError::DuplicateAssetId("USD".to_string()))
        );
    }

    #[test]
    fn empty_universe_is_valid() {
        assert!(validate_universe(&[]).is_ok());
    }
}
