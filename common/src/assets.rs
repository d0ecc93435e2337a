use crate::error::DefiError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A registered asset: human-readable symbol, canonical mint address and the
/// token's decimal precision.
#[derive(Debug, Clone, Copy)]
pub struct AssetInfo {
    pub symbol: &'static str,
    pub mint: &'static str,
    pub decimals: u32,
}

// The supported token universe. Wrapped SOL stands in for native SOL so the
// whole table speaks SPL mints.
const REGISTERED_ASSETS: &[AssetInfo] = &[
    AssetInfo { symbol: "SOL", mint: "So11111111111111111111111111111111111111112", decimals: 9 },
    AssetInfo { symbol: "USDC", mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", decimals: 6 },
    AssetInfo { symbol: "USDT", mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", decimals: 6 },
    AssetInfo {
        symbol: "JITOSOL",
        mint: "J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn",
        decimals: 9,
    },
    AssetInfo { symbol: "BONK", mint: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", decimals: 5 },
    AssetInfo { symbol: "JUP", mint: "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", decimals: 6 },
];

// Lookup indexes built once on first use.
static SYMBOL_INDEX: OnceLock<HashMap<String, &'static AssetInfo>> = OnceLock::new();
static MINT_INDEX: OnceLock<HashMap<&'static str, &'static AssetInfo>> = OnceLock::new();

fn symbol_index() -> &'static HashMap<String, &'static AssetInfo> {
    SYMBOL_INDEX.get_or_init(|| {
        REGISTERED_ASSETS.iter().map(|asset| (asset.symbol.to_uppercase(), asset)).collect()
    })
}

fn mint_index() -> &'static HashMap<&'static str, &'static AssetInfo> {
    MINT_INDEX.get_or_init(|| REGISTERED_ASSETS.iter().map(|asset| (asset.mint, asset)).collect())
}

/// Resolve a currency symbol to its registered asset. Case-insensitive.
pub fn resolve_symbol(symbol: &str) -> Result<&'static AssetInfo, DefiError> {
    symbol_index()
        .get(&symbol.to_uppercase())
        .copied()
        .ok_or_else(|| DefiError::AssetNotFound(symbol.to_string()))
}

/// Look up the registered asset for a mint address.
pub fn asset_for_mint(mint: &str) -> Result<&'static AssetInfo, DefiError> {
    mint_index().get(mint).copied().ok_or_else(|| DefiError::AssetNotFound(mint.to_string()))
}

/// Exact inverse of [`resolve_symbol`] for every registered asset.
pub fn symbol_for_mint(mint: &str) -> Result<&'static str, DefiError> {
    asset_for_mint(mint).map(|asset| asset.symbol)
}

/// The full registered asset universe.
pub fn known_assets() -> impl Iterator<Item = &'static AssetInfo> {
    REGISTERED_ASSETS.iter()
}

/// Strip the "all" filter sentinel. "all" is an explicit no-filter marker,
/// not a real asset, and must never reach symbol resolution.
pub fn parse_asset_filter(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(symbol) if symbol.eq_ignore_ascii_case("all") => None,
        Some(symbol) => Some(symbol.to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_mint_round_trip() {
        for asset in known_assets() {
            let resolved = resolve_symbol(asset.symbol).unwrap();
            assert_eq!(resolved.mint, asset.mint);
            assert_eq!(symbol_for_mint(resolved.mint).unwrap(), asset.symbol);
        }
    }

    #[test]
    fn symbol_resolution_is_case_insensitive() {
        let upper = resolve_symbol("USDC").unwrap();
        let lower = resolve_symbol("usdc").unwrap();
        assert_eq!(upper.mint, lower.mint);
    }

    #[test]
    fn unknown_symbol_fails() {
        assert!(matches!(resolve_symbol("NOPE"), Err(DefiError::AssetNotFound(_))));
    }

    #[test]
    fn all_sentinel_means_no_filter() {
        assert_eq!(parse_asset_filter(Some("all")), None);
        assert_eq!(parse_asset_filter(Some("ALL")), None);
        assert_eq!(parse_asset_filter(Some("USDC")), Some("USDC".to_string()));
        assert_eq!(parse_asset_filter(None), None);
    }
}
