use common::assets::AssetInfo;
use common::token_amount::TokenAmount;
use common::{
    BalanceEntry, BalanceKind, DefiError, Position, PositionSide, TokenBalance,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Convert provider positions into the normalized output shape, one entry
/// per position.
pub fn positions_to_entries(positions: &[Position]) -> Result<Vec<BalanceEntry>, DefiError> {
    positions
        .iter()
        .map(|position| {
            let amount =
                TokenAmount::from_raw(position.amount, position.mint_decimals).format()?;
            Ok(BalanceEntry {
                mint: position.mint.clone(),
                symbol: position.symbol.clone(),
                amount,
                value: format_decimal(position.market_value),
                kind: Some(match position.side {
                    PositionSide::Deposit => BalanceKind::Deposit,
                    PositionSide::Borrow => BalanceKind::Borrow,
                }),
            })
        })
        .collect()
}

/// Convert raw token balances into wallet entries, valuing each against the
/// loaded market prices. Unpriced mints value at zero.
pub fn token_balances_to_entries(
    balances: &[TokenBalance],
    prices: &HashMap<String, Decimal>,
) -> Result<Vec<BalanceEntry>, DefiError> {
    balances
        .iter()
        .map(|balance| {
            let display = TokenAmount::from_raw(balance.amount, balance.decimals).to_display()?;
            let value = prices
                .get(&balance.mint)
                .and_then(|price| display.checked_mul(*price))
                .unwrap_or(Decimal::ZERO);
            Ok(BalanceEntry {
                mint: balance.mint.clone(),
                symbol: balance.symbol.clone(),
                amount: format_decimal(display),
                value: format_decimal(value),
                kind: Some(BalanceKind::Wallet),
            })
        })
        .collect()
}

/// The "asset exists, balance is zero" entry synthesized when a filtered
/// lending query comes back empty.
pub fn zero_entry(asset: &AssetInfo, kind: Option<BalanceKind>) -> BalanceEntry {
    BalanceEntry {
        mint: asset.mint.to_string(),
        symbol: asset.symbol.to_string(),
        amount: "0".to_string(),
        value: "0".to_string(),
        kind,
    }
}
