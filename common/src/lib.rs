use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub mod assets;
pub mod error;
pub mod token_amount;
pub use error::*;

/// Which side of a lending market a position sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Deposit,
    Borrow,
}

/// A stake reported by a lending provider for one wallet/asset pair.
///
/// Positions are fetched fresh on every request and live only for the
/// duration of a single aggregation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub mint: String,
    pub mint_decimals: u32,
    /// Raw token amount in minor units.
    pub amount: u64,
    /// Market value of the position, display-scaled.
    pub market_value: Decimal,
    pub protocol_name: String,
    pub market_name: String,
    pub side: PositionSide,
}

/// Deposit and borrow positions fetched together from one lending provider.
#[derive(Debug, Clone, Default)]
pub struct LendingSnapshot {
    pub deposits: Vec<Position>,
    pub borrows: Vec<Position>,
}

/// Tag describing where a balance entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceKind {
    Deposit,
    Borrow,
    Wallet,
    Basket,
}

/// The normalized output unit of a balance query.
///
/// Amounts are display-scaled decimal strings and always magnitudes; the
/// `kind` tag conveys direction. An absent kind means the entry was produced
/// under the combined operation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub mint: String,
    pub symbol: String,
    pub amount: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<BalanceKind>,
}

/// Represents a token balance for a specific wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Token symbol (e.g., "USDC")
    pub symbol: String,
    /// Mint address of the token
    pub mint: String,
    /// Raw token amount (needs to be divided by 10^decimals for human-readable form)
    pub amount: u64,
    /// Number of decimal places for this token
    pub decimals: u32,
    /// Token account address that holds this balance
    pub token_account: String,
}

/// An index-fund style basket listed by the basket provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketInfo {
    pub name: String,
    pub symbol: String,
    pub fund_mint: String,
    pub tvl: Decimal,
}

/// The outcome of a DeFi action: an unsigned transaction built by the
/// provider, ready to be handed to the signing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub provider: String,
    pub operation: String,
    pub mint: String,
    pub amount: u64,
    /// Base64-encoded unsigned transaction.
    pub transaction: String,
}

/// Which provider group(s) a balance query targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum BalanceProvider {
    Lending,
    Wallet,
    Basket,
    All,
}

/// Which operation view a balance query asks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum BalanceOperation {
    Deposited,
    Borrowed,
    All,
}

/// Providers that can execute direct DeFi operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum DefiProvider {
    Kamino,
    Symmetry,
    Jupiter,
}

/// Direct lending-market operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum DefiOperation {
    Supply,
    Borrow,
    Repay,
    Withdraw,
}

/// Basket-provider operations. Only deposits are supported today.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum BasketOperation {
    Deposit,
    Withdraw,
}

/// A balance query, with the asset filter already stripped of the "all"
/// sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub wallet: String,
    pub provider: BalanceProvider,
    pub operation: BalanceOperation,
    /// Optional symbol filter. `None` means no filter.
    pub asset: Option<String>,
}

impl BalanceRequest {
    /// Build a request, treating a literal "all" filter as no filter.
    pub fn new(
        wallet: impl Into<String>,
        provider: BalanceProvider,
        operation: BalanceOperation,
        asset: Option<&str>,
    ) -> Self {
        Self {
            wallet: wallet.into(),
            provider,
            operation,
            asset: assets::parse_asset_filter(asset),
        }
    }
}
