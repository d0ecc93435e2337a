use async_trait::async_trait;
use common::assets::AssetInfo;
use common::{
    BalanceEntry, BasketInfo, LendingSnapshot, OperationResult, Position, ProviderError,
    TokenBalance,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Read access to a lending market's positions for one wallet.
///
/// An optional mint filter scopes the result to a single asset. Every call is
/// a fresh network round-trip; adapters do not cache.
#[async_trait]
pub trait LendingProvider: Send + Sync {
    async fn depositions(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError>;

    async fn borrows(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError>;

    async fn combined(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<LendingSnapshot, ProviderError>;

    /// Current mint → display price map for the assets the markets cover.
    async fn market_prices(&self) -> Result<HashMap<String, Decimal>, ProviderError> {
        Ok(HashMap::new())
    }

    fn protocol_name(&self) -> &'static str;
}

/// Direct DeFi actions against one provider. Each method returns the
/// provider-built unsigned transaction unchanged.
#[async_trait]
pub trait OperationProvider: Send + Sync {
    async fn supply(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;

    async fn borrow(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;

    async fn repay(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;

    async fn withdraw(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;

    fn provider_name(&self) -> &'static str;
}

/// Token-account balances for one wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Fetch balances for `assets`, scoped to `filter_mints` when non-empty.
    /// An empty filter list means the whole known-asset universe.
    async fn token_balances(
        &self,
        wallet: &str,
        assets: &[AssetInfo],
        filter_mints: &[String],
    ) -> Result<Vec<TokenBalance>, ProviderError>;
}

/// Index-fund style basket holdings and deposits.
#[async_trait]
pub trait BasketProvider: Send + Sync {
    async fn all_baskets(&self) -> Result<Vec<BasketInfo>, ProviderError>;

    async fn wallet_baskets(
        &self,
        wallet: &str,
        rpc_endpoint: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<BalanceEntry>, ProviderError>;

    async fn deposit(
        &self,
        wallet: &str,
        basket_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;
}

/// Token swaps through a DEX aggregator.
#[async_trait]
pub trait SwapProvider: Send + Sync {
    async fn swap(
        &self,
        wallet: &str,
        from_mint: &str,
        to_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError>;
}
