use crate::aggregator::client::DefiAggregator;
use crate::common::provider::{BasketProvider, OperationProvider, SwapProvider};
use crate::common::rpc_utils;
use common::assets;
use common::token_amount::TokenAmount;
use common::{
    BasketInfo, BasketOperation, DefiError, DefiOperation, DefiProvider, OperationResult,
};
use log::info;
use rust_decimal::Decimal;

impl DefiAggregator {
    /// Route a DeFi action to the one registered adapter for `provider`.
    ///
    /// The symbol is resolved before any adapter is touched, the display
    /// amount is converted by the asset's precision, and the adapter's
    /// result passes through unchanged.
    pub async fn perform_operation(
        &self,
        wallet: &str,
        operation: DefiOperation,
        provider: DefiProvider,
        symbol: &str,
        amount: Decimal,
    ) -> Result<OperationResult, DefiError> {
        let asset = assets::resolve_symbol(symbol)?;
        let adapter = self
            .operations
            .get(&provider)
            .ok_or_else(|| DefiError::ProviderNotSupported(provider.to_string()))?;

        let raw = TokenAmount::new(amount, asset.decimals, false).to_raw()?;
        info!("Dispatching {operation} of {amount} {symbol} on {provider} for {wallet}");

        let result = match operation {
            DefiOperation::Supply => adapter.supply(wallet, asset.mint, raw).await?,
            DefiOperation::Borrow => adapter.borrow(wallet, asset.mint, raw).await?,
            DefiOperation::Repay => adapter.repay(wallet, asset.mint, raw).await?,
            DefiOperation::Withdraw => adapter.withdraw(wallet, asset.mint, raw).await?,
        };

        Ok(result)
    }

    /// Swap between two registered assets through the DEX aggregator.
    pub async fn swap_tokens(
        &self,
        wallet: &str,
        from_symbol: &str,
        to_symbol: &str,
        amount: Decimal,
    ) -> Result<OperationResult, DefiError> {
        let from = assets::resolve_symbol(from_symbol)?;
        let to = assets::resolve_symbol(to_symbol)?;

        let raw = TokenAmount::new(amount, from.decimals, false).to_raw()?;
        info!("Swapping {amount} {from_symbol} into {to_symbol} for {wallet}");

        Ok(self.swap.swap(wallet, from.mint, to.mint, raw).await?)
    }

    /// List every basket the basket provider offers.
    pub async fn get_baskets(&self) -> Result<Vec<BasketInfo>, DefiError> {
        Ok(self.baskets.all_baskets().await?)
    }

    /// Execute a basket operation. Basket mints live outside the registry,
    /// so their precision comes from the chain.
    pub async fn basket_operation(
        &self,
        wallet: &str,
        basket_mint: &str,
        amount: Decimal,
        operation: BasketOperation,
    ) -> Result<OperationResult, DefiError> {
        match operation {
            BasketOperation::Deposit => {
                let supply = rpc_utils::token_supply(&self.rpc_url, basket_mint)?;
                let raw = TokenAmount::new(amount, supply.decimals, false).to_raw()?;
                info!("Depositing {amount} into basket {basket_mint} for {wallet}");
                Ok(self.baskets.deposit(wallet, basket_mint, raw).await?)
            }
            other => Err(DefiError::OperationNotSupported(other.to_string())),
        }
    }
}
