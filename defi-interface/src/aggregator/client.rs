use crate::common::provider::{
    BasketProvider, LendingProvider, OperationProvider, SwapProvider, WalletProvider,
};
use crate::jupiter::JupiterClient;
use crate::kamino::KaminoClient;
use crate::symmetry::SymmetryClient;
use crate::wallet::WalletClient;
use common::assets::{self, AssetInfo};
use common::{DefiError, DefiProvider};
use log::info;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// The multi-provider engine: one adapter per integration, plus a
/// registration table for providers that support direct operations.
pub struct DefiAggregator {
    /// The supported asset universe, snapshotted from the registry.
    pub assets: Vec<AssetInfo>,
    pub rpc_url: String,
    pub(crate) lending: Arc<dyn LendingProvider>,
    pub(crate) wallet: Arc<dyn WalletProvider>,
    pub(crate) baskets: Arc<dyn BasketProvider>,
    pub(crate) swap: Arc<dyn SwapProvider>,
    pub(crate) operations: HashMap<DefiProvider, Arc<dyn OperationProvider>>,
    pub(crate) prices: Arc<HashMap<String, Decimal>>,
}

impl DefiAggregator {
    pub fn new(rpc_url: &str) -> Self {
        let kamino = Arc::new(KaminoClient::new(rpc_url));

        // Only the lending provider executes direct operations today; wiring
        // up another provider is an entry here, not a new code path.
        let mut operations: HashMap<DefiProvider, Arc<dyn OperationProvider>> = HashMap::new();
        operations.insert(DefiProvider::Kamino, kamino.clone() as Arc<dyn OperationProvider>);

        Self::with_providers(
            kamino,
            Arc::new(WalletClient::new(rpc_url)),
            Arc::new(SymmetryClient::new()),
            Arc::new(JupiterClient::new()),
            operations,
            rpc_url,
        )
    }

    /// Assemble an aggregator from explicit providers.
    pub fn with_providers(
        lending: Arc<dyn LendingProvider>,
        wallet: Arc<dyn WalletProvider>,
        baskets: Arc<dyn BasketProvider>,
        swap: Arc<dyn SwapProvider>,
        operations: HashMap<DefiProvider, Arc<dyn OperationProvider>>,
        rpc_url: &str,
    ) -> Self {
        Self {
            assets: assets::known_assets().copied().collect(),
            rpc_url: rpc_url.to_string(),
            lending,
            wallet,
            baskets,
            swap,
            operations,
            prices: Arc::new(HashMap::new()),
        }
    }

    /// Refresh the mint → price map from the lending markets. Wallet entry
    /// values are derived from this map; unknown mints value at zero.
    pub async fn load_prices(&mut self) -> Result<(), DefiError> {
        let prices = self.lending.market_prices().await?;
        info!("Loaded {} market prices", prices.len());
        self.prices = Arc::new(prices);
        Ok(())
    }
}
