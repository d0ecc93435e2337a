use crate::aggregator::client::DefiAggregator;
use crate::aggregator::normalize;
use crate::common::provider::{BasketProvider, LendingProvider, WalletProvider};
use common::assets::{self, AssetInfo};
use common::{
    BalanceEntry, BalanceKind, BalanceOperation, BalanceProvider, BalanceRequest, DefiError,
    ProviderError,
};
use futures::future;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

type GroupResult = Result<Vec<BalanceEntry>, DefiError>;

impl DefiAggregator {
    /// Fetch balances across the selected provider groups.
    ///
    /// The lending, wallet and basket groups read independent providers and
    /// run concurrently; their results are flattened in that fixed order
    /// once every group has finished. Any group failure fails the whole
    /// call, so callers never see partial results.
    pub async fn get_balances(&self, request: &BalanceRequest) -> GroupResult {
        let filter = match request.asset.as_deref() {
            Some(symbol) => Some(*assets::resolve_symbol(symbol)?),
            None => None,
        };

        info!(
            "Fetching {}/{} balances for {}",
            request.provider, request.operation, request.wallet
        );

        let lending_task = matches!(
            request.provider,
            BalanceProvider::Lending | BalanceProvider::All
        )
        .then(|| {
            let provider = Arc::clone(&self.lending);
            let wallet = request.wallet.clone();
            let operation = request.operation;
            tokio::spawn(
                async move { lending_group(provider, &wallet, operation, filter).await },
            )
        });

        let wallet_task = matches!(
            request.provider,
            BalanceProvider::Wallet | BalanceProvider::All
        )
        .then(|| {
            let provider = Arc::clone(&self.wallet);
            let wallet = request.wallet.clone();
            let universe = self.assets.clone();
            let prices = Arc::clone(&self.prices);
            tokio::spawn(async move { wallet_group(provider, &wallet, &universe, filter, &prices).await })
        });

        // Basket balances only exist under the combined operation view.
        let basket_task = (matches!(
            request.provider,
            BalanceProvider::Basket | BalanceProvider::All
        ) && request.operation == BalanceOperation::All)
            .then(|| {
                let provider = Arc::clone(&self.baskets);
                let wallet = request.wallet.clone();
                let rpc_endpoint = self.rpc_url.clone();
                tokio::spawn(
                    async move { basket_group(provider, &wallet, &rpc_endpoint, filter).await },
                )
            });

        let (lending, wallets, baskets) = future::join3(
            join_group(lending_task, "lending"),
            join_group(wallet_task, "wallet"),
            join_group(basket_task, "basket"),
        )
        .await;

        let mut entries = lending?;
        entries.extend(wallets?);
        entries.extend(baskets?);
        Ok(entries)
    }

    pub fn print_balances(&self, entries: &[BalanceEntry]) {
        use prettytable::{row, Table};

        if entries.is_empty() {
            info!("No balances found");
            return;
        }

        let mut table = Table::new();
        table.add_row(row!["Token", "Amount", "Value", "Kind"]);

        for entry in entries {
            let kind = entry.kind.map(|kind| format!("{kind:?}")).unwrap_or_else(|| "-".into());
            table.add_row(row![entry.symbol, entry.amount, entry.value, kind]);
        }

        table.printstd();
    }
}

async fn join_group(
    task: Option<JoinHandle<GroupResult>>,
    group: &str,
) -> GroupResult {
    match task {
        None => Ok(Vec::new()),
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(e) => Err(ProviderError::unavailable(format!("{group} group"), e).into()),
        },
    }
}

async fn lending_group(
    provider: Arc<dyn LendingProvider>,
    wallet: &str,
    operation: BalanceOperation,
    filter: Option<AssetInfo>,
) -> GroupResult {
    let mint_filter = filter.map(|asset| asset.mint);
    info!("Fetching {} positions for {}", provider.protocol_name(), wallet);

    let positions = match operation {
        BalanceOperation::Deposited => provider.depositions(wallet, mint_filter).await?,
        BalanceOperation::Borrowed => provider.borrows(wallet, mint_filter).await?,
        BalanceOperation::All => {
            let snapshot = provider.combined(wallet, mint_filter).await?;
            snapshot.deposits.into_iter().chain(snapshot.borrows).collect()
        }
    };

    if positions.is_empty() {
        // A filtered query on an empty book still names a real asset, so it
        // answers with an explicit zero balance. Without a filter there is
        // nothing to report against and the request fails as not-found.
        return match filter {
            Some(asset) => Ok(vec![normalize::zero_entry(&asset, zero_kind(operation))]),
            None => Err(DefiError::EmptyBalance {
                provider: provider.protocol_name().to_string(),
                kind: kind_label(operation).to_string(),
            }),
        };
    }

    debug!("Found {} {} positions", positions.len(), provider.protocol_name());
    normalize::positions_to_entries(&positions)
}

async fn wallet_group(
    provider: Arc<dyn WalletProvider>,
    wallet: &str,
    universe: &[AssetInfo],
    filter: Option<AssetInfo>,
    prices: &HashMap<String, Decimal>,
) -> GroupResult {
    let filter_mints: Vec<String> = filter.iter().map(|asset| asset.mint.to_string()).collect();
    let balances = provider.token_balances(wallet, universe, &filter_mints).await?;
    debug!("Found {} wallet token balances", balances.len());
    normalize::token_balances_to_entries(&balances, prices)
}

async fn basket_group(
    provider: Arc<dyn BasketProvider>,
    wallet: &str,
    rpc_endpoint: &str,
    filter: Option<AssetInfo>,
) -> GroupResult {
    let mint_filter = filter.map(|asset| asset.mint);
    let entries = provider.wallet_baskets(wallet, rpc_endpoint, mint_filter).await?;
    debug!("Found {} basket holdings", entries.len());
    Ok(entries)
}

fn zero_kind(operation: BalanceOperation) -> Option<BalanceKind> {
    match operation {
        BalanceOperation::Deposited => Some(BalanceKind::Deposit),
        BalanceOperation::Borrowed => Some(BalanceKind::Borrow),
        BalanceOperation::All => None,
    }
}

fn kind_label(operation: BalanceOperation) -> &'static str {
    match operation {
        BalanceOperation::Deposited => "deposit",
        BalanceOperation::Borrowed => "borrow",
        BalanceOperation::All => "lending",
    }
}
