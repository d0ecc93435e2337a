use crate::aggregator::client::DefiAggregator;
use crate::common::provider::{
    BasketProvider, LendingProvider, OperationProvider, SwapProvider, WalletProvider,
};
use async_trait::async_trait;
use common::assets::{self, AssetInfo};
use common::{
    BalanceEntry, BalanceKind, BalanceOperation, BalanceProvider, BalanceRequest, BasketInfo,
    BasketOperation, DefiError, DefiOperation, DefiProvider, LendingSnapshot, OperationResult,
    Position, PositionSide, ProviderError, TokenBalance,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const RPC_URL: &str = "http://localhost:8899";
const WALLET: &str = "AmrekAq6s3n2frDi67WUaZnbPkBb1h4xaid1Y8QLMAYN";

fn usdc() -> &'static AssetInfo {
    assets::resolve_symbol("USDC").unwrap()
}

fn sol() -> &'static AssetInfo {
    assets::resolve_symbol("SOL").unwrap()
}

fn position(asset: &AssetInfo, amount: u64, side: PositionSide) -> Position {
    Position {
        symbol: asset.symbol.to_string(),
        mint: asset.mint.to_string(),
        mint_decimals: asset.decimals,
        amount,
        market_value: Decimal::ONE,
        protocol_name: "MockLending".to_string(),
        market_name: "Main".to_string(),
        side,
    }
}

fn filtered(positions: &[Position], mint_filter: Option<&str>) -> Vec<Position> {
    positions
        .iter()
        .filter(|position| mint_filter.map_or(true, |mint| position.mint == mint))
        .cloned()
        .collect()
}

#[derive(Default)]
struct MockLending {
    deposits: Vec<Position>,
    borrows: Vec<Position>,
    prices: HashMap<String, Decimal>,
    delay_ms: u64,
    fail: bool,
}

#[async_trait]
impl LendingProvider for MockLending {
    async fn depositions(
        &self,
        _wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError> {
        Ok(self.combined(_wallet, mint_filter).await?.deposits)
    }

    async fn borrows(
        &self,
        _wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError> {
        Ok(self.combined(_wallet, mint_filter).await?.borrows)
    }

    async fn combined(
        &self,
        _wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<LendingSnapshot, ProviderError> {
        sleep(Duration::from_millis(self.delay_ms)).await;
        if self.fail {
            return Err(ProviderError::unavailable("MockLending", "rpc down"));
        }
        Ok(LendingSnapshot {
            deposits: filtered(&self.deposits, mint_filter),
            borrows: filtered(&self.borrows, mint_filter),
        })
    }

    async fn market_prices(&self) -> Result<HashMap<String, Decimal>, ProviderError> {
        Ok(self.prices.clone())
    }

    fn protocol_name(&self) -> &'static str {
        "MockLending"
    }
}

#[derive(Default)]
struct MockWallet {
    balances: Vec<TokenBalance>,
    delay_ms: u64,
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn token_balances(
        &self,
        _wallet: &str,
        _assets: &[AssetInfo],
        filter_mints: &[String],
    ) -> Result<Vec<TokenBalance>, ProviderError> {
        sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(self
            .balances
            .iter()
            .filter(|balance| {
                filter_mints.is_empty() || filter_mints.iter().any(|mint| mint == &balance.mint)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MockBaskets {
    entries: Vec<BalanceEntry>,
    listings: Vec<BasketInfo>,
    deposits: Arc<Mutex<Vec<(String, u64)>>>,
}

#[async_trait]
impl BasketProvider for MockBaskets {
    async fn all_baskets(&self) -> Result<Vec<BasketInfo>, ProviderError> {
        Ok(self.listings.clone())
    }

    async fn wallet_baskets(
        &self,
        _wallet: &str,
        _rpc_endpoint: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<BalanceEntry>, ProviderError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| mint_filter.map_or(true, |mint| entry.mint == mint))
            .cloned()
            .collect())
    }

    async fn deposit(
        &self,
        _wallet: &str,
        basket_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.deposits.lock().unwrap().push((basket_mint.to_string(), amount));
        Ok(result("Baskets", "deposit", basket_mint, amount))
    }
}

#[derive(Clone, Default)]
struct MockSwap {
    calls: Arc<Mutex<Vec<(String, String, u64)>>>,
}

#[async_trait]
impl SwapProvider for MockSwap {
    async fn swap(
        &self,
        _wallet: &str,
        from_mint: &str,
        to_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.calls.lock().unwrap().push((from_mint.to_string(), to_mint.to_string(), amount));
        Ok(result("MockSwap", "swap", from_mint, amount))
    }
}

#[derive(Clone, Default)]
struct MockOperations {
    calls: Arc<Mutex<Vec<(&'static str, String, u64)>>>,
}

impl MockOperations {
    async fn record(
        &self,
        operation: &'static str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.calls.lock().unwrap().push((operation, mint.to_string(), amount));
        Ok(result("MockOperations", operation, mint, amount))
    }
}

#[async_trait]
impl OperationProvider for MockOperations {
    async fn supply(
        &self,
        _wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.record("supply", mint, amount).await
    }

    async fn borrow(
        &self,
        _wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.record("borrow", mint, amount).await
    }

    async fn repay(
        &self,
        _wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.record("repay", mint, amount).await
    }

    async fn withdraw(
        &self,
        _wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.record("withdraw", mint, amount).await
    }

    fn provider_name(&self) -> &'static str {
        "MockOperations"
    }
}

fn result(provider: &str, operation: &str, mint: &str, amount: u64) -> OperationResult {
    OperationResult {
        provider: provider.to_string(),
        operation: operation.to_string(),
        mint: mint.to_string(),
        amount,
        transaction: "dGVzdA==".to_string(),
    }
}

struct Harness {
    lending: MockLending,
    wallet: MockWallet,
    baskets: MockBaskets,
    swap: MockSwap,
    operations: HashMap<DefiProvider, Arc<dyn OperationProvider>>,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            lending: MockLending::default(),
            wallet: MockWallet::default(),
            baskets: MockBaskets::default(),
            swap: MockSwap::default(),
            operations: HashMap::new(),
        }
    }
}

impl Harness {
    fn build(self) -> DefiAggregator {
        DefiAggregator::with_providers(
            Arc::new(self.lending),
            Arc::new(self.wallet),
            Arc::new(self.baskets),
            Arc::new(self.swap),
            self.operations,
            RPC_URL,
        )
    }
}

fn basket_entry(symbol: &str, mint: &str) -> BalanceEntry {
    BalanceEntry {
        mint: mint.to_string(),
        symbol: symbol.to_string(),
        amount: "3".to_string(),
        value: "30".to_string(),
        kind: Some(BalanceKind::Basket),
    }
}

#[tokio::test]
async fn filtered_empty_lending_synthesizes_zero_entry() {
    let aggregator = Harness::default().build();
    let request = BalanceRequest::new(
        WALLET,
        BalanceProvider::Lending,
        BalanceOperation::Deposited,
        Some("USDC"),
    );

    let entries = aggregator.get_balances(&request).await.unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.symbol, "USDC");
    assert_eq!(entry.mint, usdc().mint);
    assert_eq!(entry.amount, "0");
    assert_eq!(entry.value, "0");
    assert_eq!(entry.kind, Some(BalanceKind::Deposit));
}

#[tokio::test]
async fn unfiltered_empty_lending_fails_as_not_found() {
    let aggregator = Harness::default().build();
    let request = BalanceRequest::new(
        WALLET,
        BalanceProvider::Lending,
        BalanceOperation::Deposited,
        None,
    );

    let err = aggregator.get_balances(&request).await.unwrap_err();
    assert!(matches!(err, DefiError::EmptyBalance { .. }));
}

#[tokio::test]
async fn combined_view_zero_entry_is_untagged() {
    let aggregator = Harness::default().build();
    let request = BalanceRequest::new(
        WALLET,
        BalanceProvider::Lending,
        BalanceOperation::All,
        Some("SOL"),
    );

    let entries = aggregator.get_balances(&request).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, None);
}

#[tokio::test]
async fn all_sentinel_behaves_like_no_filter() {
    let aggregator = Harness::default().build();
    let request = BalanceRequest::new(
        WALLET,
        BalanceProvider::Lending,
        BalanceOperation::Deposited,
        Some("all"),
    );

    // "all" strips to no filter, so the empty book is a not-found condition.
    let err = aggregator.get_balances(&request).await.unwrap_err();
    assert!(matches!(err, DefiError::EmptyBalance { .. }));
}

#[tokio::test]
async fn groups_flatten_in_declared_order() {
    // The slowest group finishing first must not reorder the output.
    let mut harness = Harness::default();
    harness.lending = MockLending {
        deposits: vec![position(sol(), 2_000_000_000, PositionSide::Deposit)],
        borrows: vec![position(usdc(), 5_000_000, PositionSide::Borrow)],
        delay_ms: 40,
        ..MockLending::default()
    };
    harness.wallet = MockWallet {
        balances: vec![TokenBalance {
            symbol: "USDC".to_string(),
            mint: usdc().mint.to_string(),
            amount: 1_000_000,
            decimals: 6,
            token_account: "acct".to_string(),
        }],
        delay_ms: 20,
    };
    harness.baskets =
        MockBaskets { entries: vec![basket_entry("SYMFUND", "FundMint111")], ..Default::default() };
    let aggregator = harness.build();

    let request =
        BalanceRequest::new(WALLET, BalanceProvider::All, BalanceOperation::All, None);
    let entries = aggregator.get_balances(&request).await.unwrap();

    let kinds: Vec<Option<BalanceKind>> = entries.iter().map(|entry| entry.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(BalanceKind::Deposit),
            Some(BalanceKind::Borrow),
            Some(BalanceKind::Wallet),
            Some(BalanceKind::Basket),
        ]
    );
    assert_eq!(entries[0].amount, "2");
    assert_eq!(entries[1].amount, "5");
}

#[tokio::test]
async fn baskets_are_skipped_outside_the_combined_view() {
    let mut harness = Harness::default();
    harness.lending = MockLending {
        deposits: vec![position(sol(), 1_000_000_000, PositionSide::Deposit)],
        ..MockLending::default()
    };
    harness.baskets =
        MockBaskets { entries: vec![basket_entry("SYMFUND", "FundMint111")], ..Default::default() };
    let aggregator = harness.build();

    let request =
        BalanceRequest::new(WALLET, BalanceProvider::All, BalanceOperation::Deposited, None);
    let entries = aggregator.get_balances(&request).await.unwrap();

    assert!(entries.iter().all(|entry| entry.kind != Some(BalanceKind::Basket)));
}

#[tokio::test]
async fn group_failure_fails_the_whole_call() {
    let mut harness = Harness::default();
    harness.lending = MockLending { fail: true, ..MockLending::default() };
    harness.wallet = MockWallet {
        balances: vec![TokenBalance {
            symbol: "USDC".to_string(),
            mint: usdc().mint.to_string(),
            amount: 1_000_000,
            decimals: 6,
            token_account: "acct".to_string(),
        }],
        delay_ms: 0,
    };
    let aggregator = harness.build();

    let request =
        BalanceRequest::new(WALLET, BalanceProvider::All, BalanceOperation::All, None);
    let err = aggregator.get_balances(&request).await.unwrap_err();

    assert!(matches!(
        err,
        DefiError::Provider(ProviderError::Unavailable { .. })
    ));
}

#[tokio::test]
async fn empty_wallet_balance_list_is_valid() {
    let aggregator = Harness::default().build();
    let request =
        BalanceRequest::new(WALLET, BalanceProvider::Wallet, BalanceOperation::All, None);

    let entries = aggregator.get_balances(&request).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn wallet_values_derive_from_loaded_prices() {
    let mut harness = Harness::default();
    harness.lending = MockLending {
        prices: HashMap::from([(usdc().mint.to_string(), Decimal::ONE)]),
        ..MockLending::default()
    };
    harness.wallet = MockWallet {
        balances: vec![TokenBalance {
            symbol: "USDC".to_string(),
            mint: usdc().mint.to_string(),
            amount: 2_500_000,
            decimals: 6,
            token_account: "acct".to_string(),
        }],
        delay_ms: 0,
    };
    let mut aggregator = harness.build();
    aggregator.load_prices().await.unwrap();

    let request =
        BalanceRequest::new(WALLET, BalanceProvider::Wallet, BalanceOperation::All, None);
    let entries = aggregator.get_balances(&request).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, "2.5");
    assert_eq!(entries[0].value, "2.5");
    assert_eq!(entries[0].kind, Some(BalanceKind::Wallet));
}

#[tokio::test]
async fn supply_dispatches_to_the_lending_adapter_only() {
    let operations = MockOperations::default();
    let swap = MockSwap::default();
    let mut harness = Harness::default();
    harness.swap = swap.clone();
    harness
        .operations
        .insert(DefiProvider::Kamino, Arc::new(operations.clone()) as Arc<dyn OperationProvider>);
    let aggregator = harness.build();

    let result = aggregator
        .perform_operation(
            WALLET,
            DefiOperation::Supply,
            DefiProvider::Kamino,
            "SOL",
            Decimal::new(15, 1),
        )
        .await
        .unwrap();

    assert_eq!(result.operation, "supply");
    let calls = operations.calls.lock().unwrap();
    assert_eq!(calls.as_slice(), &[("supply", sol().mint.to_string(), 1_500_000_000)]);
    assert!(swap.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unregistered_provider_is_rejected_before_any_call() {
    let operations = MockOperations::default();
    let mut harness = Harness::default();
    harness
        .operations
        .insert(DefiProvider::Kamino, Arc::new(operations.clone()) as Arc<dyn OperationProvider>);
    let aggregator = harness.build();

    let err = aggregator
        .perform_operation(
            WALLET,
            DefiOperation::Supply,
            DefiProvider::Jupiter,
            "SOL",
            Decimal::ONE,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DefiError::ProviderNotSupported(_)));
    assert!(operations.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_symbol_fails_before_dispatch() {
    let operations = MockOperations::default();
    let mut harness = Harness::default();
    harness
        .operations
        .insert(DefiProvider::Kamino, Arc::new(operations.clone()) as Arc<dyn OperationProvider>);
    let aggregator = harness.build();

    let err = aggregator
        .perform_operation(
            WALLET,
            DefiOperation::Withdraw,
            DefiProvider::Kamino,
            "WAT",
            Decimal::ONE,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DefiError::AssetNotFound(_)));
    assert!(operations.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn negative_operation_amount_is_invalid() {
    let operations = MockOperations::default();
    let mut harness = Harness::default();
    harness
        .operations
        .insert(DefiProvider::Kamino, Arc::new(operations.clone()) as Arc<dyn OperationProvider>);
    let aggregator = harness.build();

    let err = aggregator
        .perform_operation(
            WALLET,
            DefiOperation::Supply,
            DefiProvider::Kamino,
            "USDC",
            Decimal::NEGATIVE_ONE,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DefiError::Amount(_)));
    assert!(operations.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn swap_converts_by_the_source_asset_decimals() {
    let swap = MockSwap::default();
    let mut harness = Harness::default();
    harness.swap = swap.clone();
    let aggregator = harness.build();

    aggregator.swap_tokens(WALLET, "SOL", "USDC", Decimal::TWO).await.unwrap();

    let calls = swap.calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        &[(sol().mint.to_string(), usdc().mint.to_string(), 2_000_000_000)]
    );
}

#[tokio::test]
async fn basket_withdrawals_are_not_supported() {
    let aggregator = Harness::default().build();

    let err = aggregator
        .basket_operation(WALLET, "FundMint111", Decimal::ONE, BasketOperation::Withdraw)
        .await
        .unwrap_err();

    assert!(matches!(err, DefiError::OperationNotSupported(_)));
}
