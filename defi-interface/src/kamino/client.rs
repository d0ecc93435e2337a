use crate::common::http;
use crate::common::provider::{LendingProvider, OperationProvider};
use crate::common::rpc_utils::{format_pubkey_for_error, with_pooled_client};
use crate::kamino::models::{unscale_fraction, Obligation, Reserve, OBLIGATION_SIZE, RESERVE_SIZE};
use async_trait::async_trait;
use borsh::BorshDeserialize;
use common::token_amount::TokenAmount;
use common::{assets, LendingSnapshot, OperationResult, Position, PositionSide, ProviderError};
use common_rpc::{
    get_multiple_accounts_with_conversion, RpcError, RpcErrorConverter, SolanaRpcBuilder,
};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

const PROTOCOL: &str = "Kamino";

/// Default base URL of the Kamino transaction-building API.
pub const KAMINO_API_URL: &str = "https://api.kamino.finance";

const KAMINO_PROGRAM_ID: &str = "KLend2g3cP87fffoy8q1mQqGKjrxjC8boSyAYavgmjD";
const KAMINO_MAIN_MARKET: &str = "7u3HeHxYDLhnCoErrtycNokbQYbWGzLs6JSDqGAv5PfF";

// Anchor discriminators of the accounts we scan for.
const KAMINO_RESERVE_DISCRIMINATOR: [u8; 8] = [43, 242, 204, 202, 26, 247, 59, 127];
const KAMINO_OBLIGATION_DISCRIMINATOR: [u8; 8] = [168, 206, 141, 106, 88, 76, 172, 167];

type MarketNameMap = HashMap<String, &'static str>;

/// Centralized error converter for Kamino RPC calls
struct KaminoErrorConverter;

impl RpcErrorConverter<ProviderError> for KaminoErrorConverter {
    fn convert_error(error: RpcError) -> ProviderError {
        match error {
            RpcError::InvalidAddress(e) => ProviderError::rejected(PROTOCOL, e),
            other => ProviderError::unavailable(PROTOCOL, other),
        }
    }
}

#[derive(Clone)]
pub struct KaminoClient {
    program_id: Pubkey,
    rpc_url: String,
    api_url: String,
    http: reqwest::Client,
    market_names: MarketNameMap,
}

impl KaminoClient {
    pub fn new(rpc_url: &str) -> Self {
        let program_id =
            Pubkey::from_str(KAMINO_PROGRAM_ID).expect("Invalid Kamino Lending Program ID");

        let market_names: MarketNameMap = [
            (KAMINO_MAIN_MARKET.to_string(), "Main"),
            ("H6rHXmXoCQvq8Ue81MqNh7ow5ysPa1dSozwW3PU1dDH6".to_string(), "JITO"),
            ("DxXdAyU3kCjnyggvHmY5nAwg5cRbbmdyX3npfDMjjMek".to_string(), "JLP"),
            ("ByYiZxp8QrdN9qbdtaAiePN8AAr3qvTPppNJDpf5DVJ5".to_string(), "Altcoin"),
            ("BJnbcRHqvppTyGesLzWASGKnmnF1wq9jZu6ExrjT7wvF".to_string(), "Ethena"),
        ]
        .into_iter()
        .collect();

        Self {
            program_id,
            rpc_url: rpc_url.to_string(),
            api_url: KAMINO_API_URL.to_string(),
            http: reqwest::Client::new(),
            market_names,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Scan every reserve the lending program knows.
    fn fetch_all_reserves(&self) -> Result<HashMap<Pubkey, Reserve>, ProviderError> {
        let accounts = with_pooled_client(&self.rpc_url, |client| {
            SolanaRpcBuilder::new(client, self.program_id)
                .with_memcmp(0, KAMINO_RESERVE_DISCRIMINATOR.to_vec())
                .with_data_size(RESERVE_SIZE as u64 + 8)
                .get_program_accounts_with_conversion::<ProviderError, KaminoErrorConverter>()
        })?;

        Ok(parse_reserves(accounts))
    }

    /// Fetch just the reserves the given obligations reference.
    fn fetch_referenced_reserves(
        &self,
        obligations: &[(Pubkey, Obligation)],
    ) -> Result<HashMap<Pubkey, Reserve>, ProviderError> {
        let reserve_keys: Vec<Pubkey> = obligations
            .iter()
            .flat_map(|(_, obligation)| {
                obligation
                    .active_deposits()
                    .map(|deposit| Pubkey::new_from_array(deposit.deposit_reserve))
                    .chain(
                        obligation
                            .active_borrows()
                            .map(|borrow| Pubkey::new_from_array(borrow.borrow_reserve)),
                    )
            })
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let accounts = with_pooled_client(&self.rpc_url, |client| {
            get_multiple_accounts_with_conversion::<ProviderError, KaminoErrorConverter>(
                client,
                &reserve_keys,
            )
        })?;

        Ok(parse_reserves(accounts))
    }

    fn fetch_raw_obligations(
        &self,
        owner_pubkey: &str,
    ) -> Result<Vec<(Pubkey, Obligation)>, ProviderError> {
        let owner = Pubkey::from_str(owner_pubkey).map_err(|e| {
            ProviderError::rejected(PROTOCOL, format!("invalid owner pubkey {owner_pubkey}: {e}"))
        })?;

        let accounts = with_pooled_client(&self.rpc_url, |client| {
            SolanaRpcBuilder::new(client, self.program_id)
                .with_memcmp(0, KAMINO_OBLIGATION_DISCRIMINATOR.to_vec())
                .with_data_size(OBLIGATION_SIZE as u64 + 8)
                .with_memcmp_base58(8 + 8 + 16 + 32, owner.to_string())
                .get_program_accounts_with_conversion::<ProviderError, KaminoErrorConverter>()
        })?;

        if accounts.is_empty() {
            debug!("No current obligations found for {}", owner_pubkey);
            return Ok(Vec::new());
        }

        let mut ret = Vec::with_capacity(accounts.len());
        for (pubkey, account) in accounts {
            match Obligation::deserialize(&mut &account.data[8..]) {
                Ok(obligation) => ret.push((pubkey, obligation)),
                Err(e) => {
                    debug!(
                        "Failed to deserialize obligation {}: {}",
                        format_pubkey_for_error(&pubkey),
                        e
                    );
                    continue;
                }
            }
        }

        Ok(ret)
    }

    /// Fetch and normalize every position the wallet holds, optionally
    /// scoped to one mint.
    fn positions(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<LendingSnapshot, ProviderError> {
        let obligations = self.fetch_raw_obligations(wallet)?;
        info!("Found {} Kamino obligations for {}", obligations.len(), wallet);

        if obligations.is_empty() {
            return Ok(LendingSnapshot::default());
        }

        let reserves = self.fetch_referenced_reserves(&obligations)?;
        let mut snapshot = LendingSnapshot::default();

        for (_, obligation) in &obligations {
            let market_name = self
                .market_names
                .get(&Pubkey::new_from_array(obligation.lending_market).to_string())
                .copied()
                .unwrap_or("Unknown");

            for deposit in obligation.active_deposits() {
                let reserve_key = Pubkey::new_from_array(deposit.deposit_reserve);
                let Some(reserve) = reserves.get(&reserve_key) else {
                    debug!("Deposit reserve {} not found", reserve_key);
                    continue;
                };
                if let Some(position) = to_position(
                    reserve,
                    deposit.deposited_amount,
                    market_name,
                    PositionSide::Deposit,
                    mint_filter,
                )? {
                    snapshot.deposits.push(position);
                }
            }

            for borrow in obligation.active_borrows() {
                let reserve_key = Pubkey::new_from_array(borrow.borrow_reserve);
                let Some(reserve) = reserves.get(&reserve_key) else {
                    debug!("Borrow reserve {} not found", reserve_key);
                    continue;
                };
                if let Some(position) = to_position(
                    reserve,
                    unscale_fraction(borrow.borrowed_amount_sf),
                    market_name,
                    PositionSide::Borrow,
                    mint_filter,
                )? {
                    snapshot.borrows.push(position);
                }
            }
        }

        Ok(snapshot)
    }

    async fn build_transaction(
        &self,
        action: &str,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        let url = format!("{}/v1/transactions/{}", self.api_url, action);
        let request = TransactionRequest { wallet, mint, amount, market: KAMINO_MAIN_MARKET };

        info!("Building Kamino {} transaction for {}", action, wallet);
        let response: TransactionResponse =
            http::post_json(&self.http, PROTOCOL, &url, &request).await?;

        Ok(OperationResult {
            provider: PROTOCOL.to_string(),
            operation: action.to_string(),
            mint: mint.to_string(),
            amount,
            transaction: response.transaction,
        })
    }
}

fn parse_reserves(accounts: impl IntoIterator<Item = (Pubkey, Account)>) -> HashMap<Pubkey, Reserve> {
    let mut reserves = HashMap::new();
    for (pubkey, account) in accounts {
        match Reserve::deserialize(&mut &account.data[8..]) {
            Ok(reserve) => {
                reserves.insert(pubkey, reserve);
            }
            Err(e) => {
                debug!("Failed to deserialize reserve {}: {}", format_pubkey_for_error(&pubkey), e);
            }
        }
    }
    reserves
}

fn to_position(
    reserve: &Reserve,
    amount: u64,
    market_name: &str,
    side: PositionSide,
    mint_filter: Option<&str>,
) -> Result<Option<Position>, ProviderError> {
    let mint = reserve.mint().to_string();
    if mint_filter.is_some_and(|filter| filter != mint) {
        return Ok(None);
    }

    let decimals = reserve.mint_decimals();
    let display = TokenAmount::from_raw(amount, decimals)
        .to_display()
        .map_err(|e| ProviderError::unavailable(PROTOCOL, e))?;
    let market_value = display.checked_mul(reserve.market_price()).unwrap_or(Decimal::ZERO);

    let symbol =
        assets::symbol_for_mint(&mint).map(str::to_string).unwrap_or_else(|_| mint.clone());

    Ok(Some(Position {
        symbol,
        mint,
        mint_decimals: decimals,
        amount,
        market_value,
        protocol_name: PROTOCOL.to_string(),
        market_name: market_name.to_string(),
        side,
    }))
}

#[derive(Serialize)]
struct TransactionRequest<'a> {
    wallet: &'a str,
    mint: &'a str,
    amount: u64,
    market: &'a str,
}

#[derive(Deserialize)]
struct TransactionResponse {
    transaction: String,
}

#[async_trait]
impl LendingProvider for KaminoClient {
    async fn depositions(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError> {
        Ok(self.positions(wallet, mint_filter)?.deposits)
    }

    async fn borrows(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<Position>, ProviderError> {
        Ok(self.positions(wallet, mint_filter)?.borrows)
    }

    async fn combined(
        &self,
        wallet: &str,
        mint_filter: Option<&str>,
    ) -> Result<LendingSnapshot, ProviderError> {
        self.positions(wallet, mint_filter)
    }

    async fn market_prices(&self) -> Result<HashMap<String, Decimal>, ProviderError> {
        let reserves = self.fetch_all_reserves()?;
        Ok(reserves
            .values()
            .map(|reserve| (reserve.mint().to_string(), reserve.market_price()))
            .collect())
    }

    fn protocol_name(&self) -> &'static str {
        PROTOCOL
    }
}

#[async_trait]
impl OperationProvider for KaminoClient {
    async fn supply(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.build_transaction("supply", wallet, mint, amount).await
    }

    async fn borrow(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.build_transaction("borrow", wallet, mint, amount).await
    }

    async fn repay(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.build_transaction("repay", wallet, mint, amount).await
    }

    async fn withdraw(
        &self,
        wallet: &str,
        mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        self.build_transaction("withdraw", wallet, mint, amount).await
    }

    fn provider_name(&self) -> &'static str {
        PROTOCOL
    }
}
