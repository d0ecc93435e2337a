use crate::common::http;
use crate::common::provider::BasketProvider;
use crate::symmetry::models::{DepositTransactionResponse, FundListing, WalletFundHolding};
use async_trait::async_trait;
use common::{BalanceEntry, BalanceKind, BasketInfo, OperationResult, ProviderError};
use log::info;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

const PROVIDER: &str = "Symmetry";

/// Default base URL of the Symmetry funds API.
pub const SYMMETRY_API_URL: &str = "https://api.symmetry.fi/v1";

/// Basket (index fund) adapter backed by the Symmetry REST API.
#[derive(Clone)]
pub struct SymmetryClient {
    api_url: String,
    http: reqwest::Client,
}

impl SymmetryClient {
    pub fn new() -> Self {
        Self { api_url: SYMMETRY_API_URL.to_string(), http: reqwest::Client::new() }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }
}

impl Default for SymmetryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn format_f64(value: f64) -> String {
    Decimal::from_f64(value).unwrap_or_default().normalize().to_string()
}

#[async_trait]
impl BasketProvider for SymmetryClient {
    async fn all_baskets(&self) -> Result<Vec<BasketInfo>, ProviderError> {
        let url = format!("{}/funds-getter", self.api_url);
        let request = json!({
            "request": "get_funds",
            "params": {
                "attributes": ["name", "symbol", "fundToken", "tvl"],
                "sort_by": "tvl",
            },
        });

        let listings: Vec<FundListing> =
            http::post_json(&self.http, PROVIDER, &url, &request).await?;
        info!("Found {} Symmetry funds", listings.len());

        Ok(listings
            .into_iter()
            .map(|fund| BasketInfo {
                name: fund.name,
                symbol: fund.symbol,
                fund_mint: fund.fund_token,
                tvl: Decimal::from_f64(fund.tvl).unwrap_or_default(),
            })
            .collect())
    }

    async fn wallet_baskets(
        &self,
        wallet: &str,
        rpc_endpoint: &str,
        mint_filter: Option<&str>,
    ) -> Result<Vec<BalanceEntry>, ProviderError> {
        let url = format!("{}/funds-getter", self.api_url);
        let request = json!({
            "request": "get_wallet_funds",
            "params": {
                "wallet": wallet,
                "rpc": rpc_endpoint,
            },
        });

        let holdings: Vec<WalletFundHolding> =
            http::post_json(&self.http, PROVIDER, &url, &request).await?;
        info!("Found {} Symmetry holdings for {}", holdings.len(), wallet);

        Ok(holdings
            .into_iter()
            .filter(|holding| mint_filter.map_or(true, |mint| mint == holding.fund_token))
            .map(|holding| BalanceEntry {
                mint: holding.fund_token,
                symbol: holding.symbol,
                amount: format_f64(holding.amount),
                value: format_f64(holding.value),
                kind: Some(BalanceKind::Basket),
            })
            .collect())
    }

    async fn deposit(
        &self,
        wallet: &str,
        basket_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        let url = format!("{}/deposit-tx", self.api_url);
        let request = json!({
            "wallet": wallet,
            "fundToken": basket_mint,
            "amount": amount,
        });

        info!("Building Symmetry deposit transaction for {}", wallet);
        let response: DepositTransactionResponse =
            http::post_json(&self.http, PROVIDER, &url, &request).await?;

        Ok(OperationResult {
            provider: PROVIDER.to_string(),
            operation: "deposit".to_string(),
            mint: basket_mint.to_string(),
            amount,
            transaction: response.transaction,
        })
    }
}
