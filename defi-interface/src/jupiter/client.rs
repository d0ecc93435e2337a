use crate::common::http;
use crate::common::provider::SwapProvider;
use async_trait::async_trait;
use common::{OperationResult, ProviderError};
use log::info;
use serde::Deserialize;
use serde_json::json;

const PROVIDER: &str = "Jupiter";

/// Default base URL of the Jupiter v6 swap API.
pub const JUPITER_API_URL: &str = "https://quote-api.jup.ag/v6";

const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// DEX-aggregator swap adapter backed by the Jupiter REST API.
#[derive(Clone)]
pub struct JupiterClient {
    api_url: String,
    http: reqwest::Client,
    slippage_bps: u16,
}

impl JupiterClient {
    pub fn new() -> Self {
        Self {
            api_url: JUPITER_API_URL.to_string(),
            http: reqwest::Client::new(),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }
}

impl Default for JupiterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: String,
}

#[async_trait]
impl SwapProvider for JupiterClient {
    /// Quote then build the swap transaction. The quote response is passed
    /// back to the swap endpoint verbatim.
    async fn swap(
        &self,
        wallet: &str,
        from_mint: &str,
        to_mint: &str,
        amount: u64,
    ) -> Result<OperationResult, ProviderError> {
        info!("Quoting {} -> {} for {} units", from_mint, to_mint, amount);

        let quote: serde_json::Value = http::get_json(
            &self.http,
            PROVIDER,
            &format!("{}/quote", self.api_url),
            &[
                ("inputMint", from_mint.to_string()),
                ("outputMint", to_mint.to_string()),
                ("amount", amount.to_string()),
                ("slippageBps", self.slippage_bps.to_string()),
            ],
        )
        .await?;

        // Route errors come back as a 200 with an error field.
        if let Some(error) = quote.get("error").and_then(|e| e.as_str()) {
            return Err(ProviderError::rejected(PROVIDER, error));
        }

        let body = json!({
            "quoteResponse": quote,
            "userPublicKey": wallet,
            "wrapAndUnwrapSol": true,
        });

        let response: SwapResponse =
            http::post_json(&self.http, PROVIDER, &format!("{}/swap", self.api_url), &body)
                .await?;

        Ok(OperationResult {
            provider: PROVIDER.to_string(),
            operation: "swap".to_string(),
            mint: from_mint.to_string(),
            amount,
            transaction: response.swap_transaction,
        })
    }
}
