use serde::Deserialize;

/// One fund as returned by the funds listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FundListing {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "fundToken")]
    pub fund_token: String,
    #[serde(default)]
    pub tvl: f64,
}

/// One fund holding of a wallet.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletFundHolding {
    #[serde(rename = "fundToken")]
    pub fund_token: String,
    pub symbol: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct DepositTransactionResponse {
    pub transaction: String,
}
