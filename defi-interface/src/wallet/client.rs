use crate::common::provider::WalletProvider;
use crate::common::rpc_utils::with_pooled_client;
use async_trait::async_trait;
use common::assets::AssetInfo;
use common::{ProviderError, TokenBalance};
use log::debug;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_program::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::Account as TokenAccount;
use std::str::FromStr;

const PROVIDER: &str = "Wallet";

/// Token-account balance reader backed by the Solana RPC.
#[derive(Clone)]
pub struct WalletClient {
    rpc_url: String,
}

impl WalletClient {
    pub fn new(rpc_url: &str) -> Self {
        Self { rpc_url: rpc_url.to_string() }
    }

    fn zero_balance(asset: &AssetInfo) -> TokenBalance {
        TokenBalance {
            symbol: asset.symbol.to_string(),
            mint: asset.mint.to_string(),
            amount: 0,
            decimals: asset.decimals,
            token_account: String::new(),
        }
    }
}

#[async_trait]
impl WalletProvider for WalletClient {
    /// Fetch token balances for a wallet across the given assets.
    ///
    /// Mints the wallet holds no account for report a zero balance rather
    /// than being dropped, so callers can tell "zero" from "unknown asset".
    async fn token_balances(
        &self,
        wallet: &str,
        assets: &[AssetInfo],
        filter_mints: &[String],
    ) -> Result<Vec<TokenBalance>, ProviderError> {
        let wallet_pubkey = Pubkey::from_str(wallet).map_err(|e| {
            ProviderError::rejected(PROVIDER, format!("invalid wallet pubkey {wallet}: {e}"))
        })?;

        let scan: Vec<&AssetInfo> = if filter_mints.is_empty() {
            assets.iter().collect()
        } else {
            assets
                .iter()
                .filter(|asset| filter_mints.iter().any(|mint| mint == asset.mint))
                .collect()
        };

        let mut balances = Vec::with_capacity(scan.len());

        for asset in scan {
            let token_mint = match Pubkey::from_str(asset.mint) {
                Ok(pubkey) => pubkey,
                Err(err) => {
                    debug!("Failed to parse token mint {}: {}", asset.mint, err);
                    balances.push(Self::zero_balance(asset));
                    continue;
                }
            };

            let token_accounts = with_pooled_client(&self.rpc_url, |client| {
                client.get_token_accounts_by_owner(
                    &wallet_pubkey,
                    TokenAccountsFilter::Mint(token_mint),
                )
            })
            .map_err(|e| ProviderError::unavailable(PROVIDER, e))?;

            if token_accounts.is_empty() {
                balances.push(Self::zero_balance(asset));
                continue;
            }

            for account in &token_accounts {
                let pubkey = match Pubkey::from_str(&account.pubkey) {
                    Ok(pubkey) => pubkey,
                    Err(err) => {
                        debug!("Failed to parse token account {}: {}", account.pubkey, err);
                        continue;
                    }
                };

                let account_data = with_pooled_client(&self.rpc_url, |client| {
                    client.get_account_data(&pubkey)
                })
                .map_err(|e| ProviderError::unavailable(PROVIDER, e))?;

                let token_account = match TokenAccount::unpack(&account_data) {
                    Ok(account) => account,
                    Err(err) => {
                        debug!("Failed to unpack token account {}: {}", account.pubkey, err);
                        continue;
                    }
                };

                balances.push(TokenBalance {
                    symbol: asset.symbol.to_string(),
                    mint: asset.mint.to_string(),
                    amount: token_account.amount,
                    decimals: asset.decimals,
                    token_account: account.pubkey.clone(),
                });
            }
        }

        Ok(balances)
    }
}
