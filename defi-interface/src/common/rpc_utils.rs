use common::{DefiError, ProviderError};
use common_rpc::{with_rpc_client, CONNECTION_POOL};
use solana_client::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Helper function to create an RPC client with the given URL
/// Uses the connection pool for better performance
pub fn create_rpc_client(rpc_url: &str) -> RpcClient {
    CONNECTION_POOL.get_client(rpc_url)
}

/// Helper function to execute a function with an RPC client and automatically return it to the pool
pub fn with_pooled_client<F, R>(rpc_url: &str, f: F) -> R
where
    F: FnOnce(&RpcClient) -> R,
{
    with_rpc_client(rpc_url, f)
}

/// On-chain supply metadata for a mint.
#[derive(Debug, Clone)]
pub struct TokenSupplyInfo {
    pub decimals: u32,
    pub supply: String,
}

/// Fetch a mint's supply metadata from the chain.
///
/// Fails with `AssetNotFound` when the mint does not exist on-chain, and
/// with `ProviderUnavailable` for transport failures.
pub fn token_supply(rpc_url: &str, mint: &str) -> Result<TokenSupplyInfo, DefiError> {
    let pubkey =
        Pubkey::from_str(mint).map_err(|_| DefiError::AssetNotFound(mint.to_string()))?;

    match with_pooled_client(rpc_url, |client| client.get_token_supply(&pubkey)) {
        Ok(supply) => {
            Ok(TokenSupplyInfo { decimals: supply.decimals as u32, supply: supply.amount })
        }
        Err(e) => {
            let reason = e.to_string();
            // The node reports missing or non-mint accounts as invalid params.
            if reason.contains("could not find") || reason.contains("Invalid param") {
                Err(DefiError::AssetNotFound(mint.to_string()))
            } else {
                Err(ProviderError::unavailable("Solana RPC", reason).into())
            }
        }
    }
}

/// Helper function to format a pubkey for error messages
pub fn format_pubkey_for_error(pubkey: &Pubkey) -> String {
    format!("{} ({:.8})", pubkey, pubkey)
}
