use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("RPC error: {0}")]
    RpcError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Account deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),
}

/// Trait for converting RpcError to other error types
pub trait RpcErrorConverter<E> {
    fn convert_error(error: RpcError) -> E;
}

// Query latency is dominated by how much account data the node has to scan,
// so filters are ordered most-restrictive first before the request goes out.
// Priorities: discriminator memcmp, data size, owner memcmp, other memcmp.
#[derive(Debug)]
struct PrioritizedFilter {
    priority: u8,
    filter: RpcFilterType,
}

/// Builder for filtered Solana program-account queries.
pub struct SolanaRpcBuilder<'a> {
    rpc_client: &'a RpcClient,
    program_id: Pubkey,
    filters: Vec<PrioritizedFilter>,
    encoding: Option<UiAccountEncoding>,
    with_context: Option<bool>,
}

impl<'a> SolanaRpcBuilder<'a> {
    pub fn new(rpc_client: &'a RpcClient, program_id: Pubkey) -> Self {
        Self {
            rpc_client,
            program_id,
            filters: Vec::new(),
            encoding: Some(UiAccountEncoding::Base64),
            with_context: None,
        }
    }

    /// Add a data size filter.
    pub fn with_data_size(mut self, size: u64) -> Self {
        self.filters.push(PrioritizedFilter { priority: 1, filter: RpcFilterType::DataSize(size) });
        self
    }

    /// Add a raw bytes memcmp filter. Offset 0 is treated as an account
    /// discriminator check.
    pub fn with_memcmp(mut self, offset: usize, bytes: Vec<u8>) -> Self {
        self.filters.push(PrioritizedFilter {
            priority: memcmp_priority(offset),
            filter: RpcFilterType::Memcmp(Memcmp::new_raw_bytes(offset, bytes)),
        });
        self
    }

    /// Add a base58-encoded memcmp filter.
    pub fn with_memcmp_base58(mut self, offset: usize, base58_str: String) -> Self {
        self.filters.push(PrioritizedFilter {
            priority: memcmp_priority(offset),
            filter: RpcFilterType::Memcmp(Memcmp::new(
                offset,
                MemcmpEncodedBytes::Base58(base58_str),
            )),
        });
        self
    }

    pub fn with_encoding(mut self, encoding: UiAccountEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_context(mut self, with_context: bool) -> Self {
        self.with_context = Some(with_context);
        self
    }

    fn take_filters(&mut self) -> Option<Vec<RpcFilterType>> {
        if self.filters.is_empty() {
            return None;
        }
        let mut filters = std::mem::take(&mut self.filters);
        filters.sort_by_key(|f| f.priority);
        Some(filters.into_iter().map(|f| f.filter).collect())
    }

    /// Get program accounts
    pub fn get_program_accounts(mut self) -> Result<Vec<(Pubkey, Account)>, RpcError> {
        let config = RpcProgramAccountsConfig {
            filters: self.take_filters(),
            account_config: RpcAccountInfoConfig { encoding: self.encoding, ..Default::default() },
            with_context: self.with_context,
        };

        self.rpc_client
            .get_program_accounts_with_config(&self.program_id, config)
            .map_err(|e| RpcError::RpcError(Box::new(e)))
    }

    /// Get program accounts with automatic error conversion
    pub fn get_program_accounts_with_conversion<E, C: RpcErrorConverter<E>>(
        self,
    ) -> Result<Vec<(Pubkey, Account)>, E> {
        self.get_program_accounts().map_err(C::convert_error)
    }

    /// Get a single account by pubkey
    pub fn get_account(self, pubkey: &Pubkey) -> Result<Account, RpcError> {
        self.rpc_client.get_account(pubkey).map_err(|e| RpcError::RpcError(Box::new(e)))
    }

    /// Get a single account by pubkey with automatic error conversion
    pub fn get_account_with_conversion<E, C: RpcErrorConverter<E>>(
        self,
        pubkey: &Pubkey,
    ) -> Result<Account, E> {
        self.get_account(pubkey).map_err(C::convert_error)
    }
}

fn memcmp_priority(offset: usize) -> u8 {
    match offset {
        0 => 0,  // discriminator
        32 => 2, // owner field
        _ => 3,
    }
}
