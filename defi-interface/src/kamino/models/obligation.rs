use borsh::BorshDeserialize;

/// On-chain obligation account size, without the anchor discriminator.
pub const OBLIGATION_SIZE: usize = 3336;

#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct LastUpdate {
    pub slot: u64,
    pub stale: u8,
    pub price_status: u8,
    pub placeholder: [u8; 6],
}

/// One collateral slot of an obligation.
#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct ObligationCollateral {
    pub deposit_reserve: [u8; 32],
    pub deposited_amount: u64,
    pub market_value_sf: u128,
    pub padding: [u64; 10],
}

/// One borrow slot of an obligation. Borrowed amounts are scaled fractions
/// (value << 60).
#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct ObligationLiquidity {
    pub borrow_reserve: [u8; 32],
    pub cumulative_borrow_rate_bsf: [u64; 6],
    pub padding: u64,
    pub borrowed_amount_sf: u128,
    pub market_value_sf: u128,
    pub padding2: [u64; 8],
}

/// Prefix of the on-chain obligation account layout. Only the fields the
/// engine reads are modeled; trailing account data is left undeserialized.
#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct Obligation {
    pub tag: u64,
    pub last_update: LastUpdate,
    pub lending_market: [u8; 32],
    pub owner: [u8; 32],
    pub deposits: [ObligationCollateral; 8],
    pub lowest_reserve_deposit_liquidation_ltv: u64,
    pub deposited_value_sf: u128,
    pub borrows: [ObligationLiquidity; 5],
}

impl Obligation {
    /// Collateral slots that actually hold a deposit.
    pub fn active_deposits(&self) -> impl Iterator<Item = &ObligationCollateral> {
        self.deposits.iter().filter(|deposit| deposit.deposited_amount > 0)
    }

    /// Borrow slots that actually carry debt.
    pub fn active_borrows(&self) -> impl Iterator<Item = &ObligationLiquidity> {
        self.borrows.iter().filter(|borrow| borrow.borrowed_amount_sf > 0)
    }
}
