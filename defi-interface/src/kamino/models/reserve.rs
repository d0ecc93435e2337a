use super::obligation::LastUpdate;
use borsh::BorshDeserialize;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

/// On-chain reserve account size, without the anchor discriminator.
pub const RESERVE_SIZE: usize = 8616;

// Scaled-fraction values carry 60 fractional bits.
const FRACTION_ONE: u64 = 1 << 60;

#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct ReserveLiquidity {
    pub mint_pubkey: [u8; 32],
    pub supply_vault: [u8; 32],
    pub fee_vault: [u8; 32],
    pub available_amount: u64,
    pub borrowed_amount_sf: u128,
    pub market_price_sf: u128,
    pub market_price_last_updated_ts: u64,
    pub mint_decimals: u64,
}

/// Prefix of the on-chain reserve account layout.
#[derive(Debug, Clone, Copy, BorshDeserialize)]
pub struct Reserve {
    pub version: u64,
    pub last_update: LastUpdate,
    pub lending_market: [u8; 32],
    pub farm_collateral: [u8; 32],
    pub farm_debt: [u8; 32],
    pub liquidity: ReserveLiquidity,
}

impl Reserve {
    pub fn mint(&self) -> Pubkey {
        Pubkey::new_from_array(self.liquidity.mint_pubkey)
    }

    pub fn mint_decimals(&self) -> u32 {
        self.liquidity.mint_decimals as u32
    }

    /// Display-scaled market price of the reserve's liquidity token. Falls
    /// back to zero for values outside the decimal range.
    pub fn market_price(&self) -> Decimal {
        let Some(price_sf) = Decimal::from_u128(self.liquidity.market_price_sf) else {
            return Decimal::ZERO;
        };
        price_sf.checked_div(Decimal::from(FRACTION_ONE)).unwrap_or(Decimal::ZERO)
    }
}

/// Unscale a borrowed-amount fraction to raw token units.
pub fn unscale_fraction(amount_sf: u128) -> u64 {
    (amount_sf >> 60) as u64
}
