use crate::error::AmountError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

// rust_decimal cannot represent scales beyond 28 digits.
const MAX_DECIMALS: u32 = 28;

/// A token quantity paired with its decimal precision and a flag telling
/// whether the stored value is the raw minor-unit integer or the
/// human-readable display form.
///
/// Conversions are exact: scaling never rounds, and anything that would not
/// round-trip fails instead of truncating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenAmount {
    amount: Decimal,
    decimals: u32,
    is_raw: bool,
}

impl TokenAmount {
    pub fn new(amount: Decimal, decimals: u32, is_raw: bool) -> Self {
        Self { amount, decimals, is_raw }
    }

    /// Wrap a minor-unit integer amount.
    pub fn from_raw(raw: u64, decimals: u32) -> Self {
        Self { amount: Decimal::from(raw), decimals, is_raw: true }
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Convert to the raw minor-unit representation.
    ///
    /// Fails with `InvalidAmount` for negative input or for display values
    /// carrying more fractional digits than the asset's precision, and with
    /// `AmountOverflow` when the scaled value does not fit in a u64.
    pub fn to_raw(&self) -> Result<u64, AmountError> {
        if self.amount < Decimal::ZERO {
            return Err(AmountError::InvalidAmount(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }

        let scaled = if self.is_raw {
            self.amount
        } else {
            self.amount
                .checked_mul(pow10(self.decimals)?)
                .ok_or_else(|| overflow(self.amount, self.decimals))?
        };

        if !scaled.fract().is_zero() {
            return Err(AmountError::InvalidAmount(format!(
                "{} has more fractional digits than the asset precision of {}",
                self.amount, self.decimals
            )));
        }

        scaled.trunc().to_u64().ok_or_else(|| overflow(self.amount, self.decimals))
    }

    /// Convert to the display representation.
    pub fn to_display(&self) -> Result<Decimal, AmountError> {
        if self.amount < Decimal::ZERO {
            return Err(AmountError::InvalidAmount(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }

        if !self.is_raw {
            return Ok(self.amount);
        }

        self.amount
            .checked_div(pow10(self.decimals)?)
            .ok_or_else(|| overflow(self.amount, self.decimals))
    }

    /// Display representation rendered without trailing zeros.
    pub fn format(&self) -> Result<String, AmountError> {
        Ok(self.to_display()?.normalize().to_string())
    }
}

fn pow10(decimals: u32) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::AmountOverflow(format!(
            "precision of {decimals} decimals is not representable"
        )));
    }
    Ok(Decimal::from_i128_with_scale(10i128.pow(decimals), 0))
}

fn overflow(amount: Decimal, decimals: u32) -> AmountError {
    AmountError::AmountOverflow(format!("{amount} at {decimals} decimals exceeds the u64 range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn display_to_raw_scales_by_decimals() {
        let amount = TokenAmount::new(dec("1.5"), 9, false);
        assert_eq!(amount.to_raw().unwrap(), 1_500_000_000);
    }

    #[test]
    fn raw_display_round_trip_is_exact() {
        for (display, decimals) in
            [("1.5", 9u32), ("0.000001", 6), ("42", 0), ("123456.789", 5), ("0", 9)]
        {
            let raw = TokenAmount::new(dec(display), decimals, false).to_raw().unwrap();
            let back = TokenAmount::from_raw(raw, decimals).to_display().unwrap();
            assert_eq!(back, dec(display), "{display} at {decimals} decimals");
        }
    }

    #[test]
    fn negative_amount_is_invalid() {
        let err = TokenAmount::new(dec("-1"), 6, false).to_raw().unwrap_err();
        assert!(matches!(err, AmountError::InvalidAmount(_)));
    }

    #[test]
    fn excess_precision_does_not_truncate() {
        // 6-decimal asset cannot hold a 7th fractional digit.
        let err = TokenAmount::new(dec("0.1234567"), 6, false).to_raw().unwrap_err();
        assert!(matches!(err, AmountError::InvalidAmount(_)));
    }

    #[test]
    fn scaled_value_beyond_u64_overflows() {
        let err = TokenAmount::new(dec("18446744073709551616"), 0, false).to_raw().unwrap_err();
        assert!(matches!(err, AmountError::AmountOverflow(_)));

        let err = TokenAmount::new(dec("20000000000000"), 9, false).to_raw().unwrap_err();
        assert!(matches!(err, AmountError::AmountOverflow(_)));
    }

    #[test]
    fn format_strips_trailing_zeros() {
        assert_eq!(TokenAmount::from_raw(1_500_000_000, 9).format().unwrap(), "1.5");
        assert_eq!(TokenAmount::from_raw(0, 6).format().unwrap(), "0");
    }
}
