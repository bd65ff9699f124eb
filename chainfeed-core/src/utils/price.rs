use bigdecimal::{num_bigint::BigInt, BigDecimal};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("base token balance is zero")]
    ZeroBaseBalance,
}

/// Returns `10^(base_decimals - quote_decimals)`. The exponent may be negative.
pub fn scaling_factor(base_decimals: u8, quote_decimals: u8) -> BigDecimal {
    let exponent = i64::from(base_decimals) - i64::from(quote_decimals);
    // `BigDecimal::new(digits, scale)` is `digits * 10^-scale`
    BigDecimal::new(BigInt::from(1u8), -exponent)
}

/// Computes `quote / base * 10^(base_decimals - quote_decimals)` from raw balances.
///
/// Balances are the unscaled integer amounts held by the vaults, so the
/// decimal adjustment turns the ratio of raw units into a ratio of whole
/// tokens.
pub fn calculate_price(
    base_balance: u64,
    quote_balance: u64,
    base_decimals: u8,
    quote_decimals: u8,
) -> Result<BigDecimal, PriceError> {
    if base_balance == 0 {
        return Err(PriceError::ZeroBaseBalance)
    }
    let quo = BigDecimal::from(quote_balance) / BigDecimal::from(base_balance);
    Ok(quo * scaling_factor(base_decimals, quote_decimals))
}
