//! Monetary helpers shared by every module.
//!
//! Amounts are carried as [`Decimal`] and rounded to a fixed number of
//! decimal places (the *scale*) after every arithmetic step, so that the
//! matcher never accumulates drift.

use crate::core::validation::ValidationError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Default number of decimal places (cents).
pub const DEFAULT_SCALE: u32 = 2;

/// Largest scale accepted by configuration.
pub const MAX_SCALE: u32 = 8;

/// Round an amount to `scale` decimal places, midpoint away from zero.
///
/// ```
/// use homegame_settlement::core::money::round_to;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_to(dec!(10.005), 2), dec!(10.01));
/// assert_eq!(round_to(dec!(-10.005), 2), dec!(-10.01));
/// ```
pub fn round_to(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// True if the amount rounds to zero at the given scale.
pub fn is_settled(amount: Decimal, scale: u32) -> bool {
    round_to(amount, scale).is_zero()
}

/// Limit a scale to [`MAX_SCALE`].
pub fn clamp_scale(scale: u32) -> u32 {
    scale.min(MAX_SCALE)
}

/// The smallest representable unit at `scale` (0.01 for scale 2).
///
/// Scales above [`MAX_SCALE`] are clamped.
pub fn unit(scale: u32) -> Decimal {
    Decimal::new(1, clamp_scale(scale))
}

/// Convert a float into a decimal amount, rejecting NaN and infinities.
pub fn from_f64(value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteAmount(value.to_string()));
    }
    Decimal::from_f64(value).ok_or_else(|| ValidationError::NonFiniteAmount(value.to_string()))
}

/// Parse a decimal amount from user input such as `"150"` or `"12.50"`.
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(input.trim()).map_err(|_| ValidationError::InvalidAmount(input.to_string()))
}

/// Convert a decimal to `f64` for percentage display.
pub(crate) fn to_f64(amount: Decimal) -> f64 {
    amount.to_string().parse::<f64>().unwrap_or(0.0)
}
