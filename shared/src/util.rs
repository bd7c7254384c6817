use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert a major-unit amount (e.g. 12.50 USD) into minor units (1250 cents).
///
/// Rounds half away from zero; `None` when the result does not fit an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Convert minor units (cents) back into a major-unit amount
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}
