use core::{cmp::Ordering, fmt};

use alloy_primitives::U256;
use common_constants::{BPS_PRECISION, MAX_DECIMAL_SCALE, WAD_PRECISION};
use common_errors::MathError;
use rust_decimal::{Decimal, RoundingStrategy};

/// An on-chain token amount: an integer in the asset's smallest unit plus the
/// number of decimals that unit is scaled by.
///
/// Values submitted to a contract are always taken from `into_raw_units`, a
/// `Decimal` never crosses the contract boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    raw: U256,
    decimals: u8,
}

impl Amount {
    pub const fn from_raw_units(raw: U256, decimals: u8) -> Self {
        Amount { raw, decimals }
    }

    pub const fn zero(decimals: u8) -> Self {
        Amount::from_raw_units(U256::ZERO, decimals)
    }

    /// Quantizes a human readable value, truncating digits the asset can not hold.
    pub fn from_decimal(value: Decimal, decimals: u8) -> Result<Self, MathError> {
        Ok(Amount::from_raw_units(to_base_units(value, decimals)?, decimals))
    }

    pub fn into_raw_units(self) -> U256 {
        self.raw
    }

    pub fn raw_units(&self) -> &U256 {
        &self.raw
    }

    pub fn scale(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    pub fn to_decimal(&self) -> Result<Decimal, MathError> {
        to_decimal(self.raw, self.decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{}", value.normalize()),
            Err(_) => write!(f, "{} (raw, {} decimals)", self.raw, self.decimals),
        }
    }
}

pub fn pow10(exponent: u32) -> Result<U256, MathError> {
    U256::from(10u64)
        .checked_pow(U256::from(exponent))
        .ok_or(MathError::Overflow)
}

/// Scales a decimal up to base units. Digits past `decimals` are truncated
/// toward zero so the result never exceeds `value`.
pub fn to_base_units(value: Decimal, decimals: u8) -> Result<U256, MathError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::NegativeAmount);
    }

    let decimals = decimals as u32;
    let truncated =
        value.round_dp_with_strategy(decimals.min(MAX_DECIMAL_SCALE), RoundingStrategy::ToZero);

    let mantissa = u128::try_from(truncated.mantissa()).map_err(|_| MathError::NegativeAmount)?;
    let factor = pow10(decimals - truncated.scale())?;

    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(MathError::Overflow)
}

/// Converts base units back to a decimal. Assets with more decimals than a
/// `Decimal` can carry are rounded half-up to the widest supported scale.
pub fn to_decimal(raw: U256, decimals: u8) -> Result<Decimal, MathError> {
    let mut scale = decimals as u32;
    let mut raw = raw;
    if scale > MAX_DECIMAL_SCALE {
        raw = rescale_half_up(raw, scale, MAX_DECIMAL_SCALE)?;
        scale = MAX_DECIMAL_SCALE;
    }

    let mantissa = u128::try_from(raw).map_err(|_| MathError::Overflow)?;
    let mantissa = i128::try_from(mantissa).map_err(|_| MathError::Overflow)?;

    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| MathError::Overflow)
}

/// Same as `to_decimal` but clamps values too large for a `Decimal`.
/// Pools report a position without debt with a health factor of `U256::MAX`.
pub fn to_decimal_saturating(raw: U256, decimals: u8) -> Decimal {
    to_decimal(raw, decimals).unwrap_or(Decimal::MAX)
}

pub fn to_decimal_wad(raw: U256) -> Result<Decimal, MathError> {
    to_decimal(raw, WAD_PRECISION as u8)
}

pub fn to_decimal_bps(raw: U256) -> Result<Decimal, MathError> {
    to_decimal(raw, BPS_PRECISION as u8)
}

pub fn rescale_half_up(raw: U256, old_precision: u32, new_precision: u32) -> Result<U256, MathError> {
    match new_precision.cmp(&old_precision) {
        Ordering::Equal => Ok(raw),
        Ordering::Less => {
            let factor = pow10(old_precision - new_precision)?;
            let half_factor = factor / U256::from(2u64);

            let rounded = raw.checked_add(half_factor).ok_or(MathError::Overflow)? / factor;
            Ok(rounded)
        },
        Ordering::Greater => {
            let factor = pow10(new_precision - old_precision)?;
            raw.checked_mul(factor).ok_or(MathError::Overflow)
        },
    }
}

/// Amount of the target asset to borrow given the capacity left in the
/// reference asset and the target's price expressed in the reference asset:
///
/// `target = (1 / price) * (available * safety_factor)`
///
/// Evaluated as a single division so the result carries one rounding step.
/// `safety_factor` has to lie strictly between 0 and 1 so the target stays
/// below the capacity.
pub fn borrow_target(
    available: Decimal,
    price: Decimal,
    safety_factor: Decimal,
) -> Result<Decimal, MathError> {
    if safety_factor <= Decimal::ZERO || safety_factor >= Decimal::ONE {
        return Err(MathError::InvalidSafetyFactor);
    }
    if price.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if price.is_sign_negative() {
        return Err(MathError::NegativePrice);
    }

    let capped = available
        .checked_mul(safety_factor)
        .ok_or(MathError::Overflow)?;

    capped.checked_div(price).ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_display_normalizes_trailing_zeros() {
        let amount = Amount::from_raw_units(U256::from(100_000_000_000_000_000u128), 18);
        assert_eq!(amount.to_string(), "0.1");
    }

    #[test]
    fn saturating_conversion_caps_max_health_factor() {
        assert_eq!(to_decimal_saturating(U256::MAX, 18), Decimal::MAX);
    }
}
