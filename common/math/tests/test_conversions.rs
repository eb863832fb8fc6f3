use alloy_primitives::U256;
use common_errors::MathError;
use common_math::{to_base_units, to_decimal, Amount};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_eight_decimal_price_answer() {
    let price = to_decimal(U256::from(250_000_000u64), 8).unwrap();
    assert_eq!(price, dec!(2.5));
}

#[test]
fn test_deposit_amount_in_wei() {
    let raw = to_base_units(dec!(0.1), 18).unwrap();
    assert_eq!(raw, U256::from(100_000_000_000_000_000u128));
}

#[test]
fn test_excess_digits_are_truncated() {
    // 0.123456789 with 6 decimals keeps 0.123456, never rounds up
    let raw = to_base_units(dec!(0.123456789), 6).unwrap();
    assert_eq!(raw, U256::from(123_456u64));

    let amount = Amount::from_decimal(dec!(1.9999999), 2).unwrap();
    assert_eq!(amount.into_raw_units(), U256::from(199u64));
}

#[test]
fn test_negative_amount_rejected() {
    assert_eq!(
        to_base_units(dec!(-0.5), 18),
        Err(MathError::NegativeAmount)
    );
}

#[test]
fn test_value_too_large_for_decimal() {
    assert_eq!(to_decimal(U256::MAX, 18), Err(MathError::Overflow));
}

#[test]
fn test_more_decimals_than_decimal_scale() {
    // 1.5 expressed with 30 decimals
    let raw = U256::from(15u64) * U256::from(10u64).pow(U256::from(29u64));
    assert_eq!(to_decimal(raw, 30).unwrap(), dec!(1.5));
}

#[test]
fn test_round_trip_within_one_unit() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..500 {
        let decimals: u8 = *[6u8, 8, 18].choose(&mut rng).unwrap();
        let mantissa: i64 = rng.random_range(0..=10_000_000_000i64);
        let scale: u32 = rng.random_range(0..=20);
        let value = Decimal::new(mantissa, scale);

        let raw = to_base_units(value, decimals).unwrap();
        let back = to_decimal(raw, decimals).unwrap();

        let unit = Decimal::new(1, decimals as u32);
        assert!(back <= value, "{value} -> {back}");
        assert!(value - back < unit, "{value} -> {back} at {decimals} decimals");
    }
}
