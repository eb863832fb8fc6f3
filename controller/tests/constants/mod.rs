use alloy_primitives::{address, Address};

pub const BORROWER: Address = address!("00000000000000000000000000000000000b0b00");

pub const WEI: u128 = 1_000_000_000_000_000_000;

pub const NATIVE_DECIMALS: u8 = 18;
pub const DEBT_DECIMALS: u8 = 18;

pub const LTV_BPS: u128 = 8_000; // 80%
pub const LIQ_THRESHOLD_BPS: u128 = 8_250; // 82.5%

pub const PRICE_ANSWER: i64 = 250_000_000; // 2.5 native per debt token
pub const FEED_DECIMALS: u8 = 8;

pub const RPC_URL: &str = "http://127.0.0.1:8545";
