/// Represents 1 unit of an 18-decimal asset (1 ETH, 1 DAI)
pub const WAD: u128 = 1_000_000_000_000_000_000;
pub const WAD_PRECISION: u32 = 18;

pub const BPS: u128 = 10_000; // 100%
pub const BPS_PRECISION: u32 = 4;

/// Largest scale a decimal can carry without losing its mantissa
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// Default share of the available borrow capacity that is actually borrowed (95%)
pub const DEFAULT_SAFETY_FACTOR_BPS: u128 = 9_500;

/// Interest rate mode flag passed to `borrow` and `repay` for variable-rate debt
pub const VARIABLE_RATE_MODE: u8 = 1;
pub const DEFAULT_INTEREST_RATE_MODE: u8 = VARIABLE_RATE_MODE;

/// No referral program is used
pub const DEFAULT_REFERRAL_CODE: u16 = 0;

pub const DEFAULT_CONFIRMATIONS: u64 = 1;

pub const NATIVE_DECIMALS: u8 = 18;

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_NETWORK: &str = "mainnet-fork";
pub const DEFAULT_KEY_ENV: &str = "PRIVATE_KEY";
