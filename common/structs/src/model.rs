use core::fmt;
use std::collections::BTreeMap;

use alloy_primitives::{Address, I256, U256};
use common_constants::{
    BPS_PRECISION, DEFAULT_CONFIRMATIONS, DEFAULT_INTEREST_RATE_MODE, DEFAULT_REFERRAL_CODE,
    DEFAULT_SAFETY_FACTOR_BPS, NATIVE_DECIMALS, WAD_PRECISION,
};
use common_errors::MathError;
use common_math::{to_decimal, to_decimal_saturating, Amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contract addresses and asset precisions for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub rpc_url: String,
    /// Wrapped native token supplied as collateral
    pub collateral_token: Address,
    pub debt_token: Address,
    /// Oracle pricing the debt token in the native currency
    pub price_feed: Address,
    pub pool_addresses_provider: Address,
    #[serde(default = "default_decimals")]
    pub native_decimals: u8,
    #[serde(default = "default_decimals")]
    pub debt_decimals: u8,
    /// Wrap native currency before supplying. Off when the account already
    /// holds the wrapped token.
    #[serde(default)]
    pub wrap_native: bool,
}

fn default_decimals() -> u8 {
    NATIVE_DECIMALS
}

/// Knobs of the borrow workflow that are protocol policy rather than math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorrowPolicy {
    /// Share of the available capacity that is borrowed
    #[serde(with = "rust_decimal::serde::str")]
    pub safety_factor: Decimal,
    pub interest_rate_mode: u8,
    pub referral_code: u16,
    /// Blocks a transaction must be buried under before the next step starts
    pub confirmations: u64,
}

impl BorrowPolicy {
    /// Rejects a safety factor that would size a borrow at or above the
    /// available capacity.
    pub fn validate(&self) -> Result<(), MathError> {
        if self.safety_factor <= Decimal::ZERO || self.safety_factor >= Decimal::ONE {
            return Err(MathError::InvalidSafetyFactor);
        }
        Ok(())
    }
}

impl Default for BorrowPolicy {
    fn default() -> Self {
        BorrowPolicy {
            safety_factor: Decimal::from_i128_with_scale(
                DEFAULT_SAFETY_FACTOR_BPS as i128,
                BPS_PRECISION,
            ),
            interest_rate_mode: DEFAULT_INTEREST_RATE_MODE,
            referral_code: DEFAULT_REFERRAL_CODE,
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }
}

/// Immutable for the lifetime of a run, passed explicitly to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub policy: BorrowPolicy,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkRecord>,
}

impl NetworkConfig {
    pub fn network(&self, name: &str) -> Option<&NetworkRecord> {
        self.networks.get(name)
    }
}

/// Raw `getUserAccountData` result, every field in base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserAccountData {
    pub total_collateral: U256,
    pub total_debt: U256,
    pub available_borrows: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

/// Decimal view of a position. Fetched fresh each time it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPosition {
    pub total_collateral: Decimal,
    pub total_debt: Decimal,
    pub available_to_borrow: Decimal,
    pub liquidation_threshold: Decimal,
    pub loan_to_value: Decimal,
    pub health_factor: Decimal,
}

impl AccountPosition {
    /// Monetary fields are denominated in the pool's reference asset
    /// (`reference_decimals`), ratios come in basis points and the health
    /// factor in WAD.
    pub fn from_account_data(
        data: &UserAccountData,
        reference_decimals: u8,
    ) -> Result<Self, MathError> {
        Ok(AccountPosition {
            total_collateral: to_decimal(data.total_collateral, reference_decimals)?,
            total_debt: to_decimal(data.total_debt, reference_decimals)?,
            available_to_borrow: to_decimal(data.available_borrows, reference_decimals)?,
            liquidation_threshold: to_decimal(
                data.current_liquidation_threshold,
                BPS_PRECISION as u8,
            )?,
            loan_to_value: to_decimal(data.ltv, BPS_PRECISION as u8)?,
            health_factor: to_decimal_saturating(data.health_factor, WAD_PRECISION as u8),
        })
    }

    pub fn has_unbounded_health(&self) -> bool {
        self.health_factor == Decimal::MAX
    }
}

impl fmt::Display for AccountPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "collateral:            {}", self.total_collateral.normalize())?;
        writeln!(f, "debt:                  {}", self.total_debt.normalize())?;
        writeln!(f, "available to borrow:   {}", self.available_to_borrow.normalize())?;
        writeln!(f, "liquidation threshold: {}", self.liquidation_threshold.normalize())?;
        writeln!(f, "loan to value:         {}", self.loan_to_value.normalize())?;
        if self.has_unbounded_health() {
            write!(f, "health factor:         unbounded")
        } else {
            write!(f, "health factor:         {}", self.health_factor.normalize())
        }
    }
}

/// `latestRoundData` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u128,
    pub answer: I256,
    pub started_at: U256,
    pub updated_at: U256,
    pub answered_in_round: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    /// Units of the reference asset paid for one unit of the priced asset
    pub price: Decimal,
    pub round_id: u128,
    pub updated_at: U256,
}

impl PriceQuote {
    pub fn from_round(round: &RoundData, feed_decimals: u8) -> Result<Self, MathError> {
        if round.answer.is_negative() {
            return Err(MathError::NegativePrice);
        }

        Ok(PriceQuote {
            price: to_decimal(round.answer.into_raw(), feed_decimals)?,
            round_id: round.round_id,
            updated_at: round.updated_at,
        })
    }
}

/// Amount picked for a borrow together with the inputs it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowPlan {
    pub available_to_borrow: Decimal,
    pub quote: PriceQuote,
    pub safety_factor: Decimal,
    pub target: Decimal,
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Idle,
    Wrapped,
    Supplied,
    CapacityKnown,
    Borrowed,
    Repaid,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Wrapped => "wrapped",
            Stage::Supplied => "supplied",
            Stage::CapacityKnown => "capacity-known",
            Stage::Borrowed => "borrowed",
            Stage::Repaid => "repaid",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    AcquireCollateral,
    Supply,
    PlanBorrow,
    Borrow,
    Repay,
    Finish,
}

impl Step {
    /// Stage the workflow has to be in for this step to run.
    pub fn required_stage(&self) -> Stage {
        match self {
            Step::AcquireCollateral => Stage::Idle,
            Step::Supply => Stage::Wrapped,
            Step::PlanBorrow => Stage::Supplied,
            Step::Borrow => Stage::CapacityKnown,
            Step::Repay => Stage::Borrowed,
            Step::Finish => Stage::Repaid,
        }
    }

    /// Stage reached once the step is confirmed.
    pub fn next_stage(&self) -> Stage {
        match self {
            Step::AcquireCollateral => Stage::Wrapped,
            Step::Supply => Stage::Supplied,
            Step::PlanBorrow => Stage::CapacityKnown,
            Step::Borrow => Stage::Borrowed,
            Step::Repay => Stage::Repaid,
            Step::Finish => Stage::Done,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AcquireCollateral => "acquire collateral",
            Step::Supply => "approve and supply",
            Step::PlanBorrow => "plan borrow",
            Step::Borrow => "borrow",
            Step::Repay => "approve and repay",
            Step::Finish => "finish",
        };
        f.write_str(name)
    }
}
