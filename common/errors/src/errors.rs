use alloy_primitives::TxHash;
use thiserror::Error;

pub static ERROR_NEGATIVE_AMOUNT: &str = "Amounts submitted to the pool can not be negative.";

pub static ERROR_AMOUNT_OVERFLOW: &str = "Amount does not fit the target representation.";

pub static ERROR_PRICE_ZERO: &str = "Price feed returned a zero price.";

pub static ERROR_PRICE_NEGATIVE: &str = "Price feed returned a negative answer.";

pub static ERROR_INVALID_SAFETY_FACTOR: &str = "Safety factor must be above 0 and below 1.";

pub static ERROR_TX_REVERTED: &str = "Transaction reverted.";

pub static ERROR_INSUFFICIENT_ALLOWANCE: &str = "Insufficient allowance.";

pub static ERROR_INSUFFICIENT_BALANCE: &str = "Insufficient balance.";

pub static ERROR_INSUFFICIENT_COLLATERAL: &str = "Not enough collateral available for this loan.";

pub static ERROR_NO_DEBT_TO_REPAY: &str = "No debt of this asset to repay.";

pub static ERROR_UNKNOWN_NETWORK: &str = "Network is not present in the configuration.";

/// Failures surfaced by the chain client. Reverts and transport failures are
/// reported as-is, the workflow never retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("rpc call failed: {0}")]
    Rpc(String),

    #[error("transaction {tx_hash} reverted: {reason}")]
    Reverted { tx_hash: TxHash, reason: String },

    #[error("signer error: {0}")]
    Signer(String),

    #[error("invalid contract response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    pub fn rpc(err: impl ToString) -> Self {
        ChainError::Rpc(err.to_string())
    }

    pub fn reverted(tx_hash: TxHash) -> Self {
        ChainError::Reverted {
            tx_hash,
            reason: ERROR_TX_REVERTED.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("{}", ERROR_AMOUNT_OVERFLOW)]
    Overflow,

    #[error("{}", ERROR_NEGATIVE_AMOUNT)]
    NegativeAmount,

    #[error("{}", ERROR_PRICE_ZERO)]
    DivisionByZero,

    #[error("{}", ERROR_PRICE_NEGATIVE)]
    NegativePrice,

    #[error("{}", ERROR_INVALID_SAFETY_FACTOR)]
    InvalidSafetyFactor,
}
