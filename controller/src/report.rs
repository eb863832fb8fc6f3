use alloy_primitives::TxHash;
use common_math::Amount;
use common_structs::{AccountPosition, BorrowPlan};

/// What a full run did, with the position observed after each
/// state-changing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    /// `None` when the account already held the collateral token
    pub wrap_tx: Option<TxHash>,
    pub supplied: Amount,
    pub after_supply: AccountPosition,
    pub plan: BorrowPlan,
    pub borrowed: Amount,
    pub after_borrow: AccountPosition,
    pub repaid: Amount,
    pub after_repay: AccountPosition,
}
