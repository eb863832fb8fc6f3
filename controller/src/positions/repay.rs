use common_math::Amount;
use common_proxies::{PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient};
use common_structs::Step;
use log::info;

use crate::{BorrowWorkflow, WorkflowError};

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    /// Repays exactly the borrowed base-unit amount: approves the pool for
    /// it, then repays once the approval is confirmed.
    pub async fn repay(&mut self) -> Result<Amount, WorkflowError> {
        self.ensure_stage(Step::Repay)?;
        let amount = self.borrowed.ok_or(WorkflowError::OutOfOrder {
            step: Step::Repay,
            expected: Step::Repay.required_stage(),
            actual: self.stage,
        })?;
        let pool = self.pool.address();

        info!("Approving {amount} debt token for {pool}");
        self.debt
            .approve(pool, amount.into_raw_units())
            .await
            .map_err(self.step_failed(Step::Repay))?;

        self.pool
            .repay(
                self.debt.address(),
                amount.into_raw_units(),
                self.policy.interest_rate_mode,
                self.account,
            )
            .await
            .map_err(self.step_failed(Step::Repay))?;
        info!("Repaid {amount}");

        self.advance(Step::Repay);
        Ok(amount)
    }
}
