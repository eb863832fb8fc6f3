use common_math::{borrow_target, Amount};
use common_proxies::{PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient};
use common_structs::{AccountPosition, BorrowPlan, PriceQuote, Step};
use log::{debug, info};

use crate::{BorrowWorkflow, WorkflowError};

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    /// Reads the available capacity and the debt token price, then sizes the
    /// borrow at `safety_factor` of the capacity:
    ///
    /// `target = (1 / price) * (available * safety_factor)`
    ///
    /// Only the final amount is quantized to base units, truncated so it
    /// never exceeds the target. Nothing is submitted and the stage is left
    /// untouched.
    pub async fn preview_borrow(&self) -> Result<BorrowPlan, WorkflowError> {
        let data = self
            .pool
            .user_account_data(self.account)
            .await
            .map_err(self.step_failed(Step::PlanBorrow))?;
        let position = AccountPosition::from_account_data(&data, self.network.native_decimals)
            .map_err(self.math_failed())?;

        let (feed_decimals, round) = self
            .fetch_round()
            .await
            .map_err(self.step_failed(Step::PlanBorrow))?;
        let quote = PriceQuote::from_round(&round, feed_decimals).map_err(self.math_failed())?;

        let safety_factor = self.policy.safety_factor;
        let target = borrow_target(position.available_to_borrow, quote.price, safety_factor)
            .map_err(self.math_failed())?;
        let amount = Amount::from_decimal(target, self.network.debt_decimals)
            .map_err(self.math_failed())?;
        debug!("Borrow amount in base units: {}", amount.raw_units());

        Ok(BorrowPlan {
            available_to_borrow: position.available_to_borrow,
            quote,
            safety_factor,
            target,
            amount,
        })
    }

    /// Sizes the borrow (see `preview_borrow`) and keeps the plan for `borrow`.
    pub async fn plan_borrow(&mut self) -> Result<BorrowPlan, WorkflowError> {
        self.ensure_stage(Step::PlanBorrow)?;

        let plan = self.preview_borrow().await?;
        info!(
            "Capacity {} native at price {}: borrowing {}",
            plan.available_to_borrow.normalize(),
            plan.quote.price.normalize(),
            plan.amount
        );

        self.plan = Some(plan);
        self.advance(Step::PlanBorrow);
        Ok(plan)
    }

    /// Submits the planned borrow at the configured interest rate mode.
    pub async fn borrow(&mut self) -> Result<Amount, WorkflowError> {
        self.ensure_stage(Step::Borrow)?;
        let amount = self.planned_amount()?;

        self.pool
            .borrow(
                self.debt.address(),
                amount.into_raw_units(),
                self.policy.interest_rate_mode,
                self.policy.referral_code,
                self.account,
            )
            .await
            .map_err(self.step_failed(Step::Borrow))?;
        info!("Borrowed {amount}");

        self.borrowed = Some(amount);
        self.advance(Step::Borrow);
        Ok(amount)
    }

    fn planned_amount(&self) -> Result<Amount, WorkflowError> {
        self.plan
            .map(|plan| plan.amount)
            .ok_or(WorkflowError::OutOfOrder {
                step: Step::Borrow,
                expected: Step::Borrow.required_stage(),
                actual: self.stage,
            })
    }
}
