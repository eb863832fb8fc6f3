use alloy_primitives::TxHash;
use common_math::Amount;
use common_proxies::{PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient};
use common_structs::Step;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::{BorrowWorkflow, WorkflowError};

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    /// Wraps native currency into the collateral token.
    /// Networks where the account already holds the wrapped token skip the
    /// transaction and return `None`.
    ///
    /// # Arguments
    /// - `amount`: Native currency to wrap, in whole units.
    pub async fn acquire_collateral(
        &mut self,
        amount: Decimal,
    ) -> Result<Option<TxHash>, WorkflowError> {
        self.ensure_stage(Step::AcquireCollateral)?;
        let value = Amount::from_decimal(amount, self.network.native_decimals)
            .map_err(self.math_failed())?;

        if !self.network.wrap_native {
            info!("Collateral already held, nothing to wrap");
            self.advance(Step::AcquireCollateral);
            return Ok(None);
        }

        debug!("Wrapping {} base units", value.raw_units());
        let tx_hash = self
            .collateral
            .deposit(value.into_raw_units())
            .await
            .map_err(self.step_failed(Step::AcquireCollateral))?;
        info!("Received {value} wrapped collateral");

        self.advance(Step::AcquireCollateral);
        Ok(Some(tx_hash))
    }

    /// Grants the pool an allowance of exactly `amount` and supplies it once
    /// the approval is confirmed.
    ///
    /// # Arguments
    /// - `amount`: Collateral to supply, in whole units.
    pub async fn approve_and_supply(&mut self, amount: Decimal) -> Result<Amount, WorkflowError> {
        self.ensure_stage(Step::Supply)?;
        let amount = Amount::from_decimal(amount, self.network.native_decimals)
            .map_err(self.math_failed())?;
        let pool = self.pool.address();

        info!("Approving {amount} collateral for {pool}");
        self.collateral
            .approve(pool, amount.into_raw_units())
            .await
            .map_err(self.step_failed(Step::Supply))?;

        info!("Depositing {amount} collateral");
        self.pool
            .deposit(
                self.collateral.address(),
                amount.into_raw_units(),
                self.account,
                self.policy.referral_code,
            )
            .await
            .map_err(self.step_failed(Step::Supply))?;

        self.advance(Step::Supply);
        Ok(amount)
    }
}
