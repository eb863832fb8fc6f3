//! Collateralized borrow workflow against an Aave-style lending pool.
//!
//! The workflow walks `Idle → Wrapped → Supplied → CapacityKnown → Borrowed
//! → Repaid → Done`, one confirmed transaction at a time. A failing step
//! leaves the workflow at the stage it was in; nothing already confirmed is
//! rolled back.

pub mod errors;
pub mod oracle;
pub mod positions;
pub mod report;

use alloy_primitives::Address;
use common_math::Amount;
use common_proxies::{
    PoolAddressesProviderClient, PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient,
};
use log::info;

pub use common_errors::*;
pub use common_structs::*;
pub use errors::WorkflowError;
pub use report::WorkflowReport;

/// Sequential orchestrator over one client per contract role.
///
/// - `C`: wrapped native token used as collateral.
/// - `D`: token borrowed and repaid.
/// - `P`: lending pool.
/// - `F`: price feed quoting `D` in the native currency.
pub struct BorrowWorkflow<C, D, P, F> {
    pub(crate) collateral: C,
    pub(crate) debt: D,
    pub(crate) pool: P,
    pub(crate) price_feed: F,
    pub(crate) account: Address,
    pub(crate) network: NetworkRecord,
    pub(crate) policy: BorrowPolicy,
    pub(crate) stage: Stage,
    pub(crate) plan: Option<BorrowPlan>,
    pub(crate) borrowed: Option<Amount>,
}

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    pub fn new(
        collateral: C,
        debt: D,
        pool: P,
        price_feed: F,
        account: Address,
        network: NetworkRecord,
        policy: BorrowPolicy,
    ) -> Self {
        BorrowWorkflow {
            collateral,
            debt,
            pool,
            price_feed,
            account,
            network,
            policy,
            stage: Stage::Idle,
            plan: None,
            borrowed: None,
        }
    }

    /// Builds the workflow with the pool currently registered in the
    /// addresses provider.
    ///
    /// # Arguments
    /// - `addresses_provider`: Registry of the pool deployment.
    /// - `collateral`: Wrapped native token client.
    /// - `debt`: Borrowed token client.
    /// - `price_feed`: Oracle quoting the borrowed token in native currency.
    /// - `account`: Address signing every transaction.
    /// - `network`: Addresses and precisions of the active network.
    /// - `policy`: Safety factor, rate mode, referral code, confirmations.
    #[allow(clippy::too_many_arguments)]
    pub async fn connect<A>(
        addresses_provider: &A,
        collateral: C,
        debt: D,
        price_feed: F,
        account: Address,
        network: NetworkRecord,
        policy: BorrowPolicy,
    ) -> Result<Self, WorkflowError>
    where
        A: PoolAddressesProviderClient<Pool = P>,
    {
        let pool = addresses_provider
            .lending_pool()
            .await
            .map_err(WorkflowError::Resolve)?;
        info!("Lending pool resolved at {}", pool.address());

        Ok(BorrowWorkflow::new(
            collateral, debt, pool, price_feed, account, network, policy,
        ))
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn pool_address(&self) -> Address {
        self.pool.address()
    }

    pub fn policy(&self) -> &BorrowPolicy {
        &self.policy
    }

    pub fn plan(&self) -> Option<&BorrowPlan> {
        self.plan.as_ref()
    }

    pub fn borrowed(&self) -> Option<Amount> {
        self.borrowed
    }

    /// Runs every step in order and reports the position after each
    /// state-changing one.
    pub async fn run(
        &mut self,
        collateral_amount: rust_decimal::Decimal,
    ) -> Result<WorkflowReport, WorkflowError> {
        let wrap_tx = self.acquire_collateral(collateral_amount).await?;
        let supplied = self.approve_and_supply(collateral_amount).await?;
        let after_supply = self.query_position().await?;

        let plan = self.plan_borrow().await?;
        let borrowed = self.borrow().await?;
        let after_borrow = self.query_position().await?;

        let repaid = self.repay().await?;
        let after_repay = self.query_position().await?;
        self.finish()?;

        Ok(WorkflowReport {
            wrap_tx,
            supplied,
            after_supply,
            plan,
            borrowed,
            after_borrow,
            repaid,
            after_repay,
        })
    }

    pub fn finish(&mut self) -> Result<(), WorkflowError> {
        self.ensure_stage(Step::Finish)?;
        self.advance(Step::Finish);
        Ok(())
    }

    pub(crate) fn ensure_stage(&self, step: Step) -> Result<(), WorkflowError> {
        let expected = step.required_stage();
        if self.stage != expected {
            return Err(WorkflowError::OutOfOrder {
                step,
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    pub(crate) fn advance(&mut self, step: Step) {
        let next = step.next_stage();
        info!("{step} done: {} -> {next}", self.stage);
        self.stage = next;
    }

    pub(crate) fn math_failed(&self) -> impl Fn(MathError) -> WorkflowError {
        let stage = self.stage;
        move |source| WorkflowError::Math { stage, source }
    }

    pub(crate) fn step_failed(&self, step: Step) -> impl Fn(ChainError) -> WorkflowError {
        let stage = self.stage;
        move |source| WorkflowError::Step {
            step,
            stage,
            source,
        }
    }
}
