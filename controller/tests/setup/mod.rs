use crate::constants::*;

use alloy_primitives::{I256, U256};
use controller::{BorrowPolicy, BorrowWorkflow, NetworkRecord};
use pool_mock::{
    MarketParams, MockChain, MockPool, MockPriceFeed, MockToken, MockWrappedNative,
    ADDRESSES_PROVIDER_ADDRESS, COLLATERAL_TOKEN_ADDRESS, DEBT_TOKEN_ADDRESS,
    PRICE_FEED_ADDRESS,
};

pub type MockWorkflow = BorrowWorkflow<MockWrappedNative, MockToken, MockPool, MockPriceFeed>;

pub fn network(wrap_native: bool) -> NetworkRecord {
    NetworkRecord {
        rpc_url: RPC_URL.to_string(),
        collateral_token: COLLATERAL_TOKEN_ADDRESS,
        debt_token: DEBT_TOKEN_ADDRESS,
        price_feed: PRICE_FEED_ADDRESS,
        pool_addresses_provider: ADDRESSES_PROVIDER_ADDRESS,
        native_decimals: NATIVE_DECIMALS,
        debt_decimals: DEBT_DECIMALS,
        wrap_native,
    }
}

pub fn market_params() -> MarketParams {
    MarketParams {
        ltv_bps: LTV_BPS,
        liquidation_threshold_bps: LIQ_THRESHOLD_BPS,
        price_answer: I256::try_from(PRICE_ANSWER).unwrap(),
        feed_decimals: FEED_DECIMALS,
    }
}

/// `tenths` tenths of a whole 18-decimal unit.
pub fn tenths(tenths: u64) -> U256 {
    U256::from(tenths) * U256::from(WEI / 10)
}

pub struct WorkflowTestState {
    pub chain: MockChain,
    pub workflow: MockWorkflow,
}

impl WorkflowTestState {
    pub async fn new() -> Self {
        Self::with_policy(true, BorrowPolicy::default()).await
    }

    pub async fn with_policy(wrap_native: bool, policy: BorrowPolicy) -> Self {
        let chain = MockChain::with_params(BORROWER, market_params());
        chain.fund_native(BORROWER, tenths(100));

        let workflow = BorrowWorkflow::connect(
            &chain.addresses_provider(),
            chain.wrapped_native(),
            chain.debt_token(),
            chain.price_feed(),
            BORROWER,
            network(wrap_native),
            policy,
        )
        .await
        .unwrap();

        WorkflowTestState { chain, workflow }
    }

    /// Wraps and supplies `amount` of collateral.
    pub async fn supply(&mut self, amount: rust_decimal::Decimal) {
        self.workflow.acquire_collateral(amount).await.unwrap();
        self.workflow.approve_and_supply(amount).await.unwrap();
    }

    /// Supplies `amount` and borrows against it.
    pub async fn supply_and_borrow(&mut self, amount: rust_decimal::Decimal) {
        self.supply(amount).await;
        self.workflow.plan_borrow().await.unwrap();
        self.workflow.borrow().await.unwrap();
    }
}
