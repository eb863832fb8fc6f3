use alloy_primitives::U256;
use common_errors::{ChainError, ERROR_INSUFFICIENT_BALANCE};
use common_structs::{BorrowPolicy, Stage, Step};
use controller::WorkflowError;
use pool_mock::{ChainEvent, COLLATERAL_TOKEN_ADDRESS, POOL_ADDRESS};
use rust_decimal_macros::dec;

pub mod constants;
pub mod setup;
use constants::*;
use setup::*;

#[tokio::test]
async fn test_deposit_increases_collateral() {
    let mut state = WorkflowTestState::new().await;

    state.supply(dec!(0.1)).await;

    assert_eq!(state.workflow.stage(), Stage::Supplied);
    let position = state.workflow.query_position().await.unwrap();
    assert!(position.total_collateral >= dec!(0.1));
    assert_eq!(state.chain.collateral_of(BORROWER), tenths(1));
}

#[tokio::test]
async fn test_wrap_moves_native_into_collateral_token() {
    let mut state = WorkflowTestState::new().await;

    let tx = state.workflow.acquire_collateral(dec!(0.1)).await.unwrap();

    assert!(tx.is_some());
    assert_eq!(state.workflow.stage(), Stage::Wrapped);
    assert_eq!(state.chain.native_balance(BORROWER), tenths(99));
    assert_eq!(
        state.chain.balance_of(COLLATERAL_TOKEN_ADDRESS, BORROWER),
        tenths(1)
    );
}

#[tokio::test]
async fn test_supply_approves_exact_amount_first() {
    let mut state = WorkflowTestState::new().await;

    state.supply(dec!(0.1)).await;

    let events = state.chain.events();
    assert_eq!(
        events,
        vec![
            ChainEvent::Wrapped {
                account: BORROWER,
                amount: tenths(1),
            },
            ChainEvent::Approved {
                token: COLLATERAL_TOKEN_ADDRESS,
                owner: BORROWER,
                spender: POOL_ADDRESS,
                amount: tenths(1),
            },
            ChainEvent::Supplied {
                asset: COLLATERAL_TOKEN_ADDRESS,
                amount: tenths(1),
                on_behalf_of: BORROWER,
            },
        ]
    );
    // The exact allowance is fully consumed by the deposit
    assert_eq!(
        state
            .chain
            .allowance(COLLATERAL_TOKEN_ADDRESS, BORROWER, POOL_ADDRESS),
        U256::ZERO
    );
}

#[tokio::test]
async fn test_collateral_already_held_skips_wrap() {
    let mut state = WorkflowTestState::with_policy(false, BorrowPolicy::default()).await;
    state
        .chain
        .mint(COLLATERAL_TOKEN_ADDRESS, BORROWER, tenths(1));

    let tx = state.workflow.acquire_collateral(dec!(0.1)).await.unwrap();
    assert!(tx.is_none());
    assert_eq!(state.workflow.stage(), Stage::Wrapped);
    assert_eq!(state.chain.native_balance(BORROWER), tenths(100));

    state.workflow.approve_and_supply(dec!(0.1)).await.unwrap();
    assert_eq!(state.chain.collateral_of(BORROWER), tenths(1));
}

#[tokio::test]
async fn test_wrap_failure_halts_at_idle() {
    let mut state = WorkflowTestState::new().await;

    let err = state
        .workflow
        .acquire_collateral(dec!(1000))
        .await
        .unwrap_err();

    match err {
        WorkflowError::Step {
            step,
            stage,
            source: ChainError::Reverted { reason, .. },
        } => {
            assert_eq!(step, Step::AcquireCollateral);
            assert_eq!(stage, Stage::Idle);
            assert_eq!(reason, ERROR_INSUFFICIENT_BALANCE);
        },
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.workflow.stage(), Stage::Idle);
    assert!(state.chain.events().is_empty());
}

#[tokio::test]
async fn test_supply_before_wrap_is_rejected() {
    let mut state = WorkflowTestState::new().await;

    let err = state
        .workflow
        .approve_and_supply(dec!(0.1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        WorkflowError::OutOfOrder {
            step: Step::Supply,
            expected: Stage::Wrapped,
            actual: Stage::Idle,
        }
    );
    assert!(state.chain.events().is_empty());
}
