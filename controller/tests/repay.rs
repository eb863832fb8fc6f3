use alloy_primitives::U256;
use common_errors::ChainError;
use common_structs::{Stage, Step};
use controller::WorkflowError;
use pool_mock::{ChainEvent, MockCall, DEBT_TOKEN_ADDRESS, POOL_ADDRESS};
use rust_decimal_macros::dec;

pub mod constants;
pub mod setup;
use constants::*;
use setup::*;

#[tokio::test]
async fn test_repay_exact_borrowed_amount_clears_debt() {
    let mut state = WorkflowTestState::new().await;
    state.supply_and_borrow(dec!(1.25)).await;
    let borrowed = state.workflow.borrowed().unwrap();

    let repaid = state.workflow.repay().await.unwrap();

    assert_eq!(repaid, borrowed);
    assert_eq!(state.workflow.stage(), Stage::Repaid);
    assert_eq!(state.chain.debt_of(BORROWER), U256::ZERO);

    let position = state.workflow.query_position().await.unwrap();
    assert_eq!(position.total_debt, dec!(0));
    assert_eq!(position.available_to_borrow, dec!(1));
    assert!(position.has_unbounded_health());
}

#[tokio::test]
async fn test_repay_approves_debt_token_first() {
    let mut state = WorkflowTestState::new().await;
    state.supply_and_borrow(dec!(1.25)).await;
    let amount = state.workflow.borrowed().unwrap().into_raw_units();

    state.workflow.repay().await.unwrap();

    let events = state.chain.events();
    let tail = &events[events.len() - 2..];
    assert_eq!(
        tail,
        &[
            ChainEvent::Approved {
                token: DEBT_TOKEN_ADDRESS,
                owner: BORROWER,
                spender: POOL_ADDRESS,
                amount,
            },
            ChainEvent::Repaid {
                asset: DEBT_TOKEN_ADDRESS,
                amount,
                on_behalf_of: BORROWER,
            },
        ]
    );
}

#[tokio::test]
async fn test_repay_with_accrued_interest_leaves_dust() {
    let mut state = WorkflowTestState::new().await;
    state.supply_and_borrow(dec!(1.25)).await;
    let borrowed = state.workflow.borrowed().unwrap().into_raw_units();

    // 1% interest on the open debt
    state.chain.accrue_interest(100);
    state.workflow.repay().await.unwrap();

    let remaining = state.chain.debt_of(BORROWER);
    assert_eq!(remaining, borrowed / U256::from(100u64));

    let position = state.workflow.query_position().await.unwrap();
    assert!(position.total_debt < dec!(0.01));
}

#[tokio::test]
async fn test_repay_approval_failure_skips_repay() {
    let mut state = WorkflowTestState::new().await;
    state.supply_and_borrow(dec!(1.25)).await;
    let events_before = state.chain.events().len();
    state.chain.fail_on(MockCall::Approve);

    let err = state.workflow.repay().await.unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Step {
            step: Step::Repay,
            stage: Stage::Borrowed,
            source: ChainError::Reverted { .. },
        }
    ));
    assert_eq!(state.chain.events().len(), events_before);
    assert_eq!(state.workflow.stage(), Stage::Borrowed);
    assert!(state.chain.debt_of(BORROWER) > U256::ZERO);
}

#[tokio::test]
async fn test_repay_failure_keeps_borrowed_stage() {
    let mut state = WorkflowTestState::new().await;
    state.supply_and_borrow(dec!(1.25)).await;
    state.chain.fail_on(MockCall::Repay);

    let err = state.workflow.repay().await.unwrap_err();
    assert_eq!(err.halted_at(), Some(Stage::Borrowed));

    // The approval confirmed before the failing repay and is not rolled back
    let amount = state.workflow.borrowed().unwrap().into_raw_units();
    assert_eq!(
        state
            .chain
            .allowance(DEBT_TOKEN_ADDRESS, BORROWER, POOL_ADDRESS),
        amount
    );

    state.chain.clear_failures();
    state.workflow.repay().await.unwrap();
    assert_eq!(state.chain.debt_of(BORROWER), U256::ZERO);
}

#[tokio::test]
async fn test_repay_before_borrow_is_rejected() {
    let mut state = WorkflowTestState::new().await;
    state.supply(dec!(1.25)).await;

    let err = state.workflow.repay().await.unwrap_err();

    assert_eq!(
        err,
        WorkflowError::OutOfOrder {
            step: Step::Repay,
            expected: Stage::Borrowed,
            actual: Stage::Supplied,
        }
    );
}
