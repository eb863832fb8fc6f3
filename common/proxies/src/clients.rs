#![allow(async_fn_in_trait)]

use alloy::primitives::{Address, TxHash, U256};
use common_errors::ChainError;
use common_structs::{RoundData, UserAccountData};

/// Every method submitting a transaction resolves only once the transaction
/// is confirmed, so callers awaiting one step can start the next safely.
pub trait TokenClient {
    fn address(&self) -> Address;

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError>;
}

/// Token minted one-to-one against the native currency sent along.
pub trait WrappedNativeClient: TokenClient {
    async fn deposit(&self, value: U256) -> Result<TxHash, ChainError>;
}

pub trait PoolClient {
    fn address(&self) -> Address;

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxHash, ChainError>;

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError>;

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError>;

    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError>;
}

/// Registry resolving the current lending pool deployment.
pub trait PoolAddressesProviderClient {
    type Pool: PoolClient;

    async fn lending_pool(&self) -> Result<Self::Pool, ChainError>;
}

pub trait PriceFeedClient {
    fn address(&self) -> Address;

    async fn decimals(&self) -> Result<u8, ChainError>;

    async fn latest_round_data(&self) -> Result<RoundData, ChainError>;
}
