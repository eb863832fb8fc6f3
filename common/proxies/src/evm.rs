use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder},
};
use common_errors::ChainError;
use common_structs::{RoundData, UserAccountData};
use log::{debug, info};

use crate::{
    bindings::{
        AggregatorV3Interface::{self, AggregatorV3InterfaceInstance},
        ILendingPool::{self, ILendingPoolInstance},
        ILendingPoolAddressesProvider::{self, ILendingPoolAddressesProviderInstance},
        IERC20::{self, IERC20Instance},
        IWETH::{self, IWETHInstance},
    },
    PoolAddressesProviderClient, PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient,
};

/// Waits for `confirmations` blocks on top of the transaction and turns a
/// failed receipt into an error.
async fn confirm(
    pending: PendingTransactionBuilder<Ethereum>,
    confirmations: u64,
) -> Result<TxHash, ChainError> {
    let tx_hash = *pending.tx_hash();
    debug!("Waiting for {confirmations} confirmation(s) of {tx_hash}");

    let receipt = pending
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .map_err(ChainError::rpc)?;

    if !ReceiptResponse::status(&receipt) {
        return Err(ChainError::reverted(tx_hash));
    }

    info!(
        "Transaction {tx_hash} confirmed in block {:?}",
        ReceiptResponse::block_number(&receipt)
    );
    Ok(tx_hash)
}

#[derive(Clone)]
pub struct Erc20Client {
    contract: IERC20Instance<DynProvider>,
    confirmations: u64,
}

impl Erc20Client {
    pub fn new(address: Address, provider: DynProvider, confirmations: u64) -> Self {
        Erc20Client {
            contract: IERC20::new(address, provider),
            confirmations,
        }
    }
}

impl TokenClient for Erc20Client {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }
}

#[derive(Clone)]
pub struct WrappedNativeTokenClient {
    contract: IWETHInstance<DynProvider>,
    confirmations: u64,
}

impl WrappedNativeTokenClient {
    pub fn new(address: Address, provider: DynProvider, confirmations: u64) -> Self {
        WrappedNativeTokenClient {
            contract: IWETH::new(address, provider),
            confirmations,
        }
    }
}

impl TokenClient for WrappedNativeTokenClient {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }
}

impl WrappedNativeClient for WrappedNativeTokenClient {
    async fn deposit(&self, value: U256) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .deposit()
            .value(value)
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }
}

#[derive(Clone)]
pub struct LendingPoolClient {
    contract: ILendingPoolInstance<DynProvider>,
    confirmations: u64,
}

impl LendingPoolClient {
    pub fn new(address: Address, provider: DynProvider, confirmations: u64) -> Self {
        LendingPoolClient {
            contract: ILendingPool::new(address, provider),
            confirmations,
        }
    }
}

impl PoolClient for LendingPoolClient {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .deposit(asset, amount, on_behalf_of, referral_code)
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .borrow(
                asset,
                amount,
                U256::from(interest_rate_mode),
                referral_code,
                on_behalf_of,
            )
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError> {
        let pending = self
            .contract
            .repay(asset, amount, U256::from(interest_rate_mode), on_behalf_of)
            .send()
            .await
            .map_err(ChainError::rpc)?;

        confirm(pending, self.confirmations).await
    }

    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError> {
        let data = self
            .contract
            .getUserAccountData(user)
            .call()
            .await
            .map_err(ChainError::rpc)?;

        Ok(UserAccountData {
            total_collateral: data.totalCollateralETH,
            total_debt: data.totalDebtETH,
            available_borrows: data.availableBorrowsETH,
            current_liquidation_threshold: data.currentLiquidationThreshold,
            ltv: data.ltv,
            health_factor: data.healthFactor,
        })
    }
}

#[derive(Clone)]
pub struct AddressesProviderClient {
    contract: ILendingPoolAddressesProviderInstance<DynProvider>,
    provider: DynProvider,
    confirmations: u64,
}

impl AddressesProviderClient {
    pub fn new(address: Address, provider: DynProvider, confirmations: u64) -> Self {
        AddressesProviderClient {
            contract: ILendingPoolAddressesProvider::new(address, provider.clone()),
            provider,
            confirmations,
        }
    }
}

impl PoolAddressesProviderClient for AddressesProviderClient {
    type Pool = LendingPoolClient;

    async fn lending_pool(&self) -> Result<LendingPoolClient, ChainError> {
        let pool = self
            .contract
            .getLendingPool()
            .call()
            .await
            .map_err(ChainError::rpc)?;

        if pool == Address::ZERO {
            return Err(ChainError::InvalidResponse(
                "addresses provider has no lending pool registered".to_string(),
            ));
        }

        debug!("Resolved lending pool at {pool}");
        Ok(LendingPoolClient::new(
            pool,
            self.provider.clone(),
            self.confirmations,
        ))
    }
}

#[derive(Clone)]
pub struct ChainlinkPriceFeedClient {
    contract: AggregatorV3InterfaceInstance<DynProvider>,
}

impl ChainlinkPriceFeedClient {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        ChainlinkPriceFeedClient {
            contract: AggregatorV3Interface::new(address, provider),
        }
    }
}

impl PriceFeedClient for ChainlinkPriceFeedClient {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn decimals(&self) -> Result<u8, ChainError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(ChainError::rpc)
    }

    async fn latest_round_data(&self) -> Result<RoundData, ChainError> {
        let round = self
            .contract
            .latestRoundData()
            .call()
            .await
            .map_err(ChainError::rpc)?;

        Ok(RoundData {
            round_id: round.roundId.to::<u128>(),
            answer: round.answer,
            started_at: round.startedAt,
            updated_at: round.updatedAt,
            answered_in_round: round.answeredInRound.to::<u128>(),
        })
    }
}
