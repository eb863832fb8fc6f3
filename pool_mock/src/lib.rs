//! In-memory stand-in for a lending pool deployment: wrapped native token,
//! debt token, addresses provider, pool and price feed sharing one ledger.
//!
//! Every client call settles immediately, which is what a confirmed
//! transaction looks like from the caller's side.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy_primitives::{address, keccak256, Address, TxHash, I256, U256};
use common_constants::{BPS, WAD};
use common_errors::{
    ChainError, ERROR_INSUFFICIENT_ALLOWANCE, ERROR_INSUFFICIENT_BALANCE,
    ERROR_INSUFFICIENT_COLLATERAL, ERROR_NO_DEBT_TO_REPAY,
};
use common_proxies::{
    PoolAddressesProviderClient, PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient,
};
use common_structs::{RoundData, UserAccountData};

pub const COLLATERAL_TOKEN_ADDRESS: Address = address!("00000000000000000000000000000000000c0117");
pub const DEBT_TOKEN_ADDRESS: Address = address!("000000000000000000000000000000000000de17");
pub const POOL_ADDRESS: Address = address!("0000000000000000000000000000000000000a7e");
pub const ADDRESSES_PROVIDER_ADDRESS: Address =
    address!("00000000000000000000000000000000000000ad");
pub const PRICE_FEED_ADDRESS: Address = address!("000000000000000000000000000000000000feed");

pub const ERROR_INJECTED: &str = "Injected failure.";

/// Entry points a test can make fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Wrap,
    Approve,
    Deposit,
    Borrow,
    Repay,
    AccountData,
    PriceFeed,
    ResolvePool,
}

/// State changes in the order they were settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    Wrapped {
        account: Address,
        amount: U256,
    },
    Approved {
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    Supplied {
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
    },
    Borrowed {
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        on_behalf_of: Address,
    },
    Repaid {
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketParams {
    pub ltv_bps: u128,
    pub liquidation_threshold_bps: u128,
    /// Debt token priced in native currency, scaled by `feed_decimals`
    pub price_answer: I256,
    pub feed_decimals: u8,
}

impl Default for MarketParams {
    fn default() -> Self {
        MarketParams {
            ltv_bps: 8_000,
            liquidation_threshold_bps: 8_250,
            // 2.5 native per debt token
            price_answer: I256::from_raw(U256::from(250_000_000u64)),
            feed_decimals: 8,
        }
    }
}

#[derive(Debug)]
struct Ledger {
    signer: Address,
    params: MarketParams,
    round_id: u128,
    nonce: u64,
    native: HashMap<Address, U256>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    collateral: HashMap<Address, U256>,
    debt: HashMap<Address, U256>,
    failing: HashSet<MockCall>,
    events: Vec<ChainEvent>,
}

impl Ledger {
    fn next_tx_hash(&mut self) -> TxHash {
        self.nonce += 1;
        keccak256(self.nonce.to_be_bytes())
    }

    fn check_injected(&self, call: MockCall, tx_hash: TxHash) -> Result<(), ChainError> {
        if self.failing.contains(&call) {
            return Err(ChainError::Reverted {
                tx_hash,
                reason: ERROR_INJECTED.to_string(),
            });
        }
        Ok(())
    }

    fn check_injected_read(&self, call: MockCall) -> Result<(), ChainError> {
        if self.failing.contains(&call) {
            return Err(ChainError::rpc(ERROR_INJECTED));
        }
        Ok(())
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn price(&self) -> U256 {
        if self.params.price_answer.is_negative() {
            U256::ZERO
        } else {
            self.params.price_answer.into_raw()
        }
    }

    /// Debt token amount valued in native currency.
    fn debt_value(&self, debt: U256) -> U256 {
        let scale = U256::from(10u64).pow(U256::from(self.params.feed_decimals));
        debt * self.price() / scale
    }

    fn account_data(&self, user: Address) -> UserAccountData {
        let collateral = self.collateral.get(&user).copied().unwrap_or_default();
        let debt_value = self.debt_value(self.debt.get(&user).copied().unwrap_or_default());
        let ltv = U256::from(self.params.ltv_bps);
        let threshold = U256::from(self.params.liquidation_threshold_bps);
        let bps = U256::from(BPS);

        let max_borrow = collateral * ltv / bps;
        let health_factor = if debt_value.is_zero() {
            U256::MAX
        } else {
            collateral * threshold * U256::from(WAD) / bps / debt_value
        };

        UserAccountData {
            total_collateral: collateral,
            total_debt: debt_value,
            available_borrows: max_borrow.saturating_sub(debt_value),
            current_liquidation_threshold: threshold,
            ltv,
            health_factor,
        }
    }

    /// Moves `amount` of `token` from the signer into the pool, spending the
    /// allowance granted to the pool.
    fn pull(&mut self, token: Address, amount: U256, tx_hash: TxHash) -> Result<(), ChainError> {
        let owner = self.signer;
        let allowance = self.allowance(token, owner, POOL_ADDRESS);
        if allowance < amount {
            return Err(revert(tx_hash, ERROR_INSUFFICIENT_ALLOWANCE));
        }
        let balance = self.balance(token, owner);
        if balance < amount {
            return Err(revert(tx_hash, ERROR_INSUFFICIENT_BALANCE));
        }

        self.allowances
            .insert((token, owner, POOL_ADDRESS), allowance - amount);
        self.balances.insert((token, owner), balance - amount);
        Ok(())
    }
}

fn revert(tx_hash: TxHash, reason: &str) -> ChainError {
    ChainError::Reverted {
        tx_hash,
        reason: reason.to_string(),
    }
}

/// Handle to the shared ledger. Cloning is cheap, all clones see the same state.
#[derive(Debug, Clone)]
pub struct MockChain {
    ledger: Arc<Mutex<Ledger>>,
}

impl MockChain {
    pub fn new(signer: Address) -> Self {
        MockChain::with_params(signer, MarketParams::default())
    }

    pub fn with_params(signer: Address, params: MarketParams) -> Self {
        let ledger = Ledger {
            signer,
            params,
            round_id: 1,
            nonce: 0,
            native: HashMap::new(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            collateral: HashMap::new(),
            debt: HashMap::new(),
            failing: HashSet::new(),
            events: Vec::new(),
        };

        MockChain {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn signer(&self) -> Address {
        self.ledger().signer
    }

    pub fn fund_native(&self, account: Address, amount: U256) {
        *self.ledger().native.entry(account).or_default() += amount;
    }

    pub fn mint(&self, token: Address, owner: Address, amount: U256) {
        *self.ledger().balances.entry((token, owner)).or_default() += amount;
    }

    pub fn set_price_answer(&self, answer: I256) {
        let mut ledger = self.ledger();
        ledger.params.price_answer = answer;
        ledger.round_id += 1;
    }

    /// Grows every open debt by `bps` basis points.
    pub fn accrue_interest(&self, bps: u128) {
        let mut ledger = self.ledger();
        for debt in ledger.debt.values_mut() {
            *debt += *debt * U256::from(bps) / U256::from(BPS);
        }
    }

    pub fn fail_on(&self, call: MockCall) {
        self.ledger().failing.insert(call);
    }

    pub fn clear_failures(&self) {
        self.ledger().failing.clear();
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.ledger().events.clone()
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.ledger().native.get(&account).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.ledger().balance(token, owner)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.ledger().allowance(token, owner, spender)
    }

    pub fn collateral_of(&self, user: Address) -> U256 {
        self.ledger().collateral.get(&user).copied().unwrap_or_default()
    }

    pub fn debt_of(&self, user: Address) -> U256 {
        self.ledger().debt.get(&user).copied().unwrap_or_default()
    }

    pub fn account_data(&self, user: Address) -> UserAccountData {
        self.ledger().account_data(user)
    }

    pub fn wrapped_native(&self) -> MockWrappedNative {
        MockWrappedNative {
            chain: self.clone(),
        }
    }

    pub fn debt_token(&self) -> MockToken {
        MockToken {
            chain: self.clone(),
            address: DEBT_TOKEN_ADDRESS,
        }
    }

    pub fn addresses_provider(&self) -> MockAddressesProvider {
        MockAddressesProvider {
            chain: self.clone(),
        }
    }

    pub fn pool(&self) -> MockPool {
        MockPool {
            chain: self.clone(),
        }
    }

    pub fn price_feed(&self) -> MockPriceFeed {
        MockPriceFeed {
            chain: self.clone(),
        }
    }

    fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        let mut ledger = self.ledger();
        let tx_hash = ledger.next_tx_hash();
        ledger.check_injected(MockCall::Approve, tx_hash)?;

        let owner = ledger.signer;
        ledger.allowances.insert((token, owner, spender), amount);
        ledger.events.push(ChainEvent::Approved {
            token,
            owner,
            spender,
            amount,
        });
        Ok(tx_hash)
    }
}

#[derive(Debug, Clone)]
pub struct MockToken {
    chain: MockChain,
    address: Address,
}

impl TokenClient for MockToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.chain.approve(self.address, spender, amount)
    }
}

#[derive(Debug, Clone)]
pub struct MockWrappedNative {
    chain: MockChain,
}

impl TokenClient for MockWrappedNative {
    fn address(&self) -> Address {
        COLLATERAL_TOKEN_ADDRESS
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, ChainError> {
        self.chain.approve(COLLATERAL_TOKEN_ADDRESS, spender, amount)
    }
}

impl WrappedNativeClient for MockWrappedNative {
    async fn deposit(&self, value: U256) -> Result<TxHash, ChainError> {
        let mut ledger = self.chain.ledger();
        let tx_hash = ledger.next_tx_hash();
        ledger.check_injected(MockCall::Wrap, tx_hash)?;

        let account = ledger.signer;
        let native = ledger.native.get(&account).copied().unwrap_or_default();
        if native < value {
            return Err(revert(tx_hash, ERROR_INSUFFICIENT_BALANCE));
        }

        ledger.native.insert(account, native - value);
        *ledger
            .balances
            .entry((COLLATERAL_TOKEN_ADDRESS, account))
            .or_default() += value;
        ledger.events.push(ChainEvent::Wrapped {
            account,
            amount: value,
        });
        Ok(tx_hash)
    }
}

#[derive(Debug, Clone)]
pub struct MockPool {
    chain: MockChain,
}

impl PoolClient for MockPool {
    fn address(&self) -> Address {
        POOL_ADDRESS
    }

    async fn deposit(
        &self,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        _referral_code: u16,
    ) -> Result<TxHash, ChainError> {
        let mut ledger = self.chain.ledger();
        let tx_hash = ledger.next_tx_hash();
        ledger.check_injected(MockCall::Deposit, tx_hash)?;

        ledger.pull(asset, amount, tx_hash)?;
        *ledger.collateral.entry(on_behalf_of).or_default() += amount;
        ledger.events.push(ChainEvent::Supplied {
            asset,
            amount,
            on_behalf_of,
        });
        Ok(tx_hash)
    }

    async fn borrow(
        &self,
        asset: Address,
        amount: U256,
        interest_rate_mode: u8,
        _referral_code: u16,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError> {
        let mut ledger = self.chain.ledger();
        let tx_hash = ledger.next_tx_hash();
        ledger.check_injected(MockCall::Borrow, tx_hash)?;

        let data = ledger.account_data(on_behalf_of);
        let max_borrow = data.total_collateral * data.ltv / U256::from(BPS);
        let current = ledger.debt.get(&on_behalf_of).copied().unwrap_or_default();
        if ledger.debt_value(current + amount) > max_borrow {
            return Err(revert(tx_hash, ERROR_INSUFFICIENT_COLLATERAL));
        }

        ledger.debt.insert(on_behalf_of, current + amount);
        let borrower = ledger.signer;
        *ledger.balances.entry((asset, borrower)).or_default() += amount;
        ledger.events.push(ChainEvent::Borrowed {
            asset,
            amount,
            interest_rate_mode,
            on_behalf_of,
        });
        Ok(tx_hash)
    }

    async fn repay(
        &self,
        asset: Address,
        amount: U256,
        _interest_rate_mode: u8,
        on_behalf_of: Address,
    ) -> Result<TxHash, ChainError> {
        let mut ledger = self.chain.ledger();
        let tx_hash = ledger.next_tx_hash();
        ledger.check_injected(MockCall::Repay, tx_hash)?;

        let debt = ledger.debt.get(&on_behalf_of).copied().unwrap_or_default();
        if debt.is_zero() {
            return Err(revert(tx_hash, ERROR_NO_DEBT_TO_REPAY));
        }

        let payback = amount.min(debt);
        ledger.pull(asset, payback, tx_hash)?;
        ledger.debt.insert(on_behalf_of, debt - payback);
        ledger.events.push(ChainEvent::Repaid {
            asset,
            amount: payback,
            on_behalf_of,
        });
        Ok(tx_hash)
    }

    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ChainError> {
        let ledger = self.chain.ledger();
        ledger.check_injected_read(MockCall::AccountData)?;
        Ok(ledger.account_data(user))
    }
}

#[derive(Debug, Clone)]
pub struct MockAddressesProvider {
    chain: MockChain,
}

impl PoolAddressesProviderClient for MockAddressesProvider {
    type Pool = MockPool;

    async fn lending_pool(&self) -> Result<MockPool, ChainError> {
        self.chain
            .ledger()
            .check_injected_read(MockCall::ResolvePool)?;
        Ok(self.chain.pool())
    }
}

#[derive(Debug, Clone)]
pub struct MockPriceFeed {
    chain: MockChain,
}

impl PriceFeedClient for MockPriceFeed {
    fn address(&self) -> Address {
        PRICE_FEED_ADDRESS
    }

    async fn decimals(&self) -> Result<u8, ChainError> {
        let ledger = self.chain.ledger();
        ledger.check_injected_read(MockCall::PriceFeed)?;
        Ok(ledger.params.feed_decimals)
    }

    async fn latest_round_data(&self) -> Result<RoundData, ChainError> {
        let ledger = self.chain.ledger();
        ledger.check_injected_read(MockCall::PriceFeed)?;
        Ok(RoundData {
            round_id: ledger.round_id,
            answer: ledger.params.price_answer,
            started_at: U256::from(ledger.nonce),
            updated_at: U256::from(ledger.nonce),
            answered_in_round: ledger.round_id,
        })
    }
}
