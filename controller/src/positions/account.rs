use common_proxies::{PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient};
use common_structs::AccountPosition;
use log::debug;

use crate::{BorrowWorkflow, WorkflowError};

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    /// Reads the account's position from the pool. Never cached, every call
    /// hits the pool.
    pub async fn query_position(&self) -> Result<AccountPosition, WorkflowError> {
        let data = self
            .pool
            .user_account_data(self.account)
            .await
            .map_err(|source| WorkflowError::Query {
                stage: self.stage,
                source,
            })?;
        debug!("Account data for {}: {data:?}", self.account);

        let position = AccountPosition::from_account_data(&data, self.network.native_decimals)
            .map_err(self.math_failed())?;
        Ok(position)
    }
}
