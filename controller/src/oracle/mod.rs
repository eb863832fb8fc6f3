use common_errors::ChainError;
use common_proxies::{PoolClient, PriceFeedClient, TokenClient, WrappedNativeClient};
use common_structs::PriceQuote;
use log::info;

use crate::{BorrowWorkflow, WorkflowError};

impl<C, D, P, F> BorrowWorkflow<C, D, P, F>
where
    C: WrappedNativeClient,
    D: TokenClient,
    P: PoolClient,
    F: PriceFeedClient,
{
    /// Latest price of the debt token in native currency, as reported by the
    /// feed at call time.
    pub async fn quote_price(&self) -> Result<PriceQuote, WorkflowError> {
        let (decimals, round) = self
            .fetch_round()
            .await
            .map_err(|source| WorkflowError::Query {
                stage: self.stage,
                source,
            })?;

        let quote = PriceQuote::from_round(&round, decimals).map_err(self.math_failed())?;
        info!(
            "Debt token price is {} native (round {})",
            quote.price.normalize(),
            quote.round_id
        );
        Ok(quote)
    }

    pub(crate) async fn fetch_round(&self) -> Result<(u8, common_structs::RoundData), ChainError> {
        let decimals = self.price_feed.decimals().await?;
        let round = self.price_feed.latest_round_data().await?;
        Ok((decimals, round))
    }
}
