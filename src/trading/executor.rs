use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::broker::Broker;
use crate::core::retry::RetryPolicy;
use crate::models::{Direction, OrderIntent, OrderRequest, OrderTicket, SymbolInfo};
use crate::trading::validator;

/// Submits validated order intents with bounded retries.
///
/// Each attempt is a complete, independent proposal: fetch a live quote,
/// revalidate against the live price (detection prices are indicative only),
/// and submit. Nothing is ever partially submitted.
pub struct OrderExecutor {
    retry: RetryPolicy,
}

impl OrderExecutor {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Returns the broker ticket on success, or an error once all attempts
    /// are exhausted. Failure is non-fatal to the caller: no order was placed.
    pub async fn execute(
        &self,
        broker: &mut dyn Broker,
        info: &SymbolInfo,
        intent: &OrderIntent,
    ) -> Result<OrderTicket> {
        for attempt in self.retry.attempts() {
            match self.try_submit(broker, info, intent).await {
                Ok(ticket) => {
                    info!("Order executed for {}. Ticket: {ticket}", intent.symbol);
                    return Ok(ticket);
                }
                Err(e) => {
                    warn!(
                        "Order attempt {attempt}/{} failed for {}: {e:#}",
                        self.retry.max_attempts, intent.symbol
                    );
                }
            }
            if !self.retry.is_last(attempt) {
                self.retry.pause().await;
            }
        }

        bail!(
            "no order placed for {} after {} attempts",
            intent.symbol,
            self.retry.max_attempts
        )
    }

    async fn try_submit(
        &self,
        broker: &mut dyn Broker,
        info: &SymbolInfo,
        intent: &OrderIntent,
    ) -> Result<OrderTicket> {
        let quote = broker
            .current_quote(&intent.symbol)
            .await
            .context("no quote available")?;

        let price = match intent.direction {
            Direction::Long => quote.ask,
            Direction::Short => quote.bid,
        };

        validator::validate(info, price, intent.stop_loss, intent.take_profit, intent.lot)
            .map_err(|reason| anyhow!("trade rejected: {reason}"))?;

        let request = OrderRequest::from_intent(intent, price);
        broker.submit_order(&request).await
    }
}
