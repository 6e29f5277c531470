pub mod sim;

pub use sim::SimBroker;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CandleSeries, OrderRequest, OrderTicket, Quote, SymbolInfo, Timeframe};

/// The terminal session this strategy trades through.
///
/// Absent data (no candles, no quote, no metadata) surfaces as an `Err`;
/// the cycle controller treats it as skip-this-instrument-this-sweep.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn is_connected(&mut self) -> bool;
    async fn connect(&mut self) -> Result<()>;
    async fn fetch_candles(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries>;
    async fn current_quote(&mut self, symbol: &str) -> Result<Quote>;
    async fn symbol_info(&mut self, symbol: &str) -> Result<SymbolInfo>;
    /// Open positions for `symbol` carrying the given strategy tag.
    async fn open_position_count(&mut self, symbol: &str, magic: u64) -> Result<usize>;
    async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderTicket>;
    async fn shutdown(&mut self);
}
