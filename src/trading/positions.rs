use tracing::debug;

use crate::broker::Broker;

/// Stateless open-position query scoped by strategy tag.
///
/// Position counts change only as a side effect of successful order
/// execution observed at the broker; nothing is tracked locally.
pub struct PositionGuard {
    magic: u64,
}

impl PositionGuard {
    pub fn new(magic: u64) -> Self {
        Self { magic }
    }

    /// Count of open positions for `symbol` attributable to this strategy.
    /// A failed query counts as zero open positions.
    pub async fn open_positions(&self, broker: &mut dyn Broker, symbol: &str) -> usize {
        match broker.open_position_count(symbol, self.magic).await {
            Ok(count) => count,
            Err(e) => {
                debug!("Position query failed for {symbol}: {e:#}");
                0
            }
        }
    }
}
