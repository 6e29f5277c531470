use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trading availability of an instrument at the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeMode {
    Full,
    CloseOnly,
    Disabled,
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeMode::Full => write!(f, "full"),
            TradeMode::CloseOnly => write!(f, "close_only"),
            TradeMode::Disabled => write!(f, "disabled"),
        }
    }
}

/// Live top-of-book prices for an instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

/// Instrument trading rules as reported by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub volume_min: f64,
    pub volume_max: f64,
    /// Smallest price increment for this instrument.
    pub point: f64,
    /// Minimum allowed distance between entry and stop, in price units.
    pub min_stop_distance: f64,
    pub trade_mode: TradeMode,
}

/// A trade the strategy wants placed. Prices computed by detection are
/// indicative; the executor derives the live execution price itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub direction: Direction,
    pub lot: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Allowed slippage, in points.
    pub deviation: u32,
    /// Strategy tag scoping position ownership at the broker.
    pub magic: u64,
}

/// A complete, priced order proposal submitted to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub direction: Direction,
    pub lot: f64,
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub deviation: u32,
    pub magic: u64,
    pub comment: String,
}

impl OrderRequest {
    pub fn from_intent(intent: &OrderIntent, price: f64) -> Self {
        Self {
            symbol: intent.symbol.clone(),
            direction: intent.direction,
            lot: intent.lot,
            price,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
            deviation: intent.deviation,
            magic: intent.magic,
            comment: "breakout-bot".to_string(),
        }
    }
}

/// Broker-assigned identity of a filled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub ticket: u64,
}

impl fmt::Display for OrderTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.ticket)
    }
}
