use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Rolling simple average of volume. None until a full window of
    /// candles precedes this one.
    #[serde(default)]
    pub volume_sma: Option<f64>,
}

impl Candle {
    /// True when the candle traded at or above its own rolling volume average.
    pub fn has_above_average_volume(&self) -> bool {
        match self.volume_sma {
            Some(avg) => self.volume >= avg,
            None => false,
        }
    }
}

/// Wraps Vec<Candle> with the query helpers pattern scanning needs.
/// Candles are ordered by timestamp ascending with no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Candle> {
        self.candles.get_mut(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Timestamp of the most recent candle.
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|c| c.timestamp)
    }

    pub fn tail(&self, n: usize) -> CandleSeries {
        let start = self.candles.len().saturating_sub(n);
        CandleSeries::new(self.candles[start..].to_vec())
    }

    /// True if any candle in [start, end) has a low at or below `price`.
    pub fn any_low_at_or_below(&self, start: usize, end: usize, price: f64) -> bool {
        let s = start.min(self.candles.len());
        let e = end.min(self.candles.len());
        self.candles[s..e].iter().any(|c| c.low <= price)
    }
}

impl std::ops::Index<usize> for CandleSeries {
    type Output = Candle;
    fn index(&self, index: usize) -> &Self::Output {
        &self.candles[index]
    }
}
