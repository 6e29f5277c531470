use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::CandleSeries;

/// A detected two-candle volume breakout: a high-volume base candle (B1)
/// whose high was later closed above on contracting volume (T1).
/// Ephemeral — acted on or discarded, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub base_time: DateTime<Utc>,
    pub confirm_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

pub struct PatternDetector {
    /// Volume-average window (N). Base candidates need a defined average.
    pub window: usize,
    /// How many candles ahead of the base to search for confirmation (L).
    pub lookahead: usize,
    /// Reward-to-risk multiple applied to the entry-stop distance.
    pub tp_rr_ratio: f64,
    /// Stop buffer below the base low, in points.
    pub sl_buffer_points: f64,
    /// Open-position cap per instrument for this strategy tag.
    pub max_positions: usize,
}

impl PatternDetector {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            window: cfg.sma_period,
            lookahead: cfg.lookahead_period,
            tp_rr_ratio: cfg.tp_rr_ratio,
            sl_buffer_points: cfg.sl_buffer_points,
            max_positions: cfg.max_positions_per_symbol,
        }
    }

    /// Scan an enriched series for the breakout setup.
    ///
    /// Base candidates are walked backward from the third-most-recent candle
    /// down to the first candle with a defined volume average, so only the
    /// most recent eligible base is ever acted on. For each base, the first
    /// confirmation candle closing above the base high decides the pass:
    /// if it fails the contracting-volume check, retraces through the base
    /// low on the way, duplicates the watermark, or the position cap is
    /// already reached, the pass ends without a signal. At most one signal
    /// is emitted per call.
    ///
    /// `point` is the instrument's price increment, used for the stop buffer.
    pub fn detect(
        &self,
        symbol: &str,
        series: &CandleSeries,
        point: f64,
        last_signal_time: Option<DateTime<Utc>>,
        open_positions: usize,
    ) -> Option<Signal> {
        let len = series.len();
        if len < self.window + self.lookahead + 2 {
            return None;
        }

        let newest_base = len - 3;
        let oldest_base = self.window.saturating_sub(1);

        for i in (oldest_base..=newest_base).rev() {
            let b1 = &series[i];

            // The setup requires above-average participation on the base;
            // candles without a defined average are never candidates.
            if !b1.has_above_average_volume() {
                continue;
            }

            for j in 1..=self.lookahead {
                let t1_idx = i + j;
                if t1_idx >= len {
                    break;
                }
                let t1 = &series[t1_idx];

                if t1.close <= b1.high {
                    continue;
                }

                // First close above the base high. Whatever happens now,
                // no other confirmation or base candidate is tried: the
                // first breakout decides the whole pass.
                if t1.volume >= b1.volume {
                    debug!(
                        "{symbol}: breakout at {} on expanding volume ({} >= {}), no signal",
                        t1.timestamp, t1.volume, b1.volume
                    );
                    return None;
                }

                if series.any_low_at_or_below(i + 1, t1_idx, b1.low) {
                    debug!(
                        "{symbol}: breakout at {} retraced through base low {}, no signal",
                        t1.timestamp, b1.low
                    );
                    return None;
                }

                if let Some(watermark) = last_signal_time {
                    if t1.timestamp <= watermark {
                        debug!(
                            "{symbol}: duplicate signal at {} suppressed (watermark {})",
                            t1.timestamp, watermark
                        );
                        return None;
                    }
                }

                if open_positions >= self.max_positions {
                    warn!(
                        "Max positions reached for {symbol} ({open_positions}/{})",
                        self.max_positions
                    );
                    return None;
                }

                let entry_price = (b1.low + t1.high) / 2.0;
                let stop_loss = b1.low - self.sl_buffer_points * point;
                let take_profit = entry_price + (entry_price - stop_loss) * self.tp_rr_ratio;

                return Some(Signal {
                    base_time: b1.timestamp,
                    confirm_time: t1.timestamp,
                    entry_price,
                    stop_loss,
                    take_profit,
                });
            }
        }

        None
    }
}
