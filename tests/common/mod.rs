use chrono::{DateTime, Duration, Utc};

use breakout_bot::config::{Config, InstrumentConfig};
use breakout_bot::models::{Candle, CandleSeries, Timeframe};

pub fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A quiet 1m series with a planted breakout pair: a high-volume base candle
/// at index `b1` (high 105, low 98, volume 300) and a confirmation at `t1`
/// (close 106 above the base high, high 107, volume 150 below the base).
pub fn breakout_series(len: usize, b1: usize, t1: usize) -> CandleSeries {
    assert!(b1 < t1 && t1 < len);

    let candles: Vec<Candle> = (0..len)
        .map(|i| {
            let (o, h, l, c, v) = if i == b1 {
                (100.0, 105.0, 98.0, 101.0, 300.0)
            } else if i == t1 {
                (101.0, 107.0, 100.0, 106.0, 150.0)
            } else {
                (100.0, 101.0, 99.0, 100.5, 100.0)
            };
            Candle {
                timestamp: base_time() + Duration::minutes(i as i64),
                open: o,
                high: h,
                low: l,
                close: c,
                volume: v,
                volume_sma: None,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// One BTCUSD instrument, fast retries, no sleeps worth waiting for.
pub fn test_config() -> Config {
    Config {
        instruments: vec![InstrumentConfig {
            symbol: "BTCUSD".to_string(),
            timeframe: Timeframe::M1,
            lot_size: 0.01,
            slippage: 3,
        }],
        magic: 12345,
        max_positions_per_symbol: 3,
        sma_period: 20,
        lookahead_period: 5,
        tp_rr_ratio: 1.5,
        sl_buffer_points: 0.0,
        check_interval_secs: 1,
        max_connect_retries: 2,
        retry_delay_secs: 0,
        order_max_retries: 3,
        order_retry_delay_secs: 0,
        log_level: "error".to_string(),
    }
}
