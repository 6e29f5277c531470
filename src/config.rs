use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Timeframe;

/// One instrument to scan. Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub lot_size: f64,
    /// Allowed price slippage, in points.
    pub slippage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub instruments: Vec<InstrumentConfig>,

    /// Strategy tag scoping which open positions belong to this bot.
    pub magic: u64,
    pub max_positions_per_symbol: usize,

    // Strategy parameters
    pub sma_period: usize,
    pub lookahead_period: usize,
    pub tp_rr_ratio: f64,
    pub sl_buffer_points: f64,

    // Bot control
    pub check_interval_secs: u64,
    pub max_connect_retries: u32,
    pub retry_delay_secs: u64,
    pub order_max_retries: u32,
    pub order_retry_delay_secs: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // INSTRUMENTS is a JSON array, e.g.
        // [{"symbol":"BTCUSD","timeframe":"1m","lot_size":0.01,"slippage":3}]
        let instruments = std::env::var("INSTRUMENTS")
            .ok()
            .and_then(|raw| Self::parse_instruments(&raw))
            .unwrap_or_else(Self::default_instruments);

        Config {
            instruments,
            magic: env("MAGIC_NUMBER", "12345").parse().unwrap_or(12345),
            max_positions_per_symbol: env("MAX_POSITIONS_PER_SYMBOL", "3").parse().unwrap_or(3),
            sma_period: env("SMA_PERIOD", "20").parse().unwrap_or(20),
            lookahead_period: env("LOOKAHEAD_PERIOD", "5").parse().unwrap_or(5),
            tp_rr_ratio: env("TP_RR_RATIO", "1.5").parse().unwrap_or(1.5),
            sl_buffer_points: env("SL_BUFFER_POINTS", "0").parse().unwrap_or(0.0),
            check_interval_secs: env("CHECK_INTERVAL_SECONDS", "30").parse().unwrap_or(30),
            max_connect_retries: env("MAX_RETRY_CONNECT", "5").parse().unwrap_or(5),
            retry_delay_secs: env("RETRY_DELAY_SECONDS", "10").parse().unwrap_or(10),
            order_max_retries: env("ORDER_MAX_RETRIES", "3").parse().unwrap_or(3),
            order_retry_delay_secs: env("ORDER_RETRY_DELAY_SECONDS", "1").parse().unwrap_or(1),
            log_level: env("LOG_LEVEL", "info"),
        }
    }

    /// None (with a warning) when the value is not a valid instrument list,
    /// so a typo in INSTRUMENTS never silently drops the configured symbols.
    fn parse_instruments(raw: &str) -> Option<Vec<InstrumentConfig>> {
        match serde_json::from_str(raw) {
            Ok(instruments) => Some(instruments),
            Err(e) => {
                warn!("Ignoring unparseable INSTRUMENTS value, using defaults: {e}");
                None
            }
        }
    }

    fn default_instruments() -> Vec<InstrumentConfig> {
        vec![
            InstrumentConfig {
                symbol: "BTCUSD".to_string(),
                timeframe: Timeframe::M1,
                lot_size: 0.01,
                slippage: 3,
            },
            InstrumentConfig {
                symbol: "XAUUSD".to_string(),
                timeframe: Timeframe::M1,
                lot_size: 0.01,
                slippage: 5,
            },
            InstrumentConfig {
                symbol: "US500.cash".to_string(),
                timeframe: Timeframe::M1,
                lot_size: 0.5,
                slippage: 2,
            },
        ]
    }

    /// Candles to request per sweep: enough history for the volume average
    /// plus scan headroom.
    pub fn data_fetch_count(&self) -> usize {
        self.sma_period + self.lookahead_period * 2 + 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_list_parses_from_json() {
        let raw = r#"[{"symbol":"EURUSD","timeframe":"5m","lot_size":0.1,"slippage":2}]"#;
        let instruments: Vec<InstrumentConfig> = serde_json::from_str(raw).unwrap();
        assert_eq!(instruments.len(), 1);
        assert_eq!(instruments[0].symbol, "EURUSD");
        assert_eq!(instruments[0].timeframe, Timeframe::M5);
        assert!((instruments[0].lot_size - 0.1).abs() < 1e-9);
    }

    #[test]
    fn unparseable_instrument_list_falls_back_to_defaults() {
        assert!(Config::parse_instruments("not json at all").is_none());
        assert!(Config::parse_instruments(r#"[{"symbol":"EURUSD"}]"#).is_none());

        let instruments = Config::parse_instruments(
            r#"[{"symbol":"EURUSD","timeframe":"5m","lot_size":0.1,"slippage":2}]"#,
        )
        .unwrap();
        assert_eq!(instruments.len(), 1);

        let defaults = Config::default_instruments();
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults[0].symbol, "BTCUSD");
    }

    #[test]
    fn fetch_count_covers_window_and_lookahead() {
        let cfg = crate::test_helpers::default_test_config();
        assert_eq!(
            cfg.data_fetch_count(),
            cfg.sma_period + cfg.lookahead_period * 2 + 50
        );
        assert!(cfg.data_fetch_count() >= cfg.sma_period + cfg.lookahead_period + 2);
    }
}
