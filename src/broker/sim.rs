use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::broker::Broker;
use crate::config::Config;
use crate::models::{
    Candle, CandleSeries, Direction, OrderRequest, OrderTicket, Quote, SymbolInfo, Timeframe,
    TradeMode,
};

#[derive(Debug, Clone)]
struct SimPosition {
    ticket: u64,
    request: OrderRequest,
}

#[derive(Debug, Default)]
struct Inner {
    connected: bool,
    fail_connects: u32,
    candles: HashMap<String, CandleSeries>,
    quotes: HashMap<String, Quote>,
    infos: HashMap<String, SymbolInfo>,
    positions: Vec<SimPosition>,
    next_ticket: u64,
    reject_submits: u32,
    submit_calls: u32,
}

/// An in-memory broker: scripted candles, quotes and metadata per symbol,
/// magic-scoped position tracking, and injectable faults (dropped session,
/// forced submit rejections).
///
/// Clones share state, so tests can keep a handle after boxing one into the
/// bot.
#[derive(Clone)]
pub struct SimBroker {
    inner: Arc<Mutex<Inner>>,
}

impl SimBroker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                connected: true,
                next_ticket: 1000,
                ..Inner::default()
            })),
        }
    }

    /// Seed every configured instrument with a quiet synthetic history so
    /// the binary can run without a live terminal.
    pub fn with_synthetic_history(cfg: &Config) -> Self {
        let broker = Self::new();
        let count = cfg.data_fetch_count();
        let end = Utc::now();

        for inst in &cfg.instruments {
            let step = chrono::Duration::from_std(inst.timeframe.as_duration())
                .unwrap_or_else(|_| chrono::Duration::minutes(1));

            let candles: Vec<Candle> = (0..count)
                .map(|i| {
                    let drift = (i as f64 / 7.0).sin();
                    let open = 100.0 + drift;
                    let close = 100.0 + ((i + 1) as f64 / 7.0).sin();
                    Candle {
                        timestamp: end - step * (count - 1 - i) as i32,
                        open,
                        high: open.max(close) + 0.5,
                        low: open.min(close) - 0.5,
                        close,
                        volume: 90.0 + 20.0 * (i as f64 / 3.0).cos().abs(),
                        volume_sma: None,
                    }
                })
                .collect();

            broker.load_candles(&inst.symbol, CandleSeries::new(candles));
            broker.set_symbol_info(Self::default_symbol_info(&inst.symbol));
        }

        broker
    }

    pub fn default_symbol_info(symbol: &str) -> SymbolInfo {
        let point = 0.01;
        SymbolInfo {
            symbol: symbol.to_string(),
            volume_min: 0.01,
            volume_max: 100.0,
            point,
            min_stop_distance: 10.0 * point,
            trade_mode: TradeMode::Full,
        }
    }

    pub fn load_candles(&self, symbol: &str, series: CandleSeries) {
        self.inner
            .lock()
            .unwrap()
            .candles
            .insert(symbol.to_string(), series);
    }

    pub fn set_quote(&self, symbol: &str, quote: Quote) {
        self.inner
            .lock()
            .unwrap()
            .quotes
            .insert(symbol.to_string(), quote);
    }

    pub fn set_symbol_info(&self, info: SymbolInfo) {
        self.inner
            .lock()
            .unwrap()
            .infos
            .insert(info.symbol.clone(), info);
    }

    /// Pre-seed an open position, e.g. from an unrelated strategy.
    pub fn seed_position(&self, symbol: &str, magic: u64) {
        let mut inner = self.inner.lock().unwrap();
        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        inner.positions.push(SimPosition {
            ticket,
            request: OrderRequest {
                symbol: symbol.to_string(),
                direction: Direction::Long,
                lot: 0.01,
                price: 100.0,
                stop_loss: 99.0,
                take_profit: 102.0,
                deviation: 0,
                magic,
                comment: "seeded".to_string(),
            },
        });
    }

    /// Reject the next `n` order submissions.
    pub fn reject_submits(&self, n: u32) {
        self.inner.lock().unwrap().reject_submits = n;
    }

    /// Drop the session; `connect` will fail `fail_connects` times first.
    pub fn drop_connection(&self, fail_connects: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        inner.fail_connects = fail_connects;
    }

    pub fn submit_calls(&self) -> u32 {
        self.inner.lock().unwrap().submit_calls
    }

    pub fn open_position(&self, ticket: OrderTicket) -> Option<OrderRequest> {
        self.inner
            .lock()
            .unwrap()
            .positions
            .iter()
            .find(|p| p.ticket == ticket.ticket)
            .map(|p| p.request.clone())
    }

    pub fn positions_len(&self) -> usize {
        self.inner.lock().unwrap().positions.len()
    }
}

impl Default for SimBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for SimBroker {
    async fn is_connected(&mut self) -> bool {
        self.inner.lock().unwrap().connected
    }

    async fn connect(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_connects > 0 {
            inner.fail_connects -= 1;
            bail!("terminal not responding");
        }
        inner.connected = true;
        Ok(())
    }

    async fn fetch_candles(
        &mut self,
        symbol: &str,
        _timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries> {
        let inner = self.inner.lock().unwrap();
        match inner.candles.get(symbol) {
            Some(series) if !series.is_empty() => Ok(series.tail(count)),
            _ => bail!("no candle data for {symbol}"),
        }
    }

    async fn current_quote(&mut self, symbol: &str) -> Result<Quote> {
        let inner = self.inner.lock().unwrap();
        if let Some(quote) = inner.quotes.get(symbol) {
            return Ok(*quote);
        }
        // Fall back to the last candle close with a zero spread.
        match inner.candles.get(symbol).and_then(|s| s.last()) {
            Some(c) => Ok(Quote {
                bid: c.close,
                ask: c.close,
            }),
            None => bail!("no tick data for {symbol}"),
        }
    }

    async fn symbol_info(&mut self, symbol: &str) -> Result<SymbolInfo> {
        self.inner
            .lock()
            .unwrap()
            .infos
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no symbol info for {symbol}"))
    }

    async fn open_position_count(&mut self, symbol: &str, magic: u64) -> Result<usize> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .positions
            .iter()
            .filter(|p| p.request.symbol == symbol && p.request.magic == magic)
            .count())
    }

    async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderTicket> {
        let mut inner = self.inner.lock().unwrap();
        inner.submit_calls += 1;
        if inner.reject_submits > 0 {
            inner.reject_submits -= 1;
            bail!("order rejected by broker");
        }
        let ticket = inner.next_ticket;
        inner.next_ticket += 1;
        inner.positions.push(SimPosition {
            ticket,
            request: request.clone(),
        });
        Ok(OrderTicket { ticket })
    }

    async fn shutdown(&mut self) {
        self.inner.lock().unwrap().connected = false;
        info!("Broker session released");
    }
}
