use anyhow::{bail, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::broker::Broker;
use crate::config::{Config, InstrumentConfig};
use crate::core::detector::PatternDetector;
use crate::core::indicators::enrich_volume_sma;
use crate::core::retry::RetryPolicy;
use crate::models::{Direction, InstrumentState, OrderIntent};
use crate::trading::{OrderExecutor, PositionGuard};

/// Drives the polling loop: per instrument, ensure the session is live,
/// fetch the latest candle window, detect, and act. Single task; the
/// watermark map is owned here and mutated nowhere else.
pub struct BreakoutBot {
    config: Config,
    broker: Box<dyn Broker>,
    detector: PatternDetector,
    executor: OrderExecutor,
    guard: PositionGuard,
    states: HashMap<String, InstrumentState>,
}

impl BreakoutBot {
    pub fn new(config: Config, broker: Box<dyn Broker>) -> Self {
        let detector = PatternDetector::from_config(&config);
        let executor = OrderExecutor::new(RetryPolicy::new(
            config.order_max_retries,
            Duration::from_secs(config.order_retry_delay_secs),
        ));
        let guard = PositionGuard::new(config.magic);

        info!("{}", "=".repeat(60));
        info!("Volume breakout bot starting up");
        info!(
            "Strategy: window={} lookahead={} rr={} magic={}",
            config.sma_period, config.lookahead_period, config.tp_rr_ratio, config.magic
        );
        for inst in &config.instruments {
            info!(
                "  {} {} lot={} slippage={}pt",
                inst.symbol, inst.timeframe, inst.lot_size, inst.slippage
            );
        }
        info!("{}", "=".repeat(60));

        Self {
            config,
            broker,
            detector,
            executor,
            guard,
            states: HashMap::new(),
        }
    }

    /// The watermark state for one instrument, if it has been scanned yet.
    pub fn state(&self, symbol: &str) -> Option<&InstrumentState> {
        self.states.get(symbol)
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Bot is now running. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Bot stopped by user");
                    self.shutdown().await;
                    return Ok(());
                }
                result = self.cycle() => {
                    if let Err(e) = result {
                        error!("Critical error: {e:#}");
                        self.shutdown().await;
                        return Err(e);
                    }
                }
            }
        }
    }

    async fn cycle(&mut self) -> Result<()> {
        self.sweep().await?;
        tokio::time::sleep(Duration::from_secs(self.config.check_interval_secs)).await;
        Ok(())
    }

    /// One pass over all configured instruments. Data problems skip the
    /// instrument; only an unrecoverable session failure is fatal.
    pub async fn sweep(&mut self) -> Result<()> {
        let instruments = self.config.instruments.clone();
        for inst in &instruments {
            self.scan_instrument(inst).await?;
        }
        Ok(())
    }

    async fn scan_instrument(&mut self, inst: &InstrumentConfig) -> Result<()> {
        self.ensure_connected().await?;

        let count = self.config.data_fetch_count();
        let mut series = match self
            .broker
            .fetch_candles(&inst.symbol, inst.timeframe, count)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!("No data received for {} {}: {e:#}", inst.symbol, inst.timeframe);
                return Ok(());
            }
        };
        let newest = match series.last_time() {
            Some(t) => t,
            None => {
                warn!("No data received for {} {}", inst.symbol, inst.timeframe);
                return Ok(());
            }
        };

        let prior = self.states.get(&inst.symbol).cloned().unwrap_or_default();
        if prior.is_stale_window(newest) {
            debug!("{}: no new candle since {newest}", inst.symbol);
            return Ok(());
        }

        let mut next = prior.clone();
        next.last_candle_time = Some(newest);

        if let Err(e) = enrich_volume_sma(&mut series, self.config.sma_period) {
            warn!("Indicator enrichment failed for {}: {e:#}", inst.symbol);
            self.states.insert(inst.symbol.clone(), next);
            return Ok(());
        }

        let info = match self.broker.symbol_info(&inst.symbol).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Could not get symbol info for {}: {e:#}", inst.symbol);
                self.states.insert(inst.symbol.clone(), next);
                return Ok(());
            }
        };

        let open_positions = self
            .guard
            .open_positions(self.broker.as_mut(), &inst.symbol)
            .await;

        if let Some(signal) = self.detector.detect(
            &inst.symbol,
            &series,
            info.point,
            prior.last_signal_time,
            open_positions,
        ) {
            info!(
                "Breakout signal for {}: base {} confirm {} entry {:.5} sl {:.5} tp {:.5}",
                inst.symbol,
                signal.base_time,
                signal.confirm_time,
                signal.entry_price,
                signal.stop_loss,
                signal.take_profit
            );

            let intent = OrderIntent {
                symbol: inst.symbol.clone(),
                direction: Direction::Long,
                lot: inst.lot_size,
                stop_loss: signal.stop_loss,
                take_profit: signal.take_profit,
                deviation: inst.slippage,
                magic: self.config.magic,
            };

            match self.executor.execute(self.broker.as_mut(), &info, &intent).await {
                Ok(ticket) => {
                    info!(
                        "New buy position opened for {} around {:.5} ({ticket})",
                        inst.symbol, signal.entry_price
                    );
                    // Watermark advances only on success: a failed execution
                    // leaves the setup eligible again once a new candle lands.
                    next.last_signal_time = Some(signal.confirm_time);
                }
                Err(e) => {
                    warn!("{e:#}");
                }
            }
        }

        self.states.insert(inst.symbol.clone(), next);
        Ok(())
    }

    /// Reconnect with bounded retries; exhausting them is fatal to the run.
    async fn ensure_connected(&mut self) -> Result<()> {
        if self.broker.is_connected().await {
            return Ok(());
        }

        warn!("Broker session down, reconnecting");
        let policy = RetryPolicy::new(
            self.config.max_connect_retries,
            Duration::from_secs(self.config.retry_delay_secs),
        );

        for attempt in policy.attempts() {
            match self.broker.connect().await {
                Ok(()) => {
                    info!("Broker session initialized successfully");
                    return Ok(());
                }
                Err(e) => {
                    error!(
                        "Broker initialization failed, attempt {attempt}/{}: {e:#}",
                        policy.max_attempts
                    );
                }
            }
            if !policy.is_last(attempt) {
                policy.pause().await;
            }
        }

        bail!(
            "failed to initialize broker session after {} attempts",
            policy.max_attempts
        )
    }

    async fn shutdown(&mut self) {
        info!("Shutting down...");
        self.broker.shutdown().await;
        info!("Bot shutdown complete");
    }
}
