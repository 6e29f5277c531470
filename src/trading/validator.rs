use thiserror::Error;

use crate::models::{SymbolInfo, TradeMode};

/// Why a proposed trade was not submitted. All variants are non-fatal:
/// the caller logs the rejection and drops the order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("non-positive price (entry {entry}, stop {stop}, target {target})")]
    InvalidPrice { entry: f64, stop: f64, target: f64 },
    #[error("lot {lot} outside allowed range [{min}, {max}]")]
    LotOutOfRange { lot: f64, min: f64, max: f64 },
    #[error("stop distance {distance} below minimum {min}")]
    StopTooClose { distance: f64, min: f64 },
    #[error("market not fully enabled (mode: {0})")]
    MarketNotOpen(TradeMode),
}

/// Check a priced order proposal against the instrument's trading rules.
pub fn validate(
    info: &SymbolInfo,
    price: f64,
    stop_loss: f64,
    take_profit: f64,
    lot: f64,
) -> Result<(), RejectReason> {
    if price <= 0.0 || stop_loss <= 0.0 || take_profit <= 0.0 {
        return Err(RejectReason::InvalidPrice {
            entry: price,
            stop: stop_loss,
            target: take_profit,
        });
    }

    if lot < info.volume_min || lot > info.volume_max {
        return Err(RejectReason::LotOutOfRange {
            lot,
            min: info.volume_min,
            max: info.volume_max,
        });
    }

    let distance = (price - stop_loss).abs();
    if distance < info.min_stop_distance {
        return Err(RejectReason::StopTooClose {
            distance,
            min: info.min_stop_distance,
        });
    }

    if info.trade_mode != TradeMode::Full {
        return Err(RejectReason::MarketNotOpen(info.trade_mode));
    }

    Ok(())
}
