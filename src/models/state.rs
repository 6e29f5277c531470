use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-instrument scan state, owned by the cycle controller.
///
/// Both timestamps are monotonically non-decreasing for the life of the
/// process and are never reset. The map holding these does not survive a
/// restart, so an already-acted-on setup can in principle be re-detected
/// after one; the broker-side position cap is the only guard then.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentState {
    /// Timestamp of the confirmation candle of the last signal that was
    /// successfully executed. Detection never emits a signal at or before
    /// this watermark.
    pub last_signal_time: Option<DateTime<Utc>>,
    /// Timestamp of the newest candle seen in the last processed window.
    /// A window whose newest candle is not strictly newer is skipped.
    pub last_candle_time: Option<DateTime<Utc>>,
}

impl InstrumentState {
    /// True when `newest` has not advanced past the last processed window.
    pub fn is_stale_window(&self, newest: DateTime<Utc>) -> bool {
        matches!(self.last_candle_time, Some(seen) if newest <= seen)
    }
}
