pub mod candle;
pub mod order;
pub mod state;
pub mod timeframe;

pub use candle::{Candle, CandleSeries};
pub use order::*;
pub use state::InstrumentState;
pub use timeframe::Timeframe;
