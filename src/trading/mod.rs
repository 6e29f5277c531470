pub mod executor;
pub mod positions;
pub mod validator;

pub use executor::OrderExecutor;
pub use positions::PositionGuard;
pub use validator::{validate, RejectReason};
