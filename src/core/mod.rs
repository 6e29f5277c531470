pub mod detector;
pub mod indicators;
pub mod retry;
