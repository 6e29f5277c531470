pub mod bot;
pub mod broker;
pub mod config;
pub mod core;
pub mod models;
#[cfg(test)]
pub mod test_helpers;
pub mod trading;
