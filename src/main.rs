use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use breakout_bot::bot::BreakoutBot;
use breakout_bot::broker::SimBroker;
use breakout_bot::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // The live terminal session is an external collaborator; out of the box
    // the bot runs against the simulated broker seeded from the config.
    let broker = Box::new(SimBroker::with_synthetic_history(&cfg));

    let mut bot = BreakoutBot::new(cfg, broker);
    bot.run().await
}
