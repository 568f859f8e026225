use std::io;

use anyhow::Result;
use tradebot_rs::prelude::*;

fn main() -> Result<()> {
    // Standard output carries the protocol; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();

    let mut bot = Bot::new(PassStrategy);
    bot.run(stdin.lock(), stdout.lock())?;

    Ok(())
}
