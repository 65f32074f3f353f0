//! Run command - the scheduled scanning loop.

use clap::Args;
use tracing::info;

use invoscan_core::config::{self, Config};
use invoscan_core::scanner::Scanner;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Override the scan interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    config::load_dotenv();
    let mut config = Config::from_env()?;
    if let Some(interval) = args.interval {
        config.scan.interval_seconds = interval;
    }

    info!(
        bucket = %config.store.bucket,
        prefix = %config.store.prefix,
        interval = config.scan.interval_seconds,
        "Starting scanner"
    );

    let scanner = Scanner::from_config(&config).await?;
    scanner.run_forever().await?;
    Ok(())
}
