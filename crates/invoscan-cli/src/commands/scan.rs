//! Scan command - one pass over the bucket, then exit.

use clap::Args;

use invoscan_core::config::{self, Config};
use invoscan_core::models::PassMode;
use invoscan_core::scanner::Scanner;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Check every listed object against the database, with verbose logs
    #[arg(long)]
    full: bool,
}

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    config::load_dotenv();
    let config = Config::from_env()?;
    let scanner = Scanner::from_config(&config).await?;

    let mode = if args.full {
        PassMode::Full
    } else {
        PassMode::Incremental
    };
    let summary = scanner.run_pass(mode).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
