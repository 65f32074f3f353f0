//! Parse command - run the field parser over recognized text.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use invoscan_core::invoice::parse_invoice_text;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file with recognized invoice content
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.input)?;
    let fields = parse_invoice_text(&text);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}
