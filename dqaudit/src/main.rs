//! Rule-based data quality audit tool.
//!
//! Loads a tabular file, runs the check battery and prints a report,
//! a profile or issue tickets. All processing is local and the input file
//! is never modified.

use clap::Parser;
use dqaudit::{Cli, execute_cli};
use dqaudit_core::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let output = execute_cli(&cli).await?;
    if !output.is_empty() {
        print!("{output}");
        if !output.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
