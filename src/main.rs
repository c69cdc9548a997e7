// src/main.rs

use clap::Parser;

use testsieve::cli::CliArgs;
use testsieve::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level)?;
    testsieve::run(args).await
}
