use std::process;

use clap::Parser;
use expensedb::config::{CliArgs, Config};
use expensedb::logging;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    logging::init(&config.logging);

    if let Err(e) = expensedb::run(config).await {
        tracing::error!(error = %e, "ExpenseDB stopped");
        process::exit(1);
    }
}
