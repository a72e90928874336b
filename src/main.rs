//! # btsyncli
//!
//! Main entry point for the btsync command-line client.

use btsyncli::cli::{self, Cli};
use clap::Parser;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sets up logging, parses arguments and runs the requested commands. Any
/// error is reported on stderr and the process exits with status 1.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "btsyncli=debug"
    } else {
        "btsyncli=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli::run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), format!("{:#}", e).red());
        std::process::exit(1);
    }
}
