//! corenlp-walk - annotate text and walk tokens, trees and dependencies.

use clap::Parser;
use corenlp_demo::cli::{self, Cli};
use corenlp_demo::printer::PrintMode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    cli::init_logging();

    cli::run(Cli::parse(), PrintMode::Walk).await
}
