//! Shared command-line shell for the demo binaries.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PipelineConfig;
use crate::engine::EngineError;
use crate::input;
use crate::pipeline::{Pipeline, PipelineError};
use crate::printer::PrintMode;

#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Annotate text with Stanford CoreNLP and print the result")]
#[command(after_help = "Progress is logged to stderr. Set RUST_LOG (e.g. RUST_LOG=corenlp_demo=debug) to change the level.")]
pub struct Cli {
    /// Text file to annotate (defaults to a built-in two-sentence sample)
    pub input: Option<PathBuf>,
}

/// Install the tracing subscriber. Honors `RUST_LOG`; `info` for this crate by default.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corenlp_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Resolve input, run the configured pipeline once and print the result.
pub async fn run(cli: Cli, mode: PrintMode) -> anyhow::Result<()> {
    let config = PipelineConfig::load()
        .await
        .context("Failed to load configuration")?;

    let text = input::resolve(cli.input.as_deref());
    if cli.input.is_some() {
        println!("Getting text from input file");
    }

    println!("Starting CoreNLP");
    let pipeline = Pipeline::from_config(&config).context("Invalid pipeline configuration")?;
    let request = pipeline.request(text);
    let result = pipeline
        .annotate(&request)
        .await
        .inspect_err(|e| {
            if matches!(
                e,
                PipelineError::Engine(EngineError::Connection(_) | EngineError::NotAvailable(_))
            ) {
                warn!("{}", pipeline.engine().availability_hint());
            }
        })
        .context("Annotation failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    mode.render(&result, &mut out)?;
    writeln!(out, "End of program")?;
    out.flush()?;
    Ok(())
}
