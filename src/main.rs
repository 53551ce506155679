mod embeddings;
mod error;
#[cfg(test)]
mod fake;
mod llm;
mod rag;
mod settings;
mod vector_db;

use anyhow::{Context, Result};
use clap::Parser;
use error::RagError;
use rag::RagPipeline;
use settings::{Args, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Problem while loading .env file");
        }
    }

    let args = Args::parse();
    let settings = Settings::from_env(args.config.as_deref())
        .context("Problem while loading settings")?;

    let pipeline = RagPipeline::from_settings(&settings);
    let answer = pipeline
        .answer(&args.query)
        .await
        .map_err(pipeline_failure)?;
    println!("{answer}");
    Ok(())
}

/// Wraps a pipeline error for the single report `main` prints on exit.
fn pipeline_failure(e: RagError) -> anyhow::Error {
    let kind = if e.is_retryable() { "transient" } else { "fatal" };
    anyhow::Error::new(e).context(format!("Pipeline stopped on a {kind} error"))
}
