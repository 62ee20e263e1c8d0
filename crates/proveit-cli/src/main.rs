//! Provenance verifier for generative-art collections
//!
//! Checks that every image in an import directory's collection hashes to the
//! value its metadata declares, then that the ordered digests fold into the
//! manifest's pre-reveal provenance hash.

use anyhow::Result;
use clap::Parser;
use proveit_cli::config::{ConfigOverrides, VerifierConfig};
use proveit_cli::handlers::{handle_verify, normalize_import_dir};
use proveit_cli::output::{self, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proveit", version)]
#[command(about = "Verify a collection against its provenance hash", long_about = None)]
struct Cli {
    /// Directory containing manifest.json
    import_dir: String,

    /// Content gateway base URL
    #[arg(short, long)]
    gateway: Option<String>,

    /// Items verified at once (1 = sequential); on failure the lowest
    /// failing token among those in flight is reported
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Retries for timed-out fetches
    #[arg(long)]
    retries: Option<u32>,

    /// Metadata fetch timeout in milliseconds
    #[arg(long)]
    metadata_timeout_ms: Option<u64>,

    /// Image fetch timeout in milliseconds
    #[arg(long)]
    image_timeout_ms: Option<u64>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gateway: self.gateway.clone(),
            concurrency: self.concurrency,
            retries: self.retries,
            metadata_timeout_ms: self.metadata_timeout_ms,
            image_timeout_ms: self.image_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let env = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
    let config = VerifierConfig::resolve(cli.config.as_deref(), env, &cli.overrides())?;

    if cli.format == OutputFormat::Text {
        println!("{}", output::banner());
    }

    let import_dir = normalize_import_dir(&cli.import_dir);
    handle_verify(&import_dir, &config, cli.format).await?;
    Ok(())
}
