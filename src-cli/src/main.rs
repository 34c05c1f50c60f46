//! QR Studio command-line front end.
//!
//! Loads configuration from the environment (and `.env`), resolves style
//! options, renders through `qr-render` and prints the exported file path.

mod cli;
mod commands;
mod config;
mod style;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use qr_render::QrRenderError;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    tracing::debug!(?config, "Configuration loaded");

    match commands::run(cli.command, &config).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            if let Some(QrRenderError::PermissionDenied(path)) = e.downcast_ref::<QrRenderError>() {
                tracing::error!(
                    path = %path.display(),
                    "Output location is not writable; pick another with --out-dir or QR_OUTPUT_DIR"
                );
            }
            Err(e)
        }
    }
}
