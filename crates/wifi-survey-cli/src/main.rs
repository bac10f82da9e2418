//! wifi-survey CLI Entry Point

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wifi_survey_cli::Cli;
use wifi_survey_scan::{IwOptions, IwScanProvider, ScanController, TerminalRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the table.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            println!("{err}");
            std::process::exit(1);
        }
    };

    let options = IwOptions {
        cached: config.cached_scan,
        ..IwOptions::default()
    };
    let provider = IwScanProvider::open_with(&config.interface, options)
        .with_context(|| format!("Couldn't initialise wifi scanner on {}", config.interface))?;

    let renderer = TerminalRenderer::stdout(config.interval_ms, config.clear_screen);
    let mut controller = ScanController::new(provider, renderer, &config);

    let shutdown = controller.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current scan");
            shutdown.shutdown();
        }
    });

    let summary = controller.run().await?;
    tracing::info!(
        scans = summary.succeeded,
        failed = summary.failed,
        "survey finished"
    );

    Ok(())
}
