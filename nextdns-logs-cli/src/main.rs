//! `nextdns-logs` entry point
//!
//! Downloads the query log of one NextDNS profile and writes it as JSON and
//! CSV. Logs go to stderr, the summary to stdout.
//!
//! Exit codes: `0` success, `1` failure, `130` interrupted (nothing written).

mod cli;

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use cli::Args;
use nextdns_logs_core::{CoreError, CoreResult, ExportReport, ExportService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing to stderr (stdout carries the summary)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = match args.into_config(Utc::now()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Resolved configuration: {config:?}");

    let service = match ExportService::new(config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to initialize client: {e}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = service.run() => report(&result),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, no files were written");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

/// Print the outcome and map it to an exit code.
fn report(result: &CoreResult<ExportReport>) -> ExitCode {
    match result {
        Ok(report) if report.entries == 0 => {
            println!("No logs available for the requested window");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!("Exported {} log entries", report.entries);
            for file in &report.files {
                println!("  {}", file.display());
            }
            ExitCode::SUCCESS
        }
        Err(CoreError::DownloadFailed {
            source,
            saved,
            files,
            write_error,
        }) if *saved > 0 => {
            tracing::error!("Download failed partway: {source}");
            if let Some(write_err) = write_error {
                tracing::error!("Partial export only partly saved: {write_err}");
            }
            println!("Download failed partway; {saved} entries saved (incomplete):");
            for file in files {
                println!("  {}", file.display());
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            if let CoreError::DownloadFailed {
                write_error: Some(write_err),
                ..
            } = e
            {
                tracing::error!("Partial export could not be saved: {write_err}");
            }
            if e.is_expected() {
                tracing::warn!("{e}");
            } else {
                tracing::error!("{e}");
            }
            println!("Export failed before any data was saved: {e}");
            ExitCode::FAILURE
        }
    }
}
