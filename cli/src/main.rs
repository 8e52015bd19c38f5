//! Vitals CLI
//!
//! Command-line interface for probing a running Vitals server.
//!
//! # Usage
//!
//! ```bash
//! vitals --help
//! vitals health
//! vitals ready --api-url http://admin.internal:8080
//! vitals metrics
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::health::{CheckStatus, HealthStatus};
use std::process::ExitCode;
use std::time::Duration;

/// Vitals CLI - probe the health and metrics endpoints of a Vitals server
#[derive(Parser)]
#[command(name = "vitals")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "VITALS_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server's liveness checks
    Health,
    /// Run the server's readiness checks
    Ready,
    /// Print the server's Prometheus metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;

    match cli.command {
        Some(Commands::Health) => probe(&client, &cli.api_url, "/healthz").await,
        Some(Commands::Ready) => probe(&client, &cli.api_url, "/readyz").await,
        Some(Commands::Metrics) => {
            let url = endpoint(&cli.api_url, "/metrics");
            tracing::debug!(%url, "Fetching metrics");
            let body = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to reach {url}"))?
                .error_for_status()?
                .text()
                .await?;
            print!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Vitals CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Fetches a health report and prints it. Unhealthy reports exit with status 1.
async fn probe(client: &reqwest::Client, api_url: &str, path: &str) -> Result<ExitCode> {
    let url = endpoint(api_url, path);
    tracing::debug!(%url, "Running checks");

    // 503 still carries a report, so the status code is not checked here.
    let report: HealthStatus = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?
        .json()
        .await
        .with_context(|| format!("Unexpected response from {url}"))?;

    print!("{}", format_report(&report));

    Ok(if report.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn endpoint(api_url: &str, path: &str) -> String {
    format!("{}{path}", api_url.trim_end_matches('/'))
}

fn format_report(report: &HealthStatus) -> String {
    let mut out = format!("{} ({})\n", report.status, report.timestamp.to_rfc3339());
    for (name, check) in &report.checks {
        let marker = match check.status {
            CheckStatus::Healthy => "ok",
            CheckStatus::Unhealthy => "FAIL",
        };
        out.push_str(&format!("  [{marker}] {name} {}ms", check.duration_ms));
        if let Some(message) = &check.message {
            out.push_str(&format!(" - {message}"));
        }
        out.push('\n');
    }
    out
}
