//! # Accessibility Dashboard
//!
//! The main binary of the accessibility dashboard.
//!
//! ## Usage
//!
//! ```bash
//! # Start the dashboard (reads ./dashboard.toml and DASHBOARD_* variables)
//! a11y-dashboard serve --port 4000 --webservice http://localhost:3000/
//!
//! # Show the effective configuration
//! a11y-dashboard check-config --json-mode
//!
//! # Add a user to the credential file
//! a11y-dashboard hash-password --user alice >> htpasswd
//! ```

use a11y_dashboard::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // DASHBOARD_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DASHBOARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "a11y_dashboard=info,a11y_webservice_client=info,tower_http=debug".into()
    });

    // Logs go to stderr so `hash-password` and `--json-mode` output stays clean.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
