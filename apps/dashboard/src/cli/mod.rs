//! # Dashboard CLI Module
//!
//! This module implements the CLI interface for the dashboard.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server (the default)
//! - `check-config` - Load and print the effective configuration
//! - `hash-password` - Print an Argon2 credential line

mod commands;

use a11y_dashboard_core::{Config, DashboardError, Environment, WebserviceLocation};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Accessibility Dashboard
///
/// Web front end for the accessibility webservice: browse tasks and results,
/// add, edit and run tasks.
#[derive(Parser, Debug)]
#[command(name = "a11y-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ./dashboard.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve(ServeArgs),

    /// Load the configuration and credentials, then print the result
    CheckConfig(ServeArgs),

    /// Hash a password for the credential file
    HashPassword {
        /// User name for the credential line
        #[arg(short, long)]
        user: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Overrides applied on top of file and environment configuration.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Webservice base URL
    #[arg(short, long)]
    pub webservice: Option<String>,

    /// Hide every route that changes tasks
    #[arg(long)]
    pub readonly: bool,

    /// Production mode: long static caching, no error details on pages
    #[arg(long)]
    pub production: bool,
}

impl ServeArgs {
    /// Apply the flags that were given to `config`.
    #[must_use]
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = Some(port);
        }
        if let Some(url) = &self.webservice {
            config.webservice = Some(WebserviceLocation::Url(url.clone()));
        }
        if self.readonly {
            config.readonly = Some(true);
        }
        if self.production {
            config.environment = Environment::Production;
        }
        config
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DashboardError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Serve(args)) => cmd_serve(config_path, &args, cli.quiet).await,
        Some(Commands::CheckConfig(args)) => cmd_check_config(config_path, &args, cli.json_mode),
        Some(Commands::HashPassword { user, password }) => {
            cmd_hash_password(&user, password, cli.json_mode)
        }
        // No subcommand - serve with file and environment configuration
        None => cmd_serve(config_path, &ServeArgs::default(), cli.quiet).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "a11y-dashboard",
            "--config",
            "custom.toml",
            "serve",
            "--port",
            "8080",
            "--webservice",
            "http://ws:3000/",
            "--readonly",
        ])
        .expect("valid arguments");

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let args = match cli.command {
            Some(Commands::Serve(args)) => args,
            _ => ServeArgs::default(),
        };
        assert_eq!(args.port, Some(8080));
        assert!(args.readonly);
        assert!(!args.production);
    }

    #[test]
    fn flags_override_config() {
        let args = ServeArgs {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            webservice: Some("http://ws/".to_string()),
            readonly: true,
            production: true,
        };
        let config = args.apply(Config {
            readonly: Some(false),
            ..Config::default()
        });
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.readonly, Some(true));
        assert!(config.environment.is_production());
        assert_eq!(config.webservice_url().ok().as_deref(), Some("http://ws/"));
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let config = Config {
            readonly: Some(true),
            port: Some(4000),
            ..Config::default()
        };
        assert_eq!(ServeArgs::default().apply(config.clone()), config);
    }

    #[test]
    fn hash_password_requires_user() {
        assert!(Cli::try_parse_from(["a11y-dashboard", "hash-password"]).is_err());
    }
}
