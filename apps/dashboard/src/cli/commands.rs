//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ServeArgs;
use crate::web::{Dashboard, mounted_routes};
use a11y_dashboard_core::{Config, DashboardError, hash_password};
use std::io::BufRead;
use std::path::Path;

/// File and environment configuration with command-line flags on top.
fn load_config(config_path: Option<&Path>, args: &ServeArgs) -> Result<Config, DashboardError> {
    let config = Config::load(config_path)?;
    Ok(args.apply(config).normalize())
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn cmd_serve(
    config_path: Option<&Path>,
    args: &ServeArgs,
    quiet: bool,
) -> Result<(), DashboardError> {
    let config = load_config(config_path, args)?;
    let webservice = config.webservice_url()?;
    let readonly = config.readonly();
    let production = config.environment.is_production();
    let dashboard = Dashboard::new(config)?;

    let handle = dashboard.start().await?;

    if !quiet {
        println!("Accessibility Dashboard started");
        println!();
        println!("Configuration:");
        println!("  Address:    {}", handle.address);
        println!("  Webservice: {}", webservice);
        println!("  Read-only:  {}", readonly);
        println!("  Production: {}", production);
        println!();
        println!("Pages:");
        for route in mounted_routes(readonly) {
            println!("  {}", route.path);
        }
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| DashboardError::IoError(format!("Cannot listen for Ctrl+C: {}", e)))?;
    tracing::info!("Shutting down");
    handle.shutdown().await
}

// =============================================================================
// CHECK-CONFIG COMMAND
// =============================================================================

/// Load everything `serve` would load, without binding, and print it.
pub fn cmd_check_config(
    config_path: Option<&Path>,
    args: &ServeArgs,
    json_mode: bool,
) -> Result<(), DashboardError> {
    let config = load_config(config_path, args)?;
    let dashboard = Dashboard::new(config)?;
    let config = dashboard.config();

    if json_mode {
        let output = serde_json::json!({
            "config": config,
            "listen": config.listen_addr()?,
            "webservice_url": dashboard.client().base_url(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Accessibility Dashboard Configuration");
    println!("=====================================");
    println!("Listen:       {}", config.listen_addr()?);
    println!("Webservice:   {}", dashboard.client().base_url());
    println!("Environment:  {:?}", config.environment);
    println!("Read-only:    {}", config.readonly());
    println!("No-index:     {}", config.noindex());
    println!("Credentials:  {}", config.htpasswd.display());
    println!("Public dir:   {}", config.public_dir.display());
    println!("Auth realm:   {}", config.auth_realm);
    if let Some(message) = &config.site_message {
        println!("Site message: {}", message);
    }

    Ok(())
}

// =============================================================================
// HASH-PASSWORD COMMAND
// =============================================================================

/// Print a `user:$argon2id$...` line for the credential file.
pub fn cmd_hash_password(
    user: &str,
    password: Option<String>,
    json_mode: bool,
) -> Result<(), DashboardError> {
    if user.is_empty() || user.contains(':') {
        return Err(DashboardError::Credentials(
            "user name must be non-empty and must not contain ':'".to_string(),
        ));
    }

    let password = match password {
        Some(password) => password,
        None => read_password_line(std::io::stdin().lock())?,
    };
    let hash = hash_password(&password)?;

    if json_mode {
        let output = serde_json::json!({ "user": user, "hash": hash });
        println!("{}", output);
    } else {
        println!("{}:{}", user, hash);
    }
    Ok(())
}

/// First line of `input`, without its line ending.
fn read_password_line(mut input: impl BufRead) -> Result<String, DashboardError> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| DashboardError::IoError(format!("Cannot read password: {}", e)))?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(DashboardError::Credentials("empty password".to_string()));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_line_strips_line_ending() {
        let password = read_password_line("s3cret pass\r\nrest".as_bytes()).expect("one line");
        assert_eq!(password, "s3cret pass");
        assert!(read_password_line("\n".as_bytes()).is_err());
    }

    #[test]
    fn hash_password_rejects_bad_user() {
        assert!(cmd_hash_password("a:b", Some("pw".to_string()), false).is_err());
        assert!(cmd_hash_password("", Some("pw".to_string()), false).is_err());
    }
}
