//! # a11y-dashboard
//!
//! Web front end for the accessibility webservice.
//!
//! - `web` - the HTTP server: auth gate, pages, error pages, lifecycle
//! - `cli` - the `a11y-dashboard` command line
//!
//! ```no_run
//! # async fn demo() -> Result<(), a11y_dashboard_core::DashboardError> {
//! use a11y_dashboard::web::Dashboard;
//! use a11y_dashboard_core::Config;
//!
//! let config = Config::load(None)?;
//! let handle = Dashboard::new(config)?.start().await?;
//! println!("listening on {}", handle.address);
//! handle.wait().await
//! # }
//! ```

pub mod cli;
pub mod web;
