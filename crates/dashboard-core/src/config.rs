//! # Configuration
//!
//! Configuration is assembled once at startup, in this order:
//!
//! 1. `dashboard.toml` (or the file given with `--config`), if present
//! 2. `DASHBOARD_*` environment variables
//! 3. Deployment defaults (port 4000, webservice on `localhost:3000`)
//! 4. The normalizer (`noindex` defaults to true, `readonly` to false)
//!
//! After that the value is never mutated again.
//!
//! ## Environment Variables
//!
//! - `DASHBOARD_PORT`, `DASHBOARD_HOST`: listen address
//! - `DASHBOARD_WEBSERVICE_URL`: webservice base URL (wins over host/port)
//! - `DASHBOARD_WEBSERVICE_HOST`, `DASHBOARD_WEBSERVICE_PORT`: webservice address
//! - `DASHBOARD_NOINDEX`, `DASHBOARD_READONLY`: `true` or `false`
//! - `DASHBOARD_SITE_MESSAGE`: banner shown on every page
//! - `DASHBOARD_ENV`: `production` enables production mode
//! - `DASHBOARD_HTPASSWD`, `DASHBOARD_PUBLIC_DIR`, `DASHBOARD_AUTH_REALM`

use crate::primitives::{
    DEFAULT_AUTH_REALM, DEFAULT_CONFIG_FILE, DEFAULT_HOST, DEFAULT_HTPASSWD, DEFAULT_PORT,
    DEFAULT_PUBLIC_DIR, DEFAULT_WEBSERVICE_HOST, DEFAULT_WEBSERVICE_PORT,
};
use crate::types::DashboardError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// WEBSERVICE LOCATION
// =============================================================================

/// Where the webservice lives: a ready-made URL or a host/port pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebserviceLocation {
    Url(String),
    Address { host: String, port: u16 },
}

impl WebserviceLocation {
    /// Base URL the client is built from.
    ///
    /// A host/port pair becomes exactly `http://{host}:{port}/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Address { host, port } => format!("http://{}:{}/", host, port),
        }
    }
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Deployment mode. Production enables long-lived static caching and hides
/// error details from rendered pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// `production` (any case) is production; every other name is development.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Dashboard configuration.
///
/// `noindex` and `readonly` stay `Option` until `normalize` runs so that
/// "not given" can be told apart from an explicit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub webservice: Option<WebserviceLocation>,
    pub host: String,
    pub port: Option<u16>,
    pub noindex: Option<bool>,
    pub readonly: Option<bool>,
    pub site_message: Option<String>,
    pub environment: Environment,
    pub htpasswd: PathBuf,
    pub public_dir: PathBuf,
    pub auth_realm: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webservice: None,
            host: DEFAULT_HOST.to_string(),
            port: None,
            noindex: None,
            readonly: None,
            site_message: None,
            environment: Environment::Development,
            htpasswd: PathBuf::from(DEFAULT_HTPASSWD),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            auth_realm: DEFAULT_AUTH_REALM.to_string(),
        }
    }
}

impl Config {
    /// Fill in `noindex` (true) and `readonly` (false) when unset.
    ///
    /// Pure and idempotent; every other field passes through unvalidated.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.noindex = Some(self.noindex.unwrap_or(true));
        self.readonly = Some(self.readonly.unwrap_or(false));
        self
    }

    /// Whether pages ask search engines not to index them.
    #[must_use]
    pub fn noindex(&self) -> bool {
        self.noindex.unwrap_or(true)
    }

    /// Whether mutating routes are left unmounted.
    #[must_use]
    pub fn readonly(&self) -> bool {
        self.readonly.unwrap_or(false)
    }

    /// `host:port` to bind. A missing port is a configuration defect.
    pub fn listen_addr(&self) -> Result<String, DashboardError> {
        let port = self
            .port
            .ok_or_else(|| DashboardError::Config("port is not set".to_string()))?;
        Ok(format!("{}:{}", self.host, port))
    }

    /// Base URL of the webservice. A missing location is a configuration defect.
    pub fn webservice_url(&self) -> Result<String, DashboardError> {
        self.webservice
            .as_ref()
            .map(WebserviceLocation::base_url)
            .ok_or_else(|| DashboardError::Config("webservice is not set".to_string()))
    }

    /// Parse a TOML document. Absent keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, DashboardError> {
        toml::from_str(contents).map_err(|e| DashboardError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load the complete startup configuration from file and process environment.
    ///
    /// An explicitly given `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, DashboardError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// `load` with an explicit environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        };

        let config = match file {
            Some(file) => {
                let contents = std::fs::read_to_string(&file).map_err(|e| {
                    DashboardError::IoError(format!(
                        "Cannot read config file '{}': {}",
                        file.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Self::default(),
        };

        Ok(config
            .apply_env(lookup)?
            .with_deployment_defaults()
            .normalize())
    }

    /// Apply `DASHBOARD_*` overrides looked up through `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = get("DASHBOARD_PORT") {
            self.port = Some(parse_port("DASHBOARD_PORT", &port)?);
        }
        if let Some(host) = get("DASHBOARD_HOST") {
            self.host = host;
        }
        if let Some(value) = get("DASHBOARD_NOINDEX") {
            self.noindex = Some(parse_bool("DASHBOARD_NOINDEX", &value)?);
        }
        if let Some(value) = get("DASHBOARD_READONLY") {
            self.readonly = Some(parse_bool("DASHBOARD_READONLY", &value)?);
        }
        if let Some(message) = get("DASHBOARD_SITE_MESSAGE") {
            self.site_message = Some(message);
        }
        if let Some(env) = get("DASHBOARD_ENV") {
            self.environment = Environment::from_name(&env);
        }
        if let Some(path) = get("DASHBOARD_HTPASSWD") {
            self.htpasswd = PathBuf::from(path);
        }
        if let Some(path) = get("DASHBOARD_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(path);
        }
        if let Some(realm) = get("DASHBOARD_AUTH_REALM") {
            self.auth_realm = realm;
        }

        if let Some(url) = get("DASHBOARD_WEBSERVICE_URL") {
            self.webservice = Some(WebserviceLocation::Url(url));
        } else {
            let host = get("DASHBOARD_WEBSERVICE_HOST");
            let port = get("DASHBOARD_WEBSERVICE_PORT")
                .map(|port| parse_port("DASHBOARD_WEBSERVICE_PORT", &port))
                .transpose()?;

            if host.is_some() || port.is_some() {
                let (current_host, current_port) = match &self.webservice {
                    Some(WebserviceLocation::Address { host, port }) => (host.clone(), *port),
                    _ => (DEFAULT_WEBSERVICE_HOST.to_string(), DEFAULT_WEBSERVICE_PORT),
                };
                self.webservice = Some(WebserviceLocation::Address {
                    host: host.unwrap_or(current_host),
                    port: port.unwrap_or(current_port),
                });
            }
        }

        Ok(self)
    }

    /// Fill the values a deployment normally never leaves empty.
    #[must_use]
    pub fn with_deployment_defaults(mut self) -> Self {
        if self.port.is_none() {
            self.port = Some(DEFAULT_PORT);
        }
        if self.webservice.is_none() {
            self.webservice = Some(WebserviceLocation::Address {
                host: DEFAULT_WEBSERVICE_HOST.to_string(),
                port: DEFAULT_WEBSERVICE_PORT,
            });
        }
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DashboardError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DashboardError::Config(format!(
            "{} must be 'true' or 'false', got '{}'",
            key, other
        ))),
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, DashboardError> {
    value.trim().parse::<u16>().map_err(|_| {
        DashboardError::Config(format!("{} must be a port number, got '{}'", key, value))
    })
}

// =============================================================================
// TESTS
// =============================================================================
