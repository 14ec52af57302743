//! # Fixed Defaults
//!
//! Constants compiled into the binary. Deployment-specific values are read from
//! configuration; these are only the fallbacks and the fixed user-facing text.

/// Port the dashboard listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 4000;

/// Interface the dashboard binds to by default (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Webservice host used when neither a URL nor a host is configured.
pub const DEFAULT_WEBSERVICE_HOST: &str = "localhost";

/// Webservice port used when neither a URL nor a port is configured.
pub const DEFAULT_WEBSERVICE_PORT: u16 = 3000;

/// Realm announced in the `WWW-Authenticate` challenge.
pub const DEFAULT_AUTH_REALM: &str = "Private area";

/// Credential file read when no other path is configured.
pub const DEFAULT_HTPASSWD: &str = "htpasswd";

/// Static asset directory served when no other path is configured.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Configuration file picked up from the working directory if present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Static asset cache lifetime in production: one week.
pub const STATIC_MAX_AGE_PRODUCTION_SECS: u64 = 604_800;

/// Message shown instead of the raw error when the webservice cannot be reached.
pub const BACKEND_UNREACHABLE_MESSAGE: &str = "Could not connect to the accessibility webservice";

/// Upper bound on a submitted form body (2 MiB).
pub const MAX_FORM_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Timeout applied to every webservice request.
pub const WEBSERVICE_TIMEOUT_SECS: u64 = 30;
