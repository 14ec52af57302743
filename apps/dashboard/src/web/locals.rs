//! # View Locals
//!
//! Values every page template can read.
//!
//! - `SiteLocals` is built once at startup and shared read-only.
//! - `RequestLocals` is allocated for each request by the locals middleware
//!   and travels as a request extension.

use super::AppState;
use a11y_dashboard_core::Config;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Datelike;
use std::convert::Infallible;
use std::sync::Arc;

// =============================================================================
// SITE LOCALS
// =============================================================================

/// Process-wide values, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLocals {
    pub lang: &'static str,
    pub year: i32,
    pub version: &'static str,
    pub repository: &'static str,
    pub bugtracker: String,
    pub noindex: bool,
    pub readonly: bool,
    pub site_message: Option<String>,
}

impl SiteLocals {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let repository = env!("CARGO_PKG_REPOSITORY");
        Self {
            lang: "en",
            year: chrono::Utc::now().year(),
            version: env!("CARGO_PKG_VERSION"),
            repository,
            bugtracker: format!("{}/issues", repository),
            noindex: config.noindex(),
            readonly: config.readonly(),
            site_message: config
                .site_message
                .clone()
                .filter(|message| !message.trim().is_empty()),
        }
    }
}

// =============================================================================
// REQUEST LOCALS
// =============================================================================

/// Per-request values. Never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLocals {
    /// The request path is exactly `/`.
    pub is_home_page: bool,
    /// Hostname the client used, without the port.
    pub host: String,
}

impl RequestLocals {
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.host())
            .map(hostname)
            .unwrap_or_default();

        Self {
            is_home_page: parts.uri.path() == "/",
            host: host.to_string(),
        }
    }
}

/// Strip the port from a `Host` value, keeping IPv6 brackets intact.
fn hostname(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

/// Middleware: attach fresh `RequestLocals` to the request.
pub async fn request_locals_middleware(request: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let locals = RequestLocals::from_parts(&parts);
    parts.extensions.insert(locals);
    next.run(Request::from_parts(parts, body)).await
}

// =============================================================================
// PAGE CONTEXT EXTRACTOR
// =============================================================================

/// Everything a page view needs: the shared site locals plus this request's.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site: Arc<SiteLocals>,
    pub request: RequestLocals,
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request = parts
            .extensions
            .get::<RequestLocals>()
            .cloned()
            .unwrap_or_else(|| RequestLocals::from_parts(parts));
        Ok(Self {
            site: Arc::clone(&state.site),
            request,
        })
    }
}
