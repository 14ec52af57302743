//! # Static Assets
//!
//! GET and HEAD requests are tried against the public directory before any
//! page route, so `/css/site.css` is a file and never a result page. Misses
//! fall through to the routes. Served files carry the `Cache-Control` value
//! chosen at startup (one week in production, revalidate otherwise).

use super::AppState;
use a11y_dashboard_core::Environment;
use a11y_dashboard_core::primitives::STATIC_MAX_AGE_PRODUCTION_SECS;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tower::ServiceExt;

/// `Cache-Control` value for static assets in `environment`.
#[must_use]
pub fn cache_control(environment: Environment) -> HeaderValue {
    let max_age = if environment.is_production() {
        STATIC_MAX_AGE_PRODUCTION_SECS
    } else {
        0
    };
    // Digits and ASCII only, always a valid header value.
    HeaderValue::from_str(&format!("public, max-age={}", max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// Serve a file from the public directory, or hand the request to the routes.
pub async fn static_files_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return next.run(request).await;
    }

    let mut lookup = Request::new(Body::empty());
    *lookup.method_mut() = request.method().clone();
    *lookup.uri_mut() = request.uri().clone();
    *lookup.headers_mut() = request.headers().clone();

    let response = state
        .static_files
        .clone()
        .oneshot(lookup)
        .await
        .unwrap_or_else(|never| match never {});

    if response.status() == StatusCode::NOT_FOUND {
        return next.run(request).await;
    }

    let mut response = response.map(Body::new);
    if response.status().is_success() || response.status() == StatusCode::NOT_MODIFIED {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, state.static_cache_control.clone());
    }
    tracing::trace!(path = %request.uri().path(), status = %response.status(), "Static asset");
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_lifetime_depends_on_environment() {
        assert_eq!(
            cache_control(Environment::Production).to_str().ok(),
            Some("public, max-age=604800")
        );
        assert_eq!(
            cache_control(Environment::Development).to_str().ok(),
            Some("public, max-age=0")
        );
    }
}
