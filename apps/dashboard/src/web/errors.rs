//! # Error Classification
//!
//! Handlers return `Result<Response, PageError>`. A failed handler does not
//! render anything itself: `PageError` leaves a `PageOutcome` marker on the
//! response, and `error_pages_middleware` turns that marker into the final
//! 404 or 500 page.
//!
//! ## Outcomes
//!
//! - `NotFound`: unmatched path or method, missing static file, or a
//!   webservice lookup that found nothing. Renders 404, emits nothing.
//! - `Failed`: any other handler error. Unreachable-backend errors are
//!   replaced by a user-facing message, the error is published to route
//!   error subscribers, and a 500 page is rendered (with detail outside
//!   production).

use super::AppState;
use super::locals::RequestLocals;
use super::views;
use a11y_dashboard_core::primitives::BACKEND_UNREACHABLE_MESSAGE;
use a11y_webservice_client::WebserviceError;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

// =============================================================================
// ROUTE ERROR
// =============================================================================

/// An error raised while handling a request, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The webservice could not be reached. Replaces the raw connection error.
    #[error("{}", BACKEND_UNREACHABLE_MESSAGE)]
    BackendUnreachable,

    /// The webservice answered with an error.
    #[error(transparent)]
    Webservice(#[from] WebserviceError),

    /// The request body could not be parsed.
    #[error("Invalid form submission: {0}")]
    Form(String),

    /// A response could not be produced.
    #[error("Cannot render response: {0}")]
    Render(String),
}

impl RouteError {
    /// Replace unreachable-backend errors with the user-facing kind.
    #[must_use]
    pub fn classify(self) -> Self {
        match self {
            Self::Webservice(e) if e.is_unreachable() => Self::BackendUnreachable,
            other => other,
        }
    }
}

// =============================================================================
// PAGE ERROR
// =============================================================================

/// What a handler returns when it cannot produce its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    NotFound,
    Server(RouteError),
}

impl From<RouteError> for PageError {
    fn from(error: RouteError) -> Self {
        Self::Server(error)
    }
}

impl From<WebserviceError> for PageError {
    fn from(error: WebserviceError) -> Self {
        match error {
            WebserviceError::NotFound => Self::NotFound,
            other => Self::Server(RouteError::Webservice(other)),
        }
    }
}

/// Marker left on a response for the error-pages middleware.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    NotFound,
    Failed(RouteError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, PageOutcome::NotFound),
            Self::Server(error) => (StatusCode::INTERNAL_SERVER_ERROR, PageOutcome::Failed(error)),
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(outcome);
        response
    }
}

// =============================================================================
// ERROR PAGES MIDDLEWARE
// =============================================================================

/// Render the terminal 404 / 500 pages for responses marked by `PageError`.
pub async fn error_pages_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let locals = request
        .extensions()
        .get::<RequestLocals>()
        .cloned()
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let Some(outcome) = response.extensions_mut().remove::<PageOutcome>() else {
        return response;
    };

    match outcome {
        PageOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Html(views::not_found_page(&state.site, &locals)),
        )
            .into_response(),
        PageOutcome::Failed(error) => {
            let error = error.classify();
            tracing::error!(event = "route_error", error = %error, "Request failed");
            // No subscribers is not an error.
            let _ = state.route_errors.send(error.clone());

            let detail = (!state.environment.is_production()).then(|| error.to_string());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::error_page(&state.site, &locals, detail.as_deref())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_errors_are_rewritten() {
        let refused = RouteError::Webservice(WebserviceError::ConnectionRefused(
            "http://localhost:3000/".to_string(),
        ));
        assert_eq!(refused.classify(), RouteError::BackendUnreachable);
        assert_eq!(
            RouteError::BackendUnreachable.to_string(),
            BACKEND_UNREACHABLE_MESSAGE
        );
    }

    #[test]
    fn other_errors_pass_through() {
        let status = RouteError::Webservice(WebserviceError::Status {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(status.clone().classify(), status);
    }

    #[test]
    fn webservice_not_found_is_a_404() {
        assert_eq!(PageError::from(WebserviceError::NotFound), PageError::NotFound);
        let response = PageError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<PageOutcome>().is_some());
    }
}
