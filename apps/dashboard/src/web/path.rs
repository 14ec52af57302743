//! # Path Parameters
//!
//! `axum::extract::Path` with its rejection routed through the error pages.
//! A segment that does not decode (`/%FF`) cannot name a task or result, so
//! it is a 404 like any other unknown path.

use super::errors::{PageError, RouteError};
use axum::{
    extract::{FromRequestParts, Path, rejection::PathRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// Path parameters of a page route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePath<T>(pub T);

impl<T, S> FromRequestParts<S> for PagePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => {
                tracing::debug!(
                    path = %parts.uri.path(),
                    reason = %e.body_text(),
                    "Undecodable path parameter"
                );
                Err(PageError::NotFound)
            }
            Err(other) => Err(PageError::Server(RouteError::Render(other.body_text()))),
        }
    }
}
