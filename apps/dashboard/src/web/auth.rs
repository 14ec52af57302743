//! # Authentication Module
//!
//! HTTP Basic authentication in front of every request, static assets and
//! error pages included.
//!
//! ## Usage
//!
//! ```text
//! Authorization: Basic base64(user:password)
//! ```
//!
//! Credentials are checked against the `CredentialStore` loaded at startup.
//! There are no sessions: every request is checked again.

use super::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};

// =============================================================================
// BASIC AUTHENTICATION
// =============================================================================

/// Build the `WWW-Authenticate` challenge for `realm`.
///
/// Returns `None` if the realm cannot be carried in a header.
pub fn challenge_header(realm: &str) -> Option<HeaderValue> {
    if realm.contains('"') {
        return None;
    }
    HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)).ok()
}

/// Extract `(user, password)` from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Basic authentication middleware.
///
/// Answers `401` with a challenge when the header is missing, malformed or
/// does not match the credential store. Nothing behind the gate runs then.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some((user, password)) = basic_credentials(request.headers()) else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_credentials",
            "Missing or malformed Authorization header"
        );
        return unauthorized(&state.auth_challenge);
    };

    if verify(&state, user.clone(), password).await {
        next.run(request).await
    } else {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_credentials",
            user = %user,
            "Authentication failed"
        );
        unauthorized(&state.auth_challenge)
    }
}

/// Check credentials, moving password hashing off the async workers.
async fn verify(state: &AppState, user: String, password: String) -> bool {
    if !state.credentials.is_hashed(&user) {
        return state.credentials.verify(&user, &password);
    }
    let credentials = state.credentials.clone();
    tokio::task::spawn_blocking(move || credentials.verify(&user, &password))
        .await
        .unwrap_or(false)
}

fn unauthorized(challenge: &HeaderValue) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge.clone())],
        "401 Unauthorized",
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("valid header"),
        );
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let encoded = STANDARD.encode("alice:pa:ss");
        let headers = headers_with(&format!("Basic {}", encoded));
        assert_eq!(
            basic_credentials(&headers),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
        assert_eq!(basic_credentials(&headers_with("Bearer abc")), None);
        assert_eq!(basic_credentials(&headers_with("Basic !!!")), None);
        let no_colon = STANDARD.encode("alice");
        assert_eq!(basic_credentials(&headers_with(&format!("Basic {}", no_colon))), None);
    }

    #[test]
    fn challenge_names_the_realm() {
        let value = challenge_header("Private area").expect("valid realm");
        assert_eq!(value.to_str().ok(), Some("Basic realm=\"Private area\""));
        assert!(challenge_header("bad\"realm").is_none());
    }
}
