//! # Dashboard Web Module
//!
//! The HTTP server: middleware pipeline, route registry and server lifecycle.
//!
//! ## Pages
//!
//! - `GET /` - task list
//! - `GET /{task_id}` - task with result history
//! - `GET /{task_id}/{result_id}` - result with issues
//! - `GET /{task_id}/{result_id}/download/{format}` - CSV or JSON download
//! - `GET|POST /new`, `GET|POST /{task_id}/edit`, `GET|POST /{task_id}/delete`,
//!   `GET /{task_id}/run`, `POST /{task_id}/ignore`, `POST /{task_id}/unignore`
//!   - task changes, only mounted when not read-only (in read-only mode
//!   these paths answer 404)
//!
//! GET and HEAD requests are looked up in the public directory first.
//! Anything else no route matches is answered with 404.

mod auth;
mod errors;
mod form;
mod handlers;
mod locals;
mod path;
mod routes;
mod static_files;
pub mod views;

pub use auth::{basic_credentials, challenge_header};
pub use errors::{PageError, RouteError};
pub use form::FormData;
pub use path::PagePath;
pub use locals::{PageContext, RequestLocals, SiteLocals};
pub use routes::{Access, ROUTES, RouteSpec, mounted as mounted_routes};

use a11y_dashboard_core::primitives::MAX_FORM_BODY_BYTES;
use a11y_dashboard_core::{Config, CredentialStore, DashboardError, Environment};
use a11y_webservice_client::WebserviceClient;
use axum::{
    Router, extract::DefaultBodyLimit, http::HeaderValue, middleware as axum_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Route errors buffered per subscriber before the oldest are dropped.
const ROUTE_ERROR_CAPACITY: usize = 64;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the webservice, built before any route is registered.
    pub client: WebserviceClient,
    pub site: Arc<SiteLocals>,
    pub credentials: Arc<CredentialStore>,
    /// Precomputed `WWW-Authenticate` value.
    pub auth_challenge: HeaderValue,
    pub environment: Environment,
    pub route_errors: broadcast::Sender<RouteError>,
    pub static_files: ServeDir,
    pub static_cache_control: HeaderValue,
}

impl AppState {
    /// Build the state for an already normalized configuration.
    pub fn new(config: &Config, credentials: CredentialStore) -> Result<Self, DashboardError> {
        let base_url = config.webservice_url()?;
        let client = WebserviceClient::new(&base_url)
            .map_err(|e| DashboardError::Config(e.to_string()))?;

        let auth_challenge = challenge_header(&config.auth_realm).ok_or_else(|| {
            DashboardError::Config(format!("Invalid auth realm '{}'", config.auth_realm))
        })?;

        if credentials.is_empty() {
            tracing::warn!("Credential store is empty: every request will be rejected");
        }

        let (route_errors, _) = broadcast::channel(ROUTE_ERROR_CAPACITY);

        Ok(Self {
            client,
            site: Arc::new(SiteLocals::from_config(config)),
            credentials: Arc::new(credentials),
            auth_challenge,
            environment: config.environment,
            route_errors,
            static_files: ServeDir::new(&config.public_dir),
            static_cache_control: static_files::cache_control(config.environment),
        })
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all pages and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. Basic authentication - gates everything below, static files included
/// 3. Compression
/// 4. Body limit
/// 5. Request locals
/// 6. Error pages - renders 404 / 500 outcomes
/// 7. Static files - public directory, tried before any route
pub fn create_router(state: AppState) -> Router {
    routes::mount(Router::new(), state.site.readonly)
        .fallback(handlers::not_found_handler)
        .method_not_allowed_fallback(handlers::not_found_handler)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            static_files::static_files_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            errors::error_pages_middleware,
        ))
        .layer(axum_middleware::from_fn(locals::request_locals_middleware))
        .layer(DefaultBodyLimit::max(MAX_FORM_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::basic_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// A configured, not yet listening dashboard.
pub struct Dashboard {
    config: Config,
    state: AppState,
}

impl Dashboard {
    /// Normalize `config`, load the credential file and build the webservice client.
    pub fn new(config: Config) -> Result<Self, DashboardError> {
        let credentials = CredentialStore::load(&config.htpasswd)?;
        Self::with_credentials(config, credentials)
    }

    /// Like `new`, with credentials supplied directly.
    pub fn with_credentials(
        config: Config,
        credentials: CredentialStore,
    ) -> Result<Self, DashboardError> {
        let config = config.normalize();
        let state = AppState::new(&config, credentials)?;
        Ok(Self { config, state })
    }

    /// The normalized configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &WebserviceClient {
        &self.state.client
    }

    /// Subscribe to route errors. Subscribe before `start` to see every event.
    #[must_use]
    pub fn route_errors(&self) -> broadcast::Receiver<RouteError> {
        self.state.route_errors.subscribe()
    }

    /// The complete router, for serving it some other way (or testing it).
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind `host:port` and start serving in the background.
    ///
    /// Returns the handle once the listener is bound, or the reason binding
    /// failed. Never both.
    pub async fn start(self) -> Result<AppHandle, DashboardError> {
        let addr = self.config.listen_addr()?;
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
        let local_addr = listener.local_addr().map_err(|e| DashboardError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .map_err(|e| DashboardError::Server(e.to_string()))
        });

        let address = format!("http://{}", local_addr);
        tracing::info!("Accessibility dashboard listening on {}", address);

        Ok(AppHandle {
            address,
            local_addr,
            webservice: self.state.client.clone(),
            route_errors: self.state.route_errors.clone(),
            shutdown: shutdown_tx,
            server,
        })
    }
}

// =============================================================================
// APP HANDLE
// =============================================================================

/// A running dashboard. Dropping the handle stops the server.
pub struct AppHandle {
    /// `http://{ip}:{port}` actually bound.
    pub address: String,
    pub local_addr: SocketAddr,
    /// The client used by every route.
    pub webservice: WebserviceClient,
    route_errors: broadcast::Sender<RouteError>,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<Result<(), DashboardError>>,
}

impl AppHandle {
    #[must_use]
    pub fn route_errors(&self) -> broadcast::Receiver<RouteError> {
        self.route_errors.subscribe()
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) -> Result<(), DashboardError> {
        let _ = self.shutdown.send(());
        join(self.server).await
    }

    /// Wait until the server stops on its own.
    pub async fn wait(self) -> Result<(), DashboardError> {
        let Self {
            shutdown, server, ..
        } = self;
        let result = join(server).await;
        drop(shutdown);
        result
    }
}

async fn join(server: JoinHandle<Result<(), DashboardError>>) -> Result<(), DashboardError> {
    server
        .await
        .map_err(|e| DashboardError::Server(e.to_string()))?
}
