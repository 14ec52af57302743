//! Server lifecycle over real TCP: bind, serve concurrently, shut down.

#![allow(clippy::unwrap_used, clippy::panic)]

mod support;

use a11y_dashboard::web::{AppHandle, Dashboard};
use a11y_dashboard_core::{Config, DashboardError};
use support::{PASSWORD, SITE_CSS, USER, config, credentials, public_dir, seeded_fake};
use tempfile::TempDir;
use tokio::task::JoinSet;

async fn start(port: u16, public: &TempDir) -> Result<AppHandle, DashboardError> {
    let fake = seeded_fake();
    let url = fake.spawn().await.unwrap();
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: Some(port),
        ..config(&url, public)
    };
    Dashboard::with_credentials(config, credentials())?.start().await
}

#[tokio::test]
async fn start_reports_bound_address() {
    let public = public_dir();
    let handle = start(0, &public).await.unwrap();

    assert_ne!(handle.local_addr.port(), 0);
    assert_eq!(handle.address, format!("http://{}", handle.local_addr));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn port_in_use_is_a_bind_error() {
    let public = public_dir();
    let first = start(0, &public).await.unwrap();

    let second = start(first.local_addr.port(), &public).await;
    assert!(matches!(second, Err(DashboardError::Bind { .. })));

    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_port_is_a_config_error() {
    let public = public_dir();
    let config = Config {
        port: None,
        ..config("http://127.0.0.1:3000/", &public)
    };
    let dashboard = Dashboard::with_credentials(config, credentials()).unwrap();

    assert!(matches!(
        dashboard.start().await,
        Err(DashboardError::Config(_))
    ));
}

#[tokio::test]
async fn serves_pages_and_assets_concurrently() {
    let public = public_dir();
    let handle = start(0, &public).await.unwrap();
    let client = reqwest::Client::new();

    let mut requests = JoinSet::new();
    for i in 0..8 {
        let path = if i % 2 == 0 { "/" } else { "/css/site.css" };
        let request = client
            .get(format!("{}{}", handle.address, path))
            .basic_auth(USER, Some(PASSWORD));
        requests.spawn(async move {
            let response = request.send().await.unwrap();
            (path, response.status(), response.text().await.unwrap())
        });
    }

    while let Some(joined) = requests.join_next().await {
        let (path, status, body) = joined.unwrap();
        assert_eq!(status, reqwest::StatusCode::OK, "{}", path);
        if path == "/" {
            assert!(body.contains("Home page"));
        } else {
            assert_eq!(body, SITE_CSS);
        }
    }

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn unauthenticated_requests_over_tcp_are_challenged() {
    let public = public_dir();
    let handle = start(0, &public).await.unwrap();

    let response = reqwest::get(format!("{}/", handle.address)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_releases_the_port() {
    let public = public_dir();
    let handle = start(0, &public).await.unwrap();
    let port = handle.local_addr.port();

    handle.shutdown().await.unwrap();

    let again = start(port, &public).await.unwrap();
    again.shutdown().await.unwrap();
}
