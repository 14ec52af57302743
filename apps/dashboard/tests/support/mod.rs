//! Shared fixtures for the dashboard integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::panic)]

use a11y_dashboard::web::{Dashboard, RouteError};
use a11y_dashboard_core::{Config, CredentialStore, IssueType, WebserviceLocation};
use a11y_webservice_client::testing::{
    FakeWebservice, sample_issue, sample_result, sample_task,
};
use axum::http::HeaderValue;
use axum_test::TestServer;
use base64::{Engine, engine::general_purpose::STANDARD};
use tempfile::TempDir;
use tokio::sync::broadcast;

pub const USER: &str = "admin";
pub const PASSWORD: &str = "s3cret";
pub const SITE_CSS: &str = "body { color: #222; }\n";

/// `Authorization` value for the test user.
pub fn auth() -> HeaderValue {
    basic(USER, PASSWORD)
}

pub fn basic(user: &str, password: &str) -> HeaderValue {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
        .parse::<HeaderValue>()
        .unwrap()
}

pub fn credentials() -> CredentialStore {
    CredentialStore::from_pairs([(USER, PASSWORD)])
}

/// A public directory holding `css/site.css`.
pub fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), SITE_CSS).unwrap();
    dir
}

/// A fake webservice holding task `t1` with results `r1` (one error, one
/// notice) and `r2` (clean).
pub fn seeded_fake() -> FakeWebservice {
    let fake = FakeWebservice::new();
    fake.insert_task(sample_task("t1", "Home page", "https://www.example.com/"));
    fake.insert_result(sample_result(
        "r1",
        "t1",
        "2024-03-01T10:00:00Z",
        vec![
            sample_issue("WCAG2AA.H37", IssueType::Error, "Img element missing an alt attribute"),
            sample_issue("WCAG2AA.G18", IssueType::Notice, "Check the contrast"),
        ],
    ));
    fake.insert_result(sample_result("r2", "t1", "2024-03-02T10:00:00Z", Vec::new()));
    fake
}

/// Configuration pointing at `webservice` and serving `public`.
pub fn config(webservice: &str, public: &TempDir) -> Config {
    Config {
        webservice: Some(WebserviceLocation::Url(webservice.to_string())),
        public_dir: public.path().to_path_buf(),
        ..Config::default()
    }
}

/// An in-process dashboard backed by a seeded fake webservice.
pub struct Harness {
    pub server: TestServer,
    pub fake: FakeWebservice,
    pub errors: broadcast::Receiver<RouteError>,
    _public: TempDir,
}

impl Harness {
    /// Build a harness; `customize` adjusts the configuration first.
    pub async fn new(customize: impl FnOnce(Config) -> Config) -> Self {
        let fake = seeded_fake();
        let url = fake.spawn().await.unwrap();
        Self::with_webservice(fake, &url, customize)
    }

    /// Build a harness whose dashboard talks to `url`.
    pub fn with_webservice(
        fake: FakeWebservice,
        url: &str,
        customize: impl FnOnce(Config) -> Config,
    ) -> Self {
        let public = public_dir();
        let dashboard =
            Dashboard::with_credentials(customize(config(url, &public)), credentials()).unwrap();
        let errors = dashboard.route_errors();
        let server = TestServer::new(dashboard.router()).unwrap();
        Self {
            server,
            fake,
            errors,
            _public: public,
        }
    }
}
