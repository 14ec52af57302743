//! # a11y-webservice-client
//!
//! Async HTTP client for the accessibility webservice, the backend that owns
//! tasks and results. The dashboard never stores anything itself; every page
//! is a view over calls made through `WebserviceClient`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), a11y_webservice_client::WebserviceError> {
//! let client = a11y_webservice_client::WebserviceClient::new("http://localhost:3000/")?;
//! let tasks = client.tasks(true).await?;
//! # let _ = tasks;
//! # Ok(())
//! # }
//! ```
//!
//! With the `testing` feature the crate also ships `testing::FakeWebservice`,
//! an in-memory stand-in served over real HTTP.

pub mod client;
pub mod error;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::WebserviceClient;
pub use error::{Result, WebserviceError};
