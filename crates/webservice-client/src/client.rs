//! # Webservice HTTP Client
//!
//! Wrapper around the webservice REST API.
//!
//! ## Endpoints
//!
//! - `GET /tasks` - list tasks (`lastres=true` embeds the last result)
//! - `POST /tasks` - create a task
//! - `GET /tasks/{id}` - get a task
//! - `PATCH /tasks/{id}` - edit a task
//! - `DELETE /tasks/{id}` - delete a task
//! - `POST /tasks/{id}/run` - queue a run
//! - `GET /tasks/{id}/results` - list results
//! - `GET /tasks/{id}/results/{rid}` - get one result

use crate::error::{Result, WebserviceError};
use a11y_dashboard_core::primitives::WEBSERVICE_TIMEOUT_SECS;
use a11y_dashboard_core::{Task, TaskDraft, TaskEdit, TaskResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the webservice. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct WebserviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WebserviceClient {
    /// Create a client for the webservice at `base_url`.
    ///
    /// Fails if the URL does not parse or is not `http`/`https`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|e| WebserviceError::InvalidUrl(format!("{}: {}", raw, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(WebserviceError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                raw
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(WebserviceError::InvalidUrl(raw.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEBSERVICE_TIMEOUT_SECS))
            .build()
            .map_err(|e| WebserviceError::Request(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an endpoint URL. Each segment is percent-encoded, so ids taken
    /// from request paths cannot escape their position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| WebserviceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, url = %url, "webservice request");
        Ok(self.http.request(method, url))
    }

    /// Send a request and classify transport failures.
    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        req.send()
            .await
            .map_err(|e| classify_send_error(self.base_url.as_str(), &e))
    }

    /// Check the status code and decode the JSON body.
    async fn handle_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T> {
        let resp = check_status(resp).await?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| WebserviceError::Request(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| WebserviceError::Decode(e.to_string()))
    }

    /// Check the status code and discard the body.
    async fn handle_empty(&self, resp: Response) -> Result<()> {
        check_status(resp).await.map(|_| ())
    }

    // =========================================================================
    // TASKS
    // =========================================================================

    /// GET /tasks
    pub async fn tasks(&self, last_result: bool) -> Result<Vec<Task>> {
        let mut req = self.request(Method::GET, &["tasks"])?;
        if last_result {
            req = req.query(&[("lastres", "true")]);
        }
        let resp = self.send(req).await?;
        self.handle_json(resp).await
    }

    /// POST /tasks
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let req = self.request(Method::POST, &["tasks"])?.json(draft);
        let resp = self.send(req).await?;
        self.handle_json(resp).await
    }

    /// GET /tasks/{id}
    pub async fn task(&self, task_id: &str, last_result: bool) -> Result<Task> {
        let mut req = self.request(Method::GET, &["tasks", task_id])?;
        if last_result {
            req = req.query(&[("lastres", "true")]);
        }
        let resp = self.send(req).await?;
        self.handle_json(resp).await
    }

    /// PATCH /tasks/{id}
    pub async fn edit_task(&self, task_id: &str, edit: &TaskEdit) -> Result<()> {
        let req = self
            .request(Method::PATCH, &["tasks", task_id])?
            .json(edit);
        let resp = self.send(req).await?;
        self.handle_empty(resp).await
    }

    /// DELETE /tasks/{id}
    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let req = self.request(Method::DELETE, &["tasks", task_id])?;
        let resp = self.send(req).await?;
        self.handle_empty(resp).await
    }

    /// POST /tasks/{id}/run
    pub async fn run_task(&self, task_id: &str) -> Result<()> {
        let req = self.request(Method::POST, &["tasks", task_id, "run"])?;
        let resp = self.send(req).await?;
        self.handle_empty(resp).await
    }

    // =========================================================================
    // RESULTS
    // =========================================================================

    /// GET /tasks/{id}/results, newest first, counts only.
    pub async fn results(&self, task_id: &str) -> Result<Vec<TaskResult>> {
        let req = self.request(Method::GET, &["tasks", task_id, "results"])?;
        let resp = self.send(req).await?;
        self.handle_json(resp).await
    }

    /// GET /tasks/{id}/results/{rid}, always with issues.
    pub async fn result(&self, task_id: &str, result_id: &str) -> Result<TaskResult> {
        let req = self
            .request(Method::GET, &["tasks", task_id, "results", result_id])?
            .query(&[("full", "true")]);
        let resp = self.send(req).await?;
        self.handle_json(resp).await
    }
}

/// Map non-success statuses to error kinds.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);

    Err(match status {
        StatusCode::NOT_FOUND => WebserviceError::NotFound,
        StatusCode::BAD_REQUEST => WebserviceError::Invalid(message),
        _ => WebserviceError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

/// Pull `message` (or `error`) out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json["message"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn classify_send_error(base_url: &str, err: &reqwest::Error) -> WebserviceError {
    if err.is_connect() {
        if is_connection_refused(err) {
            WebserviceError::ConnectionRefused(base_url.to_string())
        } else {
            WebserviceError::Unreachable {
                url: base_url.to_string(),
                reason: err.to_string(),
            }
        }
    } else {
        WebserviceError::Request(err.to_string())
    }
}

/// Walk the source chain looking for an `ECONNREFUSED` I/O error.
fn is_connection_refused(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && io.kind() == std::io::ErrorKind::ConnectionRefused
        {
            return true;
        }
        current = e.source();
    }
    false
}
