//! # Fake Webservice
//!
//! An in-memory webservice speaking the same JSON API as the real one, served
//! by axum on a loopback port. Integration tests point a `WebserviceClient`
//! (or a whole dashboard) at it and inspect what was stored afterwards.
//!
//! ```ignore
//! let fake = FakeWebservice::new();
//! fake.insert_task(sample_task("t1", "Home", "https://example.com"));
//! let url = fake.spawn().await?;
//! ```

use a11y_dashboard_core::{
    Issue, IssueCounts, IssueType, Standard, Task, TaskDraft, TaskEdit, TaskResult,
};
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FakeState {
    next_id: u64,
    tasks: Vec<Task>,
    results: Vec<TaskResult>,
    runs: Vec<String>,
    failure: Option<StatusCode>,
}

impl FakeState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    /// Most recent result of a task, without issues.
    fn last_result(&self, task_id: &str) -> Option<TaskResult> {
        self.results
            .iter()
            .filter(|result| result.task == task_id)
            .max_by_key(|result| result.date)
            .map(summary)
    }

    fn with_last_result(&self, task: &Task, include: bool) -> Task {
        let mut task = task.clone();
        task.last_result = if include {
            self.last_result(&task.id)
        } else {
            None
        };
        task
    }
}

/// Shared handle to the fake's state. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct FakeWebservice {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWebservice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a task as-is.
    pub fn insert_task(&self, task: Task) {
        self.lock().tasks.push(task);
    }

    /// Store a result as-is.
    pub fn insert_result(&self, result: TaskResult) {
        self.lock().results.push(result);
    }

    /// Snapshot of every stored task.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    #[must_use]
    pub fn task(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    /// Task ids that were asked to run, in order.
    #[must_use]
    pub fn runs(&self) -> Vec<String> {
        self.lock().runs.clone()
    }

    /// Make every endpoint answer `status` (or behave normally again with `None`).
    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.lock().failure = status;
    }

    /// The axum router serving the fake API.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route(
                "/tasks/{task_id}",
                get(get_task).patch(edit_task).delete(delete_task),
            )
            .route("/tasks/{task_id}/run", post(run_task))
            .route("/tasks/{task_id}/results", get(list_results))
            .route("/tasks/{task_id}/results/{result_id}", get(get_result))
            .layer(middleware::from_fn_with_state(self.clone(), inject_failure))
            .with_state(self.clone())
    }

    /// Serve the fake on an ephemeral loopback port and return its base URL.
    pub async fn spawn(&self) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("fake webservice stopped: {}", e);
            }
        });
        Ok(format!("http://{}/", addr))
    }
}

/// A loopback URL with nothing listening on it, for connection-refused tests.
pub fn unused_local_url() -> std::io::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/", addr))
}

/// A task with defaults for every optional field.
#[must_use]
pub fn sample_task(id: &str, name: &str, url: &str) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        standard: Standard::Wcag2AA,
        ignore: Vec::new(),
        timeout: None,
        wait: None,
        actions: Vec::new(),
        username: None,
        password: None,
        headers: BTreeMap::new(),
        hide_elements: None,
        last_result: None,
    }
}

/// A result with the given issues and matching counts.
#[must_use]
pub fn sample_result(id: &str, task_id: &str, date: &str, issues: Vec<Issue>) -> TaskResult {
    let count_of = |kind: IssueType| {
        issues.iter().filter(|issue| issue.kind == kind).count() as u64
    };
    let count = IssueCounts {
        total: issues.len() as u64,
        error: count_of(IssueType::Error),
        warning: count_of(IssueType::Warning),
        notice: count_of(IssueType::Notice),
    };
    TaskResult {
        id: id.to_string(),
        task: task_id.to_string(),
        date: date.parse().unwrap_or_default(),
        count,
        ignore: Vec::new(),
        results: Some(issues),
    }
}

/// An issue with a context snippet and selector.
#[must_use]
pub fn sample_issue(code: &str, kind: IssueType, message: &str) -> Issue {
    Issue {
        code: code.to_string(),
        kind,
        message: message.to_string(),
        context: Some("<img src=\"logo.png\">".to_string()),
        selector: Some("html > body > img".to_string()),
        runner: None,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct Flags {
    #[serde(default)]
    lastres: bool,
    #[serde(default)]
    full: bool,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "statusCode": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message,
    });
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    error_body(StatusCode::NOT_FOUND, "Not Found")
}

fn summary(result: &TaskResult) -> TaskResult {
    TaskResult {
        results: None,
        ..result.clone()
    }
}

async fn inject_failure(State(fake): State<FakeWebservice>, req: Request, next: Next) -> Response {
    let failure = fake.lock().failure;
    match failure {
        Some(status) => error_body(status, "Injected failure"),
        None => next.run(req).await,
    }
}

async fn list_tasks(State(fake): State<FakeWebservice>, Query(flags): Query<Flags>) -> Response {
    let state = fake.lock();
    let tasks: Vec<Task> = state
        .tasks
        .iter()
        .map(|task| state.with_last_result(task, flags.lastres))
        .collect();
    Json(tasks).into_response()
}

async fn create_task(State(fake): State<FakeWebservice>, Json(body): Json<Value>) -> Response {
    for field in ["name", "url"] {
        let present = body[field].as_str().is_some_and(|value| !value.trim().is_empty());
        if !present {
            return error_body(
                StatusCode::BAD_REQUEST,
                &format!("\"{}\" is required", field),
            );
        }
    }
    let draft: TaskDraft = match serde_json::from_value(body) {
        Ok(draft) => draft,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let mut state = fake.lock();
    let task = Task {
        id: state.allocate_id(),
        name: draft.name,
        url: draft.url,
        standard: draft.standard,
        ignore: draft.ignore,
        timeout: draft.timeout,
        wait: draft.wait,
        actions: draft.actions,
        username: draft.username,
        password: draft.password,
        headers: draft.headers,
        hide_elements: draft.hide_elements,
        last_result: None,
    };
    state.tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn get_task(
    State(fake): State<FakeWebservice>,
    Path(task_id): Path<String>,
    Query(flags): Query<Flags>,
) -> Response {
    let state = fake.lock();
    match state.tasks.iter().find(|task| task.id == task_id) {
        Some(task) => Json(state.with_last_result(task, flags.lastres)).into_response(),
        None => not_found(),
    }
}

async fn edit_task(
    State(fake): State<FakeWebservice>,
    Path(task_id): Path<String>,
    Json(edit): Json<TaskEdit>,
) -> Response {
    let mut state = fake.lock();
    let Some(task) = state.tasks.iter_mut().find(|task| task.id == task_id) else {
        return not_found();
    };

    if let Some(name) = edit.name {
        task.name = name;
    }
    if let Some(ignore) = edit.ignore {
        task.ignore = ignore;
    }
    if edit.timeout.is_some() {
        task.timeout = edit.timeout;
    }
    if edit.wait.is_some() {
        task.wait = edit.wait;
    }
    if let Some(actions) = edit.actions {
        task.actions = actions;
    }
    if edit.username.is_some() {
        task.username = edit.username;
    }
    if edit.password.is_some() {
        task.password = edit.password;
    }
    if let Some(headers) = edit.headers {
        task.headers = headers;
    }
    if edit.hide_elements.is_some() {
        task.hide_elements = edit.hide_elements;
    }

    StatusCode::NO_CONTENT.into_response()
}

async fn delete_task(State(fake): State<FakeWebservice>, Path(task_id): Path<String>) -> Response {
    let mut state = fake.lock();
    let before = state.tasks.len();
    state.tasks.retain(|task| task.id != task_id);
    if state.tasks.len() == before {
        return not_found();
    }
    state.results.retain(|result| result.task != task_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn run_task(State(fake): State<FakeWebservice>, Path(task_id): Path<String>) -> Response {
    let mut state = fake.lock();
    if !state.tasks.iter().any(|task| task.id == task_id) {
        return not_found();
    }
    state.runs.push(task_id);
    StatusCode::ACCEPTED.into_response()
}

async fn list_results(
    State(fake): State<FakeWebservice>,
    Path(task_id): Path<String>,
    Query(flags): Query<Flags>,
) -> Response {
    let state = fake.lock();
    if !state.tasks.iter().any(|task| task.id == task_id) {
        return not_found();
    }
    let mut results: Vec<TaskResult> = state
        .results
        .iter()
        .filter(|result| result.task == task_id)
        .map(|result| if flags.full { result.clone() } else { summary(result) })
        .collect();
    results.sort_by(|a, b| b.date.cmp(&a.date));
    Json(results).into_response()
}

async fn get_result(
    State(fake): State<FakeWebservice>,
    Path((task_id, result_id)): Path<(String, String)>,
    Query(flags): Query<Flags>,
) -> Response {
    let state = fake.lock();
    match state
        .results
        .iter()
        .find(|result| result.task == task_id && result.id == result_id)
    {
        Some(result) if flags.full => Json(result.clone()).into_response(),
        Some(result) => Json(summary(result)).into_response(),
        None => not_found(),
    }
}
