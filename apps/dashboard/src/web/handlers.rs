//! # Route Handlers
//!
//! Every handler is a thin view over webservice calls: fetch, render or
//! redirect. Errors propagate as `PageError` and are rendered by the
//! error-pages middleware.

use super::AppState;
use super::errors::{PageError, RouteError};
use super::form::FormData;
use super::locals::PageContext;
use super::path::PagePath;
use super::views::{self, Flash, TaskFormMode, TaskFormValues};
use a11y_dashboard_core::download::file_name;
use a11y_dashboard_core::types::{parse_headers, parse_lines};
use a11y_dashboard_core::{DashboardError, DownloadFormat, Standard, TaskDraft, TaskEdit};
use a11y_webservice_client::WebserviceError;
use axum::{
    extract::{RawQuery, State},
    http::{HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::collections::BTreeMap;

type PageResult = Result<Response, PageError>;

// =============================================================================
// READ ROUTES
// =============================================================================

/// GET /
pub async fn index_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    RawQuery(query): RawQuery,
) -> PageResult {
    let tasks = state.client.tasks(true).await?;
    let flash = Flash::from_query(query.as_deref());
    Ok(Html(views::index_page(&ctx, &tasks, flash)).into_response())
}

/// GET /{task_id}
pub async fn task_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    PagePath(task_id): PagePath<String>,
    RawQuery(query): RawQuery,
) -> PageResult {
    let task = state.client.task(&task_id, true).await?;
    let results = state.client.results(&task_id).await?;
    let flash = Flash::from_query(query.as_deref());
    Ok(Html(views::task_page(&ctx, &task, &results, flash)).into_response())
}

/// GET /{task_id}/{result_id}
pub async fn result_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    PagePath((task_id, result_id)): PagePath<(String, String)>,
) -> PageResult {
    let task = state.client.task(&task_id, false).await?;
    let result = state.client.result(&task_id, &result_id).await?;
    Ok(Html(views::result_page(&ctx, &task, &result)).into_response())
}

/// GET /{task_id}/{result_id}/download/{format}
pub async fn download_handler(
    State(state): State<AppState>,
    PagePath((task_id, result_id, format)): PagePath<(String, String, String)>,
) -> PageResult {
    let format: DownloadFormat = format.parse().map_err(|_| PageError::NotFound)?;
    let task = state.client.task(&task_id, false).await?;
    let result = state.client.result(&task_id, &result_id).await?;

    let body = format
        .render(&result)
        .map_err(|e| RouteError::Render(e.to_string()))?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_name(&task, &result, format)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| RouteError::Render(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// =============================================================================
// TASK FORMS
// =============================================================================

/// Field values echoed back into the form after a rejected submission.
fn form_values(form: &FormData) -> TaskFormValues {
    let mut headers = form.list("headers");
    headers.extend(
        form.map("headers")
            .into_iter()
            .map(|(name, value)| format!("{}: {}", name, value)),
    );

    TaskFormValues {
        name: form.text("name"),
        url: form.text("url"),
        standard: form
            .get("standard")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        ignore: lines_of(form, "ignore").join("\n"),
        timeout: form.text("timeout"),
        wait: form.text("wait"),
        actions: lines_of(form, "actions").join("\n"),
        username: form.text("username"),
        password: form.text("password"),
        headers: headers.join("\n"),
        hide_elements: form.text("hideElements"),
        comment: form.text("comment"),
    }
}

/// Textarea lines and `key[]` entries, flattened.
fn lines_of(form: &FormData, key: &str) -> Vec<String> {
    form.list(key)
        .iter()
        .flat_map(|value| parse_lines(value))
        .collect()
}

/// `headers` textarea lines merged with `headers[Name]` entries.
fn headers_of(form: &FormData) -> Result<BTreeMap<String, String>, DashboardError> {
    let mut headers = BTreeMap::new();
    for text in form.list("headers") {
        headers.extend(parse_headers(&text)?);
    }
    headers.extend(form.map("headers"));
    Ok(headers)
}

fn draft_from_form(form: &FormData) -> Result<TaskDraft, DashboardError> {
    let standard = match form.optional_text("standard") {
        Some(value) => value.parse()?,
        None => Standard::default(),
    };
    let draft = TaskDraft {
        name: form.text("name"),
        url: form.text("url"),
        standard,
        ignore: lines_of(form, "ignore"),
        timeout: form.optional_u64("timeout", "Timeout")?,
        wait: form.optional_u64("wait", "Wait")?,
        actions: lines_of(form, "actions"),
        username: form.optional_text("username"),
        password: form.optional_text("password"),
        headers: headers_of(form)?,
        hide_elements: form.optional_text("hideElements"),
    };
    draft.validate()?;
    Ok(draft)
}

fn edit_from_form(form: &FormData) -> Result<TaskEdit, DashboardError> {
    let edit = TaskEdit {
        name: Some(form.text("name")),
        ignore: Some(lines_of(form, "ignore")),
        timeout: form.optional_u64("timeout", "Timeout")?,
        wait: form.optional_u64("wait", "Wait")?,
        actions: Some(lines_of(form, "actions")),
        username: form.optional_text("username"),
        password: form.optional_text("password"),
        headers: Some(headers_of(form)?),
        hide_elements: form.optional_text("hideElements"),
        comment: form.optional_text("comment"),
    };
    edit.validate()?;
    Ok(edit)
}

fn redirect_to_task(task_id: &str, flash: Flash) -> Response {
    Redirect::to(&format!("/{}?{}", task_id, flash.flag())).into_response()
}

/// GET /new
pub async fn new_form_handler(ctx: PageContext) -> Html<String> {
    Html(views::task_form_page(
        &ctx,
        TaskFormMode::New,
        &TaskFormValues::default(),
        None,
    ))
}

/// POST /new
pub async fn create_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    form: FormData,
) -> PageResult {
    let rejected = |message: &str| {
        Html(views::task_form_page(
            &ctx,
            TaskFormMode::New,
            &form_values(&form),
            Some(message),
        ))
        .into_response()
    };

    let draft = match draft_from_form(&form) {
        Ok(draft) => draft,
        Err(e) => return Ok(rejected(&e.to_string())),
    };

    match state.client.create_task(&draft).await {
        Ok(task) => {
            tracing::info!(task = %task.id, url = %task.url, "Task created");
            Ok(redirect_to_task(&task.id, Flash::Added))
        }
        Err(WebserviceError::Invalid(message)) => Ok(rejected(&message)),
        Err(e) => Err(e.into()),
    }
}

/// GET /{task_id}/edit
pub async fn edit_form_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    PagePath(task_id): PagePath<String>,
) -> PageResult {
    let task = state.client.task(&task_id, false).await?;
    Ok(Html(views::task_form_page(
        &ctx,
        TaskFormMode::Edit { task_id: &task.id },
        &TaskFormValues::from_task(&task),
        None,
    ))
    .into_response())
}

/// POST /{task_id}/edit
pub async fn edit_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    PagePath(task_id): PagePath<String>,
    form: FormData,
) -> PageResult {
    let task = state.client.task(&task_id, false).await?;
    let rejected = |message: &str| {
        let mut values = form_values(&form);
        values.url.clone_from(&task.url);
        values.standard = task.standard;
        Html(views::task_form_page(
            &ctx,
            TaskFormMode::Edit { task_id: &task.id },
            &values,
            Some(message),
        ))
        .into_response()
    };

    let edit = match edit_from_form(&form) {
        Ok(edit) => edit,
        Err(e) => return Ok(rejected(&e.to_string())),
    };

    match state.client.edit_task(&task.id, &edit).await {
        Ok(()) => {
            tracing::info!(task = %task.id, "Task edited");
            Ok(redirect_to_task(&task.id, Flash::Edited))
        }
        Err(WebserviceError::Invalid(message)) => Ok(rejected(&message)),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// TASK ACTIONS
// =============================================================================

/// GET /{task_id}/delete
pub async fn delete_confirm_handler(
    State(state): State<AppState>,
    ctx: PageContext,
    PagePath(task_id): PagePath<String>,
) -> PageResult {
    let task = state.client.task(&task_id, false).await?;
    Ok(Html(views::delete_page(&ctx, &task)).into_response())
}

/// POST /{task_id}/delete
pub async fn delete_handler(
    State(state): State<AppState>,
    PagePath(task_id): PagePath<String>,
) -> PageResult {
    state.client.delete_task(&task_id).await?;
    tracing::info!(task = %task_id, "Task deleted");
    Ok(Redirect::to(&format!("/?{}", Flash::Deleted.flag())).into_response())
}

/// GET /{task_id}/run
pub async fn run_handler(
    State(state): State<AppState>,
    PagePath(task_id): PagePath<String>,
) -> PageResult {
    state.client.run_task(&task_id).await?;
    tracing::info!(task = %task_id, "Task run requested");
    Ok(redirect_to_task(&task_id, Flash::Running))
}

fn rule_of(form: &FormData) -> Result<String, PageError> {
    form.optional_text("rule")
        .ok_or_else(|| PageError::Server(RouteError::Form("missing field `rule`".to_string())))
}

/// POST /{task_id}/ignore
pub async fn ignore_handler(
    State(state): State<AppState>,
    PagePath(task_id): PagePath<String>,
    form: FormData,
) -> PageResult {
    let rule = rule_of(&form)?;
    let task = state.client.task(&task_id, false).await?;
    state
        .client
        .edit_task(&task.id, &TaskEdit::ignore(task.ignore_with(&rule)))
        .await?;
    tracing::info!(task = %task.id, rule = %rule, "Rule ignored");
    Ok(redirect_to_task(&task.id, Flash::RuleIgnored))
}

/// POST /{task_id}/unignore
pub async fn unignore_handler(
    State(state): State<AppState>,
    PagePath(task_id): PagePath<String>,
    form: FormData,
) -> PageResult {
    let rule = rule_of(&form)?;
    let task = state.client.task(&task_id, false).await?;
    state
        .client
        .edit_task(&task.id, &TaskEdit::ignore(task.ignore_without(&rule)))
        .await?;
    tracing::info!(task = %task.id, rule = %rule, "Rule unignored");
    Ok(redirect_to_task(&task.id, Flash::RuleUnignored))
}

// =============================================================================
// FALLBACKS
// =============================================================================

/// Wrong method on a known path, or no route and no file at all.
pub async fn not_found_handler() -> PageError {
    PageError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn draft_collects_every_field() {
        let data = form(&[
            ("name", " Home "),
            ("url", "https://example.com"),
            ("standard", "WCAG2AAA"),
            ("ignore", "rule-a\n\nrule-b"),
            ("timeout", "5000"),
            ("wait", ""),
            ("actions[]", "click #a"),
            ("actions[]", "wait for url to be /done"),
            ("headers", "Cookie: a=b"),
            ("headers[X-Test]", "1"),
            ("hideElements", ".ads"),
        ]);
        let draft = draft_from_form(&data).expect("valid draft");
        assert_eq!(draft.name, "Home");
        assert_eq!(draft.standard, Standard::Wcag2AAA);
        assert_eq!(draft.ignore, vec!["rule-a", "rule-b"]);
        assert_eq!(draft.timeout, Some(5000));
        assert_eq!(draft.wait, None);
        assert_eq!(draft.actions.len(), 2);
        assert_eq!(draft.headers.len(), 2);
        assert_eq!(draft.hide_elements.as_deref(), Some(".ads"));
    }

    #[test]
    fn draft_rejects_bad_input() {
        assert!(draft_from_form(&form(&[("url", "https://example.com")])).is_err());
        let bad_standard = form(&[("name", "A"), ("url", "https://e.com"), ("standard", "X")]);
        assert!(draft_from_form(&bad_standard).is_err());
        let bad_timeout = form(&[("name", "A"), ("url", "https://e.com"), ("timeout", "-1")]);
        assert!(draft_from_form(&bad_timeout).is_err());
    }

    #[test]
    fn edit_always_sends_lists() {
        let edit = edit_from_form(&form(&[("name", "Renamed")])).expect("valid edit");
        assert_eq!(edit.name.as_deref(), Some("Renamed"));
        assert_eq!(edit.ignore, Some(Vec::new()));
        assert_eq!(edit.comment, None);
        assert!(edit_from_form(&form(&[("name", " ")])).is_err());
    }

    #[test]
    fn rejected_form_echoes_values() {
        let values = form_values(&form(&[
            ("name", "Home"),
            ("standard", "WCAG2A"),
            ("headers[Cookie]", "a=b"),
        ]));
        assert_eq!(values.name, "Home");
        assert_eq!(values.standard, Standard::Wcag2A);
        assert_eq!(values.headers, "Cookie: a=b");
    }
}
