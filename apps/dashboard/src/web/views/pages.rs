//! Page bodies.

use super::{Flash, flash_banner, format_date, format_date_time, layout};
use crate::web::locals::{PageContext, RequestLocals, SiteLocals};
use a11y_dashboard_core::text::{capitalize, pluralize, simplify_url};
use a11y_dashboard_core::types::headers_to_text;
use a11y_dashboard_core::{Issue, IssueCounts, IssueType, Standard, Task, TaskResult};
use html_escape::{encode_double_quoted_attribute, encode_text};

// =============================================================================
// SHARED FRAGMENTS
// =============================================================================

fn counts_summary(counts: &IssueCounts) -> String {
    IssueType::ALL
        .into_iter()
        .map(|kind| {
            format!(
                r#"<span class="count count-{}">{}</span>"#,
                kind.as_str(),
                encode_text(&pluralize(counts.of(kind), kind.as_str()))
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn task_heading(task: &Task) -> String {
    format!(
        r#"<h1>{name}</h1>
<p class="task-url"><a href="{url}">{simple}</a> &middot; {standard}</p>"#,
        name = encode_text(&task.name),
        url = encode_double_quoted_attribute(&task.url),
        simple = encode_text(simplify_url(&task.url)),
        standard = encode_text(task.standard.label()),
    )
}

// =============================================================================
// INDEX
// =============================================================================

/// Task list with each task's most recent result.
pub fn index_page(ctx: &PageContext, tasks: &[Task], flash: Option<Flash>) -> String {
    let mut content = flash_banner(flash);
    content.push_str("<h1>Tasks</h1>\n");

    if tasks.is_empty() {
        content.push_str(r#"<p class="empty">There are no URLs being tested yet.</p>"#);
    } else {
        content.push_str(r#"<ul class="task-list">"#);
        for task in tasks {
            let last = match &task.last_result {
                Some(result) => format!(
                    r#"{} <span class="date">{}</span>"#,
                    counts_summary(&result.count),
                    encode_text(&format_date(&result.date))
                ),
                None => r#"<span class="no-results">No results yet</span>"#.to_string(),
            };
            content.push_str(&format!(
                r#"
    <li class="task">
        <a href="/{id}"><strong>{name}</strong></a>
        <span class="url">{url}</span>
        <span class="standard">{standard}</span>
        {last}
    </li>"#,
                id = encode_double_quoted_attribute(&task.id),
                name = encode_text(&task.name),
                url = encode_text(simplify_url(&task.url)),
                standard = encode_text(task.standard.as_str()),
                last = last,
            ));
        }
        content.push_str("\n</ul>");
    }

    layout(&ctx.site, &ctx.request, "Dashboard", &content)
}

// =============================================================================
// TASK
// =============================================================================

/// Task detail with result history and ignored rules.
pub fn task_page(
    ctx: &PageContext,
    task: &Task,
    results: &[TaskResult],
    flash: Option<Flash>,
) -> String {
    let readonly = ctx.site.readonly;
    let id = encode_double_quoted_attribute(&task.id);
    let mut content = flash_banner(flash);
    content.push_str(&task_heading(task));

    if !readonly {
        content.push_str(&format!(
            r#"
<p class="task-actions">
    <a href="/{id}/run">Run now</a>
    <a href="/{id}/edit">Edit</a>
    <a href="/{id}/delete">Delete</a>
</p>"#
        ));
    }

    content.push_str("\n<h2>Results</h2>\n");
    if results.is_empty() {
        content.push_str(r#"<p class="empty">This URL has not been tested yet.</p>"#);
    } else {
        content.push_str(
            r#"<table class="results">
<thead><tr><th>Date</th><th>Errors</th><th>Warnings</th><th>Notices</th></tr></thead>
<tbody>"#,
        );
        for result in results {
            content.push_str(&format!(
                r#"
<tr><td><a href="/{id}/{rid}">{date}</a></td><td>{error}</td><td>{warning}</td><td>{notice}</td></tr>"#,
                id = id,
                rid = encode_double_quoted_attribute(&result.id),
                date = encode_text(&format_date_time(&result.date)),
                error = result.count.error,
                warning = result.count.warning,
                notice = result.count.notice,
            ));
        }
        content.push_str("\n</tbody>\n</table>");
    }

    if !task.ignore.is_empty() {
        content.push_str("\n<h2>Ignored rules</h2>\n<ul class=\"ignored\">");
        for rule in &task.ignore {
            let button = if readonly {
                String::new()
            } else {
                format!(
                    r#"
        <form method="post" action="/{id}/unignore"><input type="hidden" name="rule" value="{rule}"><button type="submit">Stop ignoring</button></form>"#,
                    id = id,
                    rule = encode_double_quoted_attribute(rule),
                )
            };
            content.push_str(&format!(
                "\n    <li><code>{}</code>{}</li>",
                encode_text(rule),
                button
            ));
        }
        content.push_str("\n</ul>");
    }

    layout(&ctx.site, &ctx.request, &task.name, &content)
}

// =============================================================================
// RESULT
// =============================================================================

fn issue_item(task: &Task, issue: &Issue, readonly: bool) -> String {
    let context = issue
        .context
        .as_deref()
        .map(|context| format!("\n        <pre><code>{}</code></pre>", encode_text(context)))
        .unwrap_or_default();
    let selector = issue
        .selector
        .as_deref()
        .map(|selector| {
            format!(
                "\n        <p class=\"selector\"><code>{}</code></p>",
                encode_text(selector)
            )
        })
        .unwrap_or_default();
    let ignore = if readonly || task.ignores(&issue.code) {
        String::new()
    } else {
        format!(
            r#"
        <form method="post" action="/{id}/ignore"><input type="hidden" name="rule" value="{code}"><button type="submit">Ignore this rule</button></form>"#,
            id = encode_double_quoted_attribute(&task.id),
            code = encode_double_quoted_attribute(&issue.code),
        )
    };

    format!(
        r#"
    <li class="issue issue-{kind}">
        <h3>{message}</h3>
        <p class="code"><code>{code}</code></p>{context}{selector}{ignore}
    </li>"#,
        kind = issue.kind.as_str(),
        message = encode_text(&issue.message),
        code = encode_text(&issue.code),
        context = context,
        selector = selector,
        ignore = ignore,
    )
}

/// One result with its issues grouped by type.
pub fn result_page(ctx: &PageContext, task: &Task, result: &TaskResult) -> String {
    let mut content = task_heading(task);
    content.push_str(&format!(
        r#"
<p class="result-date">Tested {date}</p>
<p class="result-counts">{counts}</p>
<p class="downloads">Download: <a href="/{id}/{rid}/download/csv">CSV</a> <a href="/{id}/{rid}/download/json">JSON</a></p>"#,
        date = encode_text(&format_date_time(&result.date)),
        counts = counts_summary(&result.count),
        id = encode_double_quoted_attribute(&task.id),
        rid = encode_double_quoted_attribute(&result.id),
    ));

    for kind in IssueType::ALL {
        let items: Vec<String> = result
            .issues_of(kind)
            .map(|issue| issue_item(task, issue, ctx.site.readonly))
            .collect();
        content.push_str(&format!(
            "\n<h2>{} ({})</h2>",
            encode_text(&capitalize(kind.as_str())),
            items.len()
        ));
        if items.is_empty() {
            content.push_str(&format!(
                "\n<p class=\"empty\">No {}s.</p>",
                kind.as_str()
            ));
        } else {
            content.push_str(&format!(
                "\n<ul class=\"issues\">{}\n</ul>",
                items.concat()
            ));
        }
    }

    let title = format!("{} - {}", task.name, format_date(&result.date));
    layout(&ctx.site, &ctx.request, &title, &content)
}

// =============================================================================
// TASK FORM
// =============================================================================

/// Which form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFormMode<'a> {
    New,
    Edit { task_id: &'a str },
}

/// Field values shown in the task form, as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFormValues {
    pub name: String,
    pub url: String,
    pub standard: Standard,
    pub ignore: String,
    pub timeout: String,
    pub wait: String,
    pub actions: String,
    pub username: String,
    pub password: String,
    pub headers: String,
    pub hide_elements: String,
    pub comment: String,
}

impl TaskFormValues {
    /// Prefill from a stored task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            url: task.url.clone(),
            standard: task.standard,
            ignore: task.ignore.join("\n"),
            timeout: task.timeout.map(|t| t.to_string()).unwrap_or_default(),
            wait: task.wait.map(|w| w.to_string()).unwrap_or_default(),
            actions: task.actions.join("\n"),
            username: task.username.clone().unwrap_or_default(),
            password: task.password.clone().unwrap_or_default(),
            headers: headers_to_text(&task.headers),
            hide_elements: task.hide_elements.clone().unwrap_or_default(),
            comment: String::new(),
        }
    }
}

fn text_field(name: &str, label: &str, value: &str, extra: &str) -> String {
    format!(
        r#"
    <p><label for="{name}">{label}</label>
    <input type="text" id="{name}" name="{name}" value="{value}"{extra}></p>"#,
        name = name,
        label = encode_text(label),
        value = encode_double_quoted_attribute(value),
        extra = extra,
    )
}

fn textarea(name: &str, label: &str, value: &str, hint: &str) -> String {
    format!(
        r#"
    <p><label for="{name}">{label}</label> <small>{hint}</small>
    <textarea id="{name}" name="{name}" rows="4">{value}</textarea></p>"#,
        name = name,
        label = encode_text(label),
        hint = encode_text(hint),
        value = encode_text(value),
    )
}

/// Create or edit form. `error` is shown above the fields when a submission
/// was rejected.
pub fn task_form_page(
    ctx: &PageContext,
    mode: TaskFormMode<'_>,
    values: &TaskFormValues,
    error: Option<&str>,
) -> String {
    let (title, action, submit) = match mode {
        TaskFormMode::New => ("Add a new URL".to_string(), "/new".to_string(), "Add URL"),
        TaskFormMode::Edit { task_id } => (
            format!("Edit {}", values.name),
            format!("/{}/edit", encode_double_quoted_attribute(task_id)),
            "Save changes",
        ),
    };
    let editing = matches!(mode, TaskFormMode::Edit { .. });
    let locked = if editing { " disabled" } else { "" };

    let mut content = format!("<h1>{}</h1>\n", encode_text(&title));
    if let Some(error) = error {
        content.push_str(&format!(
            "<p class=\"form-error\" role=\"alert\">{}</p>\n",
            encode_text(error)
        ));
    }

    let standards: String = Standard::ALL
        .into_iter()
        .map(|standard| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = standard.as_str(),
                selected = if standard == values.standard { " selected" } else { "" },
                label = encode_text(standard.label()),
            )
        })
        .collect();

    content.push_str(&format!(r#"<form method="post" action="{}">"#, action));
    content.push_str(&text_field("name", "Name", &values.name, " required"));
    content.push_str(&text_field("url", "URL", &values.url, locked));
    content.push_str(&format!(
        r#"
    <p><label for="standard">Standard</label>
    <select id="standard" name="standard"{locked}>{standards}</select></p>"#
    ));
    content.push_str(&text_field("timeout", "Timeout (ms)", &values.timeout, ""));
    content.push_str(&text_field("wait", "Wait (ms)", &values.wait, ""));
    content.push_str(&text_field("username", "Username", &values.username, ""));
    content.push_str(&text_field("password", "Password", &values.password, ""));
    content.push_str(&text_field(
        "hideElements",
        "Hide elements (CSS selector)",
        &values.hide_elements,
        "",
    ));
    content.push_str(&textarea(
        "ignore",
        "Ignore rules",
        &values.ignore,
        "One rule code per line",
    ));
    content.push_str(&textarea(
        "actions",
        "Actions",
        &values.actions,
        "One action per line, run before testing",
    ));
    content.push_str(&textarea(
        "headers",
        "Headers",
        &values.headers,
        "One 'Name: value' per line",
    ));
    if editing {
        content.push_str(&text_field("comment", "Comment", &values.comment, ""));
    }
    content.push_str(&format!(
        "\n    <p><button type=\"submit\">{}</button></p>\n</form>",
        submit
    ));

    layout(&ctx.site, &ctx.request, &title, &content)
}

// =============================================================================
// DELETE
// =============================================================================

/// Confirmation before deleting a task and all of its results.
pub fn delete_page(ctx: &PageContext, task: &Task) -> String {
    let content = format!(
        r#"{heading}
<p>Deleting this URL removes all of its results. This cannot be undone.</p>
<form method="post" action="/{id}/delete">
    <button type="submit">Delete</button>
    <a href="/{id}">Cancel</a>
</form>"#,
        heading = task_heading(task),
        id = encode_double_quoted_attribute(&task.id),
    );
    layout(
        &ctx.site,
        &ctx.request,
        &format!("Delete {}", task.name),
        &content,
    )
}

// =============================================================================
// ERROR PAGES
// =============================================================================

pub fn not_found_page(site: &SiteLocals, request: &RequestLocals) -> String {
    layout(
        site,
        request,
        "Page not found",
        r#"<h1>Page not found</h1>
<p>Sorry, the page you were looking for does not exist. <a href="/">Back to the dashboard</a>.</p>"#,
    )
}

/// 500 page. `detail` is only passed outside production.
pub fn error_page(site: &SiteLocals, request: &RequestLocals, detail: Option<&str>) -> String {
    let detail = detail
        .map(|detail| format!("\n<pre class=\"error-detail\">{}</pre>", encode_text(detail)))
        .unwrap_or_default();
    let content = format!(
        r#"<h1>Error</h1>
<p>Sorry, something went wrong while loading this page.</p>{}"#,
        detail
    );
    layout(site, request, "Error", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn ctx(readonly: bool) -> PageContext {
        PageContext {
            site: Arc::new(SiteLocals {
                lang: "en",
                year: 2024,
                version: "1.0.0",
                repository: "https://example.com/repo",
                bugtracker: "https://example.com/repo/issues".to_string(),
                noindex: false,
                readonly,
                site_message: None,
            }),
            request: RequestLocals::default(),
        }
    }

    fn task() -> Task {
        Task {
            id: "t1".to_string(),
            name: "Home <page>".to_string(),
            url: "https://www.example.com/".to_string(),
            standard: Standard::Wcag2AA,
            ignore: vec!["rule-a".to_string()],
            timeout: Some(3000),
            wait: None,
            actions: vec!["click #go".to_string()],
            username: None,
            password: None,
            headers: BTreeMap::from([("Cookie".to_string(), "a=b".to_string())]),
            hide_elements: None,
            last_result: None,
        }
    }

    #[test]
    fn task_page_hides_mutations_when_readonly() {
        let writable = task_page(&ctx(false), &task(), &[], None);
        assert!(writable.contains(r#"href="/t1/edit""#));
        assert!(writable.contains(r#"action="/t1/unignore""#));

        let readonly = task_page(&ctx(true), &task(), &[], None);
        assert!(!readonly.contains(r#"href="/t1/edit""#));
        assert!(!readonly.contains("unignore"));
        assert!(readonly.contains("Home &lt;page&gt;"));
    }

    #[test]
    fn form_values_prefill_from_task() {
        let values = TaskFormValues::from_task(&task());
        assert_eq!(values.timeout, "3000");
        assert_eq!(values.actions, "click #go");
        assert_eq!(values.headers, "Cookie: a=b");

        let html = task_form_page(
            &ctx(false),
            TaskFormMode::Edit { task_id: "t1" },
            &values,
            Some("Nope"),
        );
        assert!(html.contains(r#"action="/t1/edit""#));
        assert!(html.contains("Nope"));
        assert!(html.contains(r#"<option value="WCAG2AA" selected>"#));
    }

    #[test]
    fn error_page_detail_is_optional() {
        let site = ctx(false).site;
        let request = RequestLocals::default();
        assert!(error_page(&site, &request, Some("boom")).contains("boom"));
        assert!(!error_page(&site, &request, None).contains("error-detail"));
    }
}
