//! # Views
//!
//! Server-rendered HTML. Every page is a plain function returning a `String`
//! wrapped in the shared `layout`. Interpolated values are encoded with
//! `html_escape`: `encode_text` in element content,
//! `encode_double_quoted_attribute` inside `"..."` attributes.

mod pages;

pub use pages::{
    TaskFormMode, TaskFormValues, delete_page, error_page, index_page, not_found_page,
    result_page, task_form_page, task_page,
};

use super::locals::{RequestLocals, SiteLocals};
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

// =============================================================================
// HELPERS
// =============================================================================

/// `1 Mar 2024`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y").to_string()
}

/// `1 Mar 2024, 10:05`
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%-d %b %Y, %H:%M").to_string()
}

// =============================================================================
// FLASH MESSAGES
// =============================================================================

/// Confirmation shown after a redirect, selected by a bare query flag
/// (`/?deleted`, `/{task_id}?added`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Added,
    Edited,
    Running,
    RuleIgnored,
    RuleUnignored,
    Deleted,
}

impl Flash {
    const ALL: [Self; 6] = [
        Self::Added,
        Self::Edited,
        Self::Running,
        Self::RuleIgnored,
        Self::RuleUnignored,
        Self::Deleted,
    ];

    /// Query flag that selects this message.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Edited => "edited",
            Self::Running => "running",
            Self::RuleIgnored => "rule-ignored",
            Self::RuleUnignored => "rule-unignored",
            Self::Deleted => "deleted",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Your URL has been added and will be tested shortly.",
            Self::Edited => "Your changes have been saved.",
            Self::Running => "The URL is being tested. Results will appear shortly.",
            Self::RuleIgnored => "The rule has been ignored. It will be left out of new results.",
            Self::RuleUnignored => "The rule is no longer ignored.",
            Self::Deleted => "The URL and its results have been deleted.",
        }
    }

    /// First recognised flag of a raw query string.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Option<Self> {
        query?.split('&').find_map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            Self::ALL.into_iter().find(|flash| flash.flag() == key)
        })
    }
}

fn flash_banner(flash: Option<Flash>) -> String {
    flash
        .map(|flash| {
            format!(
                r#"<p class="flash flash-{}" role="status">{}</p>"#,
                flash.flag(),
                encode_text(flash.message())
            )
        })
        .unwrap_or_default()
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Wrap page content in the site chrome.
pub fn layout(site: &SiteLocals, request: &RequestLocals, title: &str, content: &str) -> String {
    let robots = if site.noindex {
        "\n    <meta name=\"robots\" content=\"noindex, nofollow\">"
    } else {
        ""
    };
    let banner = site
        .site_message
        .as_deref()
        .map(|message| format!(r#"<div class="site-message">{}</div>"#, encode_text(message)))
        .unwrap_or_default();
    let add_link = if site.readonly {
        String::new()
    } else {
        r#"<a class="nav-add" href="/new">Add new URL</a>"#.to_string()
    };
    let current = if request.is_home_page {
        r#" aria-current="page""#
    } else {
        ""
    };
    let host = if request.host.is_empty() {
        String::new()
    } else {
        format!(" on {}", encode_text(&request.host))
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">{robots}
    <title>{title} - Accessibility Dashboard</title>
    <link rel="stylesheet" href="/css/site.css">
</head>
<body class="{body_class}">
    {banner}
    <header class="site-header">
        <a class="brand" href="/"{current}>Accessibility Dashboard</a>
        <nav>{add_link}</nav>
    </header>
    <main>
{content}
    </main>
    <footer class="site-footer">
        <p>Accessibility Dashboard v{version}{host} &middot; <a href="{repository}">Source</a> &middot; <a href="{bugtracker}">Report a bug</a> &middot; &copy; {year}</p>
    </footer>
</body>
</html>"#,
        lang = site.lang,
        robots = robots,
        title = encode_text(title),
        body_class = if request.is_home_page { "home" } else { "page" },
        banner = banner,
        current = current,
        add_link = add_link,
        content = content,
        version = encode_text(site.version),
        host = host,
        repository = encode_double_quoted_attribute(site.repository),
        bugtracker = encode_double_quoted_attribute(&site.bugtracker),
        year = site.year,
    )
}
