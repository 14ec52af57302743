//! # Result Downloads
//!
//! Renders a full result (one with issues) as CSV or JSON for download.

use crate::text::{simplify_url, slugify};
use crate::types::{DashboardError, Task, TaskResult};
use std::str::FromStr;

/// Header row of every CSV download.
pub const CSV_HEADER: &str = r#""code","message","type","context","selector""#;

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Json,
}

impl DownloadFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    /// Render `result` in this format.
    pub fn render(self, result: &TaskResult) -> Result<String, DashboardError> {
        match self {
            Self::Csv => Ok(render_csv(result)),
            Self::Json => serde_json::to_string_pretty(result)
                .map_err(|e| DashboardError::IoError(format!("Cannot encode result: {}", e))),
        }
    }
}

impl FromStr for DownloadFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(DashboardError::InvalidTask(format!(
                "Unknown download format '{}'",
                other
            ))),
        }
    }
}

/// One CSV row per issue, every field quoted.
pub fn render_csv(result: &TaskResult) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for issue in result.results.iter().flatten() {
        let fields = [
            issue.code.as_str(),
            issue.message.as_str(),
            issue.kind.as_str(),
            issue.context.as_deref().unwrap_or(""),
            issue.selector.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// `example-com-about--2024-03-01.csv`
pub fn file_name(task: &Task, result: &TaskResult, format: DownloadFormat) -> String {
    format!(
        "{}--{}.{}",
        slugify(simplify_url(&task.url)),
        result.date.format("%Y-%m-%d"),
        format.extension()
    )
}

// =============================================================================
// TESTS
// =============================================================================
