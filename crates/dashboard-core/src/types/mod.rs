//! # Core Type Definitions
//!
//! Types exchanged with the accessibility webservice:
//! - Tasks (`Task`) and the payloads that create or change them (`TaskDraft`, `TaskEdit`)
//! - Results (`TaskResult`) and their individual issues (`Issue`)
//! - Error types (`DashboardError`)
//!
//! Field names follow the webservice's JSON: mostly snake_case, with the
//! exception of `hideElements`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// STANDARDS
// =============================================================================

/// Accessibility standard a task is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Standard {
    #[serde(rename = "WCAG2A")]
    Wcag2A,
    #[default]
    #[serde(rename = "WCAG2AA")]
    Wcag2AA,
    #[serde(rename = "WCAG2AAA")]
    Wcag2AAA,
}

impl Standard {
    /// Every standard, in the order offered by the task form.
    pub const ALL: [Self; 3] = [Self::Wcag2A, Self::Wcag2AA, Self::Wcag2AAA];

    /// Wire name, as sent to the webservice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wcag2A => "WCAG2A",
            Self::Wcag2AA => "WCAG2AA",
            Self::Wcag2AAA => "WCAG2AAA",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wcag2A => "WCAG 2 Level A",
            Self::Wcag2AA => "WCAG 2 Level AA",
            Self::Wcag2AAA => "WCAG 2 Level AAA",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Standard {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|standard| standard.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidTask(format!("Unknown standard '{}'", s)))
    }
}

// =============================================================================
// ISSUES
// =============================================================================

/// Severity of a single issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Error,
    Warning,
    Notice,
}

impl IssueType {
    /// Every issue type, most severe first.
    pub const ALL: [Self; 3] = [Self::Error, Self::Warning, Self::Notice];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
        }
    }
}

/// A single accessibility issue found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Rule code, e.g. `WCAG2AA.Principle1.Guideline1_1.1_1_1.H37`.
    pub code: String,
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub message: String,
    /// HTML snippet of the offending element.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<String>,
}

/// Issue totals of one result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub error: u64,
    #[serde(default)]
    pub warning: u64,
    #[serde(default)]
    pub notice: u64,
}

impl IssueCounts {
    /// Count for one issue type.
    #[must_use]
    pub const fn of(&self, kind: IssueType) -> u64 {
        match kind {
            IssueType::Error => self.error,
            IssueType::Warning => self.warning,
            IssueType::Notice => self.notice,
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of one run of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: String,
    /// Id of the task this result belongs to.
    pub task: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub count: IssueCounts,
    /// Rules that were ignored when this result was produced.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Individual issues; only present when requested with `full=true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Issue>>,
}

impl TaskResult {
    /// Issues of one type, in webservice order.
    pub fn issues_of(&self, kind: IssueType) -> impl Iterator<Item = &Issue> {
        self.results
            .iter()
            .flatten()
            .filter(move |issue| issue.kind == kind)
    }
}

// =============================================================================
// TASKS
// =============================================================================

/// A stored accessibility-test configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub standard: Standard,
    /// Rule codes excluded from results.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Page load timeout in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Wait after load before testing, in milliseconds.
    #[serde(default)]
    pub wait: Option<u64>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, rename = "hideElements")]
    pub hide_elements: Option<String>,
    #[serde(default)]
    pub last_result: Option<TaskResult>,
}

impl Task {
    /// Whether results of this task currently skip `rule`.
    #[must_use]
    pub fn ignores(&self, rule: &str) -> bool {
        self.ignore.iter().any(|r| r == rule)
    }

    /// Ignore list with `rule` added (at most once).
    #[must_use]
    pub fn ignore_with(&self, rule: &str) -> Vec<String> {
        let mut ignore = self.ignore.clone();
        if !self.ignores(rule) {
            ignore.push(rule.to_string());
        }
        ignore
    }

    /// Ignore list with every occurrence of `rule` removed.
    #[must_use]
    pub fn ignore_without(&self, rule: &str) -> Vec<String> {
        self.ignore.iter().filter(|r| *r != rule).cloned().collect()
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub url: String,
    pub standard: Standard,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, rename = "hideElements", skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
}

impl TaskDraft {
    /// Check the fields the dashboard can judge on its own.
    ///
    /// The webservice performs the authoritative validation; this only catches
    /// what would certainly be rejected.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.name.trim().is_empty() {
            return Err(DashboardError::InvalidTask(
                "Please enter a name for the task".to_string(),
            ));
        }
        validate_url(&self.url)
    }
}

/// Partial update of a task. Unset fields are left untouched by the webservice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "hideElements", skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
    /// Free-text note stored with the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TaskEdit {
    /// An edit that only replaces the ignore list.
    #[must_use]
    pub fn ignore(ignore: Vec<String>) -> Self {
        Self {
            ignore: Some(ignore),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(DashboardError::InvalidTask(
                "Please enter a name for the task".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn validate_url(url: &str) -> Result<(), DashboardError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DashboardError::InvalidTask(
            "Please enter a URL to test".to_string(),
        ));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(DashboardError::InvalidTask(format!(
            "'{}' is not a valid URL",
            url
        )));
    }
    Ok(())
}

// =============================================================================
// FORM TEXT CONVERSIONS
// =============================================================================

/// Split a textarea into trimmed, non-empty lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `Name: value` lines into a header map.
pub fn parse_headers(text: &str) -> Result<BTreeMap<String, String>, DashboardError> {
    let mut headers = BTreeMap::new();
    for line in parse_lines(text) {
        let Some((name, value)) = line.split_once(':') else {
            return Err(DashboardError::InvalidTask(format!(
                "Header '{}' must look like 'Name: value'",
                line
            )));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::InvalidTask(format!(
                "Header '{}' has no name",
                line
            )));
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}

/// Inverse of `parse_headers`, for prefilling the edit form.
pub fn headers_to_text(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the dashboard outside of request handling.
///
/// - Configuration defects surface here before the server listens
/// - Use `Result<T, DashboardError>` for fallible operations
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The configuration is missing a required value or has a malformed one.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The credential file could not be parsed or contains unsupported entries.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// A task submitted through a form is not acceptable.
    #[error("{0}")]
    InvalidTask(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The listener could not be bound.
    #[error("Bind failed on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Server(String),
}

// =============================================================================
// TESTS
// =============================================================================
