//! # a11y-dashboard-core
//!
//! The model layer of the accessibility dashboard.
//!
//! The dashboard itself stores nothing: tasks and results live in the
//! external webservice. What this crate owns is everything that is decided
//! once at startup and then only read while requests are served:
//!
//! - `config` - configuration loading, environment overrides and the normalizer
//! - `credentials` - the Basic Auth credential store
//! - `types` - tasks, results and issues as exchanged with the webservice
//! - `download` - CSV / JSON renditions of a result
//! - `text` - small text helpers shared by views and downloads
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies
//! - Nothing in here is mutated after startup

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod credentials;
pub mod download;
pub mod primitives;
pub mod text;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{Config, Environment, WebserviceLocation};
pub use credentials::{CredentialStore, hash_password};
pub use download::DownloadFormat;
pub use types::{
    DashboardError, Issue, IssueCounts, IssueType, Standard, Task, TaskDraft, TaskEdit, TaskResult,
};
