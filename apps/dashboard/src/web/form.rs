//! # Form Bodies
//!
//! URL-encoded form extraction with the extended key syntax browsers and
//! scripts commonly send:
//!
//! - `actions[]=a&actions[]=b` and `actions[0]=a` build lists
//! - `headers[Cookie]=a%3Db` builds maps
//!
//! A body that cannot be parsed becomes a handler error (rendered as 500).

use super::errors::{PageError, RouteError};
use a11y_dashboard_core::DashboardError;
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use std::collections::BTreeMap;

/// Decoded form fields, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(pub Vec<(String, String)>);

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|rejection| PageError::Server(RouteError::Form(rejection.body_text())))?;
        Ok(Self(fields))
    }
}

/// Split `key[sub]` into `("key", Some("sub"))`; plain keys have no subscript.
fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once('[') {
        Some((base, rest)) => match rest.strip_suffix(']') {
            Some(sub) => (base, Some(sub)),
            None => (key, None),
        },
        None => (key, None),
    }
}

impl FormData {
    /// First value submitted under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value of `key`, empty when absent.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(str::trim).unwrap_or_default().to_string()
    }

    /// Trimmed value of `key`, `None` when absent or blank.
    #[must_use]
    pub fn optional_text(&self, key: &str) -> Option<String> {
        Some(self.text(key)).filter(|value| !value.is_empty())
    }

    /// Values of `key`, `key[]` and `key[N]`, in submission order.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| match split_key(k) {
                (base, None) => base == key,
                (base, Some(sub)) => {
                    base == key && (sub.is_empty() || sub.chars().all(|c| c.is_ascii_digit()))
                }
            })
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Entries submitted as `key[name]=value`.
    #[must_use]
    pub fn map(&self, key: &str) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| match split_key(k) {
                (base, Some(sub))
                    if base == key
                        && !sub.is_empty()
                        && !sub.chars().all(|c| c.is_ascii_digit()) =>
                {
                    Some((sub.to_string(), v.trim().to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// A non-negative integer field; blank means unset.
    pub fn optional_u64(&self, key: &str, label: &str) -> Result<Option<u64>, DashboardError> {
        self.optional_text(key)
            .map(|value| {
                value.parse::<u64>().map_err(|_| {
                    DashboardError::InvalidTask(format!("{} must be a whole number", label))
                })
            })
            .transpose()
    }
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
    fn lists_accept_bracket_forms() {
        let data = form(&[
            ("actions[]", "click #a"),
            ("actions[1]", "wait 10"),
            ("actions", "screen"),
            ("actions[x]", "ignored"),
            ("other[]", "nope"),
        ]);
        assert_eq!(data.list("actions"), vec!["click #a", "wait 10", "screen"]);
    }

    #[test]
    fn maps_take_named_subscripts() {
        let data = form(&[
            ("headers[Cookie]", " a=b "),
            ("headers[]", "skip"),
            ("headers", "skip too"),
        ]);
        let map = data.map("headers");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Cookie").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn text_helpers() {
        let data = form(&[("name", "  Home "), ("wait", ""), ("timeout", "abc")]);
        assert_eq!(data.text("name"), "Home");
        assert_eq!(data.text("missing"), "");
        assert_eq!(data.optional_text("wait"), None);
        assert_eq!(data.optional_u64("wait", "Wait").expect("blank is unset"), None);
        assert!(data.optional_u64("timeout", "Timeout").is_err());
    }

    #[test]
    fn split_key_handles_malformed_brackets() {
        assert_eq!(split_key("a[b]"), ("a", Some("b")));
        assert_eq!(split_key("a[b"), ("a[b", None));
        assert_eq!(split_key("plain"), ("plain", None));
    }
}
