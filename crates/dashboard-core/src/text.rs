//! Text helpers shared by the views and the download renderer.

/// Strip the scheme, a leading `www.` and a trailing slash from a URL.
///
/// `https://www.example.com/about/` becomes `example.com/about`.
pub fn simplify_url(url: &str) -> &str {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);
    without_www.strip_suffix('/').unwrap_or(without_www)
}

/// Turn arbitrary text into a lowercase, dash-separated file name fragment.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Uppercase the first character of `text`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `1 error`, `2 errors`.
pub fn pluralize(count: u64, singular: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}s", count, singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplify_url_strips_scheme_www_and_slash() {
        assert_eq!(simplify_url("https://www.example.com/"), "example.com");
        assert_eq!(simplify_url("http://example.com/about/"), "example.com/about");
        assert_eq!(simplify_url("example.com"), "example.com");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("example.com/about us"), "example-com-about-us");
        assert_eq!(slugify("--A--B--"), "a-b");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn capitalize_and_pluralize() {
        assert_eq!(capitalize("error"), "Error");
        assert_eq!(capitalize(""), "");
        assert_eq!(pluralize(1, "notice"), "1 notice");
        assert_eq!(pluralize(0, "notice"), "0 notices");
    }
}
