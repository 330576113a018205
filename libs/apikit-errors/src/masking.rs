//! Redaction of secrets, credentials and local paths from client-visible text
//!
//! All patterns live in [`SENSITIVE_PATTERNS`]. Adding a pattern anywhere else is
//! a bug: every client-facing error detail goes through [`mask_sensitive_data`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex, RegexBuilder};

/// A compiled masking rule.
#[derive(Debug)]
pub struct SensitivePattern {
    pub name: &'static str,
    pub regex: Regex,
    pub replacement: &'static str,
}

/// `(name, pattern, replacement)`; patterns are matched case-insensitively.
const PATTERN_TABLE: &[(&str, &str, &str)] = &[
    (
        "password",
        r#"password['"]?\s*[:=]\s*['"]?([^'"\s]+)"#,
        "password=***",
    ),
    ("token", r#"token['"]?\s*[:=]\s*['"]?([^'"\s]+)"#, "token=***"),
    (
        "api_key",
        r#"api[_-]?key['"]?\s*[:=]\s*['"]?([^'"\s]+)"#,
        "api_key=***",
    ),
    (
        "secret",
        r#"secret['"]?\s*[:=]\s*['"]?([^'"\s]+)"#,
        "secret=***",
    ),
    (
        "bearer",
        r"authorization:\s*bearer\s+\S+",
        "authorization: Bearer ***",
    ),
    ("home_path", r"/home/[^/\s]+", "/home/***"),
    ("users_path", r"/users/[^/\s]+", "/users/***"),
    ("postgres_dsn", r"postgres://[^@\s]+@", "postgres://***@"),
];

/// Compiled masking rules, applied in table order.
pub static SENSITIVE_PATTERNS: LazyLock<Vec<SensitivePattern>> = LazyLock::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|&(name, pattern, replacement)| SensitivePattern {
            name,
            #[allow(clippy::expect_used)]
            regex: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("static masking regex should compile"),
            replacement,
        })
        .collect()
});

/// Redact every sensitive pattern from `text`.
///
/// Returns the input unchanged (and unallocated) when nothing matches.
#[must_use]
pub fn mask_sensitive_data(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut masked = Cow::Borrowed(text);
    for pattern in SENSITIVE_PATTERNS.iter() {
        if let Cow::Owned(replaced) = pattern
            .regex
            .replace_all(&masked, NoExpand(pattern.replacement))
        {
            masked = Cow::Owned(replaced);
        }
    }
    masked
}

/// Same as [`mask_sensitive_data`], passing `None` through untouched.
#[must_use]
pub fn mask_optional(text: Option<&str>) -> Option<Cow<'_, str>> {
    text.map(mask_sensitive_data)
}
