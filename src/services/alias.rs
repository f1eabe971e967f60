//! URL alias helpers
//!
//! Term aliases are built from CSS-identifier-safe versions of the
//! vocabulary and term name, e.g. `("tags", "Rust Tips")` becomes
//! `/tags/rust-tips`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters allowed in an identifier: `-`, `0-9`, `A-Z`, `_`, `a-z` and
/// anything from U+00A1 upward.
static INVALID_IDENTIFIER_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\x{002D}\x{0030}-\x{0039}\x{0041}-\x{005A}\x{005F}\x{0061}-\x{007A}\x{00A1}-\x{FFFF}]")
        .expect("identifier pattern is valid")
});

static LEADING_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]").expect("leading digit pattern is valid"));

static LEADING_HYPHEN_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-[0-9])|^(--)").expect("leading hyphen pattern is valid"));

/// Lowercase `name` and reduce it to a valid CSS identifier.
///
/// Spaces, single underscores, `/` and `[` become `-`; a double underscore
/// is kept; `]` is dropped; other disallowed characters are stripped. An
/// identifier may not start with a digit, a hyphen followed by a digit, or
/// two hyphens.
pub fn css_identifier(name: &str) -> String {
    // `##` holds each `__` while single underscores are replaced
    let lowered = name.to_lowercase().replace("__", "##");

    let mut replaced = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            ' ' | '_' | '/' | '[' => replaced.push('-'),
            ']' => {}
            other => replaced.push(other),
        }
    }
    let replaced = replaced.replace("##", "__");

    let stripped = INVALID_IDENTIFIER_CHARS.replace_all(&replaced, "");
    let no_digit = LEADING_DIGIT.replace(&stripped, "_");
    LEADING_HYPHEN_RUN.replace(&no_digit, "__").into_owned()
}

/// Alias for a taxonomy term: `/<vocabulary>/<name>`
pub fn term_alias(vocabulary: &str, name: &str) -> String {
    format!("/{}/{}", css_identifier(vocabulary), css_identifier(name))
}
