//! Format checks for email, url and uuid strings

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

const HYPHENATED_UUID_LEN: usize = 36;

/// Dot-separated local atoms, dot-separated host labels, letters-only TLD.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@[A-Za-z0-9][A-Za-z0-9\-]*(\.[A-Za-z0-9][A-Za-z0-9\-]*)*\.[A-Za-z]{2,}$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// `local@domain.tld` with a letters-only TLD of at least two characters.
pub fn is_email(text: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(text))
}

/// `scheme://host[...]` with no whitespace anywhere.
pub fn is_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    scheme_ok && !host.is_empty() && !text.chars().any(char::is_whitespace)
}

/// Hyphenated 8-4-4-4-12 hex form only.
pub fn is_uuid(text: &str) -> bool {
    text.len() == HYPHENATED_UUID_LEN && Uuid::parse_str(text).is_ok()
}
