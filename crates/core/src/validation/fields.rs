//! Contact, URL and currency validators.

use std::sync::LazyLock;

use regex::Regex;

use crate::masks::unmask;

/// Structural email check: local part, `@`, domain containing a dot.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Optional scheme, optional `www.`, a dotted host and an optional path.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&/=]*)$",
    )
    .expect("valid regex")
});

/// Permissive structural email check. Not an RFC 5322 validator.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// A phone number must have exactly 10 or 11 digits once formatting is
/// stripped.
pub fn validate_phone(phone: &str) -> bool {
    matches!(unmask(phone).len(), 10 | 11)
}

/// Lenient website / social handle check.
///
/// Empty input and `@handle` shorthand are accepted; anything else must
/// look like a host with an optional scheme and path.
pub fn validate_url(url: &str) -> bool {
    if url.is_empty() || url.starts_with('@') {
        return true;
    }
    URL_RE.is_match(url)
}

/// A currency field is filled when it parses to a positive amount.
pub fn validate_currency(value: &str) -> bool {
    parse_currency(value) > 0.0
}

/// Convert a displayed BRL amount (`"R$ 1.234,56"`) to a number.
///
/// Strips the currency symbol, whitespace and thousands separators, turns
/// the first decimal comma into a dot and parses the longest numeric
/// prefix. Anything unparseable is `0.0`. Every monetary value must pass
/// through here before it is persisted or transmitted.
pub fn parse_currency(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.') && !c.is_whitespace())
        .collect();
    let normalized = cleaned.replacen(',', ".", 1);

    let prefix = numeric_prefix(&normalized);
    match prefix.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Longest prefix shaped like `[+-]digits[.digits]`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 {
            end = frac_end;
        }
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
