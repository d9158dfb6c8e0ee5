//! Numeric key resolution for raw document identifiers.
//!
//! Source lists mix several identifier encodings (`PN0060987`, `60987`,
//! `doc-12-60987`). Each is reduced to a single integer key used to filter
//! the run to an inclusive range and to order it deterministically.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::patterns::compile_static_regex;

/// Known fixed-length identifier prefixes, stripped before integer parsing.
const KNOWN_ID_PREFIXES: &[&str] = &["PN0"];

static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\d+"));

/// Resolves a raw document identifier to its numeric key.
///
/// Tried in order, first success wins:
/// 1. A known prefix followed by digits: the remainder is parsed.
/// 2. The whole (trimmed) string is parsed as an integer.
/// 3. The last run of digits in the string is parsed.
///
/// Returns `None` when no digits can be found. A step that parses a
/// negative integer still wins, and the identifier resolves to `None`: no
/// later step may reinterpret `-60990` as `60990`.
///
/// # Examples
///
/// ```
/// use harvester_core::parser::resolve;
///
/// assert_eq!(resolve("PN0060987"), Some(60987));
/// assert_eq!(resolve("61041"), Some(61041));
/// assert_eq!(resolve("doc-7-60990"), Some(60990));
/// assert_eq!(resolve("no digits"), None);
/// ```
#[must_use]
pub fn resolve(raw_id: &str) -> Option<u64> {
    let trimmed = raw_id.trim();
    let signed = from_known_prefix(trimmed)
        .or_else(|| parse_whole(trimmed))
        .or_else(|| last_digit_run(trimmed));
    let key = signed.and_then(|value| u64::try_from(value).ok());
    trace!(raw_id = %raw_id, ?key, "resolved identifier");
    key
}

fn from_known_prefix(value: &str) -> Option<i128> {
    KNOWN_ID_PREFIXES.iter().find_map(|prefix| {
        let rest = value.strip_prefix(prefix)?;
        if rest.is_empty() {
            return None;
        }
        rest.parse().ok()
    })
}

fn parse_whole(value: &str) -> Option<i128> {
    value.parse().ok()
}

fn last_digit_run(value: &str) -> Option<i128> {
    DIGIT_RUN_RE
        .find_iter(value)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}
