//! Normalization of heterogeneous arXiv reference URLs to canonical abstract pages.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::DEFAULT_ABS_BASE_URL;
use crate::patterns::compile_static_regex;

/// Trailing document-extension suffix stripped before pattern matching.
const DOCUMENT_SUFFIX: &str = ".pdf";

/// Paper identifier: dotted digit groups, optional trailing letter, optional version.
///
/// The version alternative comes first so `v2` is never consumed as the letter.
macro_rules! paper_id {
    () => {
        r"(\d+(?:\.\d+)*(?:v\d+|[a-z](?:v\d+)?)?)"
    };
}

/// Host prefix: `arxiv.org` at the start, after a slash, or as a subdomain suffix.
macro_rules! arxiv_host {
    () => {
        r"(?:^|[/.])arxiv\.org/"
    };
}

/// Host-specific path patterns, tried in order: abstract, download, bare ID.
static ABS_URL_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile_static_regex(concat!(arxiv_host!(), "abs/", paper_id!())),
        compile_static_regex(concat!(arxiv_host!(), "pdf/", paper_id!())),
        compile_static_regex(concat!(arxiv_host!(), paper_id!())),
    ]
});

/// Normalizes a reference URL onto the canonical `https://arxiv.org/abs/<id>` form.
///
/// Input is trimmed and lowercased, a trailing `.pdf` is removed, and the
/// first matching host pattern supplies the paper identifier. Returns `None`
/// when no pattern matches.
///
/// # Examples
///
/// ```
/// use harvester_core::parser::normalize;
///
/// let canonical = Some("https://arxiv.org/abs/2301.12345v2".to_string());
/// assert_eq!(normalize("https://arxiv.org/pdf/2301.12345v2.pdf"), canonical);
/// assert_eq!(normalize("arxiv.org/abs/2301.12345v2"), canonical);
/// assert_eq!(normalize("https://example.com/paper"), None);
/// ```
#[must_use]
pub fn normalize(raw_url: &str) -> Option<String> {
    normalize_with_base(raw_url, DEFAULT_ABS_BASE_URL)
}

/// Normalizes a reference URL, rewriting the match onto `base_url` instead of arxiv.org.
///
/// Matching still requires an arxiv.org reference; only the output host changes.
#[must_use]
pub fn normalize_with_base(raw_url: &str, base_url: &str) -> Option<String> {
    let paper_id = extract_paper_id(raw_url)?;
    let base = base_url.trim().trim_end_matches('/');
    let normalized = format!("{base}/abs/{paper_id}");
    debug!(
        raw = %raw_url,
        normalized = %normalized,
        "normalized abstract URL"
    );
    Some(normalized)
}

/// Extracts the paper identifier from any recognized arXiv reference URL.
#[must_use]
pub fn extract_paper_id(raw_url: &str) -> Option<String> {
    let lowered = raw_url.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let stripped = lowered.trim_end_matches('/');
    let stripped = stripped.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(stripped);

    let paper_id = ABS_URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(stripped))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    if paper_id.is_none() {
        trace!(raw = %raw_url, "no arXiv URL pattern matched");
    }
    paper_id
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CANONICAL: &str = "https://arxiv.org/abs/2301.12345v2";

    #[test]
    fn test_normalize_pdf_and_abs_forms_agree() {
        assert_eq!(
            normalize("https://arxiv.org/pdf/2301.12345v2.pdf").as_deref(),
            Some(CANONICAL)
        );
        assert_eq!(
            normalize("arxiv.org/abs/2301.12345v2").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_url() {
        let once = normalize(CANONICAL).unwrap();
        assert_eq!(once, CANONICAL);
        assert_eq!(normalize(&once).unwrap(), once);
    }

    #[test]
    fn test_normalize_bare_id_form() {
        assert_eq!(
            normalize("http://arxiv.org/0704.0001").as_deref(),
            Some("https://arxiv.org/abs/0704.0001")
        );
    }

    #[test]
    fn test_normalize_is_case_and_whitespace_insensitive() {
        assert_eq!(
            normalize("  HTTPS://ArXiv.org/ABS/2301.12345V2  ").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_normalize_handles_www_export_hosts_and_trailing_slash() {
        assert_eq!(
            normalize("https://www.arxiv.org/abs/2301.12345v2/").as_deref(),
            Some(CANONICAL)
        );
        assert_eq!(
            normalize("http://export.arxiv.org/pdf/2301.12345v2").as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn test_normalize_keeps_trailing_letter_and_drops_query() {
        assert_eq!(
            normalize("https://arxiv.org/abs/0901.2345a?context=cs").as_deref(),
            Some("https://arxiv.org/abs/0901.2345a")
        );
    }

    #[test]
    fn test_normalize_rejects_unknown_shapes() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("https://example.com/abs/2301.12345"), None);
        assert_eq!(normalize("https://arxiv.org/list/cs.AI/recent"), None);
        assert_eq!(normalize("not a url"), None);
    }

    #[test]
    fn test_normalize_rejects_lookalike_hosts() {
        assert_eq!(normalize("https://notarxiv.org/abs/2301.12345"), None);
        assert_eq!(normalize("https://fakearxiv.org/pdf/2301.12345.pdf"), None);
        assert_eq!(normalize("myarxiv.org/2301.12345"), None);
    }

    #[test]
    fn test_normalize_with_base_rewrites_host_only() {
        assert_eq!(
            normalize_with_base(
                "https://arxiv.org/pdf/2301.12345.pdf",
                "http://127.0.0.1:9000/"
            )
            .as_deref(),
            Some("http://127.0.0.1:9000/abs/2301.12345")
        );
        assert_eq!(
            normalize_with_base("https://example.com/2301.12345", "http://127.0.0.1:9000"),
            None
        );
    }

    #[test]
    fn test_extract_paper_id_strips_pdf_suffix_only_at_end() {
        assert_eq!(
            extract_paper_id("https://arxiv.org/pdf/2301.12345v1.pdf").as_deref(),
            Some("2301.12345v1")
        );
    }
}
