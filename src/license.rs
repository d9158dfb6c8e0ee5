//! License URL classification against an ordered substring rule table.
//!
//! Rules are evaluated in declaration order and the first substring hit wins,
//! so more specific patterns must be declared before broader ones that
//! overlap them.

use std::borrow::Cow;
use std::fmt;

/// Name reported when a page carries no license link.
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// Name reported when a license link matches no rule.
pub const UNMAPPED_LICENSE: &str = "Other/Unmapped";

/// One `(substring, display name)` classification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRule {
    /// Lowercase substring searched for in the license URL.
    pub pattern: Cow<'static, str>,
    /// Canonical display name reported on a match.
    pub name: Cow<'static, str>,
}

impl LicenseRule {
    /// Creates a rule from static strings.
    #[must_use]
    pub const fn new(pattern: &'static str, name: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            name: Cow::Borrowed(name),
        }
    }

    /// Creates a rule from owned strings; the pattern is lowercased and trimmed.
    #[must_use]
    pub fn owned(pattern: &str, name: &str) -> Self {
        Self {
            pattern: Cow::Owned(pattern.trim().to_ascii_lowercase()),
            name: Cow::Owned(name.trim().to_string()),
        }
    }

    fn matches(&self, lowered_url: &str) -> bool {
        !self.pattern.is_empty() && lowered_url.contains(self.pattern.as_ref())
    }
}

impl fmt::Display for LicenseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.pattern, self.name)
    }
}

/// Default rule table, most specific first.
pub const DEFAULT_LICENSE_RULES: &[LicenseRule] = &[
    LicenseRule::new("creativecommons.org/licenses/by/4.0", "CC BY 4.0"),
    LicenseRule::new("creativecommons.org/licenses/by-sa/4.0", "CC BY-SA 4.0"),
    LicenseRule::new(
        "creativecommons.org/licenses/by-nc-sa/4.0",
        "CC BY-NC-SA 4.0",
    ),
    LicenseRule::new(
        "creativecommons.org/licenses/by-nc-nd/4.0",
        "CC BY-NC-ND 4.0",
    ),
    LicenseRule::new(
        "arxiv.org/licenses/nonexclusive-distrib/1.0",
        "arXiv Non-exclusive",
    ),
    LicenseRule::new(
        "arxiv.org/licenses/assumed-1991-2003",
        "arXiv Assumed (1991-2003)",
    ),
    LicenseRule::new("creativecommons.org/licenses/by-nc/4.0", "CC BY-NC 4.0"),
    LicenseRule::new("creativecommons.org/publicdomain/zero/1.0", "CC0 1.0"),
];

/// Classifies a license URL with the default rule table.
///
/// # Examples
///
/// ```
/// use harvester_core::license::classify;
///
/// assert_eq!(classify(Some("http://creativecommons.org/licenses/by/4.0/")), "CC BY 4.0");
/// assert_eq!(classify(None), "Unknown");
/// assert_eq!(classify(Some("https://example.com/terms")), "Other/Unmapped");
/// ```
#[must_use]
pub fn classify(license_url: Option<&str>) -> &'static str {
    classify_with(license_url, DEFAULT_LICENSE_RULES)
}

/// Classifies a license URL against `rules`; absent or blank URLs are [`UNKNOWN_LICENSE`].
#[must_use]
pub fn classify_with<'a>(license_url: Option<&str>, rules: &'a [LicenseRule]) -> &'a str {
    let url = license_url.map(lower_trim).unwrap_or_default();
    if url.is_empty() {
        return UNKNOWN_LICENSE;
    }
    rules
        .iter()
        .find(|rule| rule.matches(&url))
        .map_or(UNMAPPED_LICENSE, |rule| rule.name.as_ref())
}

fn lower_trim(url: &str) -> String {
    url.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_cc_by() {
        assert_eq!(
            classify(Some("http://creativecommons.org/licenses/by/4.0/")),
            "CC BY 4.0"
        );
    }

    #[test]
    fn test_classify_absent_and_blank_are_unknown() {
        assert_eq!(classify(None), UNKNOWN_LICENSE);
        assert_eq!(classify(Some("")), UNKNOWN_LICENSE);
        assert_eq!(classify(Some("   ")), UNKNOWN_LICENSE);
    }

    #[test]
    fn test_classify_unrecognized_is_unmapped() {
        assert_eq!(
            classify(Some("https://opensource.org/licenses/MIT")),
            UNMAPPED_LICENSE
        );
    }

    #[test]
    fn test_classify_is_case_and_whitespace_insensitive() {
        assert_eq!(
            classify(Some("  HTTP://ArXiv.org/licenses/NONEXCLUSIVE-DISTRIB/1.0/ ")),
            "arXiv Non-exclusive"
        );
    }

    #[test]
    fn test_classify_distinguishes_overlapping_cc_variants() {
        assert_eq!(
            classify(Some("https://creativecommons.org/licenses/by-nc-sa/4.0/")),
            "CC BY-NC-SA 4.0"
        );
        assert_eq!(
            classify(Some("https://creativecommons.org/licenses/by-nc/4.0/")),
            "CC BY-NC 4.0"
        );
        assert_eq!(
            classify(Some("http://creativecommons.org/publicdomain/zero/1.0/")),
            "CC0 1.0"
        );
    }

    #[test]
    fn test_classify_with_first_declared_rule_wins() {
        let rules = vec![
            LicenseRule::owned("example.org/licenses/foo/2.0", "Foo 2.0"),
            LicenseRule::owned("example.org/licenses/foo", "Foo (any)"),
        ];
        assert_eq!(
            classify_with(Some("https://example.org/licenses/foo/2.0"), &rules),
            "Foo 2.0"
        );
        assert_eq!(
            classify_with(Some("https://example.org/licenses/foo/1.0"), &rules),
            "Foo (any)"
        );

        let reversed: Vec<LicenseRule> = rules.into_iter().rev().collect();
        assert_eq!(
            classify_with(Some("https://example.org/licenses/foo/2.0"), &reversed),
            "Foo (any)"
        );
    }

    #[test]
    fn test_owned_rule_lowercases_pattern_and_empty_pattern_never_matches() {
        let rule = LicenseRule::owned("  Example.ORG/L ", " Example ");
        assert_eq!(rule.pattern, "example.org/l");
        assert_eq!(rule.name, "Example");

        let empty = [LicenseRule::owned("", "Everything")];
        assert_eq!(
            classify_with(Some("https://anything"), &empty),
            UNMAPPED_LICENSE
        );
    }
}
