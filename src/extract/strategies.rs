//! Per-field extraction strategies.
//!
//! Each strategy looks at the parsed page in exactly one way and returns
//! `None` when its markup is missing. Fields list their strategies in
//! fallback order.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::text::{collapse_whitespace, element_text, non_empty};
use crate::config::DEFAULT_ABS_BASE_URL;
use crate::patterns::{compile_static_regex, compile_static_selector};

/// A single way of extracting one field from a page.
pub(crate) type Strategy = fn(&Html) -> Option<String>;

/// Path segment that marks a license link.
const LICENSES_SEGMENT: &str = "/licenses/";

/// Label arXiv prefixes onto the title heading.
const TITLE_LABEL: &str = "title:";

static LICENSE_REL_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"a[rel~="license"]"#));
static LINK_WITH_HREF_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a[href]"));
static SUBMISSION_HISTORY_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.submission-history"));
static OG_URL_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"meta[property="og:url"]"#));
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("h1.title"));
static AUTHORS_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("div.authors"));
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));
static COMMENTS_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("td.comments"));
static SUBJECTS_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("td.subjects"));
static JREF_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("td.jref"));
static DOI_SEL: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("td.doi"));

static HISTORY_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\[v(\d+)\]"));
static URL_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?i)v(\d+)/?$"));

pub(crate) const LICENSE_URL: &[Strategy] = &[license_from_rel_link, license_from_licenses_path];
pub(crate) const VERSION: &[Strategy] = &[version_from_submission_history, version_from_og_url];
pub(crate) const TITLE: &[Strategy] = &[title_from_heading];
pub(crate) const AUTHORS: &[Strategy] = &[authors_from_container];
pub(crate) const COMMENTS: &[Strategy] = &[comments_from_cell];
pub(crate) const SUBJECTS: &[Strategy] = &[subjects_from_cell];
pub(crate) const JOURNAL_REF: &[Strategy] = &[journal_ref_from_cell];
pub(crate) const RELATED_DOI: &[Strategy] = &[doi_from_cell_link];

/// Returns the first strategy result, in declaration order.
pub(crate) fn first_match(document: &Html, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(document))
}

/// License link explicitly marked `rel="license"`.
pub(crate) fn license_from_rel_link(document: &Html) -> Option<String> {
    let link = document.select(&LICENSE_REL_SEL).next()?;
    let href = link.value().attr("href")?.trim();
    non_empty(absolutize(href))
}

/// First link whose href contains a `/licenses/` segment.
pub(crate) fn license_from_licenses_path(document: &Html) -> Option<String> {
    document
        .select(&LINK_WITH_HREF_SEL)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .find(|href| href.contains(LICENSES_SEGMENT))
        .map(absolutize)
}

/// Highest `[vN]` marker in the submission history block.
pub(crate) fn version_from_submission_history(document: &Html) -> Option<String> {
    let history = document.select(&SUBMISSION_HISTORY_SEL).next()?;
    let text = history.text().collect::<String>();
    HISTORY_VERSION_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .max()
        .map(|n| format!("v{n}"))
}

/// Trailing `vN` of the canonical URL meta tag.
pub(crate) fn version_from_og_url(document: &Html) -> Option<String> {
    let meta = document.select(&OG_URL_SEL).next()?;
    let content = meta.value().attr("content")?.trim();
    let number = URL_VERSION_RE.captures(content)?.get(1)?.as_str();
    let number: u64 = number.parse().ok()?;
    Some(format!("v{number}"))
}

/// Title heading with its `Title:` label removed.
pub(crate) fn title_from_heading(document: &Html) -> Option<String> {
    let heading = document.select(&TITLE_SEL).next()?;
    let text = element_text(heading);
    let title = match text.get(..TITLE_LABEL.len()) {
        Some(label) if label.eq_ignore_ascii_case(TITLE_LABEL) => {
            collapse_whitespace(&text[TITLE_LABEL.len()..])
        }
        _ => text,
    };
    non_empty(title)
}

/// Author link texts from the first authors container, comma separated.
pub(crate) fn authors_from_container(document: &Html) -> Option<String> {
    let container = document.select(&AUTHORS_SEL).next()?;
    let authors: Vec<String> = container
        .select(&LINK_SEL)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .collect();
    non_empty(authors.join(", "))
}

pub(crate) fn comments_from_cell(document: &Html) -> Option<String> {
    cell_text(document, &COMMENTS_SEL)
}

pub(crate) fn subjects_from_cell(document: &Html) -> Option<String> {
    cell_text(document, &SUBJECTS_SEL)
}

pub(crate) fn journal_ref_from_cell(document: &Html) -> Option<String> {
    cell_text(document, &JREF_SEL)
}

/// Link text inside the DOI cell; a cell without a link yields nothing.
pub(crate) fn doi_from_cell_link(document: &Html) -> Option<String> {
    let cell = document.select(&DOI_SEL).next()?;
    let link = cell.select(&LINK_SEL).next()?;
    non_empty(element_text(link))
}

fn cell_text(document: &Html, selector: &Selector) -> Option<String> {
    let cell = document.select(selector).next()?;
    non_empty(element_text(cell))
}

/// Resolves protocol-relative and root-relative hrefs against arxiv.org.
fn absolutize(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with("//") {
        return format!("https:{href}");
    }
    if href.starts_with('/') {
        return Url::parse(DEFAULT_ABS_BASE_URL)
            .ok()
            .and_then(|base| base.join(href).ok())
            .map_or_else(|| format!("{DEFAULT_ABS_BASE_URL}{href}"), String::from);
    }
    href.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> Html {
        Html::parse_document(&format!("<html><head></head><body>{body}</body></html>"))
    }

    #[test]
    fn test_license_rel_link_is_preferred() {
        let doc = page(
            r#"<a href="https://creativecommons.org/licenses/by-sa/4.0/">other</a>
               <a rel="license" href="http://creativecommons.org/licenses/by/4.0/">CC</a>"#,
        );
        assert_eq!(
            first_match(&doc, LICENSE_URL).as_deref(),
            Some("http://creativecommons.org/licenses/by/4.0/")
        );
    }

    #[test]
    fn test_license_rel_matches_multi_valued_rel() {
        let doc = page(
            r#"<a rel="noopener license" href="//arxiv.org/licenses/nonexclusive-distrib/1.0/">l</a>"#,
        );
        assert_eq!(
            license_from_rel_link(&doc).as_deref(),
            Some("https://arxiv.org/licenses/nonexclusive-distrib/1.0/")
        );
    }

    #[test]
    fn test_license_falls_back_to_licenses_path_and_absolutizes() {
        let doc = page(
            r#"<a href="/abs/2301.12345">abs</a>
               <a href="/licenses/nonexclusive-distrib/1.0/">license</a>"#,
        );
        assert_eq!(license_from_rel_link(&doc), None);
        assert_eq!(
            first_match(&doc, LICENSE_URL).as_deref(),
            Some("https://arxiv.org/licenses/nonexclusive-distrib/1.0/")
        );
    }

    #[test]
    fn test_license_rel_without_href_falls_through() {
        let doc = page(
            r#"<a rel="license">broken</a>
               <a href="http://creativecommons.org/licenses/by-nc-nd/4.0/">l</a>"#,
        );
        assert_eq!(
            first_match(&doc, LICENSE_URL).as_deref(),
            Some("http://creativecommons.org/licenses/by-nc-nd/4.0/")
        );
    }

    #[test]
    fn test_version_takes_maximum_not_last() {
        let doc = page(
            r#"<div class="submission-history">
                 <strong>[v1]</strong> Mon, 2 Jan 2023
                 <strong>[v3]</strong> Wed, 4 Jan 2023
                 <strong>[v2]</strong> Tue, 3 Jan 2023
               </div>"#,
        );
        assert_eq!(first_match(&doc, VERSION).as_deref(), Some("v3"));
    }

    #[test]
    fn test_version_compares_numerically() {
        let doc = page(r#"<div class="submission-history">[v9] a [v10] b</div>"#);
        assert_eq!(
            version_from_submission_history(&doc).as_deref(),
            Some("v10")
        );
    }

    #[test]
    fn test_version_falls_back_to_og_url() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:url" content="https://arxiv.org/abs/2301.12345v4"/></head><body></body></html>"#,
        );
        assert_eq!(first_match(&doc, VERSION).as_deref(), Some("v4"));
    }

    #[test]
    fn test_version_og_url_without_version_is_absent() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:url" content="https://arxiv.org/abs/2301.12345"/></head><body></body></html>"#,
        );
        assert_eq!(first_match(&doc, VERSION), None);
    }

    #[test]
    fn test_history_without_markers_falls_back_to_og_url() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:url" content="https://arxiv.org/abs/2301.12345v2"/></head>
               <body><div class="submission-history">no markers</div></body></html>"#,
        );
        assert_eq!(first_match(&doc, VERSION).as_deref(), Some("v2"));
    }

    #[test]
    fn test_title_strips_label() {
        let doc = page(
            r#"<h1 class="title mathjax"><span class="descriptor">Title:</span>Attention Is All You Need</h1>"#,
        );
        assert_eq!(
            title_from_heading(&doc).as_deref(),
            Some("Attention Is All You Need")
        );
    }

    #[test]
    fn test_title_without_label_is_kept() {
        let doc = page(r#"<h1 class="title">  A Plain   Title </h1>"#);
        assert_eq!(title_from_heading(&doc).as_deref(), Some("A Plain Title"));
    }

    #[test]
    fn test_authors_joined_with_comma() {
        let doc = page(
            r#"<div class="authors"><span class="descriptor">Authors:</span>
               <a href="/a/one">Ada Lovelace</a>, <a href="/a/two">Alan  Turing</a></div>
               <div class="authors"><a>Ignored</a></div>"#,
        );
        assert_eq!(
            authors_from_container(&doc).as_deref(),
            Some("Ada Lovelace, Alan Turing")
        );
    }

    #[test]
    fn test_table_cells_and_doi_link() {
        let doc = page(
            r#"<table>
                 <tr><td class="tablecell comments mathjax">12 pages, 3 figures</td></tr>
                 <tr><td class="tablecell subjects"><span class="primary-subject">Computation and Language (cs.CL)</span>; Machine Learning (cs.LG)</td></tr>
                 <tr><td class="tablecell jref">Phys. Rev. D 99, 1 (2019)</td></tr>
                 <tr><td class="tablecell doi"><a href="https://doi.org/10.1103/PhysRevD.99.1">https://doi.org/10.1103/PhysRevD.99.1</a></td></tr>
               </table>"#,
        );
        assert_eq!(
            comments_from_cell(&doc).as_deref(),
            Some("12 pages, 3 figures")
        );
        assert_eq!(
            subjects_from_cell(&doc).as_deref(),
            Some("Computation and Language (cs.CL); Machine Learning (cs.LG)")
        );
        assert_eq!(
            journal_ref_from_cell(&doc).as_deref(),
            Some("Phys. Rev. D 99, 1 (2019)")
        );
        assert_eq!(
            doi_from_cell_link(&doc).as_deref(),
            Some("https://doi.org/10.1103/PhysRevD.99.1")
        );
    }

    #[test]
    fn test_doi_cell_without_link_is_absent() {
        let doc = page(r#"<table><tr><td class="doi">10.1000/xyz</td></tr></table>"#);
        assert_eq!(doi_from_cell_link(&doc), None);
    }

    #[test]
    fn test_absolutize_variants() {
        assert_eq!(absolutize("https://x.org/l"), "https://x.org/l");
        assert_eq!(absolutize("//x.org/l"), "https://x.org/l");
        assert_eq!(absolutize("/licenses/a"), "https://arxiv.org/licenses/a");
        assert_eq!(absolutize("licenses/a"), "licenses/a");
    }
}
