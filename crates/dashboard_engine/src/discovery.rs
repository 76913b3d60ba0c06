use std::collections::HashSet;

use dashboard_core::ListReference;
use scraper::{Html, Selector};
use url::Url;

/// Substring an `href` must contain to count as a list link.
pub const LIST_PATH_PATTERN: &str = "/list/";

/// Scans a profile page for list links. Relative links are resolved against
/// `base`; query and fragment are dropped so tracking variants collapse.
/// The result keeps first-seen order and holds each reference once.
pub fn scan_list_links(html: &str, base: Option<&Url>) -> Vec<ListReference> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let references = document
        .select(&anchors)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(LIST_PATH_PATTERN))
        .filter_map(|href| canonical_reference(href, base));

    dedupe_references(references)
}

/// Keeps the first occurrence of every reference.
pub fn dedupe_references(references: impl IntoIterator<Item = ListReference>) -> Vec<ListReference> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|reference| seen.insert(reference.clone()))
        .collect()
}

fn canonical_reference(href: &str, base: Option<&Url>) -> Option<ListReference> {
    let trimmed = href.trim();
    if !is_navigable(trimmed) {
        return None;
    }
    if let Some(mut url) = resolve_url(trimmed, base) {
        url.set_query(None);
        url.set_fragment(None);
        return Some(ListReference::new(url.as_str()));
    }
    let path = trimmed.split(['?', '#']).next()?;
    (!path.is_empty()).then(|| ListReference::new(path))
}

fn is_navigable(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with('#')
        || lower.starts_with('?')
        || lower.starts_with("javascript:"))
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    if let Ok(url) = Url::parse(reference) {
        return Some(url);
    }
    base.and_then(|base| base.join(reference).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_link_without_base_is_kept_as_path() {
        let refs = scan_list_links(r#"<a href="/list/ls1/?ref_=x">One</a>"#, None);
        assert_eq!(refs, vec![ListReference::new("/list/ls1/")]);
    }

    #[test]
    fn javascript_and_fragment_links_are_skipped() {
        let base = Url::parse("https://www.imdb.com/user/ur1/lists/").unwrap();
        let html = r##"<a href="javascript:open('/list/ls1/')">x</a><a href="#/list/">y</a>"##;
        assert!(scan_list_links(html, Some(&base)).is_empty());
    }
}
