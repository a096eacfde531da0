use anyhow::Context as _;
use scraper::{Html, Selector};
use url::Url;

use crate::cli::ExtractArgs;
use crate::encoding::{decode_lossy, encoding_for_label, resolve_encoding};
use crate::formats::{OG_DESCRIPTION, OG_TITLE, OgMetadata, SummaryBudget};
use crate::input::read_input;
use crate::summarize::summarize;
use crate::text::body_paragraphs;

/// At most this many `og:*` meta tags are copied from a page.
const MAX_OG_TAGS: usize = 50;

/// `og:*` properties whose values are links and get resolved against the page URL.
const URL_PROPERTIES: &[&str] = &[
    "og:url",
    "og:image",
    "og:image:url",
    "og:image:secure_url",
    "og:video",
    "og:video:url",
    "og:video:secure_url",
    "og:audio",
    "og:audio:url",
    "og:audio:secure_url",
];

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let budget = SummaryBudget::new(args.min_size, args.max_size)?;
    let target_url =
        Url::parse(&args.url).with_context(|| format!("parse target url: {}", args.url))?;
    let body = read_input(&args.file)?;

    let og = extract_metadata_with_budget(
        &body,
        &target_url,
        args.content_type.as_deref(),
        args.encoding.as_deref(),
        budget,
    );

    let json = serde_json::to_string_pretty(&og).context("serialize preview metadata")?;
    println!("{json}");
    Ok(())
}

/// Derives preview metadata from a raw HTML body.
///
/// Returns an empty mapping when the body holds no document at all. Otherwise
/// `og:title` and `og:description` are always present, possibly `None`, along
/// with any `og:*` properties declared by the page.
#[must_use]
pub fn extract_metadata(
    body: &[u8],
    target_url: &Url,
    content_type: Option<&str>,
    encoding_hint: Option<&str>,
) -> OgMetadata {
    extract_metadata_with_budget(
        body,
        target_url,
        content_type,
        encoding_hint,
        SummaryBudget::default(),
    )
}

#[must_use]
pub fn extract_metadata_with_budget(
    body: &[u8],
    target_url: &Url,
    content_type: Option<&str>,
    encoding_hint: Option<&str>,
    budget: SummaryBudget,
) -> OgMetadata {
    let label = choose_encoding(body, content_type, encoding_hint);
    let text = decode_lossy(body, &label);

    let Some(document) = parse_document(&text) else {
        tracing::debug!(url = %target_url, "body has no document tree");
        return OgMetadata::new();
    };

    let og = calc_og(&document, target_url, budget);
    tracing::debug!(
        url = %target_url,
        encoding = %label,
        keys = og.len(),
        "extracted preview metadata"
    );
    og
}

fn choose_encoding(
    body: &[u8],
    content_type: Option<&str>,
    encoding_hint: Option<&str>,
) -> String {
    if let Some(hint) = encoding_hint {
        if encoding_for_label(hint).is_some() {
            return hint.to_owned();
        }
        tracing::debug!(hint, "ignoring unrecognized encoding hint");
    }
    resolve_encoding(body, content_type)
}

/// Parses decoded markup, or returns `None` when there is nothing to parse.
#[must_use]
pub fn parse_document(text: &str) -> Option<Html> {
    if text.chars().all(|c| c == '\0' || c.is_whitespace()) {
        return None;
    }
    Some(Html::parse_document(text))
}

fn calc_og(document: &Html, target_url: &Url, budget: SummaryBudget) -> OgMetadata {
    let mut og = declared_og_properties(document, target_url);

    if !og.contains_key(OG_TITLE) {
        og.insert(OG_TITLE, derive_title(document));
    }

    let declared = og.as_map().get(OG_DESCRIPTION).cloned();
    match declared {
        Some(Some(description)) if !description.trim().is_empty() => {
            og.insert(OG_DESCRIPTION, summarize_one(&description, budget));
        }
        Some(_) => {}
        None => {
            let description = match meta_description(document) {
                Some(description) => summarize_one(&description, budget),
                None => summarize_body(document, budget),
            };
            og.insert(OG_DESCRIPTION, description);
        }
    }

    og
}

fn declared_og_properties(document: &Html, target_url: &Url) -> OgMetadata {
    let mut og = OgMetadata::new();
    let Ok(selector) = Selector::parse(r#"meta[property^="og:"]"#) else {
        return og;
    };

    let tags = document
        .select(&selector)
        .filter_map(|meta| {
            let property = meta.value().attr("property")?;
            let content = meta.value().attr("content")?;
            Some((property, content))
        })
        .take(MAX_OG_TAGS);

    for (property, content) in tags {
        if og.contains_key(property) {
            continue;
        }
        let value = if URL_PROPERTIES.contains(&property) {
            resolve_link(target_url, content)
        } else {
            content.to_owned()
        };
        og.insert(property, Some(value));
    }

    og
}

fn resolve_link(target_url: &Url, href: &str) -> String {
    match target_url.join(href.trim()) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::debug!(href, ?err, "leaving unresolvable link as declared");
            href.to_owned()
        }
    }
}

fn meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name][content]").ok()?;
    document
        .select(&selector)
        .find(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.trim().is_empty())
        .map(str::to_owned)
}

/// Text of the first `<title>`, else of the first `<h1>`.
fn derive_title(document: &Html) -> Option<String> {
    first_element_text(document, "title").or_else(|| first_element_text(document, "h1"))
}

fn first_element_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_owned())
}

fn summarize_body(document: &Html, budget: SummaryBudget) -> Option<String> {
    let paragraphs = body_paragraphs(document);
    if paragraphs.is_empty() {
        return None;
    }
    non_empty(summarize(&paragraphs, budget.min_size, budget.max_size))
}

fn summarize_one(description: &str, budget: SummaryBudget) -> Option<String> {
    non_empty(summarize(&[description], budget.min_size, budget.max_size))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("http://example.com/articles/test.html").expect("valid url")
    }

    fn extract(html: &str) -> OgMetadata {
        extract_metadata(html.as_bytes(), &page_url(), None, None)
    }

    #[test]
    fn whitespace_only_body_has_no_tree() {
        assert!(extract("  \n\t ").is_empty());
        assert!(parse_document("\0\0").is_none());
    }

    #[test]
    fn declared_og_properties_win() {
        let og = extract(
            r#"<html><head>
            <title>Derived</title>
            <meta property="og:title" content="Declared">
            <meta property="og:site_name" content="Example">
            </head><body>Body text.</body></html>"#,
        );
        assert_eq!(og.title(), Some("Declared"));
        assert_eq!(og.value("og:site_name"), Some("Example"));
        assert_eq!(og.description(), Some("Body text."));
    }

    #[test]
    fn first_declaration_of_a_property_is_kept() {
        let og = extract(
            r#"<head><meta property="og:title" content="First"><meta property="og:title" content="Second"></head>"#,
        );
        assert_eq!(og.title(), Some("First"));
    }

    #[test]
    fn og_meta_without_content_is_ignored() {
        let og = extract(r#"<head><meta property="og:title"><title>Fallback</title></head>"#);
        assert_eq!(og.title(), Some("Fallback"));
    }

    #[test]
    fn relative_og_links_resolve_against_the_page() {
        let og = extract(
            r#"<head><meta property="og:image" content="../img/cover.png"><meta property="og:url" content="/canonical"></head>"#,
        );
        assert_eq!(og.value("og:image"), Some("http://example.com/img/cover.png"));
        assert_eq!(og.value("og:url"), Some("http://example.com/canonical"));
    }

    #[test]
    fn meta_description_beats_body_text() {
        let og = extract(
            r#"<head><meta name="Description" content="From the meta tag."></head><body>From the body.</body>"#,
        );
        assert_eq!(og.description(), Some("From the meta tag."));
    }

    #[test]
    fn declared_description_is_kept_within_budget() {
        let long = "word ".repeat(200);
        let html = format!(r#"<head><meta property="og:description" content="{long}"></head>"#);
        let og = extract(&html);
        let description = og.description().expect("description");
        assert!(description.chars().count() <= SummaryBudget::default().max_size);
        assert!(description.ends_with('…'));
    }

    #[test]
    fn og_tag_count_is_capped() {
        let tags: String = (0..60)
            .map(|i| format!(r#"<meta property="og:custom{i}" content="{i}">"#))
            .collect();
        let og = extract(&format!("<head>{tags}</head>"));
        assert!(og.contains_key("og:custom49"));
        assert!(!og.contains_key("og:custom50"));
    }

    #[test]
    fn encoding_hint_overrides_declarations() {
        let body = b"<html><head><meta charset=\"utf-8\"><title>Caf\xe9</title></head></html>";
        let og = extract_metadata(body, &page_url(), None, Some("latin1"));
        assert_eq!(og.title(), Some("Café"));
    }

    #[test]
    fn declared_charset_drives_decoding() {
        let body = b"<html><head><meta charset=\"windows-1252\"><title>\x93Hi\x94</title></head></html>";
        let og = extract_metadata(body, &page_url(), Some("text/html; charset=utf-8"), None);
        assert_eq!(og.title(), Some("\u{201C}Hi\u{201D}"));
    }

    #[test]
    fn custom_budget_applies_to_body_text() -> anyhow::Result<()> {
        let budget = SummaryBudget::new(5, 12)?;
        let og = extract_metadata_with_budget(
            b"<body><p>first paragraph here</p></body>",
            &page_url(),
            None,
            None,
            budget,
        );
        assert_eq!(og.description(), Some("first…"));
        Ok(())
    }
}
