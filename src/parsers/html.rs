use crate::filter::LinkFilter;
use crate::parsers::text::{self, TextOptions};
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static BASE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("base selector is valid"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

/// Elements that start a new paragraph in the text export
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose text is never document content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts the in-scope anchor targets of a rendered page
///
/// Every `a[href]` is resolved against the document base (the `<base href>`
/// if present, else `page_url`) and kept when `filter` accepts it. The result
/// holds normalized absolute URLs in document order with duplicates removed.
pub fn extract_links(html: &str, page_url: &Url, filter: &LinkFilter) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let base = document_base(&doc, page_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            ::log::trace!("Unresolvable href on {}: {}", page_url, href);
            continue;
        };
        if !filter.matches(&resolved, &base) {
            continue;
        }

        let normalized = filter.normalize_url(&resolved);
        if seen.insert(normalized.to_string()) {
            links.push(normalized);
        }
    }

    ::log::debug!("Extracted {} matching links from {}", links.len(), page_url);
    links
}

fn document_base(doc: &Html, page_url: &Url) -> Url {
    doc.select(&BASE)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts readable text from an HTML document, one paragraph per block element
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let root = doc
        .select(&BODY)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut raw = String::new();
    for node in root.descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                raw.push_str("\n\n");
            }
            Node::Element(element) if element.name() == "br" => raw.push('\n'),
            Node::Text(content) => {
                let skipped = node
                    .parent()
                    .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| SKIPPED_ELEMENTS.contains(&name));
                if !skipped {
                    raw.push_str(content);
                }
            }
            _ => {}
        }
    }

    text::normalize(&raw, &TextOptions::paragraphs())
}
