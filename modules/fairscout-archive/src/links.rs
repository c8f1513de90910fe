use std::collections::HashMap;
use std::sync::LazyLock;

use fairscout_common::PageLink;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

static IMG_ALT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("valid selector"));

const MAX_LINKS_PER_PAGE: usize = 500;
/// Max chars of context kept per link, centered on the anchor.
const CONTEXT_CHARS: usize = 200;

const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "li",
    "td",
    "th",
    "dd",
    "dt",
    "blockquote",
    "section",
    "article",
];

const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Resolve a raw href against a base URL, returning an absolute http(s) URL
/// with the fragment stripped.
fn resolve_href(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let mut parsed = match base {
        Some(base) => base.join(raw).ok()?,
        None => Url::parse(raw).ok()?,
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element. Text nodes are concatenated as-is, so inline
/// markup inside a word (`R<b>è</b>glement`) does not split it.
fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// All visible text of a parsed document, one space between text nodes.
/// Script, style and template bodies are skipped.
pub(crate) fn document_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| INVISIBLE_ELEMENTS.contains(&parent.value().name()));
        if !hidden {
            parts.push(&**text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn anchor_text(element: &ElementRef) -> String {
    let text = element_text(element);
    if !text.is_empty() {
        return text;
    }
    element
        .select(&IMG_ALT_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(collapse_whitespace)
        .unwrap_or_default()
}

/// Text of the nearest block-level ancestor, cut to a window centered on the
/// anchor text.
fn surrounding_text(element: &ElementRef, anchor: &str) -> String {
    let block = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| BLOCK_ELEMENTS.contains(&el.value().name()));
    let Some(block) = block else {
        return String::new();
    };

    let full: Vec<char> = element_text(&block).chars().collect();
    if full.len() <= CONTEXT_CHARS {
        return full.into_iter().collect();
    }

    let full_str: String = full.iter().collect();
    let center = full_str
        .find(anchor)
        .filter(|_| !anchor.is_empty())
        .map(|byte_pos| full_str[..byte_pos].chars().count() + anchor.chars().count() / 2)
        .unwrap_or(0);
    let start = center.saturating_sub(CONTEXT_CHARS / 2);
    let end = (start + CONTEXT_CHARS).min(full.len());
    let start = end.saturating_sub(CONTEXT_CHARS);
    full[start..end].iter().collect::<String>().trim().to_string()
}

/// Extract every anchor of a parsed document as a `PageLink`.
pub(crate) fn document_links(document: &Html, base_url: &str) -> Vec<PageLink> {
    let base = Url::parse(base_url).ok();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut links: Vec<PageLink> = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(resolved) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base.as_ref()))
        else {
            continue;
        };
        let text = anchor_text(&element);

        match index.get(&resolved) {
            Some(&i) => {
                if links[i].text.is_empty() && !text.is_empty() {
                    links[i].context = surrounding_text(&element, &text);
                    links[i].text = text;
                }
            }
            None => {
                if links.len() >= MAX_LINKS_PER_PAGE {
                    continue;
                }
                index.insert(resolved.clone(), links.len());
                links.push(PageLink {
                    href: resolved,
                    context: surrounding_text(&element, &text),
                    text,
                });
            }
        }
    }

    links
}

/// Extract every anchor from raw HTML as a `PageLink`.
///
/// Relative hrefs resolve against `base_url`; non-http(s) schemes
/// (`mailto:`, `javascript:`, `tel:`) are dropped. Links are deduplicated by
/// resolved URL in document order; a later anchor's text fills in when the
/// first one had none.
pub fn extract_page_links(html: &str, base_url: &str) -> Vec<PageLink> {
    document_links(&Html::parse_document(html), base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hrefs(links: &[PageLink]) -> Vec<&str> {
        links.iter().map(|l| l.href.as_str()).collect()
    }

    // --- href extraction ---

    #[test]
    fn anchor_href_and_text_are_extracted() {
        let html = r#"<a href="https://fair.com/floorplan">Hall <b>Plan</b></a>"#;
        let links = extract_page_links(html, "https://fair.com");
        assert_eq!(hrefs(&links), vec!["https://fair.com/floorplan"]);
        assert_eq!(links[0].text, "Hall Plan");
    }

    #[test]
    fn single_quoted_and_unquoted_hrefs() {
        let html = "<a class='btn' href='https://example.com/page'>link</a>\
                    <a href=/media/hallenplan.pdf>Hallenplan</a>";
        let links = extract_page_links(html, "https://example.com");
        assert_eq!(
            hrefs(&links),
            vec!["https://example.com/page", "https://example.com/media/hallenplan.pdf"]
        );
        assert_eq!(links[1].text, "Hallenplan");
    }

    #[test]
    fn named_and_numeric_entities_are_decoded() {
        let html = r#"<a href="/rules">Rules&nbsp;&amp;&nbsp;Regulations</a>
            <a href="/docs/tech.pdf">R&egrave;glement technique</a>
            <a href='/docs/m.pdf'>Exhibitor&#x20;Manual</a>
            <a href="/docs/b.pdf">Aufbau&#8211;Abbau</a>"#;
        let links = extract_page_links(html, "https://fair.fr");
        let texts: Vec<&str> = links.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Rules & Regulations",
                "Règlement technique",
                "Exhibitor Manual",
                "Aufbau–Abbau"
            ]
        );
    }

    #[test]
    fn image_alt_stands_in_for_empty_text() {
        let html = r#"<p><a href="/plan"><img src="plan.png" alt="Floor plan"></a></p>"#;
        let links = extract_page_links(html, "https://fair.com");
        assert_eq!(links[0].text, "Floor plan");
    }

    // --- Non-anchor URLs are ignored ---

    #[test]
    fn image_src_and_script_urls_are_not_extracted() {
        let html = r#"<img src="https://cdn.example.com/a.png">
            <script src="https://cdn.example.com/app.js"></script>
            <link href="https://cdn.example.com/style.css" rel="stylesheet">
            Visit https://example.com/about"#;
        let links = extract_page_links(html, "https://example.com");
        assert!(links.is_empty());
    }

    #[test]
    fn non_http_schemes_are_dropped() {
        let html = r##"<a href="mailto:info@fair.com">Mail</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="tel:+4930">Call</a>
            <a href="#top">Top</a>"##;
        let links = extract_page_links(html, "https://fair.com");
        assert!(links.is_empty());
    }

    // --- Relative URL resolution ---

    #[test]
    fn resolves_relative_path() {
        let html = r#"<a href="downloads/manual.pdf">Manual</a>"#;
        let links = extract_page_links(html, "https://fair.com/exhibitors/");
        assert_eq!(hrefs(&links), vec!["https://fair.com/exhibitors/downloads/manual.pdf"]);
    }

    #[test]
    fn malformed_base_skips_relative_hrefs() {
        let html = r#"<a href="/about">About</a><a href="https://x.com/">X</a>"#;
        let links = extract_page_links(html, "not a url");
        assert_eq!(hrefs(&links), vec!["https://x.com/"]);
    }

    // --- Deduplication / fragments ---

    #[test]
    fn same_page_with_different_fragments_deduplicates() {
        let html = r#"
            <a href="/page#breadcrumb">one</a>
            <a href="/page#footer">two</a>
        "#;
        let links = extract_page_links(html, "https://example.com");
        assert_eq!(hrefs(&links), vec!["https://example.com/page"]);
        assert_eq!(links[0].text, "one");
    }

    #[test]
    fn later_text_fills_empty_first_anchor() {
        let html = r#"
            <a href="/floorplan"><img src="icon.svg"></a>
            <a href="/floorplan">Floor plan</a>
        "#;
        let links = extract_page_links(html, "https://fair.com");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "Floor plan");
    }

    #[test]
    fn links_are_capped_per_page() {
        let mut html = String::from("<html><body>");
        for i in 0..600 {
            html.push_str(&format!(r#"<a href="/page/{i}">Link {i}</a>"#));
        }
        html.push_str("</body></html>");
        let links = extract_page_links(&html, "https://fair.com");
        assert_eq!(links.len(), MAX_LINKS_PER_PAGE);
    }

    // --- Context ---

    #[test]
    fn context_is_the_enclosing_block_text() {
        let html = r#"<h3>Technical guidelines</h3>
            <p>Download the <a href="/docs/tech.pdf">PDF</a> before arrival.</p>"#;
        let links = extract_page_links(html, "https://fair.com");
        assert_eq!(links[0].context, "Download the PDF before arrival.");
    }

    #[test]
    fn context_is_capped_and_keeps_the_anchor() {
        let filler = "word ".repeat(100);
        let html = format!("<p>{filler}<a href=\"/x\">Hall plan</a> {filler}</p>");
        let links = extract_page_links(&html, "https://fair.com");
        assert!(links[0].context.chars().count() <= CONTEXT_CHARS);
        assert!(links[0].context.contains("Hall plan"));
    }

    #[test]
    fn context_window_respects_multibyte_chars() {
        let filler = "Messegelände äöü ".repeat(40);
        let html = format!("<div>{filler}<a href=\"/x\">Lageplan</a></div>");
        let links = extract_page_links(&html, "https://fair.com");
        assert!(links[0].context.contains("Lageplan"));
        assert!(links[0].context.contains("Messegelände"));
    }

    #[test]
    fn document_text_skips_scripts() {
        let document = Html::parse_document(
            "<html><head><script>var x = 1;</script><style>p{}</style></head>\
             <body><p>Build-up</p><p>2 February&nbsp;2026</p></body></html>",
        );
        assert_eq!(document_text(&document), "Build-up 2 February 2026");
    }

    // --- Empty / realistic ---

    #[test]
    fn empty_html_returns_empty() {
        assert!(extract_page_links("", "https://example.com").is_empty());
    }

    #[test]
    fn exhibitor_service_page() {
        let html = r#"
            <nav><a href="/">Home</a><a href="/exhibitors/">Exhibitors</a></nav>
            <ul>
              <li><a href="/media/hallplan_2026.pdf">Hallenplan 2026</a></li>
              <li><a href="https://cdn.fair.com/manual.pdf?v=2">Exhibitor Manual</a></li>
              <li><a href="https://fair.expofp.com/">Interactive floor plan</a></li>
            </ul>
        "#;
        let links = extract_page_links(html, "https://www.fair.com/exhibitors/service");
        assert_eq!(
            hrefs(&links),
            vec![
                "https://www.fair.com/",
                "https://www.fair.com/exhibitors/",
                "https://www.fair.com/media/hallplan_2026.pdf",
                "https://cdn.fair.com/manual.pdf?v=2",
                "https://fair.expofp.com/",
            ]
        );
        assert_eq!(links[2].text, "Hallenplan 2026");
        assert_eq!(links[2].context, "Hallenplan 2026");
    }
}
