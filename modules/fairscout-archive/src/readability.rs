// HTML → text transform via spider_transformations.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

use crate::links::{collapse_whitespace, document_text};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));

/// Convert raw HTML into markdown text.
///
/// Keeps the whole document rather than the readability main-content block:
/// schedules and download lists often live in sidebars and footers.
pub(crate) fn html_to_text(html: &[u8], url: Option<&str>) -> String {
    let parsed_url = url.and_then(|u| url::Url::parse(u).ok());
    let config = TransformConfig {
        readability: false,
        main_content: false,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html,
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

/// Plain visible text, for documents the markdown transform returns nothing for.
pub(crate) fn html_text_fallback(document: &Html) -> String {
    document_text(document)
}

/// `<title>` text, falling back to the first `<h1>`. Empty when neither exists.
pub(crate) fn html_title(document: &Html) -> String {
    let first_text = |selector: &Selector| {
        document
            .select(selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    };
    first_text(&*TITLE_SELECTOR)
        .or_else(|| first_text(&*H1_SELECTOR))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(html: &str) -> String {
        html_title(&Html::parse_document(html))
    }

    #[test]
    fn title_tag_wins() {
        let html = "<html><head><title> Fruit Logistica &amp; Co </title></head><h1>Other</h1></html>";
        assert_eq!(title(html), "Fruit Logistica & Co");
    }

    #[test]
    fn h1_is_fallback() {
        assert_eq!(title("<body><h1 class=x>Exhibitor <em>Service</em></h1></body>"), "Exhibitor Service");
        assert_eq!(title("<title>  </title><h1>Salon &eacute;quip&#39;Auto</h1>"), "Salon équip'Auto");
        assert_eq!(title("<p>none</p>"), "");
    }
}
