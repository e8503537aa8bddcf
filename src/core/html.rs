use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

pub(crate) static ROW: LazyLock<Selector> = LazyLock::new(|| parse_selector("tr"));
pub(crate) static CELL: LazyLock<Selector> = LazyLock::new(|| parse_selector("td"));
pub(crate) static LINK: LazyLock<Selector> = LazyLock::new(|| parse_selector("a[href]"));
pub(crate) static LEVEL_LABEL: LazyLock<Selector> = LazyLock::new(|| parse_selector("span.label"));
pub(crate) static DEFINITION_TERM: LazyLock<Selector> = LazyLock::new(|| parse_selector("dt"));

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Concatenated text of an element, trimmed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First `a[href]` descendant of `element`, with its trimmed text and raw href.
pub(crate) fn first_link<'a>(element: ElementRef<'a>) -> Option<(String, &'a str)> {
    element
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href").map(|href| (text_of(a), href)))
}
