use crate::core::listing::stripped_text;
use crate::domain::model::CubsoLookup;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static TABLE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("static selector"));
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{13,16}\b").expect("static regex"));

fn is_cubso_code(text: &str) -> bool {
    let len = text.chars().count();
    (13..=16).contains(&len) && text.chars().all(|c| c.is_ascii_digit())
}

/// Finds the CUBSO catalogue code on a tender detail page.
///
/// Cells tagged with a `codCubso` class win; otherwise the first 13-16 digit
/// number anywhere in the page text is taken.
pub fn extract_cubso(html: &str) -> CubsoLookup {
    let document = Html::parse_document(html);

    let tagged = document
        .select(&TABLE_CELL)
        .filter(|cell| {
            cell.value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains("codcubso"))
        })
        .map(stripped_text)
        .find(|text| is_cubso_code(text));

    if let Some(code) = tagged {
        return CubsoLookup::Found(code);
    }

    let text: String = document.root_element().text().collect();
    match CODE_PATTERN.find(&text) {
        Some(m) => CubsoLookup::Found(m.as_str().to_string()),
        None => CubsoLookup::NotFound,
    }
}
