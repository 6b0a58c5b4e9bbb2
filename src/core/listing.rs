//! Parsing of SEACE search result cards.

use crate::domain::model::{CubsoLookup, DateRange, Tender, TenderKind};
use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

pub const SEACE_URL: &str = "https://prod6.seace.gob.pe/buscador-publico/contrataciones";

pub const CARD_SELECTOR: &str = "div.bg-fondo-section.rounded-md.p-5.ng-star-inserted";
pub const PAGE_SIZE_SELECTOR: &str = "mat-select[aria-labelledby*='mat-paginator-page-size-label']";
pub const PAGE_SIZE_OPTION_SELECTOR: &str = "mat-option";
pub const NEXT_PAGE_SELECTOR: &str = "button.mat-mdc-paginator-navigation-next:not([disabled])";

pub const PUBLICATION_PREFIX: &str = "Fecha de publicación:";
const PUBLICATION_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const MISSING_FIELD: &str = "N/A";
const NO_PUBLICATION: &str = "No disponible";

static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));
static DETAIL_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*='/buscador-publico/contrataciones/']").expect("static selector")
});

/// Fields read from one result card, before date filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub code: String,
    pub entity: String,
    pub description: String,
    /// Text of the publication paragraph, `No disponible` when the card has none.
    pub publication: String,
    pub link: Option<String>,
}

impl Card {
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_publication(&self.publication)
    }

    pub fn is_within(&self, range: &DateRange) -> bool {
        self.published_at()
            .is_some_and(|published| range.contains(published.date()))
    }

    pub fn into_tender(self) -> Tender {
        let kind = TenderKind::classify(&self.description);
        let published = strip_publication_prefix(&self.publication).to_string();
        Tender {
            code: self.code,
            entity: self.entity,
            description: self.description,
            kind,
            published,
            link: self.link,
            cubso: CubsoLookup::NotRequested,
        }
    }
}

/// Concatenates the trimmed, non-empty text nodes under `element`.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_card(html: &str, base_url: &Url) -> Card {
    let fragment = Html::parse_fragment(html);
    let paragraphs: Vec<ElementRef<'_>> = fragment.select(&PARAGRAPH).collect();

    let publication = paragraphs
        .iter()
        .find(|p| p.text().collect::<String>().contains(PUBLICATION_PREFIX))
        .map(|p| stripped_text(*p))
        .unwrap_or_else(|| NO_PUBLICATION.to_string());

    let field = |index: usize| {
        paragraphs
            .get(index)
            .map(|p| stripped_text(*p))
            .unwrap_or_else(|| MISSING_FIELD.to_string())
    };

    let link = fragment
        .select(&DETAIL_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| match base_url.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => href.to_string(),
        });

    Card {
        code: field(0),
        entity: field(1),
        description: field(2),
        publication,
        link,
    }
}

pub fn strip_publication_prefix(text: &str) -> &str {
    text.strip_prefix(PUBLICATION_PREFIX)
        .unwrap_or(text)
        .trim()
}

pub fn parse_publication(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(strip_publication_prefix(text.trim()), PUBLICATION_FORMAT).ok()
}
