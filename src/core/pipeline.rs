use crate::config::settings::ScraperSettings;
use crate::core::cubso::extract_cubso;
use crate::core::listing::{
    parse_card, CARD_SELECTOR, NEXT_PAGE_SELECTOR, PAGE_SIZE_OPTION_SELECTOR, PAGE_SIZE_SELECTOR,
};
use crate::domain::model::{CubsoLookup, Tender, TenderQuery};
use crate::domain::ports::{BrowserPage, Pipeline};
use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// Walks the SEACE public search listing page by page.
pub struct SeacePipeline {
    settings: ScraperSettings,
    base_url: Url,
}

impl SeacePipeline {
    pub fn new(settings: ScraperSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        Ok(Self { settings, base_url })
    }

    async fn enlarge_page_size(&self, page: &dyn BrowserPage) -> Result<()> {
        if !page.click(PAGE_SIZE_SELECTOR).await? {
            tracing::debug!("Page size selector not present, keeping default page size");
            return Ok(());
        }

        let option = self.settings.page_size.to_string();
        if page.click_with_text(PAGE_SIZE_OPTION_SELECTOR, &option).await? {
            page.wait_for_selector(CARD_SELECTOR, self.settings.page_size_timeout)
                .await?;
        } else {
            tracing::debug!("No page size option labelled {}", option);
        }
        Ok(())
    }

    async fn fetch_detail(&self, page: &dyn BrowserPage, link: &str) -> Result<String> {
        page.goto(link, self.settings.detail_navigation_timeout).await?;
        page.wait_for_selector("body", self.settings.detail_ready_timeout)
            .await?;
        page.content().await
    }

    async fn lookup_cubso(&self, page: &dyn BrowserPage, link: &str) -> CubsoLookup {
        match self.fetch_detail(page, link).await {
            Ok(html) => extract_cubso(&html),
            Err(e) => {
                tracing::debug!("CUBSO lookup failed for {}: {}", link, e);
                CubsoLookup::Failed
            }
        }
    }
}

#[async_trait]
impl Pipeline for SeacePipeline {
    async fn extract(&self, page: &dyn BrowserPage, query: &TenderQuery) -> Result<Vec<Tender>> {
        let settings = &self.settings;
        let mut tenders = Vec::new();

        tracing::info!("Navigating to SEACE: {}", query.range);
        page.goto(self.base_url.as_str(), settings.navigation_timeout)
            .await?;
        page.wait_for_selector(CARD_SELECTOR, settings.results_timeout)
            .await?;

        if let Err(e) = self.enlarge_page_size(page).await {
            tracing::warn!(
                "Could not switch to {} results per page: {}",
                settings.page_size,
                e
            );
        }

        let mut page_number = 1;
        while page_number <= settings.max_pages && tenders.len() < query.max_results {
            tracing::info!(
                "📄 Page {} | Collected: {}",
                page_number,
                tenders.len()
            );

            let cards = page.inner_html_all(CARD_SELECTOR).await?;
            if cards.is_empty() {
                break;
            }

            let mut in_range_on_page = false;
            for html in &cards {
                let card = parse_card(html, &self.base_url);
                if !card.is_within(&query.range) {
                    continue;
                }

                in_range_on_page = true;
                tenders.push(card.into_tender());
                if tenders.len() >= query.max_results {
                    break;
                }
            }

            // Listing is newest first, so a page with nothing in range ends the search
            if !in_range_on_page {
                tracing::info!("🔍 No more tenders in the date range, stopping");
                break;
            }

            if !page.click(NEXT_PAGE_SELECTOR).await? {
                break;
            }

            page.wait_for_selector(CARD_SELECTOR, settings.next_page_timeout)
                .await?;
            tokio::time::sleep(settings.page_delay).await;
            page_number += 1;
        }

        Ok(tenders)
    }

    async fn enrich(&self, page: &dyn BrowserPage, tenders: &mut [Tender]) -> Result<()> {
        tracing::info!("🔍 Looking up CUBSO codes for {} tenders", tenders.len());

        for tender in tenders.iter_mut() {
            tender.cubso = match &tender.link {
                Some(link) => self.lookup_cubso(page, link).await,
                None => CubsoLookup::NoLink,
            };
        }
        Ok(())
    }
}
