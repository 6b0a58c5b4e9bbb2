use crate::domain::model::{Tender, TenderQuery};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The subset of page automation the scraper needs.
///
/// Lookups that find nothing are not errors: `click` returns `Ok(false)` and
/// `inner_html_all` returns an empty list.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn inner_html_all(&self, selector: &str) -> Result<Vec<String>>;
    async fn click(&self, selector: &str) -> Result<bool>;
    /// Clicks the first element matching `selector` whose trimmed text equals `text`.
    async fn click_with_text(&self, selector: &str, text: &str) -> Result<bool>;
    async fn content(&self) -> Result<String>;
}

/// One browser process with a single open page.
#[async_trait]
pub trait BrowserSession: Send {
    fn page(&self) -> &dyn BrowserPage;
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Walks the listing and returns in-range tenders in listing order.
    async fn extract(&self, page: &dyn BrowserPage, query: &TenderQuery) -> Result<Vec<Tender>>;
    /// Fills in the CUBSO code of each tender from its detail page.
    async fn enrich(&self, page: &dyn BrowserPage, tenders: &mut [Tender]) -> Result<()>;
}

/// Anything that can answer a tender query; the HTTP layer depends only on this.
#[async_trait]
pub trait TenderSource: Send + Sync {
    async fn scrape(&self, query: &TenderQuery) -> Result<Vec<Tender>>;
}
