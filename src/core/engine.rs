use crate::domain::model::{Tender, TenderQuery};
use crate::domain::ports::{BrowserLauncher, BrowserPage, Pipeline, TenderSource};
use crate::utils::error::{Result, ScrapeError};
use crate::utils::monitor::SystemMonitor;
use async_trait::async_trait;
use tokio::sync::Semaphore;

/// Runs scrapes: one browser session per query, bounded by a permit pool.
pub struct ScrapeEngine<L: BrowserLauncher, P: Pipeline> {
    launcher: L,
    pipeline: P,
    permits: Semaphore,
    monitor_enabled: bool,
}

impl<L: BrowserLauncher, P: Pipeline> ScrapeEngine<L, P> {
    pub fn new(launcher: L, pipeline: P, max_concurrent: usize) -> Self {
        Self {
            launcher,
            pipeline,
            permits: Semaphore::new(max_concurrent.max(1)),
            monitor_enabled: false,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        self
    }

    pub async fn run(&self, query: &TenderQuery) -> Result<Vec<Tender>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ScrapeError::UnavailableError {
                message: "scrape permit pool closed".to_string(),
            })?;

        let monitor = SystemMonitor::new(self.monitor_enabled);
        tracing::info!(
            "Starting scrape for {} (max {}, cubso: {})",
            query.range,
            query.max_results,
            query.include_cubso
        );

        let mut session = self.launcher.launch().await?;
        monitor.log_stats("Browser launched");

        let outcome = self.run_phases(session.page(), query, &monitor).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
        monitor.log_final_stats();

        match &outcome {
            Ok(tenders) => tracing::info!("✅ Scrape finished with {} tenders", tenders.len()),
            Err(e) => tracing::error!(
                "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            ),
        }
        outcome
    }

    async fn run_phases(
        &self,
        page: &dyn BrowserPage,
        query: &TenderQuery,
        monitor: &SystemMonitor,
    ) -> Result<Vec<Tender>> {
        let mut tenders = self.pipeline.extract(page, query).await?;
        monitor.log_stats("Extract");

        if query.include_cubso && !tenders.is_empty() {
            self.pipeline.enrich(page, &mut tenders).await?;
            monitor.log_stats("Enrich");
        }

        Ok(tenders)
    }
}

#[async_trait]
impl<L: BrowserLauncher, P: Pipeline> TenderSource for ScrapeEngine<L, P> {
    async fn scrape(&self, query: &TenderQuery) -> Result<Vec<Tender>> {
        self.run(query).await
    }
}
